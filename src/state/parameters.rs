use serde::Serialize;

/// A measured buoy parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub key: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    /// Column names used by NOAA historical exports for the same quantity.
    #[serde(skip)]
    pub aliases: &'static [&'static str],
}

pub const PARAMETERS: [Parameter; 4] = [
    Parameter {
        key: "sea_surface_temp",
        label: "Sea Surface Temp",
        unit: "\u{00B0}C",
        aliases: &["WTMP"],
    },
    Parameter {
        key: "wind_speed",
        label: "Wind Speed",
        unit: "m/s",
        aliases: &["WSPD"],
    },
    Parameter {
        key: "air_pressure",
        label: "Air Pressure",
        unit: "hPa",
        aliases: &["PRES"],
    },
    Parameter {
        key: "wave_height",
        label: "Wave Height",
        unit: "m",
        aliases: &["WVHT"],
    },
];

/// Resolve a column key or NOAA alias to its catalog entry (case-insensitive).
pub fn parameter_for(key: &str) -> Option<&'static Parameter> {
    let key = key.trim();
    PARAMETERS.iter().find(|p| {
        p.key.eq_ignore_ascii_case(key) || p.aliases.iter().any(|a| a.eq_ignore_ascii_case(key))
    })
}

/// Display label for a column: the catalog label, or the column name itself.
pub fn label_for(column_name: &str) -> String {
    parameter_for(column_name)
        .map(|p| p.label.to_string())
        .unwrap_or_else(|| column_name.to_string())
}

/// Infer the measurement unit from a column name.
pub fn infer_unit(column_name: &str) -> String {
    if let Some(p) = parameter_for(column_name) {
        return p.unit.to_string();
    }

    let lower = column_name.to_lowercase();

    if lower.contains("temp") || lower.contains("sst") {
        "\u{00B0}C".to_string()
    } else if lower.contains("wind") || lower.contains("spd") || lower.contains("gst") {
        "m/s".to_string()
    } else if lower.contains("pres") || lower.contains("baro") {
        "hPa".to_string()
    } else if lower.contains("wave") || lower.contains("height") || lower.contains("wvht") {
        "m".to_string()
    } else {
        "units".to_string()
    }
}
