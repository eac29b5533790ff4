use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc};

/// Naive (offset-free) layouts seen in buoy exports, read as UTC.
pub const DATE_PATTERNS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
];

/// Cells sampled when guessing a column's layout.
const SAMPLE_CELLS: usize = 100;

/// How the cells of a time column are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// RFC 3339 with an explicit offset, e.g. `2024-03-01T06:00:00Z`.
    Rfc3339,
    /// One of [`DATE_PATTERNS`], date-only or date-time.
    Pattern(&'static str),
}

impl DateFormat {
    /// The layout that parses the largest share of the sampled cells.
    /// Ties go to the earlier candidate, RFC 3339 first.
    pub fn detect(cells: &[String]) -> Option<Self> {
        let sample: Vec<&str> = cells
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .take(SAMPLE_CELLS)
            .collect();

        std::iter::once(DateFormat::Rfc3339)
            .chain(DATE_PATTERNS.iter().map(|&p| DateFormat::Pattern(p)))
            .map(|format| {
                let hits = sample.iter().filter(|s| format.parse(s).is_some()).count();
                (format, hits)
            })
            .filter(|&(_, hits)| hits > 0)
            .fold(None, |best: Option<(DateFormat, usize)>, candidate| match best {
                Some((_, top)) if top >= candidate.1 => best,
                _ => Some(candidate),
            })
            .map(|(format, _)| format)
    }

    /// Unix seconds (millisecond precision) for one cell.
    pub fn parse(self, cell: &str) -> Option<f64> {
        let cell = cell.trim();
        let millis = match self {
            DateFormat::Rfc3339 => DateTime::parse_from_rfc3339(cell).ok()?.timestamp_millis(),
            DateFormat::Pattern(p) => match NaiveDateTime::parse_from_str(cell, p) {
                Ok(dt) => dt.and_utc().timestamp_millis(),
                Err(_) => NaiveDate::parse_from_str(cell, p)
                    .ok()?
                    .and_hms_opt(0, 0, 0)?
                    .and_utc()
                    .timestamp_millis(),
            },
        };
        Some(millis as f64 / 1000.0)
    }
}

/// Parse a whole column. Returns `None` unless more than 70% of the cells
/// are valid timestamps.
pub fn column_to_timestamps(data: &[String]) -> Option<Vec<Option<f64>>> {
    let format = DateFormat::detect(data)?;

    let timestamps: Vec<Option<f64>> = data.iter().map(|s| format.parse(s)).collect();
    let valid = timestamps.iter().filter(|t| t.is_some()).count();

    (valid * 10 > data.len() * 7).then_some(timestamps)
}

/// Cheap check used by header detection.
pub fn is_date_like(s: &str) -> bool {
    let has_separators = s.contains('/') || s.contains(':') || s.matches('-').count() == 2;
    has_separators
        && (DateFormat::Rfc3339.parse(s).is_some()
            || DATE_PATTERNS.iter().any(|&p| DateFormat::Pattern(p).parse(s).is_some()))
}

fn to_datetime(ts: f64) -> Option<DateTime<Utc>> {
    if !ts.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis((ts * 1000.0).round() as i64)
}

/// Calendar year (UTC) of a Unix timestamp.
pub fn year_of(ts: f64) -> Option<i32> {
    to_datetime(ts).map(|dt| dt.year())
}

/// Display form of a timestamp in UTC. Whole minutes drop the seconds,
/// sub-second values keep milliseconds.
pub fn format_timestamp(ts: f64) -> String {
    let Some(dt) = to_datetime(ts) else {
        return format!("{ts:.3}");
    };
    let layout = if dt.timestamp_subsec_millis() != 0 {
        "%Y-%m-%d %H:%M:%S%.3f"
    } else if dt.second() != 0 {
        "%Y-%m-%d %H:%M:%S"
    } else {
        "%Y-%m-%d %H:%M"
    };
    dt.format(layout).to_string()
}
