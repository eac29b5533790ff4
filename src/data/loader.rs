use std::io::Read;
use std::path::Path;

use crate::data::datetime::{column_to_timestamps, year_of};
use crate::data::parser::{self, HEADER_SCAN_LINES};
use crate::data::sentinel::{parse_measurement, DEFAULT_SENTINELS};
use crate::error::LoadError;
use crate::state::observation::{Dataset, Observation};

/// Column names recognised as the time axis, compared case-insensitively.
pub const TIMESTAMP_COLUMNS: [&str; 4] = ["timestamp", "time", "date", "datetime"];

/// Numeric-looking columns that identify a station rather than measure anything.
fn is_identifier(column: &str) -> bool {
    let lower = column.to_lowercase();
    lower == "id" || lower.ends_with("_id") || lower == "station" || lower == "wmo"
}

/// Split date parts, e.g. monthly aggregates keyed by `year` and `month`.
fn is_calendar(column: &str) -> bool {
    ["year", "month", "day", "hour"]
        .iter()
        .any(|c| column.eq_ignore_ascii_case(c))
}

/// How to turn a file into observations.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Numeric codes that mean "missing".
    pub sentinels: Vec<f64>,
    /// Restrict the dataset to these columns. Empty keeps every numeric column.
    pub fields: Vec<String>,
    /// Keep only rows of this station, matched against the identifier column.
    pub station: Option<String>,
    /// First calendar year kept, inclusive.
    pub from_year: Option<i32>,
    /// Last calendar year kept, inclusive.
    pub to_year: Option<i32>,
}

impl LoadOptions {
    fn has_year_range(&self) -> bool {
        self.from_year.is_some() || self.to_year.is_some()
    }

    /// Whether a row of `year` falls in the requested range. Rows without a
    /// year are only kept when no range is set.
    pub fn year_in_range(&self, year: Option<i32>) -> bool {
        if !self.has_year_range() {
            return true;
        }
        year.is_some_and(|y| self.from_year.map_or(true, |f| y >= f) && self.to_year.map_or(true, |t| y <= t))
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            sentinels: DEFAULT_SENTINELS.to_vec(),
            fields: Vec::new(),
            station: None,
            from_year: None,
            to_year: None,
        }
    }
}

/// Raw cell table: column names and column-major string data.
struct RawTable {
    columns: Vec<String>,
    column_data: Vec<Vec<String>>,
}

/// Load a CSV or Excel file into a dataset.
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let table = match ext.as_str() {
        "csv" => read_csv(path)?,
        "xls" | "xlsx" => read_excel(path)?,
        _ => return Err(LoadError::UnsupportedFormat(ext)),
    };

    let dataset = build_dataset(table, options)?;
    tracing::info!(
        "Loaded {} rows with fields {:?} from {:?}",
        dataset.len(),
        dataset.fields,
        path
    );
    Ok(dataset)
}

/// Parse CSV text that is already in memory.
pub fn load_csv_str(text: &str, options: &LoadOptions) -> Result<Dataset, LoadError> {
    build_dataset(csv_table(text.as_bytes())?, options)
}

fn read_csv(path: &Path) -> Result<RawTable, LoadError> {
    let content = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    csv_table(parser::decode_text(content).as_bytes())
}

/// Records of any width are accepted, so only a failing source is an error.
fn csv_table<S: Read>(source: S) -> Result<RawTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(false)
        .flexible(true)
        .from_reader(source);

    let mut all_rows: Vec<Vec<String>> = Vec::new();
    for result in reader.records() {
        let record = result?;
        all_rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    let header_row = parser::detect_csv_header(&all_rows, HEADER_SCAN_LINES);
    to_table(all_rows, header_row)
}

fn read_excel(path: &Path) -> Result<RawTable, LoadError> {
    use calamine::{open_workbook_auto, Data, Reader};

    let mut workbook =
        open_workbook_auto(path).map_err(|e| LoadError::Spreadsheet(format!("cannot open workbook: {e}")))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| LoadError::Spreadsheet("no sheets found".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| LoadError::Spreadsheet(format!("cannot read sheet {sheet_name}: {e}")))?;

    let all_rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::Empty => String::new(),
                    Data::String(s) => s.clone(),
                    Data::Float(f) => f.to_string(),
                    Data::Int(i) => i.to_string(),
                    Data::Bool(b) => b.to_string(),
                    Data::DateTime(dt) => match dt.as_datetime() {
                        Some(ndt) => ndt.format("%Y-%m-%d %H:%M:%S").to_string(),
                        None => dt.to_string(),
                    },
                    Data::DateTimeIso(s) => s.clone(),
                    Data::DurationIso(s) => s.clone(),
                    Data::Error(e) => format!("{e:?}"),
                })
                .collect()
        })
        .collect();

    let header_row = parser::detect_sheet_header(&all_rows, HEADER_SCAN_LINES);
    to_table(all_rows, header_row)
}

fn to_table(all_rows: Vec<Vec<String>>, header_row: usize) -> Result<RawTable, LoadError> {
    if header_row + 1 >= all_rows.len() {
        return Err(LoadError::Empty);
    }

    let columns: Vec<String> = all_rows[header_row].iter().map(|s| s.trim().to_string()).collect();
    let mut column_data: Vec<Vec<String>> = vec![Vec::new(); columns.len()];

    for row in &all_rows[header_row + 1..] {
        for (col_idx, col_data) in column_data.iter_mut().enumerate() {
            col_data.push(row.get(col_idx).cloned().unwrap_or_default());
        }
    }

    Ok(RawTable { columns, column_data })
}

/// Pick the timestamp column: a known name first, otherwise the first
/// column whose cells mostly parse as dates.
fn timestamp_column(table: &RawTable) -> Option<(usize, Vec<Option<f64>>)> {
    let by_name = table
        .columns
        .iter()
        .position(|c| TIMESTAMP_COLUMNS.iter().any(|t| c.eq_ignore_ascii_case(t)));

    if let Some(idx) = by_name {
        if let Some(ts) = column_to_timestamps(&table.column_data[idx]) {
            return Some((idx, ts));
        }
        tracing::warn!("Column {:?} does not hold parseable timestamps", table.columns[idx]);
    }

    table
        .column_data
        .iter()
        .enumerate()
        .filter(|(idx, _)| Some(*idx) != by_name)
        .find_map(|(idx, data)| column_to_timestamps(data).map(|ts| (idx, ts)))
}

/// A column is numeric when at least half of its non-empty cells parse.
fn is_numeric_column(data: &[String]) -> bool {
    let non_empty: Vec<&str> = data.iter().map(|s| s.trim()).filter(|s| !s.is_empty()).collect();
    if non_empty.is_empty() {
        return false;
    }
    let parsed = non_empty.iter().filter(|s| s.parse::<f64>().is_ok()).count();
    parsed * 2 >= non_empty.len()
}

fn build_dataset(table: RawTable, options: &LoadOptions) -> Result<Dataset, LoadError> {
    let timestamps = timestamp_column(&table);
    let ts_idx = timestamps.as_ref().map(|(idx, _)| *idx);

    let numeric: Vec<usize> = if options.fields.is_empty() {
        (0..table.columns.len())
            .filter(|&i| {
                Some(i) != ts_idx
                    && !is_identifier(&table.columns[i])
                    && !is_calendar(&table.columns[i])
                    && is_numeric_column(&table.column_data[i])
            })
            .collect()
    } else {
        options
            .fields
            .iter()
            .map(|f| {
                table
                    .columns
                    .iter()
                    .position(|c| c == f)
                    .ok_or_else(|| LoadError::MissingColumn(f.clone()))
            })
            .collect::<Result<_, _>>()?
    };

    let station_idx = match &options.station {
        Some(_) => Some(
            table
                .columns
                .iter()
                .position(|c| is_identifier(c))
                .ok_or_else(|| LoadError::MissingColumn("station_id".to_string()))?,
        ),
        None => None,
    };
    let year_idx = table.columns.iter().position(|c| c.eq_ignore_ascii_case("year"));

    let row_count = table.column_data.first().map(|c| c.len()).unwrap_or(0);
    let mut rows = Vec::with_capacity(row_count);
    let mut dropped = 0usize;
    let mut filtered = 0usize;

    for r in 0..row_count {
        let timestamp = timestamps.as_ref().and_then(|(_, ts)| ts[r]);

        if let (Some(wanted), Some(c)) = (&options.station, station_idx) {
            if !table.column_data[c][r].trim().eq_ignore_ascii_case(wanted.trim()) {
                filtered += 1;
                continue;
            }
        }
        let year = timestamp.and_then(year_of).or_else(|| {
            year_idx.and_then(|c| table.column_data[c][r].trim().parse::<f64>().ok().map(|y| y as i32))
        });
        if !options.year_in_range(year) {
            filtered += 1;
            continue;
        }

        let mut obs = Observation::new(timestamp);
        for &c in &numeric {
            obs.set(&table.columns[c], parse_measurement(&table.column_data[c][r], &options.sentinels));
        }
        if obs.is_blank() {
            dropped += 1;
            continue;
        }
        rows.push(obs);
    }

    if dropped > 0 {
        tracing::debug!("Dropped {dropped} blank rows");
    }
    if filtered > 0 {
        tracing::debug!("Filtered out {filtered} rows by station or year");
    }
    if rows.is_empty() {
        return Err(LoadError::Empty);
    }

    let fields = numeric.iter().map(|&c| table.columns[c].clone()).collect();
    Ok(Dataset::new(fields, rows))
}
