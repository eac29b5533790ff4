use std::collections::{HashMap, HashSet};

use crate::data::datetime::is_date_like;

/// Rows scanned when looking for the header.
pub const HEADER_SCAN_LINES: usize = 50;

/// Decode file bytes as UTF-8, falling back to Latin-1.
pub fn decode_text(content: Vec<u8>) -> String {
    match String::from_utf8(content) {
        Ok(text) => text,
        // Each Latin-1 byte maps to the same Unicode code point.
        Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
    }
}

fn is_label(cell: &str) -> bool {
    let trimmed = cell.trim();
    !trimmed.is_empty() && trimmed.parse::<f64>().is_err() && !is_date_like(trimmed)
}

/// Detect the header row of CSV records.
///
/// Buoy exports often carry a preamble (station metadata, units lines).
/// The header is the last row, among the first `max_lines`, that has the
/// most common width and consists only of non-empty labels. Falls back to 0.
pub fn detect_csv_header(rows: &[Vec<String>], max_lines: usize) -> usize {
    let scanned = &rows[..rows.len().min(max_lines)];

    let mut counts: HashMap<usize, usize> = HashMap::new();
    for row in scanned.iter().filter(|r| !r.is_empty()) {
        *counts.entry(row.len()).or_insert(0) += 1;
    }
    let most_common = counts
        .into_iter()
        .max_by_key(|&(len, c)| (c, len))
        .map(|(len, _)| len)
        .unwrap_or(0);

    (0..scanned.len())
        .rev()
        .find(|&i| {
            let row = &scanned[i];
            row.len() == most_common && row.iter().all(|c| is_label(c))
        })
        .unwrap_or(0)
}

/// Detect the header row of spreadsheet rows, where empty cells are `""`.
///
/// The header must fill every column used in the scanned region and contain
/// no numbers or dates.
pub fn detect_sheet_header(rows: &[Vec<String>], max_rows: usize) -> usize {
    let scanned = &rows[..rows.len().min(max_rows)];

    let used_cols = scanned
        .iter()
        .flat_map(|row| {
            row.iter()
                .enumerate()
                .filter(|(_, c)| !c.trim().is_empty())
                .map(|(i, _)| i)
        })
        .collect::<HashSet<_>>()
        .len();

    (0..scanned.len())
        .rev()
        .find(|&i| {
            let filled: Vec<&String> = scanned[i].iter().filter(|c| !c.trim().is_empty()).collect();
            filled.len() >= used_cols && filled.iter().all(|c| is_label(c))
        })
        .unwrap_or(0)
}
