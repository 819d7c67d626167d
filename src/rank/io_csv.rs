// Primitives for reading CSV files.

use crate::rank::io_common::{Cell, Grid};
use crate::rank::*;

fn read_cell(s: &str) -> Cell {
    let t = s.trim();
    if t.is_empty() {
        Cell::Empty
    } else if let Ok(f) = t.parse::<f64>() {
        Cell::Number(f)
    } else {
        Cell::Text(s.to_string())
    }
}

/// Reads a CSV file into a grid. The first line is the header.
pub fn read_csv_grid(path: &str) -> RankResult<Grid> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(OpeningCsvSnafu { path })?;
    let mut records = rdr.into_records();

    let header: Vec<String> = match records.next() {
        Some(line_r) => line_r
            .context(CsvLineParseSnafu { lineno: 1_u64 })?
            .iter()
            .map(|s| s.trim().trim_start_matches('\u{feff}').to_string())
            .collect(),
        None => return EmptyCsvSnafu { path }.fail(),
    };
    debug!("read_csv_grid: header: {:?}", header);

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        let lineno = (idx + 2) as u64;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        rows.push(line.iter().map(read_cell).collect());
    }
    info!("read_csv_grid: {} data rows in {:?}", rows.len(), path);
    Ok(Grid { header, rows })
}
