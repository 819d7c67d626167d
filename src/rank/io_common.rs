// Projection of a raw sheet onto the provider table, and the dataset cache.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use sectional_ranking::builder::TableBuilder;

use crate::rank::*;

/// A cell as read by any of the input readers.
#[derive(PartialEq, Debug, Clone)]
pub enum Cell {
    Empty,
    Number(f64),
    Bool(bool),
    Text(String),
}

static EMPTY_CELL: Cell = Cell::Empty;

/// A sheet: the header row and the data rows, in file order.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Grid {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Transliterates an identifier to plain ASCII so that filters and joins do not
/// depend on how accents were encoded.
pub fn normalize_identifier(s: &str) -> String {
    deunicode::deunicode(s.trim())
}

fn format_number(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        format!("{}", f)
    }
}

fn find_column(header: &[String], column: &str) -> RankResult<usize> {
    header
        .iter()
        .position(|h| h == column)
        .context(MissingColumnSnafu { column })
}

// Line numbers are 1-based and count the header line.
fn read_number(cell: &Cell, lineno: u64, column: &str) -> RankResult<f64> {
    let res = match cell {
        Cell::Number(f) => Some(*f),
        Cell::Text(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match res {
        Some(f) if f.is_finite() => Ok(f),
        _ => WrongCellTypeSnafu {
            lineno,
            column,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}

fn read_indicator(
    cell: &Cell,
    lineno: u64,
    column: &str,
    treat_blank_as_zero: bool,
) -> RankResult<f64> {
    match cell {
        Cell::Bool(true) => Ok(1.0),
        Cell::Bool(false) => Ok(0.0),
        Cell::Empty if treat_blank_as_zero => Ok(0.0),
        Cell::Text(s) if s.trim().is_empty() && treat_blank_as_zero => Ok(0.0),
        Cell::Empty => BlankIndicatorCellSnafu { lineno, column }.fail(),
        Cell::Text(s) if s.trim().is_empty() => BlankIndicatorCellSnafu { lineno, column }.fail(),
        _ => read_number(cell, lineno, column),
    }
}

fn read_identifier(cell: &Cell, lineno: u64, column: &str) -> RankResult<String> {
    let res = match cell {
        Cell::Text(s) => normalize_identifier(s),
        Cell::Number(f) => format_number(*f),
        _ => "".to_string(),
    };
    if res.is_empty() {
        return WrongCellTypeSnafu {
            lineno,
            column,
            content: format!("{:?}", cell),
        }
        .fail();
    }
    Ok(res)
}

fn read_group(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Cell::Number(f) => Some(format_number(*f)),
        Cell::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Resolves the block of indicator columns between the first and the last
/// indicator (both included). Unnamed columns inside the block are ignored.
pub fn indicator_columns(header: &[String], source: &DataSource) -> RankResult<Vec<(usize, String)>> {
    let first = find_column(header, source.first_indicator())?;
    let last = find_column(header, source.last_indicator())?;
    ensure!(
        first <= last,
        InvertedIndicatorRangeSnafu {
            first: source.first_indicator(),
            last: source.last_indicator(),
        }
    );
    let mut res: Vec<(usize, String)> = Vec::new();
    for (idx, name) in header.iter().enumerate().take(last + 1).skip(first) {
        if name.is_empty() {
            warn!("indicator_columns: skipping unnamed column {}", idx + 1);
            continue;
        }
        ensure!(
            !res.iter().any(|(_, n)| n == name),
            DuplicateColumnSnafu { column: name }
        );
        res.push((idx, name.clone()));
    }
    Ok(res)
}

/// Projects a sheet onto {identifier, longitude, latitude, group, indicators}.
pub fn project_grid(grid: &Grid, source: &DataSource) -> RankResult<ProviderTable> {
    let header = &grid.header;
    debug!("project_grid: header: {:?}", header);
    let id_idx = find_column(header, source.identifier_column())?;
    let lon_idx = find_column(header, source.longitude_column())?;
    let lat_idx = find_column(header, source.latitude_column())?;
    let group_idx: Option<usize> = match source.group_column() {
        Some(g) => {
            let idx = header.iter().position(|h| h == g);
            if idx.is_none() {
                warn!("project_grid: group column {:?} not found, rows have no group", g);
            }
            idx
        }
        None => None,
    };
    let columns = indicator_columns(header, source)?;
    info!(
        "project_grid: {} indicator columns from {:?} to {:?}",
        columns.len(),
        source.first_indicator(),
        source.last_indicator()
    );

    let names: Vec<String> = columns.iter().map(|(_, n)| n.clone()).collect();
    let mut builder = TableBuilder::new(&names).context(RankingSnafu {})?;
    let treat_blank_as_zero = source.treat_blank_as_zero();

    for (idx, row) in grid.rows.iter().enumerate() {
        let lineno = (idx + 2) as u64;
        if row.iter().all(|c| *c == Cell::Empty) {
            debug!("project_grid: skipping empty line {}", lineno);
            continue;
        }
        let cell = |i: usize| row.get(i).unwrap_or(&EMPTY_CELL);

        let name = read_identifier(cell(id_idx), lineno, source.identifier_column())?;
        let longitude = read_number(cell(lon_idx), lineno, source.longitude_column())?;
        let latitude = read_number(cell(lat_idx), lineno, source.latitude_column())?;
        let group = group_idx.and_then(|i| read_group(cell(i)));

        let mut values: Vec<f64> = Vec::with_capacity(columns.len());
        for (col_idx, col_name) in columns.iter() {
            values.push(read_indicator(
                cell(*col_idx),
                lineno,
                col_name,
                treat_blank_as_zero,
            )?);
        }
        debug!("project_grid: line {}: {:?} {:?}", lineno, name, values);
        builder
            .add_row(&ProviderRow {
                name,
                longitude,
                latitude,
                group,
                values,
            })
            .context(RankingSnafu {})?;
    }
    Ok(builder.build())
}

/// Reads and projects one data source. Relative paths are resolved against `root`.
pub fn load_dataset(source: &DataSource, root: &Path) -> RankResult<ProviderTable> {
    let p: PathBuf = root.join(&source.file_path);
    let path = p.as_path().display().to_string();
    info!("Attempting to read provider file {:?}", path);
    let grid = match source.provider() {
        "xlsx" => io_excel::read_excel_grid(&path, source.excel_worksheet_name.as_deref()),
        "csv" => io_csv::read_csv_grid(&path),
        x => UnknownProviderSnafu { provider: x }.fail(),
    }?;
    project_grid(&grid, source)
}

#[derive(Eq, PartialEq, Debug, Clone, Hash)]
struct SourceKey {
    path: PathBuf,
    modified: Option<SystemTime>,
    source: DataSource,
}

/// Loaded tables, keyed by the identity of their source.
///
/// A source is loaded at most once while its file is unchanged. A new
/// modification time misses the cache, and `invalidate` drops entries
/// explicitly.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<SourceKey, Arc<ProviderTable>>,
    loads: usize,
}

impl DatasetCache {
    pub fn new() -> DatasetCache {
        DatasetCache::default()
    }

    fn key(source: &DataSource, root: &Path) -> SourceKey {
        let joined = root.join(&source.file_path);
        let path = fs::canonicalize(&joined).unwrap_or(joined);
        let modified = fs::metadata(&path).and_then(|m| m.modified()).ok();
        SourceKey {
            path,
            modified,
            source: source.clone(),
        }
    }

    pub fn get_or_load(&mut self, source: &DataSource, root: &Path) -> RankResult<Arc<ProviderTable>> {
        let key = DatasetCache::key(source, root);
        if let Some(table) = self.entries.get(&key) {
            debug!("DatasetCache: hit for {:?}", key.path);
            return Ok(table.clone());
        }
        let table = Arc::new(load_dataset(source, root)?);
        self.loads += 1;
        self.entries.insert(key, table.clone());
        Ok(table)
    }

    /// Drops every entry read from `path`. Returns the number of entries removed.
    pub fn invalidate(&mut self, path: &Path) -> usize {
        let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let before = self.entries.len();
        self.entries.retain(|k, _| k.path != target);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How many times a source was actually read.
    pub fn loads(&self) -> usize {
        self.loads
    }
}
