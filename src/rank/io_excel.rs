use crate::rank::io_common::{Cell, Grid};
use crate::rank::*;

fn header_text(cell: &calamine::DataType) -> String {
    match cell {
        calamine::DataType::String(s) => s.trim().to_string(),
        calamine::DataType::Float(f) => f.to_string(),
        calamine::DataType::Int(i) => i.to_string(),
        calamine::DataType::Bool(b) => b.to_string(),
        _ => "".to_string(),
    }
}

fn read_cell(cell: &calamine::DataType, lineno: u64, column: &str) -> RankResult<Cell> {
    match cell {
        calamine::DataType::Empty => Ok(Cell::Empty),
        calamine::DataType::Float(f) => Ok(Cell::Number(*f)),
        calamine::DataType::Int(i) => Ok(Cell::Number(*i as f64)),
        calamine::DataType::Bool(b) => Ok(Cell::Bool(*b)),
        calamine::DataType::String(s) => Ok(Cell::Text(s.clone())),
        // Dates are kept as their serial number.
        calamine::DataType::DateTime(f) => Ok(Cell::Number(*f)),
        _ => WrongCellTypeSnafu {
            lineno,
            column,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}

/// Reads a worksheet (the first one unless a name is given) into a grid.
pub fn read_excel_grid(path: &str, worksheet: Option<&str>) -> RankResult<Grid> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = match worksheet {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?,
    }
    .context(OpeningExcelSnafu { path })?;

    let mut iter = wrange.rows();
    let header_row = iter.next().context(EmptyExcelSnafu { path })?;
    let header: Vec<String> = header_row.iter().map(header_text).collect();
    debug!("read_excel_grid: header: {:?}", header);

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let lineno = (idx + 2) as u64;
        let mut cells: Vec<Cell> = Vec::with_capacity(row.len());
        for (col_idx, elt) in row.iter().enumerate() {
            let column = header.get(col_idx).map(|s| s.as_str()).unwrap_or("");
            cells.push(read_cell(elt, lineno, column)?);
        }
        rows.push(cells);
    }
    info!("read_excel_grid: {} data rows in {:?}", rows.len(), path);
    Ok(Grid { header, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_converted() {
        let c = read_cell(&calamine::DataType::Int(3), 2, "A").unwrap();
        assert_eq!(c, Cell::Number(3.0));
        let c = read_cell(&calamine::DataType::String("Sí".to_string()), 2, "A").unwrap();
        assert_eq!(c, Cell::Text("Sí".to_string()));
        assert_eq!(
            read_cell(&calamine::DataType::Empty, 2, "A").unwrap(),
            Cell::Empty
        );
        let err = read_cell(
            &calamine::DataType::Error(calamine::CellErrorType::Div0),
            7,
            "A",
        )
        .unwrap_err();
        assert!(matches!(err, RankError::WrongCellType { lineno: 7, .. }));
    }

    #[test]
    fn header_cells_are_trimmed() {
        assert_eq!(
            header_text(&calamine::DataType::String(" LATITUD ".to_string())),
            "LATITUD"
        );
        assert_eq!(header_text(&calamine::DataType::Empty), "");
    }

    #[test]
    fn missing_workbook_is_a_load_error() {
        let err = read_excel_grid("does/not/exist.xlsx", None).unwrap_err();
        assert!(err.is_load_error());
    }
}
