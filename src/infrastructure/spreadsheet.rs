use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, DataType, Reader};

use crate::domain::error::{AppError, Result};
use crate::domain::table::{Cell, DataTable};

/// Parse one uploaded spreadsheet blob into a `DataTable`.
///
/// The first worksheet is used; its first row supplies the column names.
/// Columns with a blank header are dropped. Format detection (xlsx/xls/ods)
/// is left to calamine.
pub fn read_table(data: &[u8]) -> Result<DataTable> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(data))
        .map_err(|e| AppError::InvalidInput(format!("Failed to open spreadsheet: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::InvalidInput("No worksheet found".to_string()))?
        .map_err(|e| AppError::InvalidInput(format!("Failed to read worksheet: {}", e)))?;

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| AppError::InvalidInput("Worksheet is empty".to_string()))?;

    // Keep only columns with a real header; remember their positions.
    let mut columns = Vec::new();
    let mut keep = Vec::new();
    for (index, cell) in header_row.iter().enumerate() {
        let name = header_text(cell);
        if !name.is_empty() {
            columns.push(name);
            keep.push(index);
        }
    }
    if columns.is_empty() {
        return Err(AppError::InvalidInput(
            "Worksheet has no header row".to_string(),
        ));
    }

    let mut table = DataTable::new(columns);
    for row in rows {
        let cells: Vec<Cell> = keep
            .iter()
            .map(|&i| row.get(i).map(convert_cell).unwrap_or(Cell::Empty))
            .collect();
        // Fully empty rows are export artifacts, not articles.
        if cells.iter().all(Cell::is_missing) {
            continue;
        }
        table.push_row(cells);
    }

    Ok(table)
}

fn header_text(cell: &Data) -> String {
    cell.as_string()
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn convert_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
    }
}
