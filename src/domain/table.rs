// ============================================================
// TABULAR DATA TYPES
// ============================================================
// In-memory representation of one parsed spreadsheet and of the
// merged dataset the report pipeline works on.

use serde::{Deserialize, Serialize};

/// A single spreadsheet cell after parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    /// Whether this cell holds the literal missing marker.
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the cell. Text parses with a comma-stripping
    /// fallback for values like "1,234.5"; anything unparseable is None.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => {
                let trimmed = s.trim();
                trimmed
                    .parse::<f64>()
                    .or_else(|_| trimmed.replace(',', "").parse::<f64>())
                    .ok()
            }
            Cell::Empty => None,
        }
    }

    /// Display form used when the cell is rendered as a label.
    pub fn display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
        }
    }
}

/// One uploaded spreadsheet blob, as received at the boundary.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub data: Vec<u8>,
}

/// Column-named table of rows. The column set is dynamic: uploads carry
/// whatever columns the monitoring agency exported that day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl DataTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Append a row, padding or truncating it to the current column count.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Empty);
        self.rows.push(row);
    }

    /// Append another table using outer-join-by-column-name semantics:
    /// columns unknown to `self` are added (first-seen order preserved)
    /// and back-filled with `Cell::Empty`; rows of `other` are re-aligned
    /// to the unified column order.
    pub fn append_outer(&mut self, other: DataTable) {
        for column in &other.columns {
            if !self.has_column(column) {
                self.columns.push(column.clone());
                for row in &mut self.rows {
                    row.push(Cell::Empty);
                }
            }
        }

        let mapping: Vec<Option<usize>> = self
            .columns
            .iter()
            .map(|c| other.column_index(c))
            .collect();

        for row in other.rows {
            let aligned: Vec<Cell> = mapping
                .iter()
                .map(|idx| match idx {
                    Some(i) => row.get(*i).cloned().unwrap_or(Cell::Empty),
                    None => Cell::Empty,
                })
                .collect();
            self.rows.push(aligned);
        }
    }

    /// Add a derived column with one value per existing row.
    pub fn add_column(&mut self, name: &str, values: Vec<Cell>) {
        debug_assert_eq!(values.len(), self.rows.len());
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    /// Drop rows not matching the predicate, preserving order.
    pub fn retain_rows<F>(&mut self, predicate: F)
    where
        F: FnMut(&Vec<Cell>) -> bool,
    {
        self.rows.retain(predicate);
    }

    /// Rewrite one column in place.
    pub fn map_column<F>(&mut self, index: usize, mut f: F)
    where
        F: FnMut(&Cell) -> Cell,
    {
        for row in &mut self.rows {
            if let Some(cell) = row.get_mut(index) {
                *cell = f(cell);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn test_push_row_pads_short_rows() {
        let mut table = DataTable::new(vec!["A".into(), "B".into(), "C".into()]);
        table.push_row(vec![text("x")]);
        assert_eq!(table.rows[0], vec![text("x"), Cell::Empty, Cell::Empty]);
    }

    #[test]
    fn test_append_outer_unions_columns() {
        let mut left = DataTable::new(vec!["A".into(), "B".into()]);
        left.push_row(vec![text("a1"), text("b1")]);

        let mut right = DataTable::new(vec!["B".into(), "C".into()]);
        right.push_row(vec![text("b2"), text("c2")]);

        left.append_outer(right);

        assert_eq!(left.columns, vec!["A", "B", "C"]);
        assert_eq!(left.rows[0], vec![text("a1"), text("b1"), Cell::Empty]);
        assert_eq!(left.rows[1], vec![Cell::Empty, text("b2"), text("c2")]);
    }

    #[test]
    fn test_append_outer_preserves_row_order() {
        let mut merged = DataTable::new(vec!["A".into()]);
        merged.push_row(vec![text("1")]);
        merged.push_row(vec![text("2")]);

        let mut second = DataTable::new(vec!["A".into()]);
        second.push_row(vec![text("3")]);
        merged.append_outer(second);

        let values: Vec<_> = merged.rows.iter().map(|r| r[0].display()).collect();
        assert_eq!(values, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_cell_number_parsing() {
        assert_eq!(text("100").as_number(), Some(100.0));
        assert_eq!(text(" 1,250.5 ").as_number(), Some(1250.5));
        assert_eq!(text("n/a").as_number(), None);
        assert_eq!(Cell::Empty.as_number(), None);
        assert_eq!(Cell::Number(3.5).as_number(), Some(3.5));
    }

    #[test]
    fn test_cell_display_trims_integer_floats() {
        assert_eq!(Cell::Number(42.0).display(), "42");
        assert_eq!(Cell::Number(42.5).display(), "42.5");
    }
}
