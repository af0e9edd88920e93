//! Raw table data structures

use chrono::NaiveDateTime;
use std::fmt;

/// Represents the first worksheet region of a usage export, untyped
#[derive(Debug, Clone)]
pub struct RawTable {
    pub sheet_name: String,
    /// Labels found on the first row of the used range
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// Build a table, padding every row to the widest one
    pub fn new(sheet_name: impl Into<String>, headers: Vec<String>, mut rows: Vec<RawRow>) -> Self {
        let width = rows
            .iter()
            .map(|r| r.cells.len())
            .chain(std::iter::once(headers.len()))
            .max()
            .unwrap_or(0);
        for row in &mut rows {
            row.cells.resize(width, CellValue::Empty);
        }
        let mut headers = headers;
        headers.resize(width, String::new());

        Self {
            sheet_name: sheet_name.into(),
            headers,
            rows,
        }
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Number of data rows (the label row is not counted)
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Remove data rows whose cells are all empty
    pub fn drop_blank_rows(&mut self) {
        self.rows.retain(|row| !row.is_blank());
    }

    /// Replace every empty cell with the nearest non-empty cell above it in
    /// the same column. Cells with nothing above them stay empty.
    pub fn forward_fill(&mut self) {
        let mut last_seen: Vec<Option<CellValue>> = vec![None; self.width()];

        for row in &mut self.rows {
            for (col, cell) in row.cells.iter_mut().enumerate() {
                if cell.is_empty() {
                    if let Some(previous) = &last_seen[col] {
                        *cell = previous.clone();
                    }
                } else {
                    last_seen[col] = Some(cell.clone());
                }
            }
        }
    }
}

/// A data row together with its position in the worksheet
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based worksheet row number
    pub sheet_row: u32,
    pub cells: Vec<CellValue>,
}

impl RawRow {
    pub fn new(sheet_row: u32, cells: Vec<CellValue>) -> Self {
        Self { sheet_row, cells }
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(CellValue::is_empty)
    }

    pub fn get(&self, col: usize) -> &CellValue {
        self.cells.get(col).unwrap_or(&CellValue::Empty)
    }
}

/// Cell value types
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
    Date(NaiveDateTime),
    Error(String),
}

impl CellValue {
    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Render the cell as a label, `None` when empty
    pub fn as_label(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Date(dt) => write!(f, "{}", dt.format("%d/%m/%Y")),
            CellValue::Error(e) => f.write_str(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_forward_fill() {
        let mut table = RawTable::new(
            "Sheet1",
            vec!["a".into(), "b".into()],
            vec![
                RawRow::new(2, vec![CellValue::Empty, text("x")]),
                RawRow::new(3, vec![CellValue::Number(1.0), CellValue::Empty]),
                RawRow::new(4, vec![CellValue::Empty, CellValue::Empty]),
                RawRow::new(5, vec![CellValue::Number(2.0), text("y")]),
                RawRow::new(6, vec![CellValue::Empty, CellValue::Empty]),
            ],
        );

        table.forward_fill();

        let col = |c: usize| -> Vec<CellValue> {
            table.rows.iter().map(|r| r.get(c).clone()).collect()
        };
        // No value above the first cell: stays empty
        assert_eq!(
            col(0),
            vec![
                CellValue::Empty,
                CellValue::Number(1.0),
                CellValue::Number(1.0),
                CellValue::Number(2.0),
                CellValue::Number(2.0),
            ]
        );
        assert_eq!(col(1), vec![text("x"), text("x"), text("x"), text("y"), text("y")]);
    }

    #[test]
    fn test_drop_blank_rows() {
        let mut table = RawTable::new(
            "Sheet1",
            vec!["a".into(), "b".into()],
            vec![
                RawRow::new(2, vec![text("x"), CellValue::Empty]),
                RawRow::new(3, Vec::new()),
                RawRow::new(4, vec![CellValue::Empty, CellValue::Empty]),
                RawRow::new(5, vec![CellValue::Empty, CellValue::Number(0.0)]),
            ],
        );

        table.drop_blank_rows();

        let kept: Vec<u32> = table.rows.iter().map(|r| r.sheet_row).collect();
        assert_eq!(kept, vec![2, 5]);
    }

    #[test]
    fn test_rows_padded_to_width() {
        let table = RawTable::new(
            "Sheet1",
            vec!["a".into()],
            vec![
                RawRow::new(2, vec![text("x"), text("y"), text("z")]),
                RawRow::new(3, vec![text("x")]),
            ],
        );

        assert_eq!(table.width(), 3);
        assert_eq!(table.height(), 2);
        assert_eq!(table.rows[1].cells.len(), 3);
        assert_eq!(table.headers[2], "");
        assert!(table.rows[1].get(2).is_empty());
        assert!(table.rows[1].get(10).is_empty());
    }

    #[test]
    fn test_labels() {
        assert_eq!(CellValue::Number(42.0).as_label().as_deref(), Some("42"));
        assert_eq!(CellValue::Number(2.5).as_label().as_deref(), Some("2.5"));
        assert_eq!(text("Zone A").as_label().as_deref(), Some("Zone A"));
        assert_eq!(CellValue::Empty.as_label(), None);
    }
}
