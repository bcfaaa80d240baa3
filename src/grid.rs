use crate::cell::{Cell, CellStyle, CellValue};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// First-sheet table. Row 1 is the header row, rows `2..=height()+1` are data rows.
/// Rows and columns are 1-indexed and every row has `width()` cells.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct Grid {
    sheet_name: Option<String>,
    width: usize,
    rows: Vec<Vec<Cell>>,
    derived_column: Option<usize>,
    totals_row: Option<usize>,
}

impl Grid {
    pub fn new() -> Self {
        Grid::default()
    }

    /// Builds a grid from raw rows, padding short rows with empty cells.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize_with(width, Cell::empty);
                row
            })
            .collect();

        Grid {
            sheet_name: None,
            width,
            rows,
            derived_column: None,
            totals_row: None,
        }
    }

    /// Convenience constructor over plain values.
    pub fn from_values(rows: Vec<Vec<CellValue>>) -> Self {
        Grid::from_rows(
            rows.into_iter()
                .map(|row| row.into_iter().map(Cell::new).collect())
                .collect(),
        )
    }

    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = Some(name.into());
        self
    }

    pub fn sheet_name(&self) -> Option<&str> {
        self.sheet_name.as_deref()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows below the header, including an appended totals row.
    pub fn height(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    /// Total row count, header included.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.width == 0
    }

    /// Column appended by the derived-column calculator, if any.
    pub fn derived_column(&self) -> Option<usize> {
        self.derived_column
    }

    /// Row appended by the aggregate calculator, if any.
    pub fn totals_row(&self) -> Option<usize> {
        self.totals_row
    }

    pub(crate) fn mark_derived_column(&mut self, col: usize) {
        self.derived_column = Some(col);
    }

    pub(crate) fn mark_totals_row(&mut self, row: usize) {
        self.totals_row = Some(row);
    }

    /// Data rows in order, skipping the header and any totals row.
    pub fn data_rows(&self) -> impl Iterator<Item = usize> + '_ {
        (2..=self.row_count()).filter(move |r| Some(*r) != self.totals_row)
    }

    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row >= 1 && col >= 1 && row <= self.row_count() && col <= self.width
    }

    pub fn cell(&self, row: usize, col: usize) -> Result<&Cell> {
        if !self.in_bounds(row, col) {
            return Err(Error::OutOfRange { row, col });
        }
        Ok(&self.rows[row - 1][col - 1])
    }

    pub fn get(&self, row: usize, col: usize) -> Result<&CellValue> {
        self.cell(row, col).map(|cell| &cell.value)
    }

    /// Replaces a cell value, keeping its style.
    pub fn set(&mut self, row: usize, col: usize, value: CellValue) -> Result<()> {
        if !self.in_bounds(row, col) {
            return Err(Error::OutOfRange { row, col });
        }
        self.rows[row - 1][col - 1].value = value;
        Ok(())
    }

    pub fn set_style(&mut self, row: usize, col: usize, style: CellStyle) -> Result<()> {
        if !self.in_bounds(row, col) {
            return Err(Error::OutOfRange { row, col });
        }
        self.rows[row - 1][col - 1].style = style;
        Ok(())
    }

    /// Adds a column at `width() + 1`. `cells` holds one entry per row below the header.
    /// Nothing changes unless the whole column fits.
    pub fn append_column(&mut self, label: impl Into<CellValue>, cells: Vec<Cell>) -> Result<usize> {
        if cells.len() != self.height() {
            return Err(Error::ShapeMismatch {
                expected: self.height(),
                actual: cells.len(),
            });
        }

        if self.rows.is_empty() {
            self.rows.push(Vec::new());
        }
        self.rows[0].push(Cell::new(label));
        for (row, cell) in self.rows[1..].iter_mut().zip(cells) {
            row.push(cell);
        }
        self.width += 1;

        Ok(self.width)
    }

    /// Adds a row at `row_count() + 1`, padding with empty cells up to `width()`.
    pub fn append_row(&mut self, mut cells: Vec<Cell>) -> Result<usize> {
        if cells.len() > self.width {
            return Err(Error::ShapeMismatch {
                expected: self.width,
                actual: cells.len(),
            });
        }

        cells.resize_with(self.width, Cell::empty);
        self.rows.push(cells);

        Ok(self.rows.len())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }
}
