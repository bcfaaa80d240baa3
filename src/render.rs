//! Editable table surface.
//!
//! Every data cell becomes a field named `cell-{row}-{col}` (1-indexed, same
//! addressing as [`Grid`]). The derived column and the totals row are read-only
//! and carry no field name, so they can never be posted back.

use crate::grid::Grid;
use serde::Serialize;

/// Prefix of posted cell field names.
pub const FIELD_PREFIX: &str = "cell-";
/// Name of the hidden field holding the original file name.
pub const FILE_NAME_FIELD: &str = "fileName";

pub fn field_name(row: usize, col: usize) -> String {
    format!("{FIELD_PREFIX}{row}-{col}")
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RenderedField {
    /// `None` for read-only cells.
    pub name: Option<String>,
    pub value: String,
    pub readonly: bool,
    pub bold: bool,
    /// CSS colour, e.g. `#90EE90`.
    pub fill: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RenderedRow {
    pub row: usize,
    pub totals: bool,
    pub fields: Vec<RenderedField>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct RenderedTable {
    pub sheet_name: Option<String>,
    pub file_name: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<RenderedRow>,
}

impl RenderedTable {
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn field(&self, row: usize, col: usize) -> Option<&RenderedField> {
        self.rows
            .iter()
            .find(|r| r.row == row)
            .and_then(|r| r.fields.get(col.checked_sub(1)?))
    }

    pub fn editable_fields(&self) -> impl Iterator<Item = &RenderedField> {
        self.rows
            .iter()
            .flat_map(|r| r.fields.iter())
            .filter(|f| !f.readonly)
    }
}

/// Maps a grid to its editable surface. Empty grids give an empty table.
pub fn render(grid: &Grid, file_name: Option<&str>) -> RenderedTable {
    let mut table = RenderedTable {
        sheet_name: grid.sheet_name().map(str::to_string),
        file_name: file_name.map(str::to_string),
        ..Default::default()
    };
    if grid.is_empty() {
        return table;
    }

    let derived = grid.derived_column();
    let totals = grid.totals_row();

    for (idx, cells) in grid.rows().enumerate() {
        let row = idx + 1;
        if row == 1 {
            table.headers = cells.iter().map(|c| c.value.to_string()).collect();
            continue;
        }

        let is_totals = Some(row) == totals;
        let fields = cells
            .iter()
            .enumerate()
            .map(|(c, cell)| {
                let col = c + 1;
                let readonly = is_totals || Some(col) == derived;
                RenderedField {
                    name: (!readonly).then(|| field_name(row, col)),
                    value: cell.value.to_string(),
                    readonly,
                    bold: cell.style.bold,
                    fill: cell.style.fill.map(|f| f.to_hex()),
                }
            })
            .collect();

        table.rows.push(RenderedRow {
            row,
            totals: is_totals,
            fields,
        });
    }

    table
}
