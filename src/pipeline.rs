//! Upload and save passes.
//!
//! Both passes start from the canonical uploaded bytes. Nothing computed by a
//! previous request is ever read back, so the derived column is always appended to
//! a grid that does not have one yet.

use crate::compute::{ColumnRoles, aggregate_row, derived_column};
use crate::downloader::to_xlsx;
use crate::edits::PostedForm;
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::loader::from_xlsx_bytes;
use crate::render::{RenderedTable, render};
use log::info;
use rust_decimal::Decimal;

/// Download name used when neither the form nor the session carries one.
pub const DEFAULT_FILE_NAME: &str = "workbook.xlsx";

#[derive(Debug)]
pub struct UploadOutcome {
    pub grid: Grid,
    pub table: RenderedTable,
    pub total: Decimal,
}

#[derive(Debug)]
pub struct SaveOutcome {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub grid: Grid,
    pub table: RenderedTable,
    /// Cell fields that were written into the grid.
    pub applied: usize,
}

/// decode → derived column → totals row → render.
pub fn process_upload(bytes: &[u8], file_name: &str, roles: &ColumnRoles) -> Result<UploadOutcome> {
    if bytes.is_empty() {
        return Err(Error::InvalidUpload);
    }

    let mut grid = from_xlsx_bytes(bytes)?;
    derived_column(&mut grid, roles)?;
    let total = aggregate_row(&mut grid, roles)?;
    let table = render(&grid, Some(file_name));

    info!(
        "processed upload {:?}: {} data rows, total {}",
        file_name,
        grid.height().saturating_sub(1),
        total.normalize()
    );

    Ok(UploadOutcome { grid, table, total })
}

/// decode canonical bytes → apply posted edits → derived column → encode (and render).
///
/// `fallback_name` is used when the form has no `fileName` field.
pub fn process_save<K, V>(
    canonical: &[u8],
    fields: impl IntoIterator<Item = (K, V)>,
    fallback_name: Option<&str>,
    roles: &ColumnRoles,
) -> Result<SaveOutcome>
where
    K: AsRef<str>,
    V: Into<String>,
{
    if canonical.is_empty() {
        return Err(Error::NoUpload);
    }

    let form = PostedForm::parse(fields);
    let mut grid = from_xlsx_bytes(canonical)?;
    let applied = form.apply(&mut grid);
    derived_column(&mut grid, roles)?;
    let bytes = to_xlsx(&grid)?;

    let file_name = form
        .file_name
        .filter(|name| !name.trim().is_empty())
        .or_else(|| fallback_name.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());

    info!(
        "saved {:?}: {} of {} posted cells applied, {} bytes",
        file_name,
        applied,
        form.edits.len(),
        bytes.len()
    );

    let table = render(&grid, Some(&file_name));

    Ok(SaveOutcome {
        bytes,
        file_name,
        grid,
        table,
        applied,
    })
}
