use crate::cell::{Cell, CellValue};
use crate::error::{Error, Result};
use crate::grid::Grid;
use calamine::{Data, ExcelDateTime, Reader, open_workbook_auto_from_rs};
use chrono::Timelike;
use log::debug;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::io::Cursor;

/// Convert a calamine value to a grid value.
///
/// Numbers become decimals, text stays text, and everything else is kept in
/// its displayed form so the coercion rules see what a user would see. Dates
/// and durations are therefore text and never count towards a sum.
pub fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::Int(i) => CellValue::Number(Decimal::from(*i)),
        Data::Float(f) => float_value(*f),
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::text(if *b { "TRUE" } else { "FALSE" }),
        Data::DateTime(dt) => CellValue::Text(date_text(dt)),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

/// `2024-01-15`, `2024-01-15 13:30:00` or `36:15:00` for durations.
fn date_text(dt: &ExcelDateTime) -> String {
    if dt.is_duration() {
        if let Some(d) = dt.as_duration() {
            let secs = d.num_seconds();
            let sign = if secs < 0 { "-" } else { "" };
            let secs = secs.unsigned_abs();
            return format!("{sign}{}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60);
        }
    } else if let Some(t) = dt.as_datetime() {
        let format = if t.num_seconds_from_midnight() == 0 {
            "%Y-%m-%d"
        } else {
            "%Y-%m-%d %H:%M:%S"
        };
        return t.format(format).to_string();
    }
    dt.as_f64().to_string()
}

fn float_value(f: f64) -> CellValue {
    match Decimal::from_f64(f) {
        Some(d) => CellValue::Number(d),
        None => CellValue::Text(f.to_string()),
    }
}

/// Load the first sheet of a workbook held in memory.
///
/// xlsx, xlsm, xlsb, xls and ods are accepted. Grid addresses match the sheet's
/// own: a used range that starts at C4 still puts that cell at (4, 3).
///
/// # Examples
/// ```no_run
/// use sheet_tally::loader::from_xlsx_bytes;
///
/// let bytes = std::fs::read("data.xlsx").unwrap();
/// match from_xlsx_bytes(&bytes) {
///     Ok(grid) => println!("{} data rows", grid.height()),
///     Err(e) => eprintln!("Error loading workbook: {}", e),
/// }
/// ```
pub fn from_xlsx_bytes(bytes: &[u8]) -> Result<Grid> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| Error::UnreadableFormat("workbook has no sheets".to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::UnreadableFormat("workbook has no sheets".to_string()))??;

    let Some((end_row, end_col)) = range.end() else {
        debug!("sheet {sheet_name:?} is empty");
        return Ok(Grid::new().with_sheet_name(sheet_name));
    };

    let mut rows = Vec::with_capacity(end_row as usize + 1);
    for r in 0..=end_row {
        let row = (0..=end_col)
            .map(|c| {
                range
                    .get_value((r, c))
                    .map(|data| Cell::new(cell_value(data)))
                    .unwrap_or_default()
            })
            .collect();
        rows.push(row);
    }

    let grid = Grid::from_rows(rows).with_sheet_name(sheet_name);
    debug!(
        "decoded {:?}: {} columns, {} data rows",
        grid.sheet_name(),
        grid.width(),
        grid.height()
    );
    Ok(grid)
}
