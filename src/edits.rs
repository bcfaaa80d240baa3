use crate::cell::CellValue;
use crate::grid::Grid;
use crate::render::FILE_NAME_FIELD;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

lazy_static! {
    static ref CELL_FIELD_REGEX: Regex = Regex::new(r"^cell-(\d+)-(\d+)$").unwrap();
}

/// A posted cell value addressed by its field name.
#[derive(Debug, Clone, PartialEq)]
pub struct CellEdit {
    pub row: usize,
    pub col: usize,
    pub value: String,
}

/// A posted form split into cell edits and the file name reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostedForm {
    pub edits: Vec<CellEdit>,
    pub file_name: Option<String>,
    /// Keys that were neither cell fields nor the file name.
    pub ignored: usize,
}

/// Parses `cell-{row}-{col}` into 1-indexed coordinates.
pub fn parse_field_name(name: &str) -> Option<(usize, usize)> {
    let caps = CELL_FIELD_REGEX.captures(name)?;
    let row = caps[1].parse::<usize>().ok()?;
    let col = caps[2].parse::<usize>().ok()?;
    if row == 0 || col == 0 {
        return None;
    }
    Some((row, col))
}

impl PostedForm {
    pub fn parse<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut form = PostedForm::default();

        for (key, value) in fields {
            let key = key.as_ref();
            if key == FILE_NAME_FIELD {
                form.file_name = Some(value.into());
            } else if let Some((row, col)) = parse_field_name(key) {
                form.edits.push(CellEdit {
                    row,
                    col,
                    value: value.into(),
                });
            } else {
                debug!("ignoring posted field {key:?}");
                form.ignored += 1;
            }
        }

        form
    }

    /// Writes every in-bounds edit into `grid` as text; stale or out-of-range
    /// fields are skipped. Returns the number of cells written.
    pub fn apply(&self, grid: &mut Grid) -> usize {
        let mut applied = 0;
        for edit in &self.edits {
            match grid.set(edit.row, edit.col, CellValue::Text(edit.value.clone())) {
                Ok(()) => applied += 1,
                Err(e) => debug!("skipping edit: {e}"),
            }
        }
        applied
    }
}

/// Applies posted fields to a freshly decoded grid and hands back the file name.
pub fn apply_edits<K, V>(
    grid: &mut Grid,
    fields: impl IntoIterator<Item = (K, V)>,
) -> (usize, Option<String>)
where
    K: AsRef<str>,
    V: Into<String>,
{
    let form = PostedForm::parse(fields);
    (form.apply(grid), form.file_name)
}
