/*!
# Sheet Tally

Upload a spreadsheet, get it back with a "before taxing" column and a totals row,
edit it in the browser and download the edited workbook.

## Overview

The first sheet of an uploaded workbook is read into a [`Grid`]. Two calculators
extend it:

- the derived column, appended after the last column, holds
  `amount after adjustment + adjustment value` (columns 7 and 8 by default) for
  every data row;
- the totals row, appended after the last row, holds `"Total"` in column 1 and the
  sum of column 7 (bold, light green).

The augmented grid is rendered as a form with one `cell-{row}-{col}` field per data
cell. The derived column and the totals row are read-only.

## Round trip

Only the original upload is kept between requests, in a per-session slot. Saving
re-decodes those canonical bytes, applies the posted cell fields, recomputes the
derived column and returns the result as an `.xlsx` attachment. Computed output is
never read back, so the derived column cannot pile up across saves.

## Modules

- **cell**: cell values and presentation hints
- **grid**: the addressable table
- **coerce**: fallback-to-zero decimal reading of cells
- **compute**: derived column and totals row
- **render**: editable table surface and field naming
- **edits**: posted form decoding
- **loader**: workbook decoding (calamine)
- **downloader**: workbook encoding (rust_xlsxwriter)
- **pipeline**: upload and save passes
- **session**, **config**, **app**: web server (feature `web`)

## Routes

- `GET /upload` - Upload form
- `POST /upload` - Multipart upload (`file`), renders the editable table
- `POST /save` - Posted cells and `fileName`, returns the edited workbook
*/

pub mod cell;
pub mod coerce;
pub mod compute;
pub mod downloader;
pub mod edits;
pub mod error;
pub mod grid;
pub mod loader;
pub mod pipeline;
pub mod render;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod config;
#[cfg(feature = "web")]
pub mod session;

pub use cell::{Cell, CellStyle, CellValue, Fill};
pub use coerce::coerce_decimal;
pub use compute::{ColumnRoles, aggregate_row, derived_column};
pub use edits::{PostedForm, apply_edits};
pub use error::{Error, Result};
pub use grid::Grid;
pub use pipeline::{SaveOutcome, UploadOutcome, process_save, process_upload};
pub use render::{RenderedTable, render};
