//! Error types for the upload/edit/save round trip.

use thiserror::Error;

/// Errors raised while turning an uploaded workbook into an editable table and back.
#[derive(Error, Debug)]
pub enum Error {
    /// The upload carried no payload.
    #[error("File not selected.")]
    InvalidUpload,

    /// A save was requested but the session holds no uploaded workbook.
    #[error("No file uploaded.")]
    NoUpload,

    #[error("Unreadable spreadsheet: {0}")]
    UnreadableFormat(String),

    #[error("Column {column} is required but the sheet only has {width} columns")]
    MissingColumn { column: usize, width: usize },

    #[error("Cell ({row}, {col}) is outside the grid")]
    OutOfRange { row: usize, col: usize },

    #[error("Sum at cell ({row}, {col}) is too large to represent")]
    Overflow { row: usize, col: usize },

    #[error("Expected {expected} cells but got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Failed to write spreadsheet: {0}")]
    Encode(String),

    #[error("Failed to render page: {0}")]
    Template(String),
}

impl Error {
    /// Validation failures that are shown as a message on the upload view
    /// instead of an error page.
    pub fn is_user_message(&self) -> bool {
        matches!(self, Error::InvalidUpload | Error::NoUpload)
    }
}

impl From<calamine::Error> for Error {
    fn from(e: calamine::Error) -> Self {
        Error::UnreadableFormat(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for Error {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        Error::Encode(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_messages_match_the_upload_view() {
        assert_eq!(Error::InvalidUpload.to_string(), "File not selected.");
        assert_eq!(Error::NoUpload.to_string(), "No file uploaded.");
        assert!(Error::NoUpload.is_user_message());
        assert!(!Error::MissingColumn { column: 8, width: 3 }.is_user_message());
    }
}
