use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Light green used behind the aggregate total.
pub const TOTAL_FILL: Fill = Fill(0x90EE90);
/// Cadet blue used behind derived values.
pub const DERIVED_FILL: Fill = Fill(0x5F9EA0);
/// Number format written for derived values.
pub const DERIVED_NUMBER_FORMAT: &str = "0.00";

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(Decimal),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl From<Decimal> for CellValue {
    fn from(d: Decimal) -> Self {
        CellValue::Number(d)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{}", n.normalize()),
        }
    }
}

/// Solid fill colour as `0xRRGGBB`.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Fill(pub u32);

impl Fill {
    pub fn rgb(&self) -> u32 {
        self.0
    }

    /// CSS form, e.g. `#90EE90`.
    pub fn to_hex(&self) -> String {
        format!("#{:06X}", self.0 & 0xFF_FFFF)
    }
}

/// Presentation hints. Written by the calculators, read only by the renderer and
/// the writer; never consulted by computation.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct CellStyle {
    pub bold: bool,
    pub fill: Option<Fill>,
    pub number_format: Option<String>,
}

impl CellStyle {
    pub fn is_plain(&self) -> bool {
        !self.bold && self.fill.is_none() && self.number_format.is_none()
    }

    pub fn bold() -> Self {
        CellStyle {
            bold: true,
            ..Default::default()
        }
    }

    pub fn with_fill(mut self, fill: Fill) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn with_number_format(mut self, format: &str) -> Self {
        self.number_format = Some(format.to_string());
        self
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct Cell {
    pub value: CellValue,
    pub style: CellStyle,
}

impl Cell {
    pub fn new(value: impl Into<CellValue>) -> Self {
        Cell {
            value: value.into(),
            style: CellStyle::default(),
        }
    }

    pub fn styled(value: impl Into<CellValue>, style: CellStyle) -> Self {
        Cell {
            value: value.into(),
            style,
        }
    }

    pub fn empty() -> Self {
        Cell::default()
    }
}
