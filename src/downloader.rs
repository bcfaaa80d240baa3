use crate::cell::{CellStyle, CellValue};
use crate::error::{Error, Result};
use crate::grid::Grid;
use log::warn;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Color, Format, FormatPattern, Workbook, Worksheet};

/// Content type of the downloaded workbook.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

fn to_format(style: &CellStyle) -> Format {
    let mut format = Format::new();
    if style.bold {
        format = format.set_bold();
    }
    if let Some(fill) = style.fill {
        format = format
            .set_pattern(FormatPattern::Solid)
            .set_background_color(Color::RGB(fill.rgb()));
    }
    if let Some(num_format) = &style.number_format {
        format = format.set_num_format(num_format);
    }
    format
}

/// Convert a grid to XLSX format
///
/// Writes one worksheet with rust_xlsxwriter, named after the source sheet when known
/// and the name is valid for xlsx.
/// Bold, fill colour and number format hints are written as cell formats.
///
/// # Arguments
/// * `grid` - Reference to the grid to convert
///
/// # Returns
/// * `Result<Vec<u8>>` - XLSX file content as bytes or an error
///
/// # Examples
/// ```
/// use sheet_tally::grid::Grid;
/// use sheet_tally::downloader::to_xlsx;
///
/// let grid = Grid::from_values(vec![vec!["Name".into()], vec!["A".into()]]);
/// match to_xlsx(&grid) {
///     Ok(xlsx_data) => println!("XLSX generated: {} bytes", xlsx_data.len()),
///     Err(e) => eprintln!("Failed to generate XLSX: {}", e),
/// }
/// ```
pub fn to_xlsx(grid: &Grid) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();

    if let Some(name) = grid.sheet_name() {
        // xlsx caps names at 31 chars; other sources may not.
        if let Err(e) = worksheet.set_name(name) {
            warn!("keeping default sheet name, {:?} rejected: {}", name, e);
        }
    }

    for (r, cells) in grid.rows().enumerate() {
        for (c, cell) in cells.iter().enumerate() {
            let (row, col) = match (u32::try_from(r), u16::try_from(c)) {
                (Ok(row), Ok(col)) => (row, col),
                _ => return Err(Error::OutOfRange { row: r + 1, col: c + 1 }),
            };
            let plain = cell.style.is_plain();
            let format = to_format(&cell.style);

            match &cell.value {
                CellValue::Empty if plain => {}
                CellValue::Empty => {
                    worksheet.write_blank(row, col, &format)?;
                }
                CellValue::Text(s) if plain => {
                    worksheet.write_string(row, col, s)?;
                }
                CellValue::Text(s) => {
                    worksheet.write_string_with_format(row, col, s, &format)?;
                }
                CellValue::Number(n) => match n.to_f64() {
                    Some(f) if plain => {
                        worksheet.write_number(row, col, f)?;
                    }
                    Some(f) => {
                        worksheet.write_number_with_format(row, col, f, &format)?;
                    }
                    None => {
                        worksheet.write_string_with_format(row, col, &n.to_string(), &format)?;
                    }
                },
            }
        }
    }

    workbook.push_worksheet(worksheet);

    let buffer = workbook.save_to_buffer()?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Cell, DERIVED_FILL, DERIVED_NUMBER_FORMAT, TOTAL_FILL};
    use crate::loader::from_xlsx_bytes;
    use rust_decimal_macros::dec;

    #[test]
    fn writes_a_readable_workbook() {
        let grid = Grid::from_rows(vec![
            vec![Cell::new("Name"), Cell::new("Amount")],
            vec![Cell::new("A"), Cell::new(dec!(12.5))],
            vec![
                Cell::styled("Total", CellStyle::bold()),
                Cell::styled(dec!(12.5), CellStyle::bold().with_fill(TOTAL_FILL)),
            ],
        ])
        .with_sheet_name("Orders");

        let bytes = to_xlsx(&grid).unwrap();
        assert!(bytes.starts_with(b"PK"));

        let back = from_xlsx_bytes(&bytes).unwrap();
        assert_eq!(back.sheet_name(), Some("Orders"));
        assert_eq!(back.width(), 2);
        assert_eq!(back.get(2, 2).unwrap(), &CellValue::Number(dec!(12.5)));
        assert_eq!(back.get(3, 1).unwrap(), &CellValue::text("Total"));
    }

    fn styles_xml(bytes: &[u8]) -> String {
        use std::io::Read;

        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        let mut styles = String::new();
        archive
            .by_name("xl/styles.xml")
            .unwrap()
            .read_to_string(&mut styles)
            .unwrap();
        styles
    }

    #[test]
    fn presentation_hints_are_written() {
        let derived = CellStyle::default()
            .with_number_format(DERIVED_NUMBER_FORMAT)
            .with_fill(DERIVED_FILL);
        let grid = Grid::from_rows(vec![
            vec![Cell::new("Name"), Cell::new("Before taxing")],
            vec![Cell::new("A"), Cell::styled(dec!(110), derived)],
            vec![
                Cell::styled("Total", CellStyle::bold()),
                Cell::styled(dec!(100), CellStyle::bold().with_fill(TOTAL_FILL)),
            ],
        ]);

        let styles = styles_xml(&to_xlsx(&grid).unwrap());

        assert!(styles.contains("<b/>"));
        assert!(styles.contains("patternType=\"solid\""));
        assert!(styles.contains("FF90EE90"));
        assert!(styles.contains("FF5F9EA0"));
        // "0.00" is a built-in format and may be written by id instead of code.
        assert!(styles.contains("formatCode=\"0.00\"") || styles.contains("numFmtId=\"2\""));
    }

    #[test]
    fn overlong_sheet_name_falls_back_to_default() {
        let long_name = "Quarterly invoices for the northern region";
        let grid = Grid::from_values(vec![vec!["Name".into()], vec!["A".into()]])
            .with_sheet_name(long_name);

        let back = from_xlsx_bytes(&to_xlsx(&grid).unwrap()).unwrap();

        assert_eq!(back.sheet_name(), Some("Sheet1"));
        assert_eq!(back.get(2, 1).unwrap(), &CellValue::text("A"));
    }

    #[test]
    fn empty_grid_still_encodes() {
        let bytes = to_xlsx(&Grid::new()).unwrap();
        let back = from_xlsx_bytes(&bytes).unwrap();
        assert!(back.is_empty());
    }
}
