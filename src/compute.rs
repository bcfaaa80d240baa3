//! Derived column and totals row calculators.
//!
//! Both calculators read the source table through [`coerce_decimal`] and only ever
//! append: the derived column lands at `width + 1`, the totals row at
//! `row_count + 1`. Which columns feed them is a property of the source table and is
//! described by [`ColumnRoles`].

use crate::cell::{Cell, CellStyle, DERIVED_FILL, DERIVED_NUMBER_FORMAT, TOTAL_FILL};
use crate::coerce::coerce_decimal;
use crate::error::{Error, Result};
use crate::grid::Grid;
use log::debug;
use rust_decimal::Decimal;

/// Amount after adjustment.
pub const SOURCE_COLUMN_A: usize = 7;
/// Adjustment value.
pub const SOURCE_COLUMN_B: usize = 8;
pub const DERIVED_LABEL: &str = "Total Value before Taxing";
pub const TOTAL_LABEL: &str = "Total";

/// Column positions (1-indexed) the calculators depend on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnRoles {
    pub source_a: usize,
    pub source_b: usize,
    pub aggregate: usize,
}

impl Default for ColumnRoles {
    fn default() -> Self {
        ColumnRoles {
            source_a: SOURCE_COLUMN_A,
            source_b: SOURCE_COLUMN_B,
            aggregate: SOURCE_COLUMN_A,
        }
    }
}

fn require_column(grid: &Grid, column: usize) -> Result<()> {
    if column == 0 || column > grid.width() {
        return Err(Error::MissingColumn {
            column,
            width: grid.width(),
        });
    }
    Ok(())
}

fn derived_style() -> CellStyle {
    CellStyle::default()
        .with_number_format(DERIVED_NUMBER_FORMAT)
        .with_fill(DERIVED_FILL)
}

/// Appends the "before taxing" column: `source_a + source_b` for every data row.
///
/// A grid that already carries a derived column has it recomputed in place rather
/// than gaining a second one. A totals row, if present, gets an empty cell.
/// Returns the derived column index.
pub fn derived_column(grid: &mut Grid, roles: &ColumnRoles) -> Result<usize> {
    require_column(grid, roles.source_a)?;
    require_column(grid, roles.source_b)?;

    let totals_row = grid.totals_row();
    let target = grid.derived_column().unwrap_or(grid.width() + 1);
    let mut cells = Vec::with_capacity(grid.height());
    for row in 2..=grid.row_count() {
        if Some(row) == totals_row {
            cells.push(Cell::empty());
            continue;
        }
        let a = coerce_decimal(grid.get(row, roles.source_a)?);
        let b = coerce_decimal(grid.get(row, roles.source_b)?);
        let sum = a
            .checked_add(b)
            .ok_or(Error::Overflow { row, col: target })?;
        cells.push(Cell::styled(sum, derived_style()));
    }

    let col = match grid.derived_column() {
        Some(col) => {
            for (offset, cell) in cells.into_iter().enumerate() {
                let row = offset + 2;
                grid.set(row, col, cell.value)?;
                grid.set_style(row, col, cell.style)?;
            }
            col
        }
        None => {
            let col = grid.append_column(DERIVED_LABEL, cells)?;
            grid.mark_derived_column(col);
            col
        }
    };

    debug!("derived column {} over {} data rows", col, grid.data_rows().count());
    Ok(col)
}

/// Sum of the aggregate column over data rows, excluding any totals row.
///
/// Fails with [`Error::Overflow`] at the first row whose running sum no longer
/// fits a `Decimal`.
pub fn column_total(grid: &Grid, column: usize) -> Result<Decimal> {
    require_column(grid, column)?;
    grid.data_rows().try_fold(Decimal::ZERO, |total, row| {
        let value = coerce_decimal(grid.get(row, column)?);
        total
            .checked_add(value)
            .ok_or(Error::Overflow { row, col: column })
    })
}

/// Appends the bold "Total" row holding the aggregate column sum and returns the sum.
///
/// Running it again replaces the previous totals row instead of summing it.
pub fn aggregate_row(grid: &mut Grid, roles: &ColumnRoles) -> Result<Decimal> {
    let total = column_total(grid, roles.aggregate)?;

    let mut cells = vec![Cell::empty(); grid.width()];
    cells[0] = Cell::styled(TOTAL_LABEL, CellStyle::bold());
    cells[roles.aggregate - 1] = Cell::styled(total, CellStyle::bold().with_fill(TOTAL_FILL));

    match grid.totals_row() {
        Some(row) => {
            for (offset, cell) in cells.into_iter().enumerate() {
                let col = offset + 1;
                grid.set(row, col, cell.value)?;
                grid.set_style(row, col, cell.style)?;
            }
        }
        None => {
            let row = grid.append_row(cells)?;
            grid.mark_totals_row(row);
        }
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellValue;
    use rust_decimal_macros::dec;

    fn header() -> Vec<CellValue> {
        ["Name", "Qty", "Unit", "Code", "X", "Y", "Amount", "Tax"]
            .into_iter()
            .map(CellValue::from)
            .collect()
    }

    fn row(name: &str, amount: CellValue, tax: CellValue) -> Vec<CellValue> {
        vec![
            name.into(),
            dec!(1).into(),
            "u".into(),
            "c".into(),
            "x".into(),
            "y".into(),
            amount,
            tax,
        ]
    }

    fn sample() -> Grid {
        Grid::from_values(vec![
            header(),
            row("A", dec!(100).into(), dec!(10).into()),
            row("B", "12.5".into(), "abc".into()),
            row("C", CellValue::Empty, dec!(2.25).into()),
        ])
    }

    #[test]
    fn derived_column_sums_source_columns() {
        let mut grid = sample();
        let before = grid.clone();

        let col = derived_column(&mut grid, &ColumnRoles::default()).unwrap();

        assert_eq!(col, 9);
        assert_eq!(grid.width(), 9);
        assert_eq!(grid.derived_column(), Some(9));
        assert_eq!(grid.get(1, 9).unwrap(), &CellValue::text(DERIVED_LABEL));
        assert_eq!(grid.get(2, 9).unwrap(), &CellValue::Number(dec!(110)));
        assert_eq!(grid.get(3, 9).unwrap(), &CellValue::Number(dec!(12.5)));
        assert_eq!(grid.get(4, 9).unwrap(), &CellValue::Number(dec!(2.25)));

        for r in 1..=before.row_count() {
            for c in 1..=before.width() {
                assert_eq!(grid.get(r, c).unwrap(), before.get(r, c).unwrap());
            }
        }

        let style = &grid.cell(2, 9).unwrap().style;
        assert_eq!(style.number_format.as_deref(), Some(DERIVED_NUMBER_FORMAT));
        assert_eq!(style.fill, Some(DERIVED_FILL));
    }

    #[test]
    fn derived_column_twice_does_not_duplicate() {
        let mut grid = sample();
        let roles = ColumnRoles::default();
        derived_column(&mut grid, &roles).unwrap();
        grid.set(2, 8, "20".into()).unwrap();

        let col = derived_column(&mut grid, &roles).unwrap();

        assert_eq!(col, 9);
        assert_eq!(grid.width(), 9);
        assert_eq!(grid.get(2, 9).unwrap(), &CellValue::Number(dec!(120)));
    }

    #[test]
    fn narrow_table_is_missing_column() {
        let mut grid = Grid::from_values(vec![
            vec!["a".into(), "b".into()],
            vec![dec!(1).into(), dec!(2).into()],
        ]);
        let err = derived_column(&mut grid, &ColumnRoles::default()).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { column: 7, width: 2 }));
        assert_eq!(grid.width(), 2);

        let err = aggregate_row(&mut grid, &ColumnRoles::default()).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { .. }));
        assert_eq!(grid.row_count(), 2);
    }

    #[test]
    fn aggregate_row_sums_and_styles() {
        let mut grid = sample();
        let roles = ColumnRoles::default();
        derived_column(&mut grid, &roles).unwrap();

        let total = aggregate_row(&mut grid, &roles).unwrap();

        assert_eq!(total, dec!(112.5));
        assert_eq!(grid.row_count(), 5);
        assert_eq!(grid.totals_row(), Some(5));
        assert_eq!(grid.get(5, 1).unwrap(), &CellValue::text(TOTAL_LABEL));
        assert_eq!(grid.get(5, 7).unwrap(), &CellValue::Number(dec!(112.5)));
        assert_eq!(grid.get(5, 2).unwrap(), &CellValue::Empty);
        assert_eq!(grid.get(5, 9).unwrap(), &CellValue::Empty);
        assert!(grid.cell(5, 1).unwrap().style.bold);
        let style = &grid.cell(5, 7).unwrap().style;
        assert!(style.bold);
        assert_eq!(style.fill, Some(TOTAL_FILL));
    }

    #[test]
    fn aggregate_row_excludes_previous_total() {
        let mut grid = sample();
        let roles = ColumnRoles::default();
        aggregate_row(&mut grid, &roles).unwrap();
        grid.set(2, 7, dec!(200).into()).unwrap();

        let total = aggregate_row(&mut grid, &roles).unwrap();

        assert_eq!(total, dec!(212.5));
        assert_eq!(grid.row_count(), 5);
    }

    #[test]
    fn derived_after_totals_leaves_totals_blank() {
        let mut grid = sample();
        let roles = ColumnRoles::default();
        aggregate_row(&mut grid, &roles).unwrap();
        derived_column(&mut grid, &roles).unwrap();
        assert_eq!(grid.get(5, 9).unwrap(), &CellValue::Empty);
    }

    #[test]
    fn header_only_table_totals_zero() {
        let mut grid = Grid::from_values(vec![header()]);
        let roles = ColumnRoles::default();
        derived_column(&mut grid, &roles).unwrap();
        let total = aggregate_row(&mut grid, &roles).unwrap();
        assert_eq!(total, Decimal::ZERO);
        assert_eq!(grid.row_count(), 2);
    }

    #[test]
    fn custom_roles() {
        let mut grid = Grid::from_values(vec![
            vec!["a".into(), "b".into()],
            vec![dec!(1).into(), dec!(2).into()],
        ]);
        let roles = ColumnRoles {
            source_a: 1,
            source_b: 2,
            aggregate: 2,
        };
        derived_column(&mut grid, &roles).unwrap();
        assert_eq!(grid.get(2, 3).unwrap(), &CellValue::Number(dec!(3)));
        assert_eq!(aggregate_row(&mut grid, &roles).unwrap(), dec!(2));
    }

    #[test]
    fn oversized_sums_are_errors() {
        let big = dec!(50000000000000000000000000000);
        let mut grid = Grid::from_values(vec![
            header(),
            row("A", big.into(), big.into()),
        ]);
        let roles = ColumnRoles::default();

        let err = derived_column(&mut grid, &roles).unwrap_err();
        assert!(matches!(err, Error::Overflow { row: 2, col: 9 }));
        assert_eq!(grid.width(), 8);

        let mut grid = Grid::from_values(vec![
            header(),
            row("A", big.into(), dec!(0).into()),
            row("B", big.into(), dec!(0).into()),
        ]);
        let err = aggregate_row(&mut grid, &roles).unwrap_err();
        assert!(matches!(err, Error::Overflow { row: 3, col: 7 }));
        assert_eq!(grid.totals_row(), None);
    }
}
