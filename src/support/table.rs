//! Interpolation over digitized chart tables.
//!
//! A [`DataTable`] holds the rows of a digitized flight manual chart. Each row
//! is an ordered tuple of input values followed by a single output value.
//! Tables with one, two, or three inputs are interpolated linearly,
//! bilinearly, or trilinearly. Inputs outside the sampled range are refused
//! (reported as [`Value::OffscaleLow`] or [`Value::OffscaleHigh`]) unless the
//! caller asks for that dimension to be clamped.
//!
//! # Example
//!
//! ```
//! use told_models::support::{table::{Clamping, DataTable}, value::Value};
//!
//! let table = DataTable::from_csv("weight,value\n1000,100\n2000,200\n").unwrap();
//!
//! assert_eq!(table.value(&[1500.0]), Value::Computed(150.0));
//! assert_eq!(table.value(&[500.0]), Value::OffscaleLow);
//! assert_eq!(
//!     table.value_clamped(&[500.0], &[Clamping::Low]),
//!     Value::Computed(100.0),
//! );
//! ```

mod csv;
mod error;
mod grid;

use std::{fs, path::Path};

use crate::support::value::Value;

pub use error::TableError;

use grid::GridIndex;

/// Tolerance for treating a query as an exact hit on a table row.
const EXACT_MATCH_TOLERANCE: f64 = 1e-10;

/// How an input outside a dimension's sampled range is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Clamping {
    /// Refuse values outside the range.
    #[default]
    None,
    /// Clamp values below the minimum; refuse values above the maximum.
    Low,
    /// Clamp values above the maximum; refuse values below the minimum.
    High,
    /// Clamp at both ends.
    Both,
}

impl Clamping {
    fn clamps_low(self) -> bool {
        matches!(self, Self::Low | Self::Both)
    }

    fn clamps_high(self) -> bool {
        matches!(self, Self::High | Self::Both)
    }
}

/// A digitized chart: rows of `n_inputs` inputs followed by one output.
///
/// Tables are immutable after construction and cheap to share behind an
/// [`Arc`](std::sync::Arc).
#[derive(Debug, Clone)]
pub struct DataTable {
    rows: Vec<Vec<f64>>,
    n_inputs: usize,
    mins: Vec<f64>,
    maxs: Vec<f64>,
    /// Rows sorted by input, for one-input tables.
    sorted: Vec<(f64, f64)>,
    grid: GridIndex,
}

impl DataTable {
    /// Creates a table from rows of inputs followed by an output.
    ///
    /// # Errors
    ///
    /// Returns a [`TableError`] if there are no rows, if rows differ in width
    /// or have fewer than two columns, or if any value is not finite.
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self, TableError> {
        let width = rows.first().ok_or(TableError::Empty)?.len();
        for (row_index, row) in rows.iter().enumerate() {
            if row.len() < 2 {
                return Err(TableError::TooNarrow {
                    row: row_index,
                    width: row.len(),
                });
            }
            if row.len() != width {
                return Err(TableError::RaggedRow {
                    row: row_index,
                    width: row.len(),
                    expected: width,
                });
            }
            if let Some(column) = row.iter().position(|x| !x.is_finite()) {
                return Err(TableError::NonFinite {
                    row: row_index,
                    column,
                });
            }
        }

        let n_inputs = width - 1;
        let (mins, maxs) = (0..n_inputs)
            .map(|dim| {
                rows.iter()
                    .map(|row| row[dim])
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
                        (lo.min(x), hi.max(x))
                    })
            })
            .unzip();

        let sorted = if n_inputs == 1 {
            let mut sorted: Vec<_> = rows.iter().map(|row| (row[0], row[1])).collect();
            sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
            sorted
        } else {
            Vec::new()
        };

        let grid = if n_inputs >= 2 {
            GridIndex::new(&rows, n_inputs)
        } else {
            GridIndex::default()
        };

        Ok(Self {
            rows,
            n_inputs,
            mins,
            maxs,
            sorted,
            grid,
        })
    }

    /// Parses a table from comma-separated text.
    ///
    /// Blank lines and lines with non-numeric fields (such as headers) are skipped.
    ///
    /// # Errors
    ///
    /// Returns a [`TableError`] if the parsed rows do not form a valid table.
    pub fn from_csv(text: &str) -> Result<Self, TableError> {
        Self::new(csv::parse_rows(text))
    }

    /// Reads and parses a table file.
    ///
    /// # Errors
    ///
    /// Returns a [`TableError`] if the file cannot be read or is not a valid table.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_csv(&text)?;
        tracing::debug!(
            ?path,
            rows = table.rows.len(),
            inputs = table.n_inputs,
            "loaded table"
        );
        Ok(table)
    }

    /// Checks that the table has the number of inputs its consumer expects.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Dimensionality`] on a mismatch.
    pub fn expect_inputs(self, expected: usize) -> Result<Self, TableError> {
        if self.n_inputs == expected {
            Ok(self)
        } else {
            Err(TableError::Dimensionality {
                expected,
                actual: self.n_inputs,
            })
        }
    }

    /// Number of input columns.
    pub fn n_inputs(&self) -> usize {
        self.n_inputs
    }

    /// The table's rows, each with the output in the last column.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Smallest sampled value of an input dimension.
    pub fn min(&self, dimension: usize) -> Option<f64> {
        self.mins.get(dimension).copied()
    }

    /// Largest sampled value of an input dimension.
    pub fn max(&self, dimension: usize) -> Option<f64> {
        self.maxs.get(dimension).copied()
    }

    /// Interpolates the output without clamping any dimension.
    pub fn value(&self, inputs: &[f64]) -> Value<f64> {
        self.value_clamped(inputs, &[])
    }

    /// Interpolates the output, clamping dimensions as requested.
    ///
    /// `clamping[i]` applies to input `i`; missing entries default to
    /// [`Clamping::None`]. Tables with more than three inputs can only be
    /// queried at sampled points; other queries are [`Value::OffscaleHigh`].
    /// A wrong number of inputs or a `NaN` input is [`Value::Invalid`].
    pub fn value_clamped(&self, inputs: &[f64], clamping: &[Clamping]) -> Value<f64> {
        if inputs.len() != self.n_inputs || inputs.iter().any(|x| x.is_nan()) {
            return Value::Invalid;
        }

        let query = match self.clamp(inputs, clamping) {
            Ok(query) => query,
            Err(state) => return state,
        };

        if let Some(row) = self.exact_match(&query) {
            return Value::Computed(row[self.n_inputs]);
        }

        match self.n_inputs {
            1 => self.linear(query[0]),
            2 | 3 => match self.grid.interpolate(&self.rows, &query) {
                Some(output) => Value::finite(output),
                None => Value::OffscaleHigh,
            },
            _ => Value::OffscaleHigh,
        }
    }

    /// Applies per-dimension clamping, or reports the first offscale dimension.
    fn clamp(&self, inputs: &[f64], clamping: &[Clamping]) -> Result<Vec<f64>, Value<f64>> {
        inputs
            .iter()
            .enumerate()
            .map(|(dim, &x)| {
                let mode = clamping.get(dim).copied().unwrap_or_default();
                let (lo, hi) = (self.mins[dim], self.maxs[dim]);
                if x < lo {
                    if mode.clamps_low() {
                        Ok(lo)
                    } else {
                        Err(Value::OffscaleLow)
                    }
                } else if x > hi {
                    if mode.clamps_high() {
                        Ok(hi)
                    } else {
                        Err(Value::OffscaleHigh)
                    }
                } else {
                    Ok(x)
                }
            })
            .collect()
    }

    fn exact_match(&self, query: &[f64]) -> Option<&Vec<f64>> {
        self.rows.iter().find(|row| {
            row.iter()
                .zip(query)
                .all(|(a, b)| (a - b).abs() < EXACT_MATCH_TOLERANCE)
        })
    }

    /// Linear interpolation between the nearest rows at or below and at or
    /// above `x`.
    fn linear(&self, x: f64) -> Value<f64> {
        let lower = self.sorted.iter().rev().find(|(input, _)| *input <= x);
        let upper = self.sorted.iter().find(|(input, _)| *input >= x);

        match (lower, upper) {
            (None, _) => Value::OffscaleLow,
            (_, None) => Value::OffscaleHigh,
            (Some(&(x0, y0)), Some(&(x1, y1))) => {
                if x1 == x0 {
                    Value::Computed(y0)
                } else {
                    Value::finite(y0 + (y1 - y0) * (x - x0) / (x1 - x0))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn linear_table() -> DataTable {
        DataTable::new(vec![vec![1000.0, 100.0], vec![2000.0, 200.0]]).unwrap()
    }

    /// A slice of a takeoff ground-roll chart: weight, altitude, temperature.
    ///
    /// The ISA temperature samples only exist at their own altitude, so the
    /// grid is sparse.
    fn sparse_takeoff_table() -> DataTable {
        DataTable::from_csv(
            "weight_lb,pressure_alt_ft,oat_c,value\n\
             5500,6000,20,3520\n\
             5500,6000,30,4380\n\
             5500,7000,20,3700\n\
             5500,7000,30,4600\n\
             6000,6000,3.1128,3350\n\
             6000,6000,20,3780\n\
             6000,6000,30,4700\n\
             6000,7000,1.1316,3420\n\
             6000,7000,20,3960\n\
             6000,7000,30,4905\n",
        )
        .unwrap()
    }

    #[test]
    fn one_dimensional_interpolation() {
        let table = linear_table();
        assert_eq!(table.value(&[1500.0]), Value::Computed(150.0));
        assert_eq!(table.value(&[500.0]), Value::OffscaleLow);
        assert_eq!(table.value(&[2500.0]), Value::OffscaleHigh);
        assert_eq!(
            table.value_clamped(&[500.0], &[Clamping::Low]),
            Value::Computed(100.0)
        );
        assert_eq!(
            table.value_clamped(&[2500.0], &[Clamping::Low]),
            Value::OffscaleHigh
        );
        assert_eq!(
            table.value_clamped(&[2500.0], &[Clamping::High]),
            Value::Computed(200.0)
        );
        assert_eq!(
            table.value_clamped(&[2500.0], &[Clamping::Both]),
            Value::Computed(200.0)
        );
    }

    #[test]
    fn one_dimensional_unsorted_rows() {
        let table = DataTable::from_csv("3,30\n1,10\n2,20\n").unwrap();
        assert_eq!(table.value(&[2.5]), Value::Computed(25.0));
    }

    #[test]
    fn sparse_trilinear_between_temperatures() {
        let table = sparse_takeoff_table();
        assert_eq!(
            table.value(&[6000.0, 7000.0, 25.0]),
            Value::Computed(4432.5)
        );
    }

    #[test]
    fn sparse_trilinear_full_cell() {
        let table = sparse_takeoff_table();
        let value = table.value(&[5750.0, 6500.0, 25.0]);

        let low_weight = (3520.0 + 4380.0 + 3700.0 + 4600.0) / 4.0;
        let high_weight = (3780.0 + 4700.0 + 3960.0 + 4905.0) / 4.0;
        assert_relative_eq!(
            *value.value().unwrap(),
            (low_weight + high_weight) / 2.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn sparse_grid_uses_isa_samples_only_where_complete() {
        let table = sparse_takeoff_table();

        // At 6000 lb and 7000 ft the 1.1316 sample brackets 10°C tightly.
        let value = table.value(&[6000.0, 7000.0, 10.0]);
        let t = (10.0 - 1.1316) / (20.0 - 1.1316);
        assert_relative_eq!(
            *value.value().unwrap(),
            3420.0 + t * (3960.0 - 3420.0),
            epsilon = 1e-9
        );

        // Between altitudes there is no common ISA sample; no cell brackets 10°C.
        assert_eq!(table.value(&[6000.0, 6500.0, 10.0]), Value::OffscaleHigh);
    }

    #[test]
    fn bilinear_interpolation() {
        let table = DataTable::from_csv(
            "0,0,0\n\
             0,10,100\n\
             10,0,10\n\
             10,10,110\n",
        )
        .unwrap();
        assert_eq!(table.value(&[5.0, 5.0]), Value::Computed(55.0));
        assert_eq!(table.value(&[10.0, 2.5]), Value::Computed(35.0));
    }

    #[test]
    fn offscale_by_dimension() {
        let table = sparse_takeoff_table();
        assert_eq!(table.value(&[5000.0, 6500.0, 25.0]), Value::OffscaleLow);
        assert_eq!(table.value(&[5750.0, 8000.0, 25.0]), Value::OffscaleHigh);
        assert_eq!(
            table.value_clamped(
                &[5750.0, 6000.0, 40.0],
                &[Clamping::None, Clamping::None, Clamping::High],
            ),
            Value::Computed((4380.0 + 4700.0) / 2.0)
        );
    }

    #[test]
    fn wide_tables_only_answer_exact_hits() {
        let table = DataTable::from_csv("1,2,3,4,10\n2,3,4,5,20\n").unwrap();
        assert_eq!(table.value(&[1.0, 2.0, 3.0, 4.0]), Value::Computed(10.0));
        assert_eq!(table.value(&[1.5, 2.5, 3.5, 4.5]), Value::OffscaleHigh);
    }

    #[test]
    fn malformed_queries() {
        let table = linear_table();
        assert_eq!(table.value(&[1.0, 2.0]), Value::Invalid);
        assert_eq!(table.value(&[f64::NAN]), Value::Invalid);
    }

    #[test]
    fn construction_errors() {
        assert!(matches!(DataTable::new(vec![]), Err(TableError::Empty)));
        assert!(matches!(
            DataTable::from_csv("header only\n"),
            Err(TableError::Empty)
        ));
        assert!(matches!(
            DataTable::new(vec![vec![1.0]]),
            Err(TableError::TooNarrow { row: 0, width: 1 })
        ));
        assert!(matches!(
            DataTable::new(vec![vec![1.0, 2.0], vec![1.0, 2.0, 3.0]]),
            Err(TableError::RaggedRow { row: 1, .. })
        ));
        assert!(matches!(
            DataTable::new(vec![vec![1.0, f64::NAN]]),
            Err(TableError::NonFinite { row: 0, column: 1 })
        ));
        assert!(matches!(
            linear_table().expect_inputs(3),
            Err(TableError::Dimensionality {
                expected: 3,
                actual: 1
            })
        ));
    }

    #[test]
    fn extrema() {
        let table = sparse_takeoff_table();
        assert_eq!(table.min(0), Some(5500.0));
        assert_eq!(table.max(1), Some(7000.0));
        assert_eq!(table.min(2), Some(1.1316));
        assert_eq!(table.max(3), None);
    }

    #[test]
    fn every_row_is_an_exact_hit() {
        let table = sparse_takeoff_table();
        for row in table.rows() {
            assert_eq!(table.value(&row[..3]), Value::Computed(row[3]));
        }
    }

    proptest! {
        #[test]
        fn above_maximum_is_refused_unless_clamped(excess in 1e-6_f64..1e6) {
            let table = sparse_takeoff_table();
            let query = [6000.0, 7000.0, 30.0 + excess];
            prop_assert_eq!(table.value(&query), Value::OffscaleHigh);
            prop_assert_eq!(
                table.value_clamped(&query, &[Clamping::None, Clamping::None, Clamping::High]),
                Value::Computed(4905.0)
            );
        }

        #[test]
        fn rows_are_exact_hits(
            rows in prop::collection::vec(
                (0_i32..50, 0_i32..50, -1e4_f64..1e4),
                1..40,
            )
        ) {
            let rows: Vec<Vec<f64>> = rows
                .into_iter()
                .map(|(x, y, z)| vec![f64::from(x) * 100.0, f64::from(y) * 0.5, z])
                .collect();
            let table = DataTable::new(rows.clone()).unwrap();
            for row in &rows {
                // Duplicated coordinates keep the first row's output.
                let first = rows.iter().find(|r| r[..2] == row[..2]).unwrap();
                prop_assert_eq!(table.value(&row[..2]), Value::Computed(first[2]));
            }
        }
    }
}
