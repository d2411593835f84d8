//! Tightest-cell search over sparse chart grids.
//!
//! Digitized charts are not dense cross-products: some axis values exist only
//! for particular combinations of the other axes (for example, ISA temperature
//! samples that differ at every altitude). The search below picks, axis by
//! axis, the narrowest bracketing pair of sampled values for which every
//! corner of the resulting cell exists in the data.

use std::{
    cmp::Ordering,
    collections::{HashMap, HashSet},
};

/// A sampled coordinate, keyed by its bit pattern.
///
/// Coordinates always come straight from table rows, so bitwise equality is
/// exact. Negative zero is folded into positive zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Coordinate(u64);

impl Coordinate {
    fn new(x: f64) -> Self {
        if x == 0.0 {
            Self(0.0_f64.to_bits())
        } else {
            Self(x.to_bits())
        }
    }
}

/// A point (or the leading axes of a point) in the table's input space.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GridKey(Vec<Coordinate>);

impl GridKey {
    fn new(coordinates: impl IntoIterator<Item = f64>) -> Self {
        Self(coordinates.into_iter().map(Coordinate::new).collect())
    }
}

/// Lower and upper sampled values bracketing a query along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Bracket {
    pub(super) lo: f64,
    pub(super) hi: f64,
}

impl Bracket {
    fn span(self) -> f64 {
        self.hi - self.lo
    }

    fn contains(self, x: f64) -> bool {
        x == self.lo || x == self.hi
    }

    /// Fractional position of `x` within the bracket; zero for a degenerate bracket.
    fn fraction(self, x: f64) -> f64 {
        if self.hi == self.lo {
            0.0
        } else {
            (x - self.lo) / (self.hi - self.lo)
        }
    }
}

/// Corner-existence index for a multi-input table.
#[derive(Debug, Clone, Default)]
pub(super) struct GridIndex {
    /// Sorted distinct values of the first axis.
    first_axis: Vec<f64>,

    /// `prefixes[k]` holds every sampled combination of the first `k + 1` axes.
    prefixes: Vec<HashSet<GridKey>>,

    /// Output at each sampled point; the first row wins for duplicates.
    outputs: HashMap<GridKey, f64>,
}

impl GridIndex {
    pub(super) fn new(rows: &[Vec<f64>], n_inputs: usize) -> Self {
        let first_axis = distinct_sorted(rows.iter().map(|row| row[0]));

        let prefixes = (1..=n_inputs)
            .map(|len| {
                rows.iter()
                    .map(|row| GridKey::new(row[..len].iter().copied()))
                    .collect()
            })
            .collect();

        let mut outputs = HashMap::with_capacity(rows.len());
        for row in rows {
            outputs
                .entry(GridKey::new(row[..n_inputs].iter().copied()))
                .or_insert(row[n_inputs]);
        }

        Self {
            first_axis,
            prefixes,
            outputs,
        }
    }

    /// Interpolates within the tightest complete cell around `query`.
    ///
    /// Returns `None` if no bracketing cell has all of its corners sampled.
    pub(super) fn interpolate(&self, rows: &[Vec<f64>], query: &[f64]) -> Option<f64> {
        let first = tightest_bracket(&self.first_axis, query[0])?;

        let mut cell = Vec::with_capacity(query.len());
        cell.push(first);
        if !self.refine(rows, query, &mut cell) {
            tracing::trace!(?query, "no complete grid cell brackets the query");
            return None;
        }

        self.blend(query, &cell)
    }

    /// Extends `cell` one axis at a time, backtracking over candidate pairs
    /// in order of increasing span.
    fn refine(&self, rows: &[Vec<f64>], query: &[f64], cell: &mut Vec<Bracket>) -> bool {
        let axis = cell.len();
        if axis == query.len() {
            return true;
        }

        let candidates = distinct_sorted(
            rows.iter()
                .filter(|row| cell.iter().zip(row.iter()).all(|(b, &x)| b.contains(x)))
                .map(|row| row[axis]),
        );

        for pair in bracketing_pairs(&candidates, query[axis]) {
            cell.push(pair);
            if self.corners_exist(cell) && self.refine(rows, query, cell) {
                return true;
            }
            cell.pop();
        }

        false
    }

    /// Checks that all `2^k` corners over the first `k` axes of `cell` were sampled.
    fn corners_exist(&self, cell: &[Bracket]) -> bool {
        let sampled = &self.prefixes[cell.len() - 1];
        (0..1_usize << cell.len()).all(|mask| sampled.contains(&corner(cell, mask)))
    }

    /// Multilinear blend of the cell's corner outputs.
    fn blend(&self, query: &[f64], cell: &[Bracket]) -> Option<f64> {
        let fractions: Vec<f64> = cell
            .iter()
            .zip(query)
            .map(|(bracket, &x)| bracket.fraction(x))
            .collect();

        (0..1_usize << cell.len()).try_fold(0.0, |sum, mask| {
            let output = self.outputs.get(&corner(cell, mask))?;
            let weight: f64 = fractions
                .iter()
                .enumerate()
                .map(|(axis, &t)| if (mask >> axis) & 1 == 1 { t } else { 1.0 - t })
                .product();
            Some(sum + weight * output)
        })
    }
}

/// Selects the low (bit clear) or high (bit set) end of each bracket.
fn corner(cell: &[Bracket], mask: usize) -> GridKey {
    GridKey::new(cell.iter().enumerate().map(|(axis, bracket)| {
        if (mask >> axis) & 1 == 1 {
            bracket.hi
        } else {
            bracket.lo
        }
    }))
}

fn distinct_sorted(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut values: Vec<f64> = values.collect();
    values.sort_by(f64::total_cmp);
    values.dedup();
    values
}

/// Largest sampled value `<= x` and smallest sampled value `>= x`.
fn tightest_bracket(sorted: &[f64], x: f64) -> Option<Bracket> {
    let lo = sorted.iter().rev().find(|&&v| v <= x)?;
    let hi = sorted.iter().find(|&&v| v >= x)?;
    Some(Bracket { lo: *lo, hi: *hi })
}

/// Every `(lo, hi)` pair of candidates with `lo <= x <= hi`, narrowest first.
fn bracketing_pairs(sorted: &[f64], x: f64) -> Vec<Bracket> {
    let mut pairs: Vec<Bracket> = sorted
        .iter()
        .filter(|&&lo| lo <= x)
        .flat_map(|&lo| {
            sorted
                .iter()
                .filter(move |&&hi| hi >= x)
                .map(move |&hi| Bracket { lo, hi })
        })
        .collect();

    pairs.sort_by(|a, b| match a.span().total_cmp(&b.span()) {
        Ordering::Equal => a.lo.total_cmp(&b.lo),
        ordering => ordering,
    });
    pairs
}
