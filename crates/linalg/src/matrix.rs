use std::fmt;

use rustc_hash::FxHashMap;

use crate::arith::{gcd, lcm, primitive_dense, primitive_sparse, reduce_content, to_i64};
use crate::LinalgError;

/// A sparse matrix with integer entries.
///
/// Each row is a list of `(column, value)` pairs sorted by column and free of zeros. Rows may be
/// empty. The constructors normalize their input, so every method can rely on this invariant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SparseMatrix {
    columns: usize,
    rows: Vec<Vec<(usize, i64)>>,
}

impl SparseMatrix {
    /// The zero matrix of the given size.
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            columns,
            rows: vec![Vec::new(); rows],
        }
    }

    /// Build a matrix from a list of `((row, column), value)` entries. Repeated positions are
    /// summed and zero entries are dropped.
    pub fn from_entries(
        rows: usize,
        columns: usize,
        entries: impl IntoIterator<Item = ((usize, usize), i64)>,
    ) -> Self {
        let mut data = vec![Vec::new(); rows];
        for ((r, c), v) in entries {
            assert!(
                r < rows && c < columns,
                "entry ({r}, {c}) out of bounds for {rows}x{columns} matrix"
            );
            data[r].push((c, v));
        }
        Self::from_rows(columns, data)
    }

    /// Build a matrix from sparse rows. The rows need not be sorted and may contain repeated
    /// columns, which are summed.
    pub fn from_rows(columns: usize, rows: Vec<Vec<(usize, i64)>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.sort_unstable_by_key(|&(c, _)| c);
                let mut merged: Vec<(usize, i64)> = Vec::with_capacity(row.len());
                for (c, v) in row {
                    debug_assert!(c < columns);
                    match merged.last_mut() {
                        Some((last, w)) if *last == c => *w += v,
                        _ => merged.push((c, v)),
                    }
                }
                merged.retain(|&(_, v)| v != 0);
                merged
            })
            .collect();
        Self { columns, rows }
    }

    pub fn from_dense(columns: usize, rows: &[Vec<i64>]) -> Self {
        Self {
            columns,
            rows: rows
                .iter()
                .map(|row| {
                    assert_eq!(row.len(), columns);
                    row.iter()
                        .enumerate()
                        .filter(|(_, &v)| v != 0)
                        .map(|(c, &v)| (c, v))
                        .collect()
                })
                .collect(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn row(&self, r: usize) -> &[(usize, i64)] {
        &self.rows[r]
    }

    pub fn iter(&self) -> impl Iterator<Item = &[(usize, i64)]> + '_ {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Number of nonzero entries.
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub fn is_zero(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }

    pub fn get(&self, r: usize, c: usize) -> i64 {
        let row = &self.rows[r];
        match row.binary_search_by_key(&c, |&(c, _)| c) {
            Ok(i) => row[i].1,
            Err(_) => 0,
        }
    }

    pub fn transpose(&self) -> Self {
        let mut rows = vec![Vec::new(); self.columns];
        for (r, row) in self.rows.iter().enumerate() {
            for &(c, v) in row {
                rows[c].push((r, v));
            }
        }
        Self {
            columns: self.rows.len(),
            rows,
        }
    }

    /// The product `self * other`.
    pub fn mul(&self, other: &Self) -> Result<Self, LinalgError> {
        if self.columns != other.rows() {
            return Err(LinalgError::DimensionMismatch {
                left: self.columns,
                right: other.rows(),
            });
        }
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut acc: FxHashMap<usize, i128> = FxHashMap::default();
                for &(k, a) in row {
                    for &(c, b) in other.row(k) {
                        *acc.entry(c).or_default() += i128::from(a) * i128::from(b);
                    }
                }
                let mut result = acc
                    .into_iter()
                    .filter(|&(_, v)| v != 0)
                    .map(|(c, v)| to_i64(v).map(|v| (c, v)))
                    .collect::<Result<Vec<_>, _>>()?;
                result.sort_unstable_by_key(|&(c, _)| c);
                Ok(result)
            })
            .collect::<Result<_, LinalgError>>()?;
        Ok(Self {
            columns: other.columns,
            rows,
        })
    }

    pub fn to_dense(&self) -> Vec<Vec<i64>> {
        self.rows
            .iter()
            .map(|row| {
                let mut dense = vec![0; self.columns];
                for &(c, v) in row {
                    dense[c] = v;
                }
                dense
            })
            .collect()
    }

    /// The rank of the matrix over the rationals.
    ///
    /// Rows are reduced one at a time against a row echelon basis indexed by leading column.
    /// Only leading entries are eliminated, which is all the rank needs.
    pub fn rank(&self) -> Result<usize, LinalgError> {
        let mut pivots: FxHashMap<usize, Vec<(usize, i64)>> = FxHashMap::default();
        for row in &self.rows {
            let mut current = row.clone();
            while let Some(&(lead, _)) = current.first() {
                match pivots.get(&lead) {
                    Some(pivot) => current = eliminate_leading(&current, pivot)?,
                    None => {
                        pivots.insert(lead, current);
                        break;
                    }
                }
            }
        }
        Ok(pivots.len())
    }

    /// A basis of the integer vectors `x` with `self * x = 0`. Every basis vector is primitive
    /// and its first nonzero entry is positive.
    ///
    /// This converts to dense rows, so it is meant for the small systems that come up when
    /// solving for singular vectors, not for differentials.
    pub fn kernel(&self) -> Result<Vec<Vec<i64>>, LinalgError> {
        let columns = self.columns;
        let mut rows: Vec<Vec<i128>> = self
            .rows
            .iter()
            .filter(|row| !row.is_empty())
            .map(|row| {
                let mut dense = vec![0; columns];
                for &(c, v) in row {
                    dense[c] = i128::from(v);
                }
                dense
            })
            .collect();

        let mut pivot_columns = Vec::new();
        for column in 0..columns {
            let rank = pivot_columns.len();
            let Some(p) = (rank..rows.len()).find(|&r| rows[r][column] != 0) else {
                continue;
            };
            rows.swap(rank, p);
            let pivot_row = rows[rank].clone();
            for (r, row) in rows.iter_mut().enumerate() {
                if r == rank || row[column] == 0 {
                    continue;
                }
                let g = gcd(pivot_row[column], row[column]);
                let (s, t) = (pivot_row[column] / g, row[column] / g);
                for (x, &y) in row.iter_mut().zip(&pivot_row) {
                    *x = s
                        .checked_mul(*x)
                        .and_then(|v| v.checked_sub(t.checked_mul(y)?))
                        .ok_or(LinalgError::Overflow)?;
                }
                reduce_content(row);
            }
            pivot_columns.push(column);
        }

        let mut is_pivot = vec![false; columns];
        for &c in &pivot_columns {
            is_pivot[c] = true;
        }
        let scale = pivot_columns
            .iter()
            .enumerate()
            .try_fold(1, |acc, (k, &c)| lcm(acc, rows[k][c]))?;

        let mut basis = Vec::new();
        for free in (0..columns).filter(|&c| !is_pivot[c]) {
            let mut v = vec![0; columns];
            v[free] = scale;
            for (k, &c) in pivot_columns.iter().enumerate() {
                v[c] = (scale / rows[k][c])
                    .checked_mul(-rows[k][free])
                    .ok_or(LinalgError::Overflow)?;
            }
            basis.push(primitive_dense(&v)?);
        }
        Ok(basis)
    }
}

/// Cancel the leading entry of `row` against `pivot`, which must share its leading column.
fn eliminate_leading(
    row: &[(usize, i64)],
    pivot: &[(usize, i64)],
) -> Result<Vec<(usize, i64)>, LinalgError> {
    let a = i128::from(row[0].1);
    let b = i128::from(pivot[0].1);
    let g = gcd(a, b);
    let (row_scale, pivot_scale) = (b / g, a / g);

    let mut result = Vec::with_capacity(row.len() + pivot.len());
    let (mut i, mut j) = (1, 1);
    loop {
        let next = match (row.get(i), pivot.get(j)) {
            (Some(&(c, x)), Some(&(d, y))) if c == d => {
                i += 1;
                j += 1;
                (c, row_scale * i128::from(x) - pivot_scale * i128::from(y))
            }
            (Some(&(c, x)), Some(&(d, _))) if c < d => {
                i += 1;
                (c, row_scale * i128::from(x))
            }
            (Some(&(c, x)), None) => {
                i += 1;
                (c, row_scale * i128::from(x))
            }
            (_, Some(&(d, y))) => {
                j += 1;
                (d, -pivot_scale * i128::from(y))
            }
            (None, None) => break,
        };
        if next.1 != 0 {
            result.push(next);
        }
    }
    primitive_sparse(result)
}

impl fmt::Display for SparseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.to_dense() {
            writeln!(f, "{row:?}")?;
        }
        Ok(())
    }
}

#[cfg(feature = "proptest")]
pub mod arbitrary {
    use proptest::prelude::*;

    use super::*;

    pub const MAX_ROWS: usize = 10;
    pub const MAX_COLUMNS: usize = 10;
    pub const MAX_ENTRY: i64 = 6;

    #[derive(Debug, Clone)]
    pub struct SparseMatrixArbParams {
        pub rows: BoxedStrategy<usize>,
        pub columns: BoxedStrategy<usize>,
    }

    impl Default for SparseMatrixArbParams {
        fn default() -> Self {
            Self {
                rows: (0..=MAX_ROWS).boxed(),
                columns: (0..=MAX_COLUMNS).boxed(),
            }
        }
    }

    impl Arbitrary for SparseMatrix {
        type Parameters = SparseMatrixArbParams;
        type Strategy = BoxedStrategy<Self>;

        /// Entries are zero about half of the time, so that the matrices are genuinely sparse and
        /// rank deficiency is common.
        fn arbitrary_with(args: Self::Parameters) -> Self::Strategy {
            (args.rows, args.columns)
                .prop_flat_map(|(rows, columns)| {
                    let entry = prop_oneof![Just(0i64), -MAX_ENTRY..=MAX_ENTRY];
                    (
                        Just(columns),
                        proptest::collection::vec(
                            proptest::collection::vec(entry, columns),
                            rows,
                        ),
                    )
                })
                .prop_map(|(columns, dense)| Self::from_dense(columns, &dense))
                .boxed()
        }
    }
}
