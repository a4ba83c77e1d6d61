//! Compressed Sparse Row (CSR) matrix format
//!
//! CSR format stores:
//! - `values`: Non-zero entries in row-major order
//! - `col_indices`: Column index for each value, ascending within a row
//! - `row_ptrs`: Index into values/col_indices where each row starts
//!
//! CSR is the setup format of the hierarchy: every strategy algorithm
//! consumes and produces it.

use super::format::{SparseFormat, SparseMatrix};
use crate::error::StrategyError;
use crate::parallel::parallel_map_indexed;
use crate::traits::{ComplexField, LinearOperator};
use ndarray::{Array1, Array2};
use std::ops::Range;

/// Compressed Sparse Row (CSR) matrix format
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix<T: ComplexField> {
    /// Number of rows
    pub num_rows: usize,
    /// Number of columns
    pub num_cols: usize,
    /// Non-zero values in row-major order
    pub values: Vec<T>,
    /// Column indices for each value
    pub col_indices: Vec<usize>,
    /// Row pointers: row_ptrs[i] is the start index in values/col_indices for row i
    /// row_ptrs[num_rows] = nnz (total number of non-zeros)
    pub row_ptrs: Vec<usize>,
}

impl<T: ComplexField> Default for CsrMatrix<T> {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl<T: ComplexField> CsrMatrix<T> {
    /// Create a new empty CSR matrix
    pub fn new(num_rows: usize, num_cols: usize) -> Self {
        Self {
            num_rows,
            num_cols,
            values: Vec::new(),
            col_indices: Vec::new(),
            row_ptrs: vec![0; num_rows + 1],
        }
    }

    /// Create a CSR matrix from raw components
    ///
    /// Column indices must be in range and strictly ascending within each row.
    pub fn from_raw_parts(
        num_rows: usize,
        num_cols: usize,
        row_ptrs: Vec<usize>,
        col_indices: Vec<usize>,
        values: Vec<T>,
    ) -> Result<Self, StrategyError> {
        if row_ptrs.len() != num_rows + 1 {
            return Err(StrategyError::DimensionMismatch {
                what: "row_ptrs length",
                expected: num_rows + 1,
                got: row_ptrs.len(),
            });
        }
        if col_indices.len() != values.len() {
            return Err(StrategyError::DimensionMismatch {
                what: "col_indices length",
                expected: values.len(),
                got: col_indices.len(),
            });
        }
        if row_ptrs[num_rows] != values.len() || row_ptrs[0] != 0 {
            return Err(StrategyError::DimensionMismatch {
                what: "row_ptrs bounds",
                expected: values.len(),
                got: row_ptrs[num_rows],
            });
        }
        for row in 0..num_rows {
            let (start, end) = (row_ptrs[row], row_ptrs[row + 1]);
            if start > end {
                return Err(StrategyError::Failed(format!(
                    "row_ptrs decreases at row {row}"
                )));
            }
            let cols = &col_indices[start..end];
            if cols.iter().any(|&j| j >= num_cols) || cols.windows(2).any(|w| w[0] >= w[1]) {
                return Err(StrategyError::Failed(format!(
                    "row {row} has out-of-range or unsorted column indices"
                )));
            }
        }

        Ok(Self {
            num_rows,
            num_cols,
            row_ptrs,
            col_indices,
            values,
        })
    }

    /// Create a CSR matrix from a dense matrix
    ///
    /// Only stores entries with magnitude > threshold
    pub fn from_dense(dense: &Array2<T>, threshold: T::Real) -> Self {
        let (num_rows, num_cols) = dense.dim();
        let rows = (0..num_rows)
            .map(|i| {
                (0..num_cols)
                    .filter(|&j| dense[[i, j]].norm() > threshold)
                    .map(|j| (j, dense[[i, j]]))
                    .collect()
            })
            .collect();
        Self::from_sorted_rows(num_rows, num_cols, rows)
    }

    /// Create a CSR matrix from COO (Coordinate) format triplets
    ///
    /// Triplets are (row, col, value). Duplicate entries are summed.
    ///
    /// # Panics
    ///
    /// Panics if a row index is `>= num_rows` or a column index is
    /// `>= num_cols`.
    pub fn from_triplets(
        num_rows: usize,
        num_cols: usize,
        mut triplets: Vec<(usize, usize, T)>,
    ) -> Self {
        triplets.sort_by_key(|&(row, col, _)| (row, col));

        let mut row_ptrs = vec![0usize; num_rows + 1];
        let mut col_indices = Vec::with_capacity(triplets.len());
        let mut values: Vec<T> = Vec::with_capacity(triplets.len());
        let mut last = None;

        for (row, col, val) in triplets {
            assert!(row < num_rows, "row index {row} out of range for {num_rows} rows");
            assert!(col < num_cols, "column index {col} out of range for {num_cols} columns");
            if last == Some((row, col)) {
                if let Some(acc) = values.last_mut() {
                    *acc += val;
                }
                continue;
            }
            row_ptrs[row + 1] += 1;
            col_indices.push(col);
            values.push(val);
            last = Some((row, col));
        }
        for i in 0..num_rows {
            row_ptrs[i + 1] += row_ptrs[i];
        }

        Self {
            num_rows,
            num_cols,
            values,
            col_indices,
            row_ptrs,
        }
    }

    /// Assemble from per-row `(col, value)` lists already sorted by column
    pub(crate) fn from_sorted_rows(
        num_rows: usize,
        num_cols: usize,
        rows: Vec<Vec<(usize, T)>>,
    ) -> Self {
        let nnz = rows.iter().map(Vec::len).sum();
        let mut row_ptrs = Vec::with_capacity(num_rows + 1);
        let mut col_indices = Vec::with_capacity(nnz);
        let mut values = Vec::with_capacity(nnz);

        row_ptrs.push(0);
        for row in rows {
            for (j, v) in row {
                col_indices.push(j);
                values.push(v);
            }
            row_ptrs.push(values.len());
        }

        Self {
            num_rows,
            num_cols,
            values,
            col_indices,
            row_ptrs,
        }
    }

    /// Number of non-zero entries
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Get the range of indices in values/col_indices for a given row
    pub fn row_range(&self, row: usize) -> Range<usize> {
        self.row_ptrs[row]..self.row_ptrs[row + 1]
    }

    /// Get the (col, value) pairs for a row
    pub fn row_entries(&self, row: usize) -> impl Iterator<Item = (usize, T)> + '_ {
        let range = self.row_range(row);
        self.col_indices[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    /// Number of stored entries in a row
    pub fn row_len(&self, row: usize) -> usize {
        self.row_ptrs[row + 1] - self.row_ptrs[row]
    }

    /// Matrix-vector product: y = A * x
    ///
    /// Rows are processed in parallel when the `rayon` feature is enabled
    /// and the matrix is large enough.
    ///
    /// # Panics
    ///
    /// Panics if `x.len() != num_cols`.
    pub fn matvec(&self, x: &Array1<T>) -> Array1<T> {
        assert_eq!(x.len(), self.num_cols, "Input vector size mismatch");

        let y = parallel_map_indexed(self.num_rows, |i| {
            self.row_entries(i)
                .fold(T::zero(), |sum, (j, a_ij)| sum + a_ij * x[j])
        });
        Array1::from_vec(y)
    }

    /// Transpose matrix-vector product: y = A^T * x
    ///
    /// # Panics
    ///
    /// Panics if `x.len() != num_rows`.
    pub fn matvec_transpose(&self, x: &Array1<T>) -> Array1<T> {
        assert_eq!(x.len(), self.num_rows, "Input vector size mismatch");

        let mut y = Array1::from_elem(self.num_cols, T::zero());
        for i in 0..self.num_rows {
            for (j, a_ij) in self.row_entries(i) {
                y[j] += a_ij * x[i];
            }
        }
        y
    }

    /// Get element at (i, j), returns 0 if not stored
    pub fn get(&self, i: usize, j: usize) -> T {
        let range = self.row_range(i);
        match self.col_indices[range.clone()].binary_search(&j) {
            Ok(offset) => self.values[range.start + offset],
            Err(_) => T::zero(),
        }
    }

    /// Extract diagonal elements
    pub fn diagonal(&self) -> Array1<T> {
        let n = self.num_rows.min(self.num_cols);
        Array1::from_iter((0..n).map(|i| self.get(i, i)))
    }

    /// Scale all values by a scalar
    pub fn scale(&mut self, scalar: T) {
        for val in &mut self.values {
            *val *= scalar;
        }
    }

    /// Scale row `i` by `factors[i]`, i.e. `A <- diag(factors) * A`
    pub fn scale_rows(&mut self, factors: &Array1<T>) -> Result<(), StrategyError> {
        if factors.len() != self.num_rows {
            return Err(StrategyError::DimensionMismatch {
                what: "row scaling vector",
                expected: self.num_rows,
                got: factors.len(),
            });
        }
        for i in 0..self.num_rows {
            let f = factors[i];
            let range = self.row_range(i);
            for val in &mut self.values[range] {
                *val *= f;
            }
        }
        Ok(())
    }

    /// Elementwise `self + alpha * other` on the union sparsity pattern
    pub fn add_scaled(&self, other: &CsrMatrix<T>, alpha: T) -> Result<CsrMatrix<T>, StrategyError> {
        if self.num_rows != other.num_rows {
            return Err(StrategyError::DimensionMismatch {
                what: "elementwise operand rows",
                expected: self.num_rows,
                got: other.num_rows,
            });
        }
        if self.num_cols != other.num_cols {
            return Err(StrategyError::DimensionMismatch {
                what: "elementwise operand columns",
                expected: self.num_cols,
                got: other.num_cols,
            });
        }

        let rows = parallel_map_indexed(self.num_rows, |i| {
            let mut lhs = self.row_entries(i).peekable();
            let mut rhs = other.row_entries(i).peekable();
            let mut merged = Vec::with_capacity(self.row_len(i) + other.row_len(i));
            loop {
                match (lhs.peek().copied(), rhs.peek().copied()) {
                    (Some((ja, a)), Some((jb, b))) if ja == jb => {
                        merged.push((ja, a + alpha * b));
                        lhs.next();
                        rhs.next();
                    }
                    (Some((ja, a)), Some((jb, _))) if ja < jb => {
                        merged.push((ja, a));
                        lhs.next();
                    }
                    (_, Some((jb, b))) => {
                        merged.push((jb, alpha * b));
                        rhs.next();
                    }
                    (Some((ja, a)), None) => {
                        merged.push((ja, a));
                        lhs.next();
                    }
                    (None, None) => break,
                }
            }
            merged
        });

        Ok(Self::from_sorted_rows(self.num_rows, self.num_cols, rows))
    }

    /// Transpose, `A^T`
    pub fn transpose(&self) -> CsrMatrix<T> {
        let nnz = self.nnz();
        let mut row_ptrs = vec![0usize; self.num_cols + 1];
        for &j in &self.col_indices {
            row_ptrs[j + 1] += 1;
        }
        for j in 0..self.num_cols {
            row_ptrs[j + 1] += row_ptrs[j];
        }

        let mut next = row_ptrs.clone();
        let mut col_indices = vec![0usize; nnz];
        let mut values = vec![T::zero(); nnz];
        for i in 0..self.num_rows {
            for idx in self.row_range(i) {
                let j = self.col_indices[idx];
                let dst = next[j];
                col_indices[dst] = i;
                values[dst] = self.values[idx];
                next[j] += 1;
            }
        }

        CsrMatrix {
            num_rows: self.num_cols,
            num_cols: self.num_rows,
            values,
            col_indices,
            row_ptrs,
        }
    }

    /// Sparse matrix-matrix product: C = A * B
    ///
    /// Each output row is formed by sorted accumulation of the scaled rows
    /// of `B`; rows are computed independently, in parallel when enabled.
    pub fn matmul(&self, other: &CsrMatrix<T>) -> Result<CsrMatrix<T>, StrategyError> {
        if self.num_cols != other.num_rows {
            return Err(StrategyError::DimensionMismatch {
                what: "matmul inner dimension",
                expected: self.num_cols,
                got: other.num_rows,
            });
        }

        let rows = parallel_map_indexed(self.num_rows, |i| {
            let mut row_data: Vec<(usize, T)> = Vec::new();
            for (k, a_ik) in self.row_entries(i) {
                for (j, b_kj) in other.row_entries(k) {
                    row_data.push((j, a_ik * b_kj));
                }
            }
            row_data.sort_by_key(|&(j, _)| j);

            let mut merged: Vec<(usize, T)> = Vec::with_capacity(row_data.len());
            for (j, val) in row_data {
                match merged.last_mut() {
                    Some((last_j, acc)) if *last_j == j => *acc += val,
                    _ => merged.push((j, val)),
                }
            }
            merged
        });

        Ok(Self::from_sorted_rows(self.num_rows, other.num_cols, rows))
    }

    /// Create identity matrix in CSR format
    pub fn identity(n: usize) -> Self {
        Self {
            num_rows: n,
            num_cols: n,
            values: vec![T::one(); n],
            col_indices: (0..n).collect(),
            row_ptrs: (0..=n).collect(),
        }
    }

    /// Convert to dense matrix (for small matrices and the coarse solver)
    pub fn to_dense(&self) -> Array2<T> {
        let mut dense = Array2::from_elem((self.num_rows, self.num_cols), T::zero());
        for i in 0..self.num_rows {
            for (j, a_ij) in self.row_entries(i) {
                dense[[i, j]] = a_ij;
            }
        }
        dense
    }
}

impl<T: ComplexField> LinearOperator<T> for CsrMatrix<T> {
    fn num_rows(&self) -> usize {
        self.num_rows
    }

    fn num_cols(&self) -> usize {
        self.num_cols
    }

    fn apply(&self, x: &Array1<T>) -> Array1<T> {
        self.matvec(x)
    }

    fn apply_transpose(&self, x: &Array1<T>) -> Array1<T> {
        self.matvec_transpose(x)
    }
}

impl<T: ComplexField> SparseMatrix<T> for CsrMatrix<T> {
    const FORMAT: SparseFormat = SparseFormat::Csr;

    fn num_entries(&self) -> usize {
        self.nnz()
    }

    fn to_csr(&self) -> CsrMatrix<T> {
        self.clone()
    }

    fn from_csr(csr: CsrMatrix<T>) -> Result<Self, StrategyError> {
        Ok(csr)
    }

    fn diagonal(&self) -> Array1<T> {
        CsrMatrix::diagonal(self)
    }
}
