//! Coordinate (COO) matrix format
//!
//! Unordered `(row, col, value)` triplets. Convenient for assembly; the
//! hierarchy converts it to CSR before coarsening.

use super::CsrMatrix;
use super::format::{SparseFormat, SparseMatrix};
use crate::error::StrategyError;
use crate::traits::{ComplexField, LinearOperator};
use ndarray::Array1;

/// Coordinate format sparse matrix
#[derive(Debug, Clone, PartialEq)]
pub struct CooMatrix<T: ComplexField> {
    /// Number of rows
    pub num_rows: usize,
    /// Number of columns
    pub num_cols: usize,
    /// Row index of each entry
    pub row_indices: Vec<usize>,
    /// Column index of each entry
    pub col_indices: Vec<usize>,
    /// Entry values
    pub values: Vec<T>,
}

impl<T: ComplexField> CooMatrix<T> {
    /// Create an empty matrix
    pub fn new(num_rows: usize, num_cols: usize) -> Self {
        Self {
            num_rows,
            num_cols,
            row_indices: Vec::new(),
            col_indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Append an entry; duplicates are kept and summed on conversion
    pub fn push(&mut self, row: usize, col: usize, value: T) -> Result<(), StrategyError> {
        if row >= self.num_rows {
            return Err(StrategyError::DimensionMismatch {
                what: "COO row index",
                expected: self.num_rows,
                got: row,
            });
        }
        if col >= self.num_cols {
            return Err(StrategyError::DimensionMismatch {
                what: "COO column index",
                expected: self.num_cols,
                got: col,
            });
        }
        self.row_indices.push(row);
        self.col_indices.push(col);
        self.values.push(value);
        Ok(())
    }

    /// Build from `(row, col, value)` triplets
    pub fn from_triplets(
        num_rows: usize,
        num_cols: usize,
        triplets: impl IntoIterator<Item = (usize, usize, T)>,
    ) -> Result<Self, StrategyError> {
        let mut coo = Self::new(num_rows, num_cols);
        for (i, j, v) in triplets {
            coo.push(i, j, v)?;
        }
        Ok(coo)
    }

    /// Number of stored entries
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    fn triplets(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        self.row_indices
            .iter()
            .zip(&self.col_indices)
            .zip(&self.values)
            .map(|((&i, &j), &v)| (i, j, v))
    }
}

impl<T: ComplexField> LinearOperator<T> for CooMatrix<T> {
    fn num_rows(&self) -> usize {
        self.num_rows
    }

    fn num_cols(&self) -> usize {
        self.num_cols
    }

    fn apply(&self, x: &Array1<T>) -> Array1<T> {
        assert_eq!(x.len(), self.num_cols, "Input vector size mismatch");
        let mut y = Array1::from_elem(self.num_rows, T::zero());
        for (i, j, v) in self.triplets() {
            y[i] += v * x[j];
        }
        y
    }

    fn apply_transpose(&self, x: &Array1<T>) -> Array1<T> {
        assert_eq!(x.len(), self.num_rows, "Input vector size mismatch");
        let mut y = Array1::from_elem(self.num_cols, T::zero());
        for (i, j, v) in self.triplets() {
            y[j] += v * x[i];
        }
        y
    }
}

impl<T: ComplexField> SparseMatrix<T> for CooMatrix<T> {
    const FORMAT: SparseFormat = SparseFormat::Coo;

    fn num_entries(&self) -> usize {
        self.nnz()
    }

    fn to_csr(&self) -> CsrMatrix<T> {
        CsrMatrix::from_triplets(self.num_rows, self.num_cols, self.triplets().collect())
    }

    fn from_csr(csr: CsrMatrix<T>) -> Result<Self, StrategyError> {
        let mut row_indices = Vec::with_capacity(csr.nnz());
        for i in 0..csr.num_rows {
            row_indices.extend(std::iter::repeat_n(i, csr.row_len(i)));
        }
        Ok(Self {
            num_rows: csr.num_rows,
            num_cols: csr.num_cols,
            row_indices,
            col_indices: csr.col_indices,
            values: csr.values,
        })
    }

    fn diagonal(&self) -> Array1<T> {
        let mut diag = Array1::from_elem(self.num_rows.min(self.num_cols), T::zero());
        for (i, j, v) in self.triplets() {
            if i == j {
                diag[i] += v;
            }
        }
        diag
    }
}
