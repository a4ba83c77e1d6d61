//! Diagonal (DIA) matrix format
//!
//! Stores each occupied diagonal as a dense column: `values[[i, d]]` is the
//! entry at `(i, i + diagonal_offsets[d])`. Values are laid out
//! column-major so a diagonal is contiguous. Well suited to banded
//! operators from structured grids; conversion refuses large matrices whose
//! band would be mostly padding. Prolongators are not banded (their
//! occupied diagonals grow with the row count), so a hierarchy rebound to
//! DIA is limited to small problems.

use super::CsrMatrix;
use super::format::{SparseFormat, SparseMatrix};
use crate::error::StrategyError;
use crate::traits::{ComplexField, LinearOperator};
use ndarray::{Array1, Array2, ShapeBuilder};
use num_traits::Zero;
use std::collections::BTreeSet;

/// Maximum ratio of stored slots to actual entries accepted by conversion
pub const DEFAULT_MAX_FILL: f64 = 3.0;

/// Slot count (`rows x diagonals`) below which the fill ratio is not checked
pub const FILL_CHECK_MIN_SLOTS: f64 = 1.0e6;

/// Diagonal format sparse matrix
#[derive(Debug, Clone, PartialEq)]
pub struct DiaMatrix<T: ComplexField> {
    /// Number of rows
    pub num_rows: usize,
    /// Number of columns
    pub num_cols: usize,
    /// Number of entries of the source matrix
    pub num_entries: usize,
    /// Offset `j - i` of each stored diagonal, ascending
    pub diagonal_offsets: Vec<isize>,
    /// `num_rows x num_diagonals`, column-major
    pub values: Array2<T>,
}

impl<T: ComplexField> DiaMatrix<T> {
    /// Convert from CSR, rejecting band fill above `max_fill` once the
    /// padded storage exceeds [`FILL_CHECK_MIN_SLOTS`]
    pub fn from_csr_with_fill(csr: &CsrMatrix<T>, max_fill: f64) -> Result<Self, StrategyError> {
        let offsets: BTreeSet<isize> = (0..csr.num_rows)
            .flat_map(|i| csr.row_entries(i).map(move |(j, _)| j as isize - i as isize))
            .collect();
        let diagonal_offsets: Vec<isize> = offsets.into_iter().collect();

        let slots = diagonal_offsets.len() as f64 * csr.num_rows as f64;
        let fill = slots / (csr.nnz().max(1) as f64);
        if fill > max_fill && slots > FILL_CHECK_MIN_SLOTS {
            return Err(StrategyError::FormatConversion(format!(
                "DIA fill ratio {fill:.2} exceeds limit {max_fill:.2} ({} diagonals, {} rows, {} entries)",
                diagonal_offsets.len(),
                csr.num_rows,
                csr.nnz()
            )));
        }

        let mut values = Array2::zeros((csr.num_rows, diagonal_offsets.len()).f());
        for i in 0..csr.num_rows {
            for (j, v) in csr.row_entries(i) {
                let offset = j as isize - i as isize;
                // offsets were collected from these same entries
                if let Ok(d) = diagonal_offsets.binary_search(&offset) {
                    values[[i, d]] = v;
                }
            }
        }

        Ok(Self {
            num_rows: csr.num_rows,
            num_cols: csr.num_cols,
            num_entries: csr.nnz(),
            diagonal_offsets,
            values,
        })
    }

    /// Number of stored diagonals
    pub fn num_diagonals(&self) -> usize {
        self.diagonal_offsets.len()
    }

    fn column_at(&self, row: usize, offset: isize) -> Option<usize> {
        let j = row as isize + offset;
        (j >= 0 && (j as usize) < self.num_cols).then_some(j as usize)
    }
}

impl<T: ComplexField> LinearOperator<T> for DiaMatrix<T> {
    fn num_rows(&self) -> usize {
        self.num_rows
    }

    fn num_cols(&self) -> usize {
        self.num_cols
    }

    fn apply(&self, x: &Array1<T>) -> Array1<T> {
        assert_eq!(x.len(), self.num_cols, "Input vector size mismatch");
        let mut y = Array1::from_elem(self.num_rows, T::zero());
        for (d, &offset) in self.diagonal_offsets.iter().enumerate() {
            let diag = self.values.column(d);
            for i in 0..self.num_rows {
                if let Some(j) = self.column_at(i, offset) {
                    y[i] += diag[i] * x[j];
                }
            }
        }
        y
    }

    fn apply_transpose(&self, x: &Array1<T>) -> Array1<T> {
        assert_eq!(x.len(), self.num_rows, "Input vector size mismatch");
        let mut y = Array1::from_elem(self.num_cols, T::zero());
        for (d, &offset) in self.diagonal_offsets.iter().enumerate() {
            let diag = self.values.column(d);
            for i in 0..self.num_rows {
                if let Some(j) = self.column_at(i, offset) {
                    y[j] += diag[i] * x[i];
                }
            }
        }
        y
    }
}

impl<T: ComplexField> SparseMatrix<T> for DiaMatrix<T> {
    const FORMAT: SparseFormat = SparseFormat::Dia;

    fn num_entries(&self) -> usize {
        self.num_entries
    }

    fn to_csr(&self) -> CsrMatrix<T> {
        let rows = (0..self.num_rows)
            .map(|i| {
                self.diagonal_offsets
                    .iter()
                    .enumerate()
                    .filter_map(|(d, &offset)| {
                        let j = self.column_at(i, offset)?;
                        let v = self.values[[i, d]];
                        (!v.is_zero()).then_some((j, v))
                    })
                    .collect()
            })
            .collect();
        CsrMatrix::from_sorted_rows(self.num_rows, self.num_cols, rows)
    }

    fn from_csr(csr: CsrMatrix<T>) -> Result<Self, StrategyError> {
        Self::from_csr_with_fill(&csr, DEFAULT_MAX_FILL)
    }

    fn diagonal(&self) -> Array1<T> {
        let n = self.num_rows.min(self.num_cols);
        match self.diagonal_offsets.binary_search(&0) {
            Ok(d) => self.values.column(d).slice(ndarray::s![..n]).to_owned(),
            Err(_) => Array1::from_elem(n, T::zero()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn tridiagonal(n: usize) -> CsrMatrix<f64> {
        let mut triplets = Vec::new();
        for i in 0..n {
            triplets.push((i, i, 2.0));
            if i > 0 {
                triplets.push((i, i - 1, -1.0));
            }
            if i + 1 < n {
                triplets.push((i, i + 1, -1.0));
            }
        }
        CsrMatrix::from_triplets(n, n, triplets)
    }

    #[test]
    fn test_tridiagonal_to_dia() {
        let csr = tridiagonal(5);
        let dia = DiaMatrix::from_csr(csr.clone()).expect("banded matrix converts");
        assert_eq!(dia.diagonal_offsets, vec![-1, 0, 1]);
        assert_eq!(dia.num_entries(), 13);
        // column-major: each diagonal contiguous
        assert!(dia.values.t().is_standard_layout());
        assert_eq!(dia.to_csr(), csr);
        assert_eq!(SparseMatrix::diagonal(&dia), array![2.0, 2.0, 2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_dia_apply_matches_csr() {
        let csr = tridiagonal(6);
        let dia = DiaMatrix::from_csr(csr.clone()).expect("banded matrix converts");
        let x = array![1.0, -2.0, 3.0, 0.5, 0.0, 4.0];
        let y_csr = csr.matvec(&x);
        let y_dia = dia.apply(&x);
        let yt_csr = csr.matvec_transpose(&x);
        let yt_dia = dia.apply_transpose(&x);
        for i in 0..6 {
            assert_relative_eq!(y_csr[i], y_dia[i], epsilon = 1e-14);
            assert_relative_eq!(yt_csr[i], yt_dia[i], epsilon = 1e-14);
        }
    }

    #[test]
    fn test_rectangular_dia() {
        let csr = CsrMatrix::from_triplets(2, 4, vec![(0, 3, 1.0), (1, 0, 2.0), (1, 1, 3.0)]);
        let dia = DiaMatrix::from_csr_with_fill(&csr, 10.0).expect("fill within limit");
        assert_eq!(dia.diagonal_offsets, vec![-1, 0, 3]);
        assert_eq!(dia.to_csr(), csr);
        assert_eq!(dia.apply(&array![1.0, 1.0, 1.0, 1.0]), array![1.0, 5.0]);
    }

    fn reversal(n: usize) -> CsrMatrix<f64> {
        CsrMatrix::from_triplets(n, n, (0..n).map(|i| (i, n - 1 - i, 1.0)).collect())
    }

    #[test]
    fn test_small_scattered_matrix_converts() {
        let csr = reversal(10);
        let dia = DiaMatrix::from_csr(csr.clone()).expect("below fill check size");
        assert_eq!(dia.num_diagonals(), 10);
        assert_eq!(dia.to_csr(), csr);
    }

    #[test]
    fn test_reversal_exceeds_fill_limit() {
        let err = DiaMatrix::from_csr(reversal(1100)).unwrap_err();
        assert!(matches!(err, StrategyError::FormatConversion(_)));
    }
}
