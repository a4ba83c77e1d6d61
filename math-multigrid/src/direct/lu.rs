//! Dense LU factorization with partial pivoting
//!
//! Used as the coarsest-level solver of a hierarchy: the coarsest operator
//! is small by construction, so it is densified and factored once.

use super::CoarseSolver;
use crate::error::StrategyError;
use crate::sparse::CsrMatrix;
use crate::traits::ComplexField;
use ndarray::{Array1, Array2};
use num_traits::Zero;
use thiserror::Error;

/// Pivots below this magnitude are treated as zero
const SINGULAR_PIVOT: f64 = 1e-30;

/// Errors that can occur during LU factorization
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LuError {
    #[error("Matrix is singular or nearly singular (pivot column {column})")]
    SingularMatrix { column: usize },
    #[error("Matrix dimensions mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// LU factorization result
///
/// `lu` holds U on and above the diagonal and the unit lower triangular L
/// below it. `pivots[k]` is the row swapped with row `k` at elimination
/// step `k`.
#[derive(Debug, Clone)]
pub struct LuFactorization<T: ComplexField> {
    /// Combined L and U factors
    pub lu: Array2<T>,
    /// Row interchanges, applied in order
    pub pivots: Vec<usize>,
    /// Matrix dimension
    pub n: usize,
}

impl<T: ComplexField> LuFactorization<T> {
    /// Factor a dense square matrix
    pub fn new(a: &Array2<T>) -> Result<Self, LuError> {
        lu_factorize(a)
    }

    /// Densify and factor a sparse matrix
    pub fn from_csr(a: &CsrMatrix<T>) -> Result<Self, LuError> {
        if a.num_rows != a.num_cols {
            return Err(LuError::DimensionMismatch {
                expected: a.num_rows,
                got: a.num_cols,
            });
        }
        lu_factorize(&a.to_dense())
    }

    /// Solve Ax = b using the pre-computed factorization
    pub fn solve(&self, b: &Array1<T>) -> Result<Array1<T>, LuError> {
        if b.len() != self.n {
            return Err(LuError::DimensionMismatch {
                expected: self.n,
                got: b.len(),
            });
        }

        let mut x = b.clone();
        for (k, &p) in self.pivots.iter().enumerate() {
            if p != k {
                x.swap(k, p);
            }
        }

        // Ly = Pb
        for i in 0..self.n {
            let mut acc = x[i];
            for j in 0..i {
                acc -= self.lu[[i, j]] * x[j];
            }
            x[i] = acc;
        }

        // Ux = y
        for i in (0..self.n).rev() {
            let mut acc = x[i];
            for j in (i + 1)..self.n {
                acc -= self.lu[[i, j]] * x[j];
            }
            x[i] = acc * self.lu[[i, i]].inv();
        }

        Ok(x)
    }
}

/// Compute LU factorization with partial pivoting
pub fn lu_factorize<T: ComplexField>(a: &Array2<T>) -> Result<LuFactorization<T>, LuError> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(LuError::DimensionMismatch {
            expected: n,
            got: a.ncols(),
        });
    }

    let tol = T::real_from_f64(SINGULAR_PIVOT);
    let mut lu = a.clone();
    let mut pivots = Vec::with_capacity(n);

    for k in 0..n {
        let (max_row, max_val) = (k..n)
            .map(|i| (i, lu[[i, k]].norm()))
            .fold((k, T::Real::zero()), |best, cand| {
                if cand.1 > best.1 { cand } else { best }
            });

        if max_val < tol {
            return Err(LuError::SingularMatrix { column: k });
        }

        if max_row != k {
            for j in 0..n {
                lu.swap([k, j], [max_row, j]);
            }
        }
        pivots.push(max_row);

        let inv_pivot = lu[[k, k]].inv();
        for i in (k + 1)..n {
            let mult = lu[[i, k]] * inv_pivot;
            lu[[i, k]] = mult;
            for j in (k + 1)..n {
                let update = mult * lu[[k, j]];
                lu[[i, j]] -= update;
            }
        }
    }

    Ok(LuFactorization { lu, pivots, n })
}

/// Solve Ax = b using LU decomposition
///
/// Convenience wrapper combining factorization and solve.
pub fn lu_solve<T: ComplexField>(a: &Array2<T>, b: &Array1<T>) -> Result<Array1<T>, LuError> {
    lu_factorize(a)?.solve(b)
}

impl<T: ComplexField> CoarseSolver<T> for LuFactorization<T> {
    fn from_setup_matrix(a: &CsrMatrix<T>) -> Result<Self, StrategyError> {
        if a.num_rows != a.num_cols {
            return Err(StrategyError::NotSquare {
                rows: a.num_rows,
                cols: a.num_cols,
            });
        }
        Ok(Self::from_csr(a)?)
    }

    fn num_rows(&self) -> usize {
        self.n
    }

    fn solve(&self, b: &Array1<T>) -> Result<Array1<T>, StrategyError> {
        Ok(LuFactorization::solve(self, b)?)
    }
}
