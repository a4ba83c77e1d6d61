//! Damped Jacobi smoother
//!
//! `x <- x + ω D⁻¹ (b - A x)`. Only element-wise work besides the SpMV, so
//! it parallelizes trivially.

use super::Smoother;
use crate::error::StrategyError;
use crate::sparse::SparseMatrix;
use crate::traits::{ComplexField, LinearOperator, Preconditioner};
use ndarray::Array1;
use num_traits::Zero;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Damping weight used by [`Smoother::from_level_matrix`]
pub const DEFAULT_JACOBI_WEIGHT: f64 = 2.0 / 3.0;

#[cfg(feature = "rayon")]
const PARALLEL_THRESHOLD: usize = 1000;

/// Damped Jacobi relaxation
///
/// Stores `ω / a_ii` per row. Also usable as a diagonal preconditioner,
/// in which case it applies `z = ω D⁻¹ r`.
#[derive(Debug, Clone)]
pub struct JacobiSmoother<T: ComplexField> {
    /// `weight / a_ii`
    scaled_inv_diag: Array1<T>,
    weight: T::Real,
}

impl<T: ComplexField> JacobiSmoother<T> {
    /// Build from an operator's diagonal with an explicit weight
    pub fn with_weight<M: SparseMatrix<T>>(a: &M, weight: T::Real) -> Result<Self, StrategyError> {
        if !a.is_square() {
            return Err(StrategyError::NotSquare {
                rows: a.num_rows(),
                cols: a.num_cols(),
            });
        }
        Self::from_diagonal(&a.diagonal(), weight)
    }

    /// Build from a diagonal vector directly
    pub fn from_diagonal(diag: &Array1<T>, weight: T::Real) -> Result<Self, StrategyError> {
        let w = T::from_real(weight);
        let mut scaled_inv_diag = Array1::from_elem(diag.len(), T::zero());
        for (row, (&d, out)) in diag.iter().zip(scaled_inv_diag.iter_mut()).enumerate() {
            if d.is_zero() {
                return Err(StrategyError::ZeroDiagonal { row });
            }
            *out = w * d.inv();
        }
        Ok(Self {
            scaled_inv_diag,
            weight,
        })
    }

    /// Damping weight ω
    pub fn weight(&self) -> T::Real {
        self.weight
    }

    /// Number of rows covered
    pub fn len(&self) -> usize {
        self.scaled_inv_diag.len()
    }

    /// `true` for a smoother built from an empty operator
    pub fn is_empty(&self) -> bool {
        self.scaled_inv_diag.is_empty()
    }

    fn scale_sequential(&self, r: &Array1<T>) -> Array1<T> {
        r.iter()
            .zip(self.scaled_inv_diag.iter())
            .map(|(&ri, &di)| ri * di)
            .collect()
    }

    #[cfg(feature = "rayon")]
    fn scale_parallel(&self, r: &Array1<T>) -> Array1<T> {
        match (r.as_slice(), self.scaled_inv_diag.as_slice()) {
            (Some(r_slice), Some(inv_slice)) => {
                let results: Vec<T> = r_slice
                    .par_iter()
                    .zip(inv_slice.par_iter())
                    .map(|(&ri, &di)| ri * di)
                    .collect();
                Array1::from_vec(results)
            }
            _ => self.scale_sequential(r),
        }
    }

    fn scale(&self, r: &Array1<T>) -> Array1<T> {
        assert_eq!(r.len(), self.len(), "Residual size mismatch");
        #[cfg(feature = "rayon")]
        {
            if r.len() >= PARALLEL_THRESHOLD {
                return self.scale_parallel(r);
            }
        }
        self.scale_sequential(r)
    }
}

impl<T: ComplexField, M: SparseMatrix<T>> Smoother<T, M> for JacobiSmoother<T> {
    fn from_level_matrix(a: &M) -> Result<Self, StrategyError> {
        Self::with_weight(a, T::real_from_f64(DEFAULT_JACOBI_WEIGHT))
    }

    fn relax(&self, a: &M, b: &Array1<T>, x: &mut Array1<T>) {
        let residual = b - &a.apply(x);
        *x += &self.scale(&residual);
    }
}

impl<T: ComplexField> Preconditioner<T> for JacobiSmoother<T> {
    fn apply(&self, r: &Array1<T>) -> Array1<T> {
        self.scale(r)
    }
}
