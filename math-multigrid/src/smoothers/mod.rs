//! Per-level relaxation
//!
//! Every level of a multilevel hierarchy owns a smoother built from that
//! level's operator in the solve format. The default is damped Jacobi.

mod jacobi;

pub use jacobi::{DEFAULT_JACOBI_WEIGHT, JacobiSmoother};

use crate::error::StrategyError;
use crate::sparse::SparseMatrix;
use crate::traits::ComplexField;
use ndarray::Array1;

/// Relaxation scheme attached to a hierarchy level
pub trait Smoother<T: ComplexField, M: SparseMatrix<T>>: Sized + Send + Sync {
    /// Build the smoother for operator `a`
    fn from_level_matrix(a: &M) -> Result<Self, StrategyError>;

    /// One relaxation sweep on `a x = b`, updating `x` in place
    fn relax(&self, a: &M, b: &Array1<T>, x: &mut Array1<T>);
}
