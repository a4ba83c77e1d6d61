//! Coarsest-level solvers
//!
//! The hierarchy hands its coarsest setup operator to a [`CoarseSolver`]
//! factory once coarsening stops. [`LuFactorization`] is the default.

mod lu;

pub use lu::{LuError, LuFactorization, lu_factorize, lu_solve};

use crate::error::StrategyError;
use crate::sparse::CsrMatrix;
use crate::traits::ComplexField;
use ndarray::Array1;

/// Direct solver for the coarsest operator of a hierarchy
pub trait CoarseSolver<T: ComplexField>: Sized + Send + Sync {
    /// Build the solver from the coarsest operator in setup format
    fn from_setup_matrix(a: &CsrMatrix<T>) -> Result<Self, StrategyError>;

    /// Dimension of the system this solver was built for
    fn num_rows(&self) -> usize;

    /// Solve `A x = b`
    fn solve(&self, b: &Array1<T>) -> Result<Array1<T>, StrategyError>;
}
