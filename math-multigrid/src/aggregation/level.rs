//! Per-level records of a smoothed aggregation hierarchy
//!
//! [`Level`] is what the solve phase consumes. [`SetupLevel`] is the state
//! needed to keep coarsening: the operator in setup format, the candidate
//! vector, the aggregation map and the cached spectral radius estimate.

use super::aggregate::check_partition;
use crate::sparse::{CsrMatrix, MatrixShape, SparseMatrix};
use crate::traits::ComplexField;
use ndarray::Array1;
use num_traits::Zero;

/// One level of the multilevel solver
#[derive(Debug, Clone)]
pub struct Level<T: ComplexField, M, Sm> {
    /// Level operator in the solve format; `None` until materialized
    pub a: Option<M>,
    /// Prolongation from the next coarser level (`rows(A) x rows(A_coarse)`)
    pub p: Option<M>,
    /// Restriction to the next coarser level
    pub r: Option<M>,
    /// Relaxation built from `a`
    pub smoother: Option<Sm>,
    /// Solution work vector, allocated below the finest level
    pub x: Array1<T>,
    /// Right-hand side work vector, allocated below the finest level
    pub b: Array1<T>,
    /// Residual work vector, allocated on levels with transfer operators
    pub residual: Array1<T>,
}

impl<T: ComplexField, M, Sm> Default for Level<T, M, Sm> {
    fn default() -> Self {
        Self {
            a: None,
            p: None,
            r: None,
            smoother: None,
            x: Array1::zeros(0),
            b: Array1::zeros(0),
            residual: Array1::zeros(0),
        }
    }
}

impl<T: ComplexField, M, Sm> Level<T, M, Sm> {
    /// Fresh coarse level with work vectors of length `n`
    pub(crate) fn with_work_vectors(n: usize) -> Self {
        Self {
            x: Array1::zeros(n),
            b: Array1::zeros(n),
            ..Default::default()
        }
    }

    /// `true` when this level owns `P` and `R`
    pub fn has_transfer_operators(&self) -> bool {
        self.p.is_some() && self.r.is_some()
    }
}

impl<T: ComplexField, M: SparseMatrix<T>, Sm> Level<T, M, Sm> {
    /// Shape of the level operator, if materialized
    pub fn shape(&self) -> Option<MatrixShape> {
        self.a.as_ref().map(|a| a.shape())
    }
}

/// Construction state of one level
#[derive(Debug, Clone, PartialEq)]
pub struct SetupLevel<T: ComplexField> {
    /// Level operator in setup format
    pub a: CsrMatrix<T>,
    /// Near-null-space candidate, one entry per row of `a`
    pub b: Array1<T>,
    /// Row → aggregate id; empty until this level is coarsened
    pub aggregates: Vec<usize>,
    /// `ρ(D⁻¹A)` estimate; zero until computed
    pub rho_dinv_a: T::Real,
}

impl<T: ComplexField> SetupLevel<T> {
    /// Record for an operator that has not been coarsened yet
    pub fn new(a: CsrMatrix<T>, b: Array1<T>) -> Self {
        Self {
            a,
            b,
            aggregates: Vec::new(),
            rho_dinv_a: T::Real::zero(),
        }
    }

    /// Number of rows of the level operator
    pub fn num_rows(&self) -> usize {
        self.a.num_rows
    }

    /// Number of aggregates formed on this level.
    ///
    /// Zero on the coarsest level, or when `aggregates` is not a partition
    /// of the rows.
    pub fn num_aggregates(&self) -> usize {
        check_partition(&self.aggregates, self.num_rows()).unwrap_or(0)
    }

    /// `true` once this level has been coarsened
    pub fn is_coarsened(&self) -> bool {
        !self.aggregates.is_empty()
    }
}
