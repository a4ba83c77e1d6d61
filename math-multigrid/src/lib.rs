//! Smoothed aggregation algebraic multigrid setup
//!
//! This crate builds the level hierarchy of a smoothed aggregation (SA)
//! AMG preconditioner for large sparse systems: coarse operators, transfer
//! operators, per-level smoothers and a coarsest-level direct solver.
//!
//! # Features
//!
//! - **Hierarchy construction**: [`SmoothedAggregation`] with pluggable
//!   coarsening algorithms ([`SaStrategy`], default [`StandardStrategy`])
//! - **Sparse formats**: CSR (setup format), COO and banded DIA, all usable
//!   as the solve format of the levels
//! - **Smoothers**: damped Jacobi
//! - **Coarse solver**: dense LU with partial pivoting
//! - **Generic Scalar Types**: Works with Complex64, Complex32, f64, f32
//!
//! # Example
//!
//! ```
//! use math_audio_multigrid::{CsrMatrix, DiaMatrix, JacobiSmoother, LuFactorization};
//! use math_audio_multigrid::{SaOptions, SmoothedAggregation};
//!
//! let n = 500;
//! let mut triplets = Vec::new();
//! for i in 0..n {
//!     triplets.push((i, i, 2.0));
//!     if i > 0 {
//!         triplets.push((i, i - 1, -1.0));
//!     }
//!     if i + 1 < n {
//!         triplets.push((i, i + 1, -1.0));
//!     }
//! }
//! let a = CsrMatrix::from_triplets(n, n, triplets);
//!
//! let sa: SmoothedAggregation<f64> =
//!     SmoothedAggregation::build(&a, SaOptions::default().min_level_size(10))?;
//! println!("{}", sa.diagnostics());
//!
//! // same hierarchy with banded level operators
//! let banded = sa.rebind::<DiaMatrix<f64>, JacobiSmoother<f64>, LuFactorization<f64>>()?;
//! assert_eq!(banded.num_levels(), sa.num_levels());
//! # Ok::<(), math_audio_multigrid::AmgError>(())
//! ```

pub mod aggregation;
pub mod direct;
pub mod error;
pub mod parallel;
pub mod smoothers;
pub mod sparse;
pub mod traits;
pub mod vector_ops;

// Re-export main types
pub use aggregation::{
    HierarchySummary, Level, SaDiagnostics, SaOptions, SaStrategy, SetupLevel,
    SmoothedAggregation, StandardStrategy,
};
pub use error::{AmgError, Result, SetupStep, StrategyError};
pub use sparse::{CooMatrix, CsrMatrix, DiaMatrix, MatrixShape, SparseFormat, SparseMatrix};
pub use traits::{ComplexField, LinearOperator, Preconditioner};

// Re-export smoothers and coarse solvers
pub use direct::{CoarseSolver, LuError, LuFactorization, lu_solve};
pub use smoothers::{JacobiSmoother, Smoother};
