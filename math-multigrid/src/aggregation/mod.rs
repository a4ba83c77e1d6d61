//! Smoothed aggregation (SA) algebraic multigrid setup
//!
//! [`SmoothedAggregation`] builds the level hierarchy; the algorithms used
//! at each coarsening step come from an [`SaStrategy`], by default
//! [`StandardStrategy`]. The free functions below are the building blocks
//! of the standard strategy and can be reused by custom ones.

mod aggregate;
mod candidates;
mod diagnostics;
mod hierarchy;
mod level;
mod options;
mod prolongation;
mod strength;

pub use aggregate::{check_partition, standard_aggregation};
pub use candidates::fit_candidates;
pub use diagnostics::SaDiagnostics;
pub use hierarchy::{HierarchySummary, SmoothedAggregation};
pub use level::{Level, SetupLevel};
pub use options::{SaOptions, SaStrategy, StandardStrategy};
pub use prolongation::{estimate_rho_dinv_a, inverse_diagonal, smooth_prolongator};
pub use strength::symmetric_strength_of_connection;
