//! Strategy bundle for smoothed aggregation
//!
//! [`SaOptions`] carries the two termination controls plus one
//! [`SaStrategy`] value supplying the six coarsening algorithms.
//! [`StandardStrategy`] is the default: symmetric strength of connection,
//! standard aggregation, normalized candidate fitting, Jacobi prolongation
//! smoothing, transpose restriction and a two-product Galerkin operator.

use super::aggregate::standard_aggregation;
use super::candidates::fit_candidates;
use super::prolongation::smooth_prolongator;
use super::strength::symmetric_strength_of_connection;
use crate::error::{AmgError, StrategyError};
use crate::sparse::CsrMatrix;
use crate::traits::ComplexField;
use ndarray::Array1;

/// The six algorithm slots of one coarsening step.
///
/// Every method sees CSR matrices only. Implementations must be cheap to
/// clone and shareable between threads; hierarchies copy the strategy by
/// value.
pub trait SaStrategy<T: ComplexField>: Clone + Send + Sync {
    /// Filtered operator graph used to drive aggregation; same shape as `a`
    fn strength_of_connection(&self, a: &CsrMatrix<T>) -> Result<CsrMatrix<T>, StrategyError>;

    /// Map each row of `c` to an aggregate id in `0..k`
    fn aggregate(&self, c: &CsrMatrix<T>) -> Result<Vec<usize>, StrategyError>;

    /// Tentative prolongator `T` (`n x k`) and coarse candidate (`k`)
    fn fit_candidates(
        &self,
        aggregates: &[usize],
        b: &Array1<T>,
    ) -> Result<(CsrMatrix<T>, Array1<T>), StrategyError>;

    /// Smoothed prolongator from `a` and `t`.
    ///
    /// `rho` is the cached spectral radius estimate of `D⁻¹A` for this
    /// level; a non-positive value asks the strategy to compute it. The
    /// estimate actually used is returned alongside `P`.
    fn smooth_prolongator(
        &self,
        a: &CsrMatrix<T>,
        t: &CsrMatrix<T>,
        rho: T::Real,
    ) -> Result<(CsrMatrix<T>, T::Real), StrategyError>;

    /// Restriction from the prolongator, `Pᵗ` unless overridden
    fn form_restriction(&self, p: &CsrMatrix<T>) -> Result<CsrMatrix<T>, StrategyError> {
        Ok(p.transpose())
    }

    /// Coarse operator `R * (A * P)`
    fn galerkin_product(
        &self,
        r: &CsrMatrix<T>,
        a: &CsrMatrix<T>,
        p: &CsrMatrix<T>,
    ) -> Result<CsrMatrix<T>, StrategyError> {
        let ap = a.matmul(p)?;
        r.matmul(&ap)
    }
}

/// Default smoothed aggregation numerics
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StandardStrategy {
    /// Strength threshold θ: `(i, j)` is strong when
    /// `|a_ij|² >= θ² |a_ii| |a_jj|`. Zero keeps every entry.
    pub theta: f64,

    /// Prolongation smoothing weight; the Jacobi step uses `omega / rho`
    pub omega: f64,

    /// Power iterations for the `ρ(D⁻¹A)` estimate
    pub power_iterations: usize,

    /// Seed of the power iteration start vector
    pub seed: u64,
}

impl Default for StandardStrategy {
    fn default() -> Self {
        Self {
            theta: 0.0,
            omega: 4.0 / 3.0,
            power_iterations: 20,
            seed: 42,
        }
    }
}

impl StandardStrategy {
    /// Isotropic diffusion: keep every connection
    pub fn for_poisson() -> Self {
        Self::default()
    }

    /// Anisotropic or stretched problems: drop weak couplings so that
    /// aggregates follow the strong direction
    pub fn for_anisotropic() -> Self {
        Self {
            theta: 0.25,
            power_iterations: 30,
            ..Default::default()
        }
    }

    /// Set the strength threshold
    pub fn with_theta(mut self, theta: f64) -> Self {
        self.theta = theta;
        self
    }

    /// Set the prolongation smoothing weight
    pub fn with_omega(mut self, omega: f64) -> Self {
        self.omega = omega;
        self
    }
}

impl<T: ComplexField> SaStrategy<T> for StandardStrategy {
    fn strength_of_connection(&self, a: &CsrMatrix<T>) -> Result<CsrMatrix<T>, StrategyError> {
        symmetric_strength_of_connection(a, T::real_from_f64(self.theta))
    }

    fn aggregate(&self, c: &CsrMatrix<T>) -> Result<Vec<usize>, StrategyError> {
        standard_aggregation(c)
    }

    fn fit_candidates(
        &self,
        aggregates: &[usize],
        b: &Array1<T>,
    ) -> Result<(CsrMatrix<T>, Array1<T>), StrategyError> {
        fit_candidates(aggregates, b)
    }

    fn smooth_prolongator(
        &self,
        a: &CsrMatrix<T>,
        t: &CsrMatrix<T>,
        rho: T::Real,
    ) -> Result<(CsrMatrix<T>, T::Real), StrategyError> {
        smooth_prolongator(
            a,
            t,
            rho,
            T::real_from_f64(self.omega),
            self.power_iterations,
            self.seed,
        )
    }
}

/// Termination controls plus the coarsening strategy
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SaOptions<S = StandardStrategy> {
    /// Maximum number of levels, finest included
    pub max_levels: usize,

    /// Stop coarsening once a level has at most this many rows
    pub min_level_size: usize,

    /// Algorithms used by every coarsening step
    pub strategy: S,
}

impl<S: Default> Default for SaOptions<S> {
    fn default() -> Self {
        Self {
            max_levels: 20,
            min_level_size: 100,
            strategy: S::default(),
        }
    }
}

impl SaOptions<StandardStrategy> {
    /// Defaults tuned for Poisson-like operators
    pub fn for_poisson() -> Self {
        Self {
            strategy: StandardStrategy::for_poisson(),
            ..Default::default()
        }
    }

    /// Defaults for anisotropic operators
    pub fn for_anisotropic() -> Self {
        Self {
            strategy: StandardStrategy::for_anisotropic(),
            ..Default::default()
        }
    }
}

impl<S> SaOptions<S> {
    /// Options with a custom strategy and default limits
    pub fn with_strategy(strategy: S) -> Self {
        Self {
            max_levels: 20,
            min_level_size: 100,
            strategy,
        }
    }

    /// Set the maximum number of levels
    pub fn max_levels(mut self, max_levels: usize) -> Self {
        self.max_levels = max_levels;
        self
    }

    /// Set the coarsest admissible level size
    pub fn min_level_size(mut self, min_level_size: usize) -> Self {
        self.min_level_size = min_level_size;
        self
    }

    /// Check the termination controls
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.max_levels == 0 {
            return Err(AmgError::InvalidConfiguration(
                "max_levels must be at least 1".into(),
            ));
        }
        if self.min_level_size == 0 {
            return Err(AmgError::InvalidConfiguration(
                "min_level_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_options() {
        let opts: SaOptions = SaOptions::default();
        assert_eq!(opts.max_levels, 20);
        assert_eq!(opts.min_level_size, 100);
        assert_relative_eq!(opts.strategy.theta, 0.0);
        assert_relative_eq!(opts.strategy.omega, 4.0 / 3.0);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        let aniso = SaOptions::for_anisotropic();
        assert!(aniso.strategy.theta > 0.0);
        assert_eq!(SaOptions::for_poisson(), SaOptions::default());
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let err = SaOptions::for_poisson().max_levels(0).validate().unwrap_err();
        assert!(err.is_config_error());

        let err = SaOptions::for_poisson()
            .min_level_size(0)
            .validate()
            .unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_default_restriction_is_transpose() {
        let p = CsrMatrix::from_triplets(3, 2, vec![(0, 0, 1.0), (1, 0, 0.5), (2, 1, 2.0)]);
        let r = SaStrategy::<f64>::form_restriction(&StandardStrategy::default(), &p)
            .expect("transpose cannot fail");
        assert_eq!(r, p.transpose());
    }

    #[test]
    fn test_galerkin_product_of_identity_transfer() {
        let a = CsrMatrix::from_triplets(2, 2, vec![(0, 0, 2.0), (0, 1, -1.0), (1, 0, -1.0), (1, 1, 2.0)]);
        let id = CsrMatrix::identity(2);
        let rap = StandardStrategy::default()
            .galerkin_product(&id, &a, &id)
            .expect("conforming");
        assert_eq!(rap, a);
    }
}
