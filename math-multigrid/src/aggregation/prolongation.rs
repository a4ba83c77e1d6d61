//! Jacobi smoothing of the tentative prolongator
//!
//! `P = T - (ω / ρ) D⁻¹ A T`, where `ρ` estimates the spectral radius of
//! `D⁻¹A`. The estimate comes from a seeded power iteration so that
//! repeated setups of the same operator give identical hierarchies.

use crate::error::StrategyError;
use crate::sparse::CsrMatrix;
use crate::traits::ComplexField;
use crate::vector_ops::normalize;
use ndarray::Array1;
use num_traits::Zero;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// `1 / a_ii` for every row, failing on a zero diagonal
pub fn inverse_diagonal<T: ComplexField>(a: &CsrMatrix<T>) -> Result<Array1<T>, StrategyError> {
    a.diagonal()
        .iter()
        .enumerate()
        .map(|(row, d)| {
            if d.is_zero() {
                Err(StrategyError::ZeroDiagonal { row })
            } else {
                Ok(d.inv())
            }
        })
        .collect()
}

/// Estimate `ρ(D⁻¹A)` with `iterations` steps of the power method
pub fn estimate_rho_dinv_a<T: ComplexField>(
    a: &CsrMatrix<T>,
    iterations: usize,
    seed: u64,
) -> Result<T::Real, StrategyError> {
    if a.num_rows != a.num_cols {
        return Err(StrategyError::NotSquare {
            rows: a.num_rows,
            cols: a.num_cols,
        });
    }
    let dinv = inverse_diagonal(a)?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut x: Array1<T> = (0..a.num_rows)
        .map(|_| T::from_real(T::real_from_f64(rng.random::<f64>() + 0.5)))
        .collect();
    normalize(&mut x);

    let mut rho = T::Real::zero();
    for _ in 0..iterations.max(1) {
        let mut y = a.matvec(&x) * &dinv;
        rho = normalize(&mut y);
        if rho.is_zero() {
            break;
        }
        x = y;
    }

    log::trace!("power iteration estimate of rho(D^-1 A): {rho:?}");
    Ok(rho)
}

/// Smooth `t` against `a`; returns `P` and the `ρ(D⁻¹A)` estimate used.
///
/// A non-positive `rho` is recomputed with [`estimate_rho_dinv_a`].
pub fn smooth_prolongator<T: ComplexField>(
    a: &CsrMatrix<T>,
    t: &CsrMatrix<T>,
    rho: T::Real,
    omega: T::Real,
    power_iterations: usize,
    seed: u64,
) -> Result<(CsrMatrix<T>, T::Real), StrategyError> {
    if a.num_rows != a.num_cols {
        return Err(StrategyError::NotSquare {
            rows: a.num_rows,
            cols: a.num_cols,
        });
    }
    if t.num_rows != a.num_cols {
        return Err(StrategyError::DimensionMismatch {
            what: "tentative prolongator rows",
            expected: a.num_cols,
            got: t.num_rows,
        });
    }

    let rho = if rho > T::Real::zero() {
        rho
    } else {
        estimate_rho_dinv_a(a, power_iterations, seed)?
    };
    if !(rho > T::Real::zero()) {
        return Err(StrategyError::Failed(
            "spectral radius estimate of D^-1 A is zero".into(),
        ));
    }

    let mut dinv_at = a.matmul(t)?;
    dinv_at.scale_rows(&inverse_diagonal(a)?)?;
    let p = t.add_scaled(&dinv_at, -T::from_real(omega / rho))?;

    Ok((p, rho))
}
