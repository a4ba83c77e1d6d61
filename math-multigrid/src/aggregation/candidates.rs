//! Tentative prolongator from aggregates and a near-null-space candidate
//!
//! `T` has one entry per fine row, in the column of the row's aggregate:
//! `T[i, agg(i)] = B[i] / ‖B|agg(i)‖`. The coarse candidate holds the
//! aggregate norms, so `T * B_coarse == B` and the columns of `T` are
//! orthonormal.

use crate::error::StrategyError;
use crate::sparse::CsrMatrix;
use crate::traits::ComplexField;
use ndarray::Array1;
use num_traits::{Float, Zero};

/// Build `(T, B_coarse)` for `aggregates` and candidate `b`
pub fn fit_candidates<T: ComplexField>(
    aggregates: &[usize],
    b: &Array1<T>,
) -> Result<(CsrMatrix<T>, Array1<T>), StrategyError> {
    let n = aggregates.len();
    if b.len() != n {
        return Err(StrategyError::DimensionMismatch {
            what: "candidate vector",
            expected: n,
            got: b.len(),
        });
    }

    if let Some(&id) = aggregates.iter().find(|&&id| id >= n) {
        return Err(StrategyError::InvalidAggregates(format!(
            "aggregate id {id} out of range for {n} rows"
        )));
    }

    let num_aggregates = aggregates.iter().max().map_or(0, |&m| m + 1);
    let mut norms = vec![T::Real::zero(); num_aggregates];
    for (&agg, bi) in aggregates.iter().zip(b.iter()) {
        norms[agg] += bi.norm_sqr();
    }
    for norm in &mut norms {
        *norm = Float::sqrt(*norm);
    }

    let values = aggregates
        .iter()
        .zip(b.iter())
        .map(|(&agg, &bi)| {
            let norm = norms[agg];
            if norm > T::Real::zero() {
                bi * T::from_real(norm).inv()
            } else {
                T::zero()
            }
        })
        .collect();

    let t = CsrMatrix::from_raw_parts(
        n,
        num_aggregates,
        (0..=n).collect(),
        aggregates.to_vec(),
        values,
    )?;
    let b_coarse = norms.into_iter().map(T::from_real).collect();

    Ok((t, b_coarse))
}
