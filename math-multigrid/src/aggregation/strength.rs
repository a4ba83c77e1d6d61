//! Strength of connection
//!
//! Symmetric measure: off-diagonal `(i, j)` is kept when
//! `|a_ij|² >= θ² |a_ii| |a_jj|`. Diagonal entries are always kept so the
//! filtered graph has the same shape and row set as `A`.

use crate::error::StrategyError;
use crate::parallel::parallel_map_indexed;
use crate::sparse::CsrMatrix;
use crate::traits::ComplexField;

/// Filter `a` down to its strong connections
pub fn symmetric_strength_of_connection<T: ComplexField>(
    a: &CsrMatrix<T>,
    theta: T::Real,
) -> Result<CsrMatrix<T>, StrategyError> {
    if a.num_rows != a.num_cols {
        return Err(StrategyError::NotSquare {
            rows: a.num_rows,
            cols: a.num_cols,
        });
    }

    let diag_norms: Vec<T::Real> = a.diagonal().iter().map(|d| d.norm()).collect();
    let theta_sqr = theta * theta;

    let rows = parallel_map_indexed(a.num_rows, |i| {
        a.row_entries(i)
            .filter(|&(j, a_ij)| {
                i == j || a_ij.norm_sqr() >= theta_sqr * diag_norms[i] * diag_norms[j]
            })
            .collect()
    });

    Ok(CsrMatrix::from_sorted_rows(a.num_rows, a.num_cols, rows))
}
