//! Standard aggregation of a strength-of-connection graph
//!
//! Two passes over the rows of `C`, neighbours being the off-diagonal
//! columns of a row:
//!
//! 1. A row whose neighbours are all unaggregated becomes the root of a new
//!    aggregate containing itself and those neighbours.
//! 2. Every row still free joins the aggregate of its first neighbour that
//!    was placed in pass 1.
//!
//! A row skipped in pass 1 always has a neighbour placed in pass 1, and
//! rows without neighbours form singleton aggregates there, so the result
//! is a total partition onto `0..k`.

use crate::error::StrategyError;
use crate::sparse::CsrMatrix;
use crate::traits::ComplexField;

/// Partition the rows of `c` into aggregates
pub fn standard_aggregation<T: ComplexField>(
    c: &CsrMatrix<T>,
) -> Result<Vec<usize>, StrategyError> {
    if c.num_rows != c.num_cols {
        return Err(StrategyError::NotSquare {
            rows: c.num_rows,
            cols: c.num_cols,
        });
    }

    let n = c.num_rows;
    let neighbours = |i: usize| c.row_entries(i).map(|(j, _)| j).filter(move |&j| j != i);

    let mut aggregates: Vec<Option<usize>> = vec![None; n];
    let mut next_id = 0usize;

    // roots
    for i in 0..n {
        if aggregates[i].is_some() {
            continue;
        }
        if neighbours(i).any(|j| aggregates[j].is_some()) {
            continue;
        }
        aggregates[i] = Some(next_id);
        for j in neighbours(i) {
            aggregates[j] = Some(next_id);
        }
        next_id += 1;
    }

    // stragglers
    let roots = aggregates.clone();
    for i in 0..n {
        if aggregates[i].is_some() {
            continue;
        }
        if let Some(id) = neighbours(i).find_map(|j| roots[j]) {
            aggregates[i] = Some(id);
        }
    }

    log::trace!("standard aggregation: {n} rows -> {next_id} aggregates");

    aggregates
        .into_iter()
        .enumerate()
        .map(|(i, id)| {
            id.ok_or_else(|| StrategyError::InvalidAggregates(format!("row {i} left unaggregated")))
        })
        .collect()
}

/// Check that `aggregates` maps `num_rows` rows onto every id in `0..k`.
///
/// Ids must be below `num_rows`, since a total partition has at most one
/// aggregate per row. Returns the number of aggregates `k`.
pub fn check_partition(aggregates: &[usize], num_rows: usize) -> Result<usize, StrategyError> {
    if aggregates.len() != num_rows {
        return Err(StrategyError::InvalidAggregates(format!(
            "expected {num_rows} entries, got {}",
            aggregates.len()
        )));
    }

    if let Some((row, &id)) = aggregates.iter().enumerate().find(|&(_, &id)| id >= num_rows) {
        return Err(StrategyError::InvalidAggregates(format!(
            "row {row} has aggregate id {id}, expected < {num_rows}"
        )));
    }

    let num_aggregates = aggregates.iter().max().map_or(0, |&m| m + 1);
    let mut used = vec![false; num_aggregates];
    for &id in aggregates {
        used[id] = true;
    }
    if let Some(missing) = used.iter().position(|&u| !u) {
        return Err(StrategyError::InvalidAggregates(format!(
            "aggregate id {missing} of 0..{num_aggregates} is empty"
        )));
    }

    Ok(num_aggregates)
}
