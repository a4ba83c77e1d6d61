//! Setup statistics of a smoothed aggregation hierarchy

use super::level::SetupLevel;
use crate::traits::ComplexField;
use num_traits::ToPrimitive;
use std::fmt;

/// Diagnostic information about hierarchy setup
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SaDiagnostics {
    /// Number of levels
    pub num_levels: usize,
    /// Sum of rows over all levels divided by fine rows
    pub grid_complexity: f64,
    /// Sum of entries over all levels divided by fine entries
    pub operator_complexity: f64,
    /// Setup time in milliseconds
    pub setup_time_ms: f64,
    /// Rows per level
    pub level_rows: Vec<usize>,
    /// Stored entries per level
    pub level_nnz: Vec<usize>,
    /// Aggregates formed on each level (zero on the coarsest)
    pub level_aggregates: Vec<usize>,
    /// `ρ(D⁻¹A)` estimate per level (zero where not computed)
    pub level_rho: Vec<f64>,
}

impl SaDiagnostics {
    pub(crate) fn from_setup_levels<T: ComplexField>(levels: &[SetupLevel<T>], setup_time_ms: f64) -> Self {
        let level_rows: Vec<usize> = levels.iter().map(SetupLevel::num_rows).collect();
        let level_nnz: Vec<usize> = levels.iter().map(|l| l.a.nnz()).collect();

        let ratio = |counts: &[usize]| match counts.first() {
            Some(&fine) if fine > 0 => counts.iter().sum::<usize>() as f64 / fine as f64,
            _ => 1.0,
        };

        Self {
            num_levels: levels.len(),
            grid_complexity: ratio(&level_rows),
            operator_complexity: ratio(&level_nnz),
            setup_time_ms,
            level_aggregates: levels.iter().map(SetupLevel::num_aggregates).collect(),
            level_rho: levels
                .iter()
                .map(|l| l.rho_dinv_a.to_f64().unwrap_or(f64::NAN))
                .collect(),
            level_rows,
            level_nnz,
        }
    }
}

impl fmt::Display for SaDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Smoothed aggregation hierarchy: {} levels, setup {:.2} ms",
            self.num_levels, self.setup_time_ms
        )?;
        writeln!(
            f,
            "{:>5} {:>10} {:>12} {:>10} {:>10}",
            "level", "rows", "nnz", "aggs", "rho"
        )?;
        for lvl in 0..self.num_levels {
            writeln!(
                f,
                "{:>5} {:>10} {:>12} {:>10} {:>10.4}",
                lvl,
                self.level_rows[lvl],
                self.level_nnz[lvl],
                self.level_aggregates[lvl],
                self.level_rho[lvl]
            )?;
        }
        write!(
            f,
            "grid complexity {:.3}, operator complexity {:.3}",
            self.grid_complexity, self.operator_complexity
        )
    }
}
