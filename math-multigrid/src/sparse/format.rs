//! Matrix capability set shared by every storage format
//!
//! The hierarchy builder works on [`CsrMatrix`](super::CsrMatrix) while it
//! coarsens and stores each level in a solve format chosen by the caller.
//! Moving between the two is always an explicit [`SparseMatrix::from_csr`]
//! call, never an implicit overload.

use super::CsrMatrix;
use crate::error::StrategyError;
use crate::traits::{ComplexField, LinearOperator};
use ndarray::Array1;
use std::fmt;

/// Storage format tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SparseFormat {
    /// Coordinate triplets
    Coo,
    /// Compressed sparse row
    Csr,
    /// Diagonal (banded) storage
    Dia,
}

impl fmt::Display for SparseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SparseFormat::Coo => f.write_str("COO"),
            SparseFormat::Csr => f.write_str("CSR"),
            SparseFormat::Dia => f.write_str("DIA"),
        }
    }
}

/// Shape and stored entry count of a matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatrixShape {
    /// Number of rows
    pub num_rows: usize,
    /// Number of columns
    pub num_cols: usize,
    /// Number of stored entries
    pub num_entries: usize,
}

impl fmt::Display for MatrixShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} ({} entries)",
            self.num_rows, self.num_cols, self.num_entries
        )
    }
}

/// Sparse matrix storage usable as a hierarchy operator.
///
/// Conversions go through CSR: `to_csr` copies out, `from_csr` takes
/// ownership so that a CSR→CSR conversion is a plain move.
pub trait SparseMatrix<T: ComplexField>: LinearOperator<T> + Clone {
    /// Format tag of this storage
    const FORMAT: SparseFormat;

    /// Number of stored entries
    fn num_entries(&self) -> usize;

    /// Copy into compressed sparse row storage
    fn to_csr(&self) -> CsrMatrix<T>;

    /// Build from compressed sparse row storage, consuming it
    fn from_csr(csr: CsrMatrix<T>) -> Result<Self, StrategyError>;

    /// Main diagonal, length `min(num_rows, num_cols)`
    fn diagonal(&self) -> Array1<T>;

    /// Shape and entry count
    fn shape(&self) -> MatrixShape {
        MatrixShape {
            num_rows: self.num_rows(),
            num_cols: self.num_cols(),
            num_entries: self.num_entries(),
        }
    }

    /// Exchange contents with another matrix of the same format
    fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_display() {
        let shape = MatrixShape {
            num_rows: 4,
            num_cols: 3,
            num_entries: 7,
        };
        assert_eq!(shape.to_string(), "4x3 (7 entries)");
        assert_eq!(SparseFormat::Dia.to_string(), "DIA");
    }
}
