//! Sparse matrix storage formats
//!
//! - [`CsrMatrix`]: compressed sparse row, the setup format
//! - [`CooMatrix`]: coordinate triplets, for assembly
//! - [`DiaMatrix`]: diagonal storage for banded operators
//!
//! All three implement [`SparseMatrix`] and can be used as the solve format
//! of a hierarchy.

mod coo;
mod csr;
mod dia;
mod format;

pub use coo::CooMatrix;
pub use csr::CsrMatrix;
pub use dia::{DEFAULT_MAX_FILL, DiaMatrix, FILL_CHECK_MIN_SLOTS};
pub use format::{MatrixShape, SparseFormat, SparseMatrix};
