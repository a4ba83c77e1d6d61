//! Core traits shared by the sparse kernels, the smoothers and the hierarchy
//!
//! - [`ComplexField`]: scalar abstraction over real and complex numbers
//! - [`LinearOperator`]: anything that can compute `y = A * x`
//! - [`Preconditioner`]: an approximate inverse `z = M⁻¹ r`

use ndarray::Array1;
use num_complex::{Complex32, Complex64};
use num_traits::{Float, FromPrimitive, NumAssign, One, ToPrimitive, Zero};
use std::fmt::Debug;
use std::ops::Neg;

/// Scalar type usable in the multigrid setup.
///
/// Implemented for `f32`, `f64`, `Complex32` and `Complex64`. Magnitudes,
/// thresholds and spectral radius estimates live in [`ComplexField::Real`].
pub trait ComplexField:
    NumAssign
    + Clone
    + Copy
    + Send
    + Sync
    + Debug
    + PartialEq
    + Zero
    + One
    + Neg<Output = Self>
    + 'static
{
    /// The real number type underlying this field
    type Real: Float + NumAssign + FromPrimitive + ToPrimitive + Send + Sync + Debug + 'static;

    /// Complex conjugate
    fn conj(&self) -> Self;

    /// Squared magnitude |z|²
    fn norm_sqr(&self) -> Self::Real;

    /// Magnitude |z|
    fn norm(&self) -> Self::Real {
        self.norm_sqr().sqrt()
    }

    /// Embed a real value
    fn from_real(r: Self::Real) -> Self;

    /// Convert an `f64` constant into the real type
    fn real_from_f64(v: f64) -> Self::Real;

    /// Real part
    fn re(&self) -> Self::Real;

    /// Multiplicative inverse (1/z)
    fn inv(&self) -> Self;
}

macro_rules! impl_real_field {
    ($t:ty) => {
        impl ComplexField for $t {
            type Real = $t;

            #[inline]
            fn conj(&self) -> Self {
                *self
            }

            #[inline]
            fn norm_sqr(&self) -> $t {
                *self * *self
            }

            #[inline]
            fn norm(&self) -> $t {
                self.abs()
            }

            #[inline]
            fn from_real(r: $t) -> Self {
                r
            }

            #[inline]
            fn real_from_f64(v: f64) -> $t {
                v as $t
            }

            #[inline]
            fn re(&self) -> $t {
                *self
            }

            #[inline]
            fn inv(&self) -> Self {
                1.0 / *self
            }
        }
    };
}

macro_rules! impl_complex_field {
    ($t:ty, $r:ty) => {
        impl ComplexField for $t {
            type Real = $r;

            #[inline]
            fn conj(&self) -> Self {
                <$t>::new(self.re, -self.im)
            }

            #[inline]
            fn norm_sqr(&self) -> $r {
                self.re * self.re + self.im * self.im
            }

            #[inline]
            fn from_real(r: $r) -> Self {
                <$t>::new(r, 0.0)
            }

            #[inline]
            fn real_from_f64(v: f64) -> $r {
                v as $r
            }

            #[inline]
            fn re(&self) -> $r {
                self.re
            }

            #[inline]
            fn inv(&self) -> Self {
                let denom = self.norm_sqr();
                <$t>::new(self.re / denom, -self.im / denom)
            }
        }
    };
}

impl_real_field!(f64);
impl_real_field!(f32);
impl_complex_field!(Complex64, f64);
impl_complex_field!(Complex32, f32);

/// Matrix-like object able to perform matrix-vector products.
pub trait LinearOperator<T: ComplexField>: Send + Sync {
    /// Number of rows in the operator
    fn num_rows(&self) -> usize;

    /// Number of columns in the operator
    fn num_cols(&self) -> usize;

    /// Apply the operator: y = A * x
    fn apply(&self, x: &Array1<T>) -> Array1<T>;

    /// Apply the transpose: y = A^T * x
    fn apply_transpose(&self, x: &Array1<T>) -> Array1<T>;

    /// Check if the operator is square
    fn is_square(&self) -> bool {
        self.num_rows() == self.num_cols()
    }
}

/// Approximate inverse of an operator, `z = M⁻¹ r`.
pub trait Preconditioner<T: ComplexField>: Send + Sync {
    /// Apply the preconditioner to a residual
    fn apply(&self, r: &Array1<T>) -> Array1<T>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_complex64_field() {
        let z = Complex64::new(3.0, 4.0);
        assert_relative_eq!(z.norm_sqr(), 25.0);
        assert_relative_eq!(z.norm(), 5.0);

        let z_conj = ComplexField::conj(&z);
        assert_relative_eq!(z_conj.im, -4.0);

        let product = z * ComplexField::inv(&z);
        assert_relative_eq!(product.re, 1.0, epsilon = 1e-12);
        assert_relative_eq!(product.im, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_real_fields() {
        assert_relative_eq!(ComplexField::norm(&-3.0_f64), 3.0);
        assert_relative_eq!(ComplexField::inv(&4.0_f32), 0.25);
        assert_relative_eq!(<f32 as ComplexField>::real_from_f64(0.5), 0.5_f32);
        assert_relative_eq!(<Complex32 as ComplexField>::from_real(2.0).re, 2.0);
    }
}
