//! Small dense vector kernels used during setup
//!
//! Norms for candidate normalization and the spectral radius estimate.

use crate::traits::ComplexField;
use ndarray::Array1;
use num_traits::{Float, Zero};

/// Squared 2-norm ||x||²
#[inline]
pub fn vector_norm_sqr<T: ComplexField>(x: &Array1<T>) -> T::Real {
    x.iter()
        .fold(T::Real::zero(), |acc, xi| acc + xi.norm_sqr())
}

/// 2-norm ||x||
#[inline]
pub fn vector_norm<T: ComplexField>(x: &Array1<T>) -> T::Real {
    Float::sqrt(vector_norm_sqr(x))
}

/// Scale `x` in place so that ||x|| = 1; returns the previous norm.
///
/// A zero vector is left untouched.
pub fn normalize<T: ComplexField>(x: &mut Array1<T>) -> T::Real {
    let norm = vector_norm(x);
    if norm > T::Real::zero() {
        let scale = T::from_real(norm).inv();
        x.mapv_inplace(|v| v * scale);
    }
    norm
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_normalize() {
        let mut x = array![3.0_f64, 4.0];
        let norm = normalize(&mut x);
        assert_relative_eq!(norm, 5.0);
        assert_relative_eq!(vector_norm(&x), 1.0, epsilon = 1e-14);

        let mut zero = array![0.0_f64, 0.0];
        assert_relative_eq!(normalize(&mut zero), 0.0);
        assert_eq!(zero, array![0.0, 0.0]);
    }
}
