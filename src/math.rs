//! Scalar helpers shared by the decompositions.

use num_traits::Float;

/// Machine epsilon for `f64` working precision, `2⁻⁵²`.
///
/// Used as the relative negligibility threshold by the eigenvalue and SVD
/// iterations, and by [`SingularValueDecomposition::rank`](crate::SingularValueDecomposition::rank).
pub const EPSILON: f64 = f64::EPSILON;

/// Underflow guard for the SVD negligibility tests, `2⁻⁹⁶⁶`.
pub const TINY: f64 = 1.6033346880071782e-291;

/// `sqrt(a² + b²)` without destructive underflow or overflow.
///
/// The larger magnitude is factored out before squaring, so the result is
/// finite whenever it is representable.
///
/// ```
/// use linfact::math::hypotenuse;
///
/// assert_eq!(hypotenuse(3.0_f64, 4.0), 5.0);
/// assert!((hypotenuse(3.0e30_f32, 4.0e30) - 5.0e30).abs() < 1.0e24);
/// ```
#[inline]
pub fn hypotenuse<T: Float>(a: T, b: T) -> T {
    let (abs_a, abs_b) = (a.abs(), b.abs());
    if abs_a > abs_b {
        let r = b / a;
        abs_a * (T::one() + r * r).sqrt()
    } else if b != T::zero() {
        let r = a / b;
        abs_b * (T::one() + r * r).sqrt()
    } else {
        T::zero()
    }
}
