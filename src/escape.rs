//! The classic escape-time function.

use num::complex::Complex;

/// Squared magnitude past which a point is known to run off to
/// infinity.
pub const ESCAPE_RADIUS_SQR: f64 = 4.0;

/// Count how many rounds of z = z² + c it takes for the orbit starting
/// at zero to leave the circle of radius two.  Points that are still
/// inside after `max_iterations` rounds report `max_iterations`, which
/// callers treat as "inside the set."
#[inline]
pub fn iterations(point: Complex<f64>, max_iterations: usize) -> usize {
    let mut z = Complex {
        re: 0.0_f64,
        im: 0.0_f64,
    };
    let mut count = 0;
    while count < max_iterations && z.norm_sqr() <= ESCAPE_RADIUS_SQR {
        z = z * z + point;
        count += 1;
    }
    count
}

/// Same as `iterations`, for callers holding loose coordinates.
pub fn iterations_at(x: f64, y: f64, max_iterations: usize) -> usize {
    iterations(Complex::new(x, y), max_iterations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_never_escapes() {
        assert_eq!(iterations_at(0.0, 0.0, 1000), 1000);
        assert_eq!(iterations_at(0.0, 0.0, 100_000), 100_000);
    }

    #[test]
    fn far_points_escape_at_once() {
        let count = iterations_at(5.0, 5.0, 100_000);
        assert!(count >= 1 && count <= 2, "escaped after {}", count);
    }

    #[test]
    fn main_cardioid_is_inside() {
        assert_eq!(iterations_at(-0.1, 0.1, 5000), 5000);
        assert_eq!(iterations_at(-1.0, 0.0, 5000), 5000);
    }

    #[test]
    fn boundary_points_take_a_while() {
        let count = iterations_at(-0.75, 0.1, 100_000);
        assert!(count > 10 && count < 100_000, "escaped after {}", count);
    }

    #[test]
    fn evaluation_is_repeatable() {
        for &(x, y) in &[(0.3, 0.5), (-1.8, 1.0), (0.25, 0.0), (-0.75, 0.1)] {
            assert_eq!(iterations_at(x, y, 10_000), iterations_at(x, y, 10_000));
        }
    }

    #[test]
    fn zero_budget_reports_zero() {
        assert_eq!(iterations_at(0.0, 0.0, 0), 0);
    }
}
