use crate::CoreError;

/// Floating point type used for all field data and time values.
pub type Real = f64;

/// Absolute/relative tolerance pair used when matching time values.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Linear interpolation through `(x0, y0)` and `(x1, y1)` evaluated at `x`.
///
/// Also used outside `[x0, x1]`, where it extrapolates along the same line.
/// Degenerate spans (`x0 == x1`) return `y0`.
pub fn lerp(x0: Real, y0: Real, x1: Real, y1: Real, x: Real) -> Real {
    let span = x1 - x0;
    if span == 0.0 {
        return y0;
    }
    y0 + (y1 - y0) * (x - x0) / span
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn lerp_inside_and_outside_span() {
        assert_eq!(lerp(0.0, 0.0, 1.0, 10.0, 0.5), 5.0);
        assert_eq!(lerp(0.0, 0.0, 1.0, 10.0, 2.0), 20.0);
        assert_eq!(lerp(1.0, 3.0, 1.0, 7.0, 5.0), 3.0);
    }
}
