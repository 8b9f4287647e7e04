use crate::PnError;

/// Scalar type for every stored quantity.
pub type Real = f64;

/// Absolute and relative comparison tolerance.
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

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, PnError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(PnError::NonFinite { what, value: v })
    }
}

/// Finite and `>= 0`. Quantities (moles, grams, liters) must pass this.
pub fn ensure_non_negative(v: Real, what: &'static str) -> Result<Real, PnError> {
    let v = ensure_finite(v, what)?;
    if v < 0.0 {
        return Err(PnError::Negative { what, value: v });
    }
    Ok(v)
}

/// Finite and strictly positive.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, PnError> {
    let v = ensure_finite(v, what)?;
    if v <= 0.0 {
        return Err(PnError::InvalidArg { what });
    }
    Ok(v)
}

/// Relative change of `new` with respect to `old`; 0 when `old` is 0.
pub fn relative_change(old: Real, new: Real) -> Real {
    if old == 0.0 {
        return 0.0;
    }
    ((new - old) / old).abs()
}
