use crate::consts::{ARCMEAN_CLOSE, ARCMEAN_LARGE, PI_OVER_TWO};

/// Split point between `a` and `b` that also works for infinite endpoints.
///
/// Averages in arctangent space, so `(a, +inf)` gives a finite point right of
/// `a`. Far from the origin this degenerates to the harmonic mean, and for
/// nearby points to the arithmetic mean.
#[inline]
pub fn arcmean(a: f64, b: f64) -> f64 {
    let (x0, x1) = if a <= b { (a, b) } else { (b, a) };

    if x1 < -ARCMEAN_LARGE || x0 > ARCMEAN_LARGE {
        return 2.0 / (1.0 / x0 + 1.0 / x1);
    }

    let a0 = if x0 == f64::NEG_INFINITY {
        -PI_OVER_TWO
    } else {
        x0.atan()
    };
    let a1 = if x1 == f64::INFINITY {
        PI_OVER_TWO
    } else {
        x1.atan()
    };

    if (a0 - a1).abs() < ARCMEAN_CLOSE {
        0.5 * x0 + 0.5 * x1
    } else {
        (0.5 * (a0 + a1)).tan()
    }
}

/// Relative tolerance scaled by the magnitude of the compared values.
#[inline]
pub fn tolerance(rel: f64, u: f64, v: f64) -> f64 {
    rel * (1.0 + u.abs().max(v.abs()))
}
