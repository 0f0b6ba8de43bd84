//! The `T_c` transformation family.
//!
//! `T_0(f) = log(f)` and `T_c(f) = sign(c) * f^c` otherwise. Everything is
//! computed from the log-density so `f` itself is never formed until a value
//! is mapped back with [`Transform::inverse`].

use crate::density::DensityPoint;
use crate::error::{SetupError, SetupResult};

/// Transformed density and its first two derivatives at one point.
///
/// `dt`/`d2t` are NaN at singular points (density zero or pole), where only
/// the value is known, and at vanishing points, where `c < 0` sends a
/// negligible density to `t = -inf`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TPoint {
    pub x: f64,
    pub t: f64,
    pub dt: f64,
    pub d2t: f64,
}

impl TPoint {
    #[inline]
    pub fn has_tangent(&self) -> bool {
        self.dt.is_finite() && self.d2t.is_finite()
    }

    #[inline]
    pub fn is_vanishing(&self) -> bool {
        self.t == f64::NEG_INFINITY
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    c: f64,
}

impl Transform {
    pub fn new(c: f64) -> SetupResult<Self> {
        if !c.is_finite() {
            return Err(SetupError::invalid_config(format!(
                "transform parameter c must be finite, got {c}"
            )));
        }
        Ok(Self { c })
    }

    #[inline]
    pub fn c(&self) -> f64 {
        self.c
    }

    #[inline]
    fn sign(&self) -> f64 {
        if self.c < 0.0 { -1.0 } else { 1.0 }
    }

    /// Hats on unbounded intervals are only integrable for `-1 < c <= 0`.
    #[inline]
    pub fn allows_unbounded(&self) -> bool {
        self.c > -1.0 && self.c <= 0.0
    }

    /// `T_c` applied to `exp(lf)`.
    #[inline]
    pub fn value(&self, lf: f64) -> f64 {
        if self.c == 0.0 {
            lf
        } else {
            self.sign() * (self.c * lf).exp()
        }
    }

    /// Transform a density evaluation.
    ///
    /// Infinite log-densities are accepted only where the transform maps
    /// them to the finite value 0: boundary zeros for `c > 0`, poles for
    /// `c < 0`.
    pub fn point(&self, p: &DensityPoint) -> SetupResult<TPoint> {
        if p.is_singular() {
            let finite = (self.c > 0.0 && p.lf < 0.0) || (self.c < 0.0 && p.lf > 0.0);
            if !finite {
                return Err(SetupError::domain(p.x, "transformed density", p.lf));
            }
            return Ok(TPoint {
                x: p.x,
                t: 0.0,
                dt: f64::NAN,
                d2t: f64::NAN,
            });
        }

        if self.c == 0.0 {
            return Ok(TPoint {
                x: p.x,
                t: p.lf,
                dt: p.dlf,
                d2t: p.d2lf,
            });
        }

        let t = self.value(p.lf);
        if t == f64::NEG_INFINITY {
            // Only reachable for c < 0 with lf far below the log scale.
            return Ok(TPoint {
                x: p.x,
                t,
                dt: f64::NAN,
                d2t: f64::NAN,
            });
        }
        let dt = self.c * p.dlf * t;
        let d2t = self.c * t * (self.c * p.dlf * p.dlf + p.d2lf);
        if !t.is_finite() || !dt.is_finite() || !d2t.is_finite() {
            return Err(SetupError::domain(p.x, "transformed density", t));
        }
        Ok(TPoint { x: p.x, t, dt, d2t })
    }

    /// True when `t` lies in the closure of the image of `T_c`, so it can be
    /// mapped back. For `c < 0` the value 0 stands for a pole.
    #[inline]
    pub fn in_range(&self, t: f64) -> bool {
        if self.c == 0.0 {
            t < f64::INFINITY
        } else if self.c > 0.0 {
            t >= 0.0 && t < f64::INFINITY
        } else {
            t <= 0.0
        }
    }

    /// `T_c^{-1}`: back to the density scale.
    #[inline]
    pub fn inverse(&self, t: f64) -> f64 {
        if self.c == 0.0 {
            t.exp()
        } else {
            (self.sign() * t).powf(1.0 / self.c)
        }
    }

    /// Antiderivative `G` of `T_c^{-1}`, increasing in `t` and 0 at the
    /// `t -> -inf` end of the range whenever that end is integrable.
    #[inline]
    pub fn antiderivative(&self, t: f64) -> f64 {
        let c = self.c;
        if c == 0.0 {
            t.exp()
        } else if c == -1.0 {
            -(-t).ln()
        } else {
            let s = self.sign();
            s * c / (c + 1.0) * (s * t).powf((c + 1.0) / c)
        }
    }

    /// Inverse of [`Transform::antiderivative`].
    #[inline]
    pub fn antiderivative_inverse(&self, g: f64) -> f64 {
        let c = self.c;
        if c == 0.0 {
            g.ln()
        } else if c == -1.0 {
            -(-g).exp()
        } else {
            let s = self.sign();
            s * (s * g * (c + 1.0) / c).powf(c / (c + 1.0))
        }
    }
}
