//! Log-density capability consumed by the interval builder and the sampler.

use crate::error::{SetupError, SetupResult};

/// Logarithm of an unnormalized target density together with its first two
/// derivatives.
///
/// Implementors carry their own parameters and are only ever borrowed
/// immutably. Values outside the support may be NaN; inside the support all
/// three must be finite, except that `lpdf` may be `-inf` where the density
/// vanishes at a boundary and `+inf` at a pole.
pub trait LogDensity {
    fn lpdf(&self, x: f64) -> f64;
    fn dlpdf(&self, x: f64) -> f64;
    fn d2lpdf(&self, x: f64) -> f64;
}

impl<D: LogDensity + ?Sized> LogDensity for &D {
    #[inline]
    fn lpdf(&self, x: f64) -> f64 {
        (**self).lpdf(x)
    }

    #[inline]
    fn dlpdf(&self, x: f64) -> f64 {
        (**self).dlpdf(x)
    }

    #[inline]
    fn d2lpdf(&self, x: f64) -> f64 {
        (**self).d2lpdf(x)
    }
}

impl<D: LogDensity + ?Sized> LogDensity for Box<D> {
    #[inline]
    fn lpdf(&self, x: f64) -> f64 {
        (**self).lpdf(x)
    }

    #[inline]
    fn dlpdf(&self, x: f64) -> f64 {
        (**self).dlpdf(x)
    }

    #[inline]
    fn d2lpdf(&self, x: f64) -> f64 {
        (**self).d2lpdf(x)
    }
}

/// Signature shared by the three callbacks of [`FnLogDensity`].
pub type DensityFn<P> = fn(f64, &P) -> f64;

/// Log-density assembled from three plain functions and a parameter block.
#[derive(Clone, Copy, Debug)]
pub struct FnLogDensity<P> {
    lpdf: DensityFn<P>,
    dlpdf: DensityFn<P>,
    d2lpdf: DensityFn<P>,
    params: P,
}

impl<P> FnLogDensity<P> {
    pub fn new(lpdf: DensityFn<P>, dlpdf: DensityFn<P>, d2lpdf: DensityFn<P>, params: P) -> Self {
        Self {
            lpdf,
            dlpdf,
            d2lpdf,
            params,
        }
    }

    pub fn params(&self) -> &P {
        &self.params
    }
}

impl<P> LogDensity for FnLogDensity<P> {
    #[inline]
    fn lpdf(&self, x: f64) -> f64 {
        (self.lpdf)(x, &self.params)
    }

    #[inline]
    fn dlpdf(&self, x: f64) -> f64 {
        (self.dlpdf)(x, &self.params)
    }

    #[inline]
    fn d2lpdf(&self, x: f64) -> f64 {
        (self.d2lpdf)(x, &self.params)
    }
}

/// Log-density and derivatives at one construction point, already shifted by
/// the generator's log scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DensityPoint {
    pub x: f64,
    pub lf: f64,
    pub dlf: f64,
    pub d2lf: f64,
}

impl DensityPoint {
    /// Evaluate `density` at the finite point `x`.
    ///
    /// Derivatives are only required to be finite where `lpdf` is finite; an
    /// infinite `lpdf` marks a boundary zero or a pole, which the transform
    /// decides how to handle.
    pub fn eval<D: LogDensity + ?Sized>(density: &D, x: f64, log_scale: f64) -> SetupResult<Self> {
        let lf = density.lpdf(x);
        if lf.is_nan() {
            return Err(SetupError::domain(x, "lpdf", lf));
        }
        if lf.is_infinite() {
            return Ok(Self {
                x,
                lf,
                dlf: f64::NAN,
                d2lf: f64::NAN,
            });
        }

        let dlf = density.dlpdf(x);
        if !dlf.is_finite() {
            return Err(SetupError::domain(x, "dlpdf", dlf));
        }
        let d2lf = density.d2lpdf(x);
        if !d2lf.is_finite() {
            return Err(SetupError::domain(x, "d2lpdf", d2lf));
        }

        Ok(Self {
            x,
            lf: lf - log_scale,
            dlf,
            d2lf,
        })
    }

    /// True when the log-density is infinite here (density zero or pole).
    #[inline]
    pub fn is_singular(&self) -> bool {
        self.lf.is_infinite()
    }
}
