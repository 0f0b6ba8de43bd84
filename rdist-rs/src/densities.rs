//! Log-densities of the test distributions and their derivatives.
//!
//! All of them ignore the parameter block; it is `()` so they fit
//! [`tinflex_rs::DensityFn`].

/// `(1 - x^2) (x^2 - 4)`, modes at `+-1.581`, antimode at 0.
pub mod quartic {
    pub fn lf(x: f64, _: &()) -> f64 {
        let xsq = x * x;
        -xsq * xsq + 5.0 * xsq - 4.0
    }

    pub fn dlf(x: f64, _: &()) -> f64 {
        10.0 * x - 4.0 * x * x * x
    }

    pub fn d2lf(x: f64, _: &()) -> f64 {
        10.0 - 12.0 * x * x
    }
}

/// `-2 x^4 + 4 x^2`, modes at `+-1`, antimode at 0.
pub mod double_well {
    pub fn lf(x: f64, _: &()) -> f64 {
        let xsq = x * x;
        (-2.0 * xsq + 4.0) * xsq
    }

    pub fn dlf(x: f64, _: &()) -> f64 {
        8.0 * (1.0 - x * x) * x
    }

    pub fn d2lf(x: f64, _: &()) -> f64 {
        -24.0 * x * x + 8.0
    }
}

/// `log(1 - x^4)` on `[-1, 1]`; the density vanishes at both ends.
pub mod plateau {
    pub fn lf(x: f64, _: &()) -> f64 {
        let xsq = x * x;
        (1.0 - xsq * xsq).ln()
    }

    pub fn dlf(x: f64, _: &()) -> f64 {
        let xsq = x * x;
        -4.0 * xsq * x / (1.0 - xsq * xsq)
    }

    pub fn d2lf(x: f64, _: &()) -> f64 {
        let xsq = x * x;
        let xc = x * xsq;
        -(4.0 * xc * xc + 12.0 * xsq) / (xc * xc * xsq - 2.0 * xsq * xsq + 1.0)
    }
}

/// `-log|x| / 2`; the density has a pole at 0.
pub mod pole {
    pub fn lf(x: f64, _: &()) -> f64 {
        -x.abs().ln() / 2.0
    }

    pub fn dlf(x: f64, _: &()) -> f64 {
        -1.0 / (2.0 * x)
    }

    pub fn d2lf(x: f64, _: &()) -> f64 {
        1.0 / (2.0 * x * x)
    }
}

/// `-x^4 + 6 x^2`, modes at `+-1.732`, inflection points at `+-1`.
pub mod wide_double_well {
    pub fn lf(x: f64, _: &()) -> f64 {
        let xsq = x * x;
        -xsq * xsq + 6.0 * xsq
    }

    pub fn dlf(x: f64, _: &()) -> f64 {
        x * (12.0 - 4.0 * x * x)
    }

    pub fn d2lf(x: f64, _: &()) -> f64 {
        12.0 - 12.0 * x * x
    }
}
