//! One piece of the partitioned support with its hat and squeeze.
//!
//! Hat and squeeze are straight lines in transformed space. Which of the
//! endpoint tangents and the secant bound the transformed density from above
//! or below follows from its curvature at the two endpoints, assuming at most
//! one inflection point inside the interval. Every candidate is additionally
//! verified at a handful of check points, so intervals that break that
//! assumption end up with an infinite hat area and get split.

use crate::consts::{BOUND_TOL, FLAT_TOL};
use crate::density::{DensityPoint, LogDensity};
use crate::error::SetupResult;
use crate::transform::{TPoint, Transform};
use crate::utils::{arcmean, tolerance};
use std::fmt;

/// Straight line `y + slope * (x - x0)` in transformed space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line {
    pub x0: f64,
    pub y: f64,
    pub slope: f64,
}

impl Line {
    pub fn tangent(p: &TPoint) -> Self {
        Self {
            x0: p.x,
            y: p.t,
            slope: p.dt,
        }
    }

    pub fn secant(l: &TPoint, r: &TPoint) -> Self {
        Self {
            x0: l.x,
            y: l.t,
            slope: (r.t - l.t) / (r.x - l.x),
        }
    }

    #[inline]
    pub fn at(&self, x: f64) -> f64 {
        if self.slope == 0.0 || x == self.x0 {
            self.y
        } else {
            self.y + self.slope * (x - self.x0)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Curvature {
    Concave,
    Convex,
}

impl Curvature {
    fn of(p: &TPoint) -> Option<Self> {
        if !p.has_tangent() {
            None
        } else if p.d2t <= 0.0 {
            Some(Self::Concave)
        } else {
            Some(Self::Convex)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Upper,
    Lower,
}

#[derive(Clone, Debug)]
pub struct Interval {
    tr: Transform,
    a: f64,
    b: f64,
    ta: Option<TPoint>,
    tb: Option<TPoint>,
    hat: Option<Line>,
    squeeze: Option<Line>,
    hat_area: f64,
    squeeze_area: f64,
}

impl Interval {
    /// Build the interval `[a, b]`.
    ///
    /// `ta`/`tb` are the transformed density at the endpoints and must be
    /// `None` exactly for infinite endpoints. `density` is evaluated at interior
    /// check points to verify the chosen bounds.
    pub fn new<D: LogDensity + ?Sized>(
        tr: Transform,
        (a, ta): (f64, Option<TPoint>),
        (b, tb): (f64, Option<TPoint>),
        density: &D,
        log_scale: f64,
    ) -> SetupResult<Self> {
        let mut iv = Self {
            tr,
            a,
            b,
            ta,
            tb,
            hat: None,
            squeeze: None,
            hat_area: f64::INFINITY,
            squeeze_area: 0.0,
        };

        let (hats, squeezes) = iv.candidates();
        if hats.is_empty() && squeezes.is_empty() {
            return Ok(iv);
        }

        let checks = iv.check_points(density, log_scale)?;

        for line in hats {
            let area = iv.line_area(&line);
            if area.is_finite() && area < iv.hat_area && iv.bounds(&line, &checks, Side::Upper) {
                iv.hat = Some(line);
                iv.hat_area = area;
            }
        }

        for line in squeezes {
            let area = iv.line_area(&line);
            if area.is_finite() && area > iv.squeeze_area && iv.bounds(&line, &checks, Side::Lower) {
                iv.squeeze = Some(line);
                iv.squeeze_area = area;
            }
        }

        if iv.squeeze.is_none() && iv.is_bounded() {
            tracing::trace!(a, b, c = tr.c(), "no squeeze on interval");
        }

        Ok(iv)
    }

    /// Split at the arc-mean of the endpoints. Returns `None` when the
    /// interval is too narrow to produce a new interior point, or when the
    /// density has vanished at that point.
    pub fn split<D: LogDensity + ?Sized>(
        &self,
        density: &D,
        log_scale: f64,
    ) -> SetupResult<Option<(Self, Self)>> {
        let m = arcmean(self.a, self.b);
        if !(self.a < m && m < self.b) || !m.is_finite() {
            return Ok(None);
        }
        let pm = DensityPoint::eval(density, m, log_scale)?;
        let tm = self.tr.point(&pm)?;
        if tm.is_vanishing() {
            return Ok(None);
        }

        let left = Self::new(self.tr, (self.a, self.ta), (m, Some(tm)), density, log_scale)?;
        let right = Self::new(self.tr, (m, Some(tm)), (self.b, self.tb), density, log_scale)?;
        Ok(Some((left, right)))
    }

    /// Hat candidates and squeeze candidates for this interval.
    fn candidates(&self) -> (Vec<Line>, Vec<Line>) {
        match (self.ta, self.tb) {
            (Some(pa), Some(pb)) => self.bounded_candidates(&pa, &pb),
            (Some(pa), None) => (self.tail_hat(&pa, true).into_iter().collect(), Vec::new()),
            (None, Some(pb)) => (self.tail_hat(&pb, false).into_iter().collect(), Vec::new()),
            (None, None) => (Vec::new(), Vec::new()),
        }
    }

    /// On a tail only the tangent at the finite end can be a hat: the
    /// transformed density must be concave there and decay towards infinity.
    fn tail_hat(&self, p: &TPoint, right_tail: bool) -> Option<Line> {
        if !self.tr.allows_unbounded() || Curvature::of(p) != Some(Curvature::Concave) {
            return None;
        }
        let decays = if right_tail { p.dt < 0.0 } else { p.dt > 0.0 };
        decays.then(|| Line::tangent(p))
    }

    fn bounded_candidates(&self, pa: &TPoint, pb: &TPoint) -> (Vec<Line>, Vec<Line>) {
        let secant = Line::secant(pa, pb);
        let r = secant.slope;
        let tan_a = pa.has_tangent().then(|| Line::tangent(pa));
        let tan_b = pb.has_tangent().then(|| Line::tangent(pb));
        let tangents: Vec<Line> = tan_a.into_iter().chain(tan_b).collect();

        // A singular endpoint has no curvature; take the other one for both.
        let (ca, cb) = match (Curvature::of(pa), Curvature::of(pb)) {
            (Some(ca), Some(cb)) => (ca, cb),
            (Some(c), None) | (None, Some(c)) => (c, c),
            (None, None) => return (Vec::new(), vec![secant]),
        };

        match (ca, cb) {
            (Curvature::Concave, Curvature::Concave) => (tangents, vec![secant]),
            (Curvature::Convex, Curvature::Convex) => (vec![secant], tangents),
            (Curvature::Concave, Curvature::Convex) => {
                let hat = match tan_a {
                    Some(t) if pa.dt >= r => t,
                    _ => secant,
                };
                let squeeze = match tan_b {
                    Some(t) if pb.dt >= r => t,
                    _ => secant,
                };
                (vec![hat], vec![squeeze])
            }
            (Curvature::Convex, Curvature::Concave) => {
                let hat = match tan_b {
                    Some(t) if pb.dt <= r => t,
                    _ => secant,
                };
                let squeeze = match tan_a {
                    Some(t) if pa.dt <= r => t,
                    _ => secant,
                };
                (vec![hat], vec![squeeze])
            }
        }
    }

    /// Transformed density at the endpoints and at interior check points.
    fn check_points<D: LogDensity + ?Sized>(
        &self,
        density: &D,
        log_scale: f64,
    ) -> SetupResult<Vec<TPoint>> {
        let interior: Vec<f64> = if self.is_bounded() {
            let w = self.b - self.a;
            vec![self.a + 0.25 * w, self.a + 0.5 * w, self.a + 0.75 * w]
        } else {
            let m = arcmean(self.a, self.b);
            let finite = if self.a.is_finite() { self.a } else { self.b };
            vec![arcmean(finite, m), m, arcmean(m, 2.0 * m - finite)]
        };

        let mut checks: Vec<TPoint> = self.ta.into_iter().chain(self.tb).collect();
        for x in interior {
            if x.is_finite() && self.a < x && x < self.b {
                let p = DensityPoint::eval(density, x, log_scale)?;
                checks.push(self.tr.point(&p)?);
            }
        }
        Ok(checks)
    }

    fn bounds(&self, line: &Line, checks: &[TPoint], side: Side) -> bool {
        checks.iter().all(|p| {
            if p.is_vanishing() {
                return side == Side::Upper;
            }
            let l = line.at(p.x);
            let tol = tolerance(BOUND_TOL, l, p.t);
            match side {
                Side::Upper => l >= p.t - tol,
                Side::Lower => l <= p.t + tol,
            }
        })
    }

    /// True when the line changes too little across the interval to be
    /// integrated in closed form without cancellation.
    fn is_flat(&self, line: &Line) -> bool {
        if line.slope == 0.0 {
            return true;
        }
        let (la, lb) = (line.at(self.a), line.at(self.b));
        la.is_finite() && lb.is_finite() && (lb - la).abs() <= tolerance(FLAT_TOL, la, lb)
    }

    /// Integral of `T^{-1}(line)` over the interval; infinite when the line
    /// leaves the range of the transform or the integral diverges.
    fn line_area(&self, line: &Line) -> f64 {
        let tr = &self.tr;
        let (a, b) = (self.a, self.b);
        let (la, lb) = (line.at(a), line.at(b));
        if !(tr.in_range(la) && tr.in_range(lb)) {
            return f64::INFINITY;
        }

        if self.is_flat(line) {
            if !self.is_bounded() {
                return f64::INFINITY;
            }
            return tr.inverse(line.at(0.5 * (a + b))) * (b - a);
        }

        let s = line.slope;
        // For c = 0 factor out the larger end of the line.
        let area = if tr.c() == 0.0 {
            if s < 0.0 {
                la.exp() * (s * (b - a)).exp_m1() / s
            } else {
                lb.exp() * -(-s * (b - a)).exp_m1() / s
            }
        } else {
            (tr.antiderivative(lb) - tr.antiderivative(la)) / s
        };

        if area.is_nan() || area < 0.0 {
            f64::INFINITY
        } else {
            area
        }
    }

    /// Point `x` with hat area `v` to its left, `0 <= v <= hat_area`.
    ///
    /// May return NaN or an endpoint for arguments at the very edge of the
    /// range; callers reject non-finite results.
    pub fn hat_inverse_cdf(&self, v: f64) -> f64 {
        let Some(line) = self.hat.as_ref() else {
            return f64::NAN;
        };
        let tr = &self.tr;
        let (a, b) = (self.a, self.b);
        let s = line.slope;

        let x = if self.is_flat(line) {
            a + v / tr.inverse(line.at(0.5 * (a + b)))
        } else if tr.c() == 0.0 {
            if s < 0.0 {
                let z = (s * v * (-line.at(a)).exp()).max(-1.0);
                a + z.ln_1p() / s
            } else {
                let w = self.hat_area - v;
                let z = (-s * w * (-line.at(b)).exp()).max(-1.0);
                b + z.ln_1p() / s
            }
        } else if a.is_finite() {
            let la = line.at(a);
            let g = tr.antiderivative(la) + s * v;
            a + (tr.antiderivative_inverse(g) - la) / s
        } else {
            let lb = line.at(b);
            let g = tr.antiderivative(lb) - s * (self.hat_area - v);
            b + (tr.antiderivative_inverse(g) - lb) / s
        };

        x.clamp(a, b)
    }

    /// Hat on the density scale.
    #[inline]
    pub fn hat_density(&self, x: f64) -> f64 {
        self.hat.map_or(f64::INFINITY, |l| self.tr.inverse(l.at(x)))
    }

    /// Squeeze on the density scale; 0 where there is no squeeze.
    #[inline]
    pub fn squeeze_density(&self, x: f64) -> f64 {
        self.squeeze.map_or(0.0, |l| {
            let t = l.at(x);
            if self.tr.in_range(t) {
                self.tr.inverse(t)
            } else {
                0.0
            }
        })
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.a
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.b
    }

    #[inline]
    pub fn c(&self) -> f64 {
        self.tr.c()
    }

    #[inline]
    pub fn transform(&self) -> &Transform {
        &self.tr
    }

    #[inline]
    pub fn hat(&self) -> Option<&Line> {
        self.hat.as_ref()
    }

    #[inline]
    pub fn squeeze(&self) -> Option<&Line> {
        self.squeeze.as_ref()
    }

    #[inline]
    pub fn hat_area(&self) -> f64 {
        self.hat_area
    }

    #[inline]
    pub fn squeeze_area(&self) -> f64 {
        self.squeeze_area
    }

    #[inline]
    pub fn is_bounded(&self) -> bool {
        self.a.is_finite() && self.b.is_finite()
    }

    #[inline]
    pub fn contains(&self, x: f64) -> bool {
        self.a <= x && x <= self.b
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:>12.6}, {:>12.6}]  c = {:>5.2}  A_hat = {:<12.6e} A_sq = {:<12.6e}",
            self.a, self.b, self.tr.c(), self.hat_area, self.squeeze_area
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density::FnLogDensity;

    fn normal(x: f64, _: &()) -> f64 {
        -0.5 * x * x
    }
    fn dnormal(x: f64, _: &()) -> f64 {
        -x
    }
    fn d2normal(_x: f64, _: &()) -> f64 {
        -1.0
    }

    fn make(c: f64, a: f64, b: f64) -> Interval {
        let d = FnLogDensity::new(normal, dnormal, d2normal, ());
        let tr = Transform::new(c).unwrap();
        let end = |x: f64| {
            x.is_finite()
                .then(|| tr.point(&DensityPoint::eval(&d, x, 0.0).unwrap()).unwrap())
        };
        Interval::new(tr, (a, end(a)), (b, end(b)), &d, 0.0).unwrap()
    }

    fn simpson(f: impl Fn(f64) -> f64, a: f64, b: f64, n: usize) -> f64 {
        let h = (b - a) / n as f64;
        let mut s = f(a) + f(b);
        for i in 1..n {
            let w = if i % 2 == 1 { 4.0 } else { 2.0 };
            s += w * f(a + i as f64 * h);
        }
        s * h / 3.0
    }

    #[test]
    fn test_concave_bounds_hold() {
        for c in [0.0, -0.5, 0.5] {
            let iv = make(c, -0.5, 1.0);
            assert!(iv.hat().is_some() && iv.squeeze().is_some(), "c={c}");
            for i in 0..=100 {
                let x = -0.5 + 1.5 * i as f64 / 100.0;
                let f = (-0.5 * x * x).exp();
                assert!(iv.hat_density(x) >= f * (1.0 - 1e-12), "c={c} x={x}");
                assert!(iv.squeeze_density(x) <= f * (1.0 + 1e-12), "c={c} x={x}");
            }
            assert!(iv.hat_area() >= iv.squeeze_area());
        }
    }

    #[test]
    fn test_areas_match_numeric_integration() {
        for c in [0.0, -0.5, 0.5, -1.0, -2.0] {
            let iv = make(c, 0.2, 1.3);
            let hat = simpson(|x| iv.hat_density(x), 0.2, 1.3, 2000);
            let sq = simpson(|x| iv.squeeze_density(x), 0.2, 1.3, 2000);
            assert!((hat - iv.hat_area()).abs() < 1e-9, "c={c}: {hat} vs {}", iv.hat_area());
            assert!((sq - iv.squeeze_area()).abs() < 1e-9, "c={c}");
        }
    }

    #[test]
    fn test_tail_interval() {
        let iv = make(0.0, 1.0, f64::INFINITY);
        assert!(iv.squeeze().is_none());
        // Tangent at 1 gives exp(-1/2) * exp(-(x-1)) with area exp(-1/2).
        assert!((iv.hat_area() - (-0.5f64).exp()).abs() < 1e-12);

        let iv = make(-0.5, f64::NEG_INFINITY, -1.0);
        assert!(iv.hat_area().is_finite());
        assert_eq!(iv.squeeze_area(), 0.0);

        // Tangent slope points the wrong way: no hat.
        let iv = make(0.0, -1.0, f64::INFINITY);
        assert!(iv.hat().is_none());
        assert_eq!(iv.hat_area(), f64::INFINITY);

        // Power transforms with c > 0 cannot bound a tail.
        let iv = make(0.5, 1.0, f64::INFINITY);
        assert!(iv.hat().is_none());
    }

    #[test]
    fn test_inverse_cdf_consistent_with_area() {
        for (c, a, b) in [
            (0.0, -0.5, 1.0),
            (-0.5, 0.2, 1.3),
            (0.5, -1.0, 0.4),
            (0.0, 0.5, f64::INFINITY),
            (-0.5, f64::NEG_INFINITY, -0.5),
        ] {
            let iv = make(c, a, b);
            let area = iv.hat_area();
            for k in 1..10 {
                let v = area * k as f64 / 10.0;
                let x = iv.hat_inverse_cdf(v);
                assert!(iv.contains(x), "c={c} x={x}");
                // Integrate over the finite side of x.
                let (partial, expected) = if a.is_finite() {
                    (simpson(|t| iv.hat_density(t), a, x, 4000), v)
                } else {
                    (simpson(|t| iv.hat_density(t), x, b, 4000), area - v)
                };
                assert!((partial - expected).abs() < 1e-7 * area.max(1.0), "c={c} k={k}");
            }
        }
    }

    #[test]
    fn test_split_keeps_endpoints() {
        let d = FnLogDensity::new(normal, dnormal, d2normal, ());
        let iv = make(0.0, -2.0, f64::INFINITY);
        let (l, r) = iv.split(&d, 0.0).unwrap().unwrap();
        assert_eq!(l.left(), -2.0);
        assert_eq!(l.right(), r.left());
        assert_eq!(r.right(), f64::INFINITY);
        assert!(l.right() > -2.0 && l.right().is_finite());
    }

    #[test]
    fn test_area_with_underflowing_end() {
        fn lf(x: f64, _: &()) -> f64 {
            -1250.0 * x * x
        }
        fn dlf(x: f64, _: &()) -> f64 {
            -2500.0 * x
        }
        fn d2lf(_x: f64, _: &()) -> f64 {
            -2500.0
        }
        let d = FnLogDensity::new(lf, dlf, d2lf, ());
        let tr = Transform::new(0.0).unwrap();
        let end = |x: f64| Some(tr.point(&DensityPoint::eval(&d, x, 0.0).unwrap()).unwrap());
        let iv = Interval::new(tr, (-1.0, end(-1.0)), (0.0, end(0.0)), &d, 0.0).unwrap();
        // Flat tangent at the mode, secant from exp(-1250) up to 1.
        assert!((iv.hat_area() - 1.0).abs() < 1e-15);
        assert!((iv.squeeze_area() - 1.0 / 1250.0).abs() < 1e-15);

        let iv = Interval::new(tr, (0.0, end(0.0)), (1.0, end(1.0)), &d, 0.0).unwrap();
        assert!((iv.squeeze_area() - 1.0 / 1250.0).abs() < 1e-15);
        let x = iv.hat_inverse_cdf(0.5);
        assert!((x - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_tail_beyond_underflow() {
        let d = FnLogDensity::new(normal, dnormal, d2normal, ());
        // Check points and the split point of this tail lie where
        // exp(-lf / 2) overflows.
        let iv = make(-0.5, 40.0, f64::INFINITY);
        assert!(iv.hat().is_some());
        assert!(iv.hat_area().is_finite());
        assert!(iv.split(&d, 0.0).unwrap().is_none());

        let iv = make(-0.5, f64::NEG_INFINITY, -40.0);
        assert!(iv.hat().is_some());
        assert!(iv.split(&d, 0.0).unwrap().is_none());
    }

    #[test]
    fn test_pole_at_endpoint() {
        fn lf(x: f64, _: &()) -> f64 {
            -0.5 * x.abs().ln()
        }
        fn dlf(x: f64, _: &()) -> f64 {
            -0.5 / x
        }
        fn d2lf(x: f64, _: &()) -> f64 {
            0.5 / (x * x)
        }
        let d = FnLogDensity::new(lf, dlf, d2lf, ());
        let tr = Transform::new(-1.5).unwrap();
        let end = |x: f64| Some(tr.point(&DensityPoint::eval(&d, x, 0.0).unwrap()).unwrap());
        let iv = Interval::new(tr, (0.0, end(0.0)), (1.0, end(1.0)), &d, 0.0).unwrap();
        // Secant hat -x maps back to x^(-2/3), whose integral over [0, 1] is 3.
        assert!((iv.hat_area() - 3.0).abs() < 1e-12);
        assert!(iv.squeeze_area() > 0.0 && iv.squeeze_area() < 2.0);

        // For -1 <= c < 0 the hat through the pole is not integrable.
        let tr = Transform::new(-0.5).unwrap();
        let end = |x: f64| Some(tr.point(&DensityPoint::eval(&d, x, 0.0).unwrap()).unwrap());
        let iv = Interval::new(tr, (0.0, end(0.0)), (1.0, end(1.0)), &d, 0.0).unwrap();
        assert_eq!(iv.hat_area(), f64::INFINITY);
    }

    #[test]
    fn test_two_inflections_rejected_by_checks() {
        // lf = -x^4 + 5x^2 - 4 is concave at +-1.5 but not in between.
        fn lf(x: f64, _: &()) -> f64 {
            -x.powi(4) + 5.0 * x * x - 4.0
        }
        fn dlf(x: f64, _: &()) -> f64 {
            10.0 * x - 4.0 * x.powi(3)
        }
        fn d2lf(x: f64, _: &()) -> f64 {
            10.0 - 12.0 * x * x
        }
        let d = FnLogDensity::new(lf, dlf, d2lf, ());
        let tr = Transform::new(0.0).unwrap();
        let end = |x: f64| Some(tr.point(&DensityPoint::eval(&d, x, 0.0).unwrap()).unwrap());
        let iv = Interval::new(tr, (-1.5, end(-1.5)), (1.5, end(1.5)), &d, 0.0).unwrap();
        assert!(iv.hat().is_none());
    }
}
