#![allow(dead_code)]

use rdist_rs::RdistGenerator;
use tinflex_rs::LogDensity;

/// Tabulated CDF of `exp(lpdf)` on `[lo, hi]`, normalized to 1.
pub struct NumericCdf {
    lo: f64,
    h: f64,
    table: Vec<f64>,
}

impl NumericCdf {
    /// Simpson's rule on each of `n` cells.
    pub fn new<D: LogDensity>(density: &D, lo: f64, hi: f64, n: usize) -> Self {
        let h = (hi - lo) / n as f64;
        let f = |x: f64| density.lpdf(x).exp();
        let mut table = Vec::with_capacity(n + 1);
        let mut acc = 0.0;
        table.push(0.0);
        for i in 0..n {
            let a = lo + i as f64 * h;
            let b = a + h;
            acc += h / 6.0 * (f(a) + 4.0 * f(0.5 * (a + b)) + f(b));
            table.push(acc);
        }
        let total = acc;
        for v in table.iter_mut() {
            *v /= total;
        }
        Self { lo, h, table }
    }

    pub fn cdf(&self, x: f64) -> f64 {
        let pos = (x - self.lo) / self.h;
        if pos <= 0.0 {
            return 0.0;
        }
        let i = pos.floor() as usize;
        if i + 1 >= self.table.len() {
            return 1.0;
        }
        let w = pos - i as f64;
        self.table[i] * (1.0 - w) + self.table[i + 1] * w
    }
}

/// Kolmogorov-Smirnov statistic of `xs` against `cdf`.
pub fn ks_statistic(mut xs: Vec<f64>, cdf: impl Fn(f64) -> f64) -> f64 {
    xs.sort_by(f64::total_cmp);
    let n = xs.len() as f64;
    xs.iter()
        .enumerate()
        .map(|(i, &x)| {
            let f = cdf(x);
            (f - i as f64 / n).max((i + 1) as f64 / n - f)
        })
        .fold(0.0, f64::max)
}

/// Critical value of the KS statistic at the 0.1% level.
pub fn ks_critical(n: usize) -> f64 {
    1.949 / (n as f64).sqrt()
}

/// Check hat >= density >= squeeze on `per_interval` interior points of every
/// interval. Tails are checked up to `tail_span` away from their finite end.
pub fn assert_bounding(g: &RdistGenerator, per_interval: usize, tail_span: f64) {
    let shift = g.log_scale();
    for iv in g.intervals() {
        let (a, b) = match (iv.left().is_finite(), iv.right().is_finite()) {
            (true, true) => (iv.left(), iv.right()),
            (true, false) => (iv.left(), iv.left() + tail_span),
            (false, true) => (iv.right() - tail_span, iv.right()),
            (false, false) => (-tail_span, tail_span),
        };
        for k in 1..per_interval {
            let x = a + (b - a) * k as f64 / per_interval as f64;
            let f = (g.density().lpdf(x) - shift).exp();
            let hat = iv.hat_density(x);
            let squeeze = iv.squeeze_density(x);
            assert!(hat >= f * (1.0 - 1e-9), "hat below density at {x} in {iv}");
            assert!(squeeze <= f * (1.0 + 1e-9), "squeeze above density at {x} in {iv}");
        }
    }
}

pub fn assert_partition(g: &RdistGenerator, ib: &[f64]) {
    let ivs = g.intervals();
    assert_eq!(ivs[0].left(), ib[0]);
    assert_eq!(ivs[ivs.len() - 1].right(), ib[ib.len() - 1]);
    for w in ivs.windows(2) {
        assert_eq!(w[0].right(), w[1].left());
        assert!(w[0].left() < w[0].right());
    }
    // Every initial breakpoint survives refinement.
    for x in ib {
        assert!(ivs.iter().any(|iv| iv.left() == *x || iv.right() == *x), "{x}");
    }
}
