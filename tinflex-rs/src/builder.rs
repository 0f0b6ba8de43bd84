//! Adaptive interval construction.

use crate::config::TinflexConfig;
use crate::consts::SPLIT_THRESHOLD;
use crate::density::{DensityPoint, LogDensity};
use crate::error::{SetupError, SetupResult};
use crate::interval::Interval;
use crate::transform::Transform;
use tracing::debug;

/// Refined partition of the support together with the log-density shift used
/// while building it.
#[derive(Clone, Debug)]
pub struct Intervals {
    pub intervals: Vec<Interval>,
    pub log_scale: f64,
}

impl Intervals {
    pub fn total_hat(&self) -> f64 {
        self.intervals.iter().map(Interval::hat_area).sum()
    }

    pub fn total_squeeze(&self) -> f64 {
        self.intervals.iter().map(Interval::squeeze_area).sum()
    }
}

/// Hat/squeeze area ratio; infinite without any squeeze.
#[inline]
pub fn area_ratio(hat: f64, squeeze: f64) -> f64 {
    if squeeze > 0.0 {
        hat / squeeze
    } else {
        f64::INFINITY
    }
}

/// Partition `[breakpoints[0], breakpoints[n-1]]` into intervals whose total
/// hat/squeeze ratio is at most `config.rho`.
///
/// `c` holds one transform parameter per initial region, or a single value
/// for all of them.
pub fn build_intervals<D: LogDensity + ?Sized>(
    density: &D,
    breakpoints: &[f64],
    c: &[f64],
    config: &TinflexConfig,
) -> SetupResult<Intervals> {
    config.validate()?;
    let transforms = validate_regions(breakpoints, c)?;
    if transforms.len() > config.max_intervals {
        return Err(SetupError::IntervalLimitExceeded {
            max_intervals: config.max_intervals,
            rho: config.rho,
            ratio: f64::INFINITY,
        });
    }

    let mut log_scale = max_log_density(density, breakpoints)?;
    let mut intervals = assemble(density, breakpoints, &transforms, log_scale)?;

    let mut round = 0usize;
    loop {
        let hat: f64 = intervals.iter().map(Interval::hat_area).sum();
        let squeeze: f64 = intervals.iter().map(Interval::squeeze_area).sum();
        let n = intervals.len();

        debug!(round, intervals = n, hat, squeeze, ratio = area_ratio(hat, squeeze), "refine");

        if hat.is_finite() && hat <= config.rho * squeeze {
            break;
        }

        let budget = config.max_intervals - n;
        let exceeded = || SetupError::IntervalLimitExceeded {
            max_intervals: config.max_intervals,
            rho: config.rho,
            ratio: area_ratio(hat, squeeze),
        };
        if budget == 0 {
            return Err(exceeded());
        }

        let marked = select_splits(&intervals, hat, squeeze, budget);
        let mut refined = Vec::with_capacity(n + marked.len());
        let mut progressed = false;
        let mut peak = log_scale;
        for (i, iv) in intervals.into_iter().enumerate() {
            if marked.binary_search(&i).is_ok() {
                if let Some((l, r)) = iv.split(density, log_scale)? {
                    let lf = density.lpdf(l.right());
                    if lf.is_finite() {
                        peak = peak.max(lf);
                    }
                    refined.push(l);
                    refined.push(r);
                    progressed = true;
                    continue;
                }
            }
            refined.push(iv);
        }
        intervals = refined;

        if !progressed {
            return Err(exceeded());
        }
        if peak > log_scale {
            debug!(round, from = log_scale, to = peak, "raising log scale");
            log_scale = peak;
            intervals = rebuild(density, &intervals, log_scale)?;
        }
        round += 1;
    }

    #[cfg(feature = "debug-intervals")]
    check_partition(&intervals, breakpoints);

    Ok(Intervals {
        intervals,
        log_scale,
    })
}

/// Intervals over consecutive `edges`, region `k` spanning
/// `[edges[k], edges[k + 1]]` with `transforms[k]`.
fn assemble<D: LogDensity + ?Sized>(
    density: &D,
    edges: &[f64],
    transforms: &[Transform],
    log_scale: f64,
) -> SetupResult<Vec<Interval>> {
    let mut points = Vec::with_capacity(edges.len());
    for &x in edges {
        let p = if x.is_finite() {
            Some(DensityPoint::eval(density, x, log_scale)?)
        } else {
            None
        };
        points.push(p);
    }

    let mut intervals = Vec::with_capacity(transforms.len());
    for (k, tr) in transforms.iter().enumerate() {
        let ta = points[k].as_ref().map(|p| tr.point(p)).transpose()?;
        let tb = points[k + 1].as_ref().map(|p| tr.point(p)).transpose()?;
        intervals.push(Interval::new(
            *tr,
            (edges[k], ta),
            (edges[k + 1], tb),
            density,
            log_scale,
        )?);
    }
    Ok(intervals)
}

/// Same partition and transforms, hats and squeezes recomputed under a new
/// log-density shift.
fn rebuild<D: LogDensity + ?Sized>(
    density: &D,
    intervals: &[Interval],
    log_scale: f64,
) -> SetupResult<Vec<Interval>> {
    let edges: Vec<f64> = intervals
        .first()
        .map(Interval::left)
        .into_iter()
        .chain(intervals.iter().map(Interval::right))
        .collect();
    let transforms: Vec<Transform> = intervals.iter().map(|iv| *iv.transform()).collect();
    assemble(density, &edges, &transforms, log_scale)
}

/// Indices (ascending) of the intervals to split this round, at most
/// `budget` of them, largest hat/squeeze gap first.
///
/// Intervals whose gap is below rounding of the total hat area are left
/// alone; refining them cannot move the ratio.
fn select_splits(intervals: &[Interval], hat: f64, squeeze: f64, budget: usize) -> Vec<usize> {
    let threshold = if hat.is_finite() {
        let negligible = f64::EPSILON * hat;
        (SPLIT_THRESHOLD * (hat - squeeze) / intervals.len() as f64).max(negligible)
    } else {
        f64::INFINITY
    };

    let gap = |iv: &Interval| iv.hat_area() - iv.squeeze_area();
    let mut marked: Vec<usize> = intervals
        .iter()
        .enumerate()
        .filter(|&(_, iv)| !iv.hat_area().is_finite() || gap(iv) > threshold)
        .map(|(i, _)| i)
        .collect();

    if marked.is_empty() {
        // Always make progress: take the single worst interval.
        let worst = (0..intervals.len())
            .max_by(|&i, &j| gap(&intervals[i]).total_cmp(&gap(&intervals[j])));
        marked.extend(worst);
    }

    if marked.len() > budget {
        marked.sort_by(|&i, &j| gap(&intervals[j]).total_cmp(&gap(&intervals[i])));
        marked.truncate(budget);
    }
    marked.sort_unstable();
    marked
}

/// Transforms for each initial region after checking the breakpoints.
fn validate_regions(breakpoints: &[f64], c: &[f64]) -> SetupResult<Vec<Transform>> {
    if breakpoints.len() < 2 {
        return Err(SetupError::invalid_config("at least two breakpoints are required"));
    }
    if breakpoints.iter().any(|x| x.is_nan()) {
        return Err(SetupError::invalid_config("breakpoints contain NaN"));
    }
    if let Some(w) = breakpoints.windows(2).find(|w| w[0] >= w[1]) {
        return Err(SetupError::invalid_config(format!(
            "breakpoints must be strictly increasing ({} >= {})",
            w[0], w[1]
        )));
    }

    let regions = breakpoints.len() - 1;
    if c.len() != 1 && c.len() != regions {
        return Err(SetupError::invalid_config(format!(
            "expected 1 or {regions} transform parameters, got {}",
            c.len()
        )));
    }

    (0..regions)
        .map(|k| {
            let tr = Transform::new(if c.len() == 1 { c[0] } else { c[k] })?;
            let unbounded = breakpoints[k].is_infinite() || breakpoints[k + 1].is_infinite();
            if unbounded && !tr.allows_unbounded() {
                return Err(SetupError::invalid_config(format!(
                    "unbounded region [{}, {}] requires -1 < c <= 0, got c = {}",
                    breakpoints[k],
                    breakpoints[k + 1],
                    tr.c()
                )));
            }
            Ok(tr)
        })
        .collect()
}

/// Largest finite log-density over the finite breakpoints, 0 if there is none.
fn max_log_density<D: LogDensity + ?Sized>(density: &D, breakpoints: &[f64]) -> SetupResult<f64> {
    let mut scale = f64::NEG_INFINITY;
    for &x in breakpoints.iter().filter(|x| x.is_finite()) {
        let lf = density.lpdf(x);
        if lf.is_nan() {
            return Err(SetupError::domain(x, "lpdf", lf));
        }
        if lf.is_finite() {
            scale = scale.max(lf);
        }
    }
    Ok(if scale.is_finite() { scale } else { 0.0 })
}

#[cfg(feature = "debug-intervals")]
fn check_partition(intervals: &[Interval], breakpoints: &[f64]) {
    assert_eq!(intervals[0].left(), breakpoints[0]);
    assert_eq!(
        intervals[intervals.len() - 1].right(),
        breakpoints[breakpoints.len() - 1]
    );
    for w in intervals.windows(2) {
        assert_eq!(w[0].right(), w[1].left(), "gap between intervals");
    }
    for iv in intervals {
        assert!(iv.hat_area().is_finite() && iv.hat_area() >= iv.squeeze_area());
    }
}
