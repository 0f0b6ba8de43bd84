use std::f64::consts::PI;

pub const DEFAULT_RHO: f64 = 1.1;
pub const DEFAULT_MAX_INTERVALS: usize = 1001;
pub const DEFAULT_GUIDE_FACTOR: f64 = 1.0;

/// Intervals whose hat/squeeze gap exceeds this fraction of the mean gap are split.
pub const SPLIT_THRESHOLD: f64 = 0.99;

/// Relative tolerance for the bounding checks in transformed space.
pub const BOUND_TOL: f64 = 1.0e-10;

/// Below this relative change a line is treated as constant when integrating.
pub const FLAT_TOL: f64 = 1.0e-10;

/// Magnitude above which the arc-mean falls back to the harmonic mean.
pub const ARCMEAN_LARGE: f64 = 1.0e3;
/// Points whose arctangents differ by less than this use the plain mean.
pub const ARCMEAN_CLOSE: f64 = 1.0e-6;

pub const PI_OVER_TWO: f64 = PI / 2.0;
