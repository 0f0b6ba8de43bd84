//! # Tinflex: Transformed Density Rejection with Inflection Points
//!
//! Universal sampler for univariate distributions given by a log-density and
//! its first two derivatives. The support is split into intervals on which a
//! transform `T_c` of the density has at most one inflection point; there the
//! transformed density is bounded by straight lines from above (hat) and
//! below (squeeze). Intervals are refined until the ratio of total hat area
//! to total squeeze area drops below `rho`.
//!
//! Sampling picks an interval through a guide table in expected constant
//! time, inverts the hat on that interval in closed form and accepts against
//! the squeeze, falling back to the density itself.
//!
//! ```no_run
//! use rand::{SeedableRng, rngs::StdRng};
//! use tinflex_rs::{FnLogDensity, setup};
//!
//! fn lf(x: f64, _: &()) -> f64 { -x.powi(4) + 5.0 * x * x - 4.0 }
//! fn dlf(x: f64, _: &()) -> f64 { 10.0 * x - 4.0 * x.powi(3) }
//! fn d2lf(x: f64, _: &()) -> f64 { 10.0 - 12.0 * x * x }
//!
//! let density = FnLogDensity::new(lf, dlf, d2lf, ());
//! let generator = setup(density, &[-3.0, -1.5, 0.0, 1.5, 3.0], &[0.0], 1.1, 100)?;
//! let xs = generator.sample(1000, &mut StdRng::seed_from_u64(1))?;
//! # Ok::<(), tinflex_rs::TinflexError>(())
//! ```
//!
//! ## Features
//!
//! * `debug-guide` checks every guide table lookup against a linear search.
//! * `debug-intervals` checks the finished partition for gaps and invalid areas.
//! * `debug-all` enables both.

mod consts;
mod utils;

pub mod builder;
pub mod config;
pub mod density;
pub mod error;
pub mod generator;
pub mod guide;
pub mod interval;
pub mod sampler;
pub mod transform;

pub use builder::{Intervals, build_intervals};
pub use config::TinflexConfig;
pub use density::{DensityFn, FnLogDensity, LogDensity};
pub use error::{SampleError, SampleResult, SetupError, SetupResult, TinflexError};
pub use generator::{Generator, setup};
pub use guide::GuideTable;
pub use interval::{Interval, Line};
pub use sampler::{SamplerStats, UniformSource};
pub use transform::Transform;
