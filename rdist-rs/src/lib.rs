//! # rdist: test distributions for the Tinflex sampler
//!
//! Five hand-coded log-densities with their derivatives, selectable by
//! [`TestDistribution`] or by the numeric tags 1 to 6 (tag 5 is an alias of
//! tag 2), together with the breakpoints and transform parameters that suit
//! each of them.

pub mod densities;

use densities::{double_well, plateau, pole, quartic, wide_double_well};
use std::fmt;
use tinflex_rs::{FnLogDensity, Generator, SetupError, SetupResult, TinflexConfig};
use tracing::debug;

/// Generator over one of the test distributions.
pub type RdistGenerator = Generator<FnLogDensity<()>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TestDistribution {
    /// Tag 1: `(1 - x^2) (x^2 - 4)`.
    Quartic,
    /// Tags 2 and 5: `-2 x^4 + 4 x^2`.
    DoubleWell,
    /// Tag 3: `log(1 - x^4)` on `[-1, 1]`.
    Plateau,
    /// Tag 4: `-log|x| / 2` on `[-1, 1]`.
    Pole,
    /// Tag 6: `-x^4 + 6 x^2`.
    WideDoubleWell,
}

impl TestDistribution {
    pub const ALL: [Self; 5] = [
        Self::Quartic,
        Self::DoubleWell,
        Self::Plateau,
        Self::Pole,
        Self::WideDoubleWell,
    ];

    pub fn from_tag(tag: i32) -> Option<Self> {
        match tag {
            1 => Some(Self::Quartic),
            2 | 5 => Some(Self::DoubleWell),
            3 => Some(Self::Plateau),
            4 => Some(Self::Pole),
            6 => Some(Self::WideDoubleWell),
            _ => None,
        }
    }

    pub fn tag(self) -> i32 {
        match self {
            Self::Quartic => 1,
            Self::DoubleWell => 2,
            Self::Plateau => 3,
            Self::Pole => 4,
            Self::WideDoubleWell => 6,
        }
    }

    pub fn density(self) -> FnLogDensity<()> {
        match self {
            Self::Quartic => FnLogDensity::new(quartic::lf, quartic::dlf, quartic::d2lf, ()),
            Self::DoubleWell => {
                FnLogDensity::new(double_well::lf, double_well::dlf, double_well::d2lf, ())
            }
            Self::Plateau => FnLogDensity::new(plateau::lf, plateau::dlf, plateau::d2lf, ()),
            Self::Pole => FnLogDensity::new(pole::lf, pole::dlf, pole::d2lf, ()),
            Self::WideDoubleWell => FnLogDensity::new(
                wide_double_well::lf,
                wide_double_well::dlf,
                wide_double_well::d2lf,
                (),
            ),
        }
    }

    /// Initial breakpoints, including the support bounds.
    pub fn breakpoints(self) -> &'static [f64] {
        const INF: f64 = f64::INFINITY;
        match self {
            Self::Quartic => &[-3.0, -1.5, 0.0, 1.5, 3.0],
            Self::DoubleWell => &[-INF, -1.0, 0.0, 1.0, INF],
            Self::Plateau => &[-1.0, 0.0, 1.0],
            Self::Pole => &[-1.0, 0.0, 1.0],
            Self::WideDoubleWell => &[-INF, -2.0, -1.0, 0.0, 1.0, 2.0, INF],
        }
    }

    /// Transform parameter applied to every region.
    ///
    /// The vanishing ends of [`Self::Plateau`] need `c > 0`; the pole of
    /// [`Self::Pole`] needs `c < -1` for the hat to stay integrable.
    pub fn transform(self) -> f64 {
        match self {
            Self::Quartic | Self::DoubleWell | Self::WideDoubleWell => 0.0,
            Self::Plateau => 1.0,
            Self::Pole => -1.5,
        }
    }

    pub fn support(self) -> (f64, f64) {
        let ib = self.breakpoints();
        (ib[0], ib[ib.len() - 1])
    }

    /// Build a generator with explicit breakpoints and transform parameters.
    pub fn setup(
        self,
        ib: &[f64],
        c: &[f64],
        rho: f64,
        max_intervals: usize,
    ) -> SetupResult<RdistGenerator> {
        debug!(distribution = %self, ?ib, ?c, rho, max_intervals, "setup");
        Generator::new(self.density(), ib, c, TinflexConfig::new(rho, max_intervals))
    }

    /// Build a generator with the distribution's own breakpoints and `c`.
    pub fn setup_default(self, config: TinflexConfig) -> SetupResult<RdistGenerator> {
        Generator::new(
            self.density(),
            self.breakpoints(),
            &[self.transform()],
            config,
        )
    }
}

impl fmt::Display for TestDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Quartic => "quartic",
            Self::DoubleWell => "double-well",
            Self::Plateau => "plateau",
            Self::Pole => "pole",
            Self::WideDoubleWell => "wide-double-well",
        };
        write!(f, "{name} (tag {})", self.tag())
    }
}

/// Select a test distribution by tag and build its generator.
pub fn setup(
    tag: i32,
    ib: &[f64],
    c: &[f64],
    rho: f64,
    max_intervals: usize,
) -> SetupResult<RdistGenerator> {
    let distribution = TestDistribution::from_tag(tag)
        .ok_or_else(|| SetupError::invalid_config(format!("unknown test distribution {tag}")))?;
    distribution.setup(ib, c, rho, max_intervals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinflex_rs::LogDensity;

    #[test]
    fn test_tags() {
        for d in TestDistribution::ALL {
            assert_eq!(TestDistribution::from_tag(d.tag()), Some(d));
        }
        assert_eq!(TestDistribution::from_tag(5), Some(TestDistribution::DoubleWell));
        assert_eq!(TestDistribution::from_tag(0), None);
        assert_eq!(TestDistribution::from_tag(7), None);
    }

    #[test]
    fn test_density_dispatch() {
        let d = TestDistribution::Quartic.density();
        assert_eq!(d.lpdf(0.0), -4.0);
        let d = TestDistribution::DoubleWell.density();
        assert_eq!(d.lpdf(1.0), 2.0);
        let d = TestDistribution::WideDoubleWell.density();
        assert_eq!(d.dlpdf(1.0), 8.0);
    }

    #[test]
    fn test_unknown_tag() {
        let err = setup(7, &[-1.0, 1.0], &[0.0], 1.1, 100).unwrap_err();
        assert!(matches!(err, SetupError::InvalidConfig(_)));
    }

    #[test]
    fn test_defaults_build() {
        for d in TestDistribution::ALL {
            let g = d.setup_default(TinflexConfig::default()).unwrap();
            assert!(g.ratio() <= 1.1 * (1.0 + 1e-12), "{d}");
            assert_eq!(g.support(), d.support(), "{d}");
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(TestDistribution::Pole.to_string(), "pole (tag 4)");
    }
}
