use crate::builder::{Intervals, area_ratio, build_intervals};
use crate::config::TinflexConfig;
use crate::density::LogDensity;
use crate::error::SetupResult;
use crate::guide::GuideTable;
use crate::interval::Interval;
use crate::sampler::Counters;
use std::fmt;
use tracing::info;

/// Transformed density rejection generator.
///
/// Owns the log-density, the refined intervals and the guide table. After
/// construction only the sampling counters change, so a generator can be
/// shared across threads by reference; it is released by dropping it.
pub struct Generator<D> {
    pub(crate) density: D,
    pub(crate) intervals: Vec<Interval>,
    pub(crate) guide: GuideTable,
    pub(crate) log_scale: f64,
    pub(crate) total_hat: f64,
    pub(crate) total_squeeze: f64,
    pub(crate) config: TinflexConfig,
    pub(crate) counters: Counters,
}

impl<D: LogDensity> Generator<D> {
    /// Build intervals over `breakpoints` and the guide table on top of them.
    pub fn new(
        density: D,
        breakpoints: &[f64],
        c: &[f64],
        config: TinflexConfig,
    ) -> SetupResult<Self> {
        let Intervals {
            intervals,
            log_scale,
        } = build_intervals(&density, breakpoints, c, &config)?;

        let guide = GuideTable::from_areas(
            intervals.iter().map(Interval::hat_area),
            config.guide_factor,
        )?;
        let total_hat = guide.total();
        let total_squeeze = intervals.iter().map(Interval::squeeze_area).sum();

        info!(
            intervals = intervals.len(),
            total_hat,
            total_squeeze,
            ratio = area_ratio(total_hat, total_squeeze),
            guide_size = guide.size(),
            "generator ready"
        );

        Ok(Self {
            density,
            intervals,
            guide,
            log_scale,
            total_hat,
            total_squeeze,
            config,
            counters: Counters::default(),
        })
    }

    /// Density (scaled by `exp(-log_scale)`) at `x`.
    #[inline]
    pub(crate) fn scaled_density(&self, x: f64) -> f64 {
        (self.density.lpdf(x) - self.log_scale).exp()
    }
}

impl<D> Generator<D> {
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn guide_table(&self) -> &GuideTable {
        &self.guide
    }

    pub fn cumulative_areas(&self) -> &[f64] {
        self.guide.cumulative()
    }

    pub fn total_hat_area(&self) -> f64 {
        self.total_hat
    }

    pub fn total_squeeze_area(&self) -> f64 {
        self.total_squeeze
    }

    /// Total hat area over total squeeze area.
    pub fn ratio(&self) -> f64 {
        area_ratio(self.total_hat, self.total_squeeze)
    }

    /// Shift subtracted from the log-density; areas are in `exp(lpdf - log_scale)` units.
    pub fn log_scale(&self) -> f64 {
        self.log_scale
    }

    pub fn config(&self) -> &TinflexConfig {
        &self.config
    }

    pub fn density(&self) -> &D {
        &self.density
    }

    /// Support covered by the intervals.
    pub fn support(&self) -> (f64, f64) {
        let first = self.intervals.first().map_or(f64::NAN, Interval::left);
        let last = self.intervals.last().map_or(f64::NAN, Interval::right);
        (first, last)
    }

    pub fn into_density(self) -> D {
        self.density
    }
}

/// Build a generator; the free-function form of [`Generator::new`].
pub fn setup<D: LogDensity>(
    density: D,
    breakpoints: &[f64],
    c: &[f64],
    rho: f64,
    max_intervals: usize,
) -> SetupResult<Generator<D>> {
    Generator::new(
        density,
        breakpoints,
        c,
        TinflexConfig::new(rho, max_intervals),
    )
}

impl<D> fmt::Display for Generator<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (lo, hi) = self.support();
        writeln!(f, "Tinflex generator")?;
        writeln!(f, "  support:        [{lo}, {hi}]")?;
        writeln!(f, "  intervals:      {}", self.intervals.len())?;
        writeln!(f, "  A(hat):         {:e}", self.total_hat)?;
        writeln!(f, "  A(squeeze):     {:e}", self.total_squeeze)?;
        writeln!(
            f,
            "  ratio:          {:.6} (rho = {})",
            self.ratio(),
            self.config.rho
        )?;
        writeln!(f, "  log scale:      {}", self.log_scale)?;
        writeln!(f, "  guide size:     {}", self.guide.size())?;
        if f.alternate() {
            for iv in &self.intervals {
                writeln!(f, "    {iv}")?;
            }
        }
        Ok(())
    }
}

impl<D> fmt::Debug for Generator<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("intervals", &self.intervals.len())
            .field("total_hat", &self.total_hat)
            .field("total_squeeze", &self.total_squeeze)
            .field("log_scale", &self.log_scale)
            .field("config", &self.config)
            .finish()
    }
}
