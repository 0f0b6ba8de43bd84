use crate::consts::{DEFAULT_GUIDE_FACTOR, DEFAULT_MAX_INTERVALS, DEFAULT_RHO};
use crate::error::{SetupError, SetupResult};

/// Tuning knobs for generator construction and sampling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TinflexConfig {
    /// Upper bound for total hat area / total squeeze area. Must exceed 1.
    pub rho: f64,
    /// Upper bound on the number of intervals after refinement.
    pub max_intervals: usize,
    /// Guide table size relative to the number of intervals.
    pub guide_factor: f64,
    /// Rejected trials tolerated per variate before giving up; `None`
    /// retries forever.
    pub max_rejections: Option<usize>,
}

impl Default for TinflexConfig {
    fn default() -> Self {
        Self {
            rho: DEFAULT_RHO,
            max_intervals: DEFAULT_MAX_INTERVALS,
            guide_factor: DEFAULT_GUIDE_FACTOR,
            max_rejections: None,
        }
    }
}

impl TinflexConfig {
    pub fn new(rho: f64, max_intervals: usize) -> Self {
        Self {
            rho,
            max_intervals,
            ..Self::default()
        }
    }

    pub fn with_rho(mut self, rho: f64) -> Self {
        self.rho = rho;
        self
    }

    pub fn with_max_intervals(mut self, max_intervals: usize) -> Self {
        self.max_intervals = max_intervals;
        self
    }

    pub fn with_guide_factor(mut self, guide_factor: f64) -> Self {
        self.guide_factor = guide_factor;
        self
    }

    pub fn with_max_rejections(mut self, max_rejections: usize) -> Self {
        self.max_rejections = Some(max_rejections);
        self
    }

    pub fn validate(&self) -> SetupResult<()> {
        // The negated comparison also catches NaN.
        if !(self.rho > 1.0) || self.rho.is_infinite() {
            return Err(SetupError::invalid_config(format!(
                "rho must be finite and exceed 1, got {}",
                self.rho
            )));
        }
        if self.max_intervals == 0 {
            return Err(SetupError::invalid_config("max_intervals must be positive"));
        }
        if !(self.guide_factor > 0.0) || self.guide_factor.is_infinite() {
            return Err(SetupError::invalid_config(format!(
                "guide_factor must be finite and positive, got {}",
                self.guide_factor
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = TinflexConfig::default();
        assert_eq!(cfg.rho, 1.1);
        assert_eq!(cfg.max_intervals, 1001);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let cfg = TinflexConfig::new(1.05, 50)
            .with_guide_factor(2.0)
            .with_max_rejections(100);
        assert_eq!(cfg.rho, 1.05);
        assert_eq!(cfg.max_intervals, 50);
        assert_eq!(cfg.guide_factor, 2.0);
        assert_eq!(cfg.max_rejections, Some(100));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        for rho in [1.0, 0.5, f64::NAN, f64::INFINITY] {
            let err = TinflexConfig::default().with_rho(rho).validate().unwrap_err();
            assert!(matches!(err, SetupError::InvalidConfig(_)), "rho={rho}");
        }
        assert!(TinflexConfig::default().with_max_intervals(0).validate().is_err());
        assert!(TinflexConfig::default().with_guide_factor(0.0).validate().is_err());
    }
}
