//! Rejection sampling from a built generator.

use crate::density::LogDensity;
use crate::error::{SampleError, SampleResult};
use crate::generator::Generator;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

/// Source of independent uniform draws on `[0, 1)`.
pub trait UniformSource {
    fn uniform(&mut self) -> f64;
}

impl<R: Rng> UniformSource for R {
    #[inline]
    fn uniform(&mut self) -> f64 {
        self.random::<f64>()
    }
}

/// Snapshot of the sampling counters of a generator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SamplerStats {
    pub trials: u64,
    pub accepted: u64,
    pub squeeze_accepted: u64,
}

impl SamplerStats {
    /// Fraction of trials that produced a variate.
    pub fn acceptance_rate(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.accepted as f64 / self.trials as f64
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    trials: AtomicU64,
    accepted: AtomicU64,
    squeeze_accepted: AtomicU64,
}

impl Counters {
    fn record(&self, trials: u64, squeeze: bool) {
        self.trials.fetch_add(trials, Ordering::Relaxed);
        self.accepted.fetch_add(1, Ordering::Relaxed);
        if squeeze {
            self.squeeze_accepted.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn record_failure(&self, trials: u64) {
        self.trials.fetch_add(trials, Ordering::Relaxed);
    }

    fn snapshot(&self) -> SamplerStats {
        SamplerStats {
            trials: self.trials.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            squeeze_accepted: self.squeeze_accepted.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.trials.store(0, Ordering::Relaxed);
        self.accepted.store(0, Ordering::Relaxed);
        self.squeeze_accepted.store(0, Ordering::Relaxed);
    }
}

impl<D: LogDensity> Generator<D> {
    /// Draw one variate.
    ///
    /// Each trial uses three uniforms: one selects the interval through the
    /// guide table, one inverts that interval's hat, and one decides
    /// acceptance against the squeeze first and the density second.
    pub fn sample_one<R: UniformSource + ?Sized>(&self, rng: &mut R) -> SampleResult<f64> {
        let mut trials = 0u64;
        loop {
            trials += 1;

            let iv = &self.intervals[self.guide.lookup(rng.uniform())];
            let x = iv.hat_inverse_cdf(rng.uniform() * iv.hat_area());
            let u = rng.uniform();

            if x.is_finite() {
                let v = u * iv.hat_density(x);
                if v <= iv.squeeze_density(x) {
                    self.counters.record(trials, true);
                    return Ok(x);
                }
                if v <= self.scaled_density(x) {
                    self.counters.record(trials, false);
                    return Ok(x);
                }
            }

            if let Some(max) = self.config.max_rejections {
                if trials > max as u64 {
                    self.counters.record_failure(trials);
                    warn!(trials, "rejection cap reached");
                    return Err(SampleError::ExhaustedRetries {
                        attempts: trials as usize,
                    });
                }
            }
        }
    }

    /// Draw `n` variates.
    pub fn sample<R: UniformSource + ?Sized>(&self, n: usize, rng: &mut R) -> SampleResult<Vec<f64>> {
        let mut out = vec![0.0; n];
        self.sample_into(&mut out, rng)?;
        Ok(out)
    }

    /// Fill `out` with variates.
    pub fn sample_into<R: UniformSource + ?Sized>(
        &self,
        out: &mut [f64],
        rng: &mut R,
    ) -> SampleResult<()> {
        for slot in out.iter_mut() {
            *slot = self.sample_one(rng)?;
        }
        Ok(())
    }

    /// Draw `n` variates from the thread-local generator of `rand`.
    pub fn sample_thread_rng(&self, n: usize) -> SampleResult<Vec<f64>> {
        let mut rng = rand::rng();
        self.sample(n, &mut rng)
    }
}

impl<D> Generator<D> {
    pub fn stats(&self) -> SamplerStats {
        self.counters.snapshot()
    }

    pub fn reset_stats(&self) {
        self.counters.reset();
    }
}
