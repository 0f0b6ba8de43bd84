//! Guide table for drawing an interval index from a single uniform.
//!
//! Slot `i` stores the first interval whose cumulative area exceeds
//! `i * total / size`. A lookup starts at the slot of `u` and walks forward
//! over the few intervals that share the bucket, which keeps the expected
//! cost constant.

use crate::error::{SetupError, SetupResult};

#[derive(Clone, Debug)]
pub struct GuideTable {
    table: Vec<usize>,
    cumulative: Vec<f64>,
}

impl GuideTable {
    /// Build a table with `ceil(factor * n)` slots over `n` cumulative areas.
    ///
    /// `cumulative` must be non-empty, non-decreasing, finite, and end in a
    /// positive total.
    pub fn new(cumulative: Vec<f64>, factor: f64) -> SetupResult<Self> {
        let n = cumulative.len();
        if n == 0 {
            return Err(SetupError::invalid_config("no cumulative areas for guide table"));
        }
        let mut prev = 0.0;
        for (i, &acc) in cumulative.iter().enumerate() {
            if !acc.is_finite() || acc < prev {
                return Err(SetupError::invalid_config(format!(
                    "cumulative areas must be finite and increasing (index {i}: {acc})"
                )));
            }
            prev = acc;
        }
        let total = cumulative[n - 1];
        if total <= 0.0 {
            return Err(SetupError::invalid_config("total area must be positive"));
        }
        if !(factor > 0.0) || factor.is_infinite() {
            return Err(SetupError::invalid_config(format!(
                "guide factor must be positive, got {factor}"
            )));
        }

        let size = ((factor * n as f64).ceil() as usize).max(1);
        let step = total / size as f64;
        let mut table = vec![0usize; size];
        let mut j = 0usize;
        for (i, slot) in table.iter_mut().enumerate() {
            let target = step * i as f64;
            while j + 1 < n && cumulative[j] <= target {
                j += 1;
            }
            *slot = j;
        }

        Ok(Self { table, cumulative })
    }

    /// Build from per-interval areas.
    pub fn from_areas<I: IntoIterator<Item = f64>>(areas: I, factor: f64) -> SetupResult<Self> {
        let cumulative = areas
            .into_iter()
            .scan(0.0, |acc, a| {
                *acc += a;
                Some(*acc)
            })
            .collect();
        Self::new(cumulative, factor)
    }

    /// Index of the interval whose cumulative range `[acc[j-1], acc[j])`
    /// contains `u * total`, for `u` in `[0, 1)`.
    #[inline]
    pub fn lookup(&self, u: f64) -> usize {
        let n = self.cumulative.len();
        let target = u * self.total();
        let slot = ((u * self.table.len() as f64) as usize).min(self.table.len() - 1);
        let mut j = self.table[slot];

        while j + 1 < n && self.cumulative[j] <= target {
            j += 1;
        }
        // Only needed when rounding put `target` just below the slot edge.
        while j > 0 && self.cumulative[j - 1] > target {
            j -= 1;
        }

        #[cfg(feature = "debug-guide")]
        assert_eq!(j, self.linear_search(u), "guide table lookup diverged at u={u}");

        j
    }

    /// Reference lookup by exhaustive scan.
    pub fn linear_search(&self, u: f64) -> usize {
        let target = u * self.total();
        self.cumulative
            .iter()
            .position(|&acc| acc > target)
            .unwrap_or(self.cumulative.len() - 1)
    }

    #[inline]
    pub fn total(&self) -> f64 {
        self.cumulative[self.cumulative.len() - 1]
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.table.len()
    }

    #[inline]
    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    #[inline]
    pub fn slots(&self) -> &[usize] {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    #[test]
    fn test_lookup_matches_linear_search() {
        let mut rng = StdRng::seed_from_u64(7);
        let areas: Vec<f64> = (0..137).map(|_| rng.random::<f64>().powi(3) + 1e-6).collect();
        for factor in [0.5, 1.0, 3.0] {
            let gt = GuideTable::from_areas(areas.iter().copied(), factor).unwrap();
            for _ in 0..10_000 {
                let u: f64 = rng.random();
                assert_eq!(gt.lookup(u), gt.linear_search(u), "u={u} factor={factor}");
            }
        }
    }

    #[test]
    fn test_slot_edges() {
        let gt = GuideTable::new(vec![1.0, 2.0, 3.0, 4.0], 1.0).unwrap();
        assert_eq!(gt.slots(), &[0, 1, 2, 3]);
        assert_eq!(gt.lookup(0.0), 0);
        assert_eq!(gt.lookup(0.25), 1);
        assert_eq!(gt.lookup(0.999_999), 3);
        assert_eq!(gt.total(), 4.0);
    }

    #[test]
    fn test_zero_area_intervals_are_skipped() {
        let gt = GuideTable::from_areas([0.0, 1.0, 0.0, 1.0], 1.0).unwrap();
        assert_eq!(gt.lookup(0.0), 1);
        assert_eq!(gt.lookup(0.5), 3);
    }

    #[test]
    fn test_invalid_input() {
        assert!(GuideTable::new(Vec::new(), 1.0).is_err());
        assert!(GuideTable::new(vec![1.0, 0.5], 1.0).is_err());
        assert!(GuideTable::new(vec![0.0, 0.0], 1.0).is_err());
        assert!(GuideTable::new(vec![1.0, f64::NAN], 1.0).is_err());
        assert!(GuideTable::new(vec![1.0], 0.0).is_err());
    }

    #[test]
    fn test_single_interval() {
        let gt = GuideTable::new(vec![2.5], 1.0).unwrap();
        assert_eq!(gt.size(), 1);
        assert_eq!(gt.lookup(0.3), 0);
    }
}
