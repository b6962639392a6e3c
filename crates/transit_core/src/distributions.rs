//! Injectable random sources for weather sampling and demand jitter.
//!
//! The pipeline never reaches for an ambient generator. Every stochastic draw
//! goes through a [`UniformSource`] handed in by the caller, so a run can be
//! replayed exactly by supplying the same seed or a scripted sequence.

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

/// A source of uniformly distributed floats.
pub trait UniformSource: Send + std::fmt::Debug {
    /// Next value in `[low, high]`. Implementations return `low` when the
    /// range is empty.
    fn next_uniform(&mut self, low: f64, high: f64) -> f64;
}

/// Pick an index in `0..len` using the source. `len` must be non-zero.
pub fn pick_index(source: &mut dyn UniformSource, len: usize) -> usize {
    debug_assert!(len > 0, "cannot pick from an empty set");
    let raw = source.next_uniform(0.0, len as f64);
    (raw as usize).min(len - 1)
}

/// `StdRng`-backed source. Seeded for reproducible runs, entropy otherwise.
#[derive(Debug)]
pub struct SeededUniform {
    rng: StdRng,
}

impl SeededUniform {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self::new(Some(seed))
    }
}

impl UniformSource for SeededUniform {
    fn next_uniform(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..=high)
    }
}

/// Always returns the middle of the requested range.
///
/// A ±band jitter draws exactly 1.0 from this source.
#[derive(Debug, Clone, Copy, Default)]
pub struct MidpointUniform;

impl UniformSource for MidpointUniform {
    fn next_uniform(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        low + (high - low) / 2.0
    }
}

/// Replays a fixed list of fractions in `[0, 1]`, cycling when exhausted.
///
/// Each fraction is mapped onto the requested range, so the same script can
/// drive temperature draws and jitter draws alike.
#[derive(Debug, Clone)]
pub struct ScriptedUniform {
    fractions: Vec<f64>,
    cursor: usize,
}

impl ScriptedUniform {
    pub fn new(fractions: Vec<f64>) -> Self {
        let fractions = if fractions.is_empty() {
            vec![0.5]
        } else {
            fractions.into_iter().map(|f| f.clamp(0.0, 1.0)).collect()
        };
        Self {
            fractions,
            cursor: 0,
        }
    }

    /// Number of draws served so far.
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl UniformSource for ScriptedUniform {
    fn next_uniform(&mut self, low: f64, high: f64) -> f64 {
        let fraction = self.fractions[self.cursor % self.fractions.len()];
        self.cursor += 1;
        if high <= low {
            return low;
        }
        low + (high - low) * fraction
    }
}

/// Symmetric multiplicative jitter band around 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JitterBand {
    /// Half-width of the band; 0.05 means a multiplier in `[0.95, 1.05]`.
    pub spread: f64,
}

impl JitterBand {
    /// Single-day forward prediction (daily update path).
    pub const FORWARD: JitterBand = JitterBand { spread: 0.05 };
    /// Bulk historical backfill.
    pub const BACKFILL: JitterBand = JitterBand { spread: 0.20 };
    /// No jitter at all.
    pub const NONE: JitterBand = JitterBand { spread: 0.0 };

    pub fn new(spread: f64) -> Result<Self> {
        let band = Self { spread };
        band.validate()?;
        Ok(band)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.spread.is_finite() || self.spread < 0.0 || self.spread >= 1.0 {
            return Err(ForecastError::invalid(format!(
                "jitter spread must be in [0, 1), got {}",
                self.spread
            )));
        }
        Ok(())
    }

    pub fn low(&self) -> f64 {
        1.0 - self.spread
    }

    pub fn high(&self) -> f64 {
        1.0 + self.spread
    }

    /// Draw one jitter multiplier. Always strictly positive.
    pub fn sample(&self, source: &mut dyn UniformSource) -> f64 {
        source.next_uniform(self.low(), self.high())
    }
}

impl Default for JitterBand {
    fn default() -> Self {
        Self::FORWARD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_source_is_reproducible() {
        let mut a = SeededUniform::from_seed(42);
        let mut b = SeededUniform::from_seed(42);
        for _ in 0..50 {
            assert_eq!(a.next_uniform(0.0, 10.0), b.next_uniform(0.0, 10.0));
        }
    }

    #[test]
    fn seeded_source_stays_in_range() {
        let mut source = SeededUniform::from_seed(7);
        for _ in 0..1_000 {
            let v = source.next_uniform(0.95, 1.05);
            assert!((0.95..=1.05).contains(&v));
        }
    }

    #[test]
    fn empty_range_returns_low() {
        let mut source = SeededUniform::from_seed(1);
        assert_eq!(source.next_uniform(3.0, 3.0), 3.0);
        assert_eq!(MidpointUniform.next_uniform(5.0, 1.0), 5.0);
    }

    #[test]
    fn midpoint_jitter_is_exactly_one() {
        let mut source = MidpointUniform;
        assert_eq!(JitterBand::FORWARD.sample(&mut source), 1.0);
        assert_eq!(JitterBand::BACKFILL.sample(&mut source), 1.0);
    }

    #[test]
    fn scripted_source_cycles() {
        let mut source = ScriptedUniform::new(vec![0.0, 1.0]);
        assert_eq!(source.next_uniform(10.0, 20.0), 10.0);
        assert_eq!(source.next_uniform(10.0, 20.0), 20.0);
        assert_eq!(source.next_uniform(10.0, 20.0), 10.0);
        assert_eq!(source.draws(), 3);
    }

    #[test]
    fn pick_index_covers_bounds() {
        let mut source = ScriptedUniform::new(vec![0.0, 0.999, 1.0]);
        assert_eq!(pick_index(&mut source, 3), 0);
        assert_eq!(pick_index(&mut source, 3), 2);
        assert_eq!(pick_index(&mut source, 3), 2);
    }

    #[test]
    fn jitter_band_rejects_bad_spread() {
        assert!(JitterBand::new(-0.1).is_err());
        assert!(JitterBand::new(1.0).is_err());
        assert!(JitterBand::new(f64::NAN).is_err());
        assert!(JitterBand::new(0.2).is_ok());
    }
}
