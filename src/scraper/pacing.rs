use std::time::Duration;

use rand::Rng;
use tracing::debug;

/// Length class of a randomized pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayTier {
    Short,
    Medium,
    Long,
}

/// Randomized delay intervals, in seconds, tiered by pause length.
///
/// Larger runs get wider intervals.
#[derive(Debug, Clone, PartialEq)]
pub struct PacingPolicy {
    short: (f64, f64),
    medium: (f64, f64),
    long: (f64, f64),
}

impl PacingPolicy {
    /// Intervals for a run targeting `target` leads; runs above `threshold` pause longer.
    pub fn for_target(target: usize, threshold: usize) -> Self {
        if target > threshold {
            Self {
                short: (2.0, 4.0),
                medium: (4.0, 7.0),
                long: (7.0, 12.0),
            }
        } else {
            Self {
                short: (1.0, 2.5),
                medium: (2.5, 4.0),
                long: (4.0, 7.0),
            }
        }
    }

    /// Same interval for every tier.
    pub fn uniform(min: Duration, max: Duration) -> Self {
        let bounds = (min.as_secs_f64(), max.as_secs_f64().max(min.as_secs_f64()));
        Self {
            short: bounds,
            medium: bounds,
            long: bounds,
        }
    }

    /// Closed interval for a tier.
    pub fn bounds(&self, tier: DelayTier) -> (Duration, Duration) {
        let (lo, hi) = self.secs(tier);
        (Duration::from_secs_f64(lo), Duration::from_secs_f64(hi))
    }

    /// Draw a duration uniformly from the tier's interval.
    pub fn sample<R: Rng + ?Sized>(&self, tier: DelayTier, rng: &mut R) -> Duration {
        let (lo, hi) = self.secs(tier);
        if hi <= lo {
            return Duration::from_secs_f64(lo);
        }
        Duration::from_secs_f64(rng.gen_range(lo..=hi))
    }

    /// Sleep for a randomized duration from the tier's interval.
    pub async fn delay(&self, tier: DelayTier) {
        let pause = self.sample(tier, &mut rand::thread_rng());
        if pause.is_zero() {
            return;
        }
        debug!("Pausing {:.2}s ({:?})", pause.as_secs_f64(), tier);
        tokio::time::sleep(pause).await;
    }

    fn secs(&self, tier: DelayTier) -> (f64, f64) {
        match tier {
            DelayTier::Short => self.short,
            DelayTier::Medium => self.medium,
            DelayTier::Long => self.long,
        }
    }
}
