use osmo_core::Recovery;
use uom::{ConstZero, si::f64::VolumeRate};

/// Division of a feed stream into permeate and concentrate.
///
/// Constructors keep `feed = permeate + concentrate` with neither product
/// negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowSplit {
    pub feed: VolumeRate,
    pub permeate: VolumeRate,
    pub concentrate: VolumeRate,
}

impl FlowSplit {
    /// Splits `feed` at the given recovery.
    #[must_use]
    pub fn from_feed(feed: VolumeRate, recovery: Recovery) -> Self {
        let permeate = feed * recovery.get();
        Self {
            feed,
            permeate,
            concentrate: feed - permeate,
        }
    }

    /// Back-calculates the feed needed to make `permeate` at the given recovery.
    #[must_use]
    pub fn from_permeate(permeate: VolumeRate, recovery: Recovery) -> Self {
        let feed = permeate / recovery.get();
        Self {
            feed,
            permeate,
            concentrate: feed - permeate,
        }
    }

    /// Splits `feed` with a known permeate flow.
    ///
    /// Permeate is capped at the feed so the concentrate never goes negative.
    #[must_use]
    pub fn with_permeate(feed: VolumeRate, permeate: VolumeRate) -> Self {
        let feed = if feed > VolumeRate::ZERO { feed } else { VolumeRate::ZERO };
        let permeate = if permeate > feed {
            feed
        } else if permeate > VolumeRate::ZERO {
            permeate
        } else {
            VolumeRate::ZERO
        };
        Self {
            feed,
            permeate,
            concentrate: feed - permeate,
        }
    }

    /// Permeate over feed, or zero without feed.
    #[must_use]
    pub fn recovery_fraction(&self) -> f64 {
        if self.feed > VolumeRate::ZERO {
            (self.permeate / self.feed).value
        } else {
            0.0
        }
    }

    /// The same split divided evenly across `vessels`, or all zero without vessels.
    #[must_use]
    pub fn per_vessel(&self, vessels: u32) -> Self {
        if vessels == 0 {
            return Self {
                feed: VolumeRate::ZERO,
                permeate: VolumeRate::ZERO,
                concentrate: VolumeRate::ZERO,
            };
        }
        let n = f64::from(vessels);
        Self {
            feed: self.feed / n,
            permeate: self.permeate / n,
            concentrate: self.concentrate / n,
        }
    }

    /// Mean of feed and concentrate flows, the usual basis for pressure drop.
    #[must_use]
    pub fn average_feed_side(&self) -> VolumeRate {
        (self.feed + self.concentrate) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use osmo_core::units::FlowUnit;

    fn m3h(value: f64) -> VolumeRate {
        FlowUnit::CubicMeterPerHour.to_volume_rate(value)
    }

    fn in_m3h(flow: VolumeRate) -> f64 {
        FlowUnit::CubicMeterPerHour.from_volume_rate(flow)
    }

    #[test]
    fn feed_split_conserves_flow() {
        let split = FlowSplit::from_feed(m3h(100.0), Recovery::from_percent_clamped(75.0));
        assert_relative_eq!(in_m3h(split.permeate), 75.0, epsilon = 1e-9);
        assert_relative_eq!(in_m3h(split.concentrate), 25.0, epsilon = 1e-9);
        assert_relative_eq!(split.recovery_fraction(), 0.75, epsilon = 1e-12);
    }

    #[test]
    fn permeate_split_back_calculates_feed() {
        let split = FlowSplit::from_permeate(m3h(60.0), Recovery::from_percent_clamped(60.0));
        assert_relative_eq!(in_m3h(split.feed), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn permeate_is_capped_at_feed() {
        let split = FlowSplit::with_permeate(m3h(10.0), m3h(12.0));
        assert_relative_eq!(in_m3h(split.concentrate), 0.0);
        assert_relative_eq!(in_m3h(split.permeate), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn per_vessel_handles_zero_vessels() {
        let split = FlowSplit::from_feed(m3h(30.0), Recovery::from_percent_clamped(50.0));
        assert_relative_eq!(in_m3h(split.per_vessel(3).feed), 10.0, epsilon = 1e-9);
        assert_relative_eq!(in_m3h(split.per_vessel(0).feed), 0.0);
    }
}
