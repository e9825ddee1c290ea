use osmo_core::Recovery;

/// Permeate pH, the feed pH shifted down by a fixed empirical offset.
///
/// CO2 passes the membrane while bicarbonate is rejected, so permeate is
/// always more acidic than feed.
#[must_use]
pub fn permeate_ph(feed_ph: f64, offset: f64) -> f64 {
    (feed_ph - offset).clamp(0.0, 14.0)
}

/// Concentrate pH, the feed pH raised by `log10` of the concentration factor.
#[must_use]
pub fn concentrate_ph(feed_ph: f64, recovery: Recovery) -> f64 {
    (feed_ph + recovery.concentration_factor().log10()).clamp(0.0, 14.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn concentrate_ph_rises_with_recovery() {
        assert_relative_eq!(
            concentrate_ph(7.0, Recovery::from_percent_clamped(90.0)),
            8.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            concentrate_ph(13.5, Recovery::from_percent_clamped(99.0)),
            14.0
        );
    }

    #[test]
    fn permeate_ph_is_clamped() {
        assert_relative_eq!(permeate_ph(7.5, 1.0), 6.5);
        assert_relative_eq!(permeate_ph(0.5, 1.0), 0.0);
    }
}
