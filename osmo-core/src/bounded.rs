use std::{marker::PhantomData, ops::Mul};

use thiserror::Error;

/// A closed band `[MIN, MAX]` that a [`Bounded`] fraction must lie in.
///
/// Implement this for zero-sized marker types to define new bands.
pub trait Bounds {
    /// Smallest allowed fraction.
    const MIN: f64;
    /// Largest allowed fraction.
    const MAX: f64;
    /// Fraction substituted for NaN when clamping.
    const FALLBACK: f64;
    /// Name used in log messages.
    const NAME: &'static str;
}

/// Marker for the recovery band, `[1 %, 99 %]`.
///
/// Recovery of zero would need an infinite feed for a given permeate, and
/// recovery of one leaves no concentrate to carry the rejected salt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RecoveryBand;

impl Bounds for RecoveryBand {
    const MIN: f64 = 0.01;
    const MAX: f64 = 0.99;
    const FALLBACK: f64 = 0.5;
    const NAME: &'static str = "recovery";
}

/// Marker for the membrane salt rejection band, `[60 %, 99.9 %]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RejectionBand;

impl Bounds for RejectionBand {
    const MIN: f64 = 0.60;
    const MAX: f64 = 0.999;
    const FALLBACK: f64 = 0.99;
    const NAME: &'static str = "rejection";
}

/// Fraction of feed flow converted to permeate.
pub type Recovery = Bounded<RecoveryBand>;

/// Fraction of a dissolved species held back by the membrane.
pub type Rejection = Bounded<RejectionBand>;

/// A fraction guaranteed to lie inside the band defined by `B`.
///
/// There are two ways in:
///
/// - [`Bounded::new`] is strict and fails on out-of-band input.
/// - [`Bounded::clamped`] is lenient and pulls the value into the band,
///   which is what configuration normalization uses.
///
/// # Examples
///
/// ```
/// use osmo_core::Recovery;
///
/// let r = Recovery::from_percent_clamped(150.0);
/// assert_eq!(r.as_percent(), 99.0);
///
/// assert!(Recovery::new(0.0).is_err());
/// assert_eq!(Recovery::new(0.75).unwrap() * 200.0, 150.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Bounded<B: Bounds> {
    fraction: f64,
    _marker: PhantomData<B>,
}

impl<B: Bounds> Bounded<B> {
    /// Creates a bounded fraction if `fraction` lies in `[B::MIN, B::MAX]`.
    ///
    /// # Errors
    ///
    /// Returns [`BoundsError::NotFinite`] for NaN or infinite input and
    /// [`BoundsError::OutOfBand`] for finite input outside the band.
    pub fn new(fraction: f64) -> Result<Self, BoundsError> {
        if !fraction.is_finite() {
            return Err(BoundsError::NotFinite(fraction));
        }
        if !(B::MIN..=B::MAX).contains(&fraction) {
            return Err(BoundsError::OutOfBand {
                value: fraction,
                min: B::MIN,
                max: B::MAX,
            });
        }
        Ok(Self::unchecked(fraction))
    }

    /// Creates a bounded fraction, pulling out-of-band input to the nearest edge.
    ///
    /// NaN is replaced with `B::FALLBACK`. Any adjustment is logged.
    #[must_use]
    pub fn clamped(fraction: f64) -> Self {
        if fraction.is_nan() {
            log::warn!(
                "{} is not a number, using {:.1} %",
                B::NAME,
                B::FALLBACK * 100.0
            );
            return Self::unchecked(B::FALLBACK);
        }
        let inside = fraction.clamp(B::MIN, B::MAX);
        if inside != fraction {
            log::warn!(
                "{} of {:.2} % is outside [{:.1}, {:.1}] %, clamped to {:.2} %",
                B::NAME,
                fraction * 100.0,
                B::MIN * 100.0,
                B::MAX * 100.0,
                inside * 100.0
            );
        }
        Self::unchecked(inside)
    }

    /// Creates a bounded fraction from a percentage, clamping as [`Bounded::clamped`] does.
    #[must_use]
    pub fn from_percent_clamped(percent: f64) -> Self {
        Self::clamped(percent / 100.0)
    }

    /// Returns the fraction.
    #[must_use]
    pub fn get(self) -> f64 {
        self.fraction
    }

    /// Returns the fraction as a percentage.
    #[must_use]
    pub fn as_percent(self) -> f64 {
        self.fraction * 100.0
    }

    /// Returns `1 - fraction`.
    ///
    /// For a [`Rejection`] this is the salt passage; for a [`Recovery`] it is
    /// the share of feed leaving as concentrate.
    #[must_use]
    pub fn complement(self) -> f64 {
        1.0 - self.fraction
    }

    fn unchecked(fraction: f64) -> Self {
        Self {
            fraction,
            _marker: PhantomData,
        }
    }
}

impl Recovery {
    /// Concentration factor `1 / (1 - r)` under ideal mass balance.
    ///
    /// Finite for every recovery in the band.
    #[must_use]
    pub fn concentration_factor(self) -> f64 {
        1.0 / self.complement()
    }
}

impl<B: Bounds> Mul<f64> for Bounded<B> {
    type Output = f64;
    fn mul(self, rhs: f64) -> Self::Output {
        self.fraction * rhs
    }
}

impl<B: Bounds> From<Bounded<B>> for f64 {
    fn from(bounded: Bounded<B>) -> Self {
        bounded.fraction
    }
}

/// Errors that can occur when strictly constructing a [`Bounded`] fraction.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum BoundsError {
    /// Input was not finite.
    #[error("value is not finite: {0}")]
    NotFinite(f64),

    /// Input was outside the allowed band.
    #[error("value {value} is outside the band [{min}, {max}]")]
    OutOfBand { value: f64, min: f64, max: f64 },
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn strict_construction() {
        assert_eq!(Recovery::new(0.5).unwrap().get(), 0.5);
        assert_eq!(Rejection::new(0.999).unwrap().get(), 0.999);
        assert!(matches!(
            Recovery::new(1.0),
            Err(BoundsError::OutOfBand { .. })
        ));
        assert!(matches!(
            Rejection::new(0.5),
            Err(BoundsError::OutOfBand { .. })
        ));
        assert!(matches!(
            Recovery::new(f64::NAN),
            Err(BoundsError::NotFinite(_))
        ));
    }

    #[test]
    fn clamping_pulls_to_band_edges() {
        assert_eq!(Recovery::from_percent_clamped(0.0).as_percent(), 1.0);
        assert_eq!(Recovery::from_percent_clamped(100.0).as_percent(), 99.0);
        assert_relative_eq!(Rejection::from_percent_clamped(99.95).get(), 0.999);
        assert_relative_eq!(Rejection::from_percent_clamped(10.0).get(), 0.60);
        assert_eq!(Recovery::clamped(f64::NAN).get(), RecoveryBand::FALLBACK);
        assert_eq!(Recovery::clamped(f64::INFINITY).get(), RecoveryBand::MAX);
    }

    #[test]
    fn complement_and_concentration_factor() {
        let r = Recovery::from_percent_clamped(75.0);
        assert_relative_eq!(r.complement(), 0.25);
        assert_relative_eq!(r.concentration_factor(), 4.0);

        let rej = Rejection::from_percent_clamped(99.5);
        assert_relative_eq!(rej.complement(), 0.005, epsilon = 1e-12);
    }

    #[test]
    fn extreme_recovery_keeps_concentration_factor_finite() {
        let r = Recovery::from_percent_clamped(1000.0);
        assert!(r.concentration_factor().is_finite());
        assert_relative_eq!(r.concentration_factor(), 100.0, max_relative = 1e-12);
    }
}
