//! Scaling indices for sparingly soluble salts.
//!
//! Ratios here use molar concentrations without activity corrections, so a
//! ratio of one is a screening threshold rather than a strict saturation
//! point.

use serde::{Deserialize, Serialize};
use uom::si::{
    f64::ThermodynamicTemperature,
    thermodynamic_temperature::{degree_celsius, kelvin},
};

use crate::{ChemistryParameters, Ion, IonConcentrations};

/// pH at which the water is saturated with calcium carbonate.
///
/// Uses the Langelier correlation `pHs = (9.3 + A + B) − (C + D)` with
///
/// - `A = (log10 TDS − 1) / 10`
/// - `B = −13.12·log10(T) + 34.55`, `T` in kelvin
/// - `C = log10(Ca as CaCO3) − 0.4`
/// - `D = log10(alkalinity as CaCO3)`
///
/// Returns `None` when the water has no calcium or no alkalinity, since the
/// index is undefined there.
#[must_use]
pub fn saturation_ph(water: &IonConcentrations, temperature: ThermodynamicTemperature) -> Option<f64> {
    let calcium = water.calcium_as_caco3();
    let alkalinity = water.alkalinity_as_caco3();
    if calcium <= 0.0 || alkalinity <= 0.0 {
        return None;
    }

    let a = (water.tds().max(1.0).log10() - 1.0) / 10.0;
    let b = -13.12 * temperature.get::<kelvin>().log10() + 34.55;
    let c = calcium.log10() - 0.4;
    let d = alkalinity.log10();

    Some((9.3 + a + b) - (c + d))
}

/// Langelier Saturation Index, `pH − pHs`.
///
/// Positive values indicate a tendency to deposit calcium carbonate.
#[must_use]
pub fn langelier_index(
    water: &IonConcentrations,
    ph: f64,
    temperature: ThermodynamicTemperature,
) -> Option<f64> {
    saturation_ph(water, temperature).map(|phs| ph - phs)
}

/// Calcium carbonate precipitation potential in mg/L as CaCO3.
///
/// Linear in a positive LSI and zero otherwise.
#[must_use]
pub fn calcium_carbonate_precipitation_potential(lsi: Option<f64>, per_lsi: f64) -> f64 {
    match lsi {
        Some(lsi) if lsi > 0.0 => per_lsi * lsi,
        _ => 0.0,
    }
}

/// Supersaturation ratios of sparingly soluble salts.
///
/// Each ratio is the ion product over its solubility product; values above
/// one indicate scaling potential.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SaturationRatios {
    pub caso4: f64,
    pub baso4: f64,
    pub srso4: f64,
    pub sio2: f64,
    pub ca3po42: f64,
    pub caf2: f64,
}

impl SaturationRatios {
    /// Evaluates every ratio for the given water.
    #[must_use]
    pub fn evaluate(
        water: &IonConcentrations,
        temperature: ThermodynamicTemperature,
        parameters: &ChemistryParameters,
    ) -> Self {
        let molar = |ion: Ion| ion.molarity(water.get(ion));
        let (ca, ba, sr) = (molar(Ion::Ca), molar(Ion::Ba), molar(Ion::Sr));
        let (so4, po4, f) = (molar(Ion::So4), molar(Ion::Po4), molar(Ion::F));

        let silica_solubility = (parameters.silica_solubility_25c
            + parameters.silica_solubility_slope * (temperature.get::<degree_celsius>() - 25.0))
            .max(1.0);

        Self {
            caso4: ca * so4 / parameters.ksp_caso4,
            baso4: ba * so4 / parameters.ksp_baso4,
            srso4: sr * so4 / parameters.ksp_srso4,
            sio2: water.get(Ion::Sio2) / silica_solubility,
            ca3po42: ca.powi(3) * po4.powi(2) / parameters.ksp_ca3po42,
            caf2: ca * f.powi(2) / parameters.ksp_caf2,
        }
    }
}

/// Complete set of scaling indicators for one water.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalingIndices {
    /// Saturation pH; `None` without calcium or alkalinity.
    pub saturation_ph: Option<f64>,
    /// Langelier Saturation Index; `None` without calcium or alkalinity.
    pub lsi: Option<f64>,
    /// Calcium carbonate precipitation potential, mg/L as CaCO3.
    pub ccpp: f64,
    /// Supersaturation ratios of sulfate, silica, phosphate, and fluoride scales.
    pub ratios: SaturationRatios,
}

impl ScalingIndices {
    /// Evaluates every index for water at the given pH and temperature.
    #[must_use]
    pub fn evaluate(
        water: &IonConcentrations,
        ph: f64,
        temperature: ThermodynamicTemperature,
        parameters: &ChemistryParameters,
    ) -> Self {
        let saturation_ph = saturation_ph(water, temperature);
        let lsi = saturation_ph.map(|phs| ph - phs);

        Self {
            saturation_ph,
            lsi,
            ccpp: calcium_carbonate_precipitation_potential(lsi, parameters.ccpp_per_lsi),
            ratios: SaturationRatios::evaluate(water, temperature, parameters),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn at_25c() -> ThermodynamicTemperature {
        ThermodynamicTemperature::new::<degree_celsius>(25.0)
    }

    #[test]
    fn saturation_ph_matches_hand_calculation() {
        // Ca 100 mg/L as CaCO3, alkalinity 100 mg/L as CaCO3, TDS 500 mg/L.
        let water = IonConcentrations::new()
            .with(Ion::Ca, 100.0 / 2.4971)
            .with(Ion::Hco3, 100.0 / 0.8201)
            .with(Ion::Na, 500.0 - 100.0 / 2.4971 - 100.0 / 0.8201);

        let a = (500f64.log10() - 1.0) / 10.0;
        let b = -13.12 * 298.15f64.log10() + 34.55;
        let expected = 9.3 + a + b - (2.0 - 0.4 + 2.0);

        assert_relative_eq!(
            saturation_ph(&water, at_25c()).unwrap(),
            expected,
            epsilon = 1e-3
        );
    }

    #[test]
    fn lsi_needs_calcium_and_alkalinity() {
        let no_alkalinity = IonConcentrations::new().with(Ion::Ca, 100.0);
        assert!(langelier_index(&no_alkalinity, 8.0, at_25c()).is_none());

        let no_calcium = IonConcentrations::new().with(Ion::Hco3, 100.0);
        assert!(langelier_index(&no_calcium, 8.0, at_25c()).is_none());
    }

    #[test]
    fn lsi_rises_with_ph() {
        let water = IonConcentrations::new().with(Ion::Ca, 120.0).with(Ion::Hco3, 150.0);
        let low = langelier_index(&water, 7.0, at_25c()).unwrap();
        let high = langelier_index(&water, 8.0, at_25c()).unwrap();
        assert_relative_eq!(high - low, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn ccpp_is_zero_unless_scaling() {
        assert_relative_eq!(calcium_carbonate_precipitation_potential(Some(-0.4), 50.0), 0.0);
        assert_relative_eq!(calcium_carbonate_precipitation_potential(None, 50.0), 0.0);
        assert_relative_eq!(calcium_carbonate_precipitation_potential(Some(0.5), 50.0), 25.0);
    }

    #[test]
    fn gypsum_ratio_is_ion_product_over_ksp() {
        let params = ChemistryParameters::default();
        let water = IonConcentrations::new().with(Ion::Ca, 400.0).with(Ion::So4, 1500.0);
        let ratios = SaturationRatios::evaluate(&water, at_25c(), &params);

        let expected = (0.4 / 40.078) * (1.5 / 96.06) / params.ksp_caso4;
        assert_relative_eq!(ratios.caso4, expected, max_relative = 1e-12);
        assert_relative_eq!(ratios.baso4, 0.0);
    }

    #[test]
    fn silica_solubility_rises_with_temperature() {
        let params = ChemistryParameters::default();
        let water = IonConcentrations::new().with(Ion::Sio2, 60.0);
        let cold = SaturationRatios::evaluate(
            &water,
            ThermodynamicTemperature::new::<degree_celsius>(10.0),
            &params,
        );
        let warm = SaturationRatios::evaluate(&water, at_25c(), &params);

        assert_relative_eq!(warm.sio2, 0.5);
        assert!(cold.sio2 > warm.sio2);
    }
}
