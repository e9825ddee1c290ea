//! Solution-diffusion transport relations.
//!
//! Water flux is `J = A_eff·NDP`, where the effective permeability folds in
//! temperature, fouling, and age. Everything here is a plain function of its
//! arguments so stages and the single-pass helpers share one set of physics.

use osmo_core::units::{Flux, FluxUnit, FlowUnit, WaterPermeability};
use serde::{Deserialize, Serialize};
use uom::{
    ConstZero,
    si::{
        f64::{Area, Pressure, ThermodynamicTemperature, VolumeRate},
        pressure::bar,
        thermodynamic_temperature::kelvin,
    },
};

use crate::{PolarizationParameters, PressureDropModel, TemperatureCorrection};

/// Reference temperature of catalog permeabilities, K.
const REFERENCE_TEMPERATURE: f64 = 298.15;

/// Average permeate flux over the active area, or zero without area.
#[must_use]
pub fn average_flux(permeate: VolumeRate, area: Area) -> Flux {
    if area > Area::ZERO {
        permeate / area
    } else {
        Flux::ZERO
    }
}

/// Concentration polarization factor `β`, the ratio of membrane-wall to bulk
/// concentration.
///
/// Always at least one. `recovery` is a fraction.
#[must_use]
pub fn concentration_polarization(
    recovery: f64,
    flux: Flux,
    parameters: &PolarizationParameters,
) -> f64 {
    let flux_lmh = FluxUnit::Lmh.from_flux(flux).max(0.0);
    let reference = parameters.reference_flux_lmh;
    if reference <= 0.0 {
        return 1.0;
    }
    1.0 + parameters.recovery_coefficient * recovery.max(0.0) * reference / (reference + flux_lmh)
}

/// Temperature correction factor for permeability, one at 25 °C.
#[must_use]
pub fn temperature_correction_factor(
    temperature: ThermodynamicTemperature,
    correction: &TemperatureCorrection,
) -> f64 {
    let t = temperature.get::<kelvin>();
    let activation = if t >= REFERENCE_TEMPERATURE {
        correction.above_25c
    } else {
        correction.below_25c
    };
    (activation * (1.0 / REFERENCE_TEMPERATURE - 1.0 / t)).exp()
}

/// Combined effect of operating conditions on membrane performance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Derating {
    /// Temperature correction factor.
    pub tcf: f64,
    /// Fouling factor in `(0, 1]`.
    pub fouling_factor: f64,
    pub flux_decline_per_year: f64,
    pub sp_increase_per_year: f64,
    pub age_years: f64,
}

impl Derating {
    /// Multiplier applied to the catalog permeability.
    #[must_use]
    pub fn permeability_factor(&self) -> f64 {
        self.tcf * self.fouling_factor * (1.0 - self.flux_decline_per_year).powf(self.age_years)
    }

    /// Multiplier applied to every salt passage.
    #[must_use]
    pub fn passage_factor(&self) -> f64 {
        (1.0 + self.sp_increase_per_year).powf(self.age_years)
    }

    /// Effective permeability of a membrane under these conditions.
    #[must_use]
    pub fn effective_permeability(&self, nominal: WaterPermeability) -> WaterPermeability {
        nominal * self.permeability_factor()
    }
}

impl Default for Derating {
    fn default() -> Self {
        Self {
            tcf: 1.0,
            fouling_factor: 1.0,
            flux_decline_per_year: 0.0,
            sp_increase_per_year: 0.0,
            age_years: 0.0,
        }
    }
}

/// Net driving pressure needed to push `flux` through a membrane with
/// effective permeability `permeability`.
///
/// Zero when the permeability is not positive.
#[must_use]
pub fn net_driving_pressure(flux: Flux, permeability: WaterPermeability) -> Pressure {
    if permeability > WaterPermeability::ZERO {
        flux / permeability
    } else {
        Pressure::ZERO
    }
}

/// Feed-side pressure loss across `elements` elements in series.
///
/// `average_flow_per_vessel` is the mean of vessel feed and concentrate
/// flows.
#[must_use]
pub fn pressure_drop(
    model: &PressureDropModel,
    elements: u32,
    average_flow_per_vessel: VolumeRate,
) -> Pressure {
    let n = f64::from(elements);
    let drop = match *model {
        PressureDropModel::Linear { bar_per_element } => bar_per_element * n,
        PressureDropModel::PowerLaw {
            coefficient,
            exponent,
        } => {
            let q = FlowUnit::CubicMeterPerHour
                .from_volume_rate(average_flow_per_vessel)
                .max(0.0);
            coefficient * n * q.powf(exponent)
        }
    };
    Pressure::new::<bar>(drop.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use osmo_core::units::{AreaUnit, PermeabilityUnit};
    use uom::si::thermodynamic_temperature::degree_celsius;

    fn celsius(value: f64) -> ThermodynamicTemperature {
        ThermodynamicTemperature::new::<degree_celsius>(value)
    }

    #[test]
    fn flux_is_permeate_over_area() {
        let permeate = FlowUnit::CubicMeterPerHour.to_volume_rate(20.0);
        let area = AreaUnit::SquareMeter.to_area(1000.0);
        assert_relative_eq!(
            FluxUnit::Lmh.from_flux(average_flux(permeate, area)),
            20.0,
            epsilon = 1e-9
        );
        assert_eq!(average_flux(permeate, Area::ZERO), Flux::ZERO);
    }

    #[test]
    fn polarization_rises_with_recovery_and_eases_with_flux() {
        let params = PolarizationParameters::default();
        let at_20_lmh = FluxUnit::Lmh.to_flux(20.0);

        assert_relative_eq!(
            concentration_polarization(0.5, at_20_lmh, &params),
            1.125,
            epsilon = 1e-12
        );
        assert!(
            concentration_polarization(0.8, at_20_lmh, &params)
                > concentration_polarization(0.5, at_20_lmh, &params)
        );
        assert!(
            concentration_polarization(0.5, FluxUnit::Lmh.to_flux(40.0), &params)
                < concentration_polarization(0.5, at_20_lmh, &params)
        );
        assert_relative_eq!(concentration_polarization(0.0, at_20_lmh, &params), 1.0);
    }

    #[test]
    fn temperature_correction_is_one_at_reference() {
        let correction = TemperatureCorrection::default();
        assert_relative_eq!(
            temperature_correction_factor(celsius(25.0), &correction),
            1.0,
            epsilon = 1e-12
        );

        let warm = temperature_correction_factor(celsius(35.0), &correction);
        let expected = (2640.0 * (1.0 / 298.15 - 1.0 / 308.15_f64)).exp();
        assert_relative_eq!(warm, expected, epsilon = 1e-9);

        let cold = temperature_correction_factor(celsius(10.0), &correction);
        let expected = (3020.0 * (1.0 / 298.15 - 1.0 / 283.15_f64)).exp();
        assert_relative_eq!(cold, expected, epsilon = 1e-9);
        assert!(cold < 1.0 && warm > 1.0);
    }

    #[test]
    fn aged_membranes_lose_permeability_and_pass_more_salt() {
        let derating = Derating {
            fouling_factor: 0.85,
            flux_decline_per_year: 0.07,
            sp_increase_per_year: 0.10,
            age_years: 3.0,
            ..Derating::default()
        };
        assert_relative_eq!(
            derating.permeability_factor(),
            0.85 * 0.93_f64.powi(3),
            epsilon = 1e-12
        );
        assert_relative_eq!(derating.passage_factor(), 1.331, epsilon = 1e-12);
        assert_relative_eq!(Derating::default().permeability_factor(), 1.0);
    }

    #[test]
    fn ndp_is_flux_over_permeability() {
        let a = PermeabilityUnit::LmhPerBar.to_permeability(3.5);
        let ndp = net_driving_pressure(FluxUnit::Lmh.to_flux(7.0), a);
        assert_relative_eq!(ndp.get::<bar>(), 2.0, epsilon = 1e-9);
        assert_eq!(
            net_driving_pressure(FluxUnit::Lmh.to_flux(7.0), WaterPermeability::ZERO),
            Pressure::ZERO
        );
    }

    #[test]
    fn pressure_drop_models() {
        let q = FlowUnit::CubicMeterPerHour.to_volume_rate(10.0);

        let power_law = pressure_drop(&PressureDropModel::default(), 7, q);
        assert_relative_eq!(
            power_law.get::<bar>(),
            0.004 * 7.0 * 10f64.powf(1.7),
            epsilon = 1e-9
        );

        let linear = PressureDropModel::Linear {
            bar_per_element: 0.2,
        };
        assert_relative_eq!(pressure_drop(&linear, 6, q).get::<bar>(), 1.2, epsilon = 1e-12);
        assert_relative_eq!(pressure_drop(&linear, 0, q).get::<bar>(), 0.0);
    }
}
