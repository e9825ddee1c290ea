use osmo_core::{Recovery, units::FlowUnit};
use osmo_water::IonConcentrations;
use uom::{
    ConstZero,
    si::{
        f64::{Area, Pressure, ThermodynamicTemperature, VolumeRate},
        thermodynamic_temperature::{degree_celsius, kelvin},
    },
};

use crate::{
    Derating, MembraneCatalog, MembraneSpec, ModelParameters, SystemConfig,
    temperature_correction_factor,
};

/// A [`SystemConfig`] with every value in internal units and in range.
///
/// Built once per evaluation; every coercion is logged.
#[derive(Debug, Clone)]
pub(crate) struct NormalizedConfig<'a> {
    pub unit: FlowUnit,
    pub feed_flow: VolumeRate,
    pub recovery: Recovery,
    /// Feed analysis with carbonate species completed from pH.
    pub feed_ions: IonConcentrations,
    pub feed_ph: f64,
    pub temperature: ThermodynamicTemperature,
    pub stages: Vec<NormalizedStage<'a>>,
    pub feed_pressure: Option<Pressure>,
    pub permeate_pressure: Pressure,
    pub derating: Derating,
}

/// One stage with its membrane resolved from the catalog.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NormalizedStage<'a> {
    pub vessels: u32,
    pub elements_per_vessel: u32,
    pub membrane: &'a MembraneSpec,
}

impl NormalizedStage<'_> {
    pub fn elements(&self) -> u32 {
        self.vessels.saturating_mul(self.elements_per_vessel)
    }

    pub fn area(&self) -> Area {
        self.membrane.active_area() * f64::from(self.elements())
    }
}

impl<'a> NormalizedConfig<'a> {
    /// Normalizes `config`, resolving membranes from its own catalog if it
    /// has one and from `catalog` otherwise.
    pub fn new(
        config: &'a SystemConfig,
        catalog: &'a MembraneCatalog,
        parameters: &ModelParameters,
    ) -> Self {
        let catalog = config.membrane_catalog.as_ref().unwrap_or(catalog);
        let unit = config.flow_unit;
        let pressure_unit = unit.pressure_unit();

        let feed_ph = if config.feed_ph.is_finite() {
            clamp_logged("feed pH", config.feed_ph, 0.0, 14.0)
        } else {
            log::warn!("feed pH {} is not a number, using 7.0", config.feed_ph);
            7.0
        };

        let temperature = config.temperature_unit.to_temperature(config.temperature);
        let kelvins = temperature.get::<kelvin>();
        let temperature = if kelvins.is_finite() && kelvins > 0.0 {
            temperature
        } else {
            log::warn!("temperature {} is not physical, using 25 °C", config.temperature);
            ThermodynamicTemperature::new::<degree_celsius>(25.0)
        };

        let stages = config
            .stage_layout()
            .into_iter()
            .map(|stage| NormalizedStage {
                vessels: stage.vessels,
                elements_per_vessel: stage.elements_per_vessel,
                membrane: catalog.resolve(stage.membrane_model.as_deref()),
            })
            .collect();

        let feed_pressure = config.feed_pressure.and_then(|p| {
            if p.is_finite() && p >= 0.0 {
                Some(pressure_unit.to_pressure(p))
            } else {
                log::warn!("feed pressure {p} is not valid, calculating it instead");
                None
            }
        });

        let permeate_pressure = match config.permeate_pressure {
            Some(p) if p.is_finite() && p >= 0.0 => pressure_unit.to_pressure(p),
            Some(p) => {
                log::warn!("permeate pressure {p} is not valid, using 0");
                Pressure::ZERO
            }
            None => Pressure::ZERO,
        };

        let derating = Derating {
            tcf: temperature_correction_factor(temperature, &parameters.temperature_correction),
            fouling_factor: match config.fouling_factor {
                Some(ff) if ff > 0.0 && ff <= 1.0 => ff,
                Some(ff) => {
                    log::warn!("fouling factor {ff} is outside (0, 1], using 1");
                    1.0
                }
                None => 1.0,
            },
            flux_decline_per_year: bounded_or(
                "flux decline per year",
                config.flux_decline_per_year,
                parameters.flux_decline_per_year,
                0.0,
                0.5,
            ),
            sp_increase_per_year: bounded_or(
                "salt passage increase per year",
                config.sp_increase_per_year,
                parameters.sp_increase_per_year,
                0.0,
                1.0,
            ),
            age_years: bounded_or("membrane age", config.membrane_age_years, 0.0, 0.0, 50.0),
        };

        Self {
            unit,
            feed_flow: normalize_feed_flow(config),
            recovery: Recovery::from_percent_clamped(config.recovery),
            feed_ions: config.feed_ions.speciated(feed_ph, &parameters.chemistry),
            feed_ph,
            temperature,
            stages,
            feed_pressure,
            permeate_pressure,
            derating,
        }
    }

    pub fn total_area(&self) -> Area {
        self.stages.iter().map(NormalizedStage::area).sum()
    }

    pub fn total_vessels(&self) -> u32 {
        self.stages
            .iter()
            .fold(0, |total, s| total.saturating_add(s.vessels))
    }

    pub fn total_elements(&self) -> u32 {
        self.stages
            .iter()
            .fold(0, |total, s| total.saturating_add(s.elements()))
    }
}

/// Feed flow as a quantity, with negative or non-finite input as zero.
pub(crate) fn normalize_feed_flow(config: &SystemConfig) -> VolumeRate {
    if config.feed_flow.is_finite() && config.feed_flow >= 0.0 {
        config.flow_unit.to_volume_rate(config.feed_flow)
    } else {
        log::warn!("feed flow {} is not a valid flow, using 0", config.feed_flow);
        VolumeRate::ZERO
    }
}

fn clamp_logged(name: &str, value: f64, min: f64, max: f64) -> f64 {
    let clamped = value.clamp(min, max);
    if clamped != value {
        log::warn!("{name} {value} is outside [{min}, {max}], using {clamped}");
    }
    clamped
}

fn bounded_or(name: &str, value: Option<f64>, default: f64, min: f64, max: f64) -> f64 {
    match value {
        None => default,
        Some(v) if v.is_nan() => {
            log::warn!("{name} is not a number, using {default}");
            default
        }
        Some(v) => clamp_logged(name, v, min, max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use osmo_core::units::{PressureUnit, TemperatureScale};
    use osmo_water::Ion;

    use crate::StageConfig;

    #[test]
    fn defaults_normalize_cleanly() {
        let config = SystemConfig::default();
        let catalog = MembraneCatalog::standard();
        let normalized = NormalizedConfig::new(&config, &catalog, &ModelParameters::default());

        assert_eq!(normalized.stages.len(), 1);
        assert_eq!(normalized.stages[0].membrane.id, "BW-400");
        assert_relative_eq!(normalized.recovery.as_percent(), 75.0);
        assert_relative_eq!(normalized.derating.permeability_factor(), 1.0, epsilon = 1e-12);
        assert_eq!(normalized.feed_pressure, None);
        assert_eq!(normalized.permeate_pressure, Pressure::ZERO);
    }

    #[test]
    fn invalid_values_are_coerced() {
        let config = SystemConfig {
            feed_flow: -10.0,
            recovery: f64::NAN,
            feed_ph: 15.0,
            feed_pressure: Some(-3.0),
            fouling_factor: Some(0.0),
            flux_decline_per_year: Some(0.9),
            sp_increase_per_year: Some(-0.1),
            membrane_age_years: Some(-2.0),
            ..SystemConfig::default()
        };
        let catalog = MembraneCatalog::standard();
        let normalized = NormalizedConfig::new(&config, &catalog, &ModelParameters::default());

        assert_eq!(normalized.feed_flow, VolumeRate::ZERO);
        assert_relative_eq!(normalized.recovery.as_percent(), 50.0);
        assert_relative_eq!(normalized.feed_ph, 14.0);
        assert_eq!(normalized.feed_pressure, None);
        assert_relative_eq!(normalized.derating.fouling_factor, 1.0);
        assert_relative_eq!(normalized.derating.flux_decline_per_year, 0.5);
        assert_relative_eq!(normalized.derating.sp_increase_per_year, 0.0);
        assert_relative_eq!(normalized.derating.age_years, 0.0);
    }

    #[test]
    fn pressures_use_the_display_unit() {
        let config = SystemConfig {
            flow_unit: FlowUnit::Gpm,
            feed_pressure: Some(150.0),
            permeate_pressure: Some(10.0),
            ..SystemConfig::default()
        };
        let catalog = MembraneCatalog::standard();
        let normalized = NormalizedConfig::new(&config, &catalog, &ModelParameters::default());

        let psi = |p: Option<Pressure>| PressureUnit::Psi.from_pressure(p.unwrap_or(Pressure::ZERO));
        assert_relative_eq!(psi(normalized.feed_pressure), 150.0, epsilon = 1e-9);
        assert_relative_eq!(psi(Some(normalized.permeate_pressure)), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn fahrenheit_and_speciation() {
        let config = SystemConfig {
            temperature: 77.0,
            temperature_unit: TemperatureScale::Fahrenheit,
            feed_ions: IonConcentrations::new().with(Ion::Hco3, 150.0),
            ..SystemConfig::default()
        };
        let catalog = MembraneCatalog::standard();
        let normalized = NormalizedConfig::new(&config, &catalog, &ModelParameters::default());

        assert_relative_eq!(normalized.temperature.get::<degree_celsius>(), 25.0, epsilon = 1e-9);
        assert!(normalized.feed_ions.get(Ion::Co2) > 0.0);
    }

    #[test]
    fn caller_catalog_wins_and_unknown_models_fall_back() -> Result<(), crate::CatalogError> {
        let own = MembraneCatalog::new(
            vec![MembraneSpec::new("CUSTOM-1", 365.0, 4.0, 99.6)],
            None,
        )?;
        let config = SystemConfig {
            membrane_catalog: Some(own),
            stages: vec![
                StageConfig {
                    membrane_model: Some("BW-400".to_string()),
                    ..StageConfig::default()
                },
                StageConfig::default(),
            ],
            ..SystemConfig::default()
        };
        let catalog = MembraneCatalog::standard();
        let normalized = NormalizedConfig::new(&config, &catalog, &ModelParameters::default());

        assert!(normalized.stages.iter().all(|s| s.membrane.id == "CUSTOM-1"));
        assert_eq!(normalized.total_elements(), 14);
        assert_eq!(normalized.total_vessels(), 2);
        Ok(())
    }
}
