use std::convert::Infallible;

use osmo_core::{
    Model,
    units::{FlowUnit, Flux},
};
use osmo_water::{IonConcentrations, ScalingIndices, concentrate_ph, osmotic_pressure, permeate_ph};
use uom::{
    ConstZero,
    si::{
        f64::{Area, Pressure},
        pressure::bar,
    },
};

use crate::{
    DesignLimits, DesignWarning, FlowSplit, MembraneCatalog, ModelParameters, Report,
    ReportUnits, StageResult, Stream, SystemConfig, SystemResults, WaterParameters, average_flux,
    concentration_polarization,
    config::NormalizedConfig,
    net_driving_pressure,
    stage::{
        StagePressures, StageState, area_weighted_permeability, blend_permeate,
        propagate_pressures, resolve_stages,
    },
};

/// A reverse-osmosis train calculation engine.
///
/// Holds a membrane catalog, model constants, and design limits, all
/// read-only. Each evaluation is a pure function of the configuration, so one
/// engine can be shared freely between threads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoSystem {
    catalog: MembraneCatalog,
    parameters: ModelParameters,
    limits: DesignLimits,
}

impl RoSystem {
    /// Creates an engine with the given catalog and default constants.
    #[must_use]
    pub fn new(catalog: MembraneCatalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_parameters(mut self, parameters: ModelParameters) -> Self {
        self.parameters = parameters;
        self
    }

    #[must_use]
    pub fn with_limits(mut self, limits: DesignLimits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn catalog(&self) -> &MembraneCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn parameters(&self) -> &ModelParameters {
        &self.parameters
    }

    #[must_use]
    pub fn limits(&self) -> &DesignLimits {
        &self.limits
    }

    /// Evaluates one design.
    ///
    /// Never fails: out-of-range input is coerced and logged, and operating
    /// limit violations are returned as warnings in the report.
    #[must_use]
    pub fn evaluate(&self, config: &SystemConfig) -> Report {
        let params = &self.parameters;
        let normalized = NormalizedConfig::new(config, &self.catalog, params);
        let units = ReportUnits::for_flow_unit(normalized.unit);
        let temperature = normalized.temperature;
        let recovery = normalized.recovery;

        let split = FlowSplit::from_feed(normalized.feed_flow, recovery);
        let stages = resolve_stages(&normalized, &split, params);

        let feed_ions = normalized.feed_ions.clone();
        let permeate_ions = blend_permeate(&stages);
        let concentrate_ions = stages
            .last()
            .map(|s| s.balance.concentrate.clone())
            .unwrap_or_else(|| feed_ions.clone());

        let osmotic = |ions: &IonConcentrations| {
            osmotic_pressure(ions, temperature, params.chemistry.osmotic_coefficient)
        };
        let feed_osmotic = osmotic(&feed_ions);
        let permeate_osmotic = osmotic(&permeate_ions);
        let concentrate_osmotic = osmotic(&concentrate_ions);

        let total_area = normalized.total_area();
        let flux = average_flux(split.permeate, total_area);
        let beta = concentration_polarization(recovery.get(), flux, &params.polarization);
        let permeability = area_weighted_permeability(&stages);
        let ndp = net_driving_pressure(flux, permeability);
        let net_osmotic = (feed_osmotic + concentrate_osmotic) * (beta / 2.0) - permeate_osmotic;
        let total_drop = stages.iter().map(|s| s.pressure_drop).sum::<Pressure>();
        let permeate_pressure = normalized.permeate_pressure;

        let feed_pressure = match normalized.feed_pressure {
            Some(fixed) => fixed + permeate_pressure,
            None => ndp + net_osmotic + permeate_pressure + total_drop / 2.0,
        };
        let stage_pressures = propagate_pressures(&stages, feed_pressure, permeate_pressure);
        let concentrate_pressure = stage_pressures
            .last()
            .map_or(feed_pressure, |p| p.concentrate);

        let highest_flux = stages
            .iter()
            .map(StageState::highest_flux)
            .fold(Flux::ZERO, |a, b| if b > a { b } else { a });

        let mut warnings = Vec::new();
        if total_area <= Area::ZERO {
            warnings.push(DesignWarning::NoActiveMembraneArea);
        }
        for (stream, pressure) in [
            (Stream::Feed, feed_osmotic),
            (Stream::Permeate, permeate_osmotic),
            (Stream::Concentrate, concentrate_osmotic),
        ] {
            let value = units.pressure(pressure);
            if !value.is_finite() || value < 0.0 {
                warnings.push(DesignWarning::InvalidOsmoticPressure {
                    stream,
                    value,
                    unit: units.pressure.label(),
                });
            }
        }
        for (stage, pressures) in stages.iter().zip(&stage_pressures) {
            warnings.extend(self.stage_warnings(stage, pressures, &units));
        }
        for warning in &warnings {
            log::info!("design warning: {warning}");
        }

        let system = SystemResults {
            feed_flow: units.flow(split.feed),
            permeate_flow: units.flow(split.permeate),
            concentrate_flow: units.flow(split.concentrate),
            recovery: recovery.as_percent(),
            total_vessels: normalized.total_vessels(),
            total_elements: normalized.total_elements(),
            active_area: units.area(total_area),
            feed_flow_per_vessel: stages.first().map_or(0.0, |s| units.flow(s.feed_per_vessel())),
            concentrate_flow_per_vessel: stages
                .last()
                .map_or(0.0, |s| units.flow(s.concentrate_per_vessel())),
            average_flux: units.flux(flux),
            highest_flux: units.flux(highest_flux),
            beta,
            temperature_correction_factor: normalized.derating.tcf,
            effective_permeability: units.permeability(permeability),
            net_driving_pressure: units.pressure(ndp),
            net_osmotic_pressure: units.pressure(net_osmotic),
            feed_pressure: units.pressure(feed_pressure),
            concentrate_pressure: units.pressure(concentrate_pressure),
            permeate_pressure: units.pressure(permeate_pressure),
            pressure_drop: units.pressure(total_drop),
            specific_energy: self.specific_energy(feed_pressure, recovery.get()),
        };

        let chemistry = &params.chemistry;
        let permeate_ph = permeate_ph(normalized.feed_ph, chemistry.permeate_ph_offset);
        let concentrate_ph = concentrate_ph(normalized.feed_ph, recovery);
        let parameters = |ions: &IonConcentrations, ph: f64| {
            WaterParameters::evaluate(
                ions,
                ph,
                temperature,
                chemistry.osmotic_coefficient,
                units.pressure,
            )
        };

        Report {
            units,
            system,
            concentrate_saturation: ScalingIndices::evaluate(
                &concentrate_ions,
                concentrate_ph,
                temperature,
                chemistry,
            ),
            feed_parameters: parameters(&feed_ions, normalized.feed_ph),
            permeate_parameters: parameters(&permeate_ions, permeate_ph),
            concentrate_parameters: parameters(&concentrate_ions, concentrate_ph),
            stages: stages
                .iter()
                .zip(&stage_pressures)
                .map(|(stage, pressures)| stage_result(stage, pressures, &units))
                .collect(),
            feed_ions,
            permeate_ions,
            concentrate_ions,
            design_warnings: warnings,
        }
    }

    fn stage_warnings(
        &self,
        stage: &StageState<'_>,
        pressures: &StagePressures,
        units: &ReportUnits,
    ) -> Vec<DesignWarning> {
        let mut warnings = Vec::new();

        let flux = units.flux(stage.highest_flux());
        let flux_limit = self.limits.max_flux(units.flux);
        if flux > flux_limit {
            warnings.push(DesignWarning::FluxAboveLimit {
                stage: stage.number,
                flux,
                limit: flux_limit,
                unit: units.flux.label(),
            });
        }

        let flow = units.flow(stage.feed_per_vessel());
        let flow_limit = flow_limit(&self.limits, units);
        if flow > flow_limit {
            warnings.push(DesignWarning::FeedFlowPerVesselAboveLimit {
                stage: stage.number,
                flow,
                limit: flow_limit,
                unit: units.flow.label(),
            });
        }

        if pressures.unclamped_concentrate < Pressure::ZERO {
            warnings.push(DesignWarning::NegativeConcentratePressure {
                stage: stage.number,
                pressure: units.pressure(pressures.unclamped_concentrate),
                unit: units.pressure.label(),
            });
        }

        warnings
    }

    /// Pumping energy per m³ of permeate, `P / (36·η·r)` with `P` in bar.
    fn specific_energy(&self, feed_pressure: Pressure, recovery: f64) -> f64 {
        let efficiency = self.parameters.pump_efficiency;
        if efficiency > 0.0 && recovery > 0.0 {
            feed_pressure.get::<bar>() / (36.0 * efficiency * recovery)
        } else {
            0.0
        }
    }
}

fn flow_limit(limits: &DesignLimits, units: &ReportUnits) -> f64 {
    units.flow(FlowUnit::CubicMeterPerHour.to_volume_rate(limits.max_feed_flow_per_vessel_m3h))
}

fn stage_result(stage: &StageState<'_>, pressures: &StagePressures, units: &ReportUnits) -> StageResult {
    StageResult {
        stage: stage.number,
        membrane: stage.layout.membrane.id.clone(),
        vessels: stage.layout.vessels,
        elements_per_vessel: stage.layout.elements_per_vessel,
        active_area: units.area(stage.area),
        feed_flow: units.flow(stage.flows.feed),
        permeate_flow: units.flow(stage.flows.permeate),
        concentrate_flow: units.flow(stage.flows.concentrate),
        recovery: stage.flows.recovery_fraction() * 100.0,
        feed_flow_per_vessel: units.flow(stage.feed_per_vessel()),
        concentrate_flow_per_vessel: units.flow(stage.concentrate_per_vessel()),
        average_flux: units.flux(stage.average_flux),
        highest_flux: units.flux(stage.highest_flux()),
        beta: stage.beta,
        feed_pressure: units.pressure(pressures.feed),
        concentrate_pressure: units.pressure(pressures.concentrate),
        pressure_drop: units.pressure(stage.pressure_drop),
        net_driving_pressure: units.pressure(pressures.net_driving),
        net_osmotic_pressure: units.pressure(stage.net_osmotic_pressure),
        feed_tds: stage.feed_ions.tds(),
        permeate_tds: stage.balance.permeate.tds(),
        concentrate_tds: stage.balance.concentrate.tds(),
    }
}

impl Model for RoSystem {
    type Input = SystemConfig;
    type Output = Report;
    type Error = Infallible;

    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        Ok(self.evaluate(input))
    }
}

/// Evaluates a design with the standard catalog and default constants.
#[must_use]
pub fn calculate_system(config: &SystemConfig) -> Report {
    RoSystem::default().evaluate(config)
}
