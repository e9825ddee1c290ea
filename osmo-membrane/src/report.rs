//! Report values in display units.
//!
//! All numbers here are plain `f64` in the units listed in [`ReportUnits`],
//! which follow the configured flow unit.

use osmo_core::units::{
    AreaUnit, Flux, FluxUnit, FlowUnit, PermeabilityUnit, PressureUnit, UnitSystem,
    WaterPermeability,
};
use osmo_water::{IonConcentrations, ScalingIndices, osmotic_pressure};
use serde::{Serialize, Serializer, ser::SerializeStruct};
use uom::si::f64::{Area, Pressure, ThermodynamicTemperature, VolumeRate};

use crate::DesignWarning;

/// Complete result of evaluating one design.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub units: ReportUnits,
    pub system: SystemResults,
    /// Feed analysis after carbonate speciation, mg/L.
    pub feed_ions: IonConcentrations,
    /// Blended permeate of all stages, mg/L.
    pub permeate_ions: IonConcentrations,
    /// Concentrate leaving the last stage, mg/L.
    pub concentrate_ions: IonConcentrations,
    pub concentrate_saturation: ScalingIndices,
    pub feed_parameters: WaterParameters,
    pub permeate_parameters: WaterParameters,
    pub concentrate_parameters: WaterParameters,
    pub stages: Vec<StageResult>,
    pub design_warnings: Vec<DesignWarning>,
}

impl Report {
    /// Whether any operating limit is violated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.design_warnings.is_empty()
    }
}

/// Display units of a report, chosen from the configured flow unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportUnits {
    pub flow: FlowUnit,
    pub flux: FluxUnit,
    pub pressure: PressureUnit,
    pub area: AreaUnit,
    pub permeability: PermeabilityUnit,
}

impl ReportUnits {
    #[must_use]
    pub fn for_flow_unit(flow: FlowUnit) -> Self {
        Self {
            flow,
            flux: flow.flux_unit(),
            pressure: flow.pressure_unit(),
            area: flow.area_unit(),
            permeability: match flow.system() {
                UnitSystem::Us => PermeabilityUnit::GfdPerPsi,
                UnitSystem::Metric => PermeabilityUnit::LmhPerBar,
            },
        }
    }

    #[must_use]
    pub fn flow(&self, flow: VolumeRate) -> f64 {
        self.flow.from_volume_rate(flow)
    }

    #[must_use]
    pub fn flux(&self, flux: Flux) -> f64 {
        self.flux.from_flux(flux)
    }

    #[must_use]
    pub fn pressure(&self, pressure: Pressure) -> f64 {
        self.pressure.from_pressure(pressure)
    }

    #[must_use]
    pub fn area(&self, area: Area) -> f64 {
        self.area.from_area(area)
    }

    #[must_use]
    pub fn permeability(&self, permeability: WaterPermeability) -> f64 {
        self.permeability.from_permeability(permeability)
    }
}

impl Serialize for ReportUnits {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let permeability = match self.permeability {
            PermeabilityUnit::LmhPerBar => "lmh/bar",
            PermeabilityUnit::GfdPerPsi => "gfd/psi",
        };

        let mut state = serializer.serialize_struct("ReportUnits", 5)?;
        state.serialize_field("flow", self.flow.label())?;
        state.serialize_field("flux", self.flux.label())?;
        state.serialize_field("pressure", self.pressure.label())?;
        state.serialize_field("area", self.area.label())?;
        state.serialize_field("permeability", permeability)?;
        state.end()
    }
}

/// Train-level results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemResults {
    pub feed_flow: f64,
    pub permeate_flow: f64,
    pub concentrate_flow: f64,
    /// Recovery actually used, after clamping, %.
    pub recovery: f64,
    pub total_vessels: u32,
    pub total_elements: u32,
    pub active_area: f64,
    /// Feed flow per vessel of the first stage.
    pub feed_flow_per_vessel: f64,
    /// Concentrate flow per vessel of the last stage.
    pub concentrate_flow_per_vessel: f64,
    pub average_flux: f64,
    /// Largest highest-flux of any stage; checked against the flux limit.
    pub highest_flux: f64,
    /// Concentration polarization factor at system recovery and flux.
    pub beta: f64,
    pub temperature_correction_factor: f64,
    /// Area-weighted permeability after derating.
    pub effective_permeability: f64,
    pub net_driving_pressure: f64,
    pub net_osmotic_pressure: f64,
    pub feed_pressure: f64,
    pub concentrate_pressure: f64,
    pub permeate_pressure: f64,
    /// Sum of stage pressure drops.
    pub pressure_drop: f64,
    /// Pumping energy per unit of permeate, kWh/m³.
    pub specific_energy: f64,
}

/// Results for one stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageResult {
    /// Position in the train, from one.
    pub stage: usize,
    pub membrane: String,
    pub vessels: u32,
    pub elements_per_vessel: u32,
    pub active_area: f64,
    pub feed_flow: f64,
    pub permeate_flow: f64,
    pub concentrate_flow: f64,
    /// Stage recovery, %.
    pub recovery: f64,
    pub feed_flow_per_vessel: f64,
    pub concentrate_flow_per_vessel: f64,
    pub average_flux: f64,
    pub highest_flux: f64,
    pub beta: f64,
    pub feed_pressure: f64,
    pub concentrate_pressure: f64,
    pub pressure_drop: f64,
    pub net_driving_pressure: f64,
    pub net_osmotic_pressure: f64,
    pub feed_tds: f64,
    pub permeate_tds: f64,
    pub concentrate_tds: f64,
}

/// Bulk properties of one stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WaterParameters {
    /// mg/L, dissolved gases excluded.
    pub tds: f64,
    pub ph: f64,
    /// mol/L.
    pub ionic_strength: f64,
    /// In the display pressure unit.
    pub osmotic_pressure: f64,
}

impl WaterParameters {
    /// Evaluates a stream at the given pH and temperature.
    #[must_use]
    pub fn evaluate(
        water: &IonConcentrations,
        ph: f64,
        temperature: ThermodynamicTemperature,
        osmotic_coefficient: f64,
        unit: PressureUnit,
    ) -> Self {
        Self {
            tds: water.tds(),
            ph,
            ionic_strength: water.ionic_strength(),
            osmotic_pressure: unit.from_pressure(osmotic_pressure(
                water,
                temperature,
                osmotic_coefficient,
            )),
        }
    }
}
