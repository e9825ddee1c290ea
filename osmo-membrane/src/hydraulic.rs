use osmo_core::{
    Recovery,
    units::{FluxUnit, FlowUnit},
};
use serde::Serialize;

use crate::{FlowSplit, MembraneSpec, SystemConfig, average_flux, config::normalize_feed_flow};

/// Flows and average flux of a train, without chemistry or pressures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HydraulicBalance {
    pub feed_flow: f64,
    pub concentrate_flow: f64,
    pub permeate_flow: f64,
    pub total_elements: u32,
    /// Total active area in the display area unit.
    pub total_area: f64,
    /// Average flux in `flux_unit`.
    pub calc_flux: f64,
    pub unit: FlowUnit,
    pub flux_unit: FluxUnit,
}

/// Mass balance and average flux of every stage in `config` built from
/// `membrane`.
///
/// The membranes named in the configuration are ignored; this sizes a train
/// for a single element model.
#[must_use]
pub fn run_hydraulic_balance(config: &SystemConfig, membrane: &MembraneSpec) -> HydraulicBalance {
    let unit = config.flow_unit;
    let flux_unit = unit.flux_unit();

    let split = FlowSplit::from_feed(
        normalize_feed_flow(config),
        Recovery::from_percent_clamped(config.recovery),
    );

    let total_elements = config.stage_layout().iter().fold(0_u32, |total, stage| {
        total.saturating_add(stage.vessels.saturating_mul(stage.elements_per_vessel))
    });
    let total_area = membrane.active_area() * f64::from(total_elements);

    HydraulicBalance {
        feed_flow: unit.from_volume_rate(split.feed),
        concentrate_flow: unit.from_volume_rate(split.concentrate),
        permeate_flow: unit.from_volume_rate(split.permeate),
        total_elements,
        total_area: unit.area_unit().from_area(total_area),
        calc_flux: flux_unit.from_flux(average_flux(split.permeate, total_area)),
        unit,
        flux_unit,
    }
}
