//! Stages in series.
//!
//! Each stage takes the previous stage's concentrate as feed. Permeate is
//! shared out by membrane area, so stage flows always add up to the system
//! split. Pressures are propagated afterwards, once the system feed pressure
//! is known.

use osmo_core::units::{Flux, WaterPermeability};
use osmo_water::{IonConcentrations, osmotic_pressure};
use uom::{
    ConstZero,
    si::f64::{Area, Pressure, VolumeRate},
};

use crate::{
    FlowSplit, IonBalance, ModelParameters, RejectionProfile, average_flux,
    concentration_polarization,
    config::{NormalizedConfig, NormalizedStage},
    pressure_drop,
};

/// Flows, chemistry, and transport of one stage.
#[derive(Debug, Clone)]
pub(crate) struct StageState<'a> {
    /// Position in the train, from one.
    pub number: usize,
    pub layout: NormalizedStage<'a>,
    pub area: Area,
    pub flows: FlowSplit,
    pub feed_ions: IonConcentrations,
    pub balance: IonBalance,
    /// Permeability after temperature, fouling, and age.
    pub permeability: WaterPermeability,
    pub average_flux: Flux,
    pub beta: f64,
    pub pressure_drop: Pressure,
    /// `β·(π_feed + π_conc)/2 − π_perm` over this stage.
    pub net_osmotic_pressure: Pressure,
}

impl StageState<'_> {
    pub fn highest_flux(&self) -> Flux {
        self.average_flux * self.beta
    }

    pub fn feed_per_vessel(&self) -> VolumeRate {
        self.flows.per_vessel(self.layout.vessels).feed
    }

    pub fn concentrate_per_vessel(&self) -> VolumeRate {
        self.flows.per_vessel(self.layout.vessels).concentrate
    }
}

/// Resolves every stage of the train against the system flow split.
///
/// Stage permeate is the system permeate times the stage's share of the
/// total membrane area, with equal shares when there is no area at all.
pub(crate) fn resolve_stages<'a>(
    config: &NormalizedConfig<'a>,
    system: &FlowSplit,
    parameters: &ModelParameters,
) -> Vec<StageState<'a>> {
    let total_area = config.total_area();
    let stage_count = config.stages.len().max(1) as f64;

    let mut feed_flow = system.feed;
    let mut feed_ions = config.feed_ions.clone();
    let mut states = Vec::with_capacity(config.stages.len());

    for (index, layout) in config.stages.iter().enumerate() {
        let area = layout.area();
        let share = if total_area > Area::ZERO {
            (area / total_area).value
        } else {
            1.0 / stage_count
        };

        let flows = FlowSplit::with_permeate(feed_flow, system.permeate * share);
        let state = resolve_stage(
            index + 1,
            *layout,
            area,
            flows,
            feed_ions,
            config,
            parameters,
        );

        log::debug!(
            "stage {}: {} x {} {}, recovery {:.1} %, beta {:.3}",
            state.number,
            layout.vessels,
            layout.elements_per_vessel,
            layout.membrane.id,
            state.flows.recovery_fraction() * 100.0,
            state.beta,
        );

        feed_flow = state.flows.concentrate;
        feed_ions = state.balance.concentrate.clone();
        states.push(state);
    }

    states
}

fn resolve_stage<'a>(
    number: usize,
    layout: NormalizedStage<'a>,
    area: Area,
    flows: FlowSplit,
    feed_ions: IonConcentrations,
    config: &NormalizedConfig<'a>,
    parameters: &ModelParameters,
) -> StageState<'a> {
    let derating = &config.derating;
    let profile = RejectionProfile::for_membrane(
        layout.membrane,
        &parameters.class_passage,
        derating.passage_factor(),
    );
    let balance = IonBalance::resolve(&feed_ions, &profile, &flows);

    let flux = average_flux(flows.permeate, area);
    let beta = concentration_polarization(flows.recovery_fraction(), flux, &parameters.polarization);

    let drop = pressure_drop(
        &parameters.pressure_drop,
        layout.elements_per_vessel,
        flows.per_vessel(layout.vessels).average_feed_side(),
    );

    let osmotic = |ions: &IonConcentrations| {
        osmotic_pressure(ions, config.temperature, parameters.chemistry.osmotic_coefficient)
    };
    let net_osmotic_pressure = (osmotic(&feed_ions) + osmotic(&balance.concentrate)) * (beta / 2.0)
        - osmotic(&balance.permeate);

    StageState {
        number,
        layout,
        area,
        flows,
        feed_ions,
        balance,
        permeability: derating.effective_permeability(layout.membrane.permeability()),
        average_flux: flux,
        beta,
        pressure_drop: drop,
        net_osmotic_pressure,
    }
}

/// Pressures of one stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct StagePressures {
    pub feed: Pressure,
    /// Concentrate pressure, never negative.
    pub concentrate: Pressure,
    /// Concentrate pressure before clamping; negative when the feed pressure
    /// cannot cover the stage's pressure drop.
    pub unclamped_concentrate: Pressure,
    pub net_driving: Pressure,
}

/// Walks the train from the system feed pressure.
///
/// Each stage's clamped concentrate pressure feeds the next stage. Stage
/// NDP is the mean feed-side pressure less permeate backpressure and the
/// stage's net osmotic pressure.
pub(crate) fn propagate_pressures(
    stages: &[StageState<'_>],
    feed_pressure: Pressure,
    permeate_pressure: Pressure,
) -> Vec<StagePressures> {
    let mut inlet = feed_pressure;

    stages
        .iter()
        .map(|stage| {
            let unclamped_concentrate = inlet - stage.pressure_drop;
            let concentrate = if unclamped_concentrate > Pressure::ZERO {
                unclamped_concentrate
            } else {
                Pressure::ZERO
            };

            let mean = (inlet + concentrate) / 2.0;
            let pressures = StagePressures {
                feed: inlet,
                concentrate,
                unclamped_concentrate,
                net_driving: mean - permeate_pressure - stage.net_osmotic_pressure,
            };

            inlet = concentrate;
            pressures
        })
        .collect()
}

/// Flow-weighted blend of stage permeates.
///
/// Without any permeate flow the first stage's permeate quality stands in.
pub(crate) fn blend_permeate(stages: &[StageState<'_>]) -> IonConcentrations {
    let total: VolumeRate = stages.iter().map(|s| s.flows.permeate).sum();
    if total <= VolumeRate::ZERO {
        return stages
            .first()
            .map(|s| s.balance.permeate.clone())
            .unwrap_or_default();
    }

    let mut blend = IonConcentrations::new();
    for stage in stages {
        let weight = (stage.flows.permeate / total).value;
        for (ion, value) in stage.balance.permeate.iter() {
            blend.insert(ion, blend.get(ion) + weight * value);
        }
    }
    blend
}

/// Effective permeability of the whole train, weighted by stage area.
///
/// Falls back to a plain mean when there is no area.
pub(crate) fn area_weighted_permeability(stages: &[StageState<'_>]) -> WaterPermeability {
    let total_area: Area = stages.iter().map(|s| s.area).sum();
    if total_area > Area::ZERO {
        stages
            .iter()
            .map(|s| s.permeability * (s.area / total_area).value)
            .sum()
    } else if stages.is_empty() {
        WaterPermeability::ZERO
    } else {
        stages.iter().map(|s| s.permeability).sum::<WaterPermeability>() / stages.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use osmo_core::units::{FlowUnit, PressureUnit};
    use osmo_water::Ion;
    use uom::si::pressure::bar;

    use crate::{MembraneCatalog, StageConfig, SystemConfig};

    fn two_stage_config() -> SystemConfig {
        SystemConfig {
            feed_flow: 100.0,
            flow_unit: FlowUnit::CubicMeterPerHour,
            recovery: 75.0,
            feed_ions: IonConcentrations::new()
                .with(Ion::Ca, 80.0)
                .with(Ion::Na, 400.0)
                .with(Ion::Cl, 620.0)
                .with(Ion::Hco3, 200.0),
            stages: vec![
                StageConfig {
                    vessels: 10,
                    elements_per_vessel: 6,
                    membrane_model: None,
                },
                StageConfig {
                    vessels: 5,
                    elements_per_vessel: 6,
                    membrane_model: None,
                },
            ],
            ..SystemConfig::default()
        }
    }

    fn m3h(flow: VolumeRate) -> f64 {
        FlowUnit::CubicMeterPerHour.from_volume_rate(flow)
    }

    #[test]
    fn stage_flows_follow_area_shares() {
        let config = two_stage_config();
        let catalog = MembraneCatalog::standard();
        let parameters = ModelParameters::default();
        let normalized = NormalizedConfig::new(&config, &catalog, &parameters);
        let system = FlowSplit::from_feed(normalized.feed_flow, normalized.recovery);

        let stages = resolve_stages(&normalized, &system, &parameters);

        assert_eq!(stages.len(), 2);
        assert_relative_eq!(m3h(stages[0].flows.permeate), 50.0, epsilon = 1e-9);
        assert_relative_eq!(m3h(stages[1].flows.permeate), 25.0, epsilon = 1e-9);
        assert_relative_eq!(m3h(stages[1].flows.feed), 50.0, epsilon = 1e-9);
        assert_relative_eq!(m3h(stages[1].flows.concentrate), 25.0, epsilon = 1e-9);

        // The second stage sees the first stage's concentrate.
        assert_eq!(stages[1].feed_ions, stages[0].balance.concentrate);
        assert!(stages[1].balance.concentrate.tds() > stages[0].balance.concentrate.tds());
    }

    #[test]
    fn stage_ion_balances_close() {
        let config = two_stage_config();
        let catalog = MembraneCatalog::standard();
        let parameters = ModelParameters::default();
        let normalized = NormalizedConfig::new(&config, &catalog, &parameters);
        let system = FlowSplit::from_feed(normalized.feed_flow, normalized.recovery);
        let stages = resolve_stages(&normalized, &system, &parameters);

        let permeate = blend_permeate(&stages);
        let concentrate = &stages[1].balance.concentrate;
        for (ion, cf) in normalized.feed_ions.iter() {
            let into = m3h(system.feed) * cf;
            let out = m3h(system.permeate) * permeate.get(ion)
                + m3h(system.concentrate) * concentrate.get(ion);
            assert_relative_eq!(into, out, max_relative = 1e-9);
        }
    }

    #[test]
    fn zero_area_shares_permeate_equally() {
        let mut config = two_stage_config();
        for stage in &mut config.stages {
            stage.vessels = 0;
        }
        let catalog = MembraneCatalog::standard();
        let parameters = ModelParameters::default();
        let normalized = NormalizedConfig::new(&config, &catalog, &parameters);
        let system = FlowSplit::from_feed(normalized.feed_flow, normalized.recovery);
        let stages = resolve_stages(&normalized, &system, &parameters);

        assert_relative_eq!(m3h(stages[0].flows.permeate), 37.5, epsilon = 1e-9);
        assert_eq!(stages[0].average_flux, Flux::ZERO);
        assert_relative_eq!(m3h(stages[0].feed_per_vessel()), 0.0);
    }

    #[test]
    fn pressures_cascade_and_clamp() {
        let config = two_stage_config();
        let catalog = MembraneCatalog::standard();
        let parameters = ModelParameters::default();
        let normalized = NormalizedConfig::new(&config, &catalog, &parameters);
        let system = FlowSplit::from_feed(normalized.feed_flow, normalized.recovery);
        let stages = resolve_stages(&normalized, &system, &parameters);

        let feed = PressureUnit::Bar.to_pressure(12.0);
        let pressures = propagate_pressures(&stages, feed, Pressure::ZERO);
        assert_eq!(pressures[0].feed, feed);
        assert_eq!(pressures[1].feed, pressures[0].concentrate);
        assert_relative_eq!(
            pressures[1].concentrate.get::<bar>(),
            12.0 - stages[0].pressure_drop.get::<bar>() - stages[1].pressure_drop.get::<bar>(),
            epsilon = 1e-9
        );

        let starved = propagate_pressures(&stages, PressureUnit::Bar.to_pressure(0.01), Pressure::ZERO);
        assert!(starved[0].unclamped_concentrate < Pressure::ZERO);
        assert_eq!(starved[0].concentrate, Pressure::ZERO);
        assert_eq!(starved[1].feed, Pressure::ZERO);
    }

    #[test]
    fn permeability_is_area_weighted() {
        let mut config = two_stage_config();
        config.stages[1].membrane_model = Some("XLE-440".to_string());
        let catalog = MembraneCatalog::standard();
        let parameters = ModelParameters::default();
        let normalized = NormalizedConfig::new(&config, &catalog, &parameters);
        let system = FlowSplit::from_feed(normalized.feed_flow, normalized.recovery);
        let stages = resolve_stages(&normalized, &system, &parameters);

        let a = area_weighted_permeability(&stages);
        let expected = (stages[0].permeability * stages[0].area.value
            + stages[1].permeability * stages[1].area.value)
            / (stages[0].area.value + stages[1].area.value);
        assert_relative_eq!(a.value, expected.value, max_relative = 1e-12);
    }
}
