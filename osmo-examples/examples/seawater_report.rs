//! # Seawater Report
//!
//! This example builds a single-stage seawater design in code, with a custom
//! membrane catalog, and prints the full report as JSON. It also shows the
//! quick single-pass ion estimate that needs no vessel layout.
//!
//! ## Running the Example
//!
//! ```sh
//! cargo run --example seawater_report
//! ```

use std::error::Error;

use osmo_core::units::FlowUnit;
use osmo_membrane::{
    IonPassageParameters, MembraneCatalog, MembraneSpec, RoSystem, SystemConfig,
    calculate_ion_passage,
};
use osmo_water::{Ion, IonConcentrations};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let seawater = IonConcentrations::new()
        .with(Ion::Na, 10_780.0)
        .with(Ion::Mg, 1_290.0)
        .with(Ion::Ca, 412.0)
        .with(Ion::K, 399.0)
        .with(Ion::Sr, 7.9)
        .with(Ion::Cl, 19_350.0)
        .with(Ion::So4, 2_710.0)
        .with(Ion::Hco3, 142.0)
        .with(Ion::B, 4.5)
        .with(Ion::F, 1.3);

    let catalog = MembraneCatalog::new(
        vec![
            MembraneSpec::new("SWRO-440", 440.0, 1.2, 99.8).with_ion_rejection(Ion::B, 93.0),
            MembraneSpec::new("SWRO-400-HR", 400.0, 0.95, 99.85).with_ion_rejection(Ion::B, 95.0),
        ],
        Some("SWRO-440"),
    )?;

    let config = SystemConfig {
        feed_flow: 4_800.0,
        flow_unit: FlowUnit::CubicMeterPerDay,
        recovery: 45.0,
        feed_ph: 8.1,
        temperature: 22.0,
        vessels: 20,
        elements_per_vessel: 7,
        feed_ions: seawater.clone(),
        permeate_pressure: Some(0.5),
        ..SystemConfig::default()
    };

    let report = RoSystem::new(catalog).evaluate(&config);
    println!("{}", serde_json::to_string_pretty(&report)?);

    let quick = calculate_ion_passage(
        &seawater,
        &IonPassageParameters {
            recovery_pct: 45.0,
            feed_ph: 8.1,
            temperature_c: 22.0,
            average_flux_lmh: 14.0,
        },
    );
    log::info!(
        "standard-table estimate: permeate TDS {:.0} mg/L, beta {:.3}",
        quick.permeate_tds,
        quick.beta
    );

    Ok(())
}
