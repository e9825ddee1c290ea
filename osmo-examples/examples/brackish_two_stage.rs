//! # Brackish Two-Stage Train
//!
//! This example evaluates a 2:1 array of brackish-water elements treating
//! well water. The configuration is read from `configs/brackish_two_stage.toml`
//! and the report is printed as a stage table followed by the concentrate
//! scaling indices and any design warnings.
//!
//! ## Running the Example
//!
//! ```sh
//! RUST_LOG=debug cargo run --example brackish_two_stage
//! ```
//!
//! Pass a path to evaluate a different TOML configuration instead.

use std::{env, error::Error, fs};

use osmo_core::Model;
use osmo_membrane::{Report, RoSystem, SystemConfig};

const DEFAULT_CONFIG: &str = include_str!("../configs/brackish_two_stage.toml");

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let text = match env::args().nth(1) {
        Some(path) => fs::read_to_string(path)?,
        None => DEFAULT_CONFIG.to_string(),
    };
    let config = SystemConfig::from_toml_str(&text)?;

    let engine = RoSystem::default();
    let Ok(report) = engine.call(&config);

    print_summary(&report);
    Ok(())
}

fn print_summary(report: &Report) {
    let units = report.units;
    let (flow, flux, pressure) = (units.flow.label(), units.flux.label(), units.pressure.label());
    let system = &report.system;

    println!(
        "Feed {:.1} {flow}, permeate {:.1} {flow}, concentrate {:.1} {flow} at {:.1} % recovery",
        system.feed_flow, system.permeate_flow, system.concentrate_flow, system.recovery
    );
    println!(
        "Feed pressure {:.1} {pressure}, NDP {:.1} {pressure}, average flux {:.1} {flux}, {:.2} kWh/m3",
        system.feed_pressure, system.net_driving_pressure, system.average_flux, system.specific_energy
    );
    println!();

    println!(
        "{:>5} {:>9} {:>7} {:>10} {:>10} {:>8} {:>10} {:>10}",
        "stage", "membrane", "vessels", "feed", "permeate", "flux", "P feed", "TDS perm"
    );
    for stage in &report.stages {
        println!(
            "{:>5} {:>9} {:>7} {:>10.1} {:>10.1} {:>8.1} {:>10.1} {:>10.1}",
            stage.stage,
            stage.membrane,
            stage.vessels,
            stage.feed_flow,
            stage.permeate_flow,
            stage.average_flux,
            stage.feed_pressure,
            stage.permeate_tds,
        );
    }
    println!();

    let saturation = &report.concentrate_saturation;
    match saturation.lsi {
        Some(lsi) => println!("Concentrate LSI {lsi:+.2}, CCPP {:.1} mg/L", saturation.ccpp),
        None => println!("Concentrate LSI undefined"),
    }
    println!(
        "Saturation ratios: CaSO4 {:.2}, BaSO4 {:.2}, SrSO4 {:.2}, SiO2 {:.2}, CaF2 {:.2}",
        saturation.ratios.caso4,
        saturation.ratios.baso4,
        saturation.ratios.srso4,
        saturation.ratios.sio2,
        saturation.ratios.caf2,
    );

    if report.has_warnings() {
        println!();
        for warning in &report.design_warnings {
            println!("warning: {warning}");
        }
    }
}
