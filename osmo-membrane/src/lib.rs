//! Steady-state performance of reverse-osmosis membrane trains.
//!
//! The entry point is [`RoSystem`], a [`Model`](osmo_core::Model) that turns
//! a [`SystemConfig`] into a [`Report`] in one forward pass:
//!
//! 1. the configuration is normalized once into internal units,
//! 2. the mass balance splits feed into permeate and concentrate,
//! 3. stages are resolved in series, each rejecting ions and passing its
//!    concentrate to the next,
//! 4. the transport model derives flux, polarization, and pressures,
//! 5. scaling indices and design warnings are assembled into the report.
//!
//! Every call is independent, so one `RoSystem` can serve many threads.
//! Out-of-range input is coerced rather than rejected, and limit violations
//! are reported as [`DesignWarning`]s alongside a complete report.
//!
//! # Example
//!
//! ```
//! use osmo_core::units::FlowUnit;
//! use osmo_membrane::{SystemConfig, calculate_system};
//! use osmo_water::{Ion, IonConcentrations};
//!
//! let config = SystemConfig {
//!     feed_flow: 100.0,
//!     flow_unit: FlowUnit::Gpm,
//!     recovery: 50.0,
//!     vessels: 6,
//!     elements_per_vessel: 7,
//!     feed_ions: IonConcentrations::new()
//!         .with(Ion::Ca, 120.0)
//!         .with(Ion::Na, 300.0)
//!         .with(Ion::Cl, 450.0)
//!         .with(Ion::Hco3, 150.0),
//!     ..SystemConfig::default()
//! };
//!
//! let report = calculate_system(&config);
//! assert!((report.system.permeate_flow - 50.0).abs() < 1e-9);
//! assert!(report.design_warnings.is_empty());
//! ```

mod catalog;
mod config;
mod flow;
mod hydraulic;
mod parameters;
mod passage;
mod report;
mod stage;
mod system;
mod transport;
mod warning;

pub use catalog::{CatalogError, MembraneCatalog, MembraneSpec};
pub use config::{ConfigError, StageConfig, SystemConfig};
pub use flow::FlowSplit;
pub use hydraulic::{HydraulicBalance, run_hydraulic_balance};
pub use parameters::{
    ClassPassage, DesignLimits, ModelParameters, PolarizationParameters, PressureDropModel,
    TemperatureCorrection,
};
pub use passage::{
    IonBalance, IonPassage, IonPassageParameters, Passage, RejectionProfile,
    calculate_ion_passage,
};
pub use report::{Report, ReportUnits, StageResult, SystemResults, WaterParameters};
pub use system::{RoSystem, calculate_system};
pub use transport::{
    Derating, average_flux, concentration_polarization, net_driving_pressure, pressure_drop,
    temperature_correction_factor,
};
pub use warning::{DesignWarning, Stream};
