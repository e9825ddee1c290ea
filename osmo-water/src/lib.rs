//! Water chemistry for the Osmo framework.
//!
//! Concentrations are mg/L keyed by [`Ion`]. Everything here is a pure
//! function of a concentration map plus temperature and pH; membranes and
//! flows live in `osmo-membrane`.

mod concentrations;
mod ion;
mod osmotic;
mod parameters;
mod ph;
mod scaling;

pub use concentrations::IonConcentrations;
pub use ion::{Ion, IonClass, UnknownIon};
pub use osmotic::osmotic_pressure;
pub use parameters::ChemistryParameters;
pub use ph::{concentrate_ph, permeate_ph};
pub use scaling::{
    SaturationRatios, ScalingIndices, calcium_carbonate_precipitation_potential, langelier_index,
    saturation_ph,
};
