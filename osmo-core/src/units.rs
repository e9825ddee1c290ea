//! Unit tags, conversions, and quantity aliases.
//!
//! All internal math runs on `uom` quantities, so flows are
//! [`VolumeRate`](uom::si::f64::VolumeRate), pressures are
//! [`Pressure`](uom::si::f64::Pressure), and so on. Plain numbers only exist
//! at the edges: configuration values come in tagged with a [`FlowUnit`],
//! and reports go out in the display units that flow unit implies
//! (the "master unit" rule):
//!
//! | flow unit                 | flux unit | pressure unit | area unit |
//! |---------------------------|-----------|---------------|-----------|
//! | gpm, gpd, mgd, migd       | gfd       | psi           | ft²       |
//! | m3/h, m3/d, mld           | LMH       | bar           | m²        |

mod display;
mod flow;
mod permeability;
mod temperature;

use thiserror::Error;
use uom::{
    si::{ISQ, Quantity, SI},
    typenum::{N1, P1, P2, Z0},
};

pub use display::{AreaUnit, FluxUnit, PressureUnit};
pub use flow::{FlowUnit, UnitSystem};
pub use permeability::PermeabilityUnit;
pub use temperature::TemperatureScale;

/// Permeate flux, volume per membrane area per time, m/s in SI.
pub type Flux = uom::si::f64::Velocity;

/// Membrane water permeability (the A-value), flux per pressure, m/(s·Pa) in SI.
///
/// Catalogs quote this in LMH/bar or gfd/psi; see [`PermeabilityUnit`].
pub type WaterPermeability = Quantity<ISQ<P2, N1, P1, Z0, Z0, Z0, Z0>, SI<f64>, f64>;

/// One LMH (L/m²/h) expressed in m/s.
pub(crate) const LMH_IN_METERS_PER_SECOND: f64 = 1.0e-3 / 3600.0;

/// One gfd (US gal/ft²/day) expressed in LMH.
pub const LMH_PER_GFD: f64 = 3.785_411_784 / 0.092_903_04 / 24.0;

/// An error returned when a unit tag is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized unit tag `{0}`")]
pub struct UnknownUnit(pub String);

/// Normalizes a unit tag for matching: lowercase, no whitespace, `³` as `3`.
pub(crate) fn normalize_tag(tag: &str) -> String {
    tag.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '³' { '3' } else { c })
        .collect::<String>()
        .to_lowercase()
}
