use serde::{Deserialize, Serialize};
use uom::si::{f64::Pressure, pressure::bar, pressure::pound_force_per_square_inch};

use super::{FluxUnit, WaterPermeability};

/// Unit convention a catalog uses for its water permeability (A-value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermeabilityUnit {
    /// Liters per square meter per hour per bar.
    LmhPerBar,
    /// US gallons per square foot per day per psi.
    GfdPerPsi,
}

impl PermeabilityUnit {
    /// Raw A-values below this are taken to be in gfd/psi when no unit is given.
    ///
    /// Brackish elements sit around 1 to 10 LMH/bar and seawater elements go
    /// down to about 0.7 LMH/bar, while gfd/psi values rarely exceed 0.45.
    /// Catalogs quoting seawater elements below this should tag their unit.
    pub const DETECTION_THRESHOLD: f64 = 0.5;

    /// Guesses the unit of an untagged catalog value from its magnitude.
    #[must_use]
    pub fn detect(value: f64) -> Self {
        if value < Self::DETECTION_THRESHOLD {
            Self::GfdPerPsi
        } else {
            Self::LmhPerBar
        }
    }

    /// Converts a number in this unit to a permeability quantity.
    #[must_use]
    pub fn to_permeability(self, value: f64) -> WaterPermeability {
        match self {
            Self::LmhPerBar => FluxUnit::Lmh.to_flux(value) / Pressure::new::<bar>(1.0),
            Self::GfdPerPsi => {
                FluxUnit::Gfd.to_flux(value) / Pressure::new::<pound_force_per_square_inch>(1.0)
            }
        }
    }

    /// Expresses a permeability quantity as a number in this unit.
    #[must_use]
    pub fn from_permeability(self, permeability: WaterPermeability) -> f64 {
        match self {
            Self::LmhPerBar => FluxUnit::Lmh.from_flux(permeability * Pressure::new::<bar>(1.0)),
            Self::GfdPerPsi => FluxUnit::Gfd
                .from_flux(permeability * Pressure::new::<pound_force_per_square_inch>(1.0)),
        }
    }
}
