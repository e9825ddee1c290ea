use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A dissolved species tracked by the chemistry model.
///
/// Serialized as the lowercase key used in water analyses (`ca`, `hco3`, ...).
/// The derived ordering fixes iteration order in [`IonConcentrations`], which
/// keeps summed totals reproducible.
///
/// [`IonConcentrations`]: crate::IonConcentrations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ion {
    Ca,
    Mg,
    Na,
    K,
    Nh4,
    Ba,
    Sr,
    Cl,
    So4,
    Hco3,
    Co3,
    No3,
    F,
    Po4,
    Sio2,
    B,
    Co2,
}

/// Rejection behavior shared by a group of species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IonClass {
    /// Singly charged ions.
    Monovalent,
    /// Multiply charged ions, rejected better than monovalent ones.
    Divalent,
    /// Bicarbonate alkalinity.
    Alkalinity,
    /// Dissolved silica.
    Silica,
    /// Boric acid, mostly uncharged at neutral pH and poorly rejected.
    Boron,
    /// Dissolved carbon dioxide, which passes the membrane.
    CarbonDioxide,
}

impl Ion {
    /// Every tracked species, in key order.
    pub const ALL: [Ion; 17] = [
        Ion::Ca,
        Ion::Mg,
        Ion::Na,
        Ion::K,
        Ion::Nh4,
        Ion::Ba,
        Ion::Sr,
        Ion::Cl,
        Ion::So4,
        Ion::Hco3,
        Ion::Co3,
        Ion::No3,
        Ion::F,
        Ion::Po4,
        Ion::Sio2,
        Ion::B,
        Ion::Co2,
    ];

    /// Key used in water analyses.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Ca => "ca",
            Self::Mg => "mg",
            Self::Na => "na",
            Self::K => "k",
            Self::Nh4 => "nh4",
            Self::Ba => "ba",
            Self::Sr => "sr",
            Self::Cl => "cl",
            Self::So4 => "so4",
            Self::Hco3 => "hco3",
            Self::Co3 => "co3",
            Self::No3 => "no3",
            Self::F => "f",
            Self::Po4 => "po4",
            Self::Sio2 => "sio2",
            Self::B => "b",
            Self::Co2 => "co2",
        }
    }

    /// Rejection class of this species.
    #[must_use]
    pub fn class(self) -> IonClass {
        match self {
            Self::Na | Self::K | Self::Nh4 | Self::Cl | Self::No3 | Self::F => IonClass::Monovalent,
            Self::Ca | Self::Mg | Self::Ba | Self::Sr | Self::So4 | Self::Co3 | Self::Po4 => {
                IonClass::Divalent
            }
            Self::Hco3 => IonClass::Alkalinity,
            Self::Sio2 => IonClass::Silica,
            Self::B => IonClass::Boron,
            Self::Co2 => IonClass::CarbonDioxide,
        }
    }

    /// Molar mass in g/mol.
    #[must_use]
    pub fn molar_mass(self) -> f64 {
        match self {
            Self::Ca => 40.078,
            Self::Mg => 24.305,
            Self::Na => 22.990,
            Self::K => 39.098,
            Self::Nh4 => 18.038,
            Self::Ba => 137.327,
            Self::Sr => 87.62,
            Self::Cl => 35.453,
            Self::So4 => 96.06,
            Self::Hco3 => 61.017,
            Self::Co3 => 60.009,
            Self::No3 => 62.004,
            Self::F => 18.998,
            Self::Po4 => 94.971,
            Self::Sio2 => 60.084,
            Self::B => 10.81,
            Self::Co2 => 44.009,
        }
    }

    /// Ionic charge; zero for neutral species.
    #[must_use]
    pub fn charge(self) -> i32 {
        match self {
            Self::Ca | Self::Mg | Self::Ba | Self::Sr => 2,
            Self::Na | Self::K | Self::Nh4 => 1,
            Self::Cl | Self::Hco3 | Self::No3 | Self::F => -1,
            Self::So4 | Self::Co3 => -2,
            Self::Po4 => -3,
            Self::Sio2 | Self::B | Self::Co2 => 0,
        }
    }

    /// Whether the species counts toward dissolved solids.
    ///
    /// Dissolved CO2 is a gas and is left out of TDS and osmotic pressure.
    #[must_use]
    pub fn is_solid(self) -> bool {
        self != Self::Co2
    }

    /// Converts mg/L of this species to mol/L.
    #[must_use]
    pub fn molarity(self, mg_per_l: f64) -> f64 {
        mg_per_l / 1000.0 / self.molar_mass()
    }

    /// Converts mg/L of this species to mg/L expressed as CaCO3.
    ///
    /// Neutral species have no equivalent and return zero.
    #[must_use]
    pub fn as_calcium_carbonate(self, mg_per_l: f64) -> f64 {
        const CACO3_EQUIVALENT_WEIGHT: f64 = 50.04;

        match self.charge().unsigned_abs() {
            0 => 0.0,
            z => mg_per_l / (self.molar_mass() / f64::from(z)) * CACO3_EQUIVALENT_WEIGHT,
        }
    }
}

impl FromStr for Ion {
    type Err = UnknownIon;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let wanted = key.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|ion| ion.key() == wanted)
            .ok_or_else(|| UnknownIon(key.to_string()))
    }
}

impl fmt::Display for Ion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// An error returned when an ion key is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized ion key `{0}`")]
pub struct UnknownIon(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn keys_parse_case_insensitively() {
        assert_eq!("HCO3".parse(), Ok(Ion::Hco3));
        assert_eq!(" sio2".parse(), Ok(Ion::Sio2));
        assert!("xx".parse::<Ion>().is_err());
        for ion in Ion::ALL {
            assert_eq!(ion.key().parse(), Ok(ion));
        }
    }

    #[test]
    fn classes() {
        assert_eq!(Ion::Na.class(), IonClass::Monovalent);
        assert_eq!(Ion::So4.class(), IonClass::Divalent);
        assert_eq!(Ion::Hco3.class(), IonClass::Alkalinity);
        assert_eq!(Ion::Co2.class(), IonClass::CarbonDioxide);
    }

    #[test]
    fn calcium_carbonate_equivalents() {
        assert_relative_eq!(Ion::Ca.as_calcium_carbonate(100.0), 249.71, epsilon = 0.01);
        assert_relative_eq!(Ion::Hco3.as_calcium_carbonate(100.0), 82.01, epsilon = 0.01);
        assert_relative_eq!(Ion::Sio2.as_calcium_carbonate(100.0), 0.0);
    }

    #[test]
    fn serde_keys_are_lowercase() {
        assert_eq!(serde_json::to_string(&Ion::Nh4).unwrap(), "\"nh4\"");
    }
}
