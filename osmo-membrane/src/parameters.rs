use osmo_core::units::FluxUnit;
use osmo_water::{ChemistryParameters, IonClass};
use serde::{Deserialize, Serialize};

/// Empirical constants of the membrane performance model.
///
/// Defaults reproduce typical brackish-water design software. Every value
/// can be overridden from configuration, field by field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParameters {
    pub chemistry: ChemistryParameters,
    pub polarization: PolarizationParameters,
    pub temperature_correction: TemperatureCorrection,
    pub pressure_drop: PressureDropModel,
    pub class_passage: ClassPassage,
    /// Fractional loss of permeability per year of membrane age.
    pub flux_decline_per_year: f64,
    /// Fractional increase of salt passage per year of membrane age.
    pub sp_increase_per_year: f64,
    /// Combined pump and motor efficiency used for specific energy.
    pub pump_efficiency: f64,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            chemistry: ChemistryParameters::default(),
            polarization: PolarizationParameters::default(),
            temperature_correction: TemperatureCorrection::default(),
            pressure_drop: PressureDropModel::default(),
            class_passage: ClassPassage::default(),
            flux_decline_per_year: 0.07,
            sp_increase_per_year: 0.10,
            pump_efficiency: 0.8,
        }
    }
}

/// Concentration polarization correlation.
///
/// `β = 1 + k·r·J_ref / (J_ref + J)`, so polarization grows with recovery and
/// eases at higher flux where the element runs with more crossflow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolarizationParameters {
    pub recovery_coefficient: f64,
    pub reference_flux_lmh: f64,
}

impl Default for PolarizationParameters {
    fn default() -> Self {
        Self {
            recovery_coefficient: 0.5,
            reference_flux_lmh: 20.0,
        }
    }
}

/// Arrhenius-type temperature correction of permeability.
///
/// Activation constants in kelvin, with a steeper curve below 25 °C.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemperatureCorrection {
    pub above_25c: f64,
    pub below_25c: f64,
}

impl Default for TemperatureCorrection {
    fn default() -> Self {
        Self {
            above_25c: 2640.0,
            below_25c: 3020.0,
        }
    }
}

/// Feed-side pressure loss along a pressure vessel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PressureDropModel {
    /// A fixed loss per element, bar.
    Linear { bar_per_element: f64 },
    /// `ΔP = c·n·q^e` in bar, with `q` the average flow per vessel in m³/h.
    PowerLaw { coefficient: f64, exponent: f64 },
}

impl Default for PressureDropModel {
    fn default() -> Self {
        Self::PowerLaw {
            coefficient: 0.004,
            exponent: 1.7,
        }
    }
}

/// Salt passage of each ion class relative to the nominal passage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassPassage {
    pub monovalent: f64,
    pub divalent: f64,
    pub alkalinity: f64,
    pub silica: f64,
    pub boron: f64,
}

impl ClassPassage {
    /// Passage multiplier for `class`, or `None` if the class is not rejected.
    #[must_use]
    pub fn multiplier(&self, class: IonClass) -> Option<f64> {
        match class {
            IonClass::Monovalent => Some(self.monovalent),
            IonClass::Divalent => Some(self.divalent),
            IonClass::Alkalinity => Some(self.alkalinity),
            IonClass::Silica => Some(self.silica),
            IonClass::Boron => Some(self.boron),
            IonClass::CarbonDioxide => None,
        }
    }
}

impl Default for ClassPassage {
    fn default() -> Self {
        Self {
            monovalent: 1.0,
            divalent: 0.35,
            alkalinity: 1.4,
            silica: 1.5,
            boron: 40.0,
        }
    }
}

/// Limits that trigger design warnings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignLimits {
    /// Highest allowed element flux when reporting in gfd.
    pub max_flux_gfd: f64,
    /// Highest allowed element flux when reporting in LMH.
    pub max_flux_lmh: f64,
    /// Highest allowed feed flow per pressure vessel, m³/h.
    pub max_feed_flow_per_vessel_m3h: f64,
}

impl DesignLimits {
    /// Flux limit in the given display unit.
    #[must_use]
    pub fn max_flux(&self, unit: FluxUnit) -> f64 {
        match unit {
            FluxUnit::Gfd => self.max_flux_gfd,
            FluxUnit::Lmh => self.max_flux_lmh,
        }
    }
}

impl Default for DesignLimits {
    fn default() -> Self {
        Self {
            max_flux_gfd: 20.0,
            max_flux_lmh: 34.0,
            max_feed_flow_per_vessel_m3h: 17.0,
        }
    }
}
