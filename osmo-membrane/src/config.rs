mod normalized;

use osmo_core::units::{FlowUnit, TemperatureScale};
use osmo_water::IonConcentrations;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::MembraneCatalog;

pub(crate) use normalized::{NormalizedConfig, NormalizedStage, normalize_feed_flow};

/// Design inputs for one membrane train.
///
/// Every field has a default, so configuration files only need the values
/// that differ. Values are taken as given here and coerced into range when
/// the engine normalizes them.
///
/// # Example
///
/// ```
/// use osmo_membrane::SystemConfig;
///
/// let config = SystemConfig::from_toml_str(
///     r#"
///     feed_flow = 100.0
///     flow_unit = "gpm"
///     recovery = 50.0
///     vessels = 6
///
///     [feed_ions]
///     ca = 120.0
///     na = 300.0
///     "#,
/// )
/// .unwrap();
///
/// assert_eq!(config.elements_per_vessel, 7);
/// assert_eq!(config.stage_layout().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Total feed flow, in `flow_unit`.
    pub feed_flow: f64,
    /// Input flow unit; also decides every displayed unit in the report.
    pub flow_unit: FlowUnit,
    /// Target recovery, %.
    pub recovery: f64,
    /// Feed water analysis, mg/L.
    pub feed_ions: IonConcentrations,
    pub feed_ph: f64,
    /// Feed temperature, in `temperature_unit`.
    pub temperature: f64,
    pub temperature_unit: TemperatureScale,
    /// Vessels of the implicit single stage used when `stages` is empty.
    pub vessels: u32,
    /// Elements per vessel of the implicit single stage.
    pub elements_per_vessel: u32,
    /// Membrane of the implicit single stage, and the default for stages
    /// that name none.
    pub membrane_model: Option<String>,
    /// Stages in flow order.
    pub stages: Vec<StageConfig>,
    /// Catalog that replaces the engine's own for this design.
    pub membrane_catalog: Option<MembraneCatalog>,
    /// Fixed feed pressure, in the display pressure unit.
    pub feed_pressure: Option<f64>,
    /// Permeate backpressure, in the display pressure unit.
    pub permeate_pressure: Option<f64>,
    pub membrane_age_years: Option<f64>,
    /// Fractional permeability loss per year.
    pub flux_decline_per_year: Option<f64>,
    /// Fractional salt passage increase per year.
    pub sp_increase_per_year: Option<f64>,
    /// Fraction of clean-membrane permeability, in `(0, 1]`.
    pub fouling_factor: Option<f64>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            feed_flow: 0.0,
            flow_unit: FlowUnit::default(),
            recovery: 75.0,
            feed_ions: IonConcentrations::new(),
            feed_ph: 7.0,
            temperature: 25.0,
            temperature_unit: TemperatureScale::default(),
            vessels: 1,
            elements_per_vessel: 7,
            membrane_model: None,
            stages: Vec::new(),
            membrane_catalog: None,
            feed_pressure: None,
            permeate_pressure: None,
            membrane_age_years: None,
            flux_decline_per_year: None,
            sp_increase_per_year: None,
            fouling_factor: None,
        }
    }
}

impl SystemConfig {
    /// Parses a configuration from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the text is not valid TOML or does not
    /// match the configuration layout.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if the text is not valid JSON or does not
    /// match the configuration layout.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Stages to evaluate.
    ///
    /// Without explicit stages this is one stage built from the top-level
    /// vessel layout. Stages that name no membrane inherit `membrane_model`.
    #[must_use]
    pub fn stage_layout(&self) -> Vec<StageConfig> {
        if self.stages.is_empty() {
            return vec![StageConfig {
                vessels: self.vessels,
                elements_per_vessel: self.elements_per_vessel,
                membrane_model: self.membrane_model.clone(),
            }];
        }

        self.stages
            .iter()
            .map(|stage| StageConfig {
                membrane_model: stage
                    .membrane_model
                    .clone()
                    .or_else(|| self.membrane_model.clone()),
                ..stage.clone()
            })
            .collect()
    }
}

/// Layout of one stage of pressure vessels in parallel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub vessels: u32,
    pub elements_per_vessel: u32,
    pub membrane_model: Option<String>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            vessels: 1,
            elements_per_vessel: 7,
            membrane_model: None,
        }
    }
}

/// Errors that can occur when loading a [`SystemConfig`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
}
