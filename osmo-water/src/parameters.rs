use serde::{Deserialize, Serialize};

/// Empirical constants used by the chemistry model.
///
/// These are calibration values rather than physical laws, so they are
/// exposed for tuning. The defaults describe brackish to seawater RO at
/// 25 °C.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChemistryParameters {
    /// Osmotic coefficient applied to the ideal van 't Hoff pressure.
    pub osmotic_coefficient: f64,
    /// Drop in pH from feed to permeate.
    pub permeate_ph_offset: f64,
    /// First carbonic acid dissociation constant, as pK.
    pub pk1: f64,
    /// Second carbonic acid dissociation constant, as pK.
    pub pk2: f64,
    /// CCPP in mg/L as CaCO3 per unit of positive LSI.
    pub ccpp_per_lsi: f64,
    /// Solubility product of gypsum, mol²/L².
    pub ksp_caso4: f64,
    /// Solubility product of barite, mol²/L².
    pub ksp_baso4: f64,
    /// Solubility product of celestite, mol²/L².
    pub ksp_srso4: f64,
    /// Solubility product of fluorite, mol³/L³.
    pub ksp_caf2: f64,
    /// Solubility product of tricalcium phosphate, mol⁵/L⁵.
    pub ksp_ca3po42: f64,
    /// Amorphous silica solubility at 25 °C, mg/L.
    pub silica_solubility_25c: f64,
    /// Change in silica solubility per °C, mg/L.
    pub silica_solubility_slope: f64,
}

impl Default for ChemistryParameters {
    fn default() -> Self {
        Self {
            osmotic_coefficient: 0.93,
            permeate_ph_offset: 1.0,
            pk1: 6.35,
            pk2: 10.33,
            ccpp_per_lsi: 50.0,
            ksp_caso4: 2.63e-5,
            ksp_baso4: 1.08e-10,
            ksp_srso4: 3.44e-7,
            ksp_caf2: 3.45e-11,
            ksp_ca3po42: 2.07e-33,
            silica_solubility_25c: 120.0,
            silica_solubility_slope: 2.0,
        }
    }
}
