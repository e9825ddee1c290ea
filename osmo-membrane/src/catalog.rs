//! Membrane element specifications and catalogs.

use std::collections::{BTreeMap, HashSet};

use osmo_core::{
    Rejection,
    units::{AreaUnit, PermeabilityUnit, WaterPermeability},
};
use osmo_water::Ion;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uom::{ConstZero, si::f64::Area};

/// Relative disagreement between the ft² and m² areas that triggers a warning.
const AREA_MISMATCH_TOLERANCE: f64 = 0.02;

/// Specification of one membrane element model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembraneSpec {
    /// Unique model identifier.
    pub id: String,
    /// Active area per element, ft².
    #[serde(default)]
    pub area_ft2: Option<f64>,
    /// Active area per element, m².
    #[serde(default)]
    pub area_m2: Option<f64>,
    /// Water permeability (A-value), in `permeability_unit`.
    pub water_permeability: f64,
    /// Unit of `water_permeability`; detected from magnitude when omitted.
    #[serde(default)]
    pub permeability_unit: Option<PermeabilityUnit>,
    /// Nominal salt rejection, %.
    pub nominal_rejection_pct: f64,
    /// Per-ion rejections, %, that replace the class-derived values.
    #[serde(default, deserialize_with = "lenient_ion_keys")]
    pub ion_rejections: BTreeMap<Ion, f64>,
}

/// Reads override keys the way feed analyses are read, dropping unknown ions.
fn lenient_ion_keys<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<Ion, f64>, D::Error> {
    let raw = BTreeMap::<String, f64>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(key, pct)| match key.parse::<Ion>() {
            Ok(ion) => Some((ion, pct)),
            Err(err) => {
                log::warn!("{err}, ignoring rejection override of {pct} %");
                None
            }
        })
        .collect())
}

impl MembraneSpec {
    /// Creates a spec from an area in ft² and an A-value in LMH/bar.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        area_ft2: f64,
        water_permeability_lmh_per_bar: f64,
        nominal_rejection_pct: f64,
    ) -> Self {
        Self {
            id: id.into(),
            area_ft2: Some(area_ft2),
            area_m2: None,
            water_permeability: water_permeability_lmh_per_bar,
            permeability_unit: Some(PermeabilityUnit::LmhPerBar),
            nominal_rejection_pct,
            ion_rejections: BTreeMap::new(),
        }
    }

    /// Returns the spec with a per-ion rejection override, in %.
    #[must_use]
    pub fn with_ion_rejection(mut self, ion: Ion, rejection_pct: f64) -> Self {
        self.ion_rejections.insert(ion, rejection_pct);
        self
    }

    /// Active area of one element.
    ///
    /// The m² figure wins when both are given; a disagreement beyond 2 % is
    /// logged. A spec without any area contributes no membrane.
    #[must_use]
    pub fn active_area(&self) -> Area {
        let from_ft2 = self.area_ft2.map(|a| AreaUnit::SquareFoot.to_area(a));
        let from_m2 = self.area_m2.map(|a| AreaUnit::SquareMeter.to_area(a));

        let area = match (from_m2, from_ft2) {
            (Some(m2), Some(ft2)) => {
                let mismatch = ((m2 - ft2) / m2).value.abs();
                if mismatch.is_nan() || mismatch > AREA_MISMATCH_TOLERANCE {
                    log::warn!(
                        "membrane {}: area {:?} ft² and {:?} m² disagree, using m²",
                        self.id,
                        self.area_ft2,
                        self.area_m2
                    );
                }
                m2
            }
            (Some(area), None) | (None, Some(area)) => area,
            (None, None) => {
                log::warn!("membrane {} has no active area", self.id);
                Area::ZERO
            }
        };

        if area.is_finite() && area > Area::ZERO {
            area
        } else {
            Area::ZERO
        }
    }

    /// Water permeability normalized from the catalog convention.
    #[must_use]
    pub fn permeability(&self) -> WaterPermeability {
        let unit = self
            .permeability_unit
            .unwrap_or_else(|| PermeabilityUnit::detect(self.water_permeability));
        let value = if self.water_permeability.is_finite() {
            self.water_permeability.max(0.0)
        } else {
            0.0
        };
        unit.to_permeability(value)
    }

    /// Nominal salt rejection, clamped to the valid band.
    #[must_use]
    pub fn nominal_rejection(&self) -> Rejection {
        Rejection::from_percent_clamped(self.nominal_rejection_pct)
    }

    /// Rejection override for `ion`, clamped to the valid band.
    #[must_use]
    pub fn rejection_override(&self, ion: Ion) -> Option<Rejection> {
        self.ion_rejections
            .get(&ion)
            .map(|&pct| Rejection::from_percent_clamped(pct))
    }
}

/// An ordered set of membrane specs with unique ids and a default model.
///
/// Engines hold a catalog as read-only data. A configuration may bring its
/// own catalog, which then takes precedence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CatalogData", into = "CatalogData")]
pub struct MembraneCatalog {
    membranes: Vec<MembraneSpec>,
    default_id: String,
}

/// Serialized form of a [`MembraneCatalog`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<String>,
    membranes: Vec<MembraneSpec>,
}

impl MembraneCatalog {
    /// Creates a catalog.
    ///
    /// Without a `default_id` the first membrane is the default.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the list is empty, an id repeats, or the
    /// default id is not in the list.
    pub fn new(membranes: Vec<MembraneSpec>, default_id: Option<&str>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for spec in &membranes {
            if !seen.insert(spec.id.as_str()) {
                return Err(CatalogError::DuplicateId(spec.id.clone()));
            }
        }

        let default_id = match (default_id, membranes.first()) {
            (_, None) => return Err(CatalogError::Empty),
            (Some(id), _) if !seen.contains(id) => {
                return Err(CatalogError::UnknownMembrane(id.to_string()));
            }
            (Some(id), _) => id.to_string(),
            (None, Some(first)) => first.id.clone(),
        };

        Ok(Self {
            membranes,
            default_id,
        })
    }

    /// A catalog of common 8-inch elements.
    ///
    /// Contains brackish (`BW-400`, the default), low-energy (`LE-440`),
    /// extra-low-energy (`XLE-440`), and seawater (`SW-400`) models. `LE-440`
    /// is quoted in gfd/psi without a unit tag, as older catalogs are.
    #[must_use]
    pub fn standard() -> Self {
        let low_energy = MembraneSpec {
            id: "LE-440".to_string(),
            area_ft2: Some(440.0),
            area_m2: Some(40.9),
            water_permeability: 0.19,
            permeability_unit: None,
            nominal_rejection_pct: 99.3,
            ion_rejections: BTreeMap::new(),
        };

        Self {
            membranes: vec![
                MembraneSpec::new("BW-400", 400.0, 3.5, 99.5),
                low_energy,
                MembraneSpec::new("XLE-440", 440.0, 7.5, 99.0),
                MembraneSpec::new("SW-400", 400.0, 1.1, 99.75).with_ion_rejection(Ion::B, 92.0),
            ],
            default_id: "BW-400".to_string(),
        }
    }

    /// Looks up a membrane by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownMembrane`] if no membrane has this id.
    pub fn get(&self, id: &str) -> Result<&MembraneSpec, CatalogError> {
        self.membranes
            .iter()
            .find(|spec| spec.id == id)
            .ok_or_else(|| CatalogError::UnknownMembrane(id.to_string()))
    }

    /// The default membrane.
    #[must_use]
    pub fn default_membrane(&self) -> &MembraneSpec {
        // Construction guarantees the default id is present.
        self.get(&self.default_id)
            .unwrap_or_else(|_| &self.membranes[0])
    }

    /// Looks up a membrane, falling back to the default for unknown or missing ids.
    #[must_use]
    pub fn resolve(&self, id: Option<&str>) -> &MembraneSpec {
        match id {
            None => self.default_membrane(),
            Some(id) => self.get(id).unwrap_or_else(|err| {
                let fallback = self.default_membrane();
                log::warn!("{err}, using {}", fallback.id);
                fallback
            }),
        }
    }

    /// Iterates over the membranes in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &MembraneSpec> {
        self.membranes.iter()
    }
}

impl Default for MembraneCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<CatalogData> for MembraneCatalog {
    type Error = CatalogError;

    fn try_from(data: CatalogData) -> Result<Self, Self::Error> {
        Self::new(data.membranes, data.default.as_deref())
    }
}

impl From<MembraneCatalog> for CatalogData {
    fn from(catalog: MembraneCatalog) -> Self {
        Self {
            default: Some(catalog.default_id),
            membranes: catalog.membranes,
        }
    }
}

/// Errors that can occur when building or querying a [`MembraneCatalog`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum CatalogError {
    /// The catalog has no membranes.
    #[error("membrane catalog is empty")]
    Empty,

    /// Two membranes share an id.
    #[error("duplicate membrane id `{0}`")]
    DuplicateId(String),

    /// No membrane has the requested id.
    #[error("unknown membrane `{0}`")]
    UnknownMembrane(String),
}
