use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};

use crate::{ChemistryParameters, Ion};

/// Concentrations of dissolved species in mg/L.
///
/// A species that is absent contributes zero to every total. Iteration
/// follows [`Ion`] ordering, so sums over the map are reproducible.
///
/// Deserialization is lenient: unknown keys are dropped and negative or
/// non-finite values become zero, each with a logged warning.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "BTreeMap<String, f64>")]
pub struct IonConcentrations(BTreeMap<Ion, f64>);

impl IonConcentrations {
    /// Creates an empty concentration map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the concentration of `ion`, or zero if it is absent.
    #[must_use]
    pub fn get(&self, ion: Ion) -> f64 {
        self.0.get(&ion).copied().unwrap_or(0.0)
    }

    /// Whether `ion` was given a value, even a zero one.
    #[must_use]
    pub fn contains(&self, ion: Ion) -> bool {
        self.0.contains_key(&ion)
    }

    /// Sets the concentration of `ion`.
    ///
    /// Negative or non-finite values are stored as zero.
    pub fn insert(&mut self, ion: Ion, mg_per_l: f64) {
        let value = if mg_per_l.is_finite() && mg_per_l >= 0.0 {
            mg_per_l
        } else {
            log::warn!("concentration of {ion} ({mg_per_l} mg/L) is not a valid amount, using 0");
            0.0
        };
        self.0.insert(ion, value);
    }

    /// Returns the map with `ion` set, for building analyses inline.
    #[must_use]
    pub fn with(mut self, ion: Ion, mg_per_l: f64) -> Self {
        self.insert(ion, mg_per_l);
        self
    }

    /// Iterates over present species in key order.
    pub fn iter(&self) -> impl Iterator<Item = (Ion, f64)> + '_ {
        self.0.iter().map(|(&ion, &value)| (ion, value))
    }

    /// Number of present species.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no species are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Builds a new map over the same species with each value transformed.
    #[must_use]
    pub fn map(&self, mut f: impl FnMut(Ion, f64) -> f64) -> Self {
        self.iter().map(|(ion, value)| (ion, f(ion, value))).collect()
    }

    /// Total dissolved solids, mg/L.
    #[must_use]
    pub fn tds(&self) -> f64 {
        self.iter()
            .filter(|(ion, _)| ion.is_solid())
            .map(|(_, value)| value)
            .fold(0.0, |total, value| total + value)
    }

    /// Total molar concentration of dissolved solids, mol/L.
    #[must_use]
    pub fn molar_total(&self) -> f64 {
        self.iter()
            .filter(|(ion, _)| ion.is_solid())
            .map(|(ion, value)| ion.molarity(value))
            .fold(0.0, |total, value| total + value)
    }

    /// Ionic strength `½ Σ cᵢ zᵢ²`, mol/L.
    #[must_use]
    pub fn ionic_strength(&self) -> f64 {
        0.5 * self
            .iter()
            .map(|(ion, value)| ion.molarity(value) * f64::from(ion.charge().pow(2)))
            .fold(0.0, |total, value| total + value)
    }

    /// Calcium hardness, mg/L as CaCO3.
    #[must_use]
    pub fn calcium_as_caco3(&self) -> f64 {
        Ion::Ca.as_calcium_carbonate(self.get(Ion::Ca))
    }

    /// Carbonate plus bicarbonate alkalinity, mg/L as CaCO3.
    #[must_use]
    pub fn alkalinity_as_caco3(&self) -> f64 {
        Ion::Hco3.as_calcium_carbonate(self.get(Ion::Hco3))
            + Ion::Co3.as_calcium_carbonate(self.get(Ion::Co3))
    }

    /// Fills in missing carbonate species from pH.
    ///
    /// With bicarbonate present, absent carbonate and CO2 are derived from the
    /// carbonic acid equilibria. With only carbonate present, bicarbonate is
    /// back-calculated first. Species the caller supplied, even as zero, are
    /// never overwritten.
    #[must_use]
    pub fn speciated(&self, ph: f64, parameters: &ChemistryParameters) -> Self {
        let mut out = self.clone();

        if !out.contains(Ion::Hco3) && out.get(Ion::Co3) > 0.0 {
            let co3_molar = Ion::Co3.molarity(out.get(Ion::Co3));
            let hco3_molar = co3_molar * 10f64.powf(parameters.pk2 - ph);
            out.insert(Ion::Hco3, hco3_molar * Ion::Hco3.molar_mass() * 1000.0);
        }

        let hco3_molar = Ion::Hco3.molarity(out.get(Ion::Hco3));
        if hco3_molar > 0.0 {
            if !out.contains(Ion::Co3) {
                let co3_molar = hco3_molar * 10f64.powf(ph - parameters.pk2);
                out.insert(Ion::Co3, co3_molar * Ion::Co3.molar_mass() * 1000.0);
            }
            if !out.contains(Ion::Co2) {
                let co2_molar = hco3_molar * 10f64.powf(parameters.pk1 - ph);
                out.insert(Ion::Co2, co2_molar * Ion::Co2.molar_mass() * 1000.0);
            }
        }

        out
    }
}

impl FromIterator<(Ion, f64)> for IonConcentrations {
    fn from_iter<I: IntoIterator<Item = (Ion, f64)>>(iter: I) -> Self {
        let mut out = Self::new();
        for (ion, value) in iter {
            out.insert(ion, value);
        }
        out
    }
}

impl From<BTreeMap<String, f64>> for IonConcentrations {
    fn from(raw: BTreeMap<String, f64>) -> Self {
        raw.into_iter()
            .filter_map(|(key, value)| match key.parse::<Ion>() {
                Ok(ion) => Some((ion, value)),
                Err(err) => {
                    log::warn!("{err}, ignoring {value} mg/L");
                    None
                }
            })
            .collect()
    }
}

impl Serialize for IonConcentrations {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn brackish() -> IonConcentrations {
        IonConcentrations::new()
            .with(Ion::Ca, 120.0)
            .with(Ion::Na, 300.0)
            .with(Ion::Cl, 450.0)
            .with(Ion::Hco3, 150.0)
    }

    #[test]
    fn empty_analysis_totals_are_positive_zero() {
        let water = IonConcentrations::new();
        assert!(water.tds() == 0.0 && water.tds().is_sign_positive());
        assert!(water.molar_total().is_sign_positive());
        assert!(water.ionic_strength().is_sign_positive());
    }

    #[test]
    fn missing_ions_contribute_zero() {
        let water = brackish();
        assert_relative_eq!(water.get(Ion::Ba), 0.0);
        assert_relative_eq!(water.tds(), 1020.0);
    }

    #[test]
    fn co2_is_not_a_dissolved_solid() {
        let water = brackish().with(Ion::Co2, 40.0);
        assert_relative_eq!(water.tds(), 1020.0);
    }

    #[test]
    fn invalid_values_become_zero() {
        let water = IonConcentrations::new()
            .with(Ion::Na, -5.0)
            .with(Ion::Cl, f64::NAN);
        assert!(water.contains(Ion::Na));
        assert_relative_eq!(water.tds(), 0.0);
    }

    #[test]
    fn ionic_strength_of_sodium_chloride() {
        // 0.01 mol/L NaCl has I = 0.01.
        let water = IonConcentrations::new()
            .with(Ion::Na, 0.01 * 22.990 * 1000.0)
            .with(Ion::Cl, 0.01 * 35.453 * 1000.0);
        assert_relative_eq!(water.ionic_strength(), 0.01, epsilon = 1e-12);
    }

    #[test]
    fn speciation_fills_missing_carbonate_species() {
        let params = ChemistryParameters::default();
        let water = brackish().speciated(7.0, &params);

        // CO2/HCO3 molar ratio is 10^(pK1 - pH).
        let ratio = Ion::Co2.molarity(water.get(Ion::Co2)) / Ion::Hco3.molarity(150.0);
        assert_relative_eq!(ratio, 10f64.powf(6.35 - 7.0), max_relative = 1e-12);
        assert!(water.get(Ion::Co3) > 0.0 && water.get(Ion::Co3) < 0.1);
        assert_relative_eq!(water.get(Ion::Hco3), 150.0);
    }

    #[test]
    fn speciation_keeps_supplied_values() {
        let params = ChemistryParameters::default();
        let water = brackish()
            .with(Ion::Co2, 0.0)
            .speciated(7.0, &params);
        assert_relative_eq!(water.get(Ion::Co2), 0.0);
    }

    #[test]
    fn speciation_back_fills_bicarbonate() {
        let params = ChemistryParameters::default();
        let water = IonConcentrations::new()
            .with(Ion::Co3, 6.0)
            .speciated(10.33, &params);
        // At pH = pK2 carbonate and bicarbonate are equimolar.
        assert_relative_eq!(
            Ion::Hco3.molarity(water.get(Ion::Hco3)),
            Ion::Co3.molarity(6.0),
            max_relative = 1e-12
        );
    }

    #[test]
    fn deserialization_skips_unknown_keys() {
        let water: IonConcentrations =
            serde_json::from_str(r#"{"Ca": 80.0, "na": 20.0, "unobtainium": 3.0}"#).unwrap();
        assert_eq!(water.len(), 2);
        assert_relative_eq!(water.get(Ion::Ca), 80.0);

        let json = serde_json::to_string(&water).unwrap();
        assert_eq!(json, r#"{"ca":80.0,"na":20.0}"#);
    }
}
