//! Ion-by-ion rejection and the solute mass balance.

use std::collections::BTreeMap;

use osmo_core::{
    Recovery, Rejection,
    units::{FlowUnit, FluxUnit},
};
use osmo_water::{ChemistryParameters, Ion, IonConcentrations, concentrate_ph, langelier_index};
use serde::{Deserialize, Serialize};
use uom::{
    ConstZero,
    si::{
        f64::{ThermodynamicTemperature, VolumeRate},
        thermodynamic_temperature::degree_celsius,
    },
};

use crate::{ClassPassage, FlowSplit, MembraneSpec, PolarizationParameters, concentration_polarization};

/// How a membrane treats one species.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Passage {
    /// Held back with the given rejection.
    Rejected(Rejection),
    /// Passes freely, as dissolved gases do.
    Unrejected,
}

impl Passage {
    /// Fraction of the feed concentration that reaches the permeate.
    #[must_use]
    pub fn passed_fraction(self) -> f64 {
        match self {
            Self::Rejected(rejection) => rejection.complement(),
            Self::Unrejected => 1.0,
        }
    }

    /// The rejection, if the species is rejected at all.
    #[must_use]
    pub fn rejection(self) -> Option<Rejection> {
        match self {
            Self::Rejected(rejection) => Some(rejection),
            Self::Unrejected => None,
        }
    }
}

/// Passage of every tracked species through one membrane.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectionProfile(BTreeMap<Ion, Passage>);

impl RejectionProfile {
    /// Derives a profile from a membrane's nominal rejection.
    ///
    /// Each class scales the nominal salt passage by its multiplier, a
    /// per-ion override on the membrane replaces that base passage (even for
    /// species that otherwise pass unrejected), and
    /// `passage_factor` (from membrane age) scales the result. Rejections are
    /// clamped to the valid band.
    #[must_use]
    pub fn for_membrane(spec: &MembraneSpec, classes: &ClassPassage, passage_factor: f64) -> Self {
        let nominal_passage = spec.nominal_rejection().complement();

        Self(
            Ion::ALL
                .into_iter()
                .map(|ion| {
                    let override_rejection = spec.rejection_override(ion);
                    let base = match (override_rejection, classes.multiplier(ion.class())) {
                        (Some(rejection), _) => Some(rejection.complement()),
                        (None, Some(multiplier)) => Some(nominal_passage * multiplier),
                        (None, None) => None,
                    };
                    let passage = base.map_or(Passage::Unrejected, |base| {
                        Passage::Rejected(Rejection::clamped(1.0 - base * passage_factor))
                    });
                    (ion, passage)
                })
                .collect(),
        )
    }

    /// A fixed table typical of a new brackish-water element.
    #[must_use]
    pub fn standard() -> Self {
        let table = [
            (Ion::Ca, 99.0),
            (Ion::Mg, 99.0),
            (Ion::Na, 98.0),
            (Ion::K, 97.5),
            (Ion::Nh4, 97.0),
            (Ion::Ba, 99.0),
            (Ion::Sr, 99.0),
            (Ion::Cl, 98.0),
            (Ion::So4, 99.5),
            (Ion::Hco3, 97.0),
            (Ion::Co3, 99.0),
            (Ion::No3, 93.0),
            (Ion::F, 98.0),
            (Ion::Po4, 99.5),
            (Ion::Sio2, 98.0),
            (Ion::B, 65.0),
        ];

        let mut profile: BTreeMap<_, _> = table
            .into_iter()
            .map(|(ion, pct)| (ion, Passage::Rejected(Rejection::from_percent_clamped(pct))))
            .collect();
        profile.insert(Ion::Co2, Passage::Unrejected);
        Self(profile)
    }

    /// Passage of `ion`.
    #[must_use]
    pub fn passage(&self, ion: Ion) -> Passage {
        self.0.get(&ion).copied().unwrap_or(Passage::Unrejected)
    }

    /// Iterates over every species in key order.
    pub fn iter(&self) -> impl Iterator<Item = (Ion, Passage)> + '_ {
        self.0.iter().map(|(&ion, &passage)| (ion, passage))
    }
}

/// Product concentrations of one membrane pass.
#[derive(Debug, Clone, PartialEq)]
pub struct IonBalance {
    pub permeate: IonConcentrations,
    pub concentrate: IonConcentrations,
}

impl IonBalance {
    /// Splits `feed` across the products of `split`.
    ///
    /// Permeate is `Cf·(1 − R)`. Concentrate closes the solute balance
    /// `Qf·Cf = Qp·Cp + Qc·Cc`, and equals the feed when there is no
    /// concentrate flow.
    #[must_use]
    pub fn resolve(feed: &IonConcentrations, profile: &RejectionProfile, split: &FlowSplit) -> Self {
        let permeate = feed.map(|ion, cf| cf * profile.passage(ion).passed_fraction());

        let concentrate = if split.concentrate > VolumeRate::ZERO {
            let feed_ratio = (split.feed / split.concentrate).value;
            let permeate_ratio = (split.permeate / split.concentrate).value;
            feed.map(|ion, cf| (feed_ratio * cf - permeate_ratio * permeate.get(ion)).max(0.0))
        } else {
            feed.clone()
        };

        Self {
            permeate,
            concentrate,
        }
    }
}

/// Operating point for [`calculate_ion_passage`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IonPassageParameters {
    pub recovery_pct: f64,
    pub feed_ph: f64,
    pub temperature_c: f64,
    pub average_flux_lmh: f64,
}

impl Default for IonPassageParameters {
    fn default() -> Self {
        Self {
            recovery_pct: 75.0,
            feed_ph: 7.0,
            temperature_c: 25.0,
            average_flux_lmh: 20.0,
        }
    }
}

/// Result of [`calculate_ion_passage`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IonPassage {
    pub permeate_ions: IonConcentrations,
    pub concentrate_ions: IonConcentrations,
    /// Permeate TDS, mg/L.
    pub permeate_tds: f64,
    /// Concentrate LSI at the concentrate pH.
    pub lsi: Option<f64>,
    /// Concentration polarization factor at this operating point.
    pub beta: f64,
}

/// Single-pass water chemistry using [`RejectionProfile::standard`].
///
/// A quick estimate that needs no membrane or vessel layout; the full
/// engine derives rejections from the configured membranes instead.
#[must_use]
pub fn calculate_ion_passage(
    feed: &IonConcentrations,
    parameters: &IonPassageParameters,
) -> IonPassage {
    let chemistry = ChemistryParameters::default();
    let recovery = Recovery::from_percent_clamped(parameters.recovery_pct);
    let feed_ph = if parameters.feed_ph.is_finite() {
        parameters.feed_ph.clamp(0.0, 14.0)
    } else {
        7.0
    };
    let temperature = ThermodynamicTemperature::new::<degree_celsius>(parameters.temperature_c);

    let feed = feed.speciated(feed_ph, &chemistry);
    let split = FlowSplit::from_feed(FlowUnit::CubicMeterPerHour.to_volume_rate(1.0), recovery);
    let balance = IonBalance::resolve(&feed, &RejectionProfile::standard(), &split);

    let lsi = langelier_index(
        &balance.concentrate,
        concentrate_ph(feed_ph, recovery),
        temperature,
    );
    let beta = concentration_polarization(
        recovery.get(),
        FluxUnit::Lmh.to_flux(parameters.average_flux_lmh),
        &PolarizationParameters::default(),
    );

    IonPassage {
        permeate_tds: balance.permeate.tds(),
        permeate_ions: balance.permeate,
        concentrate_ions: balance.concentrate,
        lsi,
        beta,
    }
}
