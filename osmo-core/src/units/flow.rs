use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uom::si::{f64::VolumeRate, volume_rate::cubic_meter_per_second};

use super::{AreaUnit, FluxUnit, PressureUnit, UnknownUnit, normalize_tag};

/// Volumetric flow units accepted on configuration input.
///
/// Unknown tags do not fail deserialization; they fall back to the default
/// unit (m³/h, whose factor to the internal basis is one) with a logged
/// warning. Use [`str::parse`] when a strict check is wanted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FlowUnit {
    /// US gallons per minute.
    Gpm,
    /// Cubic meters per hour.
    #[default]
    CubicMeterPerHour,
    /// Cubic meters per day.
    CubicMeterPerDay,
    /// US gallons per day.
    Gpd,
    /// Million US gallons per day.
    Mgd,
    /// Million imperial gallons per day.
    Migd,
    /// Megaliters per day.
    Mld,
}

/// Family of display units implied by a [`FlowUnit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitSystem {
    /// gfd, psi, ft².
    Us,
    /// LMH, bar, m².
    Metric,
}

impl FlowUnit {
    /// Every supported flow unit, in declaration order.
    pub const ALL: [FlowUnit; 7] = [
        FlowUnit::Gpm,
        FlowUnit::CubicMeterPerHour,
        FlowUnit::CubicMeterPerDay,
        FlowUnit::Gpd,
        FlowUnit::Mgd,
        FlowUnit::Migd,
        FlowUnit::Mld,
    ];

    /// Parses a unit tag, falling back to the default unit when unrecognized.
    #[must_use]
    pub fn parse_lenient(tag: &str) -> Self {
        tag.parse().unwrap_or_else(|err: UnknownUnit| {
            let fallback = Self::default();
            log::warn!("{err}, treating flow as {fallback}");
            fallback
        })
    }

    /// Canonical display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Gpm => "gpm",
            Self::CubicMeterPerHour => "m3/h",
            Self::CubicMeterPerDay => "m3/d",
            Self::Gpd => "gpd",
            Self::Mgd => "mgd",
            Self::Migd => "migd",
            Self::Mld => "mld",
        }
    }

    /// Number of cubic meters per hour in one of this unit.
    #[must_use]
    pub fn cubic_meters_per_hour(self) -> f64 {
        const US_GALLON_M3: f64 = 3.785_411_784e-3;
        const IMPERIAL_GALLON_M3: f64 = 4.546_09e-3;

        match self {
            Self::Gpm => US_GALLON_M3 * 60.0,
            Self::CubicMeterPerHour => 1.0,
            Self::CubicMeterPerDay => 1.0 / 24.0,
            Self::Gpd => US_GALLON_M3 / 24.0,
            Self::Mgd => US_GALLON_M3 * 1.0e6 / 24.0,
            Self::Migd => IMPERIAL_GALLON_M3 * 1.0e6 / 24.0,
            Self::Mld => 1000.0 / 24.0,
        }
    }

    /// Converts a number in this unit to a flow quantity.
    #[must_use]
    pub fn to_volume_rate(self, value: f64) -> VolumeRate {
        VolumeRate::new::<cubic_meter_per_second>(value * self.cubic_meters_per_hour() / 3600.0)
    }

    /// Expresses a flow quantity as a number in this unit.
    #[must_use]
    pub fn from_volume_rate(self, flow: VolumeRate) -> f64 {
        flow.get::<cubic_meter_per_second>() * 3600.0 / self.cubic_meters_per_hour()
    }

    /// Display unit family this flow unit belongs to.
    #[must_use]
    pub fn system(self) -> UnitSystem {
        match self {
            Self::Gpm | Self::Gpd | Self::Mgd | Self::Migd => UnitSystem::Us,
            Self::CubicMeterPerHour | Self::CubicMeterPerDay | Self::Mld => UnitSystem::Metric,
        }
    }

    /// Flux unit used to display results for this flow unit.
    #[must_use]
    pub fn flux_unit(self) -> FluxUnit {
        match self.system() {
            UnitSystem::Us => FluxUnit::Gfd,
            UnitSystem::Metric => FluxUnit::Lmh,
        }
    }

    /// Pressure unit used to display results for this flow unit.
    #[must_use]
    pub fn pressure_unit(self) -> PressureUnit {
        match self.system() {
            UnitSystem::Us => PressureUnit::Psi,
            UnitSystem::Metric => PressureUnit::Bar,
        }
    }

    /// Area unit used to display results for this flow unit.
    #[must_use]
    pub fn area_unit(self) -> AreaUnit {
        match self.system() {
            UnitSystem::Us => AreaUnit::SquareFoot,
            UnitSystem::Metric => AreaUnit::SquareMeter,
        }
    }
}

impl FromStr for FlowUnit {
    type Err = UnknownUnit;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match normalize_tag(tag).as_str() {
            "gpm" | "gal/min" | "usgpm" => Ok(Self::Gpm),
            "m3/h" | "m3/hr" | "m3h" | "cmh" => Ok(Self::CubicMeterPerHour),
            "m3/d" | "m3/day" | "m3d" | "cmd" => Ok(Self::CubicMeterPerDay),
            "gpd" | "gal/d" | "gal/day" => Ok(Self::Gpd),
            "mgd" => Ok(Self::Mgd),
            "migd" => Ok(Self::Migd),
            "mld" | "ml/d" => Ok(Self::Mld),
            _ => Err(UnknownUnit(tag.to_string())),
        }
    }
}

impl From<String> for FlowUnit {
    fn from(tag: String) -> Self {
        Self::parse_lenient(&tag)
    }
}

impl From<FlowUnit> for String {
    fn from(unit: FlowUnit) -> Self {
        unit.label().to_string()
    }
}

impl fmt::Display for FlowUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
