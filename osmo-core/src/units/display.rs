use serde::{Deserialize, Serialize};
use uom::si::{
    area::{square_foot, square_meter},
    f64::{Area, Pressure},
    pressure::{bar, pound_force_per_square_inch},
    velocity::meter_per_second,
};

use super::{Flux, LMH_IN_METERS_PER_SECOND, LMH_PER_GFD};

/// Units used to display flux.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FluxUnit {
    /// US gallons per square foot per day.
    Gfd,
    /// Liters per square meter per hour.
    Lmh,
}

impl FluxUnit {
    /// Display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Gfd => "gfd",
            Self::Lmh => "lmh",
        }
    }

    /// Converts a number in this unit to a flux quantity.
    #[must_use]
    pub fn to_flux(self, value: f64) -> Flux {
        let lmh = match self {
            Self::Gfd => value * LMH_PER_GFD,
            Self::Lmh => value,
        };
        Flux::new::<meter_per_second>(lmh * LMH_IN_METERS_PER_SECOND)
    }

    /// Expresses a flux quantity as a number in this unit.
    #[must_use]
    pub fn from_flux(self, flux: Flux) -> f64 {
        let lmh = flux.get::<meter_per_second>() / LMH_IN_METERS_PER_SECOND;
        match self {
            Self::Gfd => lmh / LMH_PER_GFD,
            Self::Lmh => lmh,
        }
    }
}

/// Units used to display pressure.
///
/// Pressure math always runs on [`Pressure`] quantities; these tags only
/// matter at the configuration and report boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PressureUnit {
    /// Pounds-force per square inch.
    Psi,
    /// Bar.
    Bar,
}

impl PressureUnit {
    /// Display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Psi => "psi",
            Self::Bar => "bar",
        }
    }

    /// Converts a number in this unit to a pressure quantity.
    #[must_use]
    pub fn to_pressure(self, value: f64) -> Pressure {
        match self {
            Self::Psi => Pressure::new::<pound_force_per_square_inch>(value),
            Self::Bar => Pressure::new::<bar>(value),
        }
    }

    /// Expresses a pressure quantity as a number in this unit.
    #[must_use]
    pub fn from_pressure(self, pressure: Pressure) -> f64 {
        match self {
            Self::Psi => pressure.get::<pound_force_per_square_inch>(),
            Self::Bar => pressure.get::<bar>(),
        }
    }
}

/// Units used to display membrane area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaUnit {
    SquareFoot,
    SquareMeter,
}

impl AreaUnit {
    /// Display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::SquareFoot => "ft2",
            Self::SquareMeter => "m2",
        }
    }

    /// Converts a number in this unit to an area quantity.
    #[must_use]
    pub fn to_area(self, value: f64) -> Area {
        match self {
            Self::SquareFoot => Area::new::<square_foot>(value),
            Self::SquareMeter => Area::new::<square_meter>(value),
        }
    }

    /// Expresses an area quantity as a number in this unit.
    #[must_use]
    pub fn from_area(self, area: Area) -> f64 {
        match self {
            Self::SquareFoot => area.get::<square_foot>(),
            Self::SquareMeter => area.get::<square_meter>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn gfd_and_lmh_agree() {
        let flux = FluxUnit::Gfd.to_flux(1.0);
        assert_relative_eq!(FluxUnit::Lmh.from_flux(flux), 1.697_743, epsilon = 1e-6);
        assert_relative_eq!(FluxUnit::Gfd.from_flux(flux), 1.0, max_relative = 1e-12);
    }

    #[test]
    fn bar_and_psi_agree() {
        let p = PressureUnit::Bar.to_pressure(1.0);
        assert_relative_eq!(PressureUnit::Psi.from_pressure(p), 14.503_77, epsilon = 1e-4);
    }

    #[test]
    fn square_feet_to_square_meters() {
        let a = AreaUnit::SquareFoot.to_area(400.0);
        assert_relative_eq!(AreaUnit::SquareMeter.from_area(a), 37.161_216, epsilon = 1e-6);
    }
}
