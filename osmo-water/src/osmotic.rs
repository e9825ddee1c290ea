use uom::si::{
    f64::{Pressure, ThermodynamicTemperature},
    pressure::bar,
    thermodynamic_temperature::kelvin,
};

use crate::IonConcentrations;

/// Universal gas constant in L·bar/(mol·K).
const GAS_CONSTANT: f64 = 0.083_144_626;

/// Osmotic pressure of a solution from the van 't Hoff relation.
///
/// `π = φ·R·T·Σcᵢ`, summing the molar concentrations of dissolved solids
/// and scaling by the osmotic coefficient `φ` to account for non-ideality.
/// An empty analysis has zero osmotic pressure.
#[must_use]
pub fn osmotic_pressure(
    water: &IonConcentrations,
    temperature: ThermodynamicTemperature,
    osmotic_coefficient: f64,
) -> Pressure {
    Pressure::new::<bar>(
        osmotic_coefficient * GAS_CONSTANT * temperature.get::<kelvin>() * water.molar_total(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::thermodynamic_temperature::degree_celsius;

    use crate::Ion;

    #[test]
    fn seawater_osmotic_pressure_is_realistic() {
        let seawater = IonConcentrations::new()
            .with(Ion::Na, 10_770.0)
            .with(Ion::Mg, 1_290.0)
            .with(Ion::Ca, 412.0)
            .with(Ion::K, 399.0)
            .with(Ion::Cl, 19_350.0)
            .with(Ion::So4, 2_710.0)
            .with(Ion::Hco3, 142.0);
        let t = ThermodynamicTemperature::new::<degree_celsius>(25.0);

        let pi = osmotic_pressure(&seawater, t, 0.93);
        assert!((24.0..30.0).contains(&pi.get::<bar>()), "got {pi:?}");
    }

    #[test]
    fn doubling_concentration_doubles_pressure() {
        let t = ThermodynamicTemperature::new::<degree_celsius>(25.0);
        let water = IonConcentrations::new().with(Ion::Na, 100.0).with(Ion::Cl, 154.0);
        let doubled = water.map(|_, c| 2.0 * c);

        assert_relative_eq!(
            osmotic_pressure(&doubled, t, 0.93).get::<bar>(),
            2.0 * osmotic_pressure(&water, t, 0.93).get::<bar>(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn empty_water_has_no_osmotic_pressure() {
        let t = ThermodynamicTemperature::new::<degree_celsius>(25.0);
        assert_relative_eq!(osmotic_pressure(&IonConcentrations::new(), t, 0.93).get::<bar>(), 0.0);
    }
}
