use std::fmt;

use serde::{Serialize, Serializer};

/// A process stream of the membrane train.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    Feed,
    Permeate,
    Concentrate,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Feed => "feed",
            Self::Permeate => "permeate",
            Self::Concentrate => "concentrate",
        })
    }
}

/// An operating limit violated by a design.
///
/// Warnings are advisory: they travel alongside a complete report.
/// Values are in the display unit named by `unit`, and stages are numbered
/// from one.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum DesignWarning {
    /// Highest element flux in a stage exceeds the recommended ceiling.
    FluxAboveLimit {
        stage: usize,
        flux: f64,
        limit: f64,
        unit: &'static str,
    },

    /// Feed flow per pressure vessel exceeds the element rating.
    FeedFlowPerVesselAboveLimit {
        stage: usize,
        flow: f64,
        limit: f64,
        unit: &'static str,
    },

    /// Pressure drop exceeds the available feed pressure.
    NegativeConcentratePressure {
        stage: usize,
        pressure: f64,
        unit: &'static str,
    },

    /// An osmotic pressure came out negative or not finite.
    InvalidOsmoticPressure {
        stream: Stream,
        value: f64,
        unit: &'static str,
    },

    /// No stage carries any membrane area.
    NoActiveMembraneArea,
}

impl fmt::Display for DesignWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FluxAboveLimit {
                stage,
                flux,
                limit,
                unit,
            } => write!(
                f,
                "stage {stage}: highest flux {flux:.1} {unit} exceeds the limit of {limit:.1} {unit}"
            ),
            Self::FeedFlowPerVesselAboveLimit {
                stage,
                flow,
                limit,
                unit,
            } => write!(
                f,
                "stage {stage}: feed flow per vessel {flow:.1} {unit} exceeds the limit of {limit:.1} {unit}"
            ),
            Self::NegativeConcentratePressure {
                stage,
                pressure,
                unit,
            } => write!(
                f,
                "stage {stage}: concentrate pressure would be {pressure:.2} {unit}, feed pressure cannot cover the pressure drop"
            ),
            Self::InvalidOsmoticPressure {
                stream,
                value,
                unit,
            } => write!(f, "{stream} osmotic pressure {value} {unit} is not valid"),
            Self::NoActiveMembraneArea => f.write_str("no active membrane area is configured"),
        }
    }
}

impl Serialize for DesignWarning {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_serialize_as_messages() {
        let warning = DesignWarning::FluxAboveLimit {
            stage: 1,
            flux: 31.96,
            limit: 20.0,
            unit: "gfd",
        };
        assert_eq!(
            serde_json::to_string(&warning).unwrap(),
            r#""stage 1: highest flux 32.0 gfd exceeds the limit of 20.0 gfd""#
        );
    }

    #[test]
    fn stream_names_appear_in_messages() {
        let warning = DesignWarning::InvalidOsmoticPressure {
            stream: Stream::Concentrate,
            value: -1.5,
            unit: "bar",
        };
        assert!(warning.to_string().starts_with("concentrate osmotic pressure"));
    }
}
