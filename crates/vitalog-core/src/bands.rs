//! Status-band classification: a declarative threshold table mapping every
//! in-domain value to exactly one label/color.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::MeasurementKind;

#[derive(Error, Debug)]
pub enum BandError {
    #[error("band table for {0:?} is empty")]
    Empty(MeasurementKind),
    #[error("band uppers must be strictly increasing: {prev} then {next}")]
    NonIncreasing { prev: i32, next: i32 },
    #[error("last band upper {upper} must equal domain max {max}")]
    NotExhaustive { upper: i32, max: i32 },
}

/// One classification band. `upper` is the inclusive upper bound in
/// internal units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    pub upper: i32,
    pub label: String,
    pub color: String,
}

impl Band {
    fn new(upper: i32, label: &str, color: &str) -> Self {
        Band {
            upper,
            label: label.to_string(),
            color: color.to_string(),
        }
    }
}

/// Ordered band table for one kind. Invariants checked at construction:
/// non-empty, strictly increasing uppers, jointly exhaustive over the
/// domain (last upper == domain max). Deserialization goes through the
/// same checks, so a decoded table is never degenerate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawBandTable")]
pub struct BandTable {
    kind: MeasurementKind,
    bands: Vec<Band>,
}

/// Unvalidated wire shape for [`BandTable`].
#[derive(Deserialize)]
struct RawBandTable {
    kind: MeasurementKind,
    bands: Vec<Band>,
}

impl TryFrom<RawBandTable> for BandTable {
    type Error = BandError;

    fn try_from(raw: RawBandTable) -> Result<Self, BandError> {
        BandTable::new(raw.kind, raw.bands)
    }
}

impl BandTable {
    pub fn new(kind: MeasurementKind, bands: Vec<Band>) -> Result<Self, BandError> {
        let Some(last) = bands.last() else {
            return Err(BandError::Empty(kind));
        };
        for pair in bands.windows(2) {
            if pair[1].upper <= pair[0].upper {
                return Err(BandError::NonIncreasing {
                    prev: pair[0].upper,
                    next: pair[1].upper,
                });
            }
        }
        let max = kind.domain().max;
        if last.upper != max {
            return Err(BandError::NotExhaustive {
                upper: last.upper,
                max,
            });
        }
        Ok(BandTable { kind, bands })
    }

    /// The clinical defaults: glucose uses the standard 54/70/180/250
    /// cutoffs, HbA1c the 5.6%/6.4% diagnostic thresholds.
    pub fn builtin(kind: MeasurementKind) -> Self {
        let bands = match kind {
            MeasurementKind::Glucose => vec![
                Band::new(54, "Very Low", "crit-low"),
                Band::new(70, "Low", "warn-low"),
                Band::new(180, "In Range", "ok"),
                Band::new(250, "High", "warn-high"),
                Band::new(400, "Very High", "crit-high"),
            ],
            MeasurementKind::Hba1c => vec![
                Band::new(56, "Normal", "ok"),
                Band::new(64, "Elevated", "warn-high"),
                Band::new(150, "High", "crit-high"),
            ],
            MeasurementKind::Weight => vec![
                Band::new(450, "Underweight", "warn-low"),
                Band::new(900, "Typical", "ok"),
                Band::new(1200, "Elevated", "warn-high"),
                Band::new(2500, "Very High", "crit-high"),
            ],
        };
        // Validated by the builtin_tables_are_valid test; the literals above
        // satisfy the constructor invariants.
        BandTable { kind, bands }
    }

    pub fn kind(&self) -> MeasurementKind {
        self.kind
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    /// First band whose upper bound is >= value; the last band when the
    /// value exceeds every bound. Total and deterministic.
    pub fn classify(&self, value: i32) -> &Band {
        self.bands
            .iter()
            .find(|b| b.upper >= value)
            .unwrap_or_else(|| &self.bands[self.bands.len() - 1])
    }
}
