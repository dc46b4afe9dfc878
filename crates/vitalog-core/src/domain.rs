use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// The measurement kinds the capture widget knows how to log.
///
/// Each kind carries its own numeric domain, display unit, and step-button
/// delta. Values are held in *internal units* so step alignment stays exact:
/// glucose in mg/dL, HbA1c in tenths of a percent, weight in tenths of a
/// kilogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementKind {
    Glucose,
    Hba1c,
    Weight,
}

impl MeasurementKind {
    pub fn domain(self) -> ValueDomain {
        match self {
            MeasurementKind::Glucose => ValueDomain {
                min: 40,
                max: 400,
                step: 1,
                decimal_places: 0,
            },
            MeasurementKind::Hba1c => ValueDomain {
                min: 30,
                max: 150,
                step: 1,
                decimal_places: 1,
            },
            MeasurementKind::Weight => ValueDomain {
                min: 200,
                max: 2500,
                step: 1,
                decimal_places: 1,
            },
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            MeasurementKind::Glucose => "mg/dL",
            MeasurementKind::Hba1c => "%",
            MeasurementKind::Weight => "kg",
        }
    }

    /// Signed magnitude applied per press of the +/- step buttons, in
    /// internal units (glucose ±5 mg/dL, HbA1c ±0.1 %, weight ±1.0 kg).
    pub fn step_delta(self) -> i32 {
        match self {
            MeasurementKind::Glucose => 5,
            MeasurementKind::Hba1c => 1,
            MeasurementKind::Weight => 10,
        }
    }

    /// Seed used when the history collaborator has no prior reading.
    pub fn default_seed(self) -> i32 {
        match self {
            MeasurementKind::Glucose => 120,
            MeasurementKind::Hba1c => 70,
            MeasurementKind::Weight => 700,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MeasurementKind::Glucose => "glucose",
            MeasurementKind::Hba1c => "hba1c",
            MeasurementKind::Weight => "weight",
        }
    }

    pub fn from_text(s: &str) -> Option<Self> {
        match s {
            "glucose" => Some(MeasurementKind::Glucose),
            "hba1c" => Some(MeasurementKind::Hba1c),
            "weight" => Some(MeasurementKind::Weight),
            _ => None,
        }
    }
}

/// Inclusive numeric range, step granularity, and display precision for one
/// measurement kind, in internal units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueDomain {
    pub min: i32,
    pub max: i32,
    pub step: i32,
    pub decimal_places: u8,
}

impl ValueDomain {
    pub fn contains(&self, value: i32) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn is_aligned(&self, value: i32) -> bool {
        (value - self.min) % self.step == 0
    }

    pub fn span(&self) -> i32 {
        self.max - self.min
    }

    /// Clamp a candidate to the domain and round it to the nearest step,
    /// anchored at `min`. Returns `None` for NaN/infinite candidates so a
    /// malformed gesture can never produce an observable value.
    pub fn snap(&self, candidate: f64) -> Option<i32> {
        if !candidate.is_finite() {
            return None;
        }
        let clamped = candidate.clamp(self.min as f64, self.max as f64);
        let steps = ((clamped - self.min as f64) / self.step as f64).round() as i32;
        Some((self.min + steps * self.step).clamp(self.min, self.max))
    }

    /// Internal units -> display units (e.g. tenths of a percent -> percent).
    pub fn display(&self, value: i32) -> f64 {
        value as f64 / 10f64.powi(self.decimal_places as i32)
    }

    /// Display units -> internal units.
    pub fn internal(&self, display: f64) -> f64 {
        display * 10f64.powi(self.decimal_places as i32)
    }

    /// Format an internal value at the kind's display precision.
    pub fn format(&self, value: i32) -> String {
        format!(
            "{:.*}",
            self.decimal_places as usize,
            self.display(value)
        )
    }
}

/// Reading context captured alongside the value. The common clinical cases
/// are typed; anything else survives as free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingContext {
    Fasting,
    BeforeMeal,
    AfterMeal,
    Bedtime,
    Other(String),
}

impl ReadingContext {
    pub fn as_text(&self) -> &str {
        match self {
            ReadingContext::Fasting => "fasting",
            ReadingContext::BeforeMeal => "before_meal",
            ReadingContext::AfterMeal => "after_meal",
            ReadingContext::Bedtime => "bedtime",
            ReadingContext::Other(s) => s,
        }
    }

    pub fn from_text(s: &str) -> Self {
        match s {
            "fasting" => ReadingContext::Fasting,
            "before_meal" => ReadingContext::BeforeMeal,
            "after_meal" => ReadingContext::AfterMeal,
            "bedtime" => ReadingContext::Bedtime,
            other => ReadingContext::Other(other.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("value {value} outside domain [{min}, {max}]")]
    OutOfRange { value: i32, min: i32, max: i32 },
    #[error("value {value} not aligned to step {step}")]
    Misaligned { value: i32, step: i32 },
    #[error("unknown measurement kind: {0}")]
    UnknownKind(String),
    #[error("unit {got:?} does not match {expected:?}")]
    UnitMismatch { expected: String, got: String },
}

/// One finalized, persisted reading. Validated at construction: the value is
/// always in-domain and step-aligned, so a stored reading can never be
/// out of range. Deserialization runs the same checks, so a decoded reading
/// carries the same guarantee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMeasurement")]
pub struct Measurement {
    pub kind: MeasurementKind,
    /// Internal units (see [`MeasurementKind`]).
    pub value: i32,
    pub unit: String,
    pub context: ReadingContext,
    pub recorded_at_us: i64,
}

/// Unvalidated wire shape for [`Measurement`].
#[derive(Deserialize)]
struct RawMeasurement {
    kind: MeasurementKind,
    value: i32,
    unit: String,
    context: ReadingContext,
    recorded_at_us: i64,
}

impl TryFrom<RawMeasurement> for Measurement {
    type Error = DomainError;

    fn try_from(raw: RawMeasurement) -> Result<Self, DomainError> {
        if raw.unit != raw.kind.unit() {
            return Err(DomainError::UnitMismatch {
                expected: raw.kind.unit().to_string(),
                got: raw.unit,
            });
        }
        Measurement::new(raw.kind, raw.value, raw.context, raw.recorded_at_us)
    }
}

impl Measurement {
    pub fn new(
        kind: MeasurementKind,
        value: i32,
        context: ReadingContext,
        recorded_at_us: i64,
    ) -> Result<Self, DomainError> {
        let domain = kind.domain();
        if !domain.contains(value) {
            return Err(DomainError::OutOfRange {
                value,
                min: domain.min,
                max: domain.max,
            });
        }
        if !domain.is_aligned(value) {
            return Err(DomainError::Misaligned {
                value,
                step: domain.step,
            });
        }
        Ok(Measurement {
            kind,
            value,
            unit: kind.unit().to_string(),
            context,
            recorded_at_us,
        })
    }

    pub fn display_value(&self) -> f64 {
        self.kind.domain().display(self.value)
    }
}

/// Per-widget-instance identifier, used for log correlation only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerId([u8; 16]);

impl LoggerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().into_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl Default for LoggerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LoggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Uuid::from_bytes(self.0).fmt(f)
    }
}
