//! Collaborator traits for persistence and history.
//!
//! The widget never caches readings itself: durable storage is an injected
//! [`ReadingSink`], and the most recent prior reading used to seed a new
//! widget instance comes from an injected [`ReadingHistory`]. The widget
//! inspects neither beyond success/failure.

use thiserror::Error;

use crate::domain::{DomainError, Measurement, MeasurementKind};

#[derive(Error, Debug)]
pub enum SinkError {
    /// The collaborator refused the reading (validation, quota, ...).
    #[error("storage rejected reading: {0}")]
    Rejected(String),
    /// The collaborator could not be reached or timed out. The widget's
    /// working value is preserved so the user can retry.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error(transparent)]
    Sink(#[from] SinkError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Durable storage for finalized readings.
pub trait ReadingSink {
    fn persist(&self, reading: &Measurement) -> Result<(), SinkError>;
}

/// Source of the most recent prior reading per kind. Used only to seed a
/// widget instance when it opens; it does not participate in live
/// synchronization.
pub trait ReadingHistory {
    fn last_reading(&self, kind: MeasurementKind) -> Result<Option<Measurement>, SinkError>;
}

/// Empty history: every widget opens at its kind's default seed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHistory;

impl ReadingHistory for NoHistory {
    fn last_reading(&self, _kind: MeasurementKind) -> Result<Option<Measurement>, SinkError> {
        Ok(None)
    }
}
