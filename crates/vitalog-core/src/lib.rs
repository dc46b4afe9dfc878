//! Vitalog core: synchronized multi-channel capture of biometric readings.
//!
//! One canonical numeric value (blood glucose, HbA1c, body weight) kept
//! consistent across four input modalities: a scrollable ruler, free-text
//! entry, step buttons, and a circular gauge. Data flow is one-directional:
//! channels propose candidates, only [`model::ValueModel`] commits, and the
//! [`logger::ReadingLogger`] refreshes every channel view except the
//! origin's. Persistence and history are injected collaborator traits; the
//! core performs no I/O of its own.

pub mod angular;
pub mod bands;
pub mod config;
pub mod domain;
pub mod entry;
pub mod gauge;
pub mod logger;
pub mod model;
pub mod ruler;
pub mod scale;
pub mod submit;

#[cfg(test)]
pub mod tests_proptest;

pub use angular::AngularMapping;
pub use bands::{Band, BandError, BandTable};
pub use config::{CaptureConfig, ConfigError, GaugeConfig, RulerConfig};
pub use domain::{
    DomainError, LoggerId, Measurement, MeasurementKind, ReadingContext, ValueDomain,
};
pub use entry::{DirectEntryChannel, EntryError, StepChannel};
pub use gauge::AngularPickerEngine;
pub use logger::ReadingLogger;
pub use model::{Channel, Commit, ValueModel};
pub use ruler::RulerSyncEngine;
pub use scale::{tick_strip, ScaleMapping, Tick, TickClass, TickSpec};
pub use submit::{NoHistory, ReadingHistory, ReadingSink, SinkError, SubmitError};
