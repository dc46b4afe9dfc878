//! Free-text and step-button channels.
//!
//! Text entry buffers keystrokes without touching the model, so transient
//! intermediate strings ("7.", "") are allowed; clamping and rounding only
//! happen when the buffer is committed on blur or Enter.

use thiserror::Error;

use crate::domain::ValueDomain;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EntryError {
    #[error("empty entry")]
    Empty,
    #[error("not a number: {0:?}")]
    Malformed(String),
}

/// Deferred-commit text input for one kind.
#[derive(Debug, Clone)]
pub struct DirectEntryChannel {
    domain: ValueDomain,
    buffer: String,
}

impl DirectEntryChannel {
    pub fn new(domain: ValueDomain) -> Self {
        DirectEntryChannel {
            domain,
            buffer: String::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Replace the buffer with the host input's current text. No parsing,
    /// no commit.
    pub fn set_text(&mut self, text: &str) {
        self.buffer.clear();
        self.buffer.push_str(text);
    }

    pub fn push_char(&mut self, ch: char) {
        self.buffer.push(ch);
    }

    /// Parse the buffer at the kind's display precision and return the
    /// candidate in internal units. The caller reverts the buffer via
    /// [`sync_to`](Self::sync_to) on error.
    pub fn commit(&self) -> Result<f64, EntryError> {
        let trimmed = self.buffer.trim();
        if trimmed.is_empty() {
            return Err(EntryError::Empty);
        }
        let display: f64 = trimmed
            .parse()
            .map_err(|_| EntryError::Malformed(trimmed.to_string()))?;
        if !display.is_finite() {
            return Err(EntryError::Malformed(trimmed.to_string()));
        }
        Ok(self.domain.internal(display))
    }

    /// Refresh the buffer from the committed value.
    pub fn sync_to(&mut self, value: i32) {
        self.buffer = self.domain.format(value);
    }
}

/// Fixed-delta increment/decrement. Candidates go through the same clamped
/// commit path as every other channel.
#[derive(Debug, Clone, Copy)]
pub struct StepChannel {
    delta: i32,
}

impl StepChannel {
    pub fn new(delta: i32) -> Self {
        StepChannel { delta }
    }

    pub fn delta(&self) -> i32 {
        self.delta
    }

    pub fn increment(&self, current: i32) -> f64 {
        (current + self.delta) as f64
    }

    pub fn decrement(&self, current: i32) -> f64 {
        (current - self.delta) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MeasurementKind;

    #[test]
    fn hba1c_entry_parses_display_units() {
        let mut e = DirectEntryChannel::new(MeasurementKind::Hba1c.domain());
        e.set_text("7.2");
        assert_eq!(e.commit(), Ok(72.0));
    }

    #[test]
    fn transient_invalid_buffers_are_allowed() {
        let mut e = DirectEntryChannel::new(MeasurementKind::Hba1c.domain());
        e.push_char('7');
        e.push_char('.');
        // Mid-typing state parses or fails only at commit time.
        assert_eq!(e.commit(), Ok(70.0));
        e.push_char('x');
        assert_eq!(e.commit(), Err(EntryError::Malformed("7.x".into())));
    }

    #[test]
    fn empty_and_malformed_are_rejected() {
        let mut e = DirectEntryChannel::new(MeasurementKind::Glucose.domain());
        assert_eq!(e.commit(), Err(EntryError::Empty));
        e.set_text("   ");
        assert_eq!(e.commit(), Err(EntryError::Empty));
        e.set_text("abc");
        assert!(matches!(e.commit(), Err(EntryError::Malformed(_))));
        e.set_text("inf");
        assert!(matches!(e.commit(), Err(EntryError::Malformed(_))));
    }

    #[test]
    fn sync_formats_at_kind_precision() {
        let mut e = DirectEntryChannel::new(MeasurementKind::Weight.domain());
        e.sync_to(705);
        assert_eq!(e.text(), "70.5");

        let mut e = DirectEntryChannel::new(MeasurementKind::Glucose.domain());
        e.sync_to(120);
        assert_eq!(e.text(), "120");
    }

    #[test]
    fn step_moves_by_fixed_delta() {
        let s = StepChannel::new(MeasurementKind::Weight.step_delta());
        assert_eq!(s.increment(700), 710.0);
        assert_eq!(s.decrement(700), 690.0);
    }
}
