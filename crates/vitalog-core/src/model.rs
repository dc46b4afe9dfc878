//! Canonical value state shared by every input channel.

use serde::{Deserialize, Serialize};

use crate::domain::ValueDomain;

/// The input modalities capable of writing the canonical value. A write
/// carries its origin so the orchestrator can refresh every *other*
/// channel's view without re-entering the origin's own update path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    Ruler,
    Gauge,
    Entry,
    Step,
}

/// Outcome of one write to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commit {
    /// The canonical value after the write, in internal units.
    pub value: i32,
    /// False when the candidate was non-finite or snapped back to the
    /// current value.
    pub changed: bool,
    /// True when the candidate fell outside the domain and was pulled to a
    /// boundary. Clamps are silent toward the user.
    pub clamped: bool,
}

/// Single source of truth for the working value. Every channel proposes
/// candidates; only the model stores. The stored value is in-domain and
/// step-aligned at every observable moment.
#[derive(Debug, Clone)]
pub struct ValueModel {
    domain: ValueDomain,
    value: i32,
}

impl ValueModel {
    /// Seed is snapped into the domain, so even a stale or out-of-range
    /// prior reading yields a valid starting value.
    pub fn new(domain: ValueDomain, seed: i32) -> Self {
        let value = domain.snap(seed as f64).unwrap_or(domain.min);
        ValueModel { domain, value }
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn domain(&self) -> &ValueDomain {
        &self.domain
    }

    pub fn display_value(&self) -> f64 {
        self.domain.display(self.value)
    }

    /// Clamp the candidate to the domain, round it to the nearest step, and
    /// store it. Non-finite candidates are dropped and the previous value
    /// retained.
    pub fn commit(&mut self, candidate: f64) -> Commit {
        let Some(snapped) = self.domain.snap(candidate) else {
            log::debug!("dropped non-finite candidate {candidate}");
            return Commit {
                value: self.value,
                changed: false,
                clamped: false,
            };
        };
        let clamped = candidate < self.domain.min as f64 || candidate > self.domain.max as f64;
        if clamped {
            log::trace!(
                "clamped candidate {candidate} into [{}, {}]",
                self.domain.min,
                self.domain.max
            );
        }
        let changed = snapped != self.value;
        self.value = snapped;
        Commit {
            value: snapped,
            changed,
            clamped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MeasurementKind;

    #[test]
    fn commit_clamps_boundaries() {
        let d = MeasurementKind::Glucose.domain();
        let mut m = ValueModel::new(d, 120);

        let c = m.commit(500.0);
        assert_eq!(c.value, 400);
        assert!(c.clamped);
        assert!(c.changed);

        let c = m.commit(39.0);
        assert_eq!(c.value, 40);
        assert!(c.clamped);
    }

    #[test]
    fn commit_drops_non_finite() {
        let d = MeasurementKind::Weight.domain();
        let mut m = ValueModel::new(d, 700);

        let c = m.commit(f64::NAN);
        assert_eq!(c.value, 700);
        assert!(!c.changed);
        assert!(!c.clamped);

        let c = m.commit(f64::NEG_INFINITY);
        assert_eq!(c.value, 700);
        assert!(!c.changed);
    }

    #[test]
    fn redundant_commit_reports_unchanged() {
        let d = MeasurementKind::Hba1c.domain();
        let mut m = ValueModel::new(d, 70);
        let c = m.commit(70.2);
        assert_eq!(c.value, 70);
        assert!(!c.changed);
    }

    #[test]
    fn seed_outside_domain_is_snapped() {
        let d = MeasurementKind::Glucose.domain();
        let m = ValueModel::new(d, 9999);
        assert_eq!(m.value(), 400);
    }
}
