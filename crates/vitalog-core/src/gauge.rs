//! Pointer-driven channel: tap-to-jump and continuous drag on the circular
//! gauge.
//!
//! The drag lifecycle is a short-lived session object created on press and
//! torn down on release. Holding it as `Option<DragSession>` on the engine
//! *is* the listener registration: no move/release state survives release
//! or instance drop, wherever the release lands.

use crate::angular::AngularMapping;
use crate::config::GaugeConfig;
use crate::domain::ValueDomain;

/// State of one press->move*->release interaction.
#[derive(Debug, Clone, Copy)]
struct DragSession {
    last_pointer: (f64, f64),
}

#[derive(Debug, Clone)]
pub struct AngularPickerEngine {
    mapping: AngularMapping,
    pivot: (f64, f64),
    angle_deg: f64,
    session: Option<DragSession>,
}

impl AngularPickerEngine {
    pub fn new(domain: ValueDomain, config: &GaugeConfig) -> Self {
        let mapping = AngularMapping::new(domain, config.sweep_min_deg, config.sweep_max_deg);
        AngularPickerEngine {
            angle_deg: mapping.angle_for(domain.min),
            mapping,
            pivot: (config.pivot_x, config.pivot_y),
            session: None,
        }
    }

    pub fn mapping(&self) -> &AngularMapping {
        &self.mapping
    }

    /// Current pointer angle in degrees.
    pub fn angle_deg(&self) -> f64 {
        self.angle_deg
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Press opens a session and immediately yields a tap-to-jump candidate.
    pub fn press(&mut self, x: f64, y: f64) -> f64 {
        self.session = Some(DragSession {
            last_pointer: (x, y),
        });
        self.candidate_at(x, y)
    }

    /// Move events yield candidates only while a session is active; stray
    /// moves after release are ignored.
    pub fn drag_to(&mut self, x: f64, y: f64) -> Option<f64> {
        let session = self.session.as_mut()?;
        session.last_pointer = (x, y);
        Some(self.candidate_at(x, y))
    }

    /// Tear the session down. Returns whether one was active. Safe to call
    /// for releases outside the widget's bounds.
    pub fn release(&mut self) -> bool {
        self.session.take().is_some()
    }

    /// Programmatic reposition after another channel's write.
    pub fn sync_to(&mut self, value: i32) {
        self.angle_deg = self.mapping.angle_for(value);
    }

    fn candidate_at(&mut self, x: f64, y: f64) -> f64 {
        let angle = AngularMapping::pointer_angle(self.pivot.0, self.pivot.1, x, y);
        let (lo, hi) = self.mapping.sweep_deg();
        self.angle_deg = angle.clamp(lo, hi);
        self.mapping.value_at(angle) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GaugeConfig;
    use crate::domain::MeasurementKind;

    fn engine() -> AngularPickerEngine {
        AngularPickerEngine::new(MeasurementKind::Glucose.domain(), &GaugeConfig::default())
    }

    #[test]
    fn tap_jumps_to_pointer_value() {
        let mut g = engine();
        // Straight up from the (150, 150) pivot: symmetric sweep midpoint.
        let candidate = g.press(150.0, 30.0);
        assert_eq!(candidate, 220.0);
        assert!(g.is_dragging());
        assert!(g.release());
    }

    #[test]
    fn drag_requires_active_session() {
        let mut g = engine();
        assert_eq!(g.drag_to(150.0, 30.0), None);

        g.press(150.0, 30.0);
        assert!(g.drag_to(270.0, 150.0).is_some());
        g.release();
        assert_eq!(g.drag_to(150.0, 270.0), None);
    }

    #[test]
    fn release_without_press_is_noop() {
        let mut g = engine();
        assert!(!g.release());
    }

    #[test]
    fn angle_clamps_to_sweep_during_drag() {
        let mut g = engine();
        g.press(150.0, 30.0);
        // Straight down from the pivot: outside the -135..135 sweep.
        g.drag_to(149.0, 290.0);
        assert!(g.angle_deg() >= -135.0 && g.angle_deg() <= 135.0);
        g.release();
    }

    #[test]
    fn sync_to_tracks_mapping() {
        let mut g = engine();
        g.sync_to(220);
        assert!(g.angle_deg().abs() < 1e-9);
        g.sync_to(40);
        assert_eq!(g.angle_deg(), -135.0);
    }
}
