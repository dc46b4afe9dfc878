//! Scroll-driven channel: wires host scroll events to the scale mapping and
//! guards against the feedback loop where our own programmatic reposition
//! re-fires the scroll handler.

use crate::config::RulerConfig;
use crate::domain::{MeasurementKind, ValueDomain};
use crate::scale::{tick_strip, ScaleMapping, Tick, TickSpec};

/// One ruler instance: cached tick strip, current scroll offset, and the
/// echo guard armed by programmatic writes.
#[derive(Debug, Clone)]
pub struct RulerSyncEngine {
    mapping: ScaleMapping,
    ticks: Vec<Tick>,
    offset_px: f64,
    echo_tolerance_px: f64,
    /// Offset we last assigned programmatically. The next scroll event that
    /// lands within tolerance of it is our own echo, not user input.
    pending_echo: Option<f64>,
}

impl RulerSyncEngine {
    pub fn new(kind: MeasurementKind, domain: ValueDomain, config: &RulerConfig) -> Self {
        let mapping = ScaleMapping::new(domain, config.pitch_px, config.center_offset_px);
        let ticks = tick_strip(&mapping, &TickSpec::for_kind(kind));
        RulerSyncEngine {
            mapping,
            ticks,
            offset_px: 0.0,
            echo_tolerance_px: config.echo_tolerance_px,
            pending_echo: None,
        }
    }

    /// The rendered tick strip. Generated once per instance; rendering cost
    /// is proportional to the display range, not the sub-unit resolution.
    pub fn ticks(&self) -> &[Tick] {
        &self.ticks
    }

    pub fn offset_px(&self) -> f64 {
        self.offset_px
    }

    pub fn mapping(&self) -> &ScaleMapping {
        &self.mapping
    }

    /// Host scroll event. Returns the value candidate to commit, or `None`
    /// when the event is the echo of our own `sync_to` and must not feed
    /// back into another scroll assignment.
    pub fn on_scroll(&mut self, offset_px: f64) -> Option<f64> {
        if let Some(expected) = self.pending_echo {
            self.pending_echo = None;
            if (offset_px - expected).abs() <= self.echo_tolerance_px {
                log::trace!("swallowed scroll echo at {offset_px:.1}px");
                self.offset_px = offset_px;
                return None;
            }
            // A real user scroll disarms the guard and proceeds.
        }
        self.offset_px = offset_px;
        Some(self.mapping.value_at(offset_px) as f64)
    }

    /// Programmatic reposition after another channel's write. Arms the echo
    /// guard so the host's reflected scroll event is not re-committed.
    pub fn sync_to(&mut self, value: i32) {
        let offset = self.mapping.offset_for(value);
        self.offset_px = offset;
        self.pending_echo = Some(offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulerConfig;

    fn engine() -> RulerSyncEngine {
        RulerSyncEngine::new(
            MeasurementKind::Glucose,
            MeasurementKind::Glucose.domain(),
            &RulerConfig::default(),
        )
    }

    #[test]
    fn scroll_produces_candidate() {
        let mut r = engine();
        // 8 px per mg/dL: 640 px above min of 40.
        assert_eq!(r.on_scroll(640.0), Some(120.0));
        assert_eq!(r.offset_px(), 640.0);
    }

    #[test]
    fn sync_echo_is_swallowed_once() {
        let mut r = engine();
        r.sync_to(200);
        let expected = r.offset_px();

        // The host reflects our reposition back as a scroll event.
        assert_eq!(r.on_scroll(expected), None);
        // A second event at the same offset is genuine user input.
        assert_eq!(r.on_scroll(expected), Some(200.0));
    }

    #[test]
    fn user_scroll_disarms_stale_guard() {
        let mut r = engine();
        r.sync_to(200);
        // User scrolls somewhere else before the echo arrives: treat as input.
        assert_eq!(r.on_scroll(0.0), Some(40.0));
    }

    #[test]
    fn sync_positions_match_mapping() {
        let mut r = engine();
        r.sync_to(120);
        assert_eq!(r.offset_px(), r.mapping().offset_for(120));
    }
}
