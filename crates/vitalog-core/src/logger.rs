//! The widget orchestrator: one canonical model, four channels, one-way
//! data flow.
//!
//! Any channel proposes a candidate; only the model commits; the logger
//! then refreshes every *other* channel's view from the committed value.
//! The origin channel's own view is never re-assigned from its own write,
//! which is what keeps the ruler from scroll-jittering against itself.

use crate::bands::{Band, BandTable};
use crate::config::CaptureConfig;
use crate::domain::{LoggerId, Measurement, MeasurementKind, ReadingContext};
use crate::entry::{DirectEntryChannel, EntryError, StepChannel};
use crate::gauge::AngularPickerEngine;
use crate::model::{Channel, Commit, ValueModel};
use crate::ruler::RulerSyncEngine;
use crate::submit::{ReadingHistory, ReadingSink, SubmitError};

/// One open capture widget. Owns its own model and channel engines; nothing
/// is shared across concurrently open loggers, so a glucose logger and an
/// HbA1c logger can never interfere.
///
/// The working value lives only in this struct: dropping the logger without
/// [`save`](Self::save) discards it with no side effects.
pub struct ReadingLogger {
    id: LoggerId,
    kind: MeasurementKind,
    model: ValueModel,
    ruler: RulerSyncEngine,
    gauge: AngularPickerEngine,
    entry: DirectEntryChannel,
    step: StepChannel,
    bands: BandTable,
    context: ReadingContext,
}

impl ReadingLogger {
    /// Open a widget instance, seeded from the history collaborator's most
    /// recent reading of this kind. A missing or failing history degrades
    /// to the kind's default seed; opening never fails.
    pub fn open(kind: MeasurementKind, config: &CaptureConfig, history: &dyn ReadingHistory) -> Self {
        let domain = kind.domain();
        let seed = match history.last_reading(kind) {
            Ok(Some(prior)) => prior.value,
            Ok(None) => kind.default_seed(),
            Err(e) => {
                log::warn!("history unavailable for {kind:?}, using default seed: {e}");
                kind.default_seed()
            }
        };

        let id = LoggerId::new();
        let model = ValueModel::new(domain, seed);
        let mut ruler = RulerSyncEngine::new(kind, domain, &config.ruler);
        let mut gauge = AngularPickerEngine::new(domain, &config.gauge);
        let mut entry = DirectEntryChannel::new(domain);

        // Initial positioning is a programmatic write with no origin.
        ruler.sync_to(model.value());
        gauge.sync_to(model.value());
        entry.sync_to(model.value());

        log::debug!("logger {id} opened for {kind:?} at {}", model.value());

        ReadingLogger {
            id,
            kind,
            model,
            ruler,
            gauge,
            entry,
            step: StepChannel::new(kind.step_delta()),
            bands: BandTable::builtin(kind),
            context: ReadingContext::Other(String::new()),
        }
    }

    pub fn id(&self) -> &LoggerId {
        &self.id
    }

    pub fn kind(&self) -> MeasurementKind {
        self.kind
    }

    /// Committed value in internal units.
    pub fn value(&self) -> i32 {
        self.model.value()
    }

    pub fn display_value(&self) -> f64 {
        self.model.display_value()
    }

    /// Status band for the current value.
    pub fn band(&self) -> &Band {
        self.bands.classify(self.model.value())
    }

    pub fn ruler(&self) -> &RulerSyncEngine {
        &self.ruler
    }

    pub fn gauge(&self) -> &AngularPickerEngine {
        &self.gauge
    }

    pub fn entry_text(&self) -> &str {
        self.entry.text()
    }

    pub fn set_context(&mut self, context: ReadingContext) {
        self.context = context;
    }

    /// Commit a candidate and fan the result out to every channel except
    /// the origin.
    pub fn write(&mut self, candidate: f64, origin: Channel) -> Commit {
        let commit = self.model.commit(candidate);
        if commit.changed {
            if origin != Channel::Ruler {
                self.ruler.sync_to(commit.value);
            }
            if origin != Channel::Gauge {
                self.gauge.sync_to(commit.value);
            }
            if origin != Channel::Entry {
                self.entry.sync_to(commit.value);
            }
        }
        commit
    }

    // ---- ruler channel ----

    /// Host scroll event. `None` when the event was the echo of our own
    /// programmatic reposition.
    pub fn scroll_ruler(&mut self, offset_px: f64) -> Option<Commit> {
        let candidate = self.ruler.on_scroll(offset_px)?;
        Some(self.write(candidate, Channel::Ruler))
    }

    // ---- gauge channel ----

    pub fn press_gauge(&mut self, x: f64, y: f64) -> Commit {
        let candidate = self.gauge.press(x, y);
        self.write(candidate, Channel::Gauge)
    }

    pub fn drag_gauge(&mut self, x: f64, y: f64) -> Option<Commit> {
        let candidate = self.gauge.drag_to(x, y)?;
        Some(self.write(candidate, Channel::Gauge))
    }

    pub fn release_gauge(&mut self) -> bool {
        self.gauge.release()
    }

    // ---- text entry channel ----

    /// Buffer keystrokes; nothing reaches the model until commit.
    pub fn type_entry(&mut self, text: &str) {
        self.entry.set_text(text);
    }

    /// Blur/Enter. Malformed input reverts the buffer to the last committed
    /// value; an out-of-range number commits clamped. Either way the buffer
    /// is normalized to what was actually stored. This is the channel's own
    /// blur handling, not model fan-out, so the one-way rule holds.
    pub fn commit_entry(&mut self) -> Result<Commit, EntryError> {
        match self.entry.commit() {
            Ok(candidate) => {
                let commit = self.write(candidate, Channel::Entry);
                self.entry.sync_to(commit.value);
                Ok(commit)
            }
            Err(e) => {
                log::debug!("entry rejected ({e}), reverting to {}", self.model.value());
                self.entry.sync_to(self.model.value());
                Err(e)
            }
        }
    }

    // ---- step channel ----

    pub fn step_up(&mut self) -> Commit {
        let candidate = self.step.increment(self.model.value());
        self.write(candidate, Channel::Step)
    }

    pub fn step_down(&mut self) -> Commit {
        let candidate = self.step.decrement(self.model.value());
        self.write(candidate, Channel::Step)
    }

    // ---- save ----

    /// Package the committed value into one Measurement and hand it to the
    /// sink. On failure the working value is untouched, so the caller can
    /// surface a transient notification and retry without re-entry.
    pub fn save(
        &self,
        sink: &dyn ReadingSink,
        recorded_at_us: i64,
    ) -> Result<Measurement, SubmitError> {
        let reading = Measurement::new(
            self.kind,
            self.model.value(),
            self.context.clone(),
            recorded_at_us,
        )?;
        sink.persist(&reading)?;
        log::debug!(
            "logger {} saved {:?} = {}",
            self.id,
            self.kind,
            reading.value
        );
        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submit::NoHistory;

    fn open(kind: MeasurementKind) -> ReadingLogger {
        ReadingLogger::open(kind, &CaptureConfig::default(), &NoHistory)
    }

    #[test]
    fn opens_at_default_seed_with_consistent_views() {
        let logger = open(MeasurementKind::Glucose);
        assert_eq!(logger.value(), 120);
        assert_eq!(logger.entry_text(), "120");
        assert_eq!(
            logger.ruler().offset_px(),
            logger.ruler().mapping().offset_for(120)
        );
        let angle = logger.gauge().angle_deg();
        assert_eq!(logger.gauge().mapping().value_at(angle), 120);
    }

    #[test]
    fn write_fans_out_to_other_channels_only() {
        let mut logger = open(MeasurementKind::Glucose);

        // A ruler-origin write repositions gauge and entry but must not arm
        // the ruler's own echo guard: the next user scroll still commits.
        let offset = logger.ruler().mapping().offset_for(200);
        let commit = logger.scroll_ruler(offset).unwrap();
        assert_eq!(commit.value, 200);
        assert_eq!(logger.entry_text(), "200");
        assert_eq!(logger.gauge().mapping().value_at(logger.gauge().angle_deg()), 200);

        let offset = logger.ruler().mapping().offset_for(210);
        assert!(logger.scroll_ruler(offset).is_some());
    }

    #[test]
    fn step_crosses_channels() {
        let mut logger = open(MeasurementKind::Weight);
        let before = logger.display_value();
        let commit = logger.step_up();
        assert_eq!(logger.kind().domain().display(commit.value), before + 1.0);
        // Ruler and entry views follow the step write.
        assert_eq!(logger.entry_text(), "71.0");
        assert_eq!(
            logger.ruler().offset_px(),
            logger.ruler().mapping().offset_for(commit.value)
        );
    }

    #[test]
    fn step_saturates_at_domain_max() {
        let mut logger = open(MeasurementKind::Glucose);
        logger.write(400.0, Channel::Step);
        let commit = logger.step_up();
        assert_eq!(commit.value, 400);
        assert!(commit.clamped);
    }

    #[test]
    fn malformed_entry_reverts_buffer() {
        let mut logger = open(MeasurementKind::Glucose);
        logger.type_entry("12x");
        assert!(logger.commit_entry().is_err());
        assert_eq!(logger.entry_text(), "120");
        assert_eq!(logger.value(), 120);
    }

    #[test]
    fn out_of_range_entry_commits_clamped() {
        let mut logger = open(MeasurementKind::Glucose);
        logger.type_entry("500");
        let commit = logger.commit_entry().unwrap();
        assert_eq!(commit.value, 400);
        assert!(commit.clamped);
        assert_eq!(logger.entry_text(), "400");
    }

    #[test]
    fn band_tracks_value() {
        let mut logger = open(MeasurementKind::Glucose);
        assert_eq!(logger.band().label, "In Range");
        logger.type_entry("300");
        logger.commit_entry().unwrap();
        assert_eq!(logger.band().label, "Very High");
    }
}
