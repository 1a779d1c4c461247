//! Chord label debouncing and the confirmed-change timeline
//!
//! A proposed label must be continuously re-proposed for the dwell window
//! before it replaces the stable label. Each promotion that changes the
//! label appends a timeline event stamped with media time. The event log
//! is append-only; the only permitted mutation is the user override.

use crate::analysis::chord::{chord_text, ChordLabel};
use crate::analysis::result::TimelineEvent;
use crate::error::EngineError;

/// Dwell-time debouncer and timeline event log
pub struct ChordHysteresis {
    stable_ms: f32,
    last: Option<ChordLabel>,
    candidate: Option<ChordLabel>,
    candidate_since_ms: f64,
    events: Vec<TimelineEvent>,
}

impl ChordHysteresis {
    /// Create a debouncer with the given dwell window
    pub fn new(stable_ms: f32) -> Self {
        Self {
            stable_ms,
            last: None,
            candidate: None,
            candidate_since_ms: 0.0,
            events: Vec::new(),
        }
    }

    /// Feed one candidate label and return the stable label
    ///
    /// `None` stands for "no chord"; it debounces like any other label, so
    /// a single silent frame cannot clear a held chord.
    pub fn update(
        &mut self,
        proposed: Option<ChordLabel>,
        wall_ms: f64,
        media_time_s: f64,
    ) -> Option<ChordLabel> {
        if proposed == self.last {
            self.candidate_since_ms = wall_ms;
        } else if proposed != self.candidate {
            self.candidate = proposed;
            self.candidate_since_ms = wall_ms;
        } else if wall_ms - self.candidate_since_ms >= f64::from(self.stable_ms) {
            self.last = self.candidate;
            let text = chord_text(self.last);
            let differs = self
                .events
                .last()
                .map_or(self.last.is_some(), |event| event.chord != text);
            if differs {
                log::debug!("chord confirmed: {} at {:.2} s", text, media_time_s);
                self.events.push(TimelineEvent {
                    media_time_s,
                    chord: text,
                    confidence: 1.0,
                    overridden: false,
                    user_text: None,
                });
            }
        }
        self.last
    }

    /// The stable label, if any
    pub fn current(&self) -> Option<ChordLabel> {
        self.last
    }

    /// Immutable view of the timeline
    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    /// Mark an event as overridden and attach the user's text
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidEvent` when `index` is out of range.
    pub fn override_event(&mut self, index: usize, text: &str) -> Result<(), EngineError> {
        let event = self
            .events
            .get_mut(index)
            .ok_or(EngineError::InvalidEvent(index))?;
        event.overridden = true;
        event.user_text = Some(text.to_string());
        Ok(())
    }

    /// Clear the stable label, candidate, and event log
    pub fn reset(&mut self) {
        self.last = None;
        self.candidate = None;
        self.candidate_since_ms = 0.0;
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::chord::ChordQuality;

    const STABLE_MS: f32 = 320.0;

    fn c_major() -> Option<ChordLabel> {
        Some(ChordLabel::new(0, ChordQuality::Major))
    }

    fn g_major() -> Option<ChordLabel> {
        Some(ChordLabel::new(7, ChordQuality::Major))
    }

    #[test]
    fn test_promotion_requires_continuous_dwell() {
        let mut hysteresis = ChordHysteresis::new(STABLE_MS);
        assert_eq!(hysteresis.update(c_major(), 0.0, 0.0), None);
        assert_eq!(hysteresis.update(c_major(), 200.0, 0.2), None);
        assert_eq!(hysteresis.update(c_major(), 310.0, 0.31), None);
        assert_eq!(
            hysteresis.update(c_major(), 320.0, 0.32),
            c_major(),
            "candidate held for the full dwell must promote"
        );
    }

    #[test]
    fn test_interruption_restarts_dwell() {
        let mut hysteresis = ChordHysteresis::new(STABLE_MS);
        hysteresis.update(c_major(), 0.0, 0.0);
        hysteresis.update(c_major(), 200.0, 0.2);
        // A different candidate restarts the window
        hysteresis.update(g_major(), 250.0, 0.25);
        assert_eq!(hysteresis.update(g_major(), 500.0, 0.5), None);
        assert_eq!(hysteresis.update(g_major(), 570.0, 0.57), g_major());
    }

    #[test]
    fn test_matching_stable_label_refreshes() {
        let mut hysteresis = ChordHysteresis::new(STABLE_MS);
        for tick in 0..8 {
            hysteresis.update(c_major(), tick as f64 * 50.0, 0.0);
        }
        assert_eq!(hysteresis.current(), c_major());
        // Re-proposing the stable label never demotes it
        assert_eq!(hysteresis.update(c_major(), 10_000.0, 10.0), c_major());
    }

    #[test]
    fn test_event_appended_once_per_change() {
        let mut hysteresis = ChordHysteresis::new(STABLE_MS);
        for tick in 0..20 {
            hysteresis.update(c_major(), tick as f64 * 50.0, tick as f64 * 0.05);
        }
        assert_eq!(hysteresis.events().len(), 1);
        assert_eq!(hysteresis.events()[0].chord, "C");
        assert!(!hysteresis.events()[0].overridden);

        for tick in 20..40 {
            hysteresis.update(g_major(), tick as f64 * 50.0, tick as f64 * 0.05);
        }
        let events = hysteresis.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].chord, "G");
        assert!(
            events[1].media_time_s > events[0].media_time_s,
            "events must be appended in media-time order"
        );
    }

    #[test]
    fn test_no_event_for_initial_silence() {
        let mut hysteresis = ChordHysteresis::new(STABLE_MS);
        for tick in 0..100 {
            assert_eq!(hysteresis.update(None, tick as f64 * 50.0, 0.0), None);
        }
        assert!(hysteresis.events().is_empty());
    }

    #[test]
    fn test_silence_after_chord_appends_sentinel_event() {
        let mut hysteresis = ChordHysteresis::new(STABLE_MS);
        for tick in 0..20 {
            hysteresis.update(c_major(), tick as f64 * 50.0, tick as f64 * 0.05);
        }
        for tick in 20..40 {
            hysteresis.update(None, tick as f64 * 50.0, tick as f64 * 0.05);
        }
        assert_eq!(hysteresis.current(), None);
        let events = hysteresis.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].chord, "—");
    }

    #[test]
    fn test_override_marks_event() {
        let mut hysteresis = ChordHysteresis::new(STABLE_MS);
        for tick in 0..20 {
            hysteresis.update(c_major(), tick as f64 * 50.0, 0.0);
        }
        hysteresis.override_event(0, "Cadd9").unwrap();
        let event = &hysteresis.events()[0];
        assert!(event.overridden);
        assert_eq!(event.user_text.as_deref(), Some("Cadd9"));
        assert_eq!(event.chord, "C", "override must not rewrite the detected chord");

        assert_eq!(
            hysteresis.override_event(5, "nope"),
            Err(EngineError::InvalidEvent(5))
        );
    }

    #[test]
    fn test_reset_clears_log_and_state() {
        let mut hysteresis = ChordHysteresis::new(STABLE_MS);
        for tick in 0..20 {
            hysteresis.update(c_major(), tick as f64 * 50.0, 0.0);
        }
        hysteresis.reset();
        assert_eq!(hysteresis.current(), None);
        assert!(hysteresis.events().is_empty());
    }
}
