use crate::coordinator::DetailCoordinator;
use crate::engine::{ActiveIndices, ClockModel, RingRotations, TimeState};
use crate::events::AppEvent;
use crate::panel::DetailPanel;
use chrono::NaiveDateTime;
use psalter::VerseLookup;
use std::fmt;

/// Text stacked in the middle of the dial.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CenterLabels {
    pub day: String,
    pub title: String,
    pub spirit: String,
    pub pentacle: String,
}

impl CenterLabels {
    pub fn new(title: &str, state: &TimeState<'_>) -> Self {
        Self {
            day: state.day_label(),
            title: title.to_string(),
            spirit: state.spirit_label(),
            pentacle: state.pentacle_label(),
        }
    }
}

impl fmt::Display for CenterLabels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.day)?;
        writeln!(f, "{}", self.title)?;
        if !self.spirit.is_empty() {
            writeln!(f, "{}", self.spirit)?;
        }
        if !self.pentacle.is_empty() {
            writeln!(f, "{}", self.pentacle)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    pub rotations: RingRotations,
    pub indices: ActiveIndices,
    pub labels: CenterLabels,
    pub selection_changed: bool,
}

/// What an event changed, so the caller only repaints what it has to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Update {
    pub labels_changed: bool,
    pub panel_changed: bool,
    pub quit: bool,
}

pub struct AppModel<S> {
    clock: ClockModel,
    coordinator: DetailCoordinator<S>,
    clock_format: String,
    labels: CenterLabels,
    last_frame: Option<FrameOutput>,
}

impl<S: VerseLookup> AppModel<S> {
    pub fn new(clock: ClockModel, coordinator: DetailCoordinator<S>, clock_format: &str) -> Self {
        Self {
            clock,
            coordinator,
            clock_format: clock_format.to_string(),
            labels: CenterLabels::default(),
            last_frame: None,
        }
    }

    pub fn clock(&self) -> &ClockModel {
        &self.clock
    }

    pub fn coordinator(&self) -> &DetailCoordinator<S> {
        &self.coordinator
    }

    pub fn labels(&self) -> &CenterLabels {
        &self.labels
    }

    pub fn panel(&self) -> &DetailPanel {
        self.coordinator.panel()
    }

    pub fn last_frame(&self) -> Option<&FrameOutput> {
        self.last_frame.as_ref()
    }

    /// One pass of the per-frame path: fractions, indices and rotations are
    /// recomputed from `now`, and the coordinator is told which pentacle is
    /// active.
    pub fn advance_frame(&mut self, now: &NaiveDateTime) -> FrameOutput {
        let state = self.clock.time_state(now, &self.clock_format);
        let rotations = self.clock.rotations(&state);
        let labels = CenterLabels::new(&self.clock.core.name, &state);
        let selection_changed = self.coordinator.on_selection_changed(state.active.pentacle);

        log::trace!(
            "frame {}: fractions {:?}, indices {:?}",
            now,
            state.fractions,
            state.indices
        );

        FrameOutput {
            rotations,
            indices: state.indices,
            labels,
            selection_changed,
        }
    }

    pub fn update(&mut self, event: AppEvent) -> Update {
        match event {
            AppEvent::Frame(now) => {
                let frame = self.advance_frame(&now);
                let labels_changed = frame.labels != self.labels;
                if labels_changed {
                    self.labels = frame.labels.clone();
                }
                let panel_changed = frame.selection_changed;
                self.last_frame = Some(frame);

                Update {
                    labels_changed,
                    panel_changed,
                    quit: false,
                }
            }
            AppEvent::VersesResolved(completion) => Update {
                panel_changed: self.coordinator.apply(completion),
                ..Update::default()
            },
            AppEvent::Shutdown => {
                log::info!("Shutting down");
                Update {
                    quit: true,
                    ..Update::default()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::Generation;
    use crate::data::{PsalmDocument, PsalmMap, fixtures};
    use crate::panel::EntryText;
    use async_channel::Receiver;
    use chrono::NaiveDate;
    use psalter::{ServiceError, VerseCache, VerseRequest};

    struct EchoService;

    impl VerseLookup for EchoService {
        async fn lookup(&self, request: &VerseRequest) -> Result<String, ServiceError> {
            Ok(format!(
                "{} {}",
                request.chapter,
                request.verse.as_ref().map(|v| v.as_str()).unwrap_or("")
            ))
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn app() -> (AppModel<EchoService>, Receiver<AppEvent>) {
        let document: PsalmDocument = serde_json::from_value(serde_json::json!({
            "pentacles": [
                {"planet": "Sun", "pentacle": 0, "psalms": [{"number": 19, "verses": "1-2"}]},
                {"planet": "Moon", "pentacle": 1, "psalms": [{"number": 107, "verses": "16"}]}
            ]
        }))
        .unwrap();

        let (tx, rx) = async_channel::bounded(32);
        let coordinator = DetailCoordinator::new(
            VerseCache::new(EchoService),
            PsalmMap::from_document(document),
            tx,
            tokio::runtime::Handle::current(),
        );
        let clock = ClockModel::new(fixtures::clock_data());
        (AppModel::new(clock, coordinator, "%H:%M"), rx)
    }

    #[tokio::test]
    async fn test_frame_output() {
        let (mut app, _rx) = app();
        let frame = app.advance_frame(&at(2023, 1, 1, 0, 0));

        assert!(frame.selection_changed);
        assert_eq!(frame.indices.spirit, Some(0));
        assert_eq!(frame.indices.pentacle, Some(0));
        assert_eq!(frame.labels.day, "Sunday – Sun • 00:00");
        assert_eq!(frame.labels.title, "Master Seal");
        assert_eq!(frame.labels.spirit, "Sign0 0–30 • Spirit0");
        assert_eq!(frame.labels.pentacle, "Pentacle of Sun #0: Focus of Sun");

        // the next frame on the same day keeps the selection
        let later = app.advance_frame(&at(2023, 1, 1, 0, 1));
        assert!(!later.selection_changed);
        assert_eq!(app.coordinator().generation(), Generation::default().next());
    }

    #[tokio::test]
    async fn test_events_drive_panel() {
        let (mut app, rx) = app();

        let update = app.update(AppEvent::Frame(at(2023, 1, 1, 12, 0)));
        assert!(update.labels_changed);
        assert!(update.panel_changed);
        assert!(app.panel().entries()[0].text.is_loading());

        let update = app.update(AppEvent::Frame(at(2023, 1, 1, 12, 0)));
        assert_eq!(update, Update::default());

        let event = rx.recv().await.unwrap();
        let update = app.update(event);
        assert!(update.panel_changed);
        assert_eq!(
            app.panel().entries()[0].text,
            EntryText::Ready("19 1\n\n19 2".into())
        );

        // Monday moves both the planetary group and the pentacle
        let update = app.update(AppEvent::Frame(at(2023, 1, 2, 6, 0)));
        assert!(update.panel_changed);
        assert_eq!(app.labels().pentacle, "Pentacle of Moon #1: Focus of Moon");

        assert!(app.update(AppEvent::Shutdown).quit);
    }

    #[test]
    fn test_labels_display() {
        let labels = CenterLabels {
            day: "Sunday – Sun • 00:00".into(),
            title: "Master Seal".into(),
            spirit: String::new(),
            pentacle: String::new(),
        };
        assert_eq!(labels.to_string(), "Sunday – Sun • 00:00\nMaster Seal\n");
    }
}
