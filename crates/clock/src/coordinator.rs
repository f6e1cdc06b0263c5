use crate::data::{PentacleKey, PsalmMap};
use crate::engine::FlatPentacle;
use crate::events::AppEvent;
use crate::panel::{DetailPanel, EntryText};
use async_channel::Sender;
use derive_more::Display;
use futures_util::future::join_all;
use psalter::{Chapter, ServiceError, VerseCache, VerseLookup, VerseNumber, VerseSpec};
use std::sync::Arc;
use tokio::runtime::Handle;

/// Epoch of the current selection. Completions carrying an older value are
/// stale and get dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Display)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Verse text for one panel entry, tagged with the selection it was fetched for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseCompletion {
    pub generation: Generation,
    pub slot: usize,
    pub text: EntryText,
}

/// Keeps the detail panel in step with the active pentacle.
///
/// The frame loop reports the active pentacle every frame; only an actual
/// change of pentacle rebuilds the panel and starts verse lookups. Lookups run
/// as tasks on the runtime behind the given [`Handle`], so the caller does not
/// need to be inside it, and report back through the event channel, where
/// [`DetailCoordinator::apply`] discards anything fetched for a superseded
/// selection.
pub struct DetailCoordinator<S> {
    last_key: Option<PentacleKey>,
    generation: Generation,
    verses: Arc<VerseCache<S>>,
    psalms: PsalmMap,
    panel: DetailPanel,
    events: Sender<AppEvent>,
    runtime: Handle,
}

impl<S: VerseLookup> DetailCoordinator<S> {
    pub fn new(
        verses: VerseCache<S>,
        psalms: PsalmMap,
        events: Sender<AppEvent>,
        runtime: Handle,
    ) -> Self {
        Self {
            last_key: None,
            generation: Generation::default(),
            verses: Arc::new(verses),
            psalms,
            panel: DetailPanel::Idle,
            events,
            runtime,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn panel(&self) -> &DetailPanel {
        &self.panel
    }

    pub fn verses(&self) -> &VerseCache<S> {
        &self.verses
    }

    pub fn subtitle(&self) -> Option<String> {
        self.psalms
            .numbering
            .as_ref()
            .map(|n| format!("Live mapping for the active planetary pentacle ({}).", n))
    }

    /// Returns `false` when `active` is the pentacle already shown.
    pub fn on_selection_changed(&mut self, active: Option<&FlatPentacle>) -> bool {
        let key = active.map(FlatPentacle::key);
        if key == self.last_key {
            return false;
        }

        self.generation = self.generation.next();
        log::debug!(
            "Selection changed to {} (generation {})",
            key.as_ref().map(ToString::to_string).unwrap_or_else(|| "none".into()),
            self.generation
        );
        self.last_key = key;

        let Some(pentacle) = active else {
            self.panel = DetailPanel::Idle;
            return true;
        };

        let citations = self.psalms.get(&pentacle.key());
        self.panel = DetailPanel::for_pentacle(pentacle, citations, self.verses.book());

        for (slot, citation) in citations.iter().enumerate() {
            if let VerseSpec::Verses(verses) = citation.spec() {
                self.dispatch(slot, citation.chapter(), verses);
            }
        }
        true
    }

    fn dispatch(&self, slot: usize, chapter: Chapter, verses: Vec<VerseNumber>) {
        let generation = self.generation;
        let cache = Arc::clone(&self.verses);
        let events = self.events.clone();

        self.runtime.spawn(async move {
            let mut lookups = Vec::with_capacity(verses.len());
            for verse in &verses {
                lookups.push(cache.get(&chapter, Some(verse)));
            }
            let results = join_all(lookups).await;
            let completion = VerseCompletion {
                generation,
                slot,
                text: combine(&chapter, results),
            };
            let _ = events.send(AppEvent::VersesResolved(completion)).await;
        });
    }

    /// Writes a finished lookup into the panel unless a newer selection has
    /// replaced the one it was started for.
    pub fn apply(&mut self, completion: VerseCompletion) -> bool {
        if completion.generation != self.generation {
            log::debug!(
                "Dropping stale verse text (generation {}, current {})",
                completion.generation,
                self.generation
            );
            return false;
        }

        match self.panel.entry_mut(completion.slot) {
            Some(entry) => {
                entry.text = completion.text;
                true
            }
            None => false,
        }
    }
}

fn combine(chapter: &Chapter, results: Vec<Result<String, ServiceError>>) -> EntryText {
    let mut texts = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(text) if !text.is_empty() => texts.push(text),
            Ok(_) => {}
            Err(e) => {
                log::warn!("Failed to fetch verse text for chapter {}: {}", chapter, e);
                return EntryText::FetchFailed;
            }
        }
    }

    if texts.is_empty() {
        EntryText::NoText
    } else {
        EntryText::Ready(texts.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Pentacle, PsalmDocument};
    use async_channel::Receiver;
    use psalter::VerseRequest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeService {
        calls: AtomicUsize,
    }

    impl VerseLookup for FakeService {
        async fn lookup(&self, request: &VerseRequest) -> Result<String, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if request.chapter.as_str() == "666" {
                return Err(ServiceError::Status(500));
            }
            if request.chapter.as_str() == "0" {
                return Ok(String::new());
            }
            Ok(format!(
                "{}:{}",
                request.chapter,
                request.verse.as_ref().map(VerseNumber::as_str).unwrap_or("")
            ))
        }
    }

    fn psalms() -> PsalmMap {
        let document: PsalmDocument = serde_json::from_value(serde_json::json!({
            "pentacles": [
                {"planet": "Sun", "pentacle": 1, "psalms": [
                    {"number": 91, "verses": "1-3"},
                    {"number": 23}
                ]},
                {"planet": "Moon", "pentacle": 1, "psalms": [{"number": 121, "verses": "1"}]},
                {"planet": "Mars", "pentacle": 1, "psalms": [
                    {"number": 666, "verses": "1"},
                    {"number": 3, "verses": "3"}
                ]},
                {"planet": "Venus", "pentacle": 1, "psalms": [{"number": 0, "verses": "1"}]}
            ]
        }))
        .unwrap();
        PsalmMap::from_document(document)
    }

    fn pentacle(planet: &str) -> FlatPentacle {
        FlatPentacle {
            group_index: 0,
            pentacle_index: 0,
            planet: planet.to_string(),
            pentacle: Pentacle {
                index: 1,
                focus: format!("{} focus", planet),
            },
        }
    }

    fn coordinator() -> (DetailCoordinator<FakeService>, Receiver<AppEvent>) {
        let (tx, rx) = async_channel::unbounded();
        let coordinator = DetailCoordinator::new(
            VerseCache::new(FakeService::default()),
            psalms(),
            tx,
            Handle::current(),
        );
        (coordinator, rx)
    }

    async fn next_completion(rx: &Receiver<AppEvent>) -> VerseCompletion {
        match rx.recv().await.unwrap() {
            AppEvent::VersesResolved(completion) => completion,
            other => panic!("unexpected event {:?}", other),
        }
    }

    fn calls(coordinator: &DetailCoordinator<FakeService>) -> usize {
        coordinator.verses().source().calls.load(Ordering::SeqCst)
    }

    #[tokio::test]
    async fn test_repeated_selection_is_a_no_op() {
        let (mut coordinator, rx) = coordinator();
        let sun = pentacle("Sun");

        assert!(coordinator.on_selection_changed(Some(&sun)));
        assert!(!coordinator.on_selection_changed(Some(&sun)));
        assert_eq!(coordinator.generation(), Generation(1));

        let completion = next_completion(&rx).await;
        assert_eq!(completion.slot, 0);
        assert!(coordinator.apply(completion));
        assert!(rx.is_empty());
        assert_eq!(calls(&coordinator), 3);

        let entries = coordinator.panel().entries();
        assert_eq!(entries[0].text, EntryText::Ready("91:1\n\n91:2\n\n91:3".into()));
        assert_eq!(entries[1].text, EntryText::NotProvided);
    }

    #[tokio::test]
    async fn test_starting_without_selection_is_a_no_op() {
        let (mut coordinator, _rx) = coordinator();
        assert!(!coordinator.on_selection_changed(None));
        assert_eq!(coordinator.generation(), Generation::default());
        assert_eq!(coordinator.panel(), &DetailPanel::Idle);
    }

    #[tokio::test]
    async fn test_panel_is_populated_before_lookups_finish() {
        let (mut coordinator, _rx) = coordinator();
        coordinator.on_selection_changed(Some(&pentacle("Moon")));

        match coordinator.panel() {
            DetailPanel::Pentacle { title, focus, entries } => {
                assert_eq!(title, "Pentacle of Moon #1");
                assert_eq!(focus, "Moon focus");
                assert!(entries[0].text.is_loading());
            }
            DetailPanel::Idle => panic!("panel should describe the moon pentacle"),
        }
    }

    #[tokio::test]
    async fn test_stale_completion_is_discarded() {
        let (mut coordinator, rx) = coordinator();

        coordinator.on_selection_changed(Some(&pentacle("Sun")));
        coordinator.on_selection_changed(Some(&pentacle("Moon")));
        assert_eq!(coordinator.generation(), Generation(2));

        let mut applied = Vec::new();
        for _ in 0..2 {
            let completion = next_completion(&rx).await;
            let generation = completion.generation;
            applied.push((generation, coordinator.apply(completion)));
        }
        applied.sort();
        assert_eq!(applied, vec![(Generation(1), false), (Generation(2), true)]);

        let late = VerseCompletion {
            generation: Generation(1),
            slot: 0,
            text: EntryText::Ready("91:1".into()),
        };
        assert!(!coordinator.apply(late));

        let entries = coordinator.panel().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, EntryText::Ready("121:1".into()));
    }

    #[tokio::test]
    async fn test_reselection_uses_cache() {
        let (mut coordinator, rx) = coordinator();

        coordinator.on_selection_changed(Some(&pentacle("Sun")));
        coordinator.apply(next_completion(&rx).await);
        coordinator.on_selection_changed(Some(&pentacle("Moon")));
        coordinator.apply(next_completion(&rx).await);
        assert_eq!(calls(&coordinator), 4);

        coordinator.on_selection_changed(Some(&pentacle("Sun")));
        assert!(coordinator.apply(next_completion(&rx).await));
        assert_eq!(calls(&coordinator), 4);
        assert_eq!(
            coordinator.panel().entries()[0].text,
            EntryText::Ready("91:1\n\n91:2\n\n91:3".into())
        );
    }

    #[tokio::test]
    async fn test_failure_is_local_to_its_entry() {
        let (mut coordinator, rx) = coordinator();

        coordinator.on_selection_changed(Some(&pentacle("Mars")));
        for _ in 0..2 {
            let completion = next_completion(&rx).await;
            assert!(coordinator.apply(completion));
        }

        let entries = coordinator.panel().entries();
        assert_eq!(entries[0].text, EntryText::FetchFailed);
        assert_eq!(entries[1].text, EntryText::Ready("3:3".into()));
        assert_eq!(calls(&coordinator), 2);

        // failures are not cached, so coming back retries the lookup
        coordinator.on_selection_changed(None);
        coordinator.on_selection_changed(Some(&pentacle("Mars")));
        for _ in 0..2 {
            coordinator.apply(next_completion(&rx).await);
        }
        assert_eq!(calls(&coordinator), 3);
    }

    #[tokio::test]
    async fn test_empty_text_and_deselection() {
        let (mut coordinator, rx) = coordinator();

        coordinator.on_selection_changed(Some(&pentacle("Venus")));
        coordinator.apply(next_completion(&rx).await);
        assert_eq!(coordinator.panel().entries()[0].text, EntryText::NoText);

        assert!(coordinator.on_selection_changed(None));
        assert_eq!(coordinator.panel(), &DetailPanel::Idle);
        assert_eq!(coordinator.generation(), Generation(2));
    }

    #[test]
    fn test_selection_outside_the_runtime() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let (tx, rx) = async_channel::unbounded();
        let mut coordinator = DetailCoordinator::new(
            VerseCache::new(FakeService::default()),
            psalms(),
            tx,
            rt.handle().clone(),
        );

        // called from a plain thread, the lookup is queued on `rt`
        assert!(coordinator.on_selection_changed(Some(&pentacle("Moon"))));
        let completion = rt.block_on(next_completion(&rx));
        assert!(coordinator.apply(completion));
        assert_eq!(
            coordinator.panel().entries()[0].text,
            EntryText::Ready("121:1".into())
        );
    }

    #[tokio::test]
    async fn test_pentacle_without_citations() {
        let (mut coordinator, rx) = coordinator();
        assert!(coordinator.on_selection_changed(Some(&pentacle("Jupiter"))));
        assert!(coordinator.panel().entries().is_empty());
        assert!(rx.is_empty());
    }
}
