use crate::reference::{Chapter, VerseNumber};
use crate::service::{DEFAULT_BOOK, DEFAULT_TRANSLATION, ServiceError, VerseLookup, VerseRequest};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Process-lifetime verse text cache in front of a [`VerseLookup`].
///
/// Entries are keyed `"chapter:verse"` and never evicted. Only successful
/// lookups are stored, so a failed verse is retried the next time it is asked
/// for.
pub struct VerseCache<S> {
    source: S,
    book: String,
    translation: String,
    entries: RwLock<HashMap<String, String>>,
}

pub fn cache_key(chapter: &Chapter, verse: Option<&VerseNumber>) -> String {
    format!(
        "{}:{}",
        chapter,
        verse.map(VerseNumber::as_str).unwrap_or_default()
    )
}

impl<S: VerseLookup> VerseCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            book: DEFAULT_BOOK.to_string(),
            translation: DEFAULT_TRANSLATION.to_string(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_book(mut self, book: impl Into<String>) -> Self {
        self.book = book.into();
        self
    }

    pub fn with_translation(mut self, translation: impl Into<String>) -> Self {
        self.translation = translation.into();
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn book(&self) -> &str {
        &self.book
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn cached(&self, chapter: &Chapter, verse: Option<&VerseNumber>) -> Option<String> {
        self.entries.read().get(&cache_key(chapter, verse)).cloned()
    }

    pub async fn get(
        &self,
        chapter: &Chapter,
        verse: Option<&VerseNumber>,
    ) -> Result<String, ServiceError> {
        let key = cache_key(chapter, verse);
        let hit = self.entries.read().get(&key).cloned();
        if let Some(text) = hit {
            log::trace!("verse cache hit {}", key);
            return Ok(text);
        }

        let request = VerseRequest::new(chapter.clone(), verse.cloned())
            .with_book(self.book.as_str())
            .with_translation(self.translation.as_str());
        let text = self.source.lookup(&request).await?;

        self.entries.write().insert(key, text.clone());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    impl VerseLookup for CountingSource {
        async fn lookup(&self, request: &VerseRequest) -> Result<String, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ServiceError::Status(503));
            }
            Ok(format!(
                "{} {}:{} ({})",
                request.book,
                request.chapter,
                request.verse.as_ref().map(VerseNumber::as_str).unwrap_or("*"),
                request.translation
            ))
        }
    }

    #[tokio::test]
    async fn test_second_lookup_is_served_from_cache() {
        let cache = VerseCache::new(CountingSource::default());
        let chapter = Chapter::from("91");
        let verse = VerseNumber::from("1");

        let first = cache.get(&chapter, Some(&verse)).await.unwrap();
        let second = cache.get(&chapter, Some(&verse)).await.unwrap();

        assert_eq!(first, "Psalm 91:1 (KJV)");
        assert_eq!(first, second);
        assert_eq!(cache.source().calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.cached(&chapter, Some(&verse)).as_deref(), Some(first.as_str()));
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let cache = VerseCache::new(CountingSource {
            fail: true,
            ..Default::default()
        });
        let chapter = Chapter::from("2");

        assert!(cache.get(&chapter, None).await.is_err());
        assert!(cache.get(&chapter, None).await.is_err());

        assert!(cache.is_empty());
        assert_eq!(cache.source().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_translation_is_forwarded() {
        let cache = VerseCache::new(CountingSource::default()).with_translation("ASV");
        let text = cache
            .get(&Chapter::from("23"), Some(&VerseNumber::from("4")))
            .await
            .unwrap();
        assert_eq!(text, "Psalm 23:4 (ASV)");
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(cache_key(&Chapter::from("91"), Some(&VerseNumber::from("3"))), "91:3");
        assert_eq!(cache_key(&Chapter::from("91"), None), "91:");
    }
}
