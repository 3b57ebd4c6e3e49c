//! Debounced place suggestions for a location input.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::{GeocodingClient, Suggestion};
use crate::error::Result;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);
pub const DEFAULT_MIN_QUERY_LEN: usize = 3;

/// Anything that can turn a partial query into place suggestions. Called on the blocking
/// thread pool.
pub trait SuggestionSource: Send + Sync + 'static {
    fn suggest(&self, query: &str, limit: usize) -> Result<Vec<Suggestion>>;
}

impl SuggestionSource for GeocodingClient {
    fn suggest(&self, query: &str, limit: usize) -> Result<Vec<Suggestion>> {
        GeocodingClient::suggest(self, query, limit)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SuggestionUpdate {
    /// Query too short; hide the list.
    Cleared,
    Results {
        query: String,
        items: Vec<Suggestion>,
    },
}

#[derive(Debug, Clone)]
pub struct DebounceSettings {
    pub delay: Duration,
    pub min_query_len: usize,
    pub limit: usize,
}

impl Default for DebounceSettings {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DEBOUNCE,
            min_query_len: DEFAULT_MIN_QUERY_LEN,
            limit: crate::api::geocoding::DEFAULT_SUGGESTION_LIMIT,
        }
    }
}

/// Delays suggestion fetches until typing pauses.
///
/// Each [`input`](Self::input) aborts the pending task before scheduling a new one, so at
/// most one fetch per input field is live. A fetch that was already running on the
/// blocking pool when it got superseded finishes, but its result is dropped.
pub struct SuggestionDebouncer<S: SuggestionSource> {
    source: Arc<S>,
    settings: DebounceSettings,
    pending: Option<JoinHandle<()>>,
    generation: Arc<AtomicU64>,
    tx: mpsc::UnboundedSender<SuggestionUpdate>,
}

impl<S: SuggestionSource> SuggestionDebouncer<S> {
    /// Create a debouncer and the receiver its updates arrive on.
    pub fn new(
        source: S,
        settings: DebounceSettings,
    ) -> (Self, mpsc::UnboundedReceiver<SuggestionUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Self {
            source: Arc::new(source),
            settings,
            pending: None,
            generation: Arc::new(AtomicU64::new(0)),
            tx,
        };
        (debouncer, rx)
    }

    /// Handle new input text. Must be called from within a Tokio runtime.
    pub fn input(&mut self, text: &str) {
        self.cancel();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let query = text.trim().to_string();
        if query.chars().count() < self.settings.min_query_len {
            let _ = self.tx.send(SuggestionUpdate::Cleared);
            return;
        }

        let source = Arc::clone(&self.source);
        let current = Arc::clone(&self.generation);
        let tx = self.tx.clone();
        let delay = self.settings.delay;
        let limit = self.settings.limit;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            debug!(%query, "fetching suggestions");

            let fetch_query = query.clone();
            let fetched =
                tokio::task::spawn_blocking(move || source.suggest(&fetch_query, limit)).await;
            let items = match fetched {
                Ok(Ok(items)) => items,
                Ok(Err(err)) => {
                    warn!(%query, "suggestion fetch failed: {err}");
                    Vec::new()
                }
                Err(err) => {
                    warn!(%query, "suggestion task failed: {err}");
                    Vec::new()
                }
            };

            if current.load(Ordering::SeqCst) == generation {
                let _ = tx.send(SuggestionUpdate::Results { query, items });
            }
        }));
    }

    /// Drop any pending fetch without scheduling a new one.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl<S: SuggestionSource> Drop for SuggestionDebouncer<S> {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Suggestion dropdown with keyboard navigation.
#[derive(Debug, Clone, Default)]
pub struct SuggestionList {
    items: Vec<Suggestion>,
    active: Option<usize>,
}

impl SuggestionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Suggestion] {
        &self.items
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replace the items from a new fetch; no row is active afterwards.
    pub fn replace(&mut self, items: Vec<Suggestion>) {
        self.items = items;
        self.active = None;
    }

    pub fn apply(&mut self, update: SuggestionUpdate) {
        match update {
            SuggestionUpdate::Cleared => self.replace(Vec::new()),
            SuggestionUpdate::Results { items, .. } => self.replace(items),
        }
    }

    pub fn move_down(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.active = Some(match self.active {
            Some(i) => (i + 1) % self.items.len(),
            None => 0,
        });
    }

    pub fn move_up(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let len = self.items.len();
        self.active = Some(match self.active {
            Some(i) => (i + len - 1) % len,
            None => len - 1,
        });
    }

    pub fn pick(&self, index: usize) -> Option<&Suggestion> {
        self.items.get(index)
    }

    /// The active row, if any (Enter key).
    pub fn confirm(&self) -> Option<&Suggestion> {
        self.active.and_then(|i| self.pick(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeSource {
        calls: Mutex<Vec<String>>,
    }

    impl SuggestionSource for Arc<FakeSource> {
        fn suggest(&self, query: &str, _limit: usize) -> Result<Vec<Suggestion>> {
            self.calls.lock().unwrap().push(query.to_string());
            Ok(vec![suggestion(&format!("{query} result"))])
        }
    }

    fn suggestion(name: &str) -> Suggestion {
        Suggestion {
            name: name.to_string(),
            lon: -105.0,
            lat: 39.7,
            category: "amenity".to_string(),
            icon: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_typing_fetches_once() {
        let source = Arc::new(FakeSource::default());
        let (mut debouncer, mut rx) =
            SuggestionDebouncer::new(Arc::clone(&source), DebounceSettings::default());

        debouncer.input("Uni");
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.input("Unio");
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.input("Union");

        let update = rx.recv().await.unwrap();
        assert_eq!(
            update,
            SuggestionUpdate::Results {
                query: "Union".to_string(),
                items: vec![suggestion("Union result")],
            }
        );
        assert_eq!(*source.calls.lock().unwrap(), vec!["Union".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_query_clears() {
        let source = Arc::new(FakeSource::default());
        let (mut debouncer, mut rx) =
            SuggestionDebouncer::new(Arc::clone(&source), DebounceSettings::default());

        debouncer.input("  Un ");
        assert_eq!(rx.recv().await.unwrap(), SuggestionUpdate::Cleared);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(source.calls.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_query_cancels_pending_fetch() {
        let source = Arc::new(FakeSource::default());
        let (mut debouncer, mut rx) =
            SuggestionDebouncer::new(Arc::clone(&source), DebounceSettings::default());

        debouncer.input("Union");
        debouncer.input("U");
        assert_eq!(rx.recv().await.unwrap(), SuggestionUpdate::Cleared);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(source.calls.lock().unwrap().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_list_navigation_wraps() {
        let mut list = SuggestionList::new();
        list.move_down();
        assert_eq!(list.active(), None);

        list.replace(vec![suggestion("a"), suggestion("b"), suggestion("c")]);
        list.move_down();
        assert_eq!(list.active(), Some(0));
        list.move_up();
        assert_eq!(list.active(), Some(2));
        list.move_down();
        assert_eq!(list.active(), Some(0));
        assert_eq!(list.confirm().unwrap().name, "a");
    }

    #[test]
    fn test_replace_resets_active_row() {
        let mut list = SuggestionList::new();
        list.replace(vec![suggestion("a"), suggestion("b")]);
        list.move_down();
        list.move_down();
        list.apply(SuggestionUpdate::Results {
            query: "x".to_string(),
            items: vec![suggestion("x")],
        });
        assert_eq!(list.active(), None);
        assert!(list.confirm().is_none());
        assert_eq!(list.pick(0).unwrap().name, "x");

        list.apply(SuggestionUpdate::Cleared);
        assert!(list.is_empty());
    }
}
