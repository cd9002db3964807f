//! Debounced point-of-interest search used by the route editor.
//!
//! Each keystroke aborts the pending search task and schedules a new one after
//! the debounce delay. Every schedule, cancel and close bumps a generation
//! counter; outcomes carrying an older generation are dropped, so a response
//! can never land on a query the user has moved past or on a closed search.

use crate::api_client::ApiClientError;
use crate::traits::TripBackend;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tripweave_core::{ItemRef, MapId, SearchItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    pub debounce: Duration,
    pub limit: u32,
    pub min_query_chars: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            limit: 10,
            min_query_chars: 2,
        }
    }
}

/// What a chosen item will be used for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchMode {
    Replace { map_id: MapId, current_name: String },
    Add,
}

/// A search result picked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoiSelection {
    pub item: ItemRef,
    pub mode: SearchMode,
}

/// Inline status under the search box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchMessage {
    TooShort { min_chars: usize },
    NothingFound,
    Failed(String),
}

impl fmt::Display for SearchMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMessage::TooShort { min_chars } => {
                write!(f, "Enter at least {} characters to search.", min_chars)
            }
            SearchMessage::NothingFound => write!(f, "Nothing found."),
            SearchMessage::Failed(reason) => write!(f, "Search failed: {}", reason),
        }
    }
}

#[derive(Debug)]
struct SearchOutcome {
    generation: u64,
    result: Result<Vec<SearchItem>, ApiClientError>,
}

pub struct PoiSearch {
    backend: Arc<dyn TripBackend>,
    settings: SearchSettings,
    mode: Option<SearchMode>,
    query: String,
    results: Vec<SearchItem>,
    message: Option<SearchMessage>,
    searching: bool,
    generation: u64,
    pending: Option<JoinHandle<()>>,
    outcome_tx: mpsc::UnboundedSender<SearchOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<SearchOutcome>,
}

impl PoiSearch {
    pub fn new(backend: Arc<dyn TripBackend>, settings: SearchSettings) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Self {
            backend,
            settings,
            mode: None,
            query: String::new(),
            results: Vec::new(),
            message: None,
            searching: false,
            generation: 0,
            pending: None,
            outcome_tx,
            outcome_rx,
        }
    }

    pub fn is_open(&self) -> bool {
        self.mode.is_some()
    }

    pub fn mode(&self) -> Option<&SearchMode> {
        self.mode.as_ref()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[SearchItem] {
        &self.results
    }

    pub fn message(&self) -> Option<&SearchMessage> {
        self.message.as_ref()
    }

    /// A search is scheduled or running.
    pub fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn open(&mut self, mode: SearchMode) {
        self.cancel_pending();
        self.query.clear();
        self.results.clear();
        self.message = None;
        self.mode = Some(mode);
    }

    pub fn close(&mut self) {
        self.cancel_pending();
        self.mode = None;
        self.query.clear();
        self.results.clear();
        self.message = None;
    }

    /// React to an edit of the search box. Must run inside a tokio runtime.
    pub fn on_query_change(&mut self, text: &str) {
        if !self.is_open() {
            return;
        }
        self.cancel_pending();
        self.query = text.to_string();

        if text.is_empty() {
            self.results.clear();
            self.message = None;
            return;
        }
        if text.chars().count() < self.settings.min_query_chars {
            self.results.clear();
            self.message = Some(SearchMessage::TooShort {
                min_chars: self.settings.min_query_chars,
            });
            return;
        }

        self.message = None;
        self.schedule(text.to_string());
    }

    fn schedule(&mut self, query: String) {
        let backend = Arc::clone(&self.backend);
        let tx = self.outcome_tx.clone();
        let generation = self.generation;
        let delay = self.settings.debounce;
        let limit = self.settings.limit;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tracing::debug!(query = %query, generation, "search fired");
            let result = backend.search_items(&query, limit).await;
            // The receiver lives as long as the search itself.
            let _ = tx.send(SearchOutcome { generation, result });
        }));
        self.searching = true;
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        self.generation = self.generation.wrapping_add(1);
        self.searching = false;
    }

    fn apply_outcome(&mut self, outcome: SearchOutcome) -> bool {
        if !self.is_open() || outcome.generation != self.generation {
            tracing::debug!(
                outcome_generation = outcome.generation,
                current_generation = self.generation,
                "discarding stale search outcome"
            );
            return false;
        }
        self.pending = None;
        self.searching = false;
        match outcome.result {
            Ok(items) if items.is_empty() => {
                self.results.clear();
                self.message = Some(SearchMessage::NothingFound);
            }
            Ok(items) => {
                self.results = items;
                self.message = None;
            }
            Err(err) => {
                tracing::warn!(error = %err, query = %self.query, "search failed");
                self.results.clear();
                self.message = Some(SearchMessage::Failed(err.detail()));
            }
        }
        true
    }

    /// Apply every outcome that has already arrived. Returns `true` if the
    /// visible state changed.
    pub fn poll_outcomes(&mut self) -> bool {
        let mut applied = false;
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            applied |= self.apply_outcome(outcome);
        }
        applied
    }

    /// Wait for the current search to finish and apply it. Returns `false`
    /// immediately when nothing is scheduled.
    pub async fn next_outcome(&mut self) -> bool {
        while self.searching {
            match self.outcome_rx.recv().await {
                Some(outcome) => {
                    if self.apply_outcome(outcome) {
                        return true;
                    }
                }
                None => break,
            }
        }
        false
    }

    /// Pick `item` for the current mode. Closes the search.
    pub fn select_result(&mut self, item: &SearchItem) -> Option<PoiSelection> {
        let mode = self.mode.clone()?;
        let selection = PoiSelection {
            item: item.item_ref(),
            mode,
        };
        self.close();
        Some(selection)
    }

    /// Pick the result at `index` in the current list.
    pub fn select_index(&mut self, index: usize) -> Option<PoiSelection> {
        let item = self.results.get(index)?.clone();
        self.select_result(&item)
    }
}

impl Drop for PoiSearch {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
