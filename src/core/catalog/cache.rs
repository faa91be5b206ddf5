//! Catalog cache: holds the latest fetched snapshot of catalog items.
//!
//! Every refresh gets a monotonic request token. Fetches run on tokio
//! tasks and report back over a channel; a response is applied only if its
//! token is still the latest one, so a slow, superseded request can never
//! overwrite newer data or clear the loading flag early.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::{CatalogError, CatalogItem, CatalogProvider};

/// A completed fetch, tagged with the token it was issued under.
pub struct FetchOutcome {
    pub token: u64,
    pub result: Result<Vec<CatalogItem>, CatalogError>,
}

pub struct CatalogCache {
    items: Vec<CatalogItem>,
    loading: bool,
    error: Option<String>,
    /// Token of the most recently issued request.
    latest_token: u64,
    /// Bumped every time the snapshot is replaced.
    generation: u64,

    data_tx: mpsc::UnboundedSender<FetchOutcome>,
    data_rx: mpsc::UnboundedReceiver<FetchOutcome>,
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogCache {
    pub fn new() -> Self {
        let (data_tx, data_rx) = mpsc::unbounded_channel();
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
            latest_token: 0,
            generation: 0,
            data_tx,
            data_rx,
        }
    }

    /// Start a fetch of the full collection. Must run inside a tokio runtime.
    ///
    /// Returns the token issued for this request.
    pub fn refresh(&mut self, provider: Arc<dyn CatalogProvider>) -> u64 {
        let token = self.begin();
        let tx = self.data_tx.clone();
        log::debug!("Catalog fetch #{token} via {}", provider.name());
        tokio::spawn(async move {
            let result = provider.get_items().await;
            let _ = tx.send(FetchOutcome { token, result });
        });
        token
    }

    /// Issue a new token and mark the cache as loading.
    pub fn begin(&mut self) -> u64 {
        self.latest_token += 1;
        self.loading = true;
        self.error = None;
        self.latest_token
    }

    /// Drain completed fetches without blocking. Returns `true` if the
    /// snapshot was replaced.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(outcome) = self.data_rx.try_recv() {
            changed |= self.apply(outcome.token, outcome.result);
        }
        changed
    }

    /// Wait for the next completed fetch and apply it.
    ///
    /// For headless callers that don't run a tick loop. Returns `true` if
    /// the snapshot was replaced.
    pub async fn settle(&mut self) -> bool {
        match self.data_rx.recv().await {
            Some(outcome) => self.apply(outcome.token, outcome.result),
            None => false,
        }
    }

    /// Apply a fetch result. Responses for superseded tokens are dropped.
    ///
    /// A failure is fail-soft: the snapshot becomes empty and the error
    /// flag is set, but nothing is propagated.
    pub fn apply(&mut self, token: u64, result: Result<Vec<CatalogItem>, CatalogError>) -> bool {
        if token != self.latest_token {
            log::debug!(
                "Ignoring stale catalog response #{token} (latest #{})",
                self.latest_token
            );
            return false;
        }

        self.loading = false;
        match result {
            Ok(items) => {
                log::info!("Catalog loaded: {} items", items.len());
                self.items = items;
                self.error = None;
            }
            Err(e) => {
                log::warn!("Error fetching items: {e}");
                self.items = Vec::new();
                self.error = Some(e.user_message());
            }
        }
        self.generation += 1;
        true
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn latest_token(&self) -> u64 {
        self.latest_token
    }
}
