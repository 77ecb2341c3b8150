use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::api::StoryFetcher;
use crate::reducer::{StoriesAction, StoriesStore};

/// How resolutions of overlapping requests are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchOrdering {
    /// Apply a result only if it was issued after every result applied so far.
    #[default]
    LatestWins,
    /// Apply every result as it resolves, so a slow early request can
    /// overwrite a later one.
    ResolutionOrder,
}

impl std::str::FromStr for FetchOrdering {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "latest-wins" => Ok(Self::LatestWins),
            "resolution-order" => Ok(Self::ResolutionOrder),
            other => Err(anyhow::anyhow!("unknown fetch ordering: {other}")),
        }
    }
}

/// Lifecycle action produced by a finished request, tagged with the sequence
/// number it was issued under.
#[derive(Debug)]
pub struct FetchOutcome {
    pub seq: u64,
    pub action: StoriesAction,
}

pub struct FetchOrchestrator {
    fetcher: Arc<dyn StoryFetcher>,
    runtime: Handle,
    ordering: FetchOrdering,
    outcomes_tx: UnboundedSender<FetchOutcome>,
    outcomes_rx: UnboundedReceiver<FetchOutcome>,
    next_seq: u64,
    last_applied: u64,
    in_flight: usize,
}

impl FetchOrchestrator {
    pub fn new(fetcher: Arc<dyn StoryFetcher>, runtime: Handle, ordering: FetchOrdering) -> Self {
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        Self {
            fetcher,
            runtime,
            ordering,
            outcomes_tx,
            outcomes_rx,
            next_seq: 0,
            last_applied: 0,
            in_flight: 0,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Dispatches `FETCH_INIT` right away, then issues one GET for `url` on the
    /// runtime. The success or failure action is delivered later through
    /// [`drain`](Self::drain) or [`settle`](Self::settle).
    pub fn fetch_stories(&mut self, url: &str, store: &mut StoriesStore) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        store.dispatch(StoriesAction::FetchInit);

        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.outcomes_tx.clone();
        let url = url.to_owned();
        info!(seq, url = %url, "fetching stories");

        self.runtime.spawn(async move {
            let action = match fetcher.fetch(&url).await {
                Ok(response) => StoriesAction::FetchSuccess {
                    list: response.hits,
                    page: response.page,
                },
                Err(err) => {
                    warn!(seq, url = %url, error = %err, "story fetch failed");
                    StoriesAction::FetchFailure
                }
            };
            // The receiver lives as long as the orchestrator.
            let _ = tx.send(FetchOutcome { seq, action });
        });
        self.in_flight += 1;

        seq
    }

    /// Applies every outcome that has already resolved. Returns how many were
    /// dispatched into the store.
    pub fn drain(&mut self, store: &mut StoriesStore) -> usize {
        let mut applied = 0;
        while let Ok(outcome) = self.outcomes_rx.try_recv() {
            if self.apply(outcome, store) {
                applied += 1;
            }
        }
        applied
    }

    /// Waits for the next request to resolve and applies it. Returns `false`
    /// when nothing is in flight or the outcome was discarded as stale.
    pub async fn settle(&mut self, store: &mut StoriesStore) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.outcomes_rx.recv().await {
            Some(outcome) => self.apply(outcome, store),
            None => false,
        }
    }

    fn apply(&mut self, outcome: FetchOutcome, store: &mut StoriesStore) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);

        if self.ordering == FetchOrdering::LatestWins && outcome.seq <= self.last_applied {
            debug!(
                seq = outcome.seq,
                last_applied = self.last_applied,
                "discarding stale fetch result"
            );
            return false;
        }

        self.last_applied = self.last_applied.max(outcome.seq);
        store.dispatch(outcome.action);
        true
    }
}
