use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::aggregate::CommentTotal;
use crate::api::{build_url, extract_search_term, StoryFetcher};
use crate::config::{AppConfig, SEARCH_KEY};
use crate::fetch::FetchOrchestrator;
use crate::history::derive_last_searches;
use crate::models::Story;
use crate::reducer::{StoriesAction, StoriesStore};
use crate::sort::{SortKey, SortState};
use crate::storage::{KeyValueStore, PersistedValue};

/// Everything the front end needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct StoriesView {
    pub search_term: String,
    pub can_submit: bool,
    pub last_searches: Vec<String>,
    pub stories: Vec<Story>,
    pub sort: SortState,
    pub comment_count: i64,
    pub page: u32,
    pub is_loading: bool,
    pub is_error: bool,
}

/// Wires user intents to the URL history, the fetch orchestrator and the
/// stories store.
pub struct StoriesApp {
    api_base: String,
    search_term: PersistedValue,
    urls: Vec<String>,
    store: StoriesStore,
    orchestrator: FetchOrchestrator,
    comment_total: CommentTotal,
    sort: SortState,
}

impl StoriesApp {
    /// Reads the persisted search term and issues the first request.
    pub fn new(
        config: &AppConfig,
        settings: Box<dyn KeyValueStore>,
        fetcher: Arc<dyn StoryFetcher>,
        runtime: Handle,
    ) -> Self {
        let search_term = PersistedValue::load(settings, SEARCH_KEY, &config.initial_search_term);
        info!(search_term = search_term.get(), "starting stories session");

        let mut app = Self {
            api_base: config.api_base.clone(),
            search_term,
            urls: Vec::new(),
            store: StoriesStore::new(),
            orchestrator: FetchOrchestrator::new(fetcher, runtime, config.fetch_ordering),
            comment_total: CommentTotal::default(),
            sort: SortState::default(),
        };

        let url = build_url(&app.api_base, app.search_term.get(), 0);
        app.push_url(url);
        app
    }

    pub fn search_term(&self) -> &str {
        self.search_term.get()
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn store(&self) -> &StoriesStore {
        &self.store
    }

    pub fn on_search_input(&mut self, value: String) {
        self.search_term.set(value);
    }

    pub fn on_search_submit(&mut self) {
        let url = build_url(&self.api_base, self.search_term.get(), 0);
        self.push_url(url);
    }

    /// Next page of the last executed search, regardless of unsubmitted input.
    pub fn on_more(&mut self) {
        let term = self.current_url().map(extract_search_term).unwrap_or_default();
        let url = build_url(&self.api_base, &term, self.store.state().page + 1);
        self.push_url(url);
    }

    pub fn on_last_search(&mut self, term: &str) {
        self.search_term.set(term.to_string());
        let url = build_url(&self.api_base, term, 0);
        self.push_url(url);
    }

    pub fn on_remove_item(&mut self, item: &Story) {
        self.store.dispatch(StoriesAction::RemoveStory(item.clone()));
    }

    pub fn on_sort(&mut self, key: SortKey) {
        self.sort.toggle(key);
    }

    /// Applies any requests that have resolved since the last call. Returns
    /// true if the state changed.
    pub fn poll(&mut self) -> bool {
        self.orchestrator.drain(&mut self.store) > 0
    }

    /// Waits for the next in-flight request and applies it.
    pub async fn settle(&mut self) -> bool {
        self.orchestrator.settle(&mut self.store).await
    }

    pub fn in_flight(&self) -> usize {
        self.orchestrator.in_flight()
    }

    pub fn view(&mut self) -> StoriesView {
        let state = self.store.state();
        let search_term = self.search_term.get().to_string();

        StoriesView {
            can_submit: !search_term.is_empty(),
            search_term,
            last_searches: derive_last_searches(&self.urls),
            stories: self.sort.sorted(&state.data),
            sort: self.sort,
            comment_count: self.comment_total.get(&self.store),
            page: state.page,
            is_loading: state.is_loading,
            is_error: state.is_error,
        }
    }

    fn current_url(&self) -> Option<&str> {
        self.urls.last().map(String::as_str)
    }

    // The orchestrator only runs when the current URL actually changes.
    fn push_url(&mut self, url: String) {
        let changed = self.current_url() != Some(url.as_str());
        self.urls.push(url);

        if changed {
            if let Some(current) = self.urls.last() {
                self.orchestrator.fetch_stories(current, &mut self.store);
            }
        } else {
            debug!(url = ?self.current_url(), "current url unchanged, not refetching");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DEFAULT_API_BASE;
    use crate::fetch::testing::ScriptedFetcher;
    use crate::fetch::FetchOrdering;
    use crate::models::{story, SearchResponse};
    use crate::storage::MemoryStore;

    fn url(term: &str, page: u32) -> String {
        build_url(DEFAULT_API_BASE, term, page)
    }

    fn hits(stories: Vec<Story>, page: u32) -> Result<SearchResponse, String> {
        Ok(SearchResponse { hits: stories, page })
    }

    fn start(fetcher: &Arc<ScriptedFetcher>, settings: Arc<MemoryStore>) -> StoriesApp {
        StoriesApp::new(
            &AppConfig::default(),
            Box::new(settings),
            fetcher.clone(),
            Handle::current(),
        )
    }

    #[tokio::test]
    async fn initial_mount_fetches_default_term() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        fetcher.reply(
            &url("React", 0),
            hits(vec![story("0", "React", 3, 4), story("1", "Redux", 2, 5)], 0),
        );
        let settings = Arc::new(MemoryStore::new());
        let mut app = start(&fetcher, settings.clone());

        let view = app.view();
        assert!(view.is_loading);
        assert_eq!(view.search_term, "React");

        assert!(app.settle().await);
        let view = app.view();
        assert!(!view.is_loading && !view.is_error);
        assert_eq!(view.stories.len(), 2);
        assert_eq!(view.comment_count, 5);
        assert!(view.last_searches.is_empty());
        assert_eq!(settings.get(SEARCH_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn uses_persisted_term_on_startup() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        let settings = Arc::new(MemoryStore::with_value(SEARCH_KEY, "Rust"));
        let app = start(&fetcher, settings);
        assert_eq!(app.search_term(), "Rust");
        assert_eq!(app.urls(), &[url("Rust", 0)]);
    }

    #[tokio::test]
    async fn input_change_only_updates_term() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        fetcher.reply(&url("React", 0), hits(vec![], 0));
        let settings = Arc::new(MemoryStore::new());
        let mut app = start(&fetcher, settings.clone());
        app.settle().await;

        app.on_search_input("Redux".to_string());
        assert_eq!(app.urls().len(), 1);
        assert_eq!(app.in_flight(), 0);
        assert_eq!(settings.get(SEARCH_KEY).unwrap().as_deref(), Some("Redux"));
    }

    #[tokio::test]
    async fn submit_replaces_and_more_appends() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        fetcher.reply(&url("React", 0), hits(vec![story("0", "React", 3, 4)], 0));
        fetcher.reply(&url("Rust", 0), hits(vec![story("5", "Rust", 1, 1)], 0));
        fetcher.reply(&url("Rust", 1), hits(vec![story("6", "Cargo", 2, 2)], 1));
        let mut app = start(&fetcher, Arc::new(MemoryStore::new()));
        app.settle().await;

        app.on_search_input("Rust".to_string());
        app.on_search_submit();
        app.settle().await;
        let ids: Vec<_> = app.view().stories.into_iter().map(|s| s.object_id).collect();
        assert_eq!(ids, vec!["5"]);

        // Unsubmitted input does not redirect "more".
        app.on_search_input("Go".to_string());
        app.on_more();
        assert_eq!(app.urls().last(), Some(&url("Rust", 1)));
        app.settle().await;

        let view = app.view();
        let ids: Vec<_> = view.stories.iter().map(|s| s.object_id.as_str()).collect();
        assert_eq!(ids, vec!["5", "6"]);
        assert_eq!(view.page, 1);
        assert_eq!(view.last_searches, vec!["React"]);
    }

    #[tokio::test]
    async fn history_click_sets_term_and_refetches() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        fetcher.reply(&url("React", 0), hits(vec![story("0", "React", 3, 4)], 0));
        fetcher.reply(&url("Redux", 0), hits(vec![story("1", "Redux", 2, 5)], 0));
        let settings = Arc::new(MemoryStore::new());
        let mut app = start(&fetcher, settings.clone());
        app.settle().await;

        app.on_search_input("Redux".to_string());
        app.on_search_submit();
        app.settle().await;
        assert_eq!(app.view().last_searches, vec!["React"]);

        fetcher.reply(&url("React", 0), hits(vec![story("0", "React", 3, 4)], 0));
        app.on_last_search("React");
        assert_eq!(app.search_term(), "React");
        assert_eq!(settings.get(SEARCH_KEY).unwrap().as_deref(), Some("React"));
        app.settle().await;

        let view = app.view();
        assert_eq!(view.stories[0].object_id, "0");
        assert_eq!(view.last_searches, vec!["React", "Redux"]);
    }

    #[tokio::test]
    async fn resubmitting_same_term_does_not_refetch() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        fetcher.reply(&url("React", 0), hits(vec![], 0));
        let mut app = start(&fetcher, Arc::new(MemoryStore::new()));
        app.settle().await;

        app.on_search_submit();
        assert_eq!(app.urls().len(), 2);
        assert_eq!(app.in_flight(), 0);
        assert_eq!(fetcher.requests().len(), 1);
    }

    #[tokio::test]
    async fn removal_never_triggers_a_fetch() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        let first = story("0", "React", 3, 4);
        fetcher.reply(&url("React", 0), hits(vec![first.clone(), story("1", "Redux", 2, 5)], 0));
        let mut app = start(&fetcher, Arc::new(MemoryStore::new()));
        app.settle().await;

        app.on_remove_item(&first);
        let view = app.view();
        assert_eq!(view.stories.len(), 1);
        assert_eq!(view.comment_count, 2);
        assert_eq!(app.urls().len(), 1);
        assert_eq!(app.in_flight(), 0);
    }

    #[tokio::test]
    async fn failure_sets_error_until_next_success() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        fetcher.reply(&url("React", 0), Err("connection reset".to_string()));
        fetcher.reply(&url("Rust", 0), hits(vec![story("5", "Rust", 1, 1)], 0));
        let mut app = start(&fetcher, Arc::new(MemoryStore::new()));
        app.settle().await;
        let view = app.view();
        assert!(view.is_error && !view.is_loading);

        app.on_search_input("Rust".to_string());
        app.on_search_submit();
        let view = app.view();
        assert!(view.is_loading && !view.is_error);

        app.settle().await;
        assert!(!app.view().is_error);
    }

    #[tokio::test]
    async fn sorting_leaves_store_order_alone() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        fetcher.reply(
            &url("React", 0),
            hits(vec![story("0", "React", 3, 4), story("1", "Angular", 20, 5)], 0),
        );
        let mut app = start(&fetcher, Arc::new(MemoryStore::new()));
        app.settle().await;

        app.on_sort(SortKey::Comments);
        let view = app.view();
        assert_eq!(view.stories[0].object_id, "1");
        assert_eq!(app.store().state().data[0].object_id, "0");
    }

    #[tokio::test]
    async fn overlapping_searches_keep_the_latest() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        let slow = fetcher.gate(&url("React", 0));
        fetcher.reply(&url("Rust", 0), hits(vec![story("5", "Rust", 1, 1)], 0));
        let mut app = StoriesApp::new(
            &AppConfig {
                fetch_ordering: FetchOrdering::LatestWins,
                ..AppConfig::default()
            },
            Box::new(MemoryStore::new()),
            fetcher.clone(),
            Handle::current(),
        );

        app.on_search_input("Rust".to_string());
        app.on_search_submit();
        assert!(app.settle().await);

        slow.send(hits(vec![story("0", "React", 3, 4)], 0)).unwrap();
        assert!(!app.settle().await);
        assert_eq!(app.view().stories[0].object_id, "5");
    }
}
