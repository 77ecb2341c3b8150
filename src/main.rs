use anyhow::{anyhow, Result};
use clap::Parser;
use eframe::egui;
use egui::{Color32, CornerRadius, RichText, ScrollArea, Ui, ViewportBuilder};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hacker_stories::api::{SearchClient, StoryFetcher, DEFAULT_API_BASE};
use hacker_stories::config::{AppConfig, DEFAULT_SEARCH_TERM};
use hacker_stories::fetch::FetchOrdering;
use hacker_stories::sort::SortKey;
use hacker_stories::storage::{KeyValueStore, MemoryStore, SqliteStore};
use hacker_stories::{StoriesApp, StoriesView, Story};

const HN_ORANGE: Color32 = Color32::from_rgb(255, 102, 0);
const SORT_COLUMNS: [SortKey; 4] = [
    SortKey::Title,
    SortKey::Author,
    SortKey::Comments,
    SortKey::Points,
];

#[derive(Parser, Debug)]
#[command(name = "hacker_stories", about = "Search Hacker News stories")]
struct Args {
    /// Base URL of the search API
    #[arg(long, env = "HACKER_STORIES_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,
    /// Search term used when none has been saved yet
    #[arg(long, env = "HACKER_STORIES_SEARCH", default_value = DEFAULT_SEARCH_TERM)]
    initial_search: String,
    /// Directory holding the settings database (defaults to ~/.hacker_stories)
    #[arg(long, env = "HACKER_STORIES_DATA_DIR")]
    data_dir: Option<PathBuf>,
    #[arg(long, env = "HACKER_STORIES_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,
    /// latest-wins or resolution-order
    #[arg(long, env = "HACKER_STORIES_FETCH_ORDERING", default_value = "latest-wins")]
    fetch_ordering: FetchOrdering,
}

impl Args {
    fn into_config(self) -> Result<AppConfig> {
        let data_dir = match self.data_dir {
            Some(dir) => dir,
            None => AppConfig::home_data_dir()?,
        };

        Ok(AppConfig {
            api_base: self.api_base,
            initial_search_term: self.initial_search,
            data_dir,
            request_timeout: Duration::from_secs(self.timeout_secs),
            fetch_ordering: self.fetch_ordering,
        })
    }
}

fn open_settings(config: &AppConfig) -> Box<dyn KeyValueStore> {
    let path = SqliteStore::default_path(&config.data_dir);
    match SqliteStore::open(&path) {
        Ok(store) => Box::new(store),
        Err(e) => {
            // Still usable, the search term just won't survive a restart.
            warn!(path = %path.display(), error = %e, "Failed to open settings database");
            Box::new(MemoryStore::new())
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Args::parse().into_config()?;
    info!(api_base = %config.api_base, data_dir = %config.data_dir.display(), "starting");

    let runtime = tokio::runtime::Runtime::new()?;
    let fetcher: Arc<dyn StoryFetcher> = Arc::new(SearchClient::new(config.request_timeout)?);
    let settings = open_settings(&config);
    let handle = runtime.handle().clone();

    let options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_inner_size([1000.0, 760.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title("Hacker Stories"),
        ..Default::default()
    };

    eframe::run_native(
        "Hacker Stories",
        options,
        Box::new(move |_cc| {
            let app = StoriesApp::new(&config, settings, fetcher, handle);
            Ok(Box::new(HackerStoriesUi::new(app)))
        }),
    )
    .map_err(|e| anyhow!("Failed to run the UI: {e}"))
}

/// User intents collected while drawing and applied once the frame is built.
enum Intent {
    Input(String),
    Submit,
    More,
    LastSearch(String),
    Remove(Story),
    Sort(SortKey),
    Open(String),
}

struct HackerStoriesUi {
    app: StoriesApp,
    pending: Vec<Intent>,
}

impl HackerStoriesUi {
    fn new(app: StoriesApp) -> Self {
        Self {
            app,
            pending: Vec::new(),
        }
    }

    fn apply_pending(&mut self) {
        for intent in std::mem::take(&mut self.pending) {
            match intent {
                Intent::Input(value) => self.app.on_search_input(value),
                Intent::Submit => self.app.on_search_submit(),
                Intent::More => self.app.on_more(),
                Intent::LastSearch(term) => self.app.on_last_search(&term),
                Intent::Remove(story) => self.app.on_remove_item(&story),
                Intent::Sort(key) => self.app.on_sort(key),
                Intent::Open(url) => {
                    if let Err(e) = open::that(&url) {
                        warn!(url = %url, error = %e, "Failed to open URL");
                    }
                }
            }
        }
    }

    fn render_search_form(&mut self, ui: &mut Ui, view: &StoriesView) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("Search:").strong());

            let mut input = view.search_term.clone();
            let response = ui.text_edit_singleline(&mut input);
            if response.changed() {
                self.pending.push(Intent::Input(input.clone()));
            }

            let enter = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            let submit = ui.add_enabled(view.can_submit, egui::Button::new("Submit"));
            if (submit.clicked() || enter) && !input.is_empty() {
                self.pending.push(Intent::Submit);
            }
        });

        if !view.last_searches.is_empty() {
            ui.horizontal_wrapped(|ui| {
                for term in &view.last_searches {
                    if ui.button(term).clicked() {
                        self.pending.push(Intent::LastSearch(term.clone()));
                    }
                }
            });
        }
    }

    fn render_stories_table(&mut self, ui: &mut Ui, view: &StoriesView) {
        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                egui::Grid::new("stories_grid")
                    .num_columns(5)
                    .striped(true)
                    .spacing([16.0, 6.0])
                    .show(ui, |ui| {
                        for key in SORT_COLUMNS {
                            let mut text = key.label().to_string();
                            if view.sort.key == key {
                                text.push_str(if view.sort.is_reverse { " ^" } else { " v" });
                            }
                            if ui.button(text).clicked() {
                                self.pending.push(Intent::Sort(key));
                            }
                        }
                        ui.label("Action");
                        ui.end_row();

                        for story in &view.stories {
                            let title = ui.add(
                                egui::Label::new(RichText::new(&story.title).color(HN_ORANGE))
                                    .sense(egui::Sense::click()),
                            );
                            if title.hovered() {
                                ui.output_mut(|o| o.cursor_icon = egui::CursorIcon::PointingHand);
                            }
                            if title.clicked() && !story.url.is_empty() {
                                self.pending.push(Intent::Open(story.url.clone()));
                            }

                            ui.label(&story.author);
                            ui.label(story.num_comments.to_string());
                            ui.label(story.points.to_string());

                            let dismiss = ui.add(
                                egui::Button::new("✔")
                                    .corner_radius(CornerRadius::same(4))
                                    .min_size(egui::vec2(24.0, 24.0)),
                            );
                            if dismiss.clicked() {
                                self.pending.push(Intent::Remove(story.clone()));
                            }
                            ui.end_row();
                        }
                    });

                ui.add_space(8.0);
                if view.is_loading {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Loading ...");
                    });
                } else if ui.button("More").clicked() {
                    self.pending.push(Intent::More);
                }
            });
    }
}

impl eframe::App for HackerStoriesUi {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.app.poll();
        let view = self.app.view();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(
                RichText::new(format!(
                    "My Hacker Stories with {} comments.",
                    view.comment_count
                ))
                .color(HN_ORANGE)
                .size(24.0),
            );
            ui.add_space(8.0);

            self.render_search_form(ui, &view);
            ui.separator();

            if view.is_error {
                ui.label(RichText::new("Something went wrong ...").color(Color32::RED));
            }

            self.render_stories_table(ui, &view);
        });

        if !self.pending.is_empty() {
            self.apply_pending();
            ctx.request_repaint();
        }

        // Resolved requests arrive off the UI thread; keep polling while any are out.
        if self.app.in_flight() > 0 {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
