pub mod aggregate;
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod fetch;
pub mod history;
pub mod models;
pub mod reducer;
pub mod sort;
pub mod storage;

pub use app::{StoriesApp, StoriesView};
pub use config::AppConfig;
pub use error::StoriesError;
pub use models::{SearchResponse, StoriesState, Story};
pub use reducer::{reduce, RawAction, StoriesAction, StoriesStore};
