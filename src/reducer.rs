use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::StoriesError;
use crate::models::{StoriesState, Story};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoriesAction {
    FetchInit,
    FetchSuccess { list: Vec<Story>, page: u32 },
    FetchFailure,
    RemoveStory(Story),
}

impl StoriesAction {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FetchInit => "FETCH_INIT",
            Self::FetchSuccess { .. } => "FETCH_SUCCESS",
            Self::FetchFailure => "FETCH_FAILURE",
            Self::RemoveStory(_) => "REMOVE_STORY",
        }
    }
}

/// Untyped action as it arrives from outside the crate, e.g.
/// `{"type": "REMOVE_STORY", "payload": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAction {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Deserialize)]
struct SuccessPayload {
    list: Vec<Story>,
    page: u32,
}

impl TryFrom<RawAction> for StoriesAction {
    type Error = StoriesError;

    fn try_from(raw: RawAction) -> Result<Self, Self::Error> {
        let invalid = |source| StoriesError::InvalidPayload {
            kind: raw.kind.clone(),
            source,
        };

        match raw.kind.as_str() {
            "FETCH_INIT" => Ok(Self::FetchInit),
            "FETCH_FAILURE" => Ok(Self::FetchFailure),
            "FETCH_SUCCESS" => {
                let SuccessPayload { list, page } =
                    serde_json::from_value(raw.payload.clone()).map_err(invalid)?;
                Ok(Self::FetchSuccess { list, page })
            }
            "REMOVE_STORY" => {
                let item = serde_json::from_value(raw.payload.clone()).map_err(invalid)?;
                Ok(Self::RemoveStory(item))
            }
            other => Err(StoriesError::UnknownAction(other.to_string())),
        }
    }
}

/// Pure transition function. Page 0 replaces `data`, later pages append to it.
pub fn reduce(state: &StoriesState, action: StoriesAction) -> StoriesState {
    match action {
        StoriesAction::FetchInit => StoriesState {
            is_loading: true,
            is_error: false,
            ..state.clone()
        },
        StoriesAction::FetchSuccess { list, page } => {
            let data = if page == 0 {
                list
            } else {
                let mut data = state.data.clone();
                data.extend(list);
                data
            };
            StoriesState {
                data,
                page,
                is_loading: false,
                is_error: false,
            }
        }
        StoriesAction::FetchFailure => StoriesState {
            is_loading: false,
            is_error: true,
            ..state.clone()
        },
        StoriesAction::RemoveStory(item) => StoriesState {
            data: state
                .data
                .iter()
                .filter(|story| story.object_id != item.object_id)
                .cloned()
                .collect(),
            ..state.clone()
        },
    }
}

/// Sole owner of [`StoriesState`]. Every dispatch produces a new snapshot and
/// bumps `version`, which derived values use to detect change.
#[derive(Debug, Default)]
pub struct StoriesStore {
    state: StoriesState,
    version: u64,
}

impl StoriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &StoriesState {
        &self.state
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn dispatch(&mut self, action: StoriesAction) {
        debug!(action = action.kind(), version = self.version + 1, "dispatch");
        self.state = reduce(&self.state, action);
        self.version += 1;
    }

    /// Dispatch an untyped action. Unknown kinds and malformed payloads are
    /// rejected before the state is touched.
    pub fn dispatch_raw(&mut self, raw: RawAction) -> Result<(), StoriesError> {
        let action = StoriesAction::try_from(raw)?;
        self.dispatch(action);
        Ok(())
    }
}
