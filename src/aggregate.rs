use crate::models::StoriesState;
use crate::reducer::StoriesStore;

pub fn sum_comments(state: &StoriesState) -> i64 {
    state.data.iter().map(|story| story.num_comments).sum()
}

/// [`sum_comments`] cached against the store version it was computed for.
#[derive(Debug, Default)]
pub struct CommentTotal {
    cached: Option<(u64, i64)>,
}

impl CommentTotal {
    pub fn get(&mut self, store: &StoriesStore) -> i64 {
        match self.cached {
            Some((version, total)) if version == store.version() => total,
            _ => {
                let total = sum_comments(store.state());
                self.cached = Some((store.version(), total));
                total
            }
        }
    }
}
