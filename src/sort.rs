use crate::models::Story;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    None,
    Title,
    Author,
    Comments,
    Points,
}

impl SortKey {
    pub fn label(self) -> &'static str {
        match self {
            SortKey::None => "None",
            SortKey::Title => "Title",
            SortKey::Author => "Author",
            SortKey::Comments => "Comments",
            SortKey::Points => "Points",
        }
    }

    // Stable ascending sort, then reversed for the numeric columns so the
    // largest values come first.
    fn apply(self, list: &mut [Story]) {
        match self {
            SortKey::None => {}
            SortKey::Title => list.sort_by(|a, b| a.title.cmp(&b.title)),
            SortKey::Author => list.sort_by(|a, b| a.author.cmp(&b.author)),
            SortKey::Comments => {
                list.sort_by_key(|story| story.num_comments);
                list.reverse();
            }
            SortKey::Points => {
                list.sort_by_key(|story| story.points);
                list.reverse();
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState {
    pub key: SortKey,
    pub is_reverse: bool,
}

impl SortState {
    /// Selecting the active column again flips the direction; any other
    /// column starts in its natural direction.
    pub fn toggle(&mut self, key: SortKey) {
        self.is_reverse = self.key == key && !self.is_reverse;
        self.key = key;
    }

    pub fn sorted(&self, list: &[Story]) -> Vec<Story> {
        let mut sorted = list.to_vec();
        self.key.apply(&mut sorted);
        if self.is_reverse {
            sorted.reverse();
        }
        sorted
    }
}
