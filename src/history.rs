use crate::api::extract_search_term;

/// Number of terms kept before the current one is dropped.
const HISTORY_WINDOW: usize = 6;

/// Recent searches for the history buttons, oldest first, excluding the
/// current search. Consecutive repeats of a term collapse into one entry.
pub fn derive_last_searches(urls: &[String]) -> Vec<String> {
    let mut collapsed: Vec<String> = Vec::with_capacity(urls.len());
    for url in urls {
        let term = extract_search_term(url);
        if collapsed.last() != Some(&term) {
            collapsed.push(term);
        }
    }

    let start = collapsed.len().saturating_sub(HISTORY_WINDOW);
    let mut recent = collapsed.split_off(start);
    recent.pop();
    recent
}
