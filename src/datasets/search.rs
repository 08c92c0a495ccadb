use super::news::{Dataset, Item};

/// The text shown in an untouched search box
pub static DEFAULT_PLACEHOLDER: &str = "input title";

/// The outcome of a title search
#[derive(Clone, Debug)]
pub enum Search {
    /// The query was empty or still the placeholder, so nothing was searched
    NoInput,

    /// Rows whose cleaned title contains every query token, as `(row index, item)` pairs in
    /// dataset order. May be empty.
    Matches(Vec<(usize, Item)>),
}

impl Search {
    /// The number of matching rows
    pub fn len(&self) -> usize {
        match self {
            Search::NoInput => 0,
            Search::Matches(rows) => rows.len(),
        }
    }

    /// True when nothing matched or nothing was searched
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The first `max` matches, which are the only ones offered for selection
    pub fn selectable(&self, max: usize) -> &[(usize, Item)] {
        match self {
            Search::NoInput => &[],
            Search::Matches(rows) => &rows[..rows.len().min(max)],
        }
    }
}

/// Find the articles whose cleaned title contains every whitespace-separated token of the
/// query. Each token narrows the previous token's results, stopping as soon as nothing is left.
pub fn search(query: &str, dataset: &Dataset, placeholder: &str) -> Search {
    let query = query.trim();

    if query.is_empty() || query == placeholder {
        return Search::NoInput;
    }

    let mut tokens = query.split_whitespace();

    let mut results: Vec<(usize, Item)> = match tokens.next() {
        Some(first) => dataset
            .rows()
            .filter(|(_, item)| item.cleaned_title.contains(first))
            .collect(),
        None => return Search::NoInput,
    };

    for token in tokens {
        if results.is_empty() {
            break;
        }

        results.retain(|(_, item)| item.cleaned_title.contains(token));
    }

    if results.is_empty() {
        log::debug!("No matching results for {:?}", query);
    }

    Search::Matches(results)
}
