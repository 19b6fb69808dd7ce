//! Fuzzy lookup over a fixed snapshot of entries.

/// Hard cap on the number of candidates any search returns.
pub const MAX_CANDIDATES: usize = 96;

/// Weight separating match tiers in a score; distances never cross it.
const TIER_WEIGHT: u32 = 10_000;

/// How a query matched a key, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    Exact,
    Prefix,
    WordStart,
    Substring,
    Subsequence,
}

/// Position of an entry in the index together with its score (lower is better).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranked {
    pub index: usize,
    pub score: u32,
}

/// A read-only snapshot of entries, each searchable under one or more keys.
#[derive(Debug, Clone)]
pub struct SearchIndex<T> {
    entries: Vec<T>,
    /// Lowercased search keys, parallel to `entries`
    keys: Vec<Vec<String>>,
}

impl<T> SearchIndex<T> {
    pub fn new<F>(entries: Vec<T>, key_fn: F) -> Self
    where
        F: Fn(&T) -> Vec<String>,
    {
        let keys = entries
            .iter()
            .map(|e| key_fn(e).into_iter().map(|k| k.to_lowercase()).collect())
            .collect();
        SearchIndex { entries, keys }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    /// Rank every entry against `query`, best first, capped at
    /// [`MAX_CANDIDATES`].
    pub fn search(&self, query: &str) -> Vec<Ranked> {
        self.search_where(query, |_| true)
    }

    /// Like [`search`](Self::search), restricted to entries accepted by `filter`.
    ///
    /// An empty query accepts every entry with score 0. Ties keep index order.
    pub fn search_where<F>(&self, query: &str, filter: F) -> Vec<Ranked>
    where
        F: Fn(&T) -> bool,
    {
        let query = query.trim().to_lowercase();
        let mut ranked: Vec<Ranked> = self
            .entries
            .iter()
            .zip(&self.keys)
            .enumerate()
            .filter(|(_, (entry, _))| filter(*entry))
            .filter_map(|(index, (_, keys))| {
                let score = if query.is_empty() {
                    0
                } else {
                    keys.iter().filter_map(|k| score(&query, k)).min()?
                };
                Some(Ranked { index, score })
            })
            .collect();

        // Stable: equal scores keep index order
        ranked.sort_by_key(|r| r.score);
        ranked.truncate(MAX_CANDIDATES);
        ranked
    }
}

/// Classify how `query` matches `key`. Both must already be lowercase.
pub fn match_tier(query: &str, key: &str) -> Option<MatchTier> {
    if key == query {
        return Some(MatchTier::Exact);
    }
    if key.starts_with(query) {
        return Some(MatchTier::Prefix);
    }
    if let Some(pos) = key.find(query) {
        let at_word_start = key[..pos]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        return Some(if at_word_start {
            MatchTier::WordStart
        } else {
            MatchTier::Substring
        });
    }
    if is_subsequence(query, key) {
        return Some(MatchTier::Subsequence);
    }
    None
}

/// Score a lowercase query against a lowercase key; `None` if it does not match.
pub fn score(query: &str, key: &str) -> Option<u32> {
    let tier = match_tier(query, key)?;
    let distance = strsim::levenshtein(query, key).min(TIER_WEIGHT as usize - 1) as u32;
    Some(tier as u32 * TIER_WEIGHT + distance)
}

fn is_subsequence(query: &str, key: &str) -> bool {
    let mut key_chars = key.chars();
    query.chars().all(|q| key_chars.any(|k| k == q))
}
