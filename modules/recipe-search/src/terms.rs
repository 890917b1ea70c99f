use std::collections::HashSet;

/// Fold ordered candidate lists into one ordered set: entries are trimmed,
/// blanks dropped, and only the first occurrence of each value kept.
pub fn merge_ordered<L, S>(lists: impl IntoIterator<Item = L>) -> Vec<String>
where
    L: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for term in lists.into_iter().flatten() {
        let term = term.as_ref().trim();
        if term.is_empty() || !seen.insert(term.to_string()) {
            continue;
        }
        merged.push(term.to_string());
    }
    merged
}

/// First whitespace-delimited token, used as the broadest fallback term.
pub fn first_token(query: &str) -> Option<&str> {
    query.split_whitespace().next()
}
