//! LIKE pattern escaping.

/// Escape character used with `LIKE ... ESCAPE '\'`
pub const LIKE_ESCAPE: char = '\\';

/// Escape `%`, `_` and the escape character itself so user input matches
/// literally inside a LIKE pattern.
pub fn escape_like(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            result.push(LIKE_ESCAPE);
        }
        result.push(c);
    }
    result
}

/// Unicode case folding used for `universities.search_name`.
///
/// SQLite's `lower()` and `LIKE` only fold ASCII, so names and search terms
/// are both folded here instead.
pub fn fold_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Case-folded `%term%` pattern for substring search.
#[inline]
pub fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like(&fold_name(term)))
}
