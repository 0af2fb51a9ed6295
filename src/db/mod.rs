pub mod activity_logs;
pub mod categories;
pub mod posts;

/// `%term%` with LIKE wildcards in `term` escaped.
pub(crate) fn contains_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Treat blank filter strings as absent.
pub(crate) fn filter_pattern(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(contains_pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_wildcards() {
        assert_eq!(contains_pattern("Doe"), "%Doe%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn blank_filters_are_ignored() {
        assert_eq!(filter_pattern(None), None);
        assert_eq!(filter_pattern(Some("   ")), None);
        assert_eq!(filter_pattern(Some(" John ")), Some("%John%".to_string()));
    }
}
