//! Category / tag name resolution against a cached snapshot.
//!
//! WordPress rejects unknown term names on `/wp/v2/posts`, so names are
//! matched client-side against the terms fetched after the connection test
//! and only IDs are sent.

use super::types::{Term, TermKind};

/// Session snapshot of the site's categories and tags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermCache {
    pub categories: Vec<Term>,
    pub tags: Vec<Term>,
}

impl TermCache {
    pub fn get(&self, kind: TermKind) -> &[Term] {
        match kind {
            TermKind::Categories => &self.categories,
            TermKind::Tags => &self.tags,
        }
    }

    pub fn set(&mut self, kind: TermKind, terms: Vec<Term>) {
        match kind {
            TermKind::Categories => self.categories = terms,
            TermKind::Tags => self.tags = terms,
        }
    }

    pub fn clear(&mut self) {
        self.categories.clear();
        self.tags.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.tags.is_empty()
    }
}

/// IDs that matched plus the names that did not
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermResolution {
    pub ids: Vec<u64>,
    pub unmatched: Vec<String>,
}

impl TermResolution {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Resolve term names to IDs.
///
/// Matching is case-insensitive and exact. IDs come out in request order
/// without duplicates; each unmatched name is reported once.
pub fn resolve_term_ids<S: AsRef<str>>(names: &[S], cache: &[Term]) -> TermResolution {
    let mut resolution = TermResolution::default();
    let mut seen_unmatched: Vec<String> = Vec::new();

    for name in names {
        let wanted = name.as_ref().trim();
        if wanted.is_empty() {
            continue;
        }
        let wanted_lower = wanted.to_lowercase();

        let mut matched = false;
        for term in cache.iter().filter(|t| t.name.to_lowercase() == wanted_lower) {
            matched = true;
            if !resolution.ids.contains(&term.id) {
                resolution.ids.push(term.id);
            }
        }

        if !matched && !seen_unmatched.contains(&wanted_lower) {
            seen_unmatched.push(wanted_lower);
            resolution.unmatched.push(wanted.to_string());
        }
    }

    resolution
}

#[cfg(test)]
mod tests {
    use super::*;

    fn news_cache() -> Vec<Term> {
        vec![Term::new(3, "News")]
    }

    #[test]
    fn test_case_insensitive_and_deduplicated() {
        let resolution = resolve_term_ids(&["News", "news"], &news_cache());
        assert_eq!(resolution.ids, vec![3]);
        assert!(resolution.unmatched.is_empty());
    }

    #[test]
    fn test_unknown_name_reported() {
        let resolution = resolve_term_ids(&["Unknown"], &news_cache());
        assert!(resolution.ids.is_empty());
        assert_eq!(resolution.unmatched, vec!["Unknown".to_string()]);
    }

    #[test]
    fn test_mixed_names_keep_request_order() {
        let cache = vec![
            Term::new(3, "News"),
            Term::new(7, "Rust"),
            Term::new(9, "Web Development"),
        ];
        let resolution = resolve_term_ids(
            &["web development", "Missing", "RUST", "missing"],
            &cache,
        );
        assert_eq!(resolution.ids, vec![9, 7]);
        assert_eq!(resolution.unmatched, vec!["Missing".to_string()]);
    }

    #[test]
    fn test_no_partial_matches() {
        let resolution = resolve_term_ids(&["New"], &news_cache());
        assert!(resolution.is_empty());
        assert_eq!(resolution.unmatched.len(), 1);
    }

    #[test]
    fn test_cache_by_kind() {
        let mut cache = TermCache::default();
        cache.set(TermKind::Tags, vec![Term::new(1, "rust")]);
        assert!(cache.get(TermKind::Categories).is_empty());
        assert_eq!(cache.get(TermKind::Tags).len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
