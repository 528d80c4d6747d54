//! Footnote types shared by the resolver passes.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// One inline `[^id]` marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FootnoteReference {
    /// Identifier as written in the source
    pub id: String,

    /// Global 1-based position among all references
    pub occurrence_index: usize,

    /// Whether the id was already referenced earlier
    pub is_citation: bool,
}

/// The body of one footnote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FootnoteDefinition {
    /// Identifier as written in the source
    pub id: String,

    /// Content with bare URLs already turned into anchors
    pub html_content: String,
}

/// Everything known about one id.
#[derive(Debug, Clone, Default)]
pub struct RegistryEntry {
    /// Definition, absent when the id is only referenced
    pub definition: Option<FootnoteDefinition>,

    /// Occurrence indices of the references, in order of appearance
    pub occurrences: Vec<usize>,
}

impl RegistryEntry {
    /// Occurrence index of the first reference.
    pub fn first_occurrence(&self) -> Option<usize> {
        self.occurrences.first().copied()
    }

    /// Whether the id is referenced more than once.
    pub fn is_cited_again(&self) -> bool {
        self.occurrences.len() > 1
    }
}

/// Map from footnote id to its definition and references.
#[derive(Debug, Clone, Default)]
pub struct FootnoteRegistry {
    entries: HashMap<String, RegistryEntry>,
}

impl FootnoteRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from the output of the first two passes.
    pub fn build(references: &[FootnoteReference], definitions: Vec<FootnoteDefinition>) -> Self {
        let mut registry = Self::new();
        for reference in references {
            registry.add_reference(reference);
        }
        for definition in definitions {
            registry.add_definition(definition);
        }
        registry
    }

    /// Record a reference.
    pub fn add_reference(&mut self, reference: &FootnoteReference) {
        self.entries
            .entry(reference.id.clone())
            .or_default()
            .occurrences
            .push(reference.occurrence_index);
    }

    /// Record a definition. Returns `false` when the id was already defined,
    /// in which case the earlier definition is kept.
    pub fn add_definition(&mut self, definition: FootnoteDefinition) -> bool {
        let entry = self.entries.entry(definition.id.clone()).or_default();
        if entry.definition.is_some() {
            return false;
        }
        entry.definition = Some(definition);
        true
    }

    /// Look up an id.
    pub fn get(&self, id: &str) -> Option<&RegistryEntry> {
        self.entries.get(id)
    }

    /// Number of distinct ids.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry holds no ids.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of ids that are referenced but never defined.
    pub fn missing_definitions(&self) -> usize {
        self.entries
            .values()
            .filter(|e| e.definition.is_none())
            .count()
    }

    /// All ids in bibliography order.
    ///
    /// When every id is made of ASCII digits the ids sort by numeric value,
    /// otherwise they sort lexicographically.
    pub fn ordered_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        if ids.iter().all(|id| is_numeric_id(id)) {
            ids.sort_by(|a, b| compare_numeric(a, b));
        } else {
            ids.sort_unstable();
        }
        ids
    }
}

/// Whether an id is a non-empty run of ASCII digits.
pub fn is_numeric_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

/// Compare two digit strings by value without parsing them.
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a_trim = a.trim_start_matches('0');
    let b_trim = b.trim_start_matches('0');
    a_trim
        .len()
        .cmp(&b_trim.len())
        .then_with(|| a_trim.cmp(b_trim))
        .then_with(|| a.len().cmp(&b.len()))
}

/// Replace every character outside `[A-Za-z0-9_-]` with `-`.
pub fn safe_id(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(id: &str, index: usize) -> FootnoteReference {
        FootnoteReference {
            id: id.to_string(),
            occurrence_index: index,
            is_citation: false,
        }
    }

    fn definition(id: &str, content: &str) -> FootnoteDefinition {
        FootnoteDefinition {
            id: id.to_string(),
            html_content: content.to_string(),
        }
    }

    #[test]
    fn test_numeric_ordering() {
        let refs = vec![reference("2", 1), reference("10", 2), reference("1", 3)];
        let registry = FootnoteRegistry::build(&refs, Vec::new());
        assert_eq!(registry.ordered_ids(), vec!["1", "2", "10"]);
    }

    #[test]
    fn test_mixed_ordering_is_lexicographic() {
        let refs = vec![reference("a", 1), reference("b", 2), reference("10", 3)];
        let registry = FootnoteRegistry::build(&refs, Vec::new());
        assert_eq!(registry.ordered_ids(), vec!["10", "a", "b"]);
    }

    #[test]
    fn test_first_definition_wins() {
        let mut registry = FootnoteRegistry::new();
        assert!(registry.add_definition(definition("1", "A")));
        assert!(!registry.add_definition(definition("1", "B")));
        let entry = registry.get("1").unwrap();
        assert_eq!(entry.definition.as_ref().unwrap().html_content, "A");
    }

    #[test]
    fn test_missing_definitions_counted() {
        let refs = vec![reference("9", 1), reference("1", 2)];
        let registry = FootnoteRegistry::build(&refs, vec![definition("1", "x")]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.missing_definitions(), 1);
    }

    #[test]
    fn test_first_occurrence_and_citation() {
        let refs = vec![reference("1", 1), reference("2", 2), reference("1", 3)];
        let registry = FootnoteRegistry::build(&refs, Vec::new());
        let entry = registry.get("1").unwrap();
        assert_eq!(entry.first_occurrence(), Some(1));
        assert!(entry.is_cited_again());
        assert!(!registry.get("2").unwrap().is_cited_again());
    }

    #[test]
    fn test_safe_id() {
        assert_eq!(safe_id("note.1"), "note-1");
        assert_eq!(safe_id("a_b-c"), "a_b-c");
        assert_eq!(safe_id("x y"), "x-y");
    }

    #[test]
    fn test_numeric_compare_leading_zeros() {
        assert_eq!(compare_numeric("010", "9"), Ordering::Greater);
        assert_eq!(compare_numeric("99999999999999999999999", "1"), Ordering::Greater);
    }
}
