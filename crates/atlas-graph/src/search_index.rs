//! Search index for fast token and substring matching.
//!
//! This module provides an inverted index over the text of every node
//! (label, description, type tag and id). Text is split into tokens; each
//! token maps to the nodes containing it. A second n-gram index over the
//! tokens themselves answers substring queries without scanning every token.

use crate::graph::{KnowledgeGraph, NodeId};
use atlas_core::Node;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Tokens of this length or shorter are discarded.
const MAX_DISCARDED_TOKEN_LEN: usize = 2;

/// Minimum n-gram length for indexing.
const MIN_NGRAM_LEN: usize = 2;

/// Maximum n-gram length for indexing.
const MAX_NGRAM_LEN: usize = 4;

/// Splits text into search tokens.
///
/// Lower-cases, strips every character that is not alphanumeric, `_` or
/// whitespace, splits on whitespace and drops tokens of two characters or
/// fewer. Stripping joins the pieces of a word: "heat-transfer" becomes the
/// single token "heattransfer".
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();

    cleaned
        .split_whitespace()
        .filter(|token| token.chars().count() > MAX_DISCARDED_TOKEN_LEN)
        .map(str::to_string)
        .collect()
}

/// An inverted index over node text.
#[derive(Debug, Default, Clone)]
pub struct SearchIndex {
    /// Maps tokens to the nodes whose text contains them.
    token_index: HashMap<String, HashSet<NodeId>>,
    /// Maps n-grams to the tokens containing them, for substring search.
    ngram_index: HashMap<String, HashSet<String>>,
}

impl SearchIndex {
    /// Creates a new empty search index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes every node of a graph.
    pub fn build(graph: &KnowledgeGraph) -> Self {
        let mut index = Self::new();
        for idx in graph.node_indexes() {
            if let Some(node) = graph.get(idx) {
                index.insert(idx, node);
            }
        }
        debug!(
            nodes = graph.node_count(),
            tokens = index.len(),
            "search index built"
        );
        index
    }

    /// Inserts a node's text fields into the index.
    pub fn insert(&mut self, id: NodeId, node: &Node) {
        let fields = [
            node.label.as_deref(),
            node.description.as_deref(),
            Some(node.kind.as_str()),
            Some(node.id.as_str()),
        ];

        for text in fields.into_iter().flatten() {
            for token in tokenize(text) {
                if !self.token_index.contains_key(&token) {
                    for ngram in generate_ngrams(&token) {
                        self.ngram_index
                            .entry(ngram)
                            .or_default()
                            .insert(token.clone());
                    }
                }
                self.token_index.entry(token).or_default().insert(id);
            }
        }
    }

    /// Returns the nodes containing exactly this token, sorted.
    ///
    /// The term goes through the same normalization as indexed text, so
    /// "Graphene" and "graphene," both find the token "graphene".
    pub fn lookup(&self, term: &str) -> Vec<NodeId> {
        let tokens = tokenize(term);
        let [token] = tokens.as_slice() else {
            return Vec::new();
        };

        let mut results: Vec<NodeId> = self
            .token_index
            .get(token)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default();
        results.sort();
        results
    }

    /// Searches for nodes matching every token of the query.
    ///
    /// A query token matches a node when it is a substring of one of the
    /// node's tokens. Returns matching NodeIds sorted for deterministic
    /// output; a query with no usable tokens matches nothing.
    pub fn search(&self, query: &str) -> Vec<NodeId> {
        let query_tokens = tokenize(query);
        if query_tokens.is_empty() {
            return Vec::new();
        }

        let mut matches: Option<HashSet<NodeId>> = None;

        for query_token in &query_tokens {
            let found = self.nodes_with_substring(query_token);
            match &mut matches {
                None => matches = Some(found),
                Some(m) => m.retain(|id| found.contains(id)),
            }
            if matches.as_ref().is_some_and(HashSet::is_empty) {
                return Vec::new();
            }
        }

        let mut results: Vec<NodeId> = matches.unwrap_or_default().into_iter().collect();
        results.sort();
        results
    }

    /// Nodes owning at least one token that contains `fragment`.
    fn nodes_with_substring(&self, fragment: &str) -> HashSet<NodeId> {
        // Find candidate tokens by intersecting n-gram matches
        let mut candidates: Option<HashSet<&String>> = None;

        for ngram in generate_ngrams(fragment) {
            let Some(tokens) = self.ngram_index.get(&ngram) else {
                // If any n-gram has no matches, the fragment has no results
                return HashSet::new();
            };
            match &mut candidates {
                None => candidates = Some(tokens.iter().collect()),
                Some(c) => c.retain(|t| tokens.contains(*t)),
            }
        }

        // n-gram intersection can have false positives
        candidates
            .unwrap_or_default()
            .into_iter()
            .filter(|token| token.contains(fragment))
            .filter_map(|token| self.token_index.get(token))
            .flatten()
            .copied()
            .collect()
    }

    /// Returns the number of unique tokens indexed.
    pub fn len(&self) -> usize {
        self.token_index.len()
    }

    /// Returns true if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.token_index.is_empty()
    }
}

/// Generates n-grams for a lowercased token.
fn generate_ngrams(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut ngrams = Vec::new();

    for n in MIN_NGRAM_LEN..=MAX_NGRAM_LEN {
        if chars.len() >= n {
            for i in 0..=(chars.len() - n) {
                ngrams.push(chars[i..i + n].iter().collect());
            }
        }
    }

    ngrams
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_core::{GraphPayload, NodeKind};

    fn indexed() -> (KnowledgeGraph, SearchIndex) {
        let payload = GraphPayload::new(
            vec![
                Node::new("n0", NodeKind::Material)
                    .with_label("Graphene oxide")
                    .with_description("A single-layer carbon lattice."),
                Node::new("n1", NodeKind::Mechanism)
                    .with_label("Heat-transfer")
                    .with_description("Phonon transport across interfaces"),
                Node::new("n2", NodeKind::Method).with_label("Carbon dating"),
            ],
            vec![],
        );
        let (graph, _) = KnowledgeGraph::from_payload(payload);
        let index = SearchIndex::build(&graph);
        (graph, index)
    }

    fn ids(graph: &KnowledgeGraph, results: &[NodeId]) -> Vec<String> {
        results
            .iter()
            .map(|idx| graph.get(*idx).unwrap().id.clone())
            .collect()
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("A single-layer, carbon LATTICE!"),
            vec!["singlelayer", "carbon", "lattice"]
        );
        assert!(tokenize("a an of").is_empty());
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_lookup_exact_token() {
        let (graph, index) = indexed();
        assert_eq!(ids(&graph, &index.lookup("carbon")), vec!["n0", "n2"]);
        assert_eq!(ids(&graph, &index.lookup("Carbon,")), vec!["n0", "n2"]);
        assert!(index.lookup("carb").is_empty());
    }

    #[test]
    fn test_type_tag_and_id_are_indexed() {
        let (graph, index) = indexed();
        assert_eq!(ids(&graph, &index.lookup("mechanism")), vec!["n1"]);
        assert!(index.lookup("n0").is_empty(), "two-character ids are discarded");
    }

    #[test]
    fn test_search_substring() {
        let (graph, index) = indexed();
        assert_eq!(ids(&graph, &index.search("carb")), vec!["n0", "n2"]);
        assert_eq!(ids(&graph, &index.search("transf")), vec!["n1"]);
    }

    #[test]
    fn test_search_requires_every_token() {
        let (graph, index) = indexed();
        assert_eq!(ids(&graph, &index.search("carbon lattice")), vec!["n0"]);
        assert!(index.search("carbon phonon").is_empty());
    }

    #[test]
    fn test_search_case_insensitive() {
        let (graph, index) = indexed();
        assert_eq!(ids(&graph, &index.search("GRAPHENE")), vec!["n0"]);
    }

    #[test]
    fn test_search_no_match() {
        let (_, index) = indexed();
        assert!(index.search("superconductor").is_empty());
        assert!(index.search("of").is_empty());
    }
}
