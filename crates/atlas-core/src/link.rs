//! Typed relationships between concepts.
//!
//! The vocabulary is small on purpose: it covers what the extraction prompts
//! ask the model to emit. Anything else is kept as [`LinkKind::Other`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// The type of relationship between two concepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LinkKind {
    /// A makes B possible.
    Enables,

    /// A produces B.
    Causes,

    /// A method or application uses a material or mechanism.
    Uses,

    /// A improves a property of B.
    Improves,

    /// Composition: A is part of B.
    PartOf,

    /// A was derived from B.
    DerivedFrom,

    /// A measures or characterizes B.
    Measures,

    /// A contradicts B.
    Contradicts,

    /// Untyped association. Used when the payload omits the tag.
    RelatedTo,

    /// Any tag outside the vocabulary.
    Other(String),
}

impl LinkKind {
    /// Parses a relationship tag. Case, `_` and `-` are ignored, so
    /// `part_of`, `partOf` and `PART-OF` are the same tag.
    pub fn parse(tag: &str) -> Self {
        let folded: String = tag
            .chars()
            .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();

        match folded.as_str() {
            "enables" => Self::Enables,
            "causes" => Self::Causes,
            "uses" => Self::Uses,
            "improves" => Self::Improves,
            "partof" => Self::PartOf,
            "derivedfrom" => Self::DerivedFrom,
            "measures" => Self::Measures,
            "contradicts" => Self::Contradicts,
            "relatedto" | "" => Self::RelatedTo,
            _ => Self::Other(tag.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Enables => "enables",
            Self::Causes => "causes",
            Self::Uses => "uses",
            Self::Improves => "improves",
            Self::PartOf => "part_of",
            Self::DerivedFrom => "derived_from",
            Self::Measures => "measures",
            Self::Contradicts => "contradicts",
            Self::RelatedTo => "related_to",
            Self::Other(tag) => tag,
        }
    }
}

impl Default for LinkKind {
    fn default() -> Self {
        Self::RelatedTo
    }
}

impl From<String> for LinkKind {
    fn from(tag: String) -> Self {
        Self::parse(&tag)
    }
}

impl From<LinkKind> for String {
    fn from(kind: LinkKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated link. Both endpoints are plain node ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub source: String,
    pub target: String,

    #[serde(rename = "type", default)]
    pub kind: LinkKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl Link {
    /// Creates a new link.
    pub fn new(source: impl Into<String>, target: impl Into<String>, kind: LinkKind) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
            weight: None,
        }
    }
}
