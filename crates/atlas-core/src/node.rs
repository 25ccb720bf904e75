//! Concept nodes of the knowledge graph.
//!
//! Each node is a concept extracted from the source corpus: a material, a
//! mechanism, a method and so on. The category set is closed, but payloads
//! from older extraction runs carry tags outside it, so unknown tags are kept
//! verbatim in [`NodeKind::Other`] instead of failing the load.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The category of a concept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    Material,
    Mechanism,
    Method,
    Phenomenon,
    Application,
    /// Theoretical frameworks. Older payloads use the tag "Theory".
    Theoretical,
    Documentation,
    /// System-level concepts that tie several mechanisms together.
    System,
    /// Any tag outside the known categories.
    Other(String),
}

impl NodeKind {
    /// Parses a category tag, ignoring ASCII case.
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "material" => Self::Material,
            "mechanism" => Self::Mechanism,
            "method" => Self::Method,
            "phenomenon" => Self::Phenomenon,
            "application" => Self::Application,
            "theoretical" | "theory" => Self::Theoretical,
            "documentation" => Self::Documentation,
            "system" => Self::System,
            _ => Self::Other(tag.to_string()),
        }
    }

    /// Returns the canonical tag.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Material => "Material",
            Self::Mechanism => "Mechanism",
            Self::Method => "Method",
            Self::Phenomenon => "Phenomenon",
            Self::Application => "Application",
            Self::Theoretical => "Theoretical",
            Self::Documentation => "Documentation",
            Self::System => "System",
            Self::Other(tag) => tag,
        }
    }

    /// True for tags outside the known categories.
    pub fn is_other(&self) -> bool {
        matches!(self, Self::Other(_))
    }
}

impl Default for NodeKind {
    fn default() -> Self {
        Self::Other("Unknown".to_string())
    }
}

impl From<String> for NodeKind {
    fn from(tag: String) -> Self {
        Self::parse(&tag)
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A concept in the knowledge graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier. Integer ids in the payload become decimal strings.
    #[serde(deserialize_with = "crate::payload::deserialize_id")]
    pub id: String,

    /// Concept category.
    #[serde(
        rename = "type",
        default,
        deserialize_with = "crate::payload::deserialize_tag"
    )]
    pub kind: NodeKind,

    /// Human-readable name.
    #[serde(
        default,
        deserialize_with = "crate::payload::deserialize_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub label: Option<String>,

    /// Free text summary from extraction.
    #[serde(
        default,
        deserialize_with = "crate::payload::deserialize_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,

    /// Optional magnitude used for level-of-detail importance.
    #[serde(
        default,
        deserialize_with = "crate::payload::deserialize_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<f64>,

    /// Layout position, when the renderer has already placed the node.
    #[serde(
        default,
        deserialize_with = "crate::payload::deserialize_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub x: Option<f64>,

    #[serde(
        default,
        deserialize_with = "crate::payload::deserialize_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub y: Option<f64>,
}

impl Node {
    /// Creates a node with no optional fields set.
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            label: None,
            description: None,
            value: None,
            x: None,
            y: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    /// Returns the position if both coordinates are set.
    pub fn position(&self) -> Option<(f64, f64)> {
        Some((self.x?, self.y?))
    }

    /// Label if present, otherwise the id.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse_is_case_insensitive() {
        assert_eq!(NodeKind::parse("material"), NodeKind::Material);
        assert_eq!(NodeKind::parse("SYSTEM"), NodeKind::System);
        assert_eq!(NodeKind::parse("Theory"), NodeKind::Theoretical);
    }

    #[test]
    fn test_unknown_kind_is_preserved() {
        let kind = NodeKind::parse("Catalyst");
        assert!(kind.is_other());
        assert_eq!(kind.as_str(), "Catalyst");
    }

    #[test]
    fn test_node_deserializes_integer_id() {
        let node: Node = serde_json::from_str(r#"{"id": 42, "type": "method"}"#).unwrap();
        assert_eq!(node.id, "42");
        assert_eq!(node.kind, NodeKind::Method);
        assert!(node.label.is_none());
    }

    #[test]
    fn test_node_missing_type_defaults() {
        let node: Node = serde_json::from_str(r#"{"id": "n1"}"#).unwrap();
        assert_eq!(node.kind, NodeKind::default());
    }

    #[test]
    fn test_mistyped_optional_fields_are_absent() {
        let node: Node = serde_json::from_str(
            r#"{"id": "n1", "type": null, "label": 3, "value": "big", "x": 1, "y": null}"#,
        )
        .unwrap();
        assert_eq!(node.kind, NodeKind::default());
        assert_eq!(node.label, None);
        assert_eq!(node.value, None);
        assert_eq!(node.x, Some(1.0));
        assert_eq!(node.position(), None);
    }

    #[test]
    fn test_position_requires_both_coordinates() {
        let mut node = Node::new("n", NodeKind::Material);
        node.x = Some(1.0);
        assert_eq!(node.position(), None);

        let node = node.with_position(1.0, 2.0);
        assert_eq!(node.position(), Some((1.0, 2.0)));
    }

    #[test]
    fn test_serialize_skips_empty_fields() {
        let node = Node::new("n", NodeKind::Phenomenon).with_label("Superconductivity");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "Phenomenon");
        assert_eq!(json["label"], "Superconductivity");
        assert!(json.get("value").is_none());
    }
}
