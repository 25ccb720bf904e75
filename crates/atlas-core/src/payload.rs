//! The node-link payload exchanged with ingestion and storage.
//!
//! Link endpoints come in several shapes depending on which stage produced
//! the payload: a bare string id, an integer id, or a whole node object that
//! a layout library embedded in place of the id. All of them deserialize into
//! [`Endpoint`]; [`Endpoint::canonical_id`] is the single place those shapes
//! are reduced to a plain id.

use crate::error::{PayloadError, Result};
use crate::link::{Link, LinkKind};
use crate::node::Node;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// A node id as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Integer(i64),
    Unsigned(u64),
}

impl From<RawId> for String {
    fn from(id: RawId) -> Self {
        match id {
            RawId::Text(s) => s,
            RawId::Integer(n) => n.to_string(),
            RawId::Unsigned(n) => n.to_string(),
        }
    }
}

impl From<&RawId> for String {
    fn from(id: &RawId) -> Self {
        String::from(id.clone())
    }
}

pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

/// Decodes a category tag. A `null` or non-string tag is treated as absent.
pub(crate) fn deserialize_tag<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: From<String> + Default,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(tag) => T::from(tag),
        _ => T::default(),
    })
}

/// Decodes an optional number. Anything other than a JSON number is `None`.
pub(crate) fn deserialize_number<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        _ => None,
    })
}

/// Decodes optional free text. Non-string values are `None`.
pub(crate) fn deserialize_text<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        _ => None,
    })
}

/// One end of a link, before canonicalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Endpoint {
    /// A bare id.
    Id(RawId),

    /// An embedded node reference. Only its `id` field is read.
    Node { id: RawId },

    /// Anything else: `null`, an object without `id`, a list.
    Malformed(Value),
}

impl Endpoint {
    /// Reduces the endpoint to a plain id. Malformed endpoints have none.
    pub fn canonical_id(&self) -> Option<String> {
        match self {
            Self::Id(id) | Self::Node { id } => {
                let id = String::from(id);
                if id.is_empty() {
                    None
                } else {
                    Some(id)
                }
            }
            Self::Malformed(_) => None,
        }
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::Malformed(Value::Null)
    }
}

impl From<&str> for Endpoint {
    fn from(id: &str) -> Self {
        Self::Id(RawId::Text(id.to_string()))
    }
}

impl From<String> for Endpoint {
    fn from(id: String) -> Self {
        Self::Id(RawId::Text(id))
    }
}

/// A link as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLink {
    #[serde(default)]
    pub source: Endpoint,

    #[serde(default)]
    pub target: Endpoint,

    #[serde(rename = "type", default, deserialize_with = "deserialize_tag")]
    pub kind: LinkKind,

    #[serde(
        default,
        deserialize_with = "deserialize_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub weight: Option<f64>,
}

impl RawLink {
    pub fn new(source: impl Into<Endpoint>, target: impl Into<Endpoint>, kind: LinkKind) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
            weight: None,
        }
    }
}

impl From<Link> for RawLink {
    fn from(link: Link) -> Self {
        Self {
            source: link.source.into(),
            target: link.target.into(),
            kind: link.kind,
            weight: link.weight,
        }
    }
}

/// A complete node-link document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphPayload {
    #[serde(default)]
    pub nodes: Vec<Node>,

    #[serde(default, alias = "edges")]
    pub links: Vec<RawLink>,
}

impl GraphPayload {
    pub fn new(nodes: Vec<Node>, links: Vec<RawLink>) -> Self {
        Self { nodes, links }
    }

    /// Parses a payload from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a payload file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| PayloadError::io(path, e))?;
        Self::from_json(&json)
    }

    /// Serializes the payload as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_forms() {
        let links: Vec<RawLink> = serde_json::from_str(
            r#"[
                {"source": "a", "target": 3},
                {"source": {"id": "a", "x": 1.5, "label": "A"}, "target": {"id": 3}},
                {"source": null, "target": {"name": "no id"}}
            ]"#,
        )
        .unwrap();

        assert_eq!(links[0].source.canonical_id().as_deref(), Some("a"));
        assert_eq!(links[0].target.canonical_id().as_deref(), Some("3"));
        assert_eq!(links[1].source.canonical_id().as_deref(), Some("a"));
        assert_eq!(links[1].target.canonical_id().as_deref(), Some("3"));
        assert_eq!(links[2].source.canonical_id(), None);
        assert_eq!(links[2].target.canonical_id(), None);
    }

    #[test]
    fn test_missing_endpoint_is_malformed() {
        let link: RawLink = serde_json::from_str(r#"{"source": "a"}"#).unwrap();
        assert_eq!(link.target.canonical_id(), None);
    }

    #[test]
    fn test_empty_string_id_is_not_canonical() {
        assert_eq!(Endpoint::from("").canonical_id(), None);
    }

    #[test]
    fn test_mistyped_link_fields_fall_back() {
        let payload = GraphPayload::from_json(
            r#"{"links": [
                {"source": "a", "target": "b", "type": "uses", "weight": 2},
                {"source": "a", "target": "b", "type": null, "weight": "0.5"},
                {"source": "a", "target": "b", "type": 7, "weight": null}
            ]}"#,
        )
        .unwrap();

        assert_eq!(payload.links[0].kind, LinkKind::Uses);
        assert_eq!(payload.links[0].weight, Some(2.0));
        for link in &payload.links[1..] {
            assert_eq!(link.kind, LinkKind::RelatedTo);
            assert_eq!(link.weight, None);
        }
    }

    #[test]
    fn test_payload_accepts_edges_alias() {
        let payload = GraphPayload::from_json(
            r#"{"nodes": [{"id": "a"}, {"id": "b"}], "edges": [{"source": "a", "target": "b"}]}"#,
        )
        .unwrap();
        assert_eq!(payload.nodes.len(), 2);
        assert_eq!(payload.links.len(), 1);
    }

    #[test]
    fn test_invalid_json_is_error() {
        let err = GraphPayload::from_json("{ nodes: ").unwrap_err();
        assert!(matches!(err, PayloadError::Json(_)));
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = GraphPayload::from_path(Path::new("/nonexistent/atlas.json")).unwrap_err();
        assert!(matches!(err, PayloadError::Io { .. }));
    }
}
