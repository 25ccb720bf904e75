//! Atlas Core - Node and link model for knowledge graphs
//!
//! This crate defines the records that flow between the ingestion side of
//! Atlas (which extracts concepts and relationships from documents) and the
//! analytics in `atlas-graph`.
//!
//! Payloads arrive as loosely shaped JSON: node ids may be strings or
//! integers, and link endpoints may be bare ids or embedded node objects.
//! [`GraphPayload`] accepts all of those forms and [`Endpoint::canonical_id`]
//! reduces each endpoint to a plain string id exactly once, at ingestion.
//!
//! # Example
//!
//! ```
//! use atlas_core::GraphPayload;
//!
//! let payload = GraphPayload::from_json(r#"{
//!     "nodes": [{ "id": "graphene", "type": "Material" }, { "id": 7, "type": "Method" }],
//!     "links": [{ "source": { "id": "graphene" }, "target": 7, "type": "uses" }]
//! }"#).unwrap();
//!
//! assert_eq!(payload.nodes[1].id, "7");
//! assert_eq!(payload.links[0].target.canonical_id().as_deref(), Some("7"));
//! ```

pub mod error;
pub mod link;
pub mod node;
pub mod payload;

pub use error::{PayloadError, Result};
pub use link::{Link, LinkKind};
pub use node::{Node, NodeKind};
pub use payload::{Endpoint, GraphPayload, RawId, RawLink};
