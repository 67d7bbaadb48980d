//! Flattened schema index for Landofiles.
//!
//! The authoritative Landofile schema is a recursive JSON Schema document
//! (`$ref`, `$defs`, `oneOf`/`anyOf`, `patternProperties`). Editor features
//! need to answer "what is documented at `services/appserver/type`?" many
//! times per keystroke, so the schema is flattened once into an ordered
//! `path -> PropertyDescriptor` map.
//!
//! # Usage
//!
//! ```rust
//! use landofile_schema::SchemaIndex;
//! use serde_json::json;
//!
//! let schema = json!({
//!     "$defs": { "Svc": { "type": "object", "description": "A service" } },
//!     "properties": {
//!         "name": { "type": "string" },
//!         "services": { "patternProperties": { ".*": { "$ref": "#/$defs/Svc" } } }
//!     }
//! });
//!
//! let index = SchemaIndex::flatten(&schema);
//! assert!(index.get("name").is_some());
//! let (path, svc) = index.lookup(&["services", "appserver"]).unwrap();
//! assert_eq!(path, "services/*");
//! assert_eq!(svc.description.as_deref(), Some("A service"));
//! ```

pub mod descriptor;
pub mod error;
pub mod index;
pub mod node;

pub use descriptor::{PropertyDescriptor, value_label};
pub use error::{SchemaError, SchemaResult};
pub use index::{DEFS_SEGMENT, SchemaIndex, WILDCARD, resolve_pointer};
pub use node::{Combinator, NodeKind, PatternProperty, SchemaAnnotations, SchemaNode, TypeSpec};
