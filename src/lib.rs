//! A JSON Schema validation engine built around a URI-addressable registry
//! of compiled schemas.
//!
//! - Draft 2020-12 and Draft 2019-09, including `$dynamicRef` /
//!   `$dynamicAnchor` and the legacy `$recursiveRef` / `$recursiveAnchor`
//! - Embedded `$id` resources, anchors, and cross-document references
//!   through a pluggable resolver chain
//! - Meta-schema validation with transactional registration: a rejected
//!   document rolls the registry back to its previous state
//! - Annotation-aware evaluation, so `unevaluatedItems` /
//!   `unevaluatedProperties` see what the other applicators matched
//!
//! # One-off validation
//!
//! ```rust
//! use serde_json::json;
//!
//! let schema = json!({"type": "string"});
//! assert!(schemantic::is_valid(&schema, &json!("Hello, world!")).expect("Invalid schema"));
//! assert!(!schemantic::is_valid(&schema, &json!(42)).expect("Invalid schema"));
//! ```
//!
//! # A registry of schemas
//!
//! Schemas address each other by URI. Register documents once, then
//! validate against any registered URI:
//!
//! ```rust
//! use serde_json::json;
//!
//! let mut validator = schemantic::Validator::new();
//! validator
//!     .register_schema_at(
//!         "https://example.com/item",
//!         &json!({"type": "object", "required": ["name"]}),
//!     )
//!     .expect("Invalid schema");
//! validator
//!     .register_schema_at(
//!         "https://example.com/list",
//!         &json!({"type": "array", "items": {"$ref": "item"}}),
//!     )
//!     .expect("Invalid schema");
//!
//! let result = validator
//!     .validate("https://example.com/list", &json!([{"name": "a"}, {}]))
//!     .expect("Unknown URI");
//! assert!(!result.is_valid());
//! ```
//!
//! # Configuration
//!
//! ```rust
//! use serde_json::json;
//!
//! let mut validator = schemantic::options()
//!     .with_draft(schemantic::Draft::Draft201909)
//!     .should_validate_formats(true)
//!     .build_validator();
//! let uri = validator
//!     .register_schema(&json!({"format": "ipv4"}))
//!     .expect("Invalid schema");
//! assert!(!validator
//!     .is_valid(uri.as_str(), &json!("999.0.0.1"))
//!     .expect("Unknown URI"));
//! ```
//!
//! External documents are supplied through [`SchemaResolver`]
//! implementations; the engine consults already-registered URIs, its
//! embedded specification meta-schemas, and then the user resolvers, in
//! that order.
mod compiler;
mod context;
mod dialect;
mod error;
mod keywords;
mod meta;
mod node;
mod options;
mod output;
mod paths;
mod primitive_type;
mod registry;
mod resolver;
mod schema;
mod uri;
mod validator;
mod vocabularies;

use serde_json::Value;

pub use compiler::{EvaluatorFactory, ParseContext};
pub use context::EvaluationContext;
pub use dialect::{Dialect, Draft};
pub use error::{Error, SchemaError, UriError};
pub use node::{NodeFactory, SerdeNodeFactory};
pub use options::ValidationOptions;
pub use output::{ErrorDescription, OutputUnit, Validation};
pub use paths::{LazyLocation, Location, LocationSegment, SegmentRef};
pub use primitive_type::PrimitiveType;
pub use registry::Registry;
pub use resolver::{Resolution, SchemaResolver};
pub use schema::{BoxedEvaluator, Evaluate, Schema, SchemaRef};
pub use uri::{CompoundUri, Fragment};
pub use validator::Validator;
pub use vocabularies::{Vocabulary, VocabularySet};

/// Configuration options for building a [`Validator`].
#[must_use]
pub fn options() -> ValidationOptions {
    ValidationOptions::default()
}

/// Build a [`Validator`] with `schema` registered under default options.
///
/// # Errors
///
/// Returns an error if the schema cannot be registered.
pub fn validator_for(schema: &Value) -> Result<Validator, Error> {
    options().build(schema)
}

/// Validate `instance` against `schema` without keeping anything around.
///
/// # Errors
///
/// Returns an error if the schema cannot be registered.
pub fn validate_once(schema: &Value, instance: &Value) -> Result<Validation, Error> {
    ValidationOptions::default().validate_once(schema, instance)
}

/// One-off boolean validation of `instance` against `schema`.
///
/// # Errors
///
/// Returns an error if the schema cannot be registered.
pub fn is_valid(schema: &Value, instance: &Value) -> Result<bool, Error> {
    validate_once(schema, instance).map(|result| result.is_valid())
}
