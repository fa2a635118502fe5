//! The pluggable JSON parsing seam.
//!
//! `serde_json::Value` is the engine's tree representation; a [`NodeFactory`]
//! only decides how raw text becomes such a tree. Host values are used as-is.
use serde_json::Value;

/// Produces JSON trees from raw text.
///
/// The default factory is backed by `serde_json`; swap it through
/// [`crate::ValidationOptions::with_node_factory`] to plug in a different
/// parser (e.g. one with duplicate-key detection).
pub trait NodeFactory: Send + Sync {
    /// Parse a raw document.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not valid JSON.
    fn parse(&self, raw: &str) -> Result<Value, Box<dyn std::error::Error + Send + Sync>>;
}

/// The default `serde_json`-backed factory.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeNodeFactory;

impl NodeFactory for SerdeNodeFactory {
    fn parse(&self, raw: &str) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{NodeFactory, SerdeNodeFactory};

    #[test]
    fn parses_raw_documents() {
        let value = SerdeNodeFactory
            .parse(r#"{"type": "string"}"#)
            .expect("Invalid JSON");
        assert_eq!(value, json!({"type": "string"}));
    }

    #[test]
    fn surfaces_parser_failures() {
        assert!(SerdeNodeFactory.parse("{").is_err());
    }
}
