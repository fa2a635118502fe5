use core::fmt;

use serde_json::Value;

use crate::{meta, node::NodeFactory, Error};

type ProviderFn =
    Box<dyn Fn() -> Result<Value, Box<dyn std::error::Error + Send + Sync>> + Send + Sync>;

/// The outcome of asking a [`SchemaResolver`] for a URI.
pub enum Resolution {
    /// This resolver does not know the URI; the next one in the chain is
    /// consulted.
    Empty,
    /// A raw document, parsed through the configured node factory.
    FromString(String),
    /// An already-parsed document.
    FromValue(Value),
    /// A lazily produced document; the closure runs only if this resolution
    /// wins the chain.
    FromProvider(ProviderFn),
}

impl Resolution {
    /// Lazy resolution from a closure.
    pub fn from_provider(
        provider: impl Fn() -> Result<Value, Box<dyn std::error::Error + Send + Sync>>
            + Send
            + Sync
            + 'static,
    ) -> Resolution {
        Resolution::FromProvider(Box::new(provider))
    }

    pub(crate) fn is_empty(&self) -> bool {
        matches!(self, Resolution::Empty)
    }

    pub(crate) fn materialize(
        self,
        uri: &str,
        factory: &dyn NodeFactory,
    ) -> Result<Option<Value>, Error> {
        match self {
            Resolution::Empty => Ok(None),
            Resolution::FromString(raw) => factory
                .parse(&raw)
                .map(Some)
                .map_err(|err| Error::resolution(uri, err)),
            Resolution::FromValue(value) => Ok(Some(value)),
            Resolution::FromProvider(provider) => provider()
                .map(Some)
                .map_err(|err| Error::resolution(uri, err)),
        }
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Empty => f.write_str("Empty"),
            Resolution::FromString(raw) => f.debug_tuple("FromString").field(raw).finish(),
            Resolution::FromValue(value) => f.debug_tuple("FromValue").field(value).finish(),
            Resolution::FromProvider(_) => f.write_str("FromProvider"),
        }
    }
}

/// Maps an external URI to a schema document source.
///
/// The engine consults, in order: already-registered URIs, the built-in
/// resolver for the specification meta-schemas, then user resolvers. The
/// first non-empty resolution wins.
pub trait SchemaResolver: Send + Sync {
    fn resolve(&self, uri: &str) -> Resolution;
}

/// The built-in resolver serving the embedded specification meta-schemas.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SpecificationResolver;

impl SchemaResolver for SpecificationResolver {
    fn resolve(&self, uri: &str) -> Resolution {
        for (known, document) in meta::META_SCHEMAS.iter() {
            if *known == uri {
                return Resolution::FromValue((*document).clone());
            }
        }
        Resolution::Empty
    }
}

/// Ask every resolver in `chain` for `uri`; first non-empty resolution wins.
pub(crate) fn resolve_through(
    chain: &[std::sync::Arc<dyn SchemaResolver>],
    uri: &str,
    factory: &dyn NodeFactory,
) -> Result<Option<Value>, Error> {
    let builtin = SpecificationResolver;
    let resolution = builtin.resolve(uri);
    if !resolution.is_empty() {
        return resolution.materialize(uri, factory);
    }
    for resolver in chain {
        let resolution = resolver.resolve(uri);
        if !resolution.is_empty() {
            return resolution.materialize(uri, factory);
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Resolution, SchemaResolver, SpecificationResolver};
    use crate::node::SerdeNodeFactory;

    #[test]
    fn builtin_resolver_serves_specification_meta_schemas() {
        let resolution =
            SpecificationResolver.resolve("https://json-schema.org/draft/2020-12/schema");
        let document = resolution
            .materialize("https://json-schema.org/draft/2020-12/schema", &SerdeNodeFactory)
            .expect("Materialization failed")
            .expect("Should be known");
        assert_eq!(
            document.get("$id").and_then(serde_json::Value::as_str),
            Some("https://json-schema.org/draft/2020-12/schema")
        );
    }

    #[test]
    fn builtin_resolver_is_empty_for_unknown_uris() {
        assert!(SpecificationResolver.resolve("urn:unknown").is_empty());
    }

    #[test]
    fn string_resolutions_run_through_the_node_factory() {
        let resolution = Resolution::FromString(r#"{"type": "null"}"#.to_string());
        let document = resolution
            .materialize("urn:raw", &SerdeNodeFactory)
            .expect("Materialization failed");
        assert_eq!(document, Some(json!({"type": "null"})));
        let bad = Resolution::FromString("{".to_string());
        assert!(bad.materialize("urn:raw", &SerdeNodeFactory).is_err());
    }

    #[test]
    fn provider_resolutions_are_lazy() {
        let resolution = Resolution::from_provider(|| Ok(json!(true)));
        assert_eq!(
            resolution
                .materialize("urn:lazy", &SerdeNodeFactory)
                .expect("Materialization failed"),
            Some(json!(true))
        );
    }
}
