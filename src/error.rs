use core::fmt;

use fluent_uri::error::{ParseError, ResolveError};

use crate::paths::Location;

/// A single meta-schema violation collected while validating a schema
/// document against its dialect's meta-schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    /// Location of the offending value inside the schema document.
    pub location: Location,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.as_str().is_empty() {
            f.write_str(&self.message)
        } else {
            f.write_fmt(format_args!("{}: {}", self.location, self.message))
        }
    }
}

/// Errors that can occur while registering schemas or resolving references.
///
/// Violations found while *evaluating an instance* are never reported through
/// this type; they are data, carried by [`crate::Validation`].
#[derive(Debug)]
pub enum Error {
    /// A schema document failed validation against its dialect's meta-schema.
    InvalidSchema {
        uri: String,
        errors: Vec<SchemaError>,
    },
    /// The meta-schema required by a dialect could not be obtained or parsed.
    MetaSchemaResolving {
        uri: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
    /// A URI was requested that the registry does not contain.
    SchemaNotFound { reference: String },
    /// An error occurred while parsing or resolving a URI.
    InvalidUri(UriError),
    /// `$id` carried a fragment, which neither supported draft permits.
    InvalidIdentifier { id: String },
    /// An anchor name that could never match (`$anchor` with a slash etc.).
    InvalidAnchor { anchor: String },
    /// An attempt to register a schema under an alias of another URI.
    ReadOnlyRegistry { uri: String },
    /// A user-supplied resolver or its lazy provider failed.
    Resolution {
        uri: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The node factory could not parse a raw document.
    Document {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// An error raised by a user-supplied evaluator factory, passed through
    /// verbatim.
    Keyword {
        keyword: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    pub(crate) fn invalid_schema(uri: impl Into<String>, errors: Vec<SchemaError>) -> Error {
        Error::InvalidSchema {
            uri: uri.into(),
            errors,
        }
    }
    pub(crate) fn meta_schema_resolving(
        uri: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Error {
        Error::MetaSchemaResolving {
            uri: uri.into(),
            source,
        }
    }
    pub(crate) fn schema_not_found(reference: impl Into<String>) -> Error {
        Error::SchemaNotFound {
            reference: reference.into(),
        }
    }
    pub(crate) fn invalid_identifier(id: impl Into<String>) -> Error {
        Error::InvalidIdentifier { id: id.into() }
    }
    pub(crate) fn invalid_anchor(anchor: impl Into<String>) -> Error {
        Error::InvalidAnchor {
            anchor: anchor.into(),
        }
    }
    pub(crate) fn read_only(uri: impl Into<String>) -> Error {
        Error::ReadOnlyRegistry { uri: uri.into() }
    }
    pub(crate) fn resolution(
        uri: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Error {
        Error::Resolution {
            uri: uri.into(),
            source,
        }
    }
    pub(crate) fn document(source: Box<dyn std::error::Error + Send + Sync>) -> Error {
        Error::Document { source }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidSchema { uri, errors } => {
                f.write_fmt(format_args!(
                    "Schema '{uri}' does not conform to its meta-schema"
                ))?;
                for error in errors {
                    f.write_fmt(format_args!("\n  {error}"))?;
                }
                Ok(())
            }
            Error::MetaSchemaResolving { uri, source } => {
                f.write_fmt(format_args!("Meta-schema '{uri}' could not be resolved"))?;
                if let Some(err) = source {
                    f.write_fmt(format_args!(": {err}"))?;
                }
                Ok(())
            }
            Error::SchemaNotFound { reference } => {
                f.write_fmt(format_args!("Schema '{reference}' is not registered"))
            }
            Error::InvalidUri(error) => f.write_fmt(format_args!("Invalid URI: {error}")),
            Error::InvalidIdentifier { id } => f.write_fmt(format_args!(
                "Identifier '{id}' must not contain a non-empty fragment"
            )),
            Error::InvalidAnchor { anchor } => {
                f.write_fmt(format_args!("Anchor '{anchor}' is invalid"))
            }
            Error::ReadOnlyRegistry { uri } => f.write_fmt(format_args!(
                "'{uri}' is an alias of an existing resource and cannot be modified"
            )),
            Error::Resolution { uri, source } => {
                f.write_fmt(format_args!("Failed to resolve '{uri}': {source}"))
            }
            Error::Document { source } => {
                f.write_fmt(format_args!("Failed to parse document: {source}"))
            }
            Error::Keyword { keyword, source } => f.write_fmt(format_args!(
                "Failed to build an evaluator for '{keyword}': {source}"
            )),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MetaSchemaResolving { source, .. } => {
                source.as_ref().map(|s| &**s as &(dyn std::error::Error + 'static))
            }
            Error::InvalidUri(error) => Some(error),
            Error::Resolution { source, .. }
            | Error::Document { source }
            | Error::Keyword { source, .. } => Some(&**source),
            _ => None,
        }
    }
}

/// URI-level failures, kept separate so `source()` can expose the exact
/// `fluent-uri` error.
#[derive(Debug)]
pub enum UriError {
    Parse(ParseError),
    Resolve(ResolveError),
}

impl fmt::Display for UriError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UriError::Parse(err) => err.fmt(f),
            UriError::Resolve(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for UriError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UriError::Parse(err) => Some(err),
            UriError::Resolve(err) => Some(err),
        }
    }
}

impl From<ParseError<String>> for Error {
    fn from(error: ParseError<String>) -> Self {
        Error::InvalidUri(UriError::Parse(error.strip_input()))
    }
}

impl From<ParseError> for Error {
    fn from(error: ParseError) -> Self {
        Error::InvalidUri(UriError::Parse(error))
    }
}

impl From<ResolveError> for Error {
    fn from(error: ResolveError) -> Self {
        Error::InvalidUri(UriError::Resolve(error))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::{Error, SchemaError};
    use crate::paths::Location;

    #[test]
    fn invalid_schema_lists_all_violations() {
        let error = Error::invalid_schema(
            "urn:example",
            vec![
                SchemaError {
                    location: Location::new().join("type"),
                    message: "[] is not valid".to_string(),
                },
                SchemaError {
                    location: Location::new(),
                    message: "unexpected shape".to_string(),
                },
            ],
        );
        assert_eq!(
            error.to_string(),
            "Schema 'urn:example' does not conform to its meta-schema\n  /type: [] is not valid\n  unexpected shape"
        );
    }

    #[test]
    fn uri_error_has_source() {
        let error = crate::uri::from_str(":/example.com").expect_err("Should fail");
        assert_eq!(
            error.to_string(),
            "Invalid URI: unexpected character at index 0"
        );
        assert!(error.source().is_some());
    }

    #[test]
    fn schema_not_found_names_the_reference() {
        let error = Error::schema_not_found("urn:missing");
        assert_eq!(error.to_string(), "Schema 'urn:missing' is not registered");
    }
}
