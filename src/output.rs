//! Structured evaluation outcomes.
//!
//! Every error or annotation produced while evaluating an instance is an
//! [`OutputUnit`]: a value plus the schema and instance locations it applies
//! to, in the spirit of the Draft 2020-12 output format (without promising
//! byte-exact output-unit reports).
use core::fmt;

use fluent_uri::Uri;
use serde::ser::SerializeMap;
use serde_json::Value;

use crate::paths::Location;

/// The result of evaluating an instance against a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    valid: bool,
    errors: Vec<OutputUnit<ErrorDescription>>,
    annotations: Vec<OutputUnit<Value>>,
}

impl Validation {
    pub(crate) fn new(
        valid: bool,
        errors: Vec<OutputUnit<ErrorDescription>>,
        annotations: Vec<OutputUnit<Value>>,
    ) -> Validation {
        Validation {
            valid,
            errors,
            annotations,
        }
    }

    /// Whether the instance satisfied the schema.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Errors, in evaluation order. Empty for valid instances.
    #[must_use]
    pub fn errors(&self) -> &[OutputUnit<ErrorDescription>] {
        &self.errors
    }

    /// Annotations contributed by passing keywords, in evaluation order.
    #[must_use]
    pub fn annotations(&self) -> &[OutputUnit<Value>] {
        &self.annotations
    }
}

impl serde::Serialize for Validation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map_ser = serializer.serialize_map(Some(2))?;
        map_ser.serialize_entry("valid", &self.valid)?;
        if self.valid {
            map_ser.serialize_entry("annotations", &self.annotations)?;
        } else {
            map_ser.serialize_entry("errors", &self.errors)?;
        }
        map_ser.end()
    }
}

/// A value attached to a place in a schema and a place in an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputUnit<T> {
    keyword_location: Location,
    instance_location: Location,
    absolute_keyword_location: Option<Uri<String>>,
    value: T,
}

impl<T> OutputUnit<T> {
    pub(crate) const fn new(
        keyword_location: Location,
        instance_location: Location,
        absolute_keyword_location: Option<Uri<String>>,
        value: T,
    ) -> OutputUnit<T> {
        OutputUnit {
            keyword_location,
            instance_location,
            absolute_keyword_location,
            value,
        }
    }

    /// The location of the keyword, relative to the evaluation root.
    pub const fn keyword_location(&self) -> &Location {
        &self.keyword_location
    }

    /// The location in the instance.
    pub const fn instance_location(&self) -> &Location {
        &self.instance_location
    }

    /// The canonical URI of the keyword, when the schema has one.
    pub fn absolute_keyword_location(&self) -> Option<Uri<&str>> {
        self.absolute_keyword_location
            .as_ref()
            .map(|uri| uri.borrow())
    }

    /// The error or annotation value.
    pub const fn value(&self) -> &T {
        &self.value
    }
}

impl serde::Serialize for OutputUnit<ErrorDescription> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map_ser = serializer.serialize_map(Some(4))?;
        map_ser.serialize_entry("keywordLocation", &self.keyword_location)?;
        map_ser.serialize_entry("instanceLocation", &self.instance_location)?;
        if let Some(absolute) = &self.absolute_keyword_location {
            map_ser.serialize_entry("absoluteKeywordLocation", absolute.as_str())?;
        }
        map_ser.serialize_entry("error", &self.value)?;
        map_ser.end()
    }
}

impl serde::Serialize for OutputUnit<Value> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map_ser = serializer.serialize_map(Some(4))?;
        map_ser.serialize_entry("keywordLocation", &self.keyword_location)?;
        map_ser.serialize_entry("instanceLocation", &self.instance_location)?;
        if let Some(absolute) = &self.absolute_keyword_location {
            map_ser.serialize_entry("absoluteKeywordLocation", absolute.as_str())?;
        }
        map_ser.serialize_entry("annotation", &self.value)?;
        map_ser.end()
    }
}

/// An error message associated with an [`OutputUnit`].
#[derive(serde::Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorDescription(String);

impl ErrorDescription {
    /// Returns the inner [`String`] of the error description.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ErrorDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ErrorDescription {
    fn from(message: String) -> Self {
        ErrorDescription(message)
    }
}

impl From<&str> for ErrorDescription {
    fn from(message: &str) -> Self {
        ErrorDescription(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ErrorDescription, OutputUnit, Validation};
    use crate::paths::Location;

    #[test]
    fn invalid_results_serialize_their_errors() {
        let result = Validation::new(
            false,
            vec![OutputUnit::new(
                Location::new().join("type"),
                Location::new(),
                None,
                ErrorDescription::from(r#"1 is not of type "string""#),
            )],
            Vec::new(),
        );
        assert_eq!(
            serde_json::to_value(&result).expect("Serialization failed"),
            json!({
                "valid": false,
                "errors": [{
                    "keywordLocation": "/type",
                    "instanceLocation": "",
                    "error": "1 is not of type \"string\"",
                }]
            })
        );
    }
}
