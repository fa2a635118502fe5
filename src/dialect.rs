use fluent_uri::Uri;
use serde_json::Value;

use crate::{
    uri,
    vocabularies::{VocabularySet, DRAFT_2019_09_VOCABULARIES, DRAFT_2020_12_VOCABULARIES},
    Error,
};

/// JSON Schema specification versions.
#[non_exhaustive]
#[derive(Debug, Default, PartialEq, Copy, Clone, Hash, Eq, PartialOrd, Ord)]
pub enum Draft {
    /// JSON Schema Draft 2019-09
    Draft201909,
    /// JSON Schema Draft 2020-12
    #[default]
    Draft202012,
}

/// How a subschema-bearing keyword holds its subschemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SubschemaKind {
    /// The member value is a schema (`not`, `items`, ...).
    Value,
    /// The member value is an object of named schemas (`properties`, ...).
    Map,
    /// The member value is an array of schemas (`allOf`, ...).
    Array,
    /// Schema or array of schemas (`items` before 2020-12).
    ValueOrArray,
}

const SUBSCHEMAS_2020_12: &[(&str, SubschemaKind)] = &[
    ("additionalProperties", SubschemaKind::Value),
    ("contains", SubschemaKind::Value),
    ("if", SubschemaKind::Value),
    ("then", SubschemaKind::Value),
    ("else", SubschemaKind::Value),
    ("items", SubschemaKind::Value),
    ("not", SubschemaKind::Value),
    ("propertyNames", SubschemaKind::Value),
    ("unevaluatedItems", SubschemaKind::Value),
    ("unevaluatedProperties", SubschemaKind::Value),
    ("$defs", SubschemaKind::Map),
    ("definitions", SubschemaKind::Map),
    ("dependentSchemas", SubschemaKind::Map),
    ("patternProperties", SubschemaKind::Map),
    ("properties", SubschemaKind::Map),
    ("allOf", SubschemaKind::Array),
    ("anyOf", SubschemaKind::Array),
    ("oneOf", SubschemaKind::Array),
    ("prefixItems", SubschemaKind::Array),
];

const SUBSCHEMAS_2019_09: &[(&str, SubschemaKind)] = &[
    ("additionalItems", SubschemaKind::Value),
    ("additionalProperties", SubschemaKind::Value),
    ("contains", SubschemaKind::Value),
    ("if", SubschemaKind::Value),
    ("then", SubschemaKind::Value),
    ("else", SubschemaKind::Value),
    ("items", SubschemaKind::ValueOrArray),
    ("not", SubschemaKind::Value),
    ("propertyNames", SubschemaKind::Value),
    ("unevaluatedItems", SubschemaKind::Value),
    ("unevaluatedProperties", SubschemaKind::Value),
    ("$defs", SubschemaKind::Map),
    ("definitions", SubschemaKind::Map),
    ("dependentSchemas", SubschemaKind::Map),
    ("patternProperties", SubschemaKind::Map),
    ("properties", SubschemaKind::Map),
    ("allOf", SubschemaKind::Array),
    ("anyOf", SubschemaKind::Array),
    ("oneOf", SubschemaKind::Array),
];

impl Draft {
    /// The canonical URI of this draft's meta-schema.
    #[must_use]
    pub const fn meta_schema_uri(self) -> &'static str {
        match self {
            Draft::Draft201909 => "https://json-schema.org/draft/2019-09/schema",
            Draft::Draft202012 => "https://json-schema.org/draft/2020-12/schema",
        }
    }

    /// Interpret a `$schema` value as a known draft.
    pub(crate) fn from_meta_schema(uri: &str) -> Option<Draft> {
        match uri.trim_end_matches('#') {
            "https://json-schema.org/draft/2020-12/schema" => Some(Draft::Draft202012),
            "https://json-schema.org/draft/2019-09/schema" => Some(Draft::Draft201909),
            _ => None,
        }
    }

    /// The vocabulary set this draft activates by default.
    #[must_use]
    pub fn default_vocabularies(self) -> VocabularySet {
        match self {
            Draft::Draft201909 => VocabularySet::from_known(DRAFT_2019_09_VOCABULARIES),
            Draft::Draft202012 => VocabularySet::from_known(DRAFT_2020_12_VOCABULARIES),
        }
    }

    pub(crate) fn subschema_members(self) -> &'static [(&'static str, SubschemaKind)] {
        match self {
            Draft::Draft201909 => SUBSCHEMAS_2019_09,
            Draft::Draft202012 => SUBSCHEMAS_2020_12,
        }
    }

    /// Identifies known JSON Schema keywords per draft.
    #[must_use]
    pub fn is_known_keyword(self, keyword: &str) -> bool {
        match keyword {
            "$anchor" | "$comment" | "$defs" | "$id" | "$ref" | "$schema" | "$vocabulary"
            | "additionalProperties" | "allOf" | "anyOf" | "const" | "contains"
            | "dependentRequired" | "dependentSchemas" | "definitions" | "else" | "enum"
            | "exclusiveMaximum" | "exclusiveMinimum" | "format" | "if" | "items"
            | "maxContains" | "maxItems" | "maxLength" | "maxProperties" | "maximum"
            | "minContains" | "minItems" | "minLength" | "minProperties" | "minimum"
            | "multipleOf" | "not" | "oneOf" | "pattern" | "patternProperties" | "properties"
            | "propertyNames" | "required" | "then" | "type" | "unevaluatedItems"
            | "unevaluatedProperties" | "uniqueItems" => true,

            "$recursiveAnchor" | "$recursiveRef" | "additionalItems" => {
                self == Draft::Draft201909
            }

            "$dynamicAnchor" | "$dynamicRef" | "prefixItems" => self == Draft::Draft202012,

            _ => false,
        }
    }
}

/// A dialect bundles a draft (the keyword semantics and default
/// vocabularies) with the meta-schema that documents of that dialect must
/// conform to.
///
/// [`Dialect::custom`] keeps a draft's keyword set but validates schemas
/// against a user meta-schema, which the engine resolves through the
/// resolver chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    draft: Draft,
    meta_schema: Uri<String>,
    vocabularies: Option<VocabularySet>,
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect::for_draft(Draft::default())
    }
}

impl Dialect {
    /// The standard dialect of a draft.
    #[must_use]
    pub fn for_draft(draft: Draft) -> Dialect {
        Dialect {
            draft,
            meta_schema: uri::from_str(draft.meta_schema_uri()).expect("Invalid meta-schema URI"),
            vocabularies: None,
        }
    }

    /// A dialect with a custom meta-schema, interpreted with `draft`'s
    /// keyword semantics.
    ///
    /// # Errors
    ///
    /// Returns an error if the meta-schema URI is malformed.
    pub fn custom(meta_schema: &str, draft: Draft) -> Result<Dialect, Error> {
        Ok(Dialect {
            draft,
            meta_schema: uri::from_str(meta_schema)?,
            vocabularies: None,
        })
    }

    /// Replace the draft's default vocabulary set, e.g. to activate
    /// format assertion for every schema of this dialect.
    #[must_use]
    pub fn with_vocabularies(mut self, vocabularies: VocabularySet) -> Dialect {
        self.vocabularies = Some(vocabularies);
        self
    }

    /// The draft providing keyword semantics.
    #[must_use]
    pub fn draft(&self) -> Draft {
        self.draft
    }

    /// URI of the meta-schema that schemas of this dialect must satisfy.
    #[must_use]
    pub fn meta_schema(&self) -> &Uri<String> {
        &self.meta_schema
    }

    /// Vocabularies governing schemas of this dialect, falling back to the
    /// draft's defaults.
    pub(crate) fn active_vocabularies(&self) -> VocabularySet {
        self.vocabularies
            .clone()
            .unwrap_or_else(|| self.draft.default_vocabularies())
    }

    /// The dialect governing `contents`: its `$schema` declaration when
    /// present, otherwise this dialect. Unknown `$schema` values become
    /// custom dialects over this dialect's draft.
    ///
    /// # Errors
    ///
    /// Returns an error if `$schema` is not a valid URI.
    pub(crate) fn detect(&self, contents: &Value) -> Result<Dialect, Error> {
        match contents.get("$schema").and_then(Value::as_str) {
            Some(declared) => match Draft::from_meta_schema(declared) {
                Some(draft) => Ok(Dialect::for_draft(draft)),
                None => Dialect::custom(declared, self.draft),
            },
            None => Ok(self.clone()),
        }
    }
}
