use core::fmt;
use std::str::FromStr;

use ahash::AHashSet;
use fluent_uri::Uri;
use serde_json::Value;

use crate::{uri, Error};

/// A JSON Schema vocabulary, as declared by a meta-schema's `$vocabulary`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Vocabulary {
    Core,
    Applicator,
    Unevaluated,
    Validation,
    Metadata,
    Format,
    FormatAnnotation,
    FormatAssertion,
    Content,
    Custom(Uri<String>),
}

impl FromStr for Vocabulary {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "https://json-schema.org/draft/2020-12/vocab/core"
            | "https://json-schema.org/draft/2019-09/vocab/core" => Ok(Vocabulary::Core),
            "https://json-schema.org/draft/2020-12/vocab/applicator"
            | "https://json-schema.org/draft/2019-09/vocab/applicator" => {
                Ok(Vocabulary::Applicator)
            }
            "https://json-schema.org/draft/2020-12/vocab/unevaluated" => {
                Ok(Vocabulary::Unevaluated)
            }
            "https://json-schema.org/draft/2020-12/vocab/validation"
            | "https://json-schema.org/draft/2019-09/vocab/validation" => {
                Ok(Vocabulary::Validation)
            }
            "https://json-schema.org/draft/2020-12/vocab/meta-data"
            | "https://json-schema.org/draft/2019-09/vocab/meta-data" => Ok(Vocabulary::Metadata),
            "https://json-schema.org/draft/2019-09/vocab/format" => Ok(Vocabulary::Format),
            "https://json-schema.org/draft/2020-12/vocab/format-annotation" => {
                Ok(Vocabulary::FormatAnnotation)
            }
            "https://json-schema.org/draft/2020-12/vocab/format-assertion" => {
                Ok(Vocabulary::FormatAssertion)
            }
            "https://json-schema.org/draft/2020-12/vocab/content"
            | "https://json-schema.org/draft/2019-09/vocab/content" => Ok(Vocabulary::Content),
            _ => Ok(Vocabulary::Custom(uri::from_str(s)?)),
        }
    }
}

/// The set of vocabularies a schema is governed by.
///
/// Known vocabularies live in a bitmask; custom ones in a side set.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct VocabularySet {
    known: u16,
    custom: AHashSet<Uri<String>>,
}

const fn bit(vocabulary: &Vocabulary) -> u16 {
    match vocabulary {
        Vocabulary::Core => 1 << 0,
        Vocabulary::Applicator => 1 << 1,
        Vocabulary::Unevaluated => 1 << 2,
        Vocabulary::Validation => 1 << 3,
        Vocabulary::Metadata => 1 << 4,
        Vocabulary::Format => 1 << 5,
        Vocabulary::FormatAnnotation => 1 << 6,
        Vocabulary::FormatAssertion => 1 << 7,
        Vocabulary::Content => 1 << 8,
        Vocabulary::Custom(_) => 0,
    }
}

pub(crate) const DRAFT_2020_12_VOCABULARIES: u16 = bit(&Vocabulary::Core)
    | bit(&Vocabulary::Applicator)
    | bit(&Vocabulary::Unevaluated)
    | bit(&Vocabulary::Validation)
    | bit(&Vocabulary::Metadata)
    | bit(&Vocabulary::FormatAnnotation)
    | bit(&Vocabulary::Content);

pub(crate) const DRAFT_2019_09_VOCABULARIES: u16 = bit(&Vocabulary::Core)
    | bit(&Vocabulary::Applicator)
    | bit(&Vocabulary::Validation)
    | bit(&Vocabulary::Metadata)
    | bit(&Vocabulary::Format)
    | bit(&Vocabulary::Content);

impl VocabularySet {
    pub(crate) fn from_known(known: u16) -> Self {
        Self {
            known,
            custom: AHashSet::new(),
        }
    }

    /// Activate a vocabulary in this set.
    pub fn add(&mut self, vocabulary: Vocabulary) {
        match vocabulary {
            Vocabulary::Custom(uri) => {
                self.custom.insert(uri);
            }
            known => self.known |= bit(&known),
        }
    }

    /// Whether the vocabulary is active in this set.
    #[must_use]
    pub fn contains(&self, vocabulary: &Vocabulary) -> bool {
        match vocabulary {
            Vocabulary::Custom(uri) => self.custom.contains(uri),
            known => self.known & bit(known) != 0,
        }
    }
}

impl fmt::Debug for VocabularySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(u16, &str); 9] = [
            (bit(&Vocabulary::Core), "core"),
            (bit(&Vocabulary::Applicator), "applicator"),
            (bit(&Vocabulary::Unevaluated), "unevaluated"),
            (bit(&Vocabulary::Validation), "validation"),
            (bit(&Vocabulary::Metadata), "meta-data"),
            (bit(&Vocabulary::Format), "format"),
            (bit(&Vocabulary::FormatAnnotation), "format-annotation"),
            (bit(&Vocabulary::FormatAssertion), "format-assertion"),
            (bit(&Vocabulary::Content), "content"),
        ];
        let mut debug_list = f.debug_list();
        for (mask, name) in NAMES {
            if self.known & mask != 0 {
                debug_list.entry(&name);
            }
        }
        if !self.custom.is_empty() {
            let mut custom: Vec<_> = self.custom.iter().map(Uri::as_str).collect();
            custom.sort_unstable();
            for uri in custom {
                debug_list.entry(&uri);
            }
        }
        debug_list.finish()
    }
}

/// Read the `$vocabulary` declaration off a meta-schema root, if present.
///
/// Only vocabularies marked `true` become active.
///
/// # Errors
///
/// Returns an error if a custom vocabulary URI is malformed.
pub(crate) fn declared(document: &Value) -> Result<Option<VocabularySet>, Error> {
    let Some(declaration) = document.get("$vocabulary").and_then(Value::as_object) else {
        return Ok(None);
    };
    let mut set = VocabularySet::default();
    for (uri, required) in declaration {
        if required.as_bool().unwrap_or(false) {
            set.add(Vocabulary::from_str(uri)?);
        }
    }
    Ok(Some(set))
}
