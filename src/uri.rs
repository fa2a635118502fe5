use core::fmt;
use std::borrow::Cow;

use fluent_uri::{Uri, UriRef};
use once_cell::sync::Lazy;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

use crate::Error;

/// Base URI assigned to documents that do not declare one.
pub(crate) static DEFAULT_ROOT_URI: Lazy<Uri<String>> =
    Lazy::new(|| Uri::parse("json-schema:///".to_string()).expect("Invalid URI"));

/// Resolves the URI reference against the given base URI and returns the target URI.
///
/// # Errors
///
/// Returns an error if the reference does not conform to RFC 3986 or cannot
/// be resolved against the base.
pub fn resolve_against(base: &Uri<&str>, uri: &str) -> Result<Uri<String>, Error> {
    Ok(UriRef::parse(uri)
        .map_err(Error::from)?
        .resolve_against(base)?
        .normalize())
}

/// Parses a URI reference from a string into an absolute URI.
///
/// Scheme-less references are interpreted relative to [`DEFAULT_ROOT_URI`].
///
/// # Errors
///
/// Returns an error if the input string does not conform to URI-reference
/// from RFC 3986.
pub fn from_str(uri: &str) -> Result<Uri<String>, Error> {
    let uriref = UriRef::parse(uri.to_string())?.normalize();
    if uriref.has_scheme() {
        Ok(Uri::try_from(uriref.as_str())
            .map_err(Error::from)?
            .into())
    } else {
        Ok(uriref.resolve_against(&DEFAULT_ROOT_URI.borrow())?)
    }
}

/// The fragment part of a schema URI: either a JSON Pointer (possibly empty)
/// or a plain-name anchor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fragment {
    Pointer(String),
    Anchor(String),
}

impl Fragment {
    /// Interpret a raw fragment string. `/`-prefixed and empty fragments are
    /// JSON Pointers, everything else is an anchor name.
    pub(crate) fn parse(raw: &str) -> Fragment {
        let decoded = decode(raw);
        if decoded.is_empty() || decoded.starts_with('/') {
            Fragment::Pointer(decoded.into_owned())
        } else {
            Fragment::Anchor(decoded.into_owned())
        }
    }

    pub(crate) fn pointer(pointer: impl Into<String>) -> Fragment {
        Fragment::Pointer(pointer.into())
    }

    pub(crate) fn as_str(&self) -> &str {
        match self {
            Fragment::Pointer(value) | Fragment::Anchor(value) => value,
        }
    }

    pub(crate) fn is_root_pointer(&self) -> bool {
        matches!(self, Fragment::Pointer(value) if value.is_empty())
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn decode(raw: &str) -> Cow<'_, str> {
    match percent_decode_str(raw).decode_utf8() {
        Ok(decoded) => decoded,
        // Undecodable fragments are kept verbatim; they can only fail lookup.
        Err(_) => Cow::Borrowed(raw),
    }
}

/// A schema address: a normalized absolute URI without fragment, plus the
/// fragment interpreted as a JSON Pointer or an anchor name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompoundUri {
    pub base: Uri<String>,
    pub fragment: Fragment,
}

impl CompoundUri {
    pub(crate) fn new(base: Uri<String>, fragment: Fragment) -> CompoundUri {
        CompoundUri { base, fragment }
    }

    /// Split a reference into base and fragment and resolve the base part
    /// against `base`.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference is not a valid URI-reference.
    pub fn resolve(base: &Uri<String>, reference: &str) -> Result<CompoundUri, Error> {
        if let Some(fragment) = reference.strip_prefix('#') {
            return Ok(CompoundUri::new(base.clone(), Fragment::parse(fragment)));
        }
        let (uri, fragment) = match reference.rsplit_once('#') {
            Some((uri, fragment)) => (uri, fragment),
            None => (reference, ""),
        };
        Ok(CompoundUri::new(
            resolve_against(&base.borrow(), uri)?,
            Fragment::parse(fragment),
        ))
    }

    /// Parse a standalone reference, without any base to resolve against.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference is not a valid URI-reference.
    pub fn parse(reference: &str) -> Result<CompoundUri, Error> {
        let (uri, fragment) = match reference.rsplit_once('#') {
            Some((uri, fragment)) => (uri, fragment),
            None => (reference, ""),
        };
        Ok(CompoundUri::new(from_str(uri)?, Fragment::parse(fragment)))
    }
}

impl fmt::Display for CompoundUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fragment.as_str().is_empty() {
            f.write_str(self.base.as_str())
        } else {
            f.write_fmt(format_args!("{}#{}", self.base.as_str(), self.fragment))
        }
    }
}

/// Characters a URI fragment cannot carry verbatim.
const FRAGMENT_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b']')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Attach a JSON Pointer to `base` as a percent-encoded fragment.
pub(crate) fn with_fragment(base: &Uri<String>, pointer: &str) -> Option<Uri<String>> {
    if pointer.is_empty() {
        return Some(base.clone());
    }
    let encoded = utf8_percent_encode(pointer, FRAGMENT_ESCAPE);
    Uri::parse(format!("{}#{encoded}", base.as_str())).ok()
}

/// Append one JSON Pointer segment to `buffer`, applying `~0`/`~1` escaping.
pub(crate) fn escape_segment_to(segment: &str, buffer: &mut String) {
    for ch in segment.chars() {
        match ch {
            '~' => buffer.push_str("~0"),
            '/' => buffer.push_str("~1"),
            _ => buffer.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::{from_str, CompoundUri, Fragment};

    #[test]
    fn resolves_scheme_less_input_against_default_root() {
        let uri = from_str("example").expect("Invalid URI");
        assert_eq!(uri.as_str(), "json-schema:///example");
    }

    #[test_case("", Fragment::pointer(""); "empty")]
    #[test_case("/properties/foo", Fragment::pointer("/properties/foo"); "pointer")]
    #[test_case("/a~1b", Fragment::pointer("/a~1b"); "escaped pointer")]
    #[test_case("meta", Fragment::Anchor("meta".to_string()); "anchor")]
    #[test_case("/foo%20bar", Fragment::pointer("/foo bar"); "percent encoded pointer")]
    fn fragment_parsing(raw: &str, expected: Fragment) {
        assert_eq!(Fragment::parse(raw), expected);
    }

    #[test]
    fn resolve_keeps_the_base_for_fragment_only_references() {
        let base = from_str("https://example.com/schema").expect("Invalid URI");
        let compound = CompoundUri::resolve(&base, "#/$defs/item").expect("Invalid reference");
        assert_eq!(compound.base.as_str(), "https://example.com/schema");
        assert_eq!(compound.fragment, Fragment::pointer("/$defs/item"));
    }

    #[test]
    fn resolve_joins_relative_references() {
        let base = from_str("https://example.com/a/b").expect("Invalid URI");
        let compound = CompoundUri::resolve(&base, "other.json#anchor").expect("Invalid reference");
        assert_eq!(compound.base.as_str(), "https://example.com/a/other.json");
        assert_eq!(compound.fragment, Fragment::Anchor("anchor".to_string()));
        assert_eq!(compound.to_string(), "https://example.com/a/other.json#anchor");
    }
}
