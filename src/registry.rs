use std::sync::Arc;

use ahash::AHashMap;
use fluent_uri::Uri;

use crate::{
    schema::Schema,
    uri::{CompoundUri, Fragment},
    Error,
};

/// The schemas addressable under one base URI.
///
/// `schemas` is keyed by JSON Pointer and populated by in-document schemas.
/// `additional` holds plain-name anchors and the re-based pointers copied in
/// when an embedded `$id` introduces this base. `dynamic` holds
/// `$dynamicAnchor` names; the key `""` marks a `$recursiveAnchor` root.
#[derive(Debug, Clone, Default)]
struct Fragments {
    schemas: AHashMap<String, Arc<Schema>>,
    additional: AHashMap<String, Arc<Schema>>,
    dynamic: AHashMap<String, Arc<Schema>>,
    /// Alias views reject mutation; see [`Registry::register_alias`].
    read_only: bool,
}

impl Fragments {
    fn get(&self, fragment: &Fragment) -> Option<Arc<Schema>> {
        let key = fragment.as_str();
        self.schemas
            .get(key)
            .or_else(|| self.additional.get(key))
            .cloned()
    }
}

/// A deep-copyable image of the registry contents, taken before a parse
/// attempt and restored when it fails.
#[derive(Debug, Clone, Default)]
pub(crate) struct State {
    fragments: AHashMap<Uri<String>, Fragments>,
}

/// A URI-addressable store of compiled schemas.
///
/// Every registered schema is reachable via at least one URI (its canonical
/// one). The registry is mutated only while a document is being registered;
/// evaluation reads it through a shared reference.
#[derive(Debug, Default)]
pub struct Registry {
    state: State,
}

impl Registry {
    /// Look a schema up by address: pointer-keyed entries first, then
    /// anchors and re-based embedded pointers.
    #[must_use]
    pub fn get(&self, uri: &CompoundUri) -> Option<Arc<Schema>> {
        self.state.fragments.get(&uri.base)?.get(&uri.fragment)
    }

    /// Look up a dynamic anchor (`$dynamicAnchor`, or a `$recursiveAnchor`
    /// root under the name `""`).
    #[must_use]
    pub fn get_dynamic(&self, base: &Uri<String>, name: &str) -> Option<Arc<Schema>> {
        self.state
            .fragments
            .get(base)?
            .dynamic
            .get(name)
            .cloned()
    }

    /// Whether any schemas are registered under `base`.
    #[must_use]
    pub fn contains_base(&self, base: &Uri<String>) -> bool {
        self.state.fragments.contains_key(base)
    }

    fn owned(&mut self, base: &Uri<String>) -> Result<&mut Fragments, Error> {
        let fragments = self.state.fragments.entry(base.clone()).or_default();
        if fragments.read_only {
            Err(Error::read_only(base.as_str()))
        } else {
            Ok(fragments)
        }
    }

    /// Start a fresh set of fragments for `base`, discarding anything a
    /// previous registration left behind.
    ///
    /// # Errors
    ///
    /// Fails when `base` is an alias of another resource.
    pub(crate) fn reset_base(&mut self, base: &Uri<String>) -> Result<(), Error> {
        *self.owned(base)? = Fragments::default();
        Ok(())
    }

    /// Store a schema under `(base, pointer)`.
    pub(crate) fn register(
        &mut self,
        base: &Uri<String>,
        pointer: &str,
        schema: Arc<Schema>,
    ) -> Result<(), Error> {
        self.owned(base)?.schemas.insert(pointer.to_string(), schema);
        Ok(())
    }

    /// Store a plain-name anchor.
    pub(crate) fn register_anchor(
        &mut self,
        base: &Uri<String>,
        name: &str,
        schema: Arc<Schema>,
    ) -> Result<(), Error> {
        self.owned(base)?
            .additional
            .insert(name.to_string(), schema);
        Ok(())
    }

    /// Store a dynamic anchor. `name` is `""` for `$recursiveAnchor` roots.
    pub(crate) fn register_dynamic(
        &mut self,
        base: &Uri<String>,
        name: &str,
        schema: Arc<Schema>,
    ) -> Result<(), Error> {
        self.owned(base)?.dynamic.insert(name.to_string(), schema);
        Ok(())
    }

    /// Finish registering an embedded `$id` resource rooted at
    /// `(outer_base, prefix)`: the subtree root becomes the new base's root
    /// schema, and every descendant already registered under `outer_base`
    /// is copied under a re-based pointer. The original keys stay
    /// addressable under `outer_base`.
    pub(crate) fn register_embedded(
        &mut self,
        outer_base: &Uri<String>,
        new_base: &Uri<String>,
        prefix: &str,
        root: Arc<Schema>,
    ) -> Result<(), Error> {
        let rebased: Vec<(String, Arc<Schema>)> = self
            .state
            .fragments
            .get(outer_base)
            .map(|fragments| {
                fragments
                    .schemas
                    .iter()
                    .filter(|(pointer, _)| {
                        pointer.len() > prefix.len()
                            && pointer.starts_with(prefix)
                            && pointer.as_bytes()[prefix.len()] == b'/'
                    })
                    .map(|(pointer, schema)| {
                        (pointer[prefix.len()..].to_string(), Arc::clone(schema))
                    })
                    .collect()
            })
            .unwrap_or_default();
        let fragments = self.owned(new_base)?;
        fragments.schemas.insert(String::new(), root);
        fragments.additional.extend(rebased);
        Ok(())
    }

    /// Install a read-only view of `original`'s fragments under `alias`.
    ///
    /// The view is a snapshot: registering something else under `original`
    /// later cannot unexpectedly change what `alias` resolves to, and any
    /// attempt to register *into* the alias fails.
    pub(crate) fn register_alias(
        &mut self,
        original: &Uri<String>,
        alias: Uri<String>,
    ) -> Result<(), Error> {
        let mut fragments = self
            .state
            .fragments
            .get(original)
            .ok_or_else(|| Error::schema_not_found(original.as_str()))?
            .clone();
        fragments.read_only = true;
        self.state.fragments.insert(alias, fragments);
        Ok(())
    }

    /// Deep-copy the current contents for transactional parsing.
    pub(crate) fn create_snapshot(&self) -> State {
        self.state.clone()
    }

    /// Roll back to a previously taken snapshot.
    pub(crate) fn restore_snapshot(&mut self, state: State) {
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        paths::Location,
        schema::Schema,
        uri::{self, CompoundUri, Fragment},
        vocabularies::VocabularySet,
        Draft,
    };

    use super::Registry;

    fn schema(base: &str, pointer: &str) -> Arc<Schema> {
        let base = uri::from_str(base).expect("Invalid URI");
        Arc::new(Schema {
            base_uri: base.clone(),
            absolute_uri: CompoundUri::new(base, Fragment::pointer(pointer)),
            location: Location::new(),
            evaluators: Vec::new(),
            vocabularies: Arc::new(Draft::Draft202012.default_vocabularies()),
        })
    }

    fn compound(uri: &str) -> CompoundUri {
        CompoundUri::parse(uri).expect("Invalid URI")
    }

    #[test]
    fn lookup_prefers_pointer_entries_over_additional() {
        let mut registry = Registry::default();
        let base = uri::from_str("urn:example").expect("Invalid URI");
        registry
            .register(&base, "/a", schema("urn:example", "/a"))
            .expect("Registration failed");
        registry
            .register_anchor(&base, "/a", schema("urn:other", "/a"))
            .expect("Registration failed");
        let found = registry.get(&compound("urn:example#/a")).expect("Missing");
        assert_eq!(found.base_uri().as_str(), "urn:example");
    }

    #[test]
    fn embedded_registration_rebases_descendants() {
        let mut registry = Registry::default();
        let outer = uri::from_str("urn:outer").expect("Invalid URI");
        let inner = uri::from_str("urn:inner").expect("Invalid URI");
        registry
            .register(&outer, "/items/properties/foo", schema("urn:inner", "/properties/foo"))
            .expect("Registration failed");
        // A sibling that merely shares the name prefix must not be copied
        registry
            .register(&outer, "/itemsies", schema("urn:outer", "/itemsies"))
            .expect("Registration failed");
        registry
            .register_embedded(&outer, &inner, "/items", schema("urn:inner", ""))
            .expect("Registration failed");

        assert!(registry.get(&compound("urn:inner")).is_some());
        assert!(registry.get(&compound("urn:inner#/properties/foo")).is_some());
        assert!(registry.get(&compound("urn:inner#ies")).is_none());
        // Original keys stay addressable under the outer base
        assert!(registry
            .get(&compound("urn:outer#/items/properties/foo"))
            .is_some());
    }

    #[test]
    fn aliases_are_read_only_snapshots() {
        let mut registry = Registry::default();
        let original = uri::from_str("urn:canonical").expect("Invalid URI");
        let alias = uri::from_str("urn:alias").expect("Invalid URI");
        registry
            .register(&original, "", schema("urn:canonical", ""))
            .expect("Registration failed");
        registry
            .register_alias(&original, alias.clone())
            .expect("Alias failed");

        assert!(registry.get(&compound("urn:alias")).is_some());
        let error = registry
            .register(&alias, "", schema("urn:alias", ""))
            .expect_err("Should reject mutation");
        assert_eq!(
            error.to_string(),
            "'urn:alias' is an alias of an existing resource and cannot be modified"
        );
    }

    #[test]
    fn snapshots_restore_previous_contents() {
        let mut registry = Registry::default();
        let base = uri::from_str("urn:kept").expect("Invalid URI");
        registry
            .register(&base, "", schema("urn:kept", ""))
            .expect("Registration failed");
        let snapshot = registry.create_snapshot();

        let transient = uri::from_str("urn:transient").expect("Invalid URI");
        registry
            .register(&transient, "", schema("urn:transient", ""))
            .expect("Registration failed");
        assert!(registry.get(&compound("urn:transient")).is_some());

        registry.restore_snapshot(snapshot);
        assert!(registry.get(&compound("urn:kept")).is_some());
        assert!(registry.get(&compound("urn:transient")).is_none());
    }
}
