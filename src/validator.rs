//! The façade coordinating parse → register → validate.
//!
//! Registration is transactional: a snapshot of the registry is taken on
//! entry and restored on any failure, so a rejected document never leaves
//! partial state behind, including its embedded resources.
use std::collections::VecDeque;

use ahash::{AHashMap, AHashSet};
use fluent_uri::Uri;
use serde_json::Value;

use crate::{
    compiler::Compiler,
    context::EvaluationContext,
    error::SchemaError,
    options::ValidationOptions,
    paths::Location,
    registry::Registry,
    resolver::resolve_through,
    uri::{self, CompoundUri, Fragment},
    Error, Validation,
};

/// A schema registry with a validation entry point.
///
/// One `Validator` owns one [`Registry`]. Registration takes `&mut self`;
/// validation reads the registry through `&self`, so a populated validator
/// can be shared across threads behind an `Arc`.
pub struct Validator {
    options: ValidationOptions,
    registry: Registry,
    anonymous: u64,
}

impl Default for Validator {
    fn default() -> Self {
        Validator::new()
    }
}

impl Validator {
    /// A validator with default options (Draft 2020-12, meta-schema
    /// validation enabled).
    #[must_use]
    pub fn new() -> Validator {
        Validator::with_options(ValidationOptions::default())
    }

    pub(crate) fn with_options(options: ValidationOptions) -> Validator {
        Validator {
            options,
            registry: Registry::default(),
            anonymous: 0,
        }
    }

    /// Read-only view of the registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Register a schema under a fresh anonymous URI. The returned URI is
    /// the canonical one: the resolved root `$id` when the document has one,
    /// the anonymous URI otherwise.
    ///
    /// # Errors
    ///
    /// See [`Validator::register_schema_at`].
    pub fn register_schema(&mut self, schema: &Value) -> Result<Uri<String>, Error> {
        self.anonymous += 1;
        let uri = uri::from_str(&format!("urn:anonymous:schema:{}", self.anonymous))?;
        self.register_at_uri(uri, schema)
    }

    /// Register a schema under `uri`. A root `$id` takes precedence as the
    /// canonical base URI, with `uri` kept addressable as an alias.
    ///
    /// # Errors
    ///
    /// Returns an error and leaves the registry untouched if the URI is
    /// malformed or carries a fragment, the document violates its dialect's
    /// meta-schema, or that meta-schema cannot be obtained.
    pub fn register_schema_at(&mut self, uri: &str, schema: &Value) -> Result<Uri<String>, Error> {
        let compound = CompoundUri::parse(uri)?;
        if !compound.fragment.is_root_pointer() {
            return Err(Error::invalid_identifier(uri));
        }
        self.register_at_uri(compound.base, schema)
    }

    /// Register a raw schema document, parsed through the node factory.
    ///
    /// # Errors
    ///
    /// See [`Validator::register_schema_at`]; additionally fails when the
    /// document is not valid JSON.
    pub fn register_schema_str(&mut self, raw: &str) -> Result<Uri<String>, Error> {
        let document = self
            .options
            .node_factory()
            .parse(raw)
            .map_err(Error::document)?;
        self.register_schema(&document)
    }

    /// Evaluate `instance` against the schema registered under `uri`.
    ///
    /// Schema violations are data in the returned [`Validation`]; this only
    /// errs on programmer mistakes (unknown or malformed URI).
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaNotFound`] when nothing is registered under
    /// `uri`.
    pub fn validate(&self, uri: &str, instance: &Value) -> Result<Validation, Error> {
        let compound = CompoundUri::parse(uri)?;
        let schema = self
            .registry
            .get(&compound)
            .ok_or_else(|| Error::schema_not_found(uri))?;
        Ok(EvaluationContext::new(&self.registry).validate(&schema, instance))
    }

    /// Shortcut for [`Validator::validate`] when only the verdict matters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaNotFound`] when nothing is registered under
    /// `uri`.
    pub fn is_valid(&self, uri: &str, instance: &Value) -> Result<bool, Error> {
        self.validate(uri, instance).map(|result| result.is_valid())
    }

    /// Register `schema` anonymously, validate `instance` against it, and
    /// restore the registry to its previous state.
    ///
    /// # Errors
    ///
    /// See [`Validator::register_schema`].
    pub fn validate_once(&mut self, schema: &Value, instance: &Value) -> Result<Validation, Error> {
        let snapshot = self.registry.create_snapshot();
        let result = self
            .register_schema(schema)
            .and_then(|uri| self.validate(uri.as_str(), instance));
        self.registry.restore_snapshot(snapshot);
        result
    }

    /// Raw-document variant of [`Validator::validate_once`].
    ///
    /// # Errors
    ///
    /// Additionally fails when either document is not valid JSON.
    pub fn validate_once_str(&mut self, schema: &str, instance: &str) -> Result<Validation, Error> {
        let schema = self
            .options
            .node_factory()
            .parse(schema)
            .map_err(Error::document)?;
        let instance = self
            .options
            .node_factory()
            .parse(instance)
            .map_err(Error::document)?;
        self.validate_once(&schema, &instance)
    }

    fn register_at_uri(&mut self, uri: Uri<String>, schema: &Value) -> Result<Uri<String>, Error> {
        let snapshot = self.registry.create_snapshot();
        match self.register_transacted(uri, schema) {
            Ok(uri) => Ok(uri),
            Err(error) => {
                self.registry.restore_snapshot(snapshot);
                Err(error)
            }
        }
    }

    /// The registration pipeline: register the document, pull in resolvable
    /// external references and meta-schemas until a fixpoint, then settle
    /// every meta-schema obligation.
    fn register_transacted(
        &mut self,
        uri: Uri<String>,
        schema: &Value,
    ) -> Result<Uri<String>, Error> {
        let mut queue = VecDeque::from([(uri, schema.clone())]);
        let mut queued: AHashSet<Uri<String>> = AHashSet::new();
        let mut documents: AHashMap<Uri<String>, Value> = AHashMap::new();
        // (meta-schema URI, document base, pointer of the resource)
        let mut obligations: Vec<(Uri<String>, Uri<String>, Location)> = Vec::new();
        let mut attempted: AHashSet<Uri<String>> = AHashSet::new();
        let mut root = None;

        loop {
            while let Some((uri, document)) = queue.pop_front() {
                if root.is_some() && self.registry.contains_base(&uri) {
                    // Already present, e.g. registered as an embedded
                    // resource of an earlier document in this call
                    continue;
                }
                let dialect = self.options.dialect().detect(&document)?;
                let compiler = Compiler::new(
                    &mut self.registry,
                    self.options.factories(),
                    self.options.validate_formats(),
                );
                let outcome = compiler.compile_document(uri, &document, &dialect)?;
                if self.options.validate_schema() {
                    obligations.push((
                        dialect.meta_schema().clone(),
                        outcome.base.clone(),
                        Location::new(),
                    ));
                    for (meta, pointer) in outcome.obligations {
                        obligations.push((meta, outcome.base.clone(), pointer));
                    }
                }
                for external in outcome.external {
                    if self.registry.contains_base(&external) || queued.contains(&external) {
                        continue;
                    }
                    if let Some(document) = resolve_through(
                        self.options.resolvers(),
                        external.as_str(),
                        self.options.node_factory(),
                    )? {
                        queued.insert(external.clone());
                        queue.push_back((external, document));
                    }
                    // Unresolvable references are reported at evaluation time
                }
                documents.insert(outcome.base.clone(), document);
                if root.is_none() {
                    root = Some(outcome.base);
                }
            }

            // Pull in meta-schemas that are referenced but not yet registered
            let mut progressed = false;
            for (meta, _, _) in &obligations {
                if self.registry.contains_base(meta)
                    || queued.contains(meta)
                    || attempted.contains(meta)
                {
                    continue;
                }
                attempted.insert(meta.clone());
                if let Some(document) = resolve_through(
                    self.options.resolvers(),
                    meta.as_str(),
                    self.options.node_factory(),
                )? {
                    queued.insert(meta.clone());
                    queue.push_back((meta.clone(), document));
                    progressed = true;
                }
            }
            if !progressed && queue.is_empty() {
                break;
            }
        }

        for (meta, base, pointer) in obligations {
            let meta_schema = self
                .registry
                .get(&CompoundUri::new(meta.clone(), Fragment::pointer("")))
                .ok_or_else(|| Error::meta_schema_resolving(meta.as_str(), None))?;
            let document = documents.get(&base).expect("Compiled in this call");
            let resource = document
                .pointer(pointer.as_str())
                .expect("Pointer produced by compilation");
            let result = EvaluationContext::new(&self.registry).validate(&meta_schema, resource);
            if !result.is_valid() {
                let errors = result
                    .errors()
                    .iter()
                    .map(|unit| SchemaError {
                        location: unit.instance_location().clone(),
                        message: unit.value().to_string(),
                    })
                    .collect();
                return Err(Error::invalid_schema(base.as_str(), errors));
            }
        }

        Ok(root.expect("At least one document was registered"))
    }
}
