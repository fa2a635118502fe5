//! Turns raw schema documents into compiled, registry-addressable schemas.
//!
//! The walk is post-order: a schema's subschemas are compiled and registered
//! before the schema itself, so an embedded `$id` can re-base the pointer
//! entries of its whole subtree when it is registered.
use std::sync::Arc;

use ahash::AHashSet;
use fluent_uri::Uri;
use serde_json::{Map, Value};

use crate::{
    dialect::{Dialect, Draft, SubschemaKind},
    error::SchemaError,
    keywords,
    paths::{Location, LocationSegment},
    registry::Registry,
    schema::{BoxedEvaluator, KeywordEvaluator, Schema, SchemaRef},
    uri::{self, CompoundUri, Fragment},
    vocabularies::{self, Vocabulary, VocabularySet},
    Error,
};

/// Keywords the parser consumes itself; they never reach the factory chain.
const STRUCTURAL: [&str; 6] = [
    "$id",
    "$schema",
    "$vocabulary",
    "$anchor",
    "$dynamicAnchor",
    "$recursiveAnchor",
];

/// Builds evaluators for keywords.
///
/// Returning `None` means "I don't handle this keyword"; the next factory in
/// the chain is asked, with the built-in Draft 2020-12/2019-09 factory last.
pub trait EvaluatorFactory: Send + Sync {
    fn create(
        &self,
        ctx: &mut ParseContext<'_, '_>,
        keyword: &str,
        value: &Value,
    ) -> Option<Result<BoxedEvaluator, Error>>;
}

/// Base-URI/anchor context of the node currently being compiled.
#[derive(Debug, Clone)]
struct Scope {
    /// The innermost `$id` scope.
    base_uri: Uri<String>,
    /// Document-absolute pointer of the node that established `base_uri`.
    base_pointer: Location,
    /// Document-absolute pointer of this node.
    pointer: Location,
    draft: Draft,
    vocabularies: Arc<VocabularySet>,
}

impl Scope {
    fn child(&self, keyword: &str) -> Scope {
        Scope {
            pointer: self.pointer.join(keyword),
            ..self.clone()
        }
    }

    fn grandchild(&self, keyword: &str, segment: impl LocationSegment) -> Scope {
        Scope {
            pointer: self.pointer.join(keyword).join(segment),
            ..self.clone()
        }
    }

    /// Pointer of this node relative to the innermost `$id` scope.
    fn rebased(&self) -> Location {
        self.pointer.strip_prefix(&self.base_pointer)
    }

    fn is_resource_root(&self) -> bool {
        self.pointer == self.base_pointer
    }

    fn canonical(&self) -> CompoundUri {
        CompoundUri::new(
            self.base_uri.clone(),
            Fragment::pointer(self.rebased().as_str()),
        )
    }
}

/// What one document registration produced, beyond the registry entries:
/// references that point outside the registry and resources whose `$schema`
/// still has to be validated.
pub(crate) struct DocumentOutcome {
    pub(crate) base: Uri<String>,
    pub(crate) external: Vec<Uri<String>>,
    /// `(meta-schema URI, resource pointer)` pairs for embedded resources
    /// declaring their own `$schema`.
    pub(crate) obligations: Vec<(Uri<String>, Location)>,
}

pub(crate) struct Compiler<'a> {
    registry: &'a mut Registry,
    factories: &'a [Arc<dyn EvaluatorFactory>],
    document_base: Uri<String>,
    external: AHashSet<Uri<String>>,
    obligations: Vec<(Uri<String>, Location)>,
    assert_formats: bool,
}

impl<'a> Compiler<'a> {
    pub(crate) fn new(
        registry: &'a mut Registry,
        factories: &'a [Arc<dyn EvaluatorFactory>],
        assert_formats: bool,
    ) -> Compiler<'a> {
        Compiler {
            registry,
            factories,
            document_base: uri::DEFAULT_ROOT_URI.clone(),
            external: AHashSet::new(),
            obligations: Vec::new(),
            assert_formats,
        }
    }

    /// Compile `document` and register every schema in it. `uri` is the
    /// externally requested address; a root `$id` overrides it as the
    /// canonical base, with `uri` kept addressable as a read-only alias.
    pub(crate) fn compile_document(
        mut self,
        uri: Uri<String>,
        document: &Value,
        dialect: &Dialect,
    ) -> Result<DocumentOutcome, Error> {
        let mut base = uri.clone();
        if let Some(id) = document.as_object().and_then(|object| object.get("$id")).and_then(Value::as_str) {
            base = resolve_identifier(&uri, id)?;
        }
        self.registry.reset_base(&base)?;
        self.document_base = base.clone();
        let scope = Scope {
            base_uri: base.clone(),
            base_pointer: Location::new(),
            pointer: Location::new(),
            draft: dialect.draft(),
            vocabularies: Arc::new(dialect.active_vocabularies()),
        };
        self.compile(scope, document)?;
        if base != uri {
            self.registry.register_alias(&base, uri)?;
        }
        Ok(DocumentOutcome {
            base,
            external: self.external.into_iter().collect(),
            obligations: self.obligations,
        })
    }

    fn compile(&mut self, scope: Scope, value: &Value) -> Result<CompoundUri, Error> {
        match value {
            Value::Bool(true) => self.register_schema(&scope, Vec::new()),
            Value::Bool(false) => {
                let evaluators = vec![KeywordEvaluator {
                    keyword: Box::from(""),
                    location: scope.pointer.clone(),
                    absolute_location: self.absolute_location(&scope, None),
                    evaluator: Box::new(keywords::boolean::FalseEvaluator),
                }];
                self.register_schema(&scope, evaluators)
            }
            Value::Object(object) => self.compile_object(scope, value, object),
            _ => Err(Error::invalid_schema(
                self.document_base.as_str(),
                vec![SchemaError {
                    location: scope.pointer,
                    message: format!("{value} is not of types \"boolean\", \"object\""),
                }],
            )),
        }
    }

    fn compile_object(
        &mut self,
        scope: Scope,
        value: &Value,
        object: &Map<String, Value>,
    ) -> Result<CompoundUri, Error> {
        let mut scope = scope;
        let mut embedded = None;
        if !scope.pointer.as_str().is_empty() {
            if let Some(id) = object.get("$id").and_then(Value::as_str) {
                let new_base = resolve_identifier(&scope.base_uri, id)?;
                if new_base != scope.base_uri {
                    self.registry.reset_base(&new_base)?;
                    if object.get("$schema").and_then(Value::as_str).is_some() {
                        let dialect = Dialect::for_draft(scope.draft).detect(value)?;
                        self.obligations
                            .push((dialect.meta_schema().clone(), scope.pointer.clone()));
                        scope.draft = dialect.draft();
                        scope.vocabularies = Arc::new(dialect.active_vocabularies());
                    }
                    embedded = Some(new_base.clone());
                    scope.base_pointer = scope.pointer.clone();
                    scope.base_uri = new_base;
                }
            }
        }
        if let Some(declared) = vocabularies::declared(value)? {
            scope.vocabularies = Arc::new(declared);
        }

        let mut anchors = Vec::new();
        if let Some(name) = object.get("$anchor").and_then(Value::as_str) {
            validate_anchor(name)?;
            anchors.push((name, false));
        }
        let mut recursive_root = false;
        match scope.draft {
            Draft::Draft202012 => {
                if let Some(name) = object.get("$dynamicAnchor").and_then(Value::as_str) {
                    validate_anchor(name)?;
                    anchors.push((name, true));
                }
            }
            Draft::Draft201909 => {
                recursive_root = scope.is_resource_root()
                    && object
                        .get("$recursiveAnchor")
                        .and_then(Value::as_bool)
                        .unwrap_or(false);
            }
        }

        let factories = self.factories;
        let mut evaluators = Vec::with_capacity(object.len());
        let mut consumed: AHashSet<&str> = AHashSet::new();
        for (keyword, member) in object {
            if STRUCTURAL.contains(&keyword.as_str()) {
                continue;
            }
            let mut created = None;
            {
                let mut ctx = ParseContext {
                    compiler: self,
                    scope: &scope,
                    parent: object,
                };
                for factory in factories {
                    if let Some(result) = factory.create(&mut ctx, keyword, member) {
                        created = Some(result?);
                        break;
                    }
                }
                if created.is_none() {
                    if let Some(compile_fn) = keywords::get_for_draft(scope.draft, keyword) {
                        if let Some(result) = compile_fn(&mut ctx, object, member) {
                            created = Some(result?);
                        }
                    }
                }
            }
            if let Some(evaluator) = created {
                consumed.insert(keyword.as_str());
                evaluators.push(self.keyword_evaluator(&scope, keyword, evaluator));
            } else if !scope.draft.is_known_keyword(keyword) {
                // Unrecognized keywords survive as annotations
                let annotation = Box::new(keywords::KeywordAnnotation::new(member.clone()));
                evaluators.push(self.keyword_evaluator(&scope, keyword, annotation));
            }
        }
        evaluators.sort_by_key(|keyword| keywords::priority(&keyword.keyword));

        // Subschema-bearing members nothing above claimed ($defs, a lone
        // `then`, ...) still get compiled and registered.
        for (keyword, kind) in scope.draft.subschema_members() {
            if consumed.contains(keyword) {
                continue;
            }
            let Some(member) = object.get(*keyword) else {
                continue;
            };
            match kind {
                SubschemaKind::Value => {
                    self.compile(scope.child(keyword), member)?;
                }
                SubschemaKind::Map => {
                    if let Some(named) = member.as_object() {
                        for (name, subschema) in named {
                            self.compile(scope.grandchild(keyword, name.as_str()), subschema)?;
                        }
                    }
                }
                SubschemaKind::Array => {
                    if let Some(subschemas) = member.as_array() {
                        for (index, subschema) in subschemas.iter().enumerate() {
                            self.compile(scope.grandchild(keyword, index), subschema)?;
                        }
                    }
                }
                SubschemaKind::ValueOrArray => {
                    if let Some(subschemas) = member.as_array() {
                        for (index, subschema) in subschemas.iter().enumerate() {
                            self.compile(scope.grandchild(keyword, index), subschema)?;
                        }
                    } else {
                        self.compile(scope.child(keyword), member)?;
                    }
                }
            }
        }

        let (canonical, schema) = self.register_schema_arc(&scope, evaluators)?;
        for (name, dynamic) in anchors {
            self.registry
                .register_anchor(&scope.base_uri, name, Arc::clone(&schema))?;
            if dynamic {
                self.registry
                    .register_dynamic(&scope.base_uri, name, Arc::clone(&schema))?;
            }
        }
        if recursive_root {
            self.registry
                .register_dynamic(&scope.base_uri, "", Arc::clone(&schema))?;
        }
        if let Some(new_base) = embedded {
            self.registry.register_embedded(
                &self.document_base,
                &new_base,
                scope.pointer.as_str(),
                Arc::clone(&schema),
            )?;
        }
        Ok(canonical)
    }

    fn register_schema(
        &mut self,
        scope: &Scope,
        evaluators: Vec<KeywordEvaluator>,
    ) -> Result<CompoundUri, Error> {
        self.register_schema_arc(scope, evaluators)
            .map(|(canonical, _)| canonical)
    }

    fn register_schema_arc(
        &mut self,
        scope: &Scope,
        evaluators: Vec<KeywordEvaluator>,
    ) -> Result<(CompoundUri, Arc<Schema>), Error> {
        let canonical = scope.canonical();
        let schema = Arc::new(Schema {
            base_uri: scope.base_uri.clone(),
            absolute_uri: canonical.clone(),
            location: scope.pointer.clone(),
            evaluators,
            vocabularies: Arc::clone(&scope.vocabularies),
        });
        self.registry
            .register(&self.document_base, scope.pointer.as_str(), Arc::clone(&schema))?;
        Ok((canonical, schema))
    }

    fn keyword_evaluator(
        &self,
        scope: &Scope,
        keyword: &str,
        evaluator: BoxedEvaluator,
    ) -> KeywordEvaluator {
        KeywordEvaluator {
            keyword: Box::from(keyword),
            location: scope.pointer.join(keyword),
            absolute_location: self.absolute_location(scope, Some(keyword)),
            evaluator,
        }
    }

    fn absolute_location(&self, scope: &Scope, keyword: Option<&str>) -> Option<Uri<String>> {
        if scope.base_uri.scheme().as_str() == "json-schema" {
            return None;
        }
        let pointer = match keyword {
            Some(keyword) => scope.rebased().join(keyword),
            None => scope.rebased(),
        };
        uri::with_fragment(&scope.base_uri, pointer.as_str())
    }
}

fn resolve_identifier(base: &Uri<String>, id: &str) -> Result<Uri<String>, Error> {
    let trimmed = id.trim_end_matches('#');
    if trimmed.contains('#') {
        return Err(Error::invalid_identifier(id));
    }
    uri::resolve_against(&base.borrow(), trimmed)
}

fn validate_anchor(name: &str) -> Result<(), Error> {
    if name.is_empty() || name.contains('/') || name.contains('#') {
        Err(Error::invalid_anchor(name))
    } else {
        Ok(())
    }
}

/// The compilation context handed to [`EvaluatorFactory`] implementations
/// and the built-in keyword compilers.
pub struct ParseContext<'c, 'a> {
    compiler: &'c mut Compiler<'a>,
    scope: &'c Scope,
    parent: &'c Map<String, Value>,
}

impl ParseContext<'_, '_> {
    /// The draft whose semantics govern the current schema object.
    #[must_use]
    pub fn draft(&self) -> Draft {
        self.scope.draft
    }

    /// The current `$id` scope.
    #[must_use]
    pub fn base_uri(&self) -> &Uri<String> {
        &self.scope.base_uri
    }

    /// Document-absolute pointer of the schema object being compiled.
    #[must_use]
    pub fn location(&self) -> &Location {
        &self.scope.pointer
    }

    /// The whole schema object the keyword appears in.
    #[must_use]
    pub fn parent(&self) -> &Map<String, Value> {
        self.parent
    }

    /// Whether the given vocabulary is active for the current schema.
    #[must_use]
    pub fn has_vocabulary(&self, vocabulary: &Vocabulary) -> bool {
        self.scope.vocabularies.contains(vocabulary)
    }

    /// Whether `format` should assert regardless of the active vocabularies.
    #[must_use]
    pub fn validates_formats(&self) -> bool {
        self.compiler.assert_formats
    }

    /// Compile the subschema at `<keyword>` and return a handle to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the subschema is malformed.
    pub fn subschema(&mut self, keyword: &str, value: &Value) -> Result<SchemaRef, Error> {
        self.compiler
            .compile(self.scope.child(keyword), value)
            .map(SchemaRef::new)
    }

    /// Compile the subschema at `<keyword>/<index>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the subschema is malformed.
    pub fn subschema_item(
        &mut self,
        keyword: &str,
        index: usize,
        value: &Value,
    ) -> Result<SchemaRef, Error> {
        self.compiler
            .compile(self.scope.grandchild(keyword, index), value)
            .map(SchemaRef::new)
    }

    /// Compile the subschema at `<keyword>/<name>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the subschema is malformed.
    pub fn subschema_property(
        &mut self,
        keyword: &str,
        name: &str,
        value: &Value,
    ) -> Result<SchemaRef, Error> {
        self.compiler
            .compile(self.scope.grandchild(keyword, name), value)
            .map(SchemaRef::new)
    }

    /// A handle to a sibling subschema that the parser registers on its own
    /// (`then`/`else`), without compiling it here.
    #[must_use]
    pub fn sibling(&self, keyword: &str) -> SchemaRef {
        SchemaRef::new(CompoundUri::new(
            self.scope.base_uri.clone(),
            Fragment::pointer(self.scope.rebased().join(keyword).as_str()),
        ))
    }

    /// Resolve a reference against the current base URI, recording targets
    /// outside this document for the resolver chain.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference is not a valid URI-reference.
    pub fn resolve_reference(&mut self, reference: &str) -> Result<CompoundUri, Error> {
        let compound = CompoundUri::resolve(&self.scope.base_uri, reference)?;
        if compound.base != self.compiler.document_base
            && !self.compiler.registry.contains_base(&compound.base)
        {
            self.compiler.external.insert(compound.base.clone());
        }
        Ok(compound)
    }
}
