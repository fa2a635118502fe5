use core::fmt;
use std::sync::Arc;

use fluent_uri::Uri;
use serde_json::Value;

use crate::{
    context::EvaluationContext,
    output::ErrorDescription,
    paths::{LazyLocation, Location},
    uri::CompoundUri,
    vocabularies::VocabularySet,
};

/// A boxed keyword evaluator, as produced by evaluator factories.
pub type BoxedEvaluator = Box<dyn Evaluate + Send + Sync>;

/// A single keyword evaluator.
///
/// Given the evaluation context and an instance, it either passes with an
/// optional annotation value or fails with a message. Errors produced by
/// nested subschema evaluations are already recorded in the context by the
/// time this returns.
pub trait Evaluate: Send + Sync {
    fn evaluate(
        &self,
        ctx: &mut EvaluationContext<'_>,
        instance: &Value,
        location: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription>;
}

/// A keyword bound to its evaluator and source location.
pub(crate) struct KeywordEvaluator {
    pub(crate) keyword: Box<str>,
    /// Document-absolute pointer to the keyword.
    pub(crate) location: Location,
    /// Canonical URI of the keyword, when the schema has an addressable base.
    pub(crate) absolute_location: Option<Uri<String>>,
    pub(crate) evaluator: BoxedEvaluator,
}

impl fmt::Debug for KeywordEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeywordEvaluator")
            .field("keyword", &self.keyword)
            .field("location", &self.location)
            .finish()
    }
}

/// A compiled schema.
///
/// Schemas never own each other; applicators hold [`SchemaRef`]s and look the
/// target up in the registry at evaluation time, which keeps cyclic schema
/// graphs representable and lets `$dynamicRef` pick its target from the
/// caller's scope.
#[derive(Debug)]
pub struct Schema {
    /// The `$id` scope this schema was declared under.
    pub(crate) base_uri: Uri<String>,
    /// Canonical address: the base URI plus the pointer within that resource.
    pub(crate) absolute_uri: CompoundUri,
    /// Document-absolute pointer of this schema.
    pub(crate) location: Location,
    /// Evaluators ordered by keyword priority, then source order.
    pub(crate) evaluators: Vec<KeywordEvaluator>,
    /// Vocabularies governing this schema.
    pub(crate) vocabularies: Arc<VocabularySet>,
}

impl Schema {
    /// The canonical URI of this schema.
    #[must_use]
    pub fn absolute_uri(&self) -> &CompoundUri {
        &self.absolute_uri
    }

    /// The `$id` scope this schema was declared under.
    #[must_use]
    pub fn base_uri(&self) -> &Uri<String> {
        &self.base_uri
    }

    /// Vocabularies governing this schema.
    #[must_use]
    pub fn vocabularies(&self) -> &VocabularySet {
        &self.vocabularies
    }

    /// Run the evaluators in priority order, recording errors and
    /// annotations into the context. Does not short-circuit: later keywords
    /// still run so their errors are reported and their annotations stay
    /// available to `unevaluated*`.
    pub(crate) fn evaluate(
        &self,
        ctx: &mut EvaluationContext<'_>,
        instance: &Value,
        location: &LazyLocation,
    ) -> bool {
        ctx.enter_schema();
        let mut valid = true;
        for keyword in &self.evaluators {
            match keyword.evaluator.evaluate(ctx, instance, location) {
                Ok(None) => {}
                Ok(Some(annotation)) => ctx.annotate(keyword, location, annotation),
                Err(error) => {
                    valid = false;
                    ctx.record_error(keyword, location, error);
                }
            }
        }
        ctx.exit_schema();
        valid
    }
}

/// A reference to another schema, stored by URI and resolved through the
/// registry at evaluation time.
#[derive(Debug, Clone)]
pub struct SchemaRef {
    uri: CompoundUri,
}

impl SchemaRef {
    pub(crate) fn new(uri: CompoundUri) -> SchemaRef {
        SchemaRef { uri }
    }

    /// The address this reference resolves through.
    #[must_use]
    pub fn uri(&self) -> &CompoundUri {
        &self.uri
    }

    /// Look the target up, reporting a miss as an evaluation failure.
    pub(crate) fn resolve(
        &self,
        ctx: &EvaluationContext<'_>,
    ) -> Result<Arc<Schema>, ErrorDescription> {
        ctx.lookup(&self.uri)
            .ok_or_else(|| ErrorDescription::from(format!("Schema '{}' is not registered", self.uri)))
    }
}

impl fmt::Display for SchemaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.uri.fmt(f)
    }
}
