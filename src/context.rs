use std::sync::Arc;

use ahash::AHashSet;
use fluent_uri::Uri;
use serde_json::Value;

use crate::{
    output::{ErrorDescription, OutputUnit, Validation},
    paths::{LazyLocation, Location},
    registry::Registry,
    schema::{KeywordEvaluator, Schema},
    uri::CompoundUri,
};

/// Keywords whose annotations carry evaluated property names.
const PROPERTY_ANNOTATIONS: [&str; 4] = [
    "properties",
    "patternProperties",
    "additionalProperties",
    "unevaluatedProperties",
];

/// Keywords whose annotations carry evaluated item information.
const ITEM_ANNOTATIONS: [&str; 5] = [
    "prefixItems",
    "items",
    "additionalItems",
    "contains",
    "unevaluatedItems",
];

struct Annotation {
    keyword: Box<str>,
    unit: OutputUnit<Value>,
}

/// Which array items the applicators of one schema object have evaluated.
#[derive(Debug, Default)]
pub(crate) struct EvaluatedItems {
    /// Some applicator covered every item (e.g. `items` applied to the rest).
    pub(crate) all: bool,
    /// Individually evaluated indices (`prefixItems`, `contains`).
    pub(crate) indices: AHashSet<usize>,
}

impl EvaluatedItems {
    pub(crate) fn contains(&self, index: usize) -> bool {
        self.all || self.indices.contains(&index)
    }
}

/// Per-`validate`-call state: the dynamic scope, the in-flight
/// `(schema, instance)` pairs for loop detection, and the error/annotation
/// trail.
pub struct EvaluationContext<'r> {
    registry: &'r Registry,
    /// Base URIs of the schemas traversed by references, outermost first.
    scope: Vec<Uri<String>>,
    /// `(schema, instance location)` pairs currently being evaluated.
    stack: Vec<(CompoundUri, Location)>,
    annotations: Vec<Annotation>,
    errors: Vec<OutputUnit<ErrorDescription>>,
    /// Annotation watermarks of the schema objects currently on the call
    /// stack; `unevaluated*` only sees annotations above its own schema's
    /// watermark.
    schema_marks: Vec<usize>,
}

impl<'r> EvaluationContext<'r> {
    pub(crate) fn new(registry: &'r Registry) -> EvaluationContext<'r> {
        EvaluationContext {
            registry,
            scope: Vec::new(),
            stack: Vec::new(),
            annotations: Vec::new(),
            errors: Vec::new(),
            schema_marks: Vec::new(),
        }
    }

    /// Evaluate `instance` against `schema` as the entry point and produce
    /// the final result.
    pub(crate) fn validate(mut self, schema: &Schema, instance: &Value) -> Validation {
        let location = LazyLocation::new();
        let valid = match self.apply_reference(schema, instance, &location) {
            Ok(valid) => valid,
            Err(error) => {
                self.errors.push(OutputUnit::new(
                    schema.location.clone(),
                    Location::new(),
                    None,
                    error,
                ));
                false
            }
        };
        let annotations = if valid {
            self.annotations.into_iter().map(|a| a.unit).collect()
        } else {
            Vec::new()
        };
        Validation::new(valid, self.errors, annotations)
    }

    /// Look a schema up in the registry.
    pub(crate) fn lookup(&self, uri: &CompoundUri) -> Option<Arc<Schema>> {
        self.registry.get(uri)
    }

    /// Whether `base` declares a dynamic anchor named `name`.
    pub(crate) fn has_dynamic(&self, base: &Uri<String>, name: &str) -> bool {
        self.registry.get_dynamic(base, name).is_some()
    }

    /// Resolve a dynamic anchor by walking the dynamic scope from the
    /// outermost entry inward and taking the first base URI that declares
    /// the anchor.
    pub(crate) fn dynamic_target(&self, name: &str) -> Option<Arc<Schema>> {
        self.scope
            .iter()
            .find_map(|base| self.registry.get_dynamic(base, name))
    }

    /// Cross into a referenced schema: detect loops, extend the dynamic
    /// scope, evaluate, and restore.
    pub(crate) fn apply_reference(
        &mut self,
        schema: &Schema,
        instance: &Value,
        location: &LazyLocation,
    ) -> Result<bool, ErrorDescription> {
        let key = (schema.absolute_uri.clone(), Location::from(location));
        if self.stack.contains(&key) {
            return Err(ErrorDescription::from(format!(
                "Infinite recursion detected: '{}' was reached again for instance location '{}'",
                key.0, key.1
            )));
        }
        self.stack.push(key);
        self.scope.push(schema.base_uri.clone());
        let valid = self.apply(schema, instance, location);
        self.scope.pop();
        self.stack.pop();
        Ok(valid)
    }

    /// Evaluate a subschema in place. Failed schemas contribute no
    /// annotations.
    pub(crate) fn apply(
        &mut self,
        schema: &Schema,
        instance: &Value,
        location: &LazyLocation,
    ) -> bool {
        let mark = self.annotations.len();
        let valid = schema.evaluate(self, instance, location);
        if !valid {
            self.annotations.truncate(mark);
        }
        valid
    }

    /// Evaluate a subschema whose failure the caller tolerates (`anyOf`
    /// branches, `if`, `not`, `contains`): a failed probe leaves neither
    /// errors nor annotations behind.
    pub(crate) fn probe(
        &mut self,
        schema: &Schema,
        instance: &Value,
        location: &LazyLocation,
    ) -> bool {
        let mark = self.errors.len();
        let valid = self.apply(schema, instance, location);
        if !valid {
            self.errors.truncate(mark);
        }
        valid
    }

    pub(crate) fn annotations_len(&self) -> usize {
        self.annotations.len()
    }

    pub(crate) fn truncate_annotations(&mut self, mark: usize) {
        self.annotations.truncate(mark);
    }

    pub(crate) fn enter_schema(&mut self) {
        self.schema_marks.push(self.annotations.len());
    }

    pub(crate) fn exit_schema(&mut self) {
        self.schema_marks.pop();
    }

    pub(crate) fn annotate(
        &mut self,
        keyword: &KeywordEvaluator,
        location: &LazyLocation,
        value: Value,
    ) {
        self.annotations.push(Annotation {
            keyword: keyword.keyword.clone(),
            unit: OutputUnit::new(
                keyword.location.clone(),
                Location::from(location),
                keyword.absolute_location.clone(),
                value,
            ),
        });
    }

    pub(crate) fn record_error(
        &mut self,
        keyword: &KeywordEvaluator,
        location: &LazyLocation,
        error: ErrorDescription,
    ) {
        self.errors.push(OutputUnit::new(
            keyword.location.clone(),
            Location::from(location),
            keyword.absolute_location.clone(),
            error,
        ));
    }

    /// Property names evaluated at `instance_location` by the applicators of
    /// the schema object currently being evaluated, including everything its
    /// in-place applicators and references contributed.
    pub(crate) fn evaluated_property_names(
        &self,
        instance_location: &Location,
    ) -> AHashSet<String> {
        let mark = self.schema_marks.last().copied().unwrap_or(0);
        let mut names = AHashSet::new();
        for annotation in &self.annotations[mark..] {
            if PROPERTY_ANNOTATIONS.contains(&&*annotation.keyword)
                && annotation.unit.instance_location() == instance_location
            {
                if let Value::Array(evaluated) = annotation.unit.value() {
                    names.extend(
                        evaluated
                            .iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string),
                    );
                }
            }
        }
        names
    }

    /// Array items evaluated at `instance_location`, in the same visibility
    /// scope as [`EvaluationContext::evaluated_property_names`].
    pub(crate) fn evaluated_items(&self, instance_location: &Location) -> EvaluatedItems {
        let mark = self.schema_marks.last().copied().unwrap_or(0);
        let mut items = EvaluatedItems::default();
        for annotation in &self.annotations[mark..] {
            if !ITEM_ANNOTATIONS.contains(&&*annotation.keyword)
                || annotation.unit.instance_location() != instance_location
            {
                continue;
            }
            match annotation.unit.value() {
                // `items`-style keywords report covering the whole rest
                Value::Bool(true) => items.all = true,
                // `prefixItems` reports the largest evaluated index
                Value::Number(largest) => {
                    if let Some(largest) = largest.as_u64() {
                        items.indices.extend(0..=largest as usize);
                    }
                }
                // `contains` reports the exact indices it matched
                Value::Array(indices) => {
                    items
                        .indices
                        .extend(indices.iter().filter_map(|idx| idx.as_u64().map(|i| i as usize)));
                }
                _ => {}
            }
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use crate::{uri, Registry};

    use super::EvaluationContext;

    #[test]
    fn dynamic_lookups_on_an_empty_scope_find_nothing() {
        // The walk itself is covered end-to-end in the validator tests
        let registry = Registry::default();
        let ctx = EvaluationContext::new(&registry);
        assert!(ctx.dynamic_target("meta").is_none());
        assert!(!ctx.has_dynamic(&uri::from_str("urn:absent").expect("Invalid URI"), "meta"));
    }
}
