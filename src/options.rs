use std::sync::Arc;

use serde_json::Value;

use crate::{
    compiler::EvaluatorFactory,
    dialect::{Dialect, Draft},
    node::{NodeFactory, SerdeNodeFactory},
    resolver::SchemaResolver,
    validator::Validator,
    Error, Validation,
};

/// Configuration options for building a [`Validator`].
#[derive(Clone)]
pub struct ValidationOptions {
    dialect: Dialect,
    validate_schema: bool,
    validate_formats: bool,
    factories: Vec<Arc<dyn EvaluatorFactory>>,
    resolvers: Vec<Arc<dyn SchemaResolver>>,
    node_factory: Arc<dyn NodeFactory>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        ValidationOptions {
            dialect: Dialect::default(),
            validate_schema: true,
            validate_formats: false,
            factories: Vec::new(),
            resolvers: Vec::new(),
            node_factory: Arc::new(SerdeNodeFactory),
        }
    }
}

impl ValidationOptions {
    /// Select the default dialect (default: Draft 2020-12).
    pub fn with_draft(&mut self, draft: Draft) -> &mut Self {
        self.dialect = Dialect::for_draft(draft);
        self
    }

    /// Select the default dialect explicitly, including custom ones.
    pub fn with_dialect(&mut self, dialect: Dialect) -> &mut Self {
        self.dialect = dialect;
        self
    }

    /// Skip meta-schema validation during schema registration.
    pub fn without_schema_validation(&mut self) -> &mut Self {
        self.validate_schema = false;
        self
    }

    /// Turn `format` into an assertion regardless of the active
    /// vocabularies.
    pub fn should_validate_formats(&mut self, validate_formats: bool) -> &mut Self {
        self.validate_formats = validate_formats;
        self
    }

    /// Add a custom evaluator factory. Factories are consulted in
    /// registration order, all of them ahead of the built-in keyword set.
    pub fn with_evaluator_factory(&mut self, factory: Arc<dyn EvaluatorFactory>) -> &mut Self {
        self.factories.push(factory);
        self
    }

    /// Add a custom schema resolver. Resolvers are consulted in registration
    /// order, after already-registered URIs and the embedded specification
    /// meta-schemas.
    pub fn with_resolver(&mut self, resolver: Arc<dyn SchemaResolver>) -> &mut Self {
        self.resolvers.push(resolver);
        self
    }

    /// Select the JSON parser backend.
    pub fn with_node_factory(&mut self, factory: Arc<dyn NodeFactory>) -> &mut Self {
        self.node_factory = factory;
        self
    }

    /// Build an empty [`Validator`] with these options.
    #[must_use]
    pub fn build_validator(&self) -> Validator {
        Validator::with_options(self.clone())
    }

    /// Build a [`Validator`] with `schema` registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be registered.
    pub fn build(&self, schema: &Value) -> Result<Validator, Error> {
        let mut validator = self.build_validator();
        validator.register_schema(schema)?;
        Ok(validator)
    }

    /// Register `schema` anonymously, validate `instance`, and discard the
    /// registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be registered.
    pub fn validate_once(&self, schema: &Value, instance: &Value) -> Result<Validation, Error> {
        self.build_validator().validate_once(schema, instance)
    }

    pub(crate) fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    pub(crate) fn validate_schema(&self) -> bool {
        self.validate_schema
    }

    pub(crate) fn validate_formats(&self) -> bool {
        self.validate_formats
    }

    pub(crate) fn factories(&self) -> &[Arc<dyn EvaluatorFactory>] {
        &self.factories
    }

    pub(crate) fn resolvers(&self) -> &[Arc<dyn SchemaResolver>] {
        &self.resolvers
    }

    pub(crate) fn node_factory(&self) -> &dyn NodeFactory {
        &*self.node_factory
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::Draft;

    #[test]
    fn disabled_schema_validation_registers_invalid_schemas() {
        let mut validator = crate::options()
            .without_schema_validation()
            .build_validator();
        // `type: []` violates the meta-schema but is tolerated here
        let uri = validator
            .register_schema(&json!({"type": []}))
            .expect("Registration failed");
        let result = validator.validate(uri.as_str(), &json!(1)).expect("Unknown URI");
        assert!(!result.is_valid());
    }

    #[test]
    fn draft_2019_09_is_selectable_as_the_default() {
        let validator = crate::options()
            .with_draft(Draft::Draft201909)
            .build(&json!({"$recursiveAnchor": true, "type": "object"}))
            .expect("Invalid schema");
        drop(validator);
    }
}
