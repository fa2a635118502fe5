use serde_json::{Map, Value};

use crate::{
    compiler::ParseContext,
    context::EvaluationContext,
    error::SchemaError,
    keywords::CompilationResult,
    output::ErrorDescription,
    paths::LazyLocation,
    schema::{Evaluate, SchemaRef},
    Error,
};

pub(crate) struct DependentRequiredEvaluator {
    dependencies: Vec<(String, Vec<String>)>,
}

impl Evaluate for DependentRequiredEvaluator {
    fn evaluate(
        &self,
        _: &mut EvaluationContext<'_>,
        instance: &Value,
        _: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        let Value::Object(items) = instance else {
            return Ok(None);
        };
        for (name, required) in &self.dependencies {
            if !items.contains_key(name) {
                continue;
            }
            if let Some(missing) = required.iter().find(|name| !items.contains_key(*name)) {
                return Err(ErrorDescription::from(format!(
                    "\"{missing}\" is a required property when \"{name}\" is present"
                )));
            }
        }
        Ok(None)
    }
}

pub(crate) struct DependentSchemasEvaluator {
    dependencies: Vec<(String, SchemaRef)>,
}

impl Evaluate for DependentSchemasEvaluator {
    fn evaluate(
        &self,
        ctx: &mut EvaluationContext<'_>,
        instance: &Value,
        location: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        let Value::Object(items) = instance else {
            return Ok(None);
        };
        let mut failed = Vec::new();
        for (name, subschema) in &self.dependencies {
            if !items.contains_key(name) {
                continue;
            }
            let schema = subschema.resolve(ctx)?;
            if !ctx.apply(&schema, instance, location) {
                failed.push(name.as_str());
            }
        }
        if failed.is_empty() {
            Ok(None)
        } else {
            Err(ErrorDescription::from(format!(
                "{instance} does not satisfy the schemas dependent on {}",
                crate::keywords::properties::join_quoted(&failed)
            )))
        }
    }
}

pub(crate) fn compile_dependent_required(
    ctx: &mut ParseContext<'_, '_>,
    _: &Map<String, Value>,
    value: &Value,
) -> CompilationResult {
    let named = value.as_object()?;
    let mut dependencies = Vec::with_capacity(named.len());
    for (name, required) in named {
        let invalid = || {
            Error::invalid_schema(
                ctx.base_uri().as_str(),
                vec![SchemaError {
                    location: ctx.location().join("dependentRequired").join(name.as_str()),
                    message: format!("{required} is not an array of strings"),
                }],
            )
        };
        let Some(required) = required.as_array() else {
            return Some(Err(invalid()));
        };
        let mut names = Vec::with_capacity(required.len());
        for required_name in required {
            match required_name.as_str() {
                Some(required_name) => names.push(required_name.to_string()),
                None => return Some(Err(invalid())),
            }
        }
        dependencies.push((name.clone(), names));
    }
    Some(Ok(Box::new(DependentRequiredEvaluator { dependencies })))
}

pub(crate) fn compile_dependent_schemas(
    ctx: &mut ParseContext<'_, '_>,
    _: &Map<String, Value>,
    value: &Value,
) -> CompilationResult {
    let named = value.as_object()?;
    let mut dependencies = Vec::with_capacity(named.len());
    for (name, subschema) in named {
        match ctx.subschema_property("dependentSchemas", name, subschema) {
            Ok(reference) => dependencies.push((name.clone(), reference)),
            Err(error) => return Some(Err(error)),
        }
    }
    Some(Ok(Box::new(DependentSchemasEvaluator { dependencies })))
}
