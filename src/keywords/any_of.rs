use serde_json::{Map, Value};

use crate::{
    compiler::ParseContext,
    context::EvaluationContext,
    keywords::CompilationResult,
    output::ErrorDescription,
    paths::LazyLocation,
    schema::{Evaluate, SchemaRef},
};

pub(crate) struct AnyOfEvaluator {
    subschemas: Vec<SchemaRef>,
}

impl Evaluate for AnyOfEvaluator {
    fn evaluate(
        &self,
        ctx: &mut EvaluationContext<'_>,
        instance: &Value,
        location: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        let mut valid = 0usize;
        // No short-circuit: every passing branch must still run so its
        // annotations are available to `unevaluated*`
        for subschema in &self.subschemas {
            let schema = subschema.resolve(ctx)?;
            if ctx.probe(&schema, instance, location) {
                valid += 1;
            }
        }
        if valid > 0 {
            Ok(None)
        } else {
            Err(ErrorDescription::from(format!(
                "{instance} is not valid under any of the schemas listed in the 'anyOf' keyword"
            )))
        }
    }
}

pub(crate) fn compile(
    ctx: &mut ParseContext<'_, '_>,
    _: &Map<String, Value>,
    value: &Value,
) -> CompilationResult {
    let subschemas = value.as_array()?;
    let mut references = Vec::with_capacity(subschemas.len());
    for (index, subschema) in subschemas.iter().enumerate() {
        match ctx.subschema_item("anyOf", index, subschema) {
            Ok(reference) => references.push(reference),
            Err(error) => return Some(Err(error)),
        }
    }
    Some(Ok(Box::new(AnyOfEvaluator {
        subschemas: references,
    })))
}
