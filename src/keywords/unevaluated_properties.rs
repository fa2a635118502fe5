use serde_json::{Map, Value};

use crate::{
    compiler::ParseContext,
    context::EvaluationContext,
    keywords::{properties::join_quoted, CompilationResult},
    output::ErrorDescription,
    paths::{LazyLocation, Location},
    schema::{Evaluate, SchemaRef},
};

/// `unevaluatedProperties`: applies to every property no applicator that
/// passed at this instance location has claimed. Runs last within its schema
/// object, so the annotation trail is complete when it looks.
pub(crate) struct UnevaluatedPropertiesEvaluator {
    subschema: SchemaRef,
}

impl Evaluate for UnevaluatedPropertiesEvaluator {
    fn evaluate(
        &self,
        ctx: &mut EvaluationContext<'_>,
        instance: &Value,
        location: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        let Value::Object(items) = instance else {
            return Ok(None);
        };
        let evaluated = ctx.evaluated_property_names(&Location::from(location));
        let mut claimed = Vec::new();
        let mut failed = Vec::new();
        for (name, item) in items {
            if evaluated.contains(name) {
                continue;
            }
            let schema = self.subschema.resolve(ctx)?;
            let item_location = location.push(name.as_str());
            if !ctx.apply(&schema, item, &item_location) {
                failed.push(name.as_str());
            }
            claimed.push(Value::String(name.clone()));
        }
        if failed.is_empty() {
            Ok(Some(Value::Array(claimed)))
        } else {
            Err(ErrorDescription::from(format!(
                "Unevaluated properties are not allowed ({} {} unexpected)",
                join_quoted(&failed),
                if failed.len() == 1 { "was" } else { "were" }
            )))
        }
    }
}

pub(crate) fn compile(
    ctx: &mut ParseContext<'_, '_>,
    _: &Map<String, Value>,
    value: &Value,
) -> CompilationResult {
    Some(
        ctx.subschema("unevaluatedProperties", value)
            .map(|subschema| Box::new(UnevaluatedPropertiesEvaluator { subschema }) as _),
    )
}
