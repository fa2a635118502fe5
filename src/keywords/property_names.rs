use serde_json::{Map, Value};

use crate::{
    compiler::ParseContext,
    context::EvaluationContext,
    keywords::CompilationResult,
    output::ErrorDescription,
    paths::LazyLocation,
    schema::{Evaluate, SchemaRef},
};

pub(crate) struct PropertyNamesEvaluator {
    subschema: SchemaRef,
}

impl Evaluate for PropertyNamesEvaluator {
    fn evaluate(
        &self,
        ctx: &mut EvaluationContext<'_>,
        instance: &Value,
        location: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        let Value::Object(items) = instance else {
            return Ok(None);
        };
        let schema = self.subschema.resolve(ctx)?;
        let mut failed = Vec::new();
        for name in items.keys() {
            let name_value = Value::String(name.clone());
            if !ctx.probe(&schema, &name_value, location) {
                failed.push(name.as_str());
            }
        }
        if failed.is_empty() {
            Ok(None)
        } else {
            Err(ErrorDescription::from(format!(
                "Property names {} are invalid",
                crate::keywords::properties::join_quoted(&failed)
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
        ctx.subschema("propertyNames", value)
            .map(|subschema| Box::new(PropertyNamesEvaluator { subschema }) as _),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"propertyNames": {"maxLength": 3}}), &json!({"foo": 1}), true)]
    #[test_case(&json!({"propertyNames": {"maxLength": 3}}), &json!({"food": 1}), false)]
    #[test_case(&json!({"propertyNames": {"maxLength": 3}}), &json!([1]), true)]
    fn names(schema: &Value, instance: &Value, expected: bool) {
        assert_eq!(
            crate::is_valid(schema, instance).expect("Invalid schema"),
            expected
        );
    }
}
