use serde_json::{Map, Value};

use crate::{
    compiler::ParseContext,
    context::EvaluationContext,
    keywords::CompilationResult,
    output::ErrorDescription,
    paths::LazyLocation,
    schema::{Evaluate, SchemaRef},
};

pub(crate) struct NotEvaluator {
    subschema: SchemaRef,
    /// Raw subschema value, kept for the error message.
    original: Value,
}

impl Evaluate for NotEvaluator {
    fn evaluate(
        &self,
        ctx: &mut EvaluationContext<'_>,
        instance: &Value,
        location: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        let schema = self.subschema.resolve(ctx)?;
        let mark = ctx.annotations_len();
        if ctx.probe(&schema, instance, location) {
            // The inner schema matched; none of its annotations may leak out
            ctx.truncate_annotations(mark);
            Err(ErrorDescription::from(format!(
                "{} is not allowed for {instance}",
                self.original
            )))
        } else {
            Ok(None)
        }
    }
}

pub(crate) fn compile(
    ctx: &mut ParseContext<'_, '_>,
    _: &Map<String, Value>,
    value: &Value,
) -> CompilationResult {
    Some(ctx.subschema("not", value).map(|subschema| {
        Box::new(NotEvaluator {
            subschema,
            original: value.clone(),
        }) as _
    }))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"not": {"type": "integer"}}), &json!("x"), true)]
    #[test_case(&json!({"not": {"type": "integer"}}), &json!(1), false)]
    #[test_case(&json!({"not": false}), &json!(1), true)]
    #[test_case(&json!({"not": true}), &json!(1), false)]
    fn negation(schema: &Value, instance: &Value, expected: bool) {
        assert_eq!(
            crate::is_valid(schema, instance).expect("Invalid schema"),
            expected
        );
    }

    #[test]
    fn error_message_shows_the_forbidden_schema() {
        let result = crate::validate_once(&json!({"not": {"type": "integer"}}), &json!(1))
            .expect("Invalid schema");
        assert_eq!(
            result.errors()[0].value().to_string(),
            r#"{"type":"integer"} is not allowed for 1"#
        );
    }
}
