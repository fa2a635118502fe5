use serde_json::{Map, Value};

use crate::{
    compiler::ParseContext,
    context::EvaluationContext,
    keywords::CompilationResult,
    output::ErrorDescription,
    paths::LazyLocation,
    schema::{Evaluate, SchemaRef},
};

pub(crate) struct AllOfEvaluator {
    subschemas: Vec<SchemaRef>,
}

impl Evaluate for AllOfEvaluator {
    fn evaluate(
        &self,
        ctx: &mut EvaluationContext<'_>,
        instance: &Value,
        location: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        let mut invalid = 0usize;
        for subschema in &self.subschemas {
            let schema = subschema.resolve(ctx)?;
            if !ctx.apply(&schema, instance, location) {
                invalid += 1;
            }
        }
        if invalid == 0 {
            Ok(None)
        } else {
            Err(ErrorDescription::from(format!(
                "{instance} is not valid under all of the schemas listed in the 'allOf' keyword"
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
        match ctx.subschema_item("allOf", index, subschema) {
            Ok(reference) => references.push(reference),
            Err(error) => return Some(Err(error)),
        }
    }
    Some(Ok(Box::new(AllOfEvaluator {
        subschemas: references,
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"allOf": [{"minimum": 2}, {"maximum": 4}]}), &json!(3), true)]
    #[test_case(&json!({"allOf": [{"minimum": 2}, {"maximum": 4}]}), &json!(5), false)]
    #[test_case(&json!({"allOf": [{"minimum": 2}, {"maximum": 4}]}), &json!(1), false)]
    fn conjunction(schema: &Value, instance: &Value, expected: bool) {
        assert_eq!(
            crate::is_valid(schema, instance).expect("Invalid schema"),
            expected
        );
    }

    #[test]
    fn failing_branch_errors_are_kept() {
        let result = crate::validate_once(
            &json!({"allOf": [{"type": "integer"}, {"minimum": 2}]}),
            &json!(1.5),
        )
        .expect("Invalid schema");
        assert!(!result.is_valid());
        // Both branch errors plus the summarizing one
        assert_eq!(result.errors().len(), 3);
    }
}
