use serde_json::{Map, Value};

use crate::{
    compiler::ParseContext,
    context::EvaluationContext,
    keywords::CompilationResult,
    output::ErrorDescription,
    paths::LazyLocation,
    schema::{Evaluate, SchemaRef},
};

pub(crate) struct OneOfEvaluator {
    subschemas: Vec<SchemaRef>,
}

impl Evaluate for OneOfEvaluator {
    fn evaluate(
        &self,
        ctx: &mut EvaluationContext<'_>,
        instance: &Value,
        location: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        let mut valid = 0usize;
        // Every branch runs; exclusivity cannot be verified otherwise
        for subschema in &self.subschemas {
            let schema = subschema.resolve(ctx)?;
            if ctx.probe(&schema, instance, location) {
                valid += 1;
            }
        }
        match valid {
            1 => Ok(None),
            0 => Err(ErrorDescription::from(format!(
                "{instance} is not valid under any of the schemas listed in the 'oneOf' keyword"
            ))),
            _ => Err(ErrorDescription::from(format!(
                "{instance} is valid under more than one of the schemas listed in the 'oneOf' keyword"
            ))),
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
        match ctx.subschema_item("oneOf", index, subschema) {
            Ok(reference) => references.push(reference),
            Err(error) => return Some(Err(error)),
        }
    }
    Some(Ok(Box::new(OneOfEvaluator {
        subschemas: references,
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(1), true)]
    #[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(2.5), true)]
    #[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(3), false; "both match")]
    #[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(1.5), false; "neither matches")]
    fn exclusivity(schema: &Value, instance: &Value, expected: bool) {
        assert_eq!(
            crate::is_valid(schema, instance).expect("Invalid schema"),
            expected
        );
    }
}
