use serde_json::{Map, Value};

use crate::{
    compiler::ParseContext,
    context::EvaluationContext,
    keywords::{helpers, CompilationResult},
    output::ErrorDescription,
    paths::LazyLocation,
    schema::Evaluate,
};

pub(crate) struct MinPropertiesEvaluator {
    limit: u64,
}

impl Evaluate for MinPropertiesEvaluator {
    fn evaluate(
        &self,
        _: &mut EvaluationContext<'_>,
        instance: &Value,
        _: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        if let Value::Object(properties) = instance {
            if (properties.len() as u64) < self.limit {
                return Err(ErrorDescription::from(format!(
                    "{instance} has less than {} propert{}",
                    self.limit,
                    if self.limit == 1 { "y" } else { "ies" }
                )));
            }
        }
        Ok(None)
    }
}

pub(crate) fn compile(
    ctx: &mut ParseContext<'_, '_>,
    _: &Map<String, Value>,
    value: &Value,
) -> CompilationResult {
    Some(
        helpers::count_limit(ctx, "minProperties", value)
            .map(|limit| Box::new(MinPropertiesEvaluator { limit }) as _),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"minProperties": 1}), &json!({"a": 1}), true)]
    #[test_case(&json!({"minProperties": 1}), &json!({}), false)]
    fn lower_bound(schema: &Value, instance: &Value, expected: bool) {
        assert_eq!(
            crate::is_valid(schema, instance).expect("Invalid schema"),
            expected
        );
    }
}
