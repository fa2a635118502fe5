use serde_json::{Map, Value};

use crate::{
    compiler::ParseContext,
    context::EvaluationContext,
    keywords::{helpers, CompilationResult},
    output::ErrorDescription,
    paths::LazyLocation,
    schema::Evaluate,
};

pub(crate) struct MaxItemsEvaluator {
    limit: u64,
}

impl Evaluate for MaxItemsEvaluator {
    fn evaluate(
        &self,
        _: &mut EvaluationContext<'_>,
        instance: &Value,
        _: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        if let Value::Array(items) = instance {
            if (items.len() as u64) > self.limit {
                return Err(ErrorDescription::from(format!(
                    "{instance} has more than {} item{}",
                    self.limit,
                    if self.limit == 1 { "" } else { "s" }
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
        helpers::count_limit(ctx, "maxItems", value)
            .map(|limit| Box::new(MaxItemsEvaluator { limit }) as _),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"maxItems": 2}), &json!([1, 2]), true)]
    #[test_case(&json!({"maxItems": 2}), &json!([1, 2, 3]), false)]
    fn upper_bound(schema: &Value, instance: &Value, expected: bool) {
        assert_eq!(
            crate::is_valid(schema, instance).expect("Invalid schema"),
            expected
        );
    }
}
