use serde_json::{Map, Value};

use crate::{
    compiler::ParseContext,
    context::EvaluationContext,
    keywords::{helpers, CompilationResult},
    output::ErrorDescription,
    paths::LazyLocation,
    schema::Evaluate,
};

pub(crate) struct MaxLengthEvaluator {
    limit: u64,
}

impl Evaluate for MaxLengthEvaluator {
    fn evaluate(
        &self,
        _: &mut EvaluationContext<'_>,
        instance: &Value,
        _: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        if let Value::String(item) = instance {
            if (item.chars().count() as u64) > self.limit {
                return Err(ErrorDescription::from(format!(
                    "{instance} is longer than {} character{}",
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
        helpers::count_limit(ctx, "maxLength", value)
            .map(|limit| Box::new(MaxLengthEvaluator { limit }) as _),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"maxLength": 2}), &json!("fo"), true)]
    #[test_case(&json!({"maxLength": 2}), &json!("foo"), false)]
    fn upper_bound(schema: &Value, instance: &Value, expected: bool) {
        assert_eq!(
            crate::is_valid(schema, instance).expect("Invalid schema"),
            expected
        );
    }
}
