use std::cmp::Ordering;

use serde_json::{Map, Number, Value};

use crate::{
    compiler::ParseContext,
    context::EvaluationContext,
    keywords::{helpers, minimum::number_limit, CompilationResult},
    output::ErrorDescription,
    paths::LazyLocation,
    schema::Evaluate,
};

pub(crate) struct ExclusiveMaximumEvaluator {
    limit: Number,
}

impl Evaluate for ExclusiveMaximumEvaluator {
    fn evaluate(
        &self,
        _: &mut EvaluationContext<'_>,
        instance: &Value,
        _: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        if let Value::Number(item) = instance {
            if !matches!(
                helpers::compare_numbers(item, &self.limit),
                Some(Ordering::Less)
            ) {
                return Err(ErrorDescription::from(format!(
                    "{instance} is greater than or equal to the maximum of {}",
                    self.limit
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
        number_limit(ctx, "exclusiveMaximum", value)
            .map(|limit| Box::new(ExclusiveMaximumEvaluator { limit }) as _),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"exclusiveMaximum": 3}), &json!(3.0), false)]
    #[test_case(&json!({"exclusiveMaximum": 3.5}), &json!(3), true)]
    fn strict_upper_bound(schema: &Value, instance: &Value, expected: bool) {
        assert_eq!(
            crate::is_valid(schema, instance).expect("Invalid schema"),
            expected
        );
    }
}
