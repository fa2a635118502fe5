use std::cmp::Ordering;

use serde_json::{Map, Number, Value};

use crate::{
    compiler::ParseContext,
    context::EvaluationContext,
    error::SchemaError,
    keywords::{helpers, CompilationResult},
    output::ErrorDescription,
    paths::LazyLocation,
    schema::Evaluate,
    Error,
};

pub(crate) struct MinimumEvaluator {
    limit: Number,
}

impl Evaluate for MinimumEvaluator {
    fn evaluate(
        &self,
        _: &mut EvaluationContext<'_>,
        instance: &Value,
        _: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        if let Value::Number(item) = instance {
            if helpers::compare_numbers(item, &self.limit) == Some(Ordering::Less) {
                return Err(ErrorDescription::from(format!(
                    "{instance} is less than the minimum of {}",
                    self.limit
                )));
            }
        }
        Ok(None)
    }
}

pub(crate) fn number_limit(
    ctx: &ParseContext<'_, '_>,
    keyword: &str,
    value: &Value,
) -> Result<Number, Error> {
    match value {
        Value::Number(limit) => Ok(limit.clone()),
        _ => Err(Error::invalid_schema(
            ctx.base_uri().as_str(),
            vec![SchemaError {
                location: ctx.location().join(keyword),
                message: format!("{value} is not of type \"number\""),
            }],
        )),
    }
}

pub(crate) fn compile(
    ctx: &mut ParseContext<'_, '_>,
    _: &Map<String, Value>,
    value: &Value,
) -> CompilationResult {
    Some(number_limit(ctx, "minimum", value).map(|limit| Box::new(MinimumEvaluator { limit }) as _))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"minimum": 5}), &json!(5), true)]
    #[test_case(&json!({"minimum": 5}), &json!(5.0), true)]
    #[test_case(&json!({"minimum": 5.5}), &json!(5), false)]
    #[test_case(&json!({"minimum": 1_u64 << 54}), &json!((1_u64 << 54) - 1), false)]
    #[test_case(&json!({"minimum": -2}), &json!(-1), true)]
    #[test_case(&json!({"minimum": 5}), &json!("not a number"), true)]
    fn lower_bound(schema: &Value, instance: &Value, expected: bool) {
        assert_eq!(
            crate::is_valid(schema, instance).expect("Invalid schema"),
            expected
        );
    }
}
