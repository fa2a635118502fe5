use serde_json::{Map, Value};

use crate::{
    compiler::ParseContext,
    context::EvaluationContext,
    keywords::{helpers, CompilationResult},
    output::ErrorDescription,
    paths::LazyLocation,
    schema::Evaluate,
};

pub(crate) struct UniqueItemsEvaluator;

pub(crate) fn is_unique(items: &[Value]) -> bool {
    // Pairwise comparison keeps the mathematical number equality of
    // `helpers::equal`; item counts are small in practice
    for (idx, left) in items.iter().enumerate() {
        for right in &items[idx + 1..] {
            if helpers::equal(left, right) {
                return false;
            }
        }
    }
    true
}

impl Evaluate for UniqueItemsEvaluator {
    fn evaluate(
        &self,
        _: &mut EvaluationContext<'_>,
        instance: &Value,
        _: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        if let Value::Array(items) = instance {
            if !is_unique(items) {
                return Err(ErrorDescription::from(format!(
                    "{instance} has non-unique elements"
                )));
            }
        }
        Ok(None)
    }
}

pub(crate) fn compile(
    _: &mut ParseContext<'_, '_>,
    _: &Map<String, Value>,
    value: &Value,
) -> CompilationResult {
    match value.as_bool() {
        Some(true) => Some(Ok(Box::new(UniqueItemsEvaluator))),
        // `uniqueItems: false` asserts nothing
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"uniqueItems": true}), &json!([1, 2, 3]), true)]
    #[test_case(&json!({"uniqueItems": true}), &json!([1, 1]), false)]
    #[test_case(&json!({"uniqueItems": true}), &json!([1, 1.0]), false; "mathematically equal numbers")]
    #[test_case(&json!({"uniqueItems": false}), &json!([1, 1]), true)]
    #[test_case(&json!({"uniqueItems": true}), &json!([{"a": 1}, {"a": 2}]), true)]
    fn uniqueness(schema: &Value, instance: &Value, expected: bool) {
        assert_eq!(
            crate::is_valid(schema, instance).expect("Invalid schema"),
            expected
        );
    }
}
