use serde_json::{Map, Value};

use crate::{
    compiler::ParseContext,
    context::EvaluationContext,
    keywords::{helpers, CompilationResult},
    output::ErrorDescription,
    paths::LazyLocation,
    schema::Evaluate,
};

pub(crate) struct ConstEvaluator {
    expected: Value,
}

impl Evaluate for ConstEvaluator {
    fn evaluate(
        &self,
        _: &mut EvaluationContext<'_>,
        instance: &Value,
        _: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        if helpers::equal(&self.expected, instance) {
            Ok(None)
        } else {
            Err(ErrorDescription::from(format!(
                "{} was expected",
                self.expected
            )))
        }
    }
}

pub(crate) fn compile(
    _: &mut ParseContext<'_, '_>,
    _: &Map<String, Value>,
    value: &Value,
) -> CompilationResult {
    Some(Ok(Box::new(ConstEvaluator {
        expected: value.clone(),
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"const": {"a": [1]}}), &json!({"a": [1.0]}), true)]
    #[test_case(&json!({"const": null}), &json!(null), true)]
    #[test_case(&json!({"const": 1}), &json!(1.0), true)]
    #[test_case(&json!({"const": 1}), &json!("1"), false)]
    fn equality(schema: &Value, instance: &Value, expected: bool) {
        assert_eq!(
            crate::is_valid(schema, instance).expect("Invalid schema"),
            expected
        );
    }
}
