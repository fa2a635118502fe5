use serde_json::{Map, Value};

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

pub(crate) struct EnumEvaluator {
    options: Vec<Value>,
}

impl Evaluate for EnumEvaluator {
    fn evaluate(
        &self,
        _: &mut EvaluationContext<'_>,
        instance: &Value,
        _: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        if self.options.iter().any(|option| helpers::equal(option, instance)) {
            Ok(None)
        } else {
            let options = Value::Array(self.options.clone());
            Err(ErrorDescription::from(format!(
                "{instance} is not one of {options}"
            )))
        }
    }
}

pub(crate) fn compile(
    ctx: &mut ParseContext<'_, '_>,
    _: &Map<String, Value>,
    value: &Value,
) -> CompilationResult {
    let Some(options) = value.as_array() else {
        return Some(Err(Error::invalid_schema(
            ctx.base_uri().as_str(),
            vec![SchemaError {
                location: ctx.location().join("enum"),
                message: format!("{value} is not of type \"array\""),
            }],
        )));
    };
    Some(Ok(Box::new(EnumEvaluator {
        options: options.clone(),
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"enum": [1, "two", null]}), &json!("two"), true)]
    #[test_case(&json!({"enum": [1, "two", null]}), &json!(null), true)]
    #[test_case(&json!({"enum": [1, "two", null]}), &json!(2), false)]
    #[test_case(&json!({"enum": [{"a": 1}]}), &json!({"a": 1.0}), true)]
    fn membership(schema: &Value, instance: &Value, expected: bool) {
        assert_eq!(
            crate::is_valid(schema, instance).expect("Invalid schema"),
            expected
        );
    }
}
