use serde_json::{Map, Value};

use crate::{
    compiler::ParseContext,
    context::EvaluationContext,
    error::SchemaError,
    keywords::CompilationResult,
    output::ErrorDescription,
    paths::LazyLocation,
    schema::Evaluate,
    Error,
};

pub(crate) struct RequiredEvaluator {
    required: Vec<String>,
}

impl Evaluate for RequiredEvaluator {
    fn evaluate(
        &self,
        _: &mut EvaluationContext<'_>,
        instance: &Value,
        _: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        if let Value::Object(properties) = instance {
            let mut missing = self
                .required
                .iter()
                .filter(|name| !properties.contains_key(*name));
            if let Some(name) = missing.next() {
                // Report the first missing property; the rest follow on the
                // next run once it is added
                return Err(ErrorDescription::from(format!(
                    "\"{name}\" is a required property"
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
    let invalid = || {
        Error::invalid_schema(
            ctx.base_uri().as_str(),
            vec![SchemaError {
                location: ctx.location().join("required"),
                message: format!("{value} is not an array of strings"),
            }],
        )
    };
    let Some(names) = value.as_array() else {
        return Some(Err(invalid()));
    };
    let mut required = Vec::with_capacity(names.len());
    for name in names {
        match name.as_str() {
            Some(name) => required.push(name.to_string()),
            None => return Some(Err(invalid())),
        }
    }
    Some(Ok(Box::new(RequiredEvaluator { required })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"required": []}), &json!({}), true)]
    #[test_case(&json!({"required": ["a"]}), &json!({"a": null}), true)]
    #[test_case(&json!({"required": ["a"]}), &json!({}), false)]
    #[test_case(&json!({"required": ["a"]}), &json!("not an object"), true)]
    fn presence(schema: &Value, instance: &Value, expected: bool) {
        assert_eq!(
            crate::is_valid(schema, instance).expect("Invalid schema"),
            expected
        );
    }
}
