use serde_json::Value;

use crate::{
    context::EvaluationContext, output::ErrorDescription, paths::LazyLocation, schema::Evaluate,
};

/// The `false` schema: rejects everything.
pub(crate) struct FalseEvaluator;

impl Evaluate for FalseEvaluator {
    fn evaluate(
        &self,
        _: &mut EvaluationContext<'_>,
        instance: &Value,
        _: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        Err(ErrorDescription::from(format!(
            "False schema does not allow {instance}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    #[test]
    fn false_schema_rejects_with_the_instance_in_the_message() {
        let result = crate::validate_once(&json!(false), &json!(4)).expect("Invalid schema");
        assert!(!result.is_valid());
        assert_eq!(
            result.errors()[0].value().to_string(),
            "False schema does not allow 4"
        );
    }

    #[test]
    fn true_schema_accepts_anything() {
        assert!(crate::is_valid(&json!(true), &json!({"any": ["thing"]})).expect("Invalid schema"));
    }
}
