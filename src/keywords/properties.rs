use serde_json::{Map, Value};

use crate::{
    compiler::ParseContext,
    context::EvaluationContext,
    keywords::CompilationResult,
    output::ErrorDescription,
    paths::LazyLocation,
    schema::{Evaluate, SchemaRef},
};

pub(crate) struct PropertiesEvaluator {
    properties: Vec<(String, SchemaRef)>,
}

impl Evaluate for PropertiesEvaluator {
    fn evaluate(
        &self,
        ctx: &mut EvaluationContext<'_>,
        instance: &Value,
        location: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        let Value::Object(items) = instance else {
            return Ok(None);
        };
        let mut evaluated = Vec::new();
        let mut failed = Vec::new();
        for (name, subschema) in &self.properties {
            if let Some(item) = items.get(name) {
                let schema = subschema.resolve(ctx)?;
                let item_location = location.push(name.as_str());
                if !ctx.apply(&schema, item, &item_location) {
                    failed.push(name.as_str());
                }
                evaluated.push(Value::String(name.clone()));
            }
        }
        if failed.is_empty() {
            Ok(Some(Value::Array(evaluated)))
        } else {
            Err(ErrorDescription::from(format!(
                "Properties {} are invalid",
                join_quoted(&failed)
            )))
        }
    }
}

pub(crate) fn join_quoted(names: &[&str]) -> String {
    names
        .iter()
        .map(|name| format!("'{name}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn compile(
    ctx: &mut ParseContext<'_, '_>,
    _: &Map<String, Value>,
    value: &Value,
) -> CompilationResult {
    let named = value.as_object()?;
    let mut properties = Vec::with_capacity(named.len());
    for (name, subschema) in named {
        match ctx.subschema_property("properties", name, subschema) {
            Ok(reference) => properties.push((name.clone(), reference)),
            Err(error) => return Some(Err(error)),
        }
    }
    Some(Ok(Box::new(PropertiesEvaluator { properties })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"properties": {"a": {"type": "integer"}}}), &json!({"a": 1}), true)]
    #[test_case(&json!({"properties": {"a": {"type": "integer"}}}), &json!({"a": "x"}), false)]
    #[test_case(&json!({"properties": {"a": {"type": "integer"}}}), &json!({"b": "x"}), true)]
    #[test_case(&json!({"properties": {"a": false}}), &json!({}), true)]
    #[test_case(&json!({"properties": {"a": false}}), &json!({"a": 1}), false)]
    fn named_properties(schema: &Value, instance: &Value, expected: bool) {
        assert_eq!(
            crate::is_valid(schema, instance).expect("Invalid schema"),
            expected
        );
    }

    #[test]
    fn nested_error_locations() {
        let schema = json!({"properties": {"a": {"properties": {"b": {"type": "null"}}}}});
        let result = crate::validate_once(&schema, &json!({"a": {"b": 1}})).expect("Invalid schema");
        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].instance_location().as_str(), "/a/b");
        assert_eq!(
            result.errors()[0].keyword_location().as_str(),
            "/properties/a/properties/b/type"
        );
    }
}
