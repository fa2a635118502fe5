use serde_json::{Map, Value};

use crate::{
    compiler::ParseContext,
    keywords::{items::ItemsEvaluator, CompilationResult},
};

/// `additionalItems` (Draft 2019-09): the rest of the array after an
/// array-form `items`. Without one it asserts nothing.
pub(crate) fn compile(
    ctx: &mut ParseContext<'_, '_>,
    parent: &Map<String, Value>,
    value: &Value,
) -> CompilationResult {
    let skip = parent.get("items").and_then(Value::as_array)?.len();
    Some(
        ctx.subschema("additionalItems", value)
            .map(|subschema| Box::new(ItemsEvaluator::after(subschema, skip)) as _),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    fn legacy(schema: &Value) -> Value {
        let mut schema = schema.clone();
        schema["$schema"] = json!("https://json-schema.org/draft/2019-09/schema");
        schema
    }

    #[test_case(&json!({"items": [{}], "additionalItems": {"type": "integer"}}), &json!(["x", 2]), true)]
    #[test_case(&json!({"items": [{}], "additionalItems": {"type": "integer"}}), &json!(["x", "y"]), false)]
    #[test_case(&json!({"items": [{}], "additionalItems": false}), &json!(["x"]), true)]
    #[test_case(&json!({"items": [{}], "additionalItems": false}), &json!(["x", "y"]), false)]
    #[test_case(&json!({"additionalItems": false}), &json!(["x"]), true; "ignored without array items")]
    fn rest_of_array(schema: &Value, instance: &Value, expected: bool) {
        assert_eq!(
            crate::is_valid(&legacy(schema), instance).expect("Invalid schema"),
            expected
        );
    }
}
