use ahash::AHashSet;
use fancy_regex::Regex;
use serde_json::{Map, Value};

use crate::{
    compiler::ParseContext,
    context::EvaluationContext,
    keywords::{pattern::compile_pattern, properties::join_quoted, CompilationResult},
    output::ErrorDescription,
    paths::LazyLocation,
    schema::{Evaluate, SchemaRef},
};

/// `additionalProperties` applies to properties claimed by neither the
/// sibling `properties` nor `patternProperties`; both siblings are captured
/// at compile time.
pub(crate) struct AdditionalPropertiesEvaluator {
    subschema: SchemaRef,
    named: AHashSet<String>,
    patterns: Vec<Regex>,
}

impl AdditionalPropertiesEvaluator {
    fn is_additional(&self, name: &str) -> bool {
        !self.named.contains(name)
            && !self
                .patterns
                .iter()
                .any(|pattern| pattern.is_match(name).unwrap_or(false))
    }
}

impl Evaluate for AdditionalPropertiesEvaluator {
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
        for (name, item) in items {
            if !self.is_additional(name) {
                continue;
            }
            let schema = self.subschema.resolve(ctx)?;
            let item_location = location.push(name.as_str());
            if !ctx.apply(&schema, item, &item_location) {
                failed.push(name.as_str());
            }
            evaluated.push(Value::String(name.clone()));
        }
        if failed.is_empty() {
            Ok(Some(Value::Array(evaluated)))
        } else {
            Err(ErrorDescription::from(format!(
                "Additional properties are not allowed ({} {} unexpected)",
                join_quoted(&failed),
                if failed.len() == 1 { "was" } else { "were" }
            )))
        }
    }
}

pub(crate) fn compile(
    ctx: &mut ParseContext<'_, '_>,
    parent: &Map<String, Value>,
    value: &Value,
) -> CompilationResult {
    let subschema = match ctx.subschema("additionalProperties", value) {
        Ok(reference) => reference,
        Err(error) => return Some(Err(error)),
    };
    let named = parent
        .get("properties")
        .and_then(Value::as_object)
        .map(|named| named.keys().cloned().collect())
        .unwrap_or_default();
    let mut patterns = Vec::new();
    if let Some(by_pattern) = parent.get("patternProperties").and_then(Value::as_object) {
        for pattern in by_pattern.keys() {
            match compile_pattern(ctx, "patternProperties", pattern) {
                Ok(compiled) => patterns.push(compiled),
                Err(error) => return Some(Err(error)),
            }
        }
    }
    Some(Ok(Box::new(AdditionalPropertiesEvaluator {
        subschema,
        named,
        patterns,
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"additionalProperties": false}), &json!({}), true)]
    #[test_case(&json!({"additionalProperties": false}), &json!({"a": 1}), false)]
    #[test_case(
        &json!({"properties": {"a": {}}, "additionalProperties": false}),
        &json!({"a": 1}),
        true
    )]
    #[test_case(
        &json!({"properties": {"a": {}}, "patternProperties": {"^b": {}}, "additionalProperties": false}),
        &json!({"a": 1, "bar": 2}),
        true
    )]
    #[test_case(
        &json!({"properties": {"a": {}}, "additionalProperties": {"type": "string"}}),
        &json!({"a": 1, "b": "x"}),
        true
    )]
    #[test_case(
        &json!({"properties": {"a": {}}, "additionalProperties": {"type": "string"}}),
        &json!({"a": 1, "b": 2}),
        false
    )]
    fn additional_properties(schema: &Value, instance: &Value, expected: bool) {
        assert_eq!(
            crate::is_valid(schema, instance).expect("Invalid schema"),
            expected
        );
    }

    #[test]
    fn error_message_lists_unexpected_properties() {
        let schema = json!({
            "properties": {"foo": {}, "bar": {}},
            "patternProperties": {"^v": {}},
            "additionalProperties": false
        });
        let result = crate::validate_once(&schema, &json!({"foo": 1, "bar": 2, "quux": "boom"}))
            .expect("Invalid schema");
        assert_eq!(
            result.errors()[0].value().to_string(),
            "Additional properties are not allowed ('quux' was unexpected)"
        );
    }
}
