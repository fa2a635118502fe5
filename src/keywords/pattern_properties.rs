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

pub(crate) struct PatternPropertiesEvaluator {
    patterns: Vec<(Regex, SchemaRef)>,
}

impl Evaluate for PatternPropertiesEvaluator {
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
            let mut matched = false;
            for (pattern, subschema) in &self.patterns {
                if pattern.is_match(name).unwrap_or(false) {
                    matched = true;
                    let schema = subschema.resolve(ctx)?;
                    let item_location = location.push(name.as_str());
                    if !ctx.apply(&schema, item, &item_location) {
                        failed.push(name.as_str());
                    }
                }
            }
            if matched {
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

pub(crate) fn compile(
    ctx: &mut ParseContext<'_, '_>,
    _: &Map<String, Value>,
    value: &Value,
) -> CompilationResult {
    let named = value.as_object()?;
    let mut patterns = Vec::with_capacity(named.len());
    for (pattern, subschema) in named {
        let compiled = match compile_pattern(ctx, "patternProperties", pattern) {
            Ok(compiled) => compiled,
            Err(error) => return Some(Err(error)),
        };
        match ctx.subschema_property("patternProperties", pattern, subschema) {
            Ok(reference) => patterns.push((compiled, reference)),
            Err(error) => return Some(Err(error)),
        }
    }
    Some(Ok(Box::new(PatternPropertiesEvaluator { patterns })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"patternProperties": {"^f": {"type": "integer"}}}), &json!({"foo": 1}), true)]
    #[test_case(&json!({"patternProperties": {"^f": {"type": "integer"}}}), &json!({"foo": "x"}), false)]
    #[test_case(&json!({"patternProperties": {"^f": {"type": "integer"}}}), &json!({"bar": "x"}), true)]
    fn matched_properties(schema: &Value, instance: &Value, expected: bool) {
        assert_eq!(
            crate::is_valid(schema, instance).expect("Invalid schema"),
            expected
        );
    }
}
