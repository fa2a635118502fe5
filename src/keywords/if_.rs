use serde_json::{Map, Value};

use crate::{
    compiler::ParseContext,
    context::EvaluationContext,
    keywords::CompilationResult,
    output::ErrorDescription,
    paths::LazyLocation,
    schema::{Evaluate, SchemaRef},
};

/// `if`/`then`/`else`. The conditional's annotations stay visible when it
/// passes; a failed conditional leaves no trace.
pub(crate) struct IfThenElseEvaluator {
    condition: SchemaRef,
    then: Option<SchemaRef>,
    otherwise: Option<SchemaRef>,
}

impl Evaluate for IfThenElseEvaluator {
    fn evaluate(
        &self,
        ctx: &mut EvaluationContext<'_>,
        instance: &Value,
        location: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        let condition = self.condition.resolve(ctx)?;
        let branch = if ctx.probe(&condition, instance, location) {
            &self.then
        } else {
            &self.otherwise
        };
        if let Some(subschema) = branch {
            let schema = subschema.resolve(ctx)?;
            if !ctx.apply(&schema, instance, location) {
                return Err(ErrorDescription::from(format!(
                    "{instance} does not match the conditionally applied schema"
                )));
            }
        }
        Ok(None)
    }
}

pub(crate) fn compile(
    ctx: &mut ParseContext<'_, '_>,
    parent: &Map<String, Value>,
    value: &Value,
) -> CompilationResult {
    let condition = match ctx.subschema("if", value) {
        Ok(condition) => condition,
        Err(error) => return Some(Err(error)),
    };
    // `then`/`else` are registered by the parser on its own; only handles
    // are taken here
    let then = parent.contains_key("then").then(|| ctx.sibling("then"));
    let otherwise = parent.contains_key("else").then(|| ctx.sibling("else"));
    Some(Ok(Box::new(IfThenElseEvaluator {
        condition,
        then,
        otherwise,
    })))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"if": {"type": "integer"}, "then": {"minimum": 2}}), &json!(3), true)]
    #[test_case(&json!({"if": {"type": "integer"}, "then": {"minimum": 2}}), &json!(1), false)]
    #[test_case(&json!({"if": {"type": "integer"}, "then": {"minimum": 2}}), &json!("x"), true; "condition failed and no else")]
    #[test_case(&json!({"if": {"type": "integer"}, "else": {"maxLength": 1}}), &json!("x"), true)]
    #[test_case(&json!({"if": {"type": "integer"}, "else": {"maxLength": 1}}), &json!("xy"), false)]
    #[test_case(&json!({"then": {"minimum": 100}}), &json!(1), true; "then without if is ignored")]
    #[test_case(&json!({"else": {"minimum": 100}}), &json!(1), true; "else without if is ignored")]
    fn conditional(schema: &Value, instance: &Value, expected: bool) {
        assert_eq!(
            crate::is_valid(schema, instance).expect("Invalid schema"),
            expected
        );
    }

    #[test]
    fn then_subschemas_stay_addressable_without_if() {
        let schema = json!({
            "$ref": "#/then",
            "then": {"type": "integer"}
        });
        assert!(crate::is_valid(&schema, &json!(1)).expect("Invalid schema"));
        assert!(!crate::is_valid(&schema, &json!("x")).expect("Invalid schema"));
    }
}
