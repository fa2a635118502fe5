use serde_json::{Map, Value};

use crate::{
    compiler::ParseContext,
    context::EvaluationContext,
    keywords::{helpers, CompilationResult},
    output::ErrorDescription,
    paths::LazyLocation,
    schema::{Evaluate, SchemaRef},
};

/// `contains` together with its sibling `minContains`/`maxContains` bounds.
pub(crate) struct ContainsEvaluator {
    subschema: SchemaRef,
    min: u64,
    max: Option<u64>,
}

impl Evaluate for ContainsEvaluator {
    fn evaluate(
        &self,
        ctx: &mut EvaluationContext<'_>,
        instance: &Value,
        location: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        let Value::Array(items) = instance else {
            return Ok(None);
        };
        let schema = self.subschema.resolve(ctx)?;
        let mut matched = Vec::new();
        for (index, item) in items.iter().enumerate() {
            let item_location = location.push(index);
            if ctx.probe(&schema, item, &item_location) {
                matched.push(index);
            }
        }
        let count = matched.len() as u64;
        if count < self.min {
            return Err(ErrorDescription::from(if self.min == 1 {
                format!("None of {instance} are valid under the given schema")
            } else {
                format!(
                    "{instance} contains less than {} matching items",
                    self.min
                )
            }));
        }
        if let Some(max) = self.max {
            if count > max {
                return Err(ErrorDescription::from(format!(
                    "{instance} contains more than {max} matching items"
                )));
            }
        }
        if matched.len() == items.len() {
            Ok(Some(Value::Bool(true)))
        } else {
            Ok(Some(Value::Array(
                matched.into_iter().map(Value::from).collect(),
            )))
        }
    }
}

pub(crate) fn compile(
    ctx: &mut ParseContext<'_, '_>,
    parent: &Map<String, Value>,
    value: &Value,
) -> CompilationResult {
    let min = match parent.get("minContains") {
        Some(bound) => match helpers::count_limit(ctx, "minContains", bound) {
            Ok(min) => min,
            Err(error) => return Some(Err(error)),
        },
        None => 1,
    };
    let max = match parent.get("maxContains") {
        Some(bound) => match helpers::count_limit(ctx, "maxContains", bound) {
            Ok(max) => Some(max),
            Err(error) => return Some(Err(error)),
        },
        None => None,
    };
    Some(
        ctx.subschema("contains", value)
            .map(|subschema| Box::new(ContainsEvaluator { subschema, min, max }) as _),
    )
}
