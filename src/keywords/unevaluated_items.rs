use serde_json::{Map, Value};

use crate::{
    compiler::ParseContext,
    context::EvaluationContext,
    keywords::CompilationResult,
    output::ErrorDescription,
    paths::{LazyLocation, Location},
    schema::{Evaluate, SchemaRef},
};

/// `unevaluatedItems`: applies to every index no applicator that passed at
/// this instance location has claimed.
pub(crate) struct UnevaluatedItemsEvaluator {
    subschema: SchemaRef,
}

impl Evaluate for UnevaluatedItemsEvaluator {
    fn evaluate(
        &self,
        ctx: &mut EvaluationContext<'_>,
        instance: &Value,
        location: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        let Value::Array(items) = instance else {
            return Ok(None);
        };
        let evaluated = ctx.evaluated_items(&Location::from(location));
        let mut invalid = 0usize;
        let mut claimed_any = false;
        for (index, item) in items.iter().enumerate() {
            if evaluated.contains(index) {
                continue;
            }
            let schema = self.subschema.resolve(ctx)?;
            let item_location = location.push(index);
            if !ctx.apply(&schema, item, &item_location) {
                invalid += 1;
            }
            claimed_any = true;
        }
        if invalid > 0 {
            Err(ErrorDescription::from(format!(
                "Unevaluated items are not allowed ({invalid} item{} {} unexpected)",
                if invalid == 1 { "" } else { "s" },
                if invalid == 1 { "was" } else { "were" }
            )))
        } else if claimed_any {
            Ok(Some(Value::Bool(true)))
        } else {
            Ok(None)
        }
    }
}

pub(crate) fn compile(
    ctx: &mut ParseContext<'_, '_>,
    _: &Map<String, Value>,
    value: &Value,
) -> CompilationResult {
    Some(
        ctx.subschema("unevaluatedItems", value)
            .map(|subschema| Box::new(UnevaluatedItemsEvaluator { subschema }) as _),
    )
}
