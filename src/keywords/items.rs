use serde_json::{Map, Value};

use crate::{
    compiler::ParseContext,
    context::EvaluationContext,
    keywords::CompilationResult,
    output::ErrorDescription,
    paths::LazyLocation,
    schema::{Evaluate, SchemaRef},
};

/// `items` applied to every element past the `prefixItems` (or legacy
/// array-form `items`) coverage.
pub(crate) struct ItemsEvaluator {
    subschema: SchemaRef,
    skip: usize,
}

impl ItemsEvaluator {
    pub(crate) fn after(subschema: SchemaRef, skip: usize) -> ItemsEvaluator {
        ItemsEvaluator { subschema, skip }
    }
}

impl Evaluate for ItemsEvaluator {
    fn evaluate(
        &self,
        ctx: &mut EvaluationContext<'_>,
        instance: &Value,
        location: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        let Value::Array(items) = instance else {
            return Ok(None);
        };
        let mut invalid = 0usize;
        for (index, item) in items.iter().enumerate().skip(self.skip) {
            let schema = self.subschema.resolve(ctx)?;
            let item_location = location.push(index);
            if !ctx.apply(&schema, item, &item_location) {
                invalid += 1;
            }
        }
        if invalid == 0 {
            // The rest of the array counts as evaluated
            Ok(Some(Value::Bool(true)))
        } else {
            Err(ErrorDescription::from(format!(
                "{invalid} item{} did not match the schema for the remaining items",
                if invalid == 1 { "" } else { "s" }
            )))
        }
    }
}

/// Array-form `items` from Draft 2019-09: positional subschemas.
pub(crate) struct PositionalItemsEvaluator {
    subschemas: Vec<SchemaRef>,
}

impl PositionalItemsEvaluator {
    pub(crate) fn new(subschemas: Vec<SchemaRef>) -> PositionalItemsEvaluator {
        PositionalItemsEvaluator { subschemas }
    }
}

impl Evaluate for PositionalItemsEvaluator {
    fn evaluate(
        &self,
        ctx: &mut EvaluationContext<'_>,
        instance: &Value,
        location: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        let Value::Array(items) = instance else {
            return Ok(None);
        };
        let mut invalid = 0usize;
        let evaluated = items.len().min(self.subschemas.len());
        for (index, (item, subschema)) in items.iter().zip(&self.subschemas).enumerate() {
            let schema = subschema.resolve(ctx)?;
            let item_location = location.push(index);
            if !ctx.apply(&schema, item, &item_location) {
                invalid += 1;
            }
        }
        if invalid > 0 {
            return Err(ErrorDescription::from(format!(
                "{invalid} item{} did not match their positional schemas",
                if invalid == 1 { "" } else { "s" }
            )));
        }
        if evaluated == 0 {
            Ok(None)
        } else if evaluated == items.len() {
            Ok(Some(Value::Bool(true)))
        } else {
            Ok(Some(Value::from(evaluated - 1)))
        }
    }
}

pub(crate) fn compile(
    ctx: &mut ParseContext<'_, '_>,
    parent: &Map<String, Value>,
    value: &Value,
) -> CompilationResult {
    let skip = parent
        .get("prefixItems")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    Some(
        ctx.subschema("items", value)
            .map(|subschema| Box::new(ItemsEvaluator { subschema, skip }) as _),
    )
}

pub(crate) fn compile_legacy(
    ctx: &mut ParseContext<'_, '_>,
    _: &Map<String, Value>,
    value: &Value,
) -> CompilationResult {
    match value {
        Value::Array(subschemas) => {
            let mut references = Vec::with_capacity(subschemas.len());
            for (index, subschema) in subschemas.iter().enumerate() {
                match ctx.subschema_item("items", index, subschema) {
                    Ok(reference) => references.push(reference),
                    Err(error) => return Some(Err(error)),
                }
            }
            Some(Ok(Box::new(PositionalItemsEvaluator::new(references))))
        }
        _ => Some(
            ctx.subschema("items", value)
                .map(|subschema| Box::new(ItemsEvaluator { subschema, skip: 0 }) as _),
        ),
    }
}
