use serde_json::{Map, Value};

use crate::{
    compiler::ParseContext,
    context::EvaluationContext,
    keywords::{items::PositionalItemsEvaluator, CompilationResult},
    output::ErrorDescription,
    paths::LazyLocation,
    schema::Evaluate,
};

/// `prefixItems` shares the positional semantics of legacy array-form
/// `items`; only the keyword differs.
pub(crate) struct PrefixItemsEvaluator {
    inner: PositionalItemsEvaluator,
}

impl Evaluate for PrefixItemsEvaluator {
    fn evaluate(
        &self,
        ctx: &mut EvaluationContext<'_>,
        instance: &Value,
        location: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        self.inner.evaluate(ctx, instance, location)
    }
}

pub(crate) fn compile(
    ctx: &mut ParseContext<'_, '_>,
    _: &Map<String, Value>,
    value: &Value,
) -> CompilationResult {
    let subschemas = value.as_array()?;
    let mut references = Vec::with_capacity(subschemas.len());
    for (index, subschema) in subschemas.iter().enumerate() {
        match ctx.subschema_item("prefixItems", index, subschema) {
            Ok(reference) => references.push(reference),
            Err(error) => return Some(Err(error)),
        }
    }
    Some(Ok(Box::new(PrefixItemsEvaluator {
        inner: PositionalItemsEvaluator::new(references),
    })))
}
