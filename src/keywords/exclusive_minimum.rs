use std::cmp::Ordering;

use serde_json::{Map, Number, Value};

use crate::{
    compiler::ParseContext,
    context::EvaluationContext,
    keywords::{helpers, minimum::number_limit, CompilationResult},
    output::ErrorDescription,
    paths::LazyLocation,
    schema::Evaluate,
};

pub(crate) struct ExclusiveMinimumEvaluator {
    limit: Number,
}

impl Evaluate for ExclusiveMinimumEvaluator {
    fn evaluate(
        &self,
        _: &mut EvaluationContext<'_>,
        instance: &Value,
        _: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        if let Value::Number(item) = instance {
            if !matches!(
                helpers::compare_numbers(item, &self.limit),
                Some(Ordering::Greater)
            ) {
                return Err(ErrorDescription::from(format!(
                    "{instance} is less than or equal to the minimum of {}",
                    self.limit
                )));
            }
        }
        Ok(None)
    }
}

pub(crate) fn compile(
    ctx: &mut ParseContext<'_, '_>,
    _: &Map<String, Value>,
    value: &Value,
) -> CompilationResult {
    Some(
        number_limit(ctx, "exclusiveMinimum", value)
            .map(|limit| Box::new(ExclusiveMinimumEvaluator { limit }) as _),
    )
}
