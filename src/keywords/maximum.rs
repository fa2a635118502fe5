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

pub(crate) struct MaximumEvaluator {
    limit: Number,
}

impl Evaluate for MaximumEvaluator {
    fn evaluate(
        &self,
        _: &mut EvaluationContext<'_>,
        instance: &Value,
        _: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        if let Value::Number(item) = instance {
            if helpers::compare_numbers(item, &self.limit) == Some(Ordering::Greater) {
                return Err(ErrorDescription::from(format!(
                    "{instance} is greater than the maximum of {}",
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
    Some(number_limit(ctx, "maximum", value).map(|limit| Box::new(MaximumEvaluator { limit }) as _))
}
