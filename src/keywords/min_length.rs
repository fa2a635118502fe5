use serde_json::{Map, Value};

use crate::{
    compiler::ParseContext,
    context::EvaluationContext,
    keywords::{helpers, CompilationResult},
    output::ErrorDescription,
    paths::LazyLocation,
    schema::Evaluate,
};

pub(crate) struct MinLengthEvaluator {
    limit: u64,
}

impl Evaluate for MinLengthEvaluator {
    fn evaluate(
        &self,
        _: &mut EvaluationContext<'_>,
        instance: &Value,
        _: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        if let Value::String(item) = instance {
            if (item.chars().count() as u64) < self.limit {
                return Err(ErrorDescription::from(format!(
                    "{instance} is shorter than {} character{}",
                    self.limit,
                    if self.limit == 1 { "" } else { "s" }
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
        helpers::count_limit(ctx, "minLength", value)
            .map(|limit| Box::new(MinLengthEvaluator { limit }) as _),
    )
}
