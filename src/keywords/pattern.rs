use fancy_regex::Regex;
use serde_json::{Map, Value};

use crate::{
    compiler::ParseContext,
    context::EvaluationContext,
    error::SchemaError,
    keywords::CompilationResult,
    output::ErrorDescription,
    paths::LazyLocation,
    schema::Evaluate,
    Error,
};

pub(crate) struct PatternEvaluator {
    pattern: Regex,
}

impl Evaluate for PatternEvaluator {
    fn evaluate(
        &self,
        _: &mut EvaluationContext<'_>,
        instance: &Value,
        _: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        if let Value::String(item) = instance {
            // Match failures (catastrophic backtracking) count as no match
            if !self.pattern.is_match(item).unwrap_or(false) {
                return Err(ErrorDescription::from(format!(
                    "{instance} does not match \"{}\"",
                    self.pattern.as_str()
                )));
            }
        }
        Ok(None)
    }
}

pub(crate) fn compile_pattern(
    ctx: &ParseContext<'_, '_>,
    keyword: &str,
    pattern: &str,
) -> Result<Regex, Error> {
    Regex::new(pattern).map_err(|error| {
        Error::invalid_schema(
            ctx.base_uri().as_str(),
            vec![SchemaError {
                location: ctx.location().join(keyword),
                message: format!("\"{pattern}\" is not a valid regular expression: {error}"),
            }],
        )
    })
}

pub(crate) fn compile(
    ctx: &mut ParseContext<'_, '_>,
    _: &Map<String, Value>,
    value: &Value,
) -> CompilationResult {
    let Some(pattern) = value.as_str() else {
        return Some(Err(Error::invalid_schema(
            ctx.base_uri().as_str(),
            vec![SchemaError {
                location: ctx.location().join("pattern"),
                message: format!("{value} is not of type \"string\""),
            }],
        )));
    };
    Some(compile_pattern(ctx, "pattern", pattern).map(|pattern| {
        Box::new(PatternEvaluator { pattern }) as _
    }))
}
