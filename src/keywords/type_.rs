use std::str::FromStr;

use serde_json::{Map, Value};

use crate::{
    compiler::ParseContext,
    context::EvaluationContext,
    error::SchemaError,
    keywords::CompilationResult,
    output::ErrorDescription,
    paths::LazyLocation,
    primitive_type::{PrimitiveType, PrimitiveTypesBitMap},
    schema::Evaluate,
    Error,
};

pub(crate) struct TypeEvaluator {
    types: PrimitiveTypesBitMap,
}

impl Evaluate for TypeEvaluator {
    fn evaluate(
        &self,
        _: &mut EvaluationContext<'_>,
        instance: &Value,
        _: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        if self.types.matches(instance) {
            Ok(None)
        } else {
            let mut expected = self
                .types
                .iter()
                .map(|ty| format!("\"{ty}\""))
                .collect::<Vec<_>>();
            let message = if expected.len() == 1 {
                format!("{instance} is not of type {}", expected.pop().expect("Non-empty"))
            } else {
                format!("{instance} is not of types {}", expected.join(", "))
            };
            Err(ErrorDescription::from(message))
        }
    }
}

fn invalid_type(ctx: &ParseContext<'_, '_>, value: &Value) -> Error {
    Error::invalid_schema(
        ctx.base_uri().as_str(),
        vec![SchemaError {
            location: ctx.location().join("type"),
            message: format!("{value} is not a valid JSON type"),
        }],
    )
}

pub(crate) fn compile(
    ctx: &mut ParseContext<'_, '_>,
    _: &Map<String, Value>,
    value: &Value,
) -> CompilationResult {
    let mut types = PrimitiveTypesBitMap::new();
    match value {
        Value::String(name) => match PrimitiveType::from_str(name) {
            Ok(ty) => types = types.add_type(ty),
            Err(()) => return Some(Err(invalid_type(ctx, value))),
        },
        Value::Array(names) => {
            if names.is_empty() {
                return Some(Err(invalid_type(ctx, value)));
            }
            for name in names {
                match name.as_str().map(PrimitiveType::from_str) {
                    Some(Ok(ty)) => types = types.add_type(ty),
                    _ => return Some(Err(invalid_type(ctx, value))),
                }
            }
        }
        _ => return Some(Err(invalid_type(ctx, value))),
    }
    Some(Ok(Box::new(TypeEvaluator { types })))
}
