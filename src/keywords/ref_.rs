use serde_json::{Map, Value};

use crate::{
    compiler::ParseContext,
    context::EvaluationContext,
    error::SchemaError,
    keywords::CompilationResult,
    output::ErrorDescription,
    paths::LazyLocation,
    schema::{Evaluate, SchemaRef},
    uri::{CompoundUri, Fragment},
    Error,
};

/// `$ref`: evaluate the instance against the schema the reference points to.
pub(crate) struct RefEvaluator {
    target: SchemaRef,
}

impl Evaluate for RefEvaluator {
    fn evaluate(
        &self,
        ctx: &mut EvaluationContext<'_>,
        instance: &Value,
        location: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        let schema = self.target.resolve(ctx)?;
        if ctx.apply_reference(&schema, instance, location)? {
            Ok(None)
        } else {
            Err(ErrorDescription::from(format!(
                "Referenced schema '{}' does not match",
                self.target
            )))
        }
    }
}

/// `$dynamicRef`: like `$ref`, unless the lexical target is a
/// `$dynamicAnchor` of the same name, in which case the outermost schema in
/// the dynamic scope declaring that anchor wins.
pub(crate) struct DynamicRefEvaluator {
    target: SchemaRef,
    anchor: Option<String>,
}

impl Evaluate for DynamicRefEvaluator {
    fn evaluate(
        &self,
        ctx: &mut EvaluationContext<'_>,
        instance: &Value,
        location: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        if let Some(name) = &self.anchor {
            // Bookending: the walk only happens when the lexically resolved
            // target is itself a dynamic anchor of that name
            if ctx.has_dynamic(&self.target.uri().base, name) {
                if let Some(schema) = ctx.dynamic_target(name) {
                    return if ctx.apply_reference(&schema, instance, location)? {
                        Ok(None)
                    } else {
                        Err(ErrorDescription::from(format!(
                            "Dynamically referenced schema '#{name}' does not match"
                        )))
                    };
                }
            }
        }
        let schema = self.target.resolve(ctx)?;
        if ctx.apply_reference(&schema, instance, location)? {
            Ok(None)
        } else {
            Err(ErrorDescription::from(format!(
                "Referenced schema '{}' does not match",
                self.target
            )))
        }
    }
}

/// `$recursiveRef` (Draft 2019-09): `#`, redirected to the outermost
/// `$recursiveAnchor: true` resource in the dynamic scope when the current
/// resource root is one.
pub(crate) struct RecursiveRefEvaluator {
    target: SchemaRef,
}

impl Evaluate for RecursiveRefEvaluator {
    fn evaluate(
        &self,
        ctx: &mut EvaluationContext<'_>,
        instance: &Value,
        location: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        if ctx.has_dynamic(&self.target.uri().base, "") {
            if let Some(schema) = ctx.dynamic_target("") {
                return if ctx.apply_reference(&schema, instance, location)? {
                    Ok(None)
                } else {
                    Err(ErrorDescription::from(
                        "Recursively referenced schema does not match",
                    ))
                };
            }
        }
        let schema = self.target.resolve(ctx)?;
        if ctx.apply_reference(&schema, instance, location)? {
            Ok(None)
        } else {
            Err(ErrorDescription::from(
                "Recursively referenced schema does not match",
            ))
        }
    }
}

fn invalid_reference(ctx: &ParseContext<'_, '_>, keyword: &str, value: &Value) -> Error {
    Error::invalid_schema(
        ctx.base_uri().as_str(),
        vec![SchemaError {
            location: ctx.location().join(keyword),
            message: format!("{value} is not of type \"string\""),
        }],
    )
}

pub(crate) fn compile_ref(
    ctx: &mut ParseContext<'_, '_>,
    _: &Map<String, Value>,
    value: &Value,
) -> CompilationResult {
    let Some(reference) = value.as_str() else {
        return Some(Err(invalid_reference(ctx, "$ref", value)));
    };
    Some(
        ctx.resolve_reference(reference)
            .map(|target| Box::new(RefEvaluator { target: SchemaRef::new(target) }) as _),
    )
}

pub(crate) fn compile_dynamic_ref(
    ctx: &mut ParseContext<'_, '_>,
    _: &Map<String, Value>,
    value: &Value,
) -> CompilationResult {
    let Some(reference) = value.as_str() else {
        return Some(Err(invalid_reference(ctx, "$dynamicRef", value)));
    };
    Some(ctx.resolve_reference(reference).map(|target| {
        let anchor = match &target.fragment {
            Fragment::Anchor(name) => Some(name.clone()),
            Fragment::Pointer(_) => None,
        };
        Box::new(DynamicRefEvaluator {
            target: SchemaRef::new(target),
            anchor,
        }) as _
    }))
}

pub(crate) fn compile_recursive_ref(
    ctx: &mut ParseContext<'_, '_>,
    _: &Map<String, Value>,
    value: &Value,
) -> CompilationResult {
    if value.as_str() != Some("#") {
        return Some(Err(invalid_reference(ctx, "$recursiveRef", value)));
    }
    let target = CompoundUri::new(ctx.base_uri().clone(), Fragment::pointer(""));
    Some(Ok(Box::new(RecursiveRefEvaluator {
        target: SchemaRef::new(target),
    })))
}
