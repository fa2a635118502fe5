use fraction::{BigFraction, BigUint};
use serde_json::{Map, Value};

use crate::{
    compiler::ParseContext,
    context::EvaluationContext,
    keywords::{minimum::number_limit, CompilationResult},
    output::ErrorDescription,
    paths::LazyLocation,
    schema::Evaluate,
};

pub(crate) struct MultipleOfEvaluator {
    factor: f64,
    /// Integral factors short-circuit on fractional instances.
    integral: bool,
}

impl MultipleOfEvaluator {
    fn is_multiple(&self, item: f64) -> bool {
        if self.integral {
            return item.fract() == 0. && (item % self.factor) == 0.;
        }
        let quotient = item / self.factor;
        let remainder = quotient.rem_euclid(1.);
        if remainder.is_nan() {
            // Exact arithmetic; involves heap allocations via `BigUint`
            let fraction = BigFraction::from(item) / BigFraction::from(self.factor);
            match fraction.denom() {
                Some(denom) => denom == &BigUint::from(1_u8),
                None => true,
            }
        } else {
            // Rounding error can land on either side of a whole quotient,
            // and grows with the quotient's magnitude (19.99 / 0.01 is one
            // ULP short of 1999)
            let tolerance = f64::EPSILON * quotient.abs().max(1.);
            remainder < tolerance || (1. - remainder) < tolerance
        }
    }
}

impl Evaluate for MultipleOfEvaluator {
    fn evaluate(
        &self,
        _: &mut EvaluationContext<'_>,
        instance: &Value,
        _: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        if let Value::Number(item) = instance {
            let item = item.as_f64().expect("Always valid");
            if !self.is_multiple(item) {
                return Err(ErrorDescription::from(format!(
                    "{instance} is not a multiple of {}",
                    self.factor
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
    Some(number_limit(ctx, "multipleOf", value).map(|factor| {
        let factor = factor.as_f64().expect("Always valid");
        Box::new(MultipleOfEvaluator {
            factor,
            integral: factor.fract() == 0.,
        }) as _
    }))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"multipleOf": 2}), &json!(4), true)]
    #[test_case(&json!({"multipleOf": 2}), &json!(7), false)]
    #[test_case(&json!({"multipleOf": 2}), &json!(3.5), false)]
    #[test_case(&json!({"multipleOf": 2.5}), &json!(7.5), true)]
    #[test_case(&json!({"multipleOf": 0.0001}), &json!(0.0075), true)]
    #[test_case(&json!({"multipleOf": 0.01}), &json!(19.99), true)]
    #[test_case(&json!({"multipleOf": 2}), &json!("not a number"), true)]
    fn divisibility(schema: &Value, instance: &Value, expected: bool) {
        assert_eq!(
            crate::is_valid(schema, instance).expect("Invalid schema"),
            expected
        );
    }
}
