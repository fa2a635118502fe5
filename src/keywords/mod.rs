pub(crate) mod additional_items;
pub(crate) mod additional_properties;
pub(crate) mod all_of;
pub(crate) mod any_of;
pub(crate) mod boolean;
pub(crate) mod const_;
pub(crate) mod contains;
pub(crate) mod dependencies;
pub(crate) mod enum_;
pub(crate) mod exclusive_maximum;
pub(crate) mod exclusive_minimum;
pub(crate) mod format;
pub(crate) mod helpers;
pub(crate) mod if_;
pub(crate) mod items;
pub(crate) mod max_items;
pub(crate) mod max_length;
pub(crate) mod max_properties;
pub(crate) mod maximum;
pub(crate) mod min_items;
pub(crate) mod min_length;
pub(crate) mod min_properties;
pub(crate) mod minimum;
pub(crate) mod multiple_of;
pub(crate) mod not;
pub(crate) mod one_of;
pub(crate) mod pattern;
pub(crate) mod pattern_properties;
pub(crate) mod prefix_items;
pub(crate) mod properties;
pub(crate) mod property_names;
pub(crate) mod ref_;
pub(crate) mod required;
pub(crate) mod type_;
pub(crate) mod unevaluated_items;
pub(crate) mod unevaluated_properties;
pub(crate) mod unique_items;

use serde_json::{Map, Value};

use crate::{
    compiler::ParseContext,
    context::EvaluationContext,
    output::ErrorDescription,
    paths::LazyLocation,
    schema::{BoxedEvaluator, Evaluate},
    Draft, Error,
};

pub(crate) type CompilationResult = Option<Result<BoxedEvaluator, Error>>;

type CompileFunc = fn(&mut ParseContext<'_, '_>, &Map<String, Value>, &Value) -> CompilationResult;

/// The built-in keyword dispatch table.
pub(crate) fn get_for_draft(draft: Draft, keyword: &str) -> Option<CompileFunc> {
    match (draft, keyword) {
        // Keywords common to both supported drafts
        (_, "$ref") => Some(ref_::compile_ref),
        (_, "type") => Some(type_::compile),
        (_, "enum") => Some(enum_::compile),
        (_, "const") => Some(const_::compile),
        (_, "multipleOf") => Some(multiple_of::compile),
        (_, "maximum") => Some(maximum::compile),
        (_, "exclusiveMaximum") => Some(exclusive_maximum::compile),
        (_, "minimum") => Some(minimum::compile),
        (_, "exclusiveMinimum") => Some(exclusive_minimum::compile),
        (_, "maxLength") => Some(max_length::compile),
        (_, "minLength") => Some(min_length::compile),
        (_, "pattern") => Some(pattern::compile),
        (_, "maxItems") => Some(max_items::compile),
        (_, "minItems") => Some(min_items::compile),
        (_, "uniqueItems") => Some(unique_items::compile),
        (_, "maxProperties") => Some(max_properties::compile),
        (_, "minProperties") => Some(min_properties::compile),
        (_, "required") => Some(required::compile),
        (_, "dependentRequired") => Some(dependencies::compile_dependent_required),
        (_, "dependentSchemas") => Some(dependencies::compile_dependent_schemas),
        (_, "properties") => Some(properties::compile),
        (_, "patternProperties") => Some(pattern_properties::compile),
        (_, "additionalProperties") => Some(additional_properties::compile),
        (_, "propertyNames") => Some(property_names::compile),
        (_, "contains") => Some(contains::compile),
        (_, "allOf") => Some(all_of::compile),
        (_, "anyOf") => Some(any_of::compile),
        (_, "oneOf") => Some(one_of::compile),
        (_, "not") => Some(not::compile),
        (_, "if") => Some(if_::compile),
        (_, "format") => Some(format::compile),
        (_, "unevaluatedItems") => Some(unevaluated_items::compile),
        (_, "unevaluatedProperties") => Some(unevaluated_properties::compile),
        // Draft 2020-12 specific
        (Draft::Draft202012, "$dynamicRef") => Some(ref_::compile_dynamic_ref),
        (Draft::Draft202012, "prefixItems") => Some(prefix_items::compile),
        (Draft::Draft202012, "items") => Some(items::compile),
        // Draft 2019-09 specific
        (Draft::Draft201909, "$recursiveRef") => Some(ref_::compile_recursive_ref),
        (Draft::Draft201909, "items") => Some(items::compile_legacy),
        (Draft::Draft201909, "additionalItems") => Some(additional_items::compile),
        // Unknown or annotation-only keyword
        _ => None,
    }
}

/// Runtime execution order within one schema object. References run first so
/// their annotations are visible, `unevaluated*` last so every other
/// applicator's annotations are.
pub(crate) fn priority(keyword: &str) -> u8 {
    match keyword {
        "$ref" => 0,
        "$dynamicRef" => 1,
        "$recursiveRef" => 2,
        "type" => 3,
        "enum" => 4,
        "const" => 5,
        "properties" => 7,
        "patternProperties" => 8,
        "additionalProperties" => 9,
        "items" | "additionalItems" => 10,
        "prefixItems" => 11,
        "contains" => 12,
        "allOf" => 13,
        "anyOf" => 14,
        "oneOf" => 15,
        "not" => 16,
        "if" => 17,
        "dependentSchemas" => 18,
        "dependentRequired" => 19,
        "unevaluatedItems" => 21,
        "unevaluatedProperties" => 22,
        // Plain assertions and annotation keywords
        _ => 6,
    }
}

/// An unrecognized keyword, preserved as an annotation with its raw value.
pub(crate) struct KeywordAnnotation {
    value: Value,
}

impl KeywordAnnotation {
    pub(crate) fn new(value: Value) -> KeywordAnnotation {
        KeywordAnnotation { value }
    }
}

impl Evaluate for KeywordAnnotation {
    fn evaluate(
        &self,
        _: &mut EvaluationContext<'_>,
        _: &Value,
        _: &LazyLocation,
    ) -> Result<Option<Value>, ErrorDescription> {
        Ok(Some(self.value.clone()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"const": 2}), &json!(5), r#"2 was expected"#)]
    #[test_case(&json!({"enum": [1, 2, 3]}), &json!(4), r#"4 is not one of [1,2,3]"#)]
    #[test_case(&json!({"type": "integer"}), &json!(1.1), r#"1.1 is not of type "integer""#)]
    #[test_case(&json!({"type": ["integer", "string"]}), &json!(null), r#"null is not of types "integer", "string""#)]
    #[test_case(&json!({"maximum": 3}), &json!(3.5), r#"3.5 is greater than the maximum of 3"#)]
    #[test_case(&json!({"minimum": 3}), &json!(2.5), r#"2.5 is less than the minimum of 3"#)]
    #[test_case(&json!({"exclusiveMaximum": 3}), &json!(3.0), r#"3.0 is greater than or equal to the maximum of 3"#)]
    #[test_case(&json!({"exclusiveMinimum": 1}), &json!(1.0), r#"1.0 is less than or equal to the minimum of 1"#)]
    #[test_case(&json!({"maxLength": 2}), &json!("foo"), r#""foo" is longer than 2 characters"#)]
    #[test_case(&json!({"minLength": 2}), &json!("f"), r#""f" is shorter than 2 characters"#)]
    #[test_case(&json!({"maxItems": 2}), &json!([1, 2, 3]), r#"[1,2,3] has more than 2 items"#)]
    #[test_case(&json!({"minItems": 1}), &json!([]), r#"[] has less than 1 item"#)]
    #[test_case(&json!({"multipleOf": 2}), &json!(7), r#"7 is not a multiple of 2"#)]
    #[test_case(&json!({"pattern": "^a*$"}), &json!("abc"), r#""abc" does not match "^a*$""#)]
    #[test_case(&json!({"uniqueItems": true}), &json!([1, 1]), r#"[1,1] has non-unique elements"#)]
    #[test_case(&json!({"required": ["foo"]}), &json!({"bar": 1}), r#""foo" is a required property"#)]
    #[test_case(&json!({"maxProperties": 1}), &json!({"a": 1, "b": 2}), r#"{"a":1,"b":2} has more than 1 property"#)]
    #[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(3), r#"3 is valid under more than one of the schemas listed in the 'oneOf' keyword"#)]
    #[test_case(&json!({"anyOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(1.5), r#"1.5 is not valid under any of the schemas listed in the 'anyOf' keyword"#)]
    fn error_message(schema: &Value, instance: &Value, expected: &str) {
        let result = crate::validate_once(schema, instance).expect("Invalid schema");
        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].value().to_string(), expected);
    }

    #[test_case(&json!({"enum": [0.0]}), &json!(0))]
    #[test_case(&json!({"enum": [[1.0]]}), &json!([1]))]
    #[test_case(&json!({"const": 0.0}), &json!(0))]
    #[test_case(&json!({"const": [{"b": 1.0}]}), &json!([{"b": 1}]))]
    #[test_case(&json!({"type": "number"}), &json!(42))]
    #[test_case(&json!({"type": "integer"}), &json!(2.0))]
    fn numeric_equivalence(schema: &Value, instance: &Value) {
        assert!(crate::is_valid(schema, instance).expect("Invalid schema"));
    }
}
