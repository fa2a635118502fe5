use core::fmt;
use std::str::FromStr;

use serde_json::Value;

/// JSON instance types as the `type` keyword sees them.
///
/// `Integer` holds for every number whose mathematical value is integral, so
/// `1.0` is an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PrimitiveType {
    Array,
    Boolean,
    Integer,
    Null,
    Number,
    Object,
    String,
}

impl PrimitiveType {
    pub(crate) fn of(instance: &Value) -> PrimitiveType {
        match instance {
            Value::Null => PrimitiveType::Null,
            Value::Bool(_) => PrimitiveType::Boolean,
            Value::Number(number) => {
                if is_integer(number) {
                    PrimitiveType::Integer
                } else {
                    PrimitiveType::Number
                }
            }
            Value::String(_) => PrimitiveType::String,
            Value::Array(_) => PrimitiveType::Array,
            Value::Object(_) => PrimitiveType::Object,
        }
    }

    const fn to_index(self) -> u8 {
        match self {
            PrimitiveType::Array => 0,
            PrimitiveType::Boolean => 1,
            PrimitiveType::Integer => 2,
            PrimitiveType::Null => 3,
            PrimitiveType::Number => 4,
            PrimitiveType::Object => 5,
            PrimitiveType::String => 6,
        }
    }
}

pub(crate) fn is_integer(number: &serde_json::Number) -> bool {
    number.is_u64() || number.is_i64() || number.as_f64().expect("Always valid").fract() == 0.
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveType::Array => f.write_str("array"),
            PrimitiveType::Boolean => f.write_str("boolean"),
            PrimitiveType::Integer => f.write_str("integer"),
            PrimitiveType::Null => f.write_str("null"),
            PrimitiveType::Number => f.write_str("number"),
            PrimitiveType::Object => f.write_str("object"),
            PrimitiveType::String => f.write_str("string"),
        }
    }
}

impl FromStr for PrimitiveType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "array" => Ok(PrimitiveType::Array),
            "boolean" => Ok(PrimitiveType::Boolean),
            "integer" => Ok(PrimitiveType::Integer),
            "null" => Ok(PrimitiveType::Null),
            "number" => Ok(PrimitiveType::Number),
            "object" => Ok(PrimitiveType::Object),
            "string" => Ok(PrimitiveType::String),
            _ => Err(()),
        }
    }
}

/// A set of primitive types stored as a bitmap.
///
/// `Number` implies `Integer` membership checks, since every integer is a
/// number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PrimitiveTypesBitMap(u8);

impl PrimitiveTypesBitMap {
    pub(crate) const fn new() -> Self {
        PrimitiveTypesBitMap(0)
    }

    #[must_use]
    pub(crate) const fn add_type(self, ty: PrimitiveType) -> Self {
        PrimitiveTypesBitMap(self.0 | (1 << ty.to_index()))
    }

    pub(crate) const fn contains_type(self, ty: PrimitiveType) -> bool {
        self.0 & (1 << ty.to_index()) != 0
    }

    pub(crate) fn matches(self, instance: &Value) -> bool {
        let ty = PrimitiveType::of(instance);
        if self.contains_type(ty) {
            return true;
        }
        // Integral numbers satisfy `number` as well
        ty == PrimitiveType::Integer && self.contains_type(PrimitiveType::Number)
    }

    pub(crate) fn iter(self) -> impl Iterator<Item = PrimitiveType> {
        [
            PrimitiveType::Array,
            PrimitiveType::Boolean,
            PrimitiveType::Integer,
            PrimitiveType::Null,
            PrimitiveType::Number,
            PrimitiveType::Object,
            PrimitiveType::String,
        ]
        .into_iter()
        .filter(move |ty| self.contains_type(*ty))
    }
}
