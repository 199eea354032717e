use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Type;

/// Payload of a number literal. The variant fixes the literal's natural
/// primitive type; the accessors convert the way a numeric cast does.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Number {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl Number {
    pub fn natural_type(&self) -> Type {
        match self {
            Number::Int(_) => Type::int(),
            Number::Long(_) => Type::long(),
            Number::Float(_) => Type::float(),
            Number::Double(_) => Type::double(),
        }
    }

    pub fn as_i32(self) -> i32 {
        match self {
            Number::Int(value) => value,
            Number::Long(value) => value as i32,
            Number::Float(value) => value as i32,
            Number::Double(value) => value as i32,
        }
    }

    pub fn as_i64(self) -> i64 {
        match self {
            Number::Int(value) => i64::from(value),
            Number::Long(value) => value,
            Number::Float(value) => value as i64,
            Number::Double(value) => value as i64,
        }
    }

    pub fn as_f32(self) -> f32 {
        match self {
            Number::Int(value) => value as f32,
            Number::Long(value) => value as f32,
            Number::Float(value) => value,
            Number::Double(value) => value as f32,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(value) => f64::from(value),
            Number::Long(value) => value as f64,
            Number::Float(value) => f64::from(value),
            Number::Double(value) => value,
        }
    }

    /// Negation in the same width; integer negation wraps.
    pub fn negated(self) -> Number {
        match self {
            Number::Int(value) => Number::Int(value.wrapping_neg()),
            Number::Long(value) => Number::Long(value.wrapping_neg()),
            Number::Float(value) => Number::Float(-value),
            Number::Double(value) => Number::Double(-value),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(value) => write!(f, "{value}"),
            Number::Long(value) => write!(f, "{value}L"),
            Number::Float(value) => write!(f, "{value}f"),
            Number::Double(value) => write!(f, "{value}d"),
        }
    }
}

/// A compile-time known value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Boolean(bool),
    String(String),
    Number(Number),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::String(value) => write!(f, "{value:?}"),
            Value::Number(value) => write!(f, "{value}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrowing_accessors_truncate_like_casts() {
        assert_eq!(Number::Long(i64::from(i32::MAX) + 1).as_i32(), i32::MIN);
        assert_eq!(Number::Double(2.9).as_i32(), 2);
        assert_eq!(Number::Double(f64::NAN).as_i64(), 0);
    }

    #[test]
    fn negation_keeps_the_width() {
        assert_eq!(Number::Int(i32::MIN).negated(), Number::Int(i32::MIN));
        assert_eq!(Number::Long(3).negated(), Number::Long(-3));
        assert_eq!(Number::Float(1.5).negated(), Number::Float(-1.5));
    }
}
