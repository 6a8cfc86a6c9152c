//! Attribute values stored on [`super::Instance`] nodes.

use std::fmt;

use crate::math::{CFrame, Vector2, Vector3};

/// Closed set of values an attribute can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Bool(bool),
    Number(f64),
    String(String),
    Vector2(Vector2),
    Vector3(Vector3),
    CFrame(CFrame),
}

impl AttributeValue {
    /// Name of the variant, as shown in tooling.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeValue::Bool(_) => "bool",
            AttributeValue::Number(_) => "number",
            AttributeValue::String(_) => "string",
            AttributeValue::Vector2(_) => "Vector2",
            AttributeValue::Vector3(_) => "Vector3",
            AttributeValue::CFrame(_) => "CFrame",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vector2(&self) -> Option<Vector2> {
        match self {
            AttributeValue::Vector2(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vector3(&self) -> Option<Vector3> {
        match self {
            AttributeValue::Vector3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_cframe(&self) -> Option<CFrame> {
        match self {
            AttributeValue::CFrame(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        AttributeValue::Number(value.into())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_owned())
    }
}

impl From<Vector2> for AttributeValue {
    fn from(value: Vector2) -> Self {
        AttributeValue::Vector2(value)
    }
}

impl From<Vector3> for AttributeValue {
    fn from(value: Vector3) -> Self {
        AttributeValue::Vector3(value)
    }
}

impl From<CFrame> for AttributeValue {
    fn from(value: CFrame) -> Self {
        AttributeValue::CFrame(value)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Bool(v) => write!(f, "{v}"),
            AttributeValue::Number(v) => write!(f, "{v}"),
            AttributeValue::String(v) => write!(f, "{v:?}"),
            AttributeValue::Vector2(v) => write!(f, "{v}"),
            AttributeValue::Vector3(v) => write!(f, "{v}"),
            AttributeValue::CFrame(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(AttributeValue::from(3).as_number(), Some(3.0));
        assert_eq!(AttributeValue::from("hp").as_str(), Some("hp"));
        assert_eq!(AttributeValue::from(true).as_number(), None);
        assert_eq!(
            AttributeValue::from(Vector3::one()).type_name(),
            "Vector3"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(AttributeValue::from("a").to_string(), "\"a\"");
        assert_eq!(
            AttributeValue::from(Vector2::new(1.0, 2.0)).to_string(),
            "Vector2(1, 2)"
        );
    }
}
