//! Property identifiers and values for the generic get/set/default protocol.

use serde::{Deserialize, Serialize};

use crate::error::{DynamicError, Result};
use crate::model::Point;

/// Properties known across the score. Each element type supports a subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyId {
    // dynamics
    DynamicRange,
    Velocity,
    Subtype,
    // styled text
    Text,
    TextStyle,
    UserOff,
    Visible,
    // other elements
    Pitch,
    StemDirection,
    LineWidth,
}

/// Scope a dynamic applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DynamicRange {
    Staff = 0,
    #[default]
    Part = 1,
    System = 2,
}

impl DynamicRange {
    /// Integer form used in persisted files. Unknown values map to `Part`.
    pub fn from_int(v: i32) -> DynamicRange {
        Self::try_from_int(v).unwrap_or_default()
    }

    /// Strict form of [`from_int`](Self::from_int): None outside 0..=2.
    pub fn try_from_int(v: i32) -> Option<DynamicRange> {
        match v {
            0 => Some(DynamicRange::Staff),
            1 => Some(DynamicRange::Part),
            2 => Some(DynamicRange::System),
            _ => None,
        }
    }
}

/// Named text styles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextStyleType {
    #[default]
    Default,
    Title,
    Staff,
    Tempo,
    Dynamics,
}

impl TextStyleType {
    pub fn name(&self) -> &'static str {
        match self {
            TextStyleType::Default => "Default",
            TextStyleType::Title => "Title",
            TextStyleType::Staff => "Staff",
            TextStyleType::Tempo => "Tempo",
            TextStyleType::Dynamics => "Dynamics",
        }
    }

    pub fn from_name(name: &str) -> Option<TextStyleType> {
        match name {
            "Default" => Some(TextStyleType::Default),
            "Title" => Some(TextStyleType::Title),
            "Staff" => Some(TextStyleType::Staff),
            "Tempo" => Some(TextStyleType::Tempo),
            "Dynamics" => Some(TextStyleType::Dynamics),
            _ => None,
        }
    }
}

/// Value carried through the property protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Int(i32),
    Range(DynamicRange),
    Style(TextStyleType),
    Text(String),
    Point(Point),
    Bool(bool),
}

impl PropertyValue {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            PropertyValue::Int(_) => "integer",
            PropertyValue::Range(_) => "range",
            PropertyValue::Style(_) => "style",
            PropertyValue::Text(_) => "text",
            PropertyValue::Point(_) => "point",
            PropertyValue::Bool(_) => "bool",
        }
    }

    /// Integer view of integer-like values.
    pub fn to_int(&self, id: PropertyId) -> Result<i32> {
        match self {
            PropertyValue::Int(v) => Ok(*v),
            PropertyValue::Range(r) => Ok(*r as i32),
            PropertyValue::Bool(b) => Ok(i32::from(*b)),
            _ => Err(self.mismatch(id)),
        }
    }

    pub fn to_bool(&self, id: PropertyId) -> Result<bool> {
        match self {
            PropertyValue::Bool(b) => Ok(*b),
            PropertyValue::Int(v) => Ok(*v != 0),
            _ => Err(self.mismatch(id)),
        }
    }

    pub fn to_range(&self, id: PropertyId) -> Result<DynamicRange> {
        match self {
            PropertyValue::Range(r) => Ok(*r),
            PropertyValue::Int(v) => Ok(DynamicRange::from_int(*v)),
            _ => Err(self.mismatch(id)),
        }
    }

    fn mismatch(&self, id: PropertyId) -> DynamicError {
        DynamicError::TypeMismatch { id, found: self.kind() }
    }
}
