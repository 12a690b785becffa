//! Native decoding of attribute values.
//!
//! Every comparison in the engine (key matching, conditions, statements) acts
//! on a [`DecodedValue`] rather than on the wire representation, so `{"N":"5"}`
//! and `{"N":"5.0"}` compare equal.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::attribute_value::AttributeValue;

/// Closed native view of an [`AttributeValue`].
#[derive(Debug, Clone)]
pub enum DecodedValue<'a> {
    /// The `NULL` variant.
    Null,
    /// A boolean.
    Bool(bool),
    /// A number that parses losslessly as `i64`.
    Int(i64),
    /// Any other number.
    Float(f64),
    /// A string.
    Str(&'a str),
    /// A list, decoded element-wise.
    List(Vec<DecodedValue<'a>>),
    /// A map, decoded value-wise.
    Map(HashMap<&'a str, DecodedValue<'a>>),
}

impl<'a> DecodedValue<'a> {
    /// Decode an attribute value. Never fails.
    #[must_use]
    pub fn from_attribute_value(value: &'a AttributeValue) -> Self {
        match value {
            AttributeValue::Null => Self::Null,
            AttributeValue::Bool(b) => Self::Bool(*b),
            AttributeValue::N(n) => decode_number(n),
            AttributeValue::S(s) => Self::Str(s),
            AttributeValue::L(list) => {
                Self::List(list.iter().map(Self::from_attribute_value).collect())
            }
            AttributeValue::M(map) => Self::Map(
                map.iter()
                    .map(|(k, v)| (k.as_str(), Self::from_attribute_value(v)))
                    .collect(),
            ),
        }
    }

    /// Order two decoded values.
    ///
    /// Only numbers (against numbers), strings (ordinal) and booleans order.
    /// Everything else, including any `NaN`, yields `None`. An `Int` against a
    /// `Float` is compared exactly, never by widening the integer to `f64`.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Float(b)) => compare_int_float(*a, *b),
            (Self::Float(a), Self::Int(b)) => compare_int_float(*b, *a).map(Ordering::reverse),
            (Self::Str(a), Self::Str(b)) => Some(a.cmp(b)),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Re-encode into an [`AttributeValue`].
    ///
    /// Decoding the result yields a value equal to `self`. Numbers are
    /// respelled in canonical form, so `{"N":"5.0"}` comes back as
    /// `{"N":"5"}`.
    #[must_use]
    pub fn to_attribute_value(&self) -> AttributeValue {
        match self {
            Self::Null => AttributeValue::Null,
            Self::Bool(b) => AttributeValue::Bool(*b),
            Self::Int(i) => AttributeValue::N(i.to_string()),
            Self::Float(f) => AttributeValue::N(f.to_string()),
            Self::Str(s) => AttributeValue::S((*s).to_owned()),
            Self::List(list) => {
                AttributeValue::L(list.iter().map(Self::to_attribute_value).collect())
            }
            Self::Map(map) => AttributeValue::M(
                map.iter()
                    .map(|(k, v)| ((*k).to_owned(), v.to_attribute_value()))
                    .collect(),
            ),
        }
    }
}

impl From<&DecodedValue<'_>> for AttributeValue {
    fn from(value: &DecodedValue<'_>) -> Self {
        value.to_attribute_value()
    }
}

/// 2^63, the first float above every `i64`.
const I64_UPPER_BOUND: f64 = 9_223_372_036_854_775_808.0;

#[allow(clippy::cast_possible_truncation)]
fn compare_int_float(i: i64, f: f64) -> Option<Ordering> {
    if f.is_nan() {
        return None;
    }
    if f >= I64_UPPER_BOUND {
        return Some(Ordering::Less);
    }
    // -2^63 is itself an i64, so only strictly smaller floats are out of range.
    if f < -I64_UPPER_BOUND {
        return Some(Ordering::Greater);
    }
    let whole = f.trunc();
    // In range and integral, so the cast is exact.
    match i.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(f - whole)),
        unequal => Some(unequal),
    }
}

fn decode_number(n: &str) -> DecodedValue<'_> {
    if let Ok(i) = n.parse::<i64>() {
        return DecodedValue::Int(i);
    }
    DecodedValue::Float(n.parse::<f64>().unwrap_or(f64::NAN))
}

impl PartialEq for DecodedValue<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (a @ (Self::Int(_) | Self::Float(_)), b @ (Self::Int(_) | Self::Float(_))) => {
                a.compare(b) == Some(Ordering::Equal)
            }
            _ => false,
        }
    }
}
