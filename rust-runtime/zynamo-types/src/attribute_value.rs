/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::Blob;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A map of attribute names to attribute values: the wire form of an item.
pub type AttributeMap = HashMap<String, AttributeValue>;

/// A single DynamoDB attribute value, serialized as DynamoDB JSON.
///
/// ```rust
/// use zynamo_types::AttributeValue;
///
/// let av: AttributeValue = serde_json::from_str(r#"{"S":"hello"}"#).unwrap();
/// assert_eq!(av, AttributeValue::S("hello".into()));
/// ```
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// A string.
    S(String),
    /// A number, carried as its decimal string.
    N(String),
    /// Binary data.
    B(Blob),
    /// A boolean.
    #[serde(rename = "BOOL")]
    Bool(bool),
    /// Null. DynamoDB always sends `true`.
    #[serde(rename = "NULL")]
    Null(bool),
    /// An ordered list of attribute values.
    L(Vec<AttributeValue>),
    /// A nested map of attribute values.
    M(AttributeMap),
    /// A string set.
    #[serde(rename = "SS")]
    Ss(Vec<String>),
    /// A number set.
    #[serde(rename = "NS")]
    Ns(Vec<String>),
    /// A binary set.
    #[serde(rename = "BS")]
    Bs(Vec<Blob>),
}

impl AttributeValue {
    /// Returns the string if this is an `S` value.
    pub fn as_s(&self) -> Option<&str> {
        match self {
            AttributeValue::S(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the decimal string if this is an `N` value.
    pub fn as_n(&self) -> Option<&str> {
        match self {
            AttributeValue::N(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the boolean if this is a `BOOL` value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the members if this is an `L` value.
    pub fn as_l(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::L(l) => Some(l),
            _ => None,
        }
    }

    /// Returns the nested map if this is an `M` value.
    pub fn as_m(&self) -> Option<&AttributeMap> {
        match self {
            AttributeValue::M(m) => Some(m),
            _ => None,
        }
    }

    /// True if this is a `NULL` value.
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null(_))
    }

    /// The DynamoDB type descriptor of this value (`S`, `N`, `BOOL`, ...).
    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeValue::S(_) => "S",
            AttributeValue::N(_) => "N",
            AttributeValue::B(_) => "B",
            AttributeValue::Bool(_) => "BOOL",
            AttributeValue::Null(_) => "NULL",
            AttributeValue::L(_) => "L",
            AttributeValue::M(_) => "M",
            AttributeValue::Ss(_) => "SS",
            AttributeValue::Ns(_) => "NS",
            AttributeValue::Bs(_) => "BS",
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn serializes_as_dynamodb_json() {
        let mut m = AttributeMap::new();
        m.insert("flag".to_string(), AttributeValue::Bool(true));
        let value = AttributeValue::L(vec![
            AttributeValue::S("a".into()),
            AttributeValue::N("1".into()),
            AttributeValue::Null(true),
            AttributeValue::M(m),
            AttributeValue::B(Blob::new("AWS")),
            AttributeValue::Ns(vec!["1".into(), "2".into()]),
        ]);
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            serde_json::json!({"L": [
                {"S": "a"},
                {"N": "1"},
                {"NULL": true},
                {"M": {"flag": {"BOOL": true}}},
                {"B": "QVdT"},
                {"NS": ["1", "2"]}
            ]})
        );
    }

    #[test]
    fn parses_wire_sets() {
        let av: AttributeValue =
            serde_json::from_str(r#"{"SS":["x","y"]}"#).expect("valid attribute value");
        assert_eq!(av, AttributeValue::Ss(vec!["x".into(), "y".into()]));
        assert_eq!(av.type_name(), "SS");
        assert!(av.as_s().is_none());
    }
}
