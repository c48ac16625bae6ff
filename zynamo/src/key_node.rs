/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Key nodes name the top-level fields of a request or response that hold
//! items, and the adapter converts exactly those fields between their
//! structured and wire forms.

use serde_json::{Map, Value};
use thiserror::Error;
use zynamo_types::marshall::{self, MarshallError, UnmarshallError};
use zynamo_types::{AttributeMap, MarshallOptions, UnmarshallOptions};

/// How the value of a key node's field is laid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyNodeChildren {
    /// The field is a list and every member is an item.
    AllMembers,
}

/// A field holding an item, or a list of items.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyNode {
    /// The field name, such as `Key` or `Items`.
    pub key: &'static str,
    /// `None` if the field is a single item.
    pub children: Option<KeyNodeChildren>,
}

impl KeyNode {
    /// A field holding one item.
    pub const fn new(key: &'static str) -> Self {
        Self {
            key,
            children: None,
        }
    }

    /// A field holding a list of items.
    pub const fn all_members(key: &'static str) -> Self {
        Self {
            key,
            children: Some(KeyNodeChildren::AllMembers),
        }
    }
}

/// Failure to convert a payload between its structured and wire forms.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TranslateError {
    /// The payload is not a JSON object.
    #[error("expected the payload to be an object, found {kind}")]
    NotAnObject {
        /// What was found instead.
        kind: &'static str,
    },
    /// A key node field has the wrong layout.
    #[error("`{field}` must be {expected}")]
    UnexpectedLayout {
        /// The field.
        field: &'static str,
        /// The layout the key node declares.
        expected: &'static str,
    },
    /// A key node field could not be marshalled.
    #[error("failed to marshall `{field}`")]
    Marshall {
        /// The field.
        field: &'static str,
        /// The codec error.
        #[source]
        source: MarshallError,
    },
    /// A key node field could not be unmarshalled.
    #[error("failed to unmarshall `{field}`")]
    Unmarshall {
        /// The field.
        field: &'static str,
        /// The codec error.
        #[source]
        source: UnmarshallError,
    },
    /// The payload could not be converted to or from its typed form.
    #[error("failed to convert the payload")]
    Serde(#[from] serde_json::Error),
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

/// Apply `convert` to the value of every present key node field of `raw`.
///
/// Absent and `null` fields are left alone. Other fields are copied unchanged.
fn translate(
    raw: &Value,
    key_nodes: &[KeyNode],
    mut convert: impl FnMut(&'static str, &Value) -> Result<Value, TranslateError>,
) -> Result<Value, TranslateError> {
    let fields = raw
        .as_object()
        .ok_or(TranslateError::NotAnObject { kind: kind_of(raw) })?;
    let mut translated: Map<String, Value> = fields.clone();
    for node in key_nodes {
        let value = match fields.get(node.key) {
            None | Some(Value::Null) => continue,
            Some(value) => value,
        };
        let converted = match node.children {
            None => convert(node.key, value)?,
            Some(KeyNodeChildren::AllMembers) => {
                let members = value.as_array().ok_or(TranslateError::UnexpectedLayout {
                    field: node.key,
                    expected: "a list",
                })?;
                Value::Array(
                    members
                        .iter()
                        .map(|member| convert(node.key, member))
                        .collect::<Result<_, _>>()?,
                )
            }
        };
        translated.insert(node.key.to_string(), converted);
    }
    Ok(Value::Object(translated))
}

/// Marshall the key node fields of a structured payload into attribute maps.
pub fn marshall_input(
    raw: &Value,
    key_nodes: &[KeyNode],
    options: &MarshallOptions,
) -> Result<Value, TranslateError> {
    translate(raw, key_nodes, |field, value| {
        let map = marshall::marshall_value(value, options)
            .map_err(|source| TranslateError::Marshall { field, source })?;
        Ok(serde_json::to_value(map)?)
    })
}

/// Unmarshall the key node fields of a wire payload into structured items.
pub fn unmarshall_output(
    raw: &Value,
    key_nodes: &[KeyNode],
    options: &UnmarshallOptions,
) -> Result<Value, TranslateError> {
    translate(raw, key_nodes, |field, value| {
        let map: AttributeMap =
            serde_json::from_value(value.clone()).map_err(|_| TranslateError::UnexpectedLayout {
                field,
                expected: "an attribute map",
            })?;
        let item = marshall::unmarshall(&map, options)
            .map_err(|source| TranslateError::Unmarshall { field, source })?;
        Ok(Value::Object(item))
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const GET_INPUT: &[KeyNode] = &[KeyNode::new("Key")];
    const QUERY_OUTPUT: &[KeyNode] = &[
        KeyNode::all_members("Items"),
        KeyNode::new("LastEvaluatedKey"),
    ];

    #[test]
    fn only_key_node_fields_are_converted() {
        let raw = json!({
            "TableName": "users",
            "Key": {"id": "u-1", "n": 3},
            "ConsistentRead": true
        });
        let marshalled = marshall_input(&raw, GET_INPUT, &MarshallOptions::default()).unwrap();
        assert_eq!(
            marshalled,
            json!({
                "TableName": "users",
                "Key": {"id": {"S": "u-1"}, "n": {"N": "3"}},
                "ConsistentRead": true
            })
        );
        // the original is untouched
        assert_eq!(raw["Key"]["id"], json!("u-1"));
    }

    #[test]
    fn absent_fields_are_skipped() {
        let raw = json!({"TableName": "users", "Key": null});
        let marshalled = marshall_input(&raw, GET_INPUT, &MarshallOptions::default()).unwrap();
        assert_eq!(marshalled, raw);

        let output = json!({"Count": 0});
        assert_eq!(
            unmarshall_output(&output, QUERY_OUTPUT, &UnmarshallOptions::default()).unwrap(),
            output
        );
    }

    #[test]
    fn all_members_converts_every_item() {
        let wire = json!({
            "Items": [{"id": {"S": "a"}}, {"id": {"S": "b"}, "n": {"N": "1.5"}}],
            "LastEvaluatedKey": {"id": {"S": "b"}},
            "Count": 2
        });
        let structured = unmarshall_output(&wire, QUERY_OUTPUT, &UnmarshallOptions::default()).unwrap();
        assert_eq!(
            structured,
            json!({
                "Items": [{"id": "a"}, {"id": "b", "n": 1.5}],
                "LastEvaluatedKey": {"id": "b"},
                "Count": 2
            })
        );
    }

    #[test]
    fn layout_errors() {
        let err = marshall_input(&json!([1]), GET_INPUT, &MarshallOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "expected the payload to be an object, found list");

        let err = marshall_input(&json!({"Key": "u-1"}), GET_INPUT, &MarshallOptions::default())
            .unwrap_err();
        assert!(matches!(err, TranslateError::Marshall { field: "Key", .. }), "{:?}", err);

        let err = unmarshall_output(&json!({"Items": {}}), QUERY_OUTPUT, &UnmarshallOptions::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "`Items` must be a list");
    }
}

#[cfg(test)]
mod roundtrip {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{json, Value};

    const ITEM: &[KeyNode] = &[KeyNode::new("Item")];

    fn native() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[a-z0-9 ]{1,12}".prop_map(Value::from),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn marshall_then_unmarshall_is_identity(
            item in prop::collection::btree_map("[a-z]{1,6}", native(), 0..6)
        ) {
            let item: serde_json::Map<String, Value> = item.into_iter().collect();
            let payload = json!({"TableName": "t", "Item": item});
            let wire = marshall_input(&payload, ITEM, &MarshallOptions::default()).unwrap();
            let back = unmarshall_output(&wire, ITEM, &UnmarshallOptions::default()).unwrap();
            prop_assert_eq!(back, payload);
        }
    }
}
