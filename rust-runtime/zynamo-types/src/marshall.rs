/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Conversion between structured values and DynamoDB attribute values.
//!
//! [`marshall`] turns a structured [`Item`] into an [`AttributeMap`], [`unmarshall`]
//! does the reverse. [`convert_to_attr`] and [`convert_to_native`] convert single
//! values. [`marshall_serializable`] accepts any `serde` value whose top level
//! serializes as a map (or, with
//! [`MarshallOptions::convert_class_instance_to_map`], a struct).

use crate::{AttributeMap, AttributeValue, Item, NativeValue};
use serde::ser::{self, Impossible, Serialize};
use serde_json::{Number, Value};
use std::fmt;
use thiserror::Error;

/// Options that control how structured values become attribute values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MarshallOptions {
    /// Marshall empty strings as `NULL` instead of an empty `S`.
    pub convert_empty_values: bool,
    /// Drop undefined map and list members.
    ///
    /// Structured values have no undefined members and an explicit `null`
    /// always marshalls to `NULL`, so this does not change how an [`Item`] is
    /// marshalled.
    pub remove_undefined_values: bool,
    /// Accept serde structs in [`marshall_serializable`]. Maps are always accepted.
    pub convert_class_instance_to_map: bool,
}

/// Options that control how attribute values become structured values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnmarshallOptions {
    /// Unmarshall `N` values as their exact decimal string.
    pub wrap_numbers: bool,
}

/// Failure to marshall a structured value.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MarshallError {
    /// The value is not a map and cannot be marshalled as an item.
    #[error("cannot marshall a {kind} as an item, expected a map")]
    NotAnItem {
        /// The kind of value that was found.
        kind: &'static str,
    },
    /// A serde struct was given without `convert_class_instance_to_map`.
    #[error("cannot marshall struct `{name}` as an item, set `convert_class_instance_to_map` to allow it")]
    ClassInstance {
        /// The struct's serde name.
        name: &'static str,
    },
    /// The value could not be serialized into a structured value.
    #[error("failed to serialize value")]
    Serialize(#[source] serde_json::Error),
}

/// Failure to unmarshall an attribute value.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UnmarshallError {
    /// An `N` value that does not parse as a number.
    #[error("`{value}` is not a valid number")]
    InvalidNumber {
        /// The offending decimal string.
        value: String,
    },
    /// An integral `N` value outside the 64-bit range.
    #[error("number `{value}` cannot be represented exactly, set `wrap_numbers` to read it as a string")]
    NumberOutOfRange {
        /// The offending decimal string.
        value: String,
    },
}

/// Convert a structured item into an attribute map.
pub fn marshall(item: &Item, options: &MarshallOptions) -> AttributeMap {
    item.iter()
        .map(|(k, v)| (k.clone(), convert_to_attr(v, options)))
        .collect()
}

/// Convert a structured value that must be a map into an attribute map.
pub fn marshall_value(value: &NativeValue, options: &MarshallOptions) -> Result<AttributeMap, MarshallError> {
    match value {
        Value::Object(item) => Ok(marshall(item, options)),
        other => Err(MarshallError::NotAnItem {
            kind: kind_of(other),
        }),
    }
}

/// Convert a single structured value into an attribute value.
pub fn convert_to_attr(value: &NativeValue, options: &MarshallOptions) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) if s.is_empty() && options.convert_empty_values => {
            AttributeValue::Null(true)
        }
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(members) => AttributeValue::L(
            members
                .iter()
                .map(|v| convert_to_attr(v, options))
                .collect(),
        ),
        Value::Object(map) => AttributeValue::M(marshall(map, options)),
    }
}

/// Convert an attribute map into a structured item.
pub fn unmarshall(map: &AttributeMap, options: &UnmarshallOptions) -> Result<Item, UnmarshallError> {
    map.iter()
        .map(|(k, v)| Ok((k.clone(), convert_to_native(v, options)?)))
        .collect()
}

/// Convert a single attribute value into a structured value.
///
/// Binary values become base64 strings and sets become lists.
pub fn convert_to_native(
    value: &AttributeValue,
    options: &UnmarshallOptions,
) -> Result<NativeValue, UnmarshallError> {
    Ok(match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => convert_number(n, options)?,
        AttributeValue::B(b) => Value::String(crate::base64::encode(b)),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(members) => Value::Array(
            members
                .iter()
                .map(|v| convert_to_native(v, options))
                .collect::<Result<_, _>>()?,
        ),
        AttributeValue::M(map) => Value::Object(unmarshall(map, options)?),
        AttributeValue::Ss(members) => {
            Value::Array(members.iter().cloned().map(Value::String).collect())
        }
        AttributeValue::Ns(members) => Value::Array(
            members
                .iter()
                .map(|n| convert_number(n, options))
                .collect::<Result<_, _>>()?,
        ),
        AttributeValue::Bs(members) => Value::Array(
            members
                .iter()
                .map(|b| Value::String(crate::base64::encode(b)))
                .collect(),
        ),
    })
}

fn convert_number(n: &str, options: &UnmarshallOptions) -> Result<Value, UnmarshallError> {
    if options.wrap_numbers {
        return Ok(Value::String(n.to_string()));
    }
    let trimmed = n.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Ok(Value::Number(i.into()));
    }
    if let Ok(u) = trimmed.parse::<u64>() {
        return Ok(Value::Number(u.into()));
    }
    let integral = !trimmed.contains(['.', 'e', 'E']);
    if integral && is_decimal_integer(trimmed) {
        return Err(UnmarshallError::NumberOutOfRange {
            value: n.to_string(),
        });
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| UnmarshallError::InvalidNumber {
            value: n.to_string(),
        })
}

fn is_decimal_integer(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
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

/// Marshall any serde value whose top level is a map into an attribute map.
///
/// A struct (the serde shape of a class-like value) is only accepted when
/// [`MarshallOptions::convert_class_instance_to_map`] is set.
pub fn marshall_serializable<T>(value: &T, options: &MarshallOptions) -> Result<AttributeMap, MarshallError>
where
    T: Serialize + ?Sized,
{
    match value.serialize(ShapeProbe) {
        Err(Probe::Found(Shape::Map)) => {}
        Err(Probe::Found(Shape::Struct(_))) if options.convert_class_instance_to_map => {}
        Err(Probe::Found(Shape::Struct(name))) => {
            return Err(MarshallError::ClassInstance { name })
        }
        Err(Probe::Found(Shape::Other(kind))) | Ok(kind) => {
            return Err(MarshallError::NotAnItem { kind })
        }
        Err(Probe::Custom(msg)) => {
            return Err(MarshallError::Serialize(ser::Error::custom(msg)))
        }
    }
    let value = serde_json::to_value(value).map_err(MarshallError::Serialize)?;
    marshall_value(&value, options)
}

#[derive(Debug)]
enum Shape {
    Map,
    Struct(&'static str),
    Other(&'static str),
}

/// Outcome of probing a value's top-level serde shape. Compound shapes stop the
/// serializer early, so they travel through the error channel.
#[derive(Debug)]
enum Probe {
    Found(Shape),
    Custom(String),
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Probe::Found(shape) => write!(f, "found {:?}", shape),
            Probe::Custom(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for Probe {}

impl ser::Error for Probe {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Probe::Custom(msg.to_string())
    }
}

struct ShapeProbe;

impl ser::Serializer for ShapeProbe {
    type Ok = &'static str;
    type Error = Probe;
    type SerializeSeq = Impossible<&'static str, Probe>;
    type SerializeTuple = Impossible<&'static str, Probe>;
    type SerializeTupleStruct = Impossible<&'static str, Probe>;
    type SerializeTupleVariant = Impossible<&'static str, Probe>;
    type SerializeMap = Impossible<&'static str, Probe>;
    type SerializeStruct = Impossible<&'static str, Probe>;
    type SerializeStructVariant = Impossible<&'static str, Probe>;

    fn serialize_bool(self, _v: bool) -> Result<Self::Ok, Self::Error> {
        Ok("boolean")
    }
    fn serialize_i8(self, _v: i8) -> Result<Self::Ok, Self::Error> {
        Ok("number")
    }
    fn serialize_i16(self, _v: i16) -> Result<Self::Ok, Self::Error> {
        Ok("number")
    }
    fn serialize_i32(self, _v: i32) -> Result<Self::Ok, Self::Error> {
        Ok("number")
    }
    fn serialize_i64(self, _v: i64) -> Result<Self::Ok, Self::Error> {
        Ok("number")
    }
    fn serialize_u8(self, _v: u8) -> Result<Self::Ok, Self::Error> {
        Ok("number")
    }
    fn serialize_u16(self, _v: u16) -> Result<Self::Ok, Self::Error> {
        Ok("number")
    }
    fn serialize_u32(self, _v: u32) -> Result<Self::Ok, Self::Error> {
        Ok("number")
    }
    fn serialize_u64(self, _v: u64) -> Result<Self::Ok, Self::Error> {
        Ok("number")
    }
    fn serialize_f32(self, _v: f32) -> Result<Self::Ok, Self::Error> {
        Ok("number")
    }
    fn serialize_f64(self, _v: f64) -> Result<Self::Ok, Self::Error> {
        Ok("number")
    }
    fn serialize_char(self, _v: char) -> Result<Self::Ok, Self::Error> {
        Ok("string")
    }
    fn serialize_str(self, _v: &str) -> Result<Self::Ok, Self::Error> {
        Ok("string")
    }
    fn serialize_bytes(self, _v: &[u8]) -> Result<Self::Ok, Self::Error> {
        Ok("binary")
    }
    fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
        Ok("null")
    }
    fn serialize_some<T: Serialize + ?Sized>(self, _value: &T) -> Result<Self::Ok, Self::Error> {
        Ok("option")
    }
    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
        Ok("null")
    }
    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok, Self::Error> {
        Ok("null")
    }
    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        Ok("string")
    }
    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error> {
        value.serialize(self)
    }
    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Self::Ok, Self::Error> {
        Err(Probe::Found(Shape::Other("enum variant")))
    }
    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Err(Probe::Found(Shape::Other("list")))
    }
    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Err(Probe::Found(Shape::Other("list")))
    }
    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Err(Probe::Found(Shape::Other("list")))
    }
    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Err(Probe::Found(Shape::Other("enum variant")))
    }
    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Err(Probe::Found(Shape::Map))
    }
    fn serialize_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Err(Probe::Found(Shape::Struct(name)))
    }
    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Err(Probe::Found(Shape::Other("enum variant")))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Blob;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn item(value: Value) -> Item {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn marshalls_every_native_kind() {
        let map = marshall(
            &item(json!({
                "s": "x", "n": 1.5, "b": true, "z": null,
                "l": ["a", 2], "m": {"k": false}
            })),
            &MarshallOptions::default(),
        );
        assert_eq!(map["s"], AttributeValue::S("x".into()));
        assert_eq!(map["n"], AttributeValue::N("1.5".into()));
        assert_eq!(map["b"], AttributeValue::Bool(true));
        assert_eq!(map["z"], AttributeValue::Null(true));
        assert_eq!(
            map["l"],
            AttributeValue::L(vec![AttributeValue::S("a".into()), AttributeValue::N("2".into())])
        );
        assert_eq!(
            map["m"].as_m().and_then(|m| m.get("k")),
            Some(&AttributeValue::Bool(false))
        );
    }

    #[test]
    fn empty_strings_are_kept_unless_converted() {
        let input = item(json!({"e": ""}));
        assert_eq!(
            marshall(&input, &MarshallOptions::default())["e"],
            AttributeValue::S(String::new())
        );
        let options = MarshallOptions {
            convert_empty_values: true,
            ..Default::default()
        };
        assert_eq!(marshall(&input, &options)["e"], AttributeValue::Null(true));
    }

    #[test]
    fn explicit_nulls_survive_remove_undefined_values() {
        let input = item(json!({"a": null, "l": [1, null], "m": {"x": null}}));
        let options = MarshallOptions {
            remove_undefined_values: true,
            ..Default::default()
        };
        let map = marshall(&input, &options);
        assert_eq!(map["a"], AttributeValue::Null(true));
        assert_eq!(
            map["l"],
            AttributeValue::L(vec![AttributeValue::N("1".into()), AttributeValue::Null(true)])
        );
        let mut nested = AttributeMap::new();
        nested.insert("x".into(), AttributeValue::Null(true));
        assert_eq!(map["m"], AttributeValue::M(nested));
        assert_eq!(map, marshall(&input, &MarshallOptions::default()));
    }

    #[test]
    fn non_object_is_not_an_item() {
        let err = marshall_value(&json!("nope"), &MarshallOptions::default()).unwrap_err();
        assert!(matches!(err, MarshallError::NotAnItem { kind: "string" }));
    }

    #[test]
    fn wrap_numbers_keeps_exact_decimal() {
        let options = UnmarshallOptions { wrap_numbers: true };
        let value = convert_to_native(&AttributeValue::N("0.10000000000000000001".into()), &options)
            .expect("wrapped");
        assert_eq!(value, json!("0.10000000000000000001"));
    }

    #[test]
    fn oversized_integers_require_wrapping() {
        let huge = AttributeValue::N("123456789012345678901234567890".into());
        let err = convert_to_native(&huge, &UnmarshallOptions::default()).unwrap_err();
        assert!(matches!(err, UnmarshallError::NumberOutOfRange { .. }));
        assert!(convert_to_native(&huge, &UnmarshallOptions { wrap_numbers: true }).is_ok());
    }

    #[test]
    fn garbage_numbers_are_rejected() {
        let err = convert_to_native(&AttributeValue::N("twelve".into()), &UnmarshallOptions::default())
            .unwrap_err();
        assert!(matches!(err, UnmarshallError::InvalidNumber { .. }));
    }

    #[test]
    fn wire_only_kinds_degrade_to_lists_and_strings() {
        let options = UnmarshallOptions::default();
        assert_eq!(
            convert_to_native(&AttributeValue::B(Blob::new("AWS")), &options).unwrap(),
            json!("QVdT")
        );
        assert_eq!(
            convert_to_native(&AttributeValue::Ns(vec!["1".into(), "2.5".into()]), &options).unwrap(),
            json!([1, 2.5])
        );
        assert_eq!(
            convert_to_native(&AttributeValue::Ss(vec!["a".into()]), &options).unwrap(),
            json!(["a"])
        );
    }

    #[derive(serde::Serialize)]
    struct Pet {
        name: String,
        legs: u8,
    }

    #[test]
    fn structs_need_class_instance_conversion() {
        let pet = Pet {
            name: "rex".into(),
            legs: 4,
        };
        let err = marshall_serializable(&pet, &MarshallOptions::default()).unwrap_err();
        assert!(matches!(err, MarshallError::ClassInstance { name: "Pet" }));

        let options = MarshallOptions {
            convert_class_instance_to_map: true,
            ..Default::default()
        };
        let map = marshall_serializable(&pet, &options).expect("struct allowed");
        assert_eq!(map["name"], AttributeValue::S("rex".into()));
        assert_eq!(map["legs"], AttributeValue::N("4".into()));
    }

    #[test]
    fn maps_are_always_accepted() {
        let mut input = BTreeMap::new();
        input.insert("k", 1);
        let map = marshall_serializable(&input, &MarshallOptions::default()).expect("map");
        assert_eq!(map["k"], AttributeValue::N("1".into()));

        let err = marshall_serializable(&vec![1, 2], &MarshallOptions::default()).unwrap_err();
        assert!(matches!(err, MarshallError::NotAnItem { kind: "list" }));
        let err = marshall_serializable("text", &MarshallOptions::default()).unwrap_err();
        assert!(matches!(err, MarshallError::NotAnItem { kind: "string" }));
    }

    fn native_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|i| json!(i)),
            any::<u64>().prop_map(|u| json!(u)),
            (-1.0e12f64..1.0e12f64).prop_map(|f| json!(f)),
            "[a-z]{1,8}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn unmarshall_inverts_marshall(
            fields in prop::collection::btree_map("[a-z]{1,6}", native_value(), 0..6)
        ) {
            let input: Item = fields.into_iter().collect();
            let wire = marshall(&input, &MarshallOptions::default());
            let back = unmarshall(&wire, &UnmarshallOptions::default()).expect("valid numbers");
            prop_assert_eq!(back, input);
        }
    }
}
