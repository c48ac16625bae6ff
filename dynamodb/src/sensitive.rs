/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Log filters that keep item contents out of logs.
//!
//! Attribute names are kept so a log line still shows which attributes a
//! request touched. Attribute values are replaced with [`REDACTED`].

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use zynamo_runtime::context::LogFilter;
use zynamo_runtime::type_erasure::TypeErasedBox;

/// Replacement for every sensitive value.
pub const REDACTED: &str = "*** Sensitive Data Redacted ***";

/// Fields holding a single item or key.
const ITEM_FIELDS: &[&str] = &[
    "Key",
    "Item",
    "Attributes",
    "ExpressionAttributeValues",
    "ExclusiveStartKey",
    "LastEvaluatedKey",
];

/// Fields holding a list of items.
const ITEM_LIST_FIELDS: &[&str] = &["Items"];

/// Redact the item-carrying fields of a serialized request or response in place.
pub fn redact(payload: &mut Value) {
    let Some(fields) = payload.as_object_mut() else {
        return;
    };
    for field in ITEM_FIELDS {
        if let Some(item) = fields.get_mut(*field) {
            redact_item(item);
        }
    }
    for field in ITEM_LIST_FIELDS {
        if let Some(Value::Array(items)) = fields.get_mut(*field) {
            items.iter_mut().for_each(redact_item);
        }
    }
}

fn redact_item(item: &mut Value) {
    if let Value::Object(attributes) = item {
        for value in attributes.values_mut() {
            *value = Value::String(REDACTED.into());
        }
    }
}

/// Render `value` as JSON with its item-carrying fields redacted.
pub fn render<T: Serialize + ?Sized>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(mut payload) => {
            redact(&mut payload);
            payload.to_string()
        }
        Err(err) => format!("<unrenderable: {}>", err),
    }
}

/// A [`LogFilter`] for boxes holding a `T`.
///
/// Boxes holding anything else render as their type name.
pub fn filter<T: Serialize + 'static>() -> LogFilter {
    Arc::new(|value: &TypeErasedBox| match value.downcast_ref::<T>() {
        Some(value) => render(value),
        None => format!("<{}>", value.type_name()),
    })
}
