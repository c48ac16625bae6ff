/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! DynamoDB attribute values and the codec that converts them to and from
//! structured (JSON-like) values.
//!
//! Structured values are plain [`serde_json::Value`]s. An item is a JSON object
//! ([`Item`]); its wire form is a map of [`AttributeValue`]s ([`AttributeMap`]).

#![allow(clippy::derive_partial_eq_without_eq)]
#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod base64;
pub mod marshall;

mod attribute_value;
mod blob;

pub use attribute_value::{AttributeMap, AttributeValue};
pub use blob::Blob;
pub use marshall::{MarshallOptions, UnmarshallOptions};

/// A structured value: the application-level representation of an attribute.
pub type NativeValue = serde_json::Value;

/// A structured item: the application-level representation of a DynamoDB item.
pub type Item = serde_json::Map<String, serde_json::Value>;
