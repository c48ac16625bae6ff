/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! `GetItem`: read a single item by primary key.

use crate::model::{ConsumedCapacity, ReturnConsumedCapacity};
use crate::operation::{impl_has_metadata, Operation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use zynamo_runtime::metadata::ResponseMetadata;
use zynamo_types::AttributeMap;

/// The `GetItem` operation.
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub struct GetItem;

impl Operation for GetItem {
    const NAME: &'static str = "GetItem";
    type Input = GetItemInput;
    type Output = GetItemOutput;
}

/// Input of `GetItem`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetItemInput<M = AttributeMap> {
    /// Table to read from.
    pub table_name: String,
    /// Primary key of the item.
    pub key: M,
    /// Use a strongly consistent read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistent_read: Option<bool>,
    /// Attributes to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection_expression: Option<String>,
    /// Substitutions for attribute names in expressions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression_attribute_names: Option<HashMap<String, String>>,
    /// Consumed capacity detail to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_consumed_capacity: Option<ReturnConsumedCapacity>,
}

impl<M> GetItemInput<M> {
    /// Read the item with `key` from `table_name`.
    pub fn new(table_name: impl Into<String>, key: M) -> Self {
        Self {
            table_name: table_name.into(),
            key,
            consistent_read: None,
            projection_expression: None,
            expression_attribute_names: None,
            return_consumed_capacity: None,
        }
    }

    /// Use a strongly consistent read.
    pub fn consistent_read(mut self, consistent_read: bool) -> Self {
        self.consistent_read = Some(consistent_read);
        self
    }

    /// Return only the attributes named by `projection_expression`.
    pub fn projection_expression(mut self, projection_expression: impl Into<String>) -> Self {
        self.projection_expression = Some(projection_expression.into());
        self
    }
}

/// Output of `GetItem`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetItemOutput<M = AttributeMap> {
    /// The item, absent if no item has the key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<M>,
    /// Capacity consumed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumed_capacity: Option<ConsumedCapacity>,
    /// Response metadata.
    #[serde(skip)]
    pub metadata: ResponseMetadata,
}

impl_has_metadata!(GetItemOutput);
