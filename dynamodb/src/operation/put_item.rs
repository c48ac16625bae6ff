/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! `PutItem`: create or replace an item.

use crate::model::{ConsumedCapacity, ReturnConsumedCapacity, ReturnValue};
use crate::operation::{impl_has_metadata, Operation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use zynamo_runtime::metadata::ResponseMetadata;
use zynamo_types::AttributeMap;

/// The `PutItem` operation.
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub struct PutItem;

impl Operation for PutItem {
    const NAME: &'static str = "PutItem";
    type Input = PutItemInput;
    type Output = PutItemOutput;
}

/// Input of `PutItem`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutItemInput<M = AttributeMap> {
    /// Table to write to.
    pub table_name: String,
    /// The item. Must include the primary key attributes.
    pub item: M,
    /// Condition that must hold for the write to succeed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_expression: Option<String>,
    /// Substitutions for attribute names in expressions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression_attribute_names: Option<HashMap<String, String>>,
    /// Substitutions for values in expressions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression_attribute_values: Option<M>,
    /// Attributes to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_values: Option<ReturnValue>,
    /// Consumed capacity detail to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_consumed_capacity: Option<ReturnConsumedCapacity>,
}

impl<M> PutItemInput<M> {
    /// Write `item` to `table_name`.
    pub fn new(table_name: impl Into<String>, item: M) -> Self {
        Self {
            table_name: table_name.into(),
            item,
            condition_expression: None,
            expression_attribute_names: None,
            expression_attribute_values: None,
            return_values: None,
            return_consumed_capacity: None,
        }
    }

    /// Only write if `condition_expression` holds.
    pub fn condition_expression(mut self, condition_expression: impl Into<String>) -> Self {
        self.condition_expression = Some(condition_expression.into());
        self
    }

    /// Values referenced by the condition expression.
    pub fn expression_attribute_values(mut self, values: M) -> Self {
        self.expression_attribute_values = Some(values);
        self
    }

    /// Attributes to return.
    pub fn return_values(mut self, return_values: ReturnValue) -> Self {
        self.return_values = Some(return_values);
        self
    }
}

/// Output of `PutItem`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutItemOutput<M = AttributeMap> {
    /// Attributes requested with `ReturnValues`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<M>,
    /// Capacity consumed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumed_capacity: Option<ConsumedCapacity>,
    /// Response metadata.
    #[serde(skip)]
    pub metadata: ResponseMetadata,
}

impl_has_metadata!(PutItemOutput);
