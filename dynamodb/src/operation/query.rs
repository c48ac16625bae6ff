/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! `Query`: read the items sharing a partition key.

use crate::model::{ConsumedCapacity, ReturnConsumedCapacity};
use crate::operation::{impl_has_metadata, Operation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use zynamo_runtime::metadata::ResponseMetadata;
use zynamo_types::AttributeMap;

/// The `Query` operation.
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub struct Query;

impl Operation for Query {
    const NAME: &'static str = "Query";
    type Input = QueryInput;
    type Output = QueryOutput;
}

/// Input of `Query`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryInput<M = AttributeMap> {
    /// Table to read from.
    pub table_name: String,
    /// Secondary index to read from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
    /// Partition key equality, optionally with one sort key condition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_condition_expression: Option<String>,
    /// Condition applied to items after they are read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_expression: Option<String>,
    /// Attributes to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection_expression: Option<String>,
    /// Substitutions for attribute names in expressions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression_attribute_names: Option<HashMap<String, String>>,
    /// Substitutions for values in expressions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression_attribute_values: Option<M>,
    /// Key to resume after, from a previous page's `LastEvaluatedKey`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_start_key: Option<M>,
    /// Maximum number of items to evaluate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
    /// Ascending sort key order if true or absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_index_forward: Option<bool>,
    /// Use a strongly consistent read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistent_read: Option<bool>,
    /// Consumed capacity detail to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_consumed_capacity: Option<ReturnConsumedCapacity>,
}

impl<M> QueryInput<M> {
    /// Query `table_name` with `key_condition_expression`.
    pub fn new(table_name: impl Into<String>, key_condition_expression: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            index_name: None,
            key_condition_expression: Some(key_condition_expression.into()),
            filter_expression: None,
            projection_expression: None,
            expression_attribute_names: None,
            expression_attribute_values: None,
            exclusive_start_key: None,
            limit: None,
            scan_index_forward: None,
            consistent_read: None,
            return_consumed_capacity: None,
        }
    }

    /// Values referenced by the expressions.
    pub fn expression_attribute_values(mut self, values: M) -> Self {
        self.expression_attribute_values = Some(values);
        self
    }

    /// Substitute `#name` placeholders in the expressions.
    pub fn expression_attribute_name(
        mut self,
        placeholder: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.expression_attribute_names
            .get_or_insert_with(HashMap::new)
            .insert(placeholder.into(), name.into());
        self
    }

    /// Resume after `key`.
    pub fn exclusive_start_key(mut self, key: M) -> Self {
        self.exclusive_start_key = Some(key);
        self
    }

    /// Evaluate at most `limit` items.
    pub fn limit(mut self, limit: i32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Read in descending sort key order when `false`.
    pub fn scan_index_forward(mut self, scan_index_forward: bool) -> Self {
        self.scan_index_forward = Some(scan_index_forward);
        self
    }
}

/// Output of `Query`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryOutput<M = AttributeMap> {
    /// Matching items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<M>>,
    /// Number of items returned.
    #[serde(default)]
    pub count: i32,
    /// Number of items evaluated.
    #[serde(default)]
    pub scanned_count: i32,
    /// Where the next page starts, absent on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_evaluated_key: Option<M>,
    /// Capacity consumed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumed_capacity: Option<ConsumedCapacity>,
    /// Response metadata.
    #[serde(skip)]
    pub metadata: ResponseMetadata,
}

impl_has_metadata!(QueryOutput);
