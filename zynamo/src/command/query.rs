/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use super::{DocumentCommand, DocumentOperation};
use crate::key_node::KeyNode;
use zynamo_dynamodb::operation::query::{Query as QueryOperation, QueryInput, QueryOutput};
use zynamo_types::Item;

/// `Query` with structured values and items.
#[derive(Debug)]
#[non_exhaustive]
pub struct Query;

/// Input of a [`QueryCommand`].
pub type QueryCommandInput = QueryInput<Item>;
/// Output of a [`QueryCommand`].
pub type QueryCommandOutput = QueryOutput<Item>;

/// Queries a table by key condition.
pub type QueryCommand = DocumentCommand<Query>;

impl DocumentOperation for Query {
    type Operation = QueryOperation;
    type Input = QueryCommandInput;
    type Output = QueryCommandOutput;

    const INPUT_KEY_NODES: &'static [KeyNode] = &[
        KeyNode::new("ExpressionAttributeValues"),
        KeyNode::new("ExclusiveStartKey"),
    ];
    const OUTPUT_KEY_NODES: &'static [KeyNode] = &[
        KeyNode::all_members("Items"),
        KeyNode::new("LastEvaluatedKey"),
    ];
}
