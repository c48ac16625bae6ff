/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use super::{DocumentCommand, DocumentOperation};
use crate::key_node::KeyNode;
use zynamo_dynamodb::operation::put_item::{PutItem, PutItemInput, PutItemOutput};
use zynamo_types::Item;

/// `PutItem` with a structured item.
#[derive(Debug)]
#[non_exhaustive]
pub struct Put;

/// Input of a [`PutCommand`].
pub type PutCommandInput = PutItemInput<Item>;
/// Output of a [`PutCommand`]. `attributes` holds the replaced item when asked for.
pub type PutCommandOutput = PutItemOutput<Item>;

/// Writes one structured item.
pub type PutCommand = DocumentCommand<Put>;

impl DocumentOperation for Put {
    type Operation = PutItem;
    type Input = PutCommandInput;
    type Output = PutCommandOutput;

    const INPUT_KEY_NODES: &'static [KeyNode] = &[
        KeyNode::new("Item"),
        KeyNode::new("ExpressionAttributeValues"),
    ];
    const OUTPUT_KEY_NODES: &'static [KeyNode] = &[KeyNode::new("Attributes")];
}
