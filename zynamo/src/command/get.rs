/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use super::{DocumentCommand, DocumentOperation};
use crate::key_node::KeyNode;
use zynamo_dynamodb::operation::get_item::{GetItem, GetItemInput, GetItemOutput};
use zynamo_types::Item;

/// `GetItem` with a structured key and item.
#[derive(Debug)]
#[non_exhaustive]
pub struct Get;

/// Input of a [`GetCommand`].
pub type GetCommandInput = GetItemInput<Item>;
/// Output of a [`GetCommand`].
pub type GetCommandOutput = GetItemOutput<Item>;

/// Reads one item by its structured key.
pub type GetCommand = DocumentCommand<Get>;

impl DocumentOperation for Get {
    type Operation = GetItem;
    type Input = GetCommandInput;
    type Output = GetCommandOutput;

    const INPUT_KEY_NODES: &'static [KeyNode] = &[KeyNode::new("Key")];
    const OUTPUT_KEY_NODES: &'static [KeyNode] = &[KeyNode::new("Item")];
}
