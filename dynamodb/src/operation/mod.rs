/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! DynamoDB operations.
//!
//! Item-carrying inputs and outputs are generic over the item representation
//! `M`. The default, [`AttributeMap`](zynamo_types::AttributeMap), is the wire
//! form. Other representations serialize to the same field names, so one shape
//! serves both the wire and structured forms of a request.

use serde::de::DeserializeOwned;
use serde::Serialize;
use zynamo_runtime::metadata::HasMetadata;

pub mod create_table;
pub mod delete_table;
pub mod get_item;
pub mod put_item;
pub mod query;

/// A DynamoDB operation: its name and wire input and output.
pub trait Operation: Send + Sync + 'static {
    /// The operation name, as sent in `X-Amz-Target`.
    const NAME: &'static str;
    /// Wire input.
    type Input: Serialize + DeserializeOwned + Clone + Send + Sync + 'static;
    /// Wire output.
    type Output: Serialize + DeserializeOwned + HasMetadata + Send + Sync + 'static;
}

macro_rules! impl_has_metadata {
    ($($output:ident),+) => {
        $(
            impl<M> zynamo_runtime::metadata::HasMetadata for $output<M> {
                fn metadata(&self) -> &zynamo_runtime::metadata::ResponseMetadata {
                    &self.metadata
                }

                fn set_metadata(&mut self, metadata: zynamo_runtime::metadata::ResponseMetadata) {
                    self.metadata = metadata;
                }
            }
        )+
    };
}

pub(crate) use impl_has_metadata;
