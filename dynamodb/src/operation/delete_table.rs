/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! `DeleteTable`.

use crate::model::TableDescription;
use crate::operation::Operation;
use serde::{Deserialize, Serialize};
use zynamo_runtime::metadata::{HasMetadata, ResponseMetadata};

/// The `DeleteTable` operation.
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub struct DeleteTable;

impl Operation for DeleteTable {
    const NAME: &'static str = "DeleteTable";
    type Input = DeleteTableInput;
    type Output = DeleteTableOutput;
}

/// Input of `DeleteTable`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteTableInput {
    /// Table to delete.
    pub table_name: String,
}

impl DeleteTableInput {
    /// Delete `table_name`.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
        }
    }
}

/// Output of `DeleteTable`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteTableOutput {
    /// The table as it was when deletion started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_description: Option<TableDescription>,
    /// Response metadata.
    #[serde(skip)]
    pub metadata: ResponseMetadata,
}

impl HasMetadata for DeleteTableOutput {
    fn metadata(&self) -> &ResponseMetadata {
        &self.metadata
    }

    fn set_metadata(&mut self, metadata: ResponseMetadata) {
        self.metadata = metadata;
    }
}
