/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! `CreateTable`.

use crate::model::{
    AttributeDefinition, BillingMode, KeySchemaElement, ProvisionedThroughput, TableDescription,
};
use crate::operation::Operation;
use serde::{Deserialize, Serialize};
use zynamo_runtime::metadata::{HasMetadata, ResponseMetadata};

/// The `CreateTable` operation.
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub struct CreateTable;

impl Operation for CreateTable {
    const NAME: &'static str = "CreateTable";
    type Input = CreateTableInput;
    type Output = CreateTableOutput;
}

/// Input of `CreateTable`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateTableInput {
    /// Name of the new table.
    pub table_name: String,
    /// Primary key.
    pub key_schema: Vec<KeySchemaElement>,
    /// Types of the key attributes.
    pub attribute_definitions: Vec<AttributeDefinition>,
    /// Billing mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_mode: Option<BillingMode>,
    /// Capacity, required for provisioned billing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioned_throughput: Option<ProvisionedThroughput>,
}

impl CreateTableInput {
    /// Create `table_name`.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Default::default()
        }
    }

    /// Add a key attribute and declare its type.
    pub fn key(
        mut self,
        element: KeySchemaElement,
        attribute_type: crate::model::ScalarAttributeType,
    ) -> Self {
        self.attribute_definitions.push(AttributeDefinition::new(
            element.attribute_name.clone(),
            attribute_type,
        ));
        self.key_schema.push(element);
        self
    }

    /// Set the billing mode.
    pub fn billing_mode(mut self, billing_mode: BillingMode) -> Self {
        self.billing_mode = Some(billing_mode);
        self
    }

    /// Set provisioned throughput.
    pub fn provisioned_throughput(mut self, read: i64, write: i64) -> Self {
        self.provisioned_throughput = Some(ProvisionedThroughput {
            read_capacity_units: read,
            write_capacity_units: write,
        });
        self
    }
}

/// Output of `CreateTable`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateTableOutput {
    /// The new table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_description: Option<TableDescription>,
    /// Response metadata.
    #[serde(skip)]
    pub metadata: ResponseMetadata,
}

impl HasMetadata for CreateTableOutput {
    fn metadata(&self) -> &ResponseMetadata {
        &self.metadata
    }

    fn set_metadata(&mut self, metadata: ResponseMetadata) {
        self.metadata = metadata;
    }
}
