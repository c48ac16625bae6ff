/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The schema-validating client.

use crate::command::{
    GetCommand, GetCommandInput, PutCommand, PutCommandInput, PutCommandOutput, QueryCommand,
    QueryCommandInput,
};
use crate::document_client::{DocumentClient, TranslateConfig};
use crate::error::Error;
use crate::expression::{KeyCondition, KeySchema};
use crate::schema::Schema;
use std::sync::Arc;
use zynamo_dynamodb::command::{CreateTableCommand, DeleteTableCommand};
use zynamo_dynamodb::model::ConsumedCapacity;
use zynamo_dynamodb::operation::create_table::{CreateTableInput, CreateTableOutput};
use zynamo_dynamodb::operation::delete_table::{DeleteTableInput, DeleteTableOutput};
use zynamo_dynamodb::operation::get_item::GetItemOutput;
use zynamo_dynamodb::operation::query::QueryOutput;
use zynamo_dynamodb::Config;
use zynamo_runtime::handler::HandlerOptions;
use zynamo_runtime::metadata::{HasMetadata, ResponseMetadata};
use zynamo_types::Item;

/// A command a [`SchemaClient`] can send.
#[derive(Debug)]
#[non_exhaustive]
pub enum SchemaCommand {
    /// Read one item; the item is parsed after retrieval.
    Get(GetCommand),
    /// Write one item; the item is parsed before transmission.
    Put(PutCommand),
    /// Query items; every item is parsed after retrieval.
    Query(QueryCommand),
    /// Sent unchanged.
    CreateTable(CreateTableCommand),
    /// Sent unchanged.
    DeleteTable(DeleteTableCommand),
}

macro_rules! impl_from_command {
    ($($variant:ident($command:ty)),+ $(,)?) => {
        $(
            impl From<$command> for SchemaCommand {
                fn from(command: $command) -> Self {
                    SchemaCommand::$variant(command)
                }
            }
        )+
    };
}

impl_from_command!(
    Get(GetCommand),
    Put(PutCommand),
    Query(QueryCommand),
    CreateTable(CreateTableCommand),
    DeleteTable(DeleteTableCommand),
);

/// Output of a query whose items were parsed by the schema.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedQueryOutput<T> {
    /// Parsed items.
    pub items: Option<Vec<T>>,
    /// Number of items returned.
    pub count: i32,
    /// Number of items evaluated.
    pub scanned_count: i32,
    /// Where the next page starts, absent on the last page.
    pub last_evaluated_key: Option<Item>,
    /// Capacity consumed.
    pub consumed_capacity: Option<ConsumedCapacity>,
    /// Response metadata.
    pub metadata: ResponseMetadata,
}

impl<T> HasMetadata for ParsedQueryOutput<T> {
    fn metadata(&self) -> &ResponseMetadata {
        &self.metadata
    }

    fn set_metadata(&mut self, metadata: ResponseMetadata) {
        self.metadata = metadata;
    }
}

/// Output of [`SchemaClient::send`], one variant per [`SchemaCommand`] variant.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum SchemaOutput<T> {
    /// The item, parsed.
    Get(GetItemOutput<T>),
    /// The write's output, unchanged.
    Put(PutCommandOutput),
    /// The items, parsed.
    Query(ParsedQueryOutput<T>),
    /// Unchanged.
    CreateTable(CreateTableOutput),
    /// Unchanged.
    DeleteTable(DeleteTableOutput),
}

impl<T> SchemaOutput<T> {
    /// Response metadata of the call.
    pub fn metadata(&self) -> &ResponseMetadata {
        match self {
            SchemaOutput::Get(output) => output.metadata(),
            SchemaOutput::Put(output) => output.metadata(),
            SchemaOutput::Query(output) => output.metadata(),
            SchemaOutput::CreateTable(output) => output.metadata(),
            SchemaOutput::DeleteTable(output) => output.metadata(),
        }
    }
}

/// A document client that checks items against a [`Schema`].
///
/// Writes are rejected before anything is sent if their item does not parse.
/// Reads parse every returned item and fail as a whole if any does not. Table
/// management passes straight through. Every call makes at most one request.
#[derive(Debug)]
pub struct SchemaClient<S> {
    document_client: DocumentClient,
    schema: Arc<S>,
    key_schema: Option<KeySchema>,
}

impl<S> Clone for SchemaClient<S> {
    fn clone(&self) -> Self {
        Self {
            document_client: self.document_client.clone(),
            schema: self.schema.clone(),
            key_schema: self.key_schema.clone(),
        }
    }
}

impl<S: Schema> SchemaClient<S> {
    /// Validate items with `schema` and send through `document_client`.
    pub fn new(document_client: DocumentClient, schema: S) -> Self {
        Self {
            document_client,
            schema: Arc::new(schema),
            key_schema: None,
        }
    }

    /// A client over a new transport client for `config`.
    pub fn from_conf(schema: S, config: Config, translate_config: Option<TranslateConfig>) -> Self {
        let transport = zynamo_dynamodb::Client::from_conf(config);
        Self::new(DocumentClient::from(&transport, translate_config), schema)
    }

    /// Check query key conditions against `key_schema` before sending.
    pub fn with_key_schema(mut self, key_schema: KeySchema) -> Self {
        self.key_schema = Some(key_schema);
        self
    }

    /// The schema.
    pub fn schema(&self) -> &S {
        &self.schema
    }

    /// The document client requests go through.
    pub fn document_client(&self) -> &DocumentClient {
        &self.document_client
    }

    /// Send `command`.
    pub async fn send(
        &self,
        command: impl Into<SchemaCommand>,
    ) -> Result<SchemaOutput<S::Output>, Error> {
        self.send_with_options(command, HandlerOptions::default())
            .await
    }

    /// Send `command` with `options`.
    pub async fn send_with_options(
        &self,
        command: impl Into<SchemaCommand>,
        options: HandlerOptions,
    ) -> Result<SchemaOutput<S::Output>, Error> {
        Ok(match command.into() {
            SchemaCommand::Get(command) => SchemaOutput::Get(self.send_get(command, options).await?),
            SchemaCommand::Put(command) => SchemaOutput::Put(self.send_put(command, options).await?),
            SchemaCommand::Query(command) => {
                SchemaOutput::Query(self.send_query(command, options).await?)
            }
            SchemaCommand::CreateTable(command) => SchemaOutput::CreateTable(
                self.document_client
                    .send_with_options(command, options)
                    .await?,
            ),
            SchemaCommand::DeleteTable(command) => SchemaOutput::DeleteTable(
                self.document_client
                    .send_with_options(command, options)
                    .await?,
            ),
        })
    }

    /// Read one item and parse it.
    pub async fn get(&self, input: GetCommandInput) -> Result<GetItemOutput<S::Output>, Error> {
        self.send_get(GetCommand::new(input), HandlerOptions::default())
            .await
    }

    /// Parse `input.item` and write it if it is valid.
    pub async fn put(&self, input: PutCommandInput) -> Result<PutCommandOutput, Error> {
        self.send_put(PutCommand::new(input), HandlerOptions::default())
            .await
    }

    /// Query items and parse each one.
    pub async fn query(
        &self,
        input: QueryCommandInput,
    ) -> Result<ParsedQueryOutput<S::Output>, Error> {
        self.send_query(QueryCommand::new(input), HandlerOptions::default())
            .await
    }

    /// Create a table.
    pub async fn create_table(&self, input: CreateTableInput) -> Result<CreateTableOutput, Error> {
        Ok(self
            .document_client
            .send(CreateTableCommand::new(input))
            .await?)
    }

    /// Delete a table.
    pub async fn delete_table(&self, input: DeleteTableInput) -> Result<DeleteTableOutput, Error> {
        Ok(self
            .document_client
            .send(DeleteTableCommand::new(input))
            .await?)
    }

    fn parse(&self, item: &Item, command: &'static str) -> Result<S::Output, Error> {
        self.schema.parse(item).map_err(|err| {
            tracing::debug!(
                command,
                violations = err.violations().len(),
                error = %err,
                "item rejected by schema"
            );
            Error::from(err)
        })
    }

    async fn send_get(
        &self,
        command: GetCommand,
        options: HandlerOptions,
    ) -> Result<GetItemOutput<S::Output>, Error> {
        let GetItemOutput {
            item,
            consumed_capacity,
            metadata,
        } = self.document_client.send_with_options(command, options).await?;
        let item = item
            .map(|item| self.parse(&item, "GetCommand"))
            .transpose()?;
        Ok(GetItemOutput {
            item,
            consumed_capacity,
            metadata,
        })
    }

    async fn send_put(
        &self,
        command: PutCommand,
        options: HandlerOptions,
    ) -> Result<PutCommandOutput, Error> {
        self.parse(&command.input().item, "PutCommand")?;
        Ok(self
            .document_client
            .send_with_options(command, options)
            .await?)
    }

    async fn send_query(
        &self,
        command: QueryCommand,
        options: HandlerOptions,
    ) -> Result<ParsedQueryOutput<S::Output>, Error> {
        if let Some(key_schema) = &self.key_schema {
            check_key_condition(command.input(), key_schema)?;
        }
        let QueryOutput {
            items,
            count,
            scanned_count,
            last_evaluated_key,
            consumed_capacity,
            metadata,
        } = self.document_client.send_with_options(command, options).await?;
        let items = items
            .map(|items| {
                items
                    .iter()
                    .map(|item| self.parse(item, "QueryCommand"))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;
        Ok(ParsedQueryOutput {
            items,
            count,
            scanned_count,
            last_evaluated_key,
            consumed_capacity,
            metadata,
        })
    }
}

fn check_key_condition(input: &QueryCommandInput, key_schema: &KeySchema) -> Result<(), Error> {
    let Some(expression) = &input.key_condition_expression else {
        return Ok(());
    };
    let no_values = Item::new();
    KeyCondition::parse_with_names(
        expression,
        key_schema,
        input.expression_attribute_values.as_ref().unwrap_or(&no_values),
        input.expression_attribute_names.as_ref(),
    )?;
    Ok(())
}
