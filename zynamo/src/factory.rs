/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Builds document commands for a schema's client.

use crate::command::{
    GetCommand, GetCommandInput, PutCommand, PutCommandInput, QueryCommand, QueryCommandInput,
};
use crate::schema::Schema;

/// Creates the commands a [`SchemaClient`](crate::SchemaClient) over the same
/// schema sends.
#[derive(Debug)]
pub struct CommandFactory<'a, S> {
    schema: &'a S,
}

impl<S> Clone for CommandFactory<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for CommandFactory<'_, S> {}

/// A factory for `schema`'s commands.
pub fn create_command_factory<S: Schema>(schema: &S) -> CommandFactory<'_, S> {
    CommandFactory::new(schema)
}

impl<'a, S: Schema> CommandFactory<'a, S> {
    /// A factory for `schema`'s commands.
    pub fn new(schema: &'a S) -> Self {
        Self { schema }
    }

    /// The schema the commands are validated against.
    pub fn schema(&self) -> &'a S {
        self.schema
    }

    /// A command reading one item.
    pub fn create_get_command(&self, input: GetCommandInput) -> GetCommand {
        GetCommand::new(input)
    }

    /// A command writing one item.
    pub fn create_put_command(&self, input: PutCommandInput) -> PutCommand {
        PutCommand::new(input)
    }

    /// A command querying items.
    pub fn create_query_command(&self, input: QueryCommandInput) -> QueryCommand {
        QueryCommand::new(input)
    }
}
