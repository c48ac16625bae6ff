/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Document commands.
//!
//! A [`DocumentCommand`] carries a structured input and wraps the transport
//! command for the same operation. The transport command is built eagerly from
//! the structured input and owns the middleware stack; the document command
//! only adds the [`marshalling`] pair to it on resolve.

pub mod marshalling;

mod get;
mod put;
mod query;

pub use get::{Get, GetCommand, GetCommandInput, GetCommandOutput};
pub use put::{Put, PutCommand, PutCommandInput, PutCommandOutput};
pub use query::{Query, QueryCommand, QueryCommandInput, QueryCommandOutput};

use crate::document_client::DocumentClientResolvedConfig;
use crate::key_node::KeyNode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use zynamo_dynamodb::command::OperationCommand;
use zynamo_dynamodb::operation::Operation;
use zynamo_runtime::command::{Command, CommandHandler};
use zynamo_runtime::handler::HandlerOptions;
use zynamo_runtime::metadata::HasMetadata;
use zynamo_runtime::middleware::MiddlewareStack;
use zynamo_runtime::SdkError;

/// The structured counterpart of a transport [`Operation`].
pub trait DocumentOperation: Send + Sync + 'static {
    /// The wrapped transport operation.
    type Operation: Operation;
    /// Input with items in structured form.
    type Input: Serialize + fmt::Debug + Clone + Send + Sync + 'static;
    /// Output with items in structured form.
    type Output: DeserializeOwned + HasMetadata + Send + Sync + 'static;

    /// Input fields holding items.
    const INPUT_KEY_NODES: &'static [KeyNode];
    /// Output fields holding items.
    const OUTPUT_KEY_NODES: &'static [KeyNode];
}

/// A command sending `D` with structured items.
pub struct DocumentCommand<D: DocumentOperation> {
    input: D::Input,
    client_command: OperationCommand<D::Operation, D::Input, D::Output>,
}

impl<D: DocumentOperation> fmt::Debug for DocumentCommand<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentCommand")
            .field("input", &self.input)
            .field("client_command", &self.client_command)
            .finish()
    }
}

impl<D: DocumentOperation> DocumentCommand<D> {
    /// A command sending `input`.
    pub fn new(input: D::Input) -> Self {
        let client_command = OperationCommand::new(input.clone());
        Self {
            input,
            client_command,
        }
    }

    /// The structured input.
    pub fn input(&self) -> &D::Input {
        &self.input
    }

    /// The wrapped command's middleware stack.
    pub fn middleware_stack(&mut self) -> &mut MiddlewareStack {
        self.client_command.middleware_stack()
    }

    /// Input fields holding items.
    pub fn input_key_nodes(&self) -> &'static [KeyNode] {
        D::INPUT_KEY_NODES
    }

    /// Output fields holding items.
    pub fn output_key_nodes(&self) -> &'static [KeyNode] {
        D::OUTPUT_KEY_NODES
    }
}

impl<D: DocumentOperation> Command<DocumentClientResolvedConfig> for DocumentCommand<D> {
    type Input = D::Input;
    type Output = D::Output;
    type Error = zynamo_dynamodb::Error;

    fn input(&self) -> &D::Input {
        &self.input
    }

    fn middleware_stack(&mut self) -> &mut MiddlewareStack {
        self.client_command.middleware_stack()
    }

    fn resolve_middleware(
        &mut self,
        client_stack: &MiddlewareStack,
        configuration: &DocumentClientResolvedConfig,
        options: &HandlerOptions,
    ) -> Result<CommandHandler<D::Output, Self::Error>, SdkError<Self::Error>> {
        marshalling::install::<D>(
            self.client_command.middleware_stack(),
            self.input.clone(),
            &configuration.translate_config(),
        )
        .map_err(SdkError::<Self::Error>::construction_failure)?;
        self.client_command
            .resolve_middleware(client_stack, configuration, options)
    }
}

#[cfg(test)]
mod test {
    use super::marshalling::{DOCUMENT_MARSHALL, DOCUMENT_UNMARSHALL};
    use super::*;
    use crate::document_client::DocumentClientResolvedConfig;
    use serde_json::json;
    use std::sync::Arc;
    use zynamo_dynamodb::config::NoHttpClient;
    use zynamo_dynamodb::operation::get_item::GetItemInput;
    use zynamo_dynamodb::protocol::{DESERIALIZER_MIDDLEWARE, SERIALIZER_MIDDLEWARE};
    use zynamo_dynamodb::Config;

    fn config() -> DocumentClientResolvedConfig {
        DocumentClientResolvedConfig::new(
            Arc::new(Config::builder().http_client(NoHttpClient::default()).build()),
            None,
        )
    }

    fn key() -> zynamo_types::Item {
        json!({"foo": "bar"}).as_object().cloned().unwrap()
    }

    #[test]
    fn resolving_twice_installs_each_middleware_once() {
        let config = config();
        let mut command = GetCommand::new(GetItemInput::new("table", key()));
        for _ in 0..2 {
            let handler = command
                .resolve_middleware(&MiddlewareStack::new(), &config, &HandlerOptions::default())
                .unwrap();
            assert_eq!(handler.context().command_name(), "GetItemCommand");
        }
        let stack = Command::middleware_stack(&mut command);
        assert_eq!(stack.len(), 4);
        assert_eq!(
            stack.identify(),
            vec![
                format!("{} - before {}", DOCUMENT_MARSHALL, SERIALIZER_MIDDLEWARE),
                format!("{} - serialize", SERIALIZER_MIDDLEWARE),
                format!("{} - before {}", DOCUMENT_UNMARSHALL, DESERIALIZER_MIDDLEWARE),
                format!("{} - deserialize", DESERIALIZER_MIDDLEWARE),
            ]
        );
    }

    #[test]
    fn middleware_stack_is_the_wrapped_commands() {
        let mut command = GetCommand::new(GetItemInput::new("table", key()));
        assert!(command.middleware_stack().is_empty());
        command
            .resolve_middleware(&MiddlewareStack::new(), &config(), &HandlerOptions::default())
            .unwrap();
        assert!(command.middleware_stack().contains(SERIALIZER_MIDDLEWARE));
        assert!(command.middleware_stack().contains(DOCUMENT_MARSHALL));
    }

    #[test]
    fn key_nodes_follow_the_operation() {
        let command = GetCommand::new(GetItemInput::new("table", key()));
        assert_eq!(command.input_key_nodes(), &[KeyNode::new("Key")]);
        assert_eq!(command.output_key_nodes(), &[KeyNode::new("Item")]);
        assert_eq!(command.input().table_name, "table");
    }
}
