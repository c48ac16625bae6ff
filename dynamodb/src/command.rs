/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Transport commands.
//!
//! An [`OperationCommand`] carries one operation input and the command's own
//! middleware stack. On resolve it installs the protocol middleware for the
//! operation, appends its stack to the client's and binds the chain to the
//! configured HTTP client.
//!
//! The input and output types default to the operation's wire shapes. A command
//! may carry another input type `I` as long as middleware placed before
//! [`SERIALIZER_MIDDLEWARE`](crate::protocol::SERIALIZER_MIDDLEWARE) converts it
//! to `Op::Input`, and likewise for `O` after
//! [`DESERIALIZER_MIDDLEWARE`](crate::protocol::DESERIALIZER_MIDDLEWARE).

use crate::config::Config;
use crate::error::Error;
use crate::operation::create_table::{CreateTable, CreateTableInput, CreateTableOutput};
use crate::operation::delete_table::{DeleteTable, DeleteTableInput, DeleteTableOutput};
use crate::operation::get_item::{GetItem, GetItemInput, GetItemOutput};
use crate::operation::put_item::{PutItem, PutItemInput, PutItemOutput};
use crate::operation::query::{Query, QueryInput, QueryOutput};
use crate::operation::Operation;
use crate::{protocol, sensitive, CLIENT_NAME};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use zynamo_runtime::command::{Command, CommandHandler};
use zynamo_runtime::context::HandlerExecutionContext;
use zynamo_runtime::handler::{HandlerOptions, HttpHandler};
use zynamo_runtime::middleware::MiddlewareStack;
use zynamo_runtime::type_erasure::TypeErasedBox;
use zynamo_runtime::SdkError;

/// A command sending `Op`.
pub struct OperationCommand<Op, I = <Op as Operation>::Input, O = <Op as Operation>::Output>
where
    Op: Operation,
{
    input: I,
    middleware_stack: MiddlewareStack,
    _operation: PhantomData<fn() -> (Op, O)>,
}

/// Sends `GetItem`.
pub type GetItemCommand<I = GetItemInput, O = GetItemOutput> = OperationCommand<GetItem, I, O>;
/// Sends `PutItem`.
pub type PutItemCommand<I = PutItemInput, O = PutItemOutput> = OperationCommand<PutItem, I, O>;
/// Sends `Query`.
pub type QueryCommand<I = QueryInput, O = QueryOutput> = OperationCommand<Query, I, O>;
/// Sends `CreateTable`.
pub type CreateTableCommand = OperationCommand<CreateTable, CreateTableInput, CreateTableOutput>;
/// Sends `DeleteTable`.
pub type DeleteTableCommand = OperationCommand<DeleteTable, DeleteTableInput, DeleteTableOutput>;

impl<Op: Operation, I: fmt::Debug, O> fmt::Debug for OperationCommand<Op, I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationCommand")
            .field("operation", &Op::NAME)
            .field("input", &self.input)
            .field("middleware_stack", &self.middleware_stack)
            .finish()
    }
}

impl<Op: Operation, I, O> OperationCommand<Op, I, O> {
    /// A command sending `input`, with an empty stack of its own.
    pub fn new(input: I) -> Self {
        Self {
            input,
            middleware_stack: MiddlewareStack::new(),
            _operation: PhantomData,
        }
    }

    /// The input.
    pub fn input(&self) -> &I {
        &self.input
    }

    /// The command's own middleware. Concatenated after the client's stack on resolve.
    pub fn middleware_stack(&mut self) -> &mut MiddlewareStack {
        &mut self.middleware_stack
    }

    /// The command name reported in the execution context, such as `GetItemCommand`.
    pub fn command_name() -> String {
        format!("{}Command", Op::NAME)
    }
}

impl<Op, I, O, C> Command<C> for OperationCommand<Op, I, O>
where
    Op: Operation,
    I: Clone + Send + Sync + 'static,
    O: Send + Sync + 'static,
    C: AsRef<Config>,
{
    type Input = I;
    type Output = O;
    type Error = Error;

    fn input(&self) -> &I {
        &self.input
    }

    fn middleware_stack(&mut self) -> &mut MiddlewareStack {
        &mut self.middleware_stack
    }

    fn resolve_middleware(
        &mut self,
        client_stack: &MiddlewareStack,
        configuration: &C,
        options: &HandlerOptions,
    ) -> Result<CommandHandler<O, Error>, SdkError<Error>> {
        let config = configuration.as_ref();
        protocol::install::<Op>(&mut self.middleware_stack, config)
            .map_err(SdkError::<Error>::construction_failure)?;
        let chain = client_stack
            .concat(&self.middleware_stack)
            .and_then(|stack| stack.resolve(Arc::new(HttpHandler::new(config.http_client().clone()))))
            .map_err(SdkError::<Error>::construction_failure)?;
        let context = HandlerExecutionContext::new(CLIENT_NAME, Self::command_name())
            .with_input_filter(sensitive::filter::<Op::Input>())
            .with_output_filter(sensitive::filter::<Op::Output>());
        Ok(CommandHandler::new(
            chain,
            context,
            TypeErasedBox::new(self.input.clone()),
            options,
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::NoHttpClient;
    use crate::protocol::{DESERIALIZER_MIDDLEWARE, SERIALIZER_MIDDLEWARE};

    #[test]
    fn resolving_twice_does_not_duplicate_protocol_middleware() {
        let config = Config::builder().http_client(NoHttpClient).build();
        let mut command = DeleteTableCommand::new(DeleteTableInput::new("users"));
        let options = HandlerOptions::default();
        for _ in 0..2 {
            let handler = command
                .resolve_middleware(&MiddlewareStack::new(), &config, &options)
                .unwrap();
            assert_eq!(handler.context().command_name(), "DeleteTableCommand");
            assert_eq!(handler.context().client_name(), CLIENT_NAME);
        }
        let stack = command.middleware_stack();
        assert_eq!(stack.len(), 2);
        assert!(stack.contains(SERIALIZER_MIDDLEWARE));
        assert!(stack.contains(DESERIALIZER_MIDDLEWARE));
    }
}
