/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The command contract and the resolved handler a command produces.

use crate::context::HandlerExecutionContext;
use crate::handler::{HandlerArguments, HandlerOptions};
use crate::middleware::{MiddlewareStack, ResolvedMiddleware};
use crate::result::SdkError;
use crate::type_erasure::TypeErasedBox;
use std::error::Error;
use std::fmt;
use std::marker::PhantomData;
use tracing::Instrument;

/// A request that can be sent by a [`Client`](crate::Client) configured with `C`.
pub trait Command<C>: Send {
    /// The input the command was built from.
    type Input: Send + Sync + 'static;
    /// What a successful call returns.
    type Output: Send + Sync + 'static;
    /// The service's modeled error.
    type Error: Error + Send + Sync + 'static;

    /// The input.
    fn input(&self) -> &Self::Input;

    /// Middleware specific to this command. Concatenated after the client's stack on resolve.
    fn middleware_stack(&mut self) -> &mut MiddlewareStack;

    /// Combine `client_stack` with this command's stack and resolve the result
    /// into a handler bound to this command's input.
    fn resolve_middleware(
        &mut self,
        client_stack: &MiddlewareStack,
        configuration: &C,
        options: &HandlerOptions,
    ) -> Result<CommandHandler<Self::Output, Self::Error>, SdkError<Self::Error>>;
}

/// A resolved command: its middleware chain, execution context and input.
///
/// Invoking it runs the chain once.
pub struct CommandHandler<O, E> {
    chain: ResolvedMiddleware,
    context: HandlerExecutionContext,
    input: TypeErasedBox,
    _phantom: PhantomData<fn() -> (O, E)>,
}

impl<O, E> fmt::Debug for CommandHandler<O, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandHandler")
            .field("chain", &self.chain)
            .field("context", &self.context)
            .field("input", &self.input)
            .finish()
    }
}

impl<O, E> CommandHandler<O, E>
where
    O: Send + Sync + 'static,
    E: Error + Send + Sync + 'static,
{
    /// Bind `chain` to `context` and `input`. `options` are made available to the
    /// chain through the context attributes.
    pub fn new(
        chain: ResolvedMiddleware,
        mut context: HandlerExecutionContext,
        input: TypeErasedBox,
        options: &HandlerOptions,
    ) -> Self {
        context.attributes_mut().insert(*options);
        Self {
            chain,
            context,
            input,
            _phantom: PhantomData,
        }
    }

    /// The execution context the chain will run with.
    pub fn context(&self) -> &HandlerExecutionContext {
        &self.context
    }

    /// Run the chain and narrow the result to `O` and `E`.
    pub async fn invoke(self) -> Result<O, SdkError<E>> {
        let Self {
            chain,
            mut context,
            input,
            ..
        } = self;
        let span = tracing::debug_span!(
            "send",
            client = %context.client_name(),
            command = %context.command_name()
        );
        async move {
            let output = chain
                .call(HandlerArguments::new(input), &mut context)
                .await
                .map_err(SdkError::downcast_service_error::<E>)?;
            let erased = match (output.output, output.response) {
                (Some(erased), _) => erased,
                (None, Some(raw)) => {
                    return Err(SdkError::ResponseError {
                        raw,
                        err: "no deserializer produced an output".into(),
                    })
                }
                (None, None) => {
                    return Err(SdkError::construction_failure(
                        "the handler produced neither an output nor a response",
                    ))
                }
            };
            erased.downcast::<O>().map(|output| *output).map_err(|erased| {
                SdkError::construction_failure(format!(
                    "expected output of type `{}` but the chain produced `{}`",
                    std::any::type_name::<O>(),
                    erased.type_name()
                ))
            })
        }
        .instrument(span)
        .await
    }
}
