/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Middleware that logs each call with sensitive values filtered.

use crate::context::HandlerExecutionContext;
use crate::handler::{HandlerArguments, HandlerResult};
use crate::metadata::ResponseMetadata;
use crate::middleware::{AddOptions, Middleware, MiddlewareError, MiddlewareStack, Next, Priority, Step};
use crate::BoxFuture;
use tracing::Level;

/// Name the logger is registered under.
pub const LOGGER_MIDDLEWARE: &str = "loggerMiddleware";

/// Logs the client, command, filtered input and output, and response metadata of every call.
///
/// The input and output are rendered with the context's log filters, unless a
/// [`LogFilterOverrides`](crate::context::LogFilterOverrides) entry was set
/// further down the chain.
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct LoggerMiddleware;

impl LoggerMiddleware {
    /// Create the logger.
    pub fn new() -> Self {
        Self
    }

    /// Where the logger sits: outermost in the `initialize` step.
    pub fn add_options() -> AddOptions {
        AddOptions::new(Step::Initialize)
            .name(LOGGER_MIDDLEWARE)
            .priority(Priority::High)
            .override_existing(true)
    }

    /// Add the logger to `stack`.
    pub fn install(stack: &mut MiddlewareStack) -> Result<(), MiddlewareError> {
        stack.add(Self::new(), Self::add_options())
    }
}

impl Middleware for LoggerMiddleware {
    fn handle<'a>(
        &'a self,
        args: HandlerArguments,
        context: &'a mut HandlerExecutionContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let enabled = tracing::enabled!(Level::DEBUG);
            // The input moves down the chain, so render it now.
            let filtered_input =
                enabled.then(|| (context.input_filter_sensitive_log())(&args.input));
            let result = next.run(args, &mut *context).await;
            if !enabled {
                return result;
            }
            let input = match &context.overrides().input {
                Some(render) => render(),
                None => filtered_input.unwrap_or_default(),
            };
            let metadata = context
                .attributes()
                .get::<ResponseMetadata>()
                .cloned()
                .unwrap_or_default();
            match &result {
                Ok(output) => {
                    let output = output
                        .output
                        .as_ref()
                        .map(|o| context.render_output(o))
                        .unwrap_or_default();
                    tracing::debug!(
                        client = %context.client_name(),
                        command = %context.command_name(),
                        input = %input,
                        output = %output,
                        metadata = ?metadata,
                        "call succeeded"
                    );
                }
                Err(err) => {
                    tracing::debug!(
                        client = %context.client_name(),
                        command = %context.command_name(),
                        input = %input,
                        error = %err,
                        metadata = ?metadata,
                        "call failed"
                    );
                }
            }
            result
        })
    }
}
