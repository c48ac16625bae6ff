/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! A client: resolved configuration plus a middleware stack.

use crate::command::Command;
use crate::handler::HandlerOptions;
use crate::middleware::MiddlewareStack;
use crate::result::SdkError;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Sends [`Command`]s.
///
/// `C` is the resolved configuration. Configuration and middleware stack are
/// shared: clones of a client, and clients built with [`Client::from_parts`]
/// from another client's parts, see the same configuration and the same stack.
pub struct Client<C> {
    config: Arc<C>,
    middleware_stack: Arc<RwLock<MiddlewareStack>>,
}

impl<C> Clone for Client<C> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            middleware_stack: self.middleware_stack.clone(),
        }
    }
}

impl<C> fmt::Debug for Client<C>
where
    C: fmt::Debug + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("middleware_stack", &self.middleware_stack())
            .finish()
    }
}

impl<C> Client<C>
where
    C: Send + Sync + 'static,
{
    /// A client with `config` and an empty middleware stack.
    pub fn new(config: C) -> Self {
        Self::from_parts(
            Arc::new(config),
            Arc::new(RwLock::new(MiddlewareStack::new())),
        )
    }

    /// A client from shared configuration and a shared middleware stack.
    pub fn from_parts(config: Arc<C>, middleware_stack: Arc<RwLock<MiddlewareStack>>) -> Self {
        Self {
            config,
            middleware_stack,
        }
    }

    /// The resolved configuration.
    pub fn config(&self) -> &C {
        &self.config
    }

    /// The shared resolved configuration.
    pub fn shared_config(&self) -> Arc<C> {
        self.config.clone()
    }

    /// The shared middleware stack.
    pub fn shared_middleware_stack(&self) -> Arc<RwLock<MiddlewareStack>> {
        self.middleware_stack.clone()
    }

    /// A snapshot of the middleware stack.
    pub fn middleware_stack(&self) -> MiddlewareStack {
        self.middleware_stack
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Modify the middleware stack. Affects every client sharing it.
    pub fn with_middleware_stack<R>(&self, f: impl FnOnce(&mut MiddlewareStack) -> R) -> R {
        let mut stack = self
            .middleware_stack
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut stack)
    }

    /// Send `command` with default options.
    pub async fn send<Cmd>(&self, command: Cmd) -> Result<Cmd::Output, SdkError<Cmd::Error>>
    where
        Cmd: Command<C>,
    {
        self.send_with_options(command, HandlerOptions::default())
            .await
    }

    /// Send `command`. `options` are forwarded to the HTTP client.
    pub async fn send_with_options<Cmd>(
        &self,
        mut command: Cmd,
        options: HandlerOptions,
    ) -> Result<Cmd::Output, SdkError<Cmd::Error>>
    where
        Cmd: Command<C>,
    {
        let stack = self.middleware_stack();
        let handler = command.resolve_middleware(&stack, &self.config, &options)?;
        handler.invoke().await
    }
}
