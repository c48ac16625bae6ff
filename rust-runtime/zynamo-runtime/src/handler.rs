/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! What flows through the middleware chain, and the terminal handler that ends it.

use crate::context::HandlerExecutionContext;
use crate::http::{HttpClient, HttpRequest, HttpResponse, SharedHttpClient};
use crate::result::SdkError;
use crate::type_erasure::TypeErasedBox;
use crate::{BoxError, BoxFuture};
use std::fmt;
use std::time::Duration;

/// The result of running (part of) a middleware chain.
///
/// Service errors stay boxed until the command narrows them.
pub type HandlerResult = Result<HandlerOutput, SdkError<BoxError>>;

/// Per-call options, forwarded to the [`HttpClient`] untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct HandlerOptions {
    /// Upper bound on the time the connector may spend on this call.
    pub timeout: Option<Duration>,
}

impl HandlerOptions {
    /// Options with a timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

/// The arguments passed down the chain.
#[derive(Debug)]
pub struct HandlerArguments {
    /// The in-flight input. Middleware may replace it.
    pub input: TypeErasedBox,
    /// The HTTP request, once a serializer has produced it.
    pub request: Option<HttpRequest>,
}

impl HandlerArguments {
    /// Arguments carrying `input` and no request yet.
    pub fn new(input: TypeErasedBox) -> Self {
        Self {
            input,
            request: None,
        }
    }
}

/// What comes back up the chain.
#[derive(Debug, Default)]
pub struct HandlerOutput {
    /// The in-flight output, once a deserializer has produced it.
    pub output: Option<TypeErasedBox>,
    /// The raw HTTP response.
    pub response: Option<HttpResponse>,
}

impl HandlerOutput {
    /// Output holding only the raw response.
    pub fn from_response(response: HttpResponse) -> Self {
        Self {
            output: None,
            response: Some(response),
        }
    }
}

/// The innermost handler of a chain.
pub trait Handler: Send + Sync + fmt::Debug {
    /// Handle `args`.
    fn handle<'a>(
        &'a self,
        args: HandlerArguments,
        context: &'a mut HandlerExecutionContext,
    ) -> BoxFuture<'a, HandlerResult>;
}

/// Terminal handler that sends the serialized request over an [`HttpClient`].
#[derive(Clone, Debug)]
pub struct HttpHandler {
    client: SharedHttpClient,
}

impl HttpHandler {
    /// Dispatch through `client`.
    pub fn new(client: SharedHttpClient) -> Self {
        Self { client }
    }
}

impl Handler for HttpHandler {
    fn handle<'a>(
        &'a self,
        args: HandlerArguments,
        context: &'a mut HandlerExecutionContext,
    ) -> BoxFuture<'a, HandlerResult> {
        let options = context
            .attributes()
            .get::<HandlerOptions>()
            .copied()
            .unwrap_or_default();
        Box::pin(async move {
            let request = args.request.ok_or_else(|| {
                SdkError::<BoxError>::construction_failure("no serializer produced an HTTP request")
            })?;
            tracing::trace!(method = %request.method(), uri = %request.uri(), "dispatching request");
            let response = self
                .client
                .call(request, &options)
                .await
                .map_err(SdkError::<BoxError>::DispatchFailure)?;
            tracing::trace!(status = %response.status(), "received response");
            Ok(HandlerOutput::from_response(response))
        })
    }
}
