/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The `awsJson1_0` protocol as middleware.
//!
//! [`SerializerMiddleware`] turns the operation input into a `POST` request,
//! [`DeserializerMiddleware`] turns the response into the operation output or
//! a service [`Error`]. Both are registered under well-known names so other
//! middleware can be placed relative to them.

use crate::config::Config;
use crate::error::Error;
use crate::operation::Operation;
use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT};
use http::Method;
use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use zynamo_runtime::context::HandlerExecutionContext;
use zynamo_runtime::handler::{HandlerArguments, HandlerResult};
use zynamo_runtime::http::HttpRequest;
use zynamo_runtime::metadata::{HasMetadata, ResponseMetadata};
use zynamo_runtime::middleware::{
    AddOptions, Middleware, MiddlewareError, MiddlewareStack, Next, Step,
};
use zynamo_runtime::type_erasure::TypeErasedBox;
use zynamo_runtime::{BoxError, BoxFuture, SdkError};

/// Name of the serializer.
pub const SERIALIZER_MIDDLEWARE: &str = "serializerMiddleware";

/// Name of the deserializer.
pub const DESERIALIZER_MIDDLEWARE: &str = "deserializerMiddleware";

/// Name of the middleware setting `Content-Length`.
pub const CONTENT_LENGTH_MIDDLEWARE: &str = "contentLengthMiddleware";

const JSON_1_0: &str = "application/x-amz-json-1.0";
const TARGET_PREFIX: &str = "DynamoDB_20120810";
const X_AMZ_TARGET: &str = "x-amz-target";

/// Build the `awsJson1_0` request for `input`.
pub fn serialize_request<Op: Operation>(
    input: &Op::Input,
    endpoint_url: &str,
    user_agent: &str,
) -> Result<HttpRequest, BoxError> {
    let body = serde_json::to_vec(input)?;
    let request = http::Request::builder()
        .method(Method::POST)
        .uri(endpoint_url)
        .header(CONTENT_TYPE, JSON_1_0)
        .header(X_AMZ_TARGET, format!("{}.{}", TARGET_PREFIX, Op::NAME))
        .header(USER_AGENT, user_agent)
        .body(Bytes::from(body))?;
    Ok(request)
}

/// The operation named by a request's `X-Amz-Target` header.
pub fn target_operation(request: &HttpRequest) -> Option<&str> {
    request
        .headers()
        .get(X_AMZ_TARGET)?
        .to_str()
        .ok()?
        .strip_prefix(TARGET_PREFIX)?
        .strip_prefix('.')
}

fn user_agent(config: &Config) -> String {
    let mut agent = format!("zynamo/{}", env!("CARGO_PKG_VERSION"));
    if let Some(app_name) = config.app_name() {
        agent.push_str(" app/");
        agent.push_str(app_name);
    }
    agent
}

/// Serializes the in-flight `Op::Input` into the request.
pub struct SerializerMiddleware<Op> {
    endpoint_url: String,
    user_agent: String,
    _operation: PhantomData<fn() -> Op>,
}

impl<Op> fmt::Debug for SerializerMiddleware<Op> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializerMiddleware")
            .field("operation", &type_name::<Op>())
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

impl<Op: Operation> SerializerMiddleware<Op> {
    /// A serializer sending to the endpoint in `config`.
    pub fn new(config: &Config) -> Self {
        Self {
            endpoint_url: config.endpoint_url().to_string(),
            user_agent: user_agent(config),
            _operation: PhantomData,
        }
    }
}

impl<Op: Operation> Middleware for SerializerMiddleware<Op> {
    fn handle<'a>(
        &'a self,
        mut args: HandlerArguments,
        context: &'a mut HandlerExecutionContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let input = args.input.downcast_ref::<Op::Input>().ok_or_else(|| {
                SdkError::<BoxError>::construction_failure(format!(
                    "{} expects `{}` but the input is `{}`",
                    SERIALIZER_MIDDLEWARE,
                    type_name::<Op::Input>(),
                    args.input.type_name()
                ))
            })?;
            let request = serialize_request::<Op>(input, &self.endpoint_url, &self.user_agent)
                .map_err(SdkError::<BoxError>::ConstructionFailure)?;
            args.request = Some(request);
            next.run(args, context).await
        })
    }
}

/// Deserializes the response into `Op::Output`, or a service [`Error`].
///
/// The response metadata is recorded in the context attributes either way.
pub struct DeserializerMiddleware<Op> {
    _operation: PhantomData<fn() -> Op>,
}

impl<Op> fmt::Debug for DeserializerMiddleware<Op> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeserializerMiddleware")
            .field("operation", &type_name::<Op>())
            .finish()
    }
}

impl<Op: Operation> Default for DeserializerMiddleware<Op> {
    fn default() -> Self {
        Self {
            _operation: PhantomData,
        }
    }
}

impl<Op: Operation> Middleware for DeserializerMiddleware<Op> {
    fn handle<'a>(
        &'a self,
        args: HandlerArguments,
        context: &'a mut HandlerExecutionContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let mut output = next.run(args, &mut *context).await?;
            let response = output.response.take().ok_or_else(|| {
                SdkError::<BoxError>::construction_failure("no response to deserialize")
            })?;
            let metadata = ResponseMetadata::from_response(&response);
            context.attributes_mut().insert(metadata.clone());

            if !response.status().is_success() {
                let err = Error::from_response(&response);
                tracing::debug!(code = %err.code(), status = %response.status(), "service returned an error");
                return Err(SdkError::ServiceError {
                    raw: response,
                    err: Box::new(err) as BoxError,
                });
            }
            match serde_json::from_slice::<Op::Output>(response.body()) {
                Ok(mut parsed) => {
                    parsed.set_metadata(metadata);
                    output.output = Some(TypeErasedBox::new(parsed));
                    output.response = Some(response);
                    Ok(output)
                }
                Err(err) => Err(SdkError::ResponseError {
                    raw: response,
                    err: err.into(),
                }),
            }
        })
    }
}

/// Sets `Content-Length` from the serialized body.
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct ContentLengthMiddleware;

impl ContentLengthMiddleware {
    /// Add the middleware to the `build` step of `stack`.
    pub fn install(stack: &mut MiddlewareStack) -> Result<(), MiddlewareError> {
        stack.add(
            Self,
            AddOptions::new(Step::Build)
                .name(CONTENT_LENGTH_MIDDLEWARE)
                .override_existing(true),
        )
    }
}

impl Middleware for ContentLengthMiddleware {
    fn handle<'a>(
        &'a self,
        mut args: HandlerArguments,
        context: &'a mut HandlerExecutionContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult> {
        if let Some(request) = args.request.as_mut() {
            let length = request.body().len();
            request
                .headers_mut()
                .insert(CONTENT_LENGTH, HeaderValue::from(length));
        }
        next.run(args, context)
    }
}

/// Add the serializer and deserializer for `Op` to `stack`, replacing any
/// previously installed pair.
pub fn install<Op: Operation>(
    stack: &mut MiddlewareStack,
    config: &Config,
) -> Result<(), MiddlewareError> {
    stack.add(
        SerializerMiddleware::<Op>::new(config),
        AddOptions::new(Step::Serialize)
            .name(SERIALIZER_MIDDLEWARE)
            .override_existing(true),
    )?;
    stack.add(
        DeserializerMiddleware::<Op>::default(),
        AddOptions::new(Step::Deserialize)
            .name(DESERIALIZER_MIDDLEWARE)
            .override_existing(true),
    )
}
