/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The two middleware that move a document command across the boundary
//! between its structured and wire forms.
//!
//! [`DocumentMarshall`] sits immediately before the serializer and
//! [`DocumentUnmarshall`] immediately before the deserializer. Both rebind the
//! logger's rendering so logs show the wire shape, which is what the
//! transport's sensitive-data filters understand.

use crate::command::DocumentOperation;
use crate::key_node::{marshall_input, unmarshall_output, KeyNode, TranslateError};
use crate::document_client::TranslateConfig;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::type_name;
use std::fmt;
use std::sync::Arc;
use zynamo_dynamodb::operation::Operation;
use zynamo_dynamodb::protocol::{DESERIALIZER_MIDDLEWARE, SERIALIZER_MIDDLEWARE};
use zynamo_runtime::context::HandlerExecutionContext;
use zynamo_runtime::handler::{HandlerArguments, HandlerResult};
use zynamo_runtime::metadata::HasMetadata;
use zynamo_runtime::middleware::{Middleware, MiddlewareError, MiddlewareStack, Next, RelativeOptions};
use zynamo_runtime::type_erasure::TypeErasedBox;
use zynamo_runtime::{BoxError, BoxFuture, SdkError};
use zynamo_types::{MarshallOptions, UnmarshallOptions};

/// Name of the marshalling middleware.
pub const DOCUMENT_MARSHALL: &str = "DocumentMarshall";

/// Name of the unmarshalling middleware.
pub const DOCUMENT_UNMARSHALL: &str = "DocumentUnmarshall";

type WireInput<D> = <<D as DocumentOperation>::Operation as Operation>::Input;
type WireOutput<D> = <<D as DocumentOperation>::Operation as Operation>::Output;

/// Convert the key node fields of `value` and reinterpret the result as `U`.
fn convert<T, U>(
    value: &T,
    key_nodes: &[KeyNode],
    translate: impl FnOnce(&serde_json::Value, &[KeyNode]) -> Result<serde_json::Value, TranslateError>,
) -> Result<U, TranslateError>
where
    T: Serialize,
    U: DeserializeOwned,
{
    let raw = serde_json::to_value(value)?;
    let translated = translate(&raw, key_nodes)?;
    Ok(serde_json::from_value(translated)?)
}

/// Replaces the in-flight structured input with its wire form.
pub struct DocumentMarshall<D: DocumentOperation> {
    input: D::Input,
    options: MarshallOptions,
}

impl<D: DocumentOperation> fmt::Debug for DocumentMarshall<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentMarshall")
            .field("operation", &type_name::<D>())
            .field("options", &self.options)
            .finish()
    }
}

impl<D: DocumentOperation> DocumentMarshall<D> {
    /// Marshall `input` with `options`.
    pub fn new(input: D::Input, options: MarshallOptions) -> Self {
        Self { input, options }
    }
}

impl<D: DocumentOperation> Middleware for DocumentMarshall<D> {
    fn handle<'a>(
        &'a self,
        mut args: HandlerArguments,
        context: &'a mut HandlerExecutionContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let wire: WireInput<D> = convert(&self.input, D::INPUT_KEY_NODES, |raw, nodes| {
                marshall_input(raw, nodes, &self.options)
            })
            .map_err(SdkError::<BoxError>::construction_failure)?;

            let logged = Arc::new(TypeErasedBox::new(wire.clone()));
            let filter = context.input_filter_sensitive_log().clone();
            context.overrides_mut().input = Some(Arc::new(move || filter(&*logged)));

            args.input = TypeErasedBox::new(wire);
            next.run(args, context).await
        })
    }
}

/// Replaces the deserialized wire output with its structured form.
///
/// Metadata and every field that is not a key node pass through unchanged.
pub struct DocumentUnmarshall<D: DocumentOperation> {
    options: UnmarshallOptions,
    _operation: std::marker::PhantomData<fn() -> D>,
}

impl<D: DocumentOperation> fmt::Debug for DocumentUnmarshall<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentUnmarshall")
            .field("operation", &type_name::<D>())
            .field("options", &self.options)
            .finish()
    }
}

impl<D: DocumentOperation> DocumentUnmarshall<D> {
    /// Unmarshall with `options`.
    pub fn new(options: UnmarshallOptions) -> Self {
        Self {
            options,
            _operation: std::marker::PhantomData,
        }
    }
}

impl<D: DocumentOperation> Middleware for DocumentUnmarshall<D> {
    fn handle<'a>(
        &'a self,
        args: HandlerArguments,
        context: &'a mut HandlerExecutionContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let mut deserialized = next.run(args, &mut *context).await?;
            let Some(erased) = deserialized.output.take() else {
                return Ok(deserialized);
            };
            let wire = erased.downcast::<WireOutput<D>>().map_err(|erased| {
                SdkError::<BoxError>::construction_failure(format!(
                    "{} expects `{}` but the output is `{}`",
                    DOCUMENT_UNMARSHALL,
                    type_name::<WireOutput<D>>(),
                    erased.type_name()
                ))
            })?;

            let structured = convert::<_, D::Output>(&*wire, D::OUTPUT_KEY_NODES, |raw, nodes| {
                unmarshall_output(raw, nodes, &self.options)
            });
            let mut structured = match structured {
                Ok(structured) => structured,
                Err(err) => {
                    return Err(match deserialized.response.take() {
                        Some(raw) => SdkError::ResponseError {
                            raw,
                            err: err.into(),
                        },
                        None => SdkError::construction_failure(err),
                    })
                }
            };
            structured.set_metadata(wire.metadata().clone());

            let logged = Arc::new(TypeErasedBox::new(*wire));
            let filter = context.output_filter_sensitive_log().clone();
            context.overrides_mut().output = Some(Arc::new(move || filter(&*logged)));

            deserialized.output = Some(TypeErasedBox::new(structured));
            Ok(deserialized)
        })
    }
}

/// Add the marshalling pair for `D` to `stack`, replacing any pair from an
/// earlier resolve.
pub fn install<D: DocumentOperation>(
    stack: &mut MiddlewareStack,
    input: D::Input,
    translate_config: &TranslateConfig,
) -> Result<(), MiddlewareError> {
    stack.add_relative_to(
        DocumentMarshall::<D>::new(input, translate_config.marshall_options),
        RelativeOptions::before(SERIALIZER_MIDDLEWARE)
            .name(DOCUMENT_MARSHALL)
            .override_existing(true),
    )?;
    stack.add_relative_to(
        DocumentUnmarshall::<D>::new(translate_config.unmarshall_options),
        RelativeOptions::before(DESERIALIZER_MIDDLEWARE)
            .name(DOCUMENT_UNMARSHALL)
            .override_existing(true),
    )
}
