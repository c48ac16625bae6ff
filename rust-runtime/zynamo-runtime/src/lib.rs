/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The request pipeline shared by zynamo clients.
//!
//! A request is a [`Command`](command::Command). Resolving a command against a
//! client's [`MiddlewareStack`](middleware::MiddlewareStack) produces a
//! [`CommandHandler`](command::CommandHandler): an ordered chain of named
//! [`Middleware`](middleware::Middleware) ending in a terminal
//! [`Handler`](handler::Handler) that dispatches over an
//! [`HttpClient`](http::HttpClient).
//!
//! Middleware run in [`Step`](middleware::Step) order, outermost first:
//! `initialize`, `serialize`, `build`, `finalizeRequest`, `deserialize`. Within
//! a step, higher [`Priority`](middleware::Priority) runs first. Middleware may
//! also be placed relative to another middleware by name.

#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod client;
pub mod command;
pub mod config_bag;
pub mod context;
pub mod handler;
pub mod http;
pub mod logger;
pub mod metadata;
pub mod middleware;
pub mod result;
pub mod type_erasure;

#[cfg(any(test, feature = "test-util"))]
pub mod test_util;

pub use client::Client;
pub use result::SdkError;

use std::future::Future;
use std::pin::Pin;

/// A boxed error that is `Send` and `Sync`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A boxed, `Send` future borrowing for `'a`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A boxed, `Send`, `'static` future that resolves to `Result<T, BoxError>`.
pub type BoxFallibleFut<T> = Pin<Box<dyn Future<Output = Result<T, BoxError>> + Send>>;
