/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The HTTP connector seam.

use crate::handler::HandlerOptions;
use crate::BoxFallibleFut;
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;

/// An HTTP request with a fully buffered body.
pub type HttpRequest = http::Request<Bytes>;

/// An HTTP response with a fully buffered body.
pub type HttpResponse = http::Response<Bytes>;

/// Sends HTTP requests.
///
/// Implementations own connection management and any timeout handling. The
/// per-call [`HandlerOptions`] are passed through as given.
pub trait HttpClient: Send + Sync + fmt::Debug {
    /// Send `request` and resolve to the response.
    fn call(&self, request: HttpRequest, options: &HandlerOptions) -> BoxFallibleFut<HttpResponse>;
}

/// A reference-counted [`HttpClient`].
#[derive(Clone, Debug)]
pub struct SharedHttpClient(Arc<dyn HttpClient>);

impl SharedHttpClient {
    /// Wrap `client`.
    pub fn new(client: impl HttpClient + 'static) -> Self {
        Self(Arc::new(client))
    }
}

impl HttpClient for SharedHttpClient {
    fn call(&self, request: HttpRequest, options: &HandlerOptions) -> BoxFallibleFut<HttpResponse> {
        self.0.call(request, options)
    }
}
