/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! HTTP clients useful for testing.

use crate::handler::HandlerOptions;
use crate::http::{HttpClient, HttpRequest, HttpResponse};
use crate::BoxFallibleFut;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Captures every request and answers each with a copy of the same response.
#[derive(Clone, Debug)]
pub struct CaptureRequest {
    response: Arc<HttpResponse>,
    captured: Arc<Mutex<Captured>>,
}

#[derive(Debug, Default)]
struct Captured {
    requests: Vec<HttpRequest>,
    options: Vec<HandlerOptions>,
}

impl CaptureRequest {
    /// Answer every request with `response`.
    pub fn new(response: HttpResponse) -> Self {
        Self {
            response: Arc::new(response),
            captured: Default::default(),
        }
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.captured.lock().unwrap().requests.len()
    }

    /// Take the oldest captured request.
    ///
    /// # Panics
    /// If no request was received.
    pub fn expect_request(&self) -> HttpRequest {
        let mut captured = self.captured.lock().unwrap();
        assert!(!captured.requests.is_empty(), "no request was received");
        captured.requests.remove(0)
    }

    /// The options each call was made with, oldest first.
    pub fn received_options(&self) -> Vec<HandlerOptions> {
        self.captured.lock().unwrap().options.clone()
    }

    fn respond(&self) -> HttpResponse {
        let mut builder = http::Response::builder()
            .status(self.response.status())
            .version(self.response.version());
        for (name, value) in self.response.headers() {
            builder = builder.header(name, value);
        }
        builder
            .body(self.response.body().clone())
            .expect("copy of a valid response")
    }
}

impl HttpClient for CaptureRequest {
    fn call(&self, request: HttpRequest, options: &HandlerOptions) -> BoxFallibleFut<HttpResponse> {
        {
            let mut captured = self.captured.lock().unwrap();
            captured.requests.push(request);
            captured.options.push(*options);
        }
        let response = self.respond();
        Box::pin(async move { Ok(response) })
    }
}

/// An HTTP client that maps each request to a response with a closure.
#[derive(Clone)]
pub struct InfallibleClient {
    handler: Arc<dyn Fn(HttpRequest) -> HttpResponse + Send + Sync>,
}

impl fmt::Debug for InfallibleClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfallibleClient").finish()
    }
}

impl InfallibleClient {
    /// Answer with `handler(request)`.
    pub fn new(handler: impl Fn(HttpRequest) -> HttpResponse + Send + Sync + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }
}

impl HttpClient for InfallibleClient {
    fn call(&self, request: HttpRequest, _options: &HandlerOptions) -> BoxFallibleFut<HttpResponse> {
        let response = (self.handler)(request);
        Box::pin(async move { Ok(response) })
    }
}
