/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! An [`HttpClient`] backed by hyper 1.x.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::{Connect, HttpConnector};
use hyper_util::client::legacy::Client as LegacyClient;
use hyper_util::rt::TokioExecutor;
use std::error::Error;
use std::fmt;
use std::time::Duration;
use zynamo_runtime::handler::HandlerOptions;
use zynamo_runtime::http::{HttpClient, HttpRequest, HttpResponse};
use zynamo_runtime::{BoxError, BoxFallibleFut};

/// The exchange did not finish within [`HandlerOptions::timeout`].
///
/// Returned boxed inside [`SdkError::DispatchFailure`](zynamo_runtime::SdkError::DispatchFailure),
/// so callers can tell it apart with `downcast_ref::<TimedOutError>()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimedOutError {
    timeout: Duration,
}

impl TimedOutError {
    /// The timeout that elapsed.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl fmt::Display for TimedOutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request timed out after {:?}", self.timeout)
    }
}

impl Error for TimedOutError {}

/// Sends requests with a pooled hyper client.
///
/// [`HandlerOptions::timeout`] bounds the whole exchange, body included.
#[derive(Clone)]
pub struct HyperClient<C = HttpsConnector<HttpConnector>> {
    client: LegacyClient<C, Full<Bytes>>,
}

impl<C> fmt::Debug for HyperClient<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HyperClient").finish_non_exhaustive()
    }
}

impl HyperClient {
    /// A client speaking HTTPS and plain HTTP, trusting Mozilla's root certificates.
    ///
    /// This is the client a [`Config`](crate::Config) uses unless another one is set.
    pub fn https() -> Self {
        let mut http = HttpConnector::new();
        http.enforce_http(false);
        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .wrap_connector(http);
        Self::new(connector)
    }
}

impl HyperClient<HttpConnector> {
    /// A plain HTTP client, enough for DynamoDB Local.
    pub fn http() -> Self {
        Self::new(HttpConnector::new())
    }
}

impl<C> HyperClient<C>
where
    C: Connect + Clone + Send + Sync + 'static,
{
    /// A client connecting with `connector`.
    pub fn new(connector: C) -> Self {
        Self {
            client: LegacyClient::builder(TokioExecutor::new()).build(connector),
        }
    }
}

impl<C> HttpClient for HyperClient<C>
where
    C: Connect + Clone + Send + Sync + 'static,
{
    fn call(&self, request: HttpRequest, options: &HandlerOptions) -> BoxFallibleFut<HttpResponse> {
        let client = self.client.clone();
        let timeout = options.timeout;
        Box::pin(async move {
            let exchange = async move {
                let response: http::Response<hyper::body::Incoming> =
                    client.request(request.map(Full::new)).await?;
                let (parts, body) = response.into_parts();
                let body = body.collect().await?.to_bytes();
                Ok::<_, BoxError>(http::Response::from_parts(parts, body))
            };
            match timeout {
                Some(timeout) => tokio::time::timeout(timeout, exchange)
                    .await
                    .map_err(|_| BoxError::from(TimedOutError { timeout }))?,
                None => exchange.await,
            }
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    fn request(uri: String) -> HttpRequest {
        http::Request::builder()
            .method("POST")
            .uri(uri)
            .body(Bytes::from_static(b"{}"))
            .unwrap()
    }

    #[tokio::test]
    async fn https_client_opens_a_tls_session() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut first = [0u8; 1];
            socket.read_exact(&mut first).await.unwrap();
            first[0]
        });

        let client = HyperClient::https();
        let _ = client
            .call(
                request(format!("https://{}", address)),
                &HandlerOptions::with_timeout(Duration::from_millis(500)),
            )
            .await;

        // 0x16 opens a TLS handshake record.
        assert_eq!(server.await.unwrap(), 0x16);
    }

    #[tokio::test]
    async fn timeouts_are_typed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let err = HyperClient::http()
            .call(
                request(format!("http://{}", address)),
                &HandlerOptions::with_timeout(Duration::from_millis(50)),
            )
            .await
            .unwrap_err();

        let timed_out = err.downcast_ref::<TimedOutError>().expect("timeout error");
        assert_eq!(timed_out.timeout(), Duration::from_millis(50));
    }
}
