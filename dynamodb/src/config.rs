/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Client configuration.

use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use std::borrow::Cow;
use std::fmt;
use zynamo_runtime::handler::HandlerOptions;
use zynamo_runtime::http::{HttpClient, HttpRequest, HttpResponse, SharedHttpClient};
use zynamo_runtime::BoxFallibleFut;

pub use aws_credential_types::Credentials;

const DEFAULT_REGION: &str = "us-east-1";

/// The AWS region requests are sent to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Region(Cow<'static, str>);

impl Region {
    /// A region from its name, such as `us-east-1`.
    pub fn new(region: impl Into<Cow<'static, str>>) -> Self {
        Self(region.into())
    }

    /// The region name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Region {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolved configuration of a DynamoDB [`Client`](crate::Client).
#[derive(Clone, Debug)]
pub struct Config {
    region: Option<Region>,
    endpoint_url: String,
    http_client: SharedHttpClient,
    credentials_provider: Option<SharedCredentialsProvider>,
    app_name: Option<String>,
}

impl Config {
    /// A new builder.
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// The configured region.
    pub fn region(&self) -> Option<&Region> {
        self.region.as_ref()
    }

    /// The endpoint every request is sent to.
    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    /// The HTTP client requests are dispatched with.
    pub fn http_client(&self) -> &SharedHttpClient {
        &self.http_client
    }

    /// The provider requests are signed with.
    pub fn credentials_provider(&self) -> Option<&SharedCredentialsProvider> {
        self.credentials_provider.as_ref()
    }

    /// The region requests are signed for: the configured one, else `us-east-1`.
    pub fn signing_region(&self) -> &str {
        self.region.as_ref().map(Region::as_str).unwrap_or(DEFAULT_REGION)
    }

    /// The application name sent in the user agent.
    pub fn app_name(&self) -> Option<&str> {
        self.app_name.as_deref()
    }
}

impl AsRef<Config> for Config {
    fn as_ref(&self) -> &Config {
        self
    }
}

/// Builder for [`Config`].
#[derive(Debug, Default)]
pub struct Builder {
    region: Option<Region>,
    endpoint_url: Option<String>,
    http_client: Option<SharedHttpClient>,
    credentials_provider: Option<SharedCredentialsProvider>,
    app_name: Option<String>,
}

impl Builder {
    /// Set the region.
    pub fn region(mut self, region: impl Into<Cow<'static, str>>) -> Self {
        self.region = Some(Region::new(region));
        self
    }

    /// Override the endpoint, for example to reach DynamoDB Local.
    pub fn endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Set the HTTP client.
    pub fn http_client(mut self, http_client: impl HttpClient + 'static) -> Self {
        self.http_client = Some(SharedHttpClient::new(http_client));
        self
    }

    /// Set the credentials requests are signed with.
    ///
    /// [`Credentials`] is itself a provider of fixed credentials. Without a
    /// provider every call fails before it is dispatched.
    pub fn credentials_provider(
        mut self,
        credentials_provider: impl ProvideCredentials + 'static,
    ) -> Self {
        self.credentials_provider = Some(SharedCredentialsProvider::new(credentials_provider));
        self
    }

    /// Set the application name.
    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    /// Resolve the configuration.
    ///
    /// Without an explicit endpoint the regional endpoint is used
    /// (`https://dynamodb.{region}.amazonaws.com`, `us-east-1` if no region is set).
    pub fn build(self) -> Config {
        let endpoint_url = self.endpoint_url.unwrap_or_else(|| {
            let region = self.region.as_ref().map(Region::as_str).unwrap_or(DEFAULT_REGION);
            format!("https://dynamodb.{}.amazonaws.com", region)
        });
        Config {
            region: self.region,
            endpoint_url,
            http_client: self.http_client.unwrap_or_else(default_http_client),
            credentials_provider: self.credentials_provider,
            app_name: self.app_name,
        }
    }
}

#[cfg(feature = "rt-tokio")]
fn default_http_client() -> SharedHttpClient {
    SharedHttpClient::new(crate::hyper_client::HyperClient::https())
}

#[cfg(not(feature = "rt-tokio"))]
fn default_http_client() -> SharedHttpClient {
    SharedHttpClient::new(NoHttpClient)
}

/// An HTTP client that fails every request. Used when no client was configured
/// and no default client is compiled in.
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct NoHttpClient;

impl HttpClient for NoHttpClient {
    fn call(&self, _request: HttpRequest, _options: &HandlerOptions) -> BoxFallibleFut<HttpResponse> {
        Box::pin(async {
            Err("no HTTP client was configured; set one with `Config::builder().http_client(..)`".into())
        })
    }
}
