/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! SigV4 request signing.
//!
//! [`SigningMiddleware`] runs in the `finalizeRequest` step, after the body and
//! `Content-Length` are final, and signs the request with credentials loaded
//! from the configured [`ProvideCredentials`] on every call.

use crate::config::Config;
use aws_credential_types::provider::error::CredentialsError;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_credential_types::Credentials;
use aws_sigv4::http_request::{
    sign, SignableBody, SignableRequest, SigningParams, SigningSettings,
};
use aws_sigv4::sign::v4;
use aws_smithy_runtime_api::client::identity::Identity;
use std::time::SystemTime;
use thiserror::Error;
use zynamo_runtime::context::HandlerExecutionContext;
use zynamo_runtime::handler::{HandlerArguments, HandlerResult};
use zynamo_runtime::http::HttpRequest;
use zynamo_runtime::middleware::{AddOptions, Middleware, MiddlewareError, MiddlewareStack, Next, Step};
use zynamo_runtime::{BoxError, BoxFuture, SdkError};

/// Name of the signing middleware.
pub const SIGNING_MIDDLEWARE: &str = "awsAuthMiddleware";

/// Service name requests are signed for.
pub const SIGNING_NAME: &str = "dynamodb";

/// Why a request could not be signed. Always a construction failure: the
/// request is never dispatched.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SigningError {
    /// No credentials provider was configured.
    #[error("no credentials provider is configured; set one with `Config::builder().credentials_provider(..)`")]
    MissingCredentialsProvider,
    /// The provider failed to produce credentials.
    #[error("failed to load credentials from the credentials provider")]
    CredentialsLoadingError(#[source] CredentialsError),
    /// The middleware ran before a request was serialized.
    #[error("no request to sign; the signer must run after the serializer")]
    MissingRequest,
    /// Region, service or time were rejected.
    #[error("invalid signing parameters")]
    InvalidParams(#[source] v4::signing_params::BuildError),
    /// The request could not be canonicalized or signed.
    #[error("signing failed")]
    SigningFailure(#[source] aws_sigv4::http_request::SigningError),
}

/// Sign `request` in place for `region` at `time`.
///
/// Adds `Authorization` and `X-Amz-Date`, plus `X-Amz-Security-Token` when the
/// credentials carry a session token.
pub fn sign_request(
    request: &mut HttpRequest,
    credentials: Credentials,
    region: &str,
    time: SystemTime,
) -> Result<(), SigningError> {
    let identity: Identity = credentials.into();
    let params: SigningParams<'_> = v4::SigningParams::builder()
        .identity(&identity)
        .region(region)
        .name(SIGNING_NAME)
        .time(time)
        .settings(SigningSettings::default())
        .build()
        .map_err(SigningError::InvalidParams)?
        .into();

    // Headers that are not valid UTF-8 cannot be canonicalized; they are left unsigned.
    let headers = request
        .headers()
        .iter()
        .filter_map(|(name, value)| Some((name.as_str(), value.to_str().ok()?)));
    let signable = SignableRequest::new(
        request.method().as_str(),
        request.uri().to_string(),
        headers,
        SignableBody::Bytes(request.body()),
    )
    .map_err(SigningError::SigningFailure)?;
    let (instructions, _signature) = sign(signable, &params)
        .map_err(SigningError::SigningFailure)?
        .into_parts();
    instructions.apply_to_request_http1x(request);
    Ok(())
}

/// Signs every request with SigV4 for the configured region.
#[derive(Clone, Debug)]
pub struct SigningMiddleware {
    credentials_provider: Option<SharedCredentialsProvider>,
    region: String,
}

impl SigningMiddleware {
    /// A signer using the credentials provider and region of `config`.
    pub fn new(config: &Config) -> Self {
        Self {
            credentials_provider: config.credentials_provider().cloned(),
            region: config.signing_region().to_string(),
        }
    }

    /// Add the signer to the `finalizeRequest` step of `stack`.
    pub fn install(self, stack: &mut MiddlewareStack) -> Result<(), MiddlewareError> {
        stack.add(
            self,
            AddOptions::new(Step::FinalizeRequest)
                .name(SIGNING_MIDDLEWARE)
                .override_existing(true),
        )
    }

    async fn sign(&self, request: &mut HttpRequest) -> Result<(), SigningError> {
        let provider = self
            .credentials_provider
            .as_ref()
            .ok_or(SigningError::MissingCredentialsProvider)?;
        let credentials = provider
            .provide_credentials()
            .await
            .map_err(SigningError::CredentialsLoadingError)?;
        sign_request(request, credentials, &self.region, SystemTime::now())
    }
}

impl Middleware for SigningMiddleware {
    fn handle<'a>(
        &'a self,
        mut args: HandlerArguments,
        context: &'a mut HandlerExecutionContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let request = args
                .request
                .as_mut()
                .ok_or(SigningError::MissingRequest)
                .map_err(SdkError::<BoxError>::construction_failure)?;
            if let Err(err) = self.sign(request).await {
                tracing::debug!(error = %err, "request could not be signed");
                return Err(SdkError::construction_failure(err));
            }
            next.run(args, context).await
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use bytes::Bytes;
    use pretty_assertions::assert_eq;
    use std::time::{Duration, UNIX_EPOCH};

    fn request() -> HttpRequest {
        http::Request::builder()
            .method("POST")
            .uri("https://dynamodb.eu-west-1.amazonaws.com/")
            .header("content-type", "application/x-amz-json-1.0")
            .header("x-amz-target", "DynamoDB_20120810.GetItem")
            .body(Bytes::from_static(br#"{"TableName":"users"}"#))
            .unwrap()
    }

    fn new_year() -> SystemTime {
        // 2024-01-01T00:00:00Z
        UNIX_EPOCH + Duration::from_secs(1_704_067_200)
    }

    #[test]
    fn signs_with_a_scoped_credential() {
        let mut request = request();
        let credentials = Credentials::new("AKIDEXAMPLE", "secret", None, None, "test");
        sign_request(&mut request, credentials, "eu-west-1", new_year()).unwrap();

        assert_eq!(request.headers()["x-amz-date"], "20240101T000000Z");
        let authorization = request.headers()["authorization"].to_str().unwrap();
        assert!(
            authorization.starts_with(
                "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20240101/eu-west-1/dynamodb/aws4_request"
            ),
            "{}",
            authorization
        );
        assert!(authorization.contains("x-amz-target"), "{}", authorization);
        assert!(!request.headers().contains_key("x-amz-security-token"));
    }

    #[test]
    fn session_tokens_are_sent() {
        let mut request = request();
        let credentials =
            Credentials::new("AKIDEXAMPLE", "secret", Some("token".into()), None, "test");
        sign_request(&mut request, credentials, "eu-west-1", new_year()).unwrap();
        assert_eq!(request.headers()["x-amz-security-token"], "token");
    }

    #[test]
    fn signature_depends_on_the_body() {
        let credentials = Credentials::new("AKIDEXAMPLE", "secret", None, None, "test");
        let mut first = request();
        sign_request(&mut first, credentials.clone(), "eu-west-1", new_year()).unwrap();
        let mut second = request();
        *second.body_mut() = Bytes::from_static(br#"{"TableName":"other"}"#);
        sign_request(&mut second, credentials, "eu-west-1", new_year()).unwrap();
        assert_ne!(
            first.headers()["authorization"],
            second.headers()["authorization"]
        );
    }
}
