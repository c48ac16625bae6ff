/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The DynamoDB client.

use crate::command::{
    CreateTableCommand, DeleteTableCommand, GetItemCommand, PutItemCommand, QueryCommand,
};
use crate::config::Config;
use crate::error::Error;
use crate::operation::create_table::{CreateTableInput, CreateTableOutput};
use crate::operation::delete_table::{DeleteTableInput, DeleteTableOutput};
use crate::operation::get_item::{GetItemInput, GetItemOutput};
use crate::operation::put_item::{PutItemInput, PutItemOutput};
use crate::operation::query::{QueryInput, QueryOutput};
use crate::protocol::ContentLengthMiddleware;
use crate::signing::SigningMiddleware;
use zynamo_runtime::command::Command;
use zynamo_runtime::handler::HandlerOptions;
use zynamo_runtime::logger::LoggerMiddleware;
use zynamo_runtime::middleware::MiddlewareStack;
use zynamo_runtime::SdkError;

/// A DynamoDB client.
///
/// Cloning is cheap: clones share the configuration and the middleware stack.
#[derive(Clone, Debug)]
pub struct Client {
    inner: zynamo_runtime::Client<Config>,
}

impl Client {
    /// A client for `config`, with the logger, `Content-Length` and SigV4
    /// signing middleware installed.
    pub fn from_conf(config: Config) -> Self {
        let signer = SigningMiddleware::new(&config);
        let inner = zynamo_runtime::Client::new(config);
        inner.with_middleware_stack(|stack| install_default_middleware(stack, signer));
        Self { inner }
    }

    /// The configuration.
    pub fn config(&self) -> &Config {
        self.inner.config()
    }

    /// The underlying pipeline client. Other clients built from its parts share
    /// this client's configuration and middleware stack.
    pub fn runtime_client(&self) -> &zynamo_runtime::Client<Config> {
        &self.inner
    }

    /// Modify the middleware stack shared by this client and its clones.
    pub fn with_middleware_stack<R>(&self, f: impl FnOnce(&mut MiddlewareStack) -> R) -> R {
        self.inner.with_middleware_stack(f)
    }

    /// Send any command accepting this client's configuration.
    pub async fn send<Cmd>(&self, command: Cmd) -> Result<Cmd::Output, SdkError<Cmd::Error>>
    where
        Cmd: Command<Config>,
    {
        self.inner.send(command).await
    }

    /// Send `command` with `options`.
    pub async fn send_with_options<Cmd>(
        &self,
        command: Cmd,
        options: HandlerOptions,
    ) -> Result<Cmd::Output, SdkError<Cmd::Error>>
    where
        Cmd: Command<Config>,
    {
        self.inner.send_with_options(command, options).await
    }

    /// Read an item.
    pub async fn get_item(&self, input: GetItemInput) -> Result<GetItemOutput, SdkError<Error>> {
        self.send(GetItemCommand::new(input)).await
    }

    /// Write an item.
    pub async fn put_item(&self, input: PutItemInput) -> Result<PutItemOutput, SdkError<Error>> {
        self.send(PutItemCommand::new(input)).await
    }

    /// Query items by key.
    pub async fn query(&self, input: QueryInput) -> Result<QueryOutput, SdkError<Error>> {
        self.send(QueryCommand::new(input)).await
    }

    /// Create a table.
    pub async fn create_table(
        &self,
        input: CreateTableInput,
    ) -> Result<CreateTableOutput, SdkError<Error>> {
        self.send(CreateTableCommand::new(input)).await
    }

    /// Delete a table.
    pub async fn delete_table(
        &self,
        input: DeleteTableInput,
    ) -> Result<DeleteTableOutput, SdkError<Error>> {
        self.send(DeleteTableCommand::new(input)).await
    }
}

fn install_default_middleware(stack: &mut MiddlewareStack, signer: SigningMiddleware) {
    // All install with `override_existing`, so none can conflict.
    for result in [
        LoggerMiddleware::install(stack),
        ContentLengthMiddleware::install(stack),
        signer.install(stack),
    ] {
        if let Err(err) = result {
            tracing::warn!(error = %err, "failed to install default middleware");
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;
    use crate::config::Credentials;
    use crate::protocol::CONTENT_LENGTH_MIDDLEWARE;
    use crate::signing::SIGNING_MIDDLEWARE;
    use bytes::Bytes;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tracing_test::traced_test;
    use zynamo_runtime::logger::LOGGER_MIDDLEWARE;
    use zynamo_runtime::test_util::CaptureRequest;
    use zynamo_types::{AttributeMap, AttributeValue};

    fn response(status: u16, body: &'static str) -> http::Response<Bytes> {
        http::Response::builder()
            .status(status)
            .header("x-amzn-RequestId", "req-42")
            .header("content-type", "application/x-amz-json-1.0")
            .body(Bytes::from_static(body.as_bytes()))
            .unwrap()
    }

    fn client(http_client: CaptureRequest) -> Client {
        Client::from_conf(
            Config::builder()
                .endpoint_url("http://localhost:8000")
                .credentials_provider(Credentials::new("AKIDEXAMPLE", "secret", None, None, "test"))
                .http_client(http_client)
                .build(),
        )
    }

    fn key(id: &str) -> AttributeMap {
        let mut key = AttributeMap::new();
        key.insert("id".into(), AttributeValue::S(id.into()));
        key
    }

    #[test]
    fn installs_the_default_stack() {
        let client = client(CaptureRequest::new(response(200, "{}")));
        let stack = client.runtime_client().middleware_stack();
        assert!(stack.contains(LOGGER_MIDDLEWARE));
        assert!(stack.contains(CONTENT_LENGTH_MIDDLEWARE));
        assert!(stack.contains(SIGNING_MIDDLEWARE));
    }

    #[tokio::test]
    async fn requests_are_signed() {
        let http_client = CaptureRequest::new(response(200, "{}"));
        let client = client(http_client.clone());
        client
            .delete_table(DeleteTableInput::new("users"))
            .await
            .unwrap();

        let request = http_client.expect_request();
        let authorization = request.headers()["authorization"].to_str().unwrap();
        assert!(
            authorization.starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/"),
            "{}",
            authorization
        );
        assert!(authorization.contains("/us-east-1/dynamodb/aws4_request"));
        // Content-Length is set before signing, so it is covered by the signature.
        assert!(authorization.contains("content-length"), "{}", authorization);
        assert!(request.headers().contains_key("x-amz-date"));
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_dispatch() {
        let http_client = CaptureRequest::new(response(200, "{}"));
        let client = Client::from_conf(
            Config::builder()
                .endpoint_url("http://localhost:8000")
                .http_client(http_client.clone())
                .build(),
        );
        let err = client
            .delete_table(DeleteTableInput::new("users"))
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::ConstructionFailure(_)), "{:?}", err);
        assert_eq!(http_client.request_count(), 0);
    }

    #[tokio::test]
    async fn get_item_round_trip() {
        let http_client = CaptureRequest::new(response(
            200,
            r#"{"Item":{"id":{"S":"u-1"},"age":{"N":"40"}}}"#,
        ));
        let client = client(http_client.clone());

        let output = client
            .get_item(GetItemInput::new("users", key("u-1")))
            .await
            .unwrap();

        let item = output.item.expect("item");
        assert_eq!(item.get("age"), Some(&AttributeValue::N("40".into())));
        assert_eq!(output.metadata.request_id.as_deref(), Some("req-42"));
        assert_eq!(output.metadata.http_status_code, Some(200));

        let request = http_client.expect_request();
        assert_eq!(request.headers()["x-amz-target"], "DynamoDB_20120810.GetItem");
        assert_eq!(
            request.headers()["content-length"],
            request.body().len().to_string().as_str()
        );
        let body: serde_json::Value = serde_json::from_slice(request.body()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"TableName": "users", "Key": {"id": {"S": "u-1"}}})
        );
    }

    #[tokio::test]
    async fn service_errors_are_modeled() {
        let http_client = CaptureRequest::new(response(
            400,
            r#"{"__type":"com.amazonaws.dynamodb.v20120810#ResourceNotFoundException","message":"Requested resource not found"}"#,
        ));
        let client = client(http_client);

        let err = client
            .delete_table(DeleteTableInput::new("missing"))
            .await
            .unwrap_err();
        let service_error = err.service_error().expect("service error");
        assert_eq!(service_error.kind(), ErrorKind::ResourceNotFound);
        assert_eq!(service_error.metadata().request_id.as_deref(), Some("req-42"));
        assert_eq!(err.raw_response().map(|r| r.status().as_u16()), Some(400));
    }

    #[tokio::test]
    async fn unparseable_success_is_a_response_error() {
        let client = client(CaptureRequest::new(response(200, "not json")));
        let err = client
            .get_item(GetItemInput::new("users", key("u-1")))
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::ResponseError { .. }), "{:?}", err);
    }

    #[tokio::test]
    async fn options_reach_the_http_client() {
        let http_client = CaptureRequest::new(response(200, "{}"));
        let client = client(http_client.clone());
        client
            .send_with_options(
                DeleteTableCommand::new(DeleteTableInput::new("users")),
                HandlerOptions::with_timeout(Duration::from_secs(3)),
            )
            .await
            .unwrap();
        assert_eq!(
            http_client.received_options(),
            vec![HandlerOptions::with_timeout(Duration::from_secs(3))]
        );
    }

    #[tokio::test]
    #[traced_test]
    async fn logs_redacted_items() {
        let http_client = CaptureRequest::new(response(
            200,
            r#"{"Item":{"id":{"S":"u-1"},"password":{"S":"hunter2"}}}"#,
        ));
        let client = client(http_client);
        client
            .get_item(GetItemInput::new("users", key("u-1")))
            .await
            .unwrap();

        assert!(logs_contain("call succeeded"));
        assert!(logs_contain("GetItemCommand"));
        assert!(logs_contain("req-42"));
        assert!(logs_contain("password"));
        assert!(!logs_contain("hunter2"));
    }
}
