/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! DynamoDB service errors.

use serde::Deserialize;
use std::fmt;
use zynamo_runtime::http::HttpResponse;
use zynamo_runtime::metadata::ResponseMetadata;

/// Well-known DynamoDB error codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The table or index does not exist.
    ResourceNotFound,
    /// The table already exists or is being modified.
    ResourceInUse,
    /// A condition expression evaluated to false.
    ConditionalCheckFailed,
    /// The request is malformed or violates a constraint.
    Validation,
    /// Throughput or request rate exceeded.
    Throttling,
    /// Any other error code.
    Unhandled,
}

impl ErrorKind {
    fn from_code(code: &str) -> Self {
        match code {
            "ResourceNotFoundException" => ErrorKind::ResourceNotFound,
            "ResourceInUseException" => ErrorKind::ResourceInUse,
            "ConditionalCheckFailedException" => ErrorKind::ConditionalCheckFailed,
            "ValidationException" => ErrorKind::Validation,
            "ProvisionedThroughputExceededException"
            | "ThrottlingException"
            | "RequestLimitExceeded" => ErrorKind::Throttling,
            _ => ErrorKind::Unhandled,
        }
    }
}

/// An error returned by DynamoDB.
#[derive(Clone, Debug, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    code: String,
    message: Option<String>,
    metadata: ResponseMetadata,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type")]
    error_type: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

impl Error {
    /// An error with `code` and `message`.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            kind: ErrorKind::from_code(&code),
            code,
            message: Some(message.into()),
            metadata: ResponseMetadata::default(),
        }
    }

    /// Parse an `awsJson1_0` error response.
    ///
    /// The code is taken from `__type` with any `namespace#` prefix removed, or from
    /// the `X-Amzn-ErrorType` header.
    pub fn from_response(response: &HttpResponse) -> Self {
        let body: Option<ErrorBody> = serde_json::from_slice(response.body()).ok();
        let header_code = response
            .headers()
            .get("x-amzn-errortype")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let (raw_code, message) = match body {
            Some(body) => (body.error_type.or(header_code), body.message),
            None => (header_code, None),
        };
        let code = raw_code
            .as_deref()
            .map(sanitize_code)
            .unwrap_or("Unknown")
            .to_string();
        Self {
            kind: ErrorKind::from_code(&code),
            code,
            message,
            metadata: ResponseMetadata::from_response(response),
        }
    }

    /// The error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The error code, such as `ResourceNotFoundException`.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The error message.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Metadata of the response that carried the error.
    pub fn metadata(&self) -> &ResponseMetadata {
        &self.metadata
    }

    /// True if the request may succeed when retried later.
    pub fn is_retryable(&self) -> bool {
        self.kind == ErrorKind::Throttling
    }
}

fn sanitize_code(code: &str) -> &str {
    let code = code.split(':').next().unwrap_or(code);
    code.rsplit('#').next().unwrap_or(code)
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)?;
        if let Some(message) = &self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod test {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn parses_namespaced_error_types() {
        let response = http::Response::builder()
            .status(400)
            .header("x-amzn-RequestId", "req-9")
            .body(Bytes::from_static(
                br#"{"__type":"com.amazonaws.dynamodb.v20120810#ResourceNotFoundException","message":"Requested resource not found"}"#,
            ))
            .unwrap();
        let err = Error::from_response(&response);
        assert_eq!(err.kind(), ErrorKind::ResourceNotFound);
        assert_eq!(err.code(), "ResourceNotFoundException");
        assert_eq!(err.metadata().request_id.as_deref(), Some("req-9"));
        assert_eq!(
            err.to_string(),
            "ResourceNotFoundException: Requested resource not found"
        );
    }

    #[test]
    fn falls_back_to_the_error_type_header() {
        let response = http::Response::builder()
            .status(500)
            .header("x-amzn-ErrorType", "ThrottlingException:http://internal")
            .body(Bytes::from_static(b"not json"))
            .unwrap();
        let err = Error::from_response(&response);
        assert_eq!(err.code(), "ThrottlingException");
        assert!(err.is_retryable());
        assert_eq!(err.message(), None);
    }
}
