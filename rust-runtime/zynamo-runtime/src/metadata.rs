/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Response metadata carried by every output.

use crate::http::HttpResponse;

const REQUEST_ID_HEADER: &str = "x-amzn-requestid";
const EXTENDED_REQUEST_ID_HEADER: &str = "x-amz-id-2";

/// Metadata about the HTTP exchange that produced an output.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
    /// HTTP status code of the response.
    pub http_status_code: Option<u16>,
    /// Request id assigned by the service.
    pub request_id: Option<String>,
    /// Extended request id assigned by the service.
    pub extended_request_id: Option<String>,
}

impl ResponseMetadata {
    /// Read metadata from a raw response.
    pub fn from_response(response: &HttpResponse) -> Self {
        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Self {
            http_status_code: Some(response.status().as_u16()),
            request_id: header(REQUEST_ID_HEADER),
            extended_request_id: header(EXTENDED_REQUEST_ID_HEADER),
        }
    }
}

/// Outputs that carry [`ResponseMetadata`].
pub trait HasMetadata {
    /// The metadata.
    fn metadata(&self) -> &ResponseMetadata;

    /// Replace the metadata.
    fn set_metadata(&mut self, metadata: ResponseMetadata);
}

#[cfg(test)]
mod test {
    use super::ResponseMetadata;
    use bytes::Bytes;

    #[test]
    fn reads_status_and_request_ids() {
        let response = http::Response::builder()
            .status(200)
            .header("x-amzn-RequestId", "abc")
            .header("x-amz-id-2", "def")
            .body(Bytes::new())
            .unwrap();
        assert_eq!(
            ResponseMetadata::from_response(&response),
            ResponseMetadata {
                http_status_code: Some(200),
                request_id: Some("abc".into()),
                extended_request_id: Some("def".into()),
            }
        );
    }
}
