/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! A low-level Amazon DynamoDB client.
//!
//! Operations speak the `awsJson1_0` protocol: every request is a `POST` of a JSON
//! body with an `X-Amz-Target` header naming the operation. Items travel as
//! [`AttributeMap`](zynamo_types::AttributeMap)s.
//!
//! ```no_run
//! # async fn demo() -> Result<(), zynamo_runtime::SdkError<zynamo_dynamodb::Error>> {
//! use zynamo_dynamodb::{Client, Config};
//! use zynamo_dynamodb::operation::get_item::GetItemInput;
//! use zynamo_types::{AttributeMap, AttributeValue};
//!
//! use zynamo_dynamodb::config::Credentials;
//!
//! let client = Client::from_conf(
//!     Config::builder()
//!         .endpoint_url("http://localhost:8000")
//!         .credentials_provider(Credentials::new("AKIDEXAMPLE", "secret", None, None, "local"))
//!         .build(),
//! );
//! let mut key = AttributeMap::new();
//! key.insert("id".to_string(), AttributeValue::S("u-1".into()));
//! let output = client.get_item(GetItemInput::new("users", key)).await?;
//! println!("{:?}", output.item);
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod client;
pub mod command;
pub mod config;
pub mod error;
pub mod expression;
pub mod model;
pub mod operation;
pub mod protocol;
pub mod sensitive;
pub mod signing;

#[cfg(feature = "rt-tokio")]
pub mod hyper_client;

#[cfg(any(test, feature = "test-util"))]
pub mod test_util;

pub use client::Client;
pub use config::Config;
pub use error::{Error, ErrorKind};

/// Name the client reports in its execution context.
pub const CLIENT_NAME: &str = "DynamoDBClient";
