/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! A DynamoDB document client that validates items against a schema.
//!
//! Items are plain structured values ([`Item`](zynamo_types::Item)). A
//! [`DocumentCommand`](command::DocumentCommand) converts the fields holding
//! items to attribute values in middleware placed just before the transport's
//! serializer, and back just before its deserializer. A [`SchemaClient`] sends
//! those commands and checks every item it writes or reads against a
//! [`Schema`](schema::Schema).
//!
//! ```no_run
//! # async fn demo() -> Result<(), zynamo::Error> {
//! use zynamo::command::GetCommandInput;
//! use zynamo::schema::{ObjectSchema, Shape};
//! use zynamo_dynamodb::config::{Config, Credentials};
//!
//! let schema = ObjectSchema::new()
//!     .field("foo", Shape::String)
//!     .field("bar", Shape::Number);
//! let client = zynamo::create_client(
//!     Config::builder()
//!         .region("us-east-1")
//!         .credentials_provider(Credentials::new("AKIDEXAMPLE", "secret", None, None, "app"))
//!         .build(),
//!     schema,
//! );
//! let key = serde_json::json!({"foo": "a"}).as_object().cloned().unwrap_or_default();
//! let output = client.get(GetCommandInput::new("table", key)).await?;
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
pub mod document_client;
pub mod expression;
pub mod factory;
pub mod key_node;
pub mod schema;

mod error;

pub use client::{SchemaClient, SchemaCommand, SchemaOutput};
pub use document_client::{DocumentClient, DocumentClientResolvedConfig, TranslateConfig};
pub use error::Error;
pub use factory::{create_command_factory, CommandFactory};

use schema::Schema;
use zynamo_dynamodb::Config;

/// A schema client over a new transport client for `config`, with default
/// translation options.
pub fn create_client<S: Schema>(config: Config, schema: S) -> SchemaClient<S> {
    SchemaClient::from_conf(schema, config, Some(TranslateConfig::default()))
}
