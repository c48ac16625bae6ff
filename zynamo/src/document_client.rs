/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! A client sending [`DocumentCommand`](crate::command::DocumentCommand)s.

use std::sync::Arc;
use zynamo_dynamodb::Config;
use zynamo_runtime::command::Command;
use zynamo_runtime::handler::HandlerOptions;
use zynamo_runtime::middleware::MiddlewareStack;
use zynamo_runtime::SdkError;
use zynamo_types::{MarshallOptions, UnmarshallOptions};

/// How structured items are converted to and from attribute values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TranslateConfig {
    /// Options for inputs.
    pub marshall_options: MarshallOptions,
    /// Options for outputs.
    pub unmarshall_options: UnmarshallOptions,
}

/// Transport configuration plus translation options.
///
/// Fixed when the document client is built and shared by every command it sends.
#[derive(Clone, Debug)]
pub struct DocumentClientResolvedConfig {
    transport: Arc<Config>,
    translate_config: Option<TranslateConfig>,
}

impl DocumentClientResolvedConfig {
    /// Wrap the shared transport configuration.
    pub fn new(transport: Arc<Config>, translate_config: Option<TranslateConfig>) -> Self {
        Self {
            transport,
            translate_config,
        }
    }

    /// The transport configuration.
    pub fn transport(&self) -> &Config {
        &self.transport
    }

    /// Translation options, defaulted if none were given.
    pub fn translate_config(&self) -> TranslateConfig {
        self.translate_config.unwrap_or_default()
    }
}

impl AsRef<Config> for DocumentClientResolvedConfig {
    fn as_ref(&self) -> &Config {
        &self.transport
    }
}

/// Sends document commands through a transport client's pipeline.
///
/// Shares the transport client's configuration and middleware stack: middleware
/// added through either client applies to both.
#[derive(Clone, Debug)]
pub struct DocumentClient {
    inner: zynamo_runtime::Client<DocumentClientResolvedConfig>,
}

impl DocumentClient {
    /// A document client over `client`.
    pub fn from(client: &zynamo_dynamodb::Client, translate_config: Option<TranslateConfig>) -> Self {
        let transport = client.runtime_client();
        let config = DocumentClientResolvedConfig::new(transport.shared_config(), translate_config);
        Self {
            inner: zynamo_runtime::Client::from_parts(
                Arc::new(config),
                transport.shared_middleware_stack(),
            ),
        }
    }

    /// The resolved configuration.
    pub fn config(&self) -> &DocumentClientResolvedConfig {
        self.inner.config()
    }

    /// Modify the shared middleware stack.
    pub fn with_middleware_stack<R>(&self, f: impl FnOnce(&mut MiddlewareStack) -> R) -> R {
        self.inner.with_middleware_stack(f)
    }

    /// Send `command`.
    pub async fn send<Cmd>(&self, command: Cmd) -> Result<Cmd::Output, SdkError<Cmd::Error>>
    where
        Cmd: Command<DocumentClientResolvedConfig>,
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
        Cmd: Command<DocumentClientResolvedConfig>,
    {
        self.inner.send_with_options(command, options).await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::command::{GetCommand, GetCommandInput, PutCommand, PutCommandInput};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use zynamo_dynamodb::command::CreateTableCommand;
    use zynamo_dynamodb::model::{KeySchemaElement, ScalarAttributeType};
    use zynamo_dynamodb::operation::create_table::CreateTableInput;
    use zynamo_dynamodb::test_util::{test_credentials, LocalDynamo};
    use zynamo_types::{AttributeValue, Item, UnmarshallOptions};

    fn item(value: serde_json::Value) -> Item {
        value.as_object().cloned().unwrap()
    }

    async fn clients(translate: Option<TranslateConfig>) -> (zynamo_dynamodb::Client, DocumentClient) {
        let transport = zynamo_dynamodb::Client::from_conf(
            Config::builder()
                .credentials_provider(test_credentials())
                .http_client(LocalDynamo::new())
                .build(),
        );
        transport
            .send(CreateTableCommand::new(
                CreateTableInput::new("t").key(KeySchemaElement::hash("id"), ScalarAttributeType::S),
            ))
            .await
            .unwrap();
        let document = DocumentClient::from(&transport, translate);
        (transport, document)
    }

    #[tokio::test]
    async fn items_are_written_as_attribute_values() {
        let (transport, document) = clients(None).await;
        document
            .send(PutCommand::new(PutCommandInput::new(
                "t",
                item(json!({"id": "a", "n": 3, "tags": ["x"]})),
            )))
            .await
            .unwrap();

        let mut key = zynamo_types::AttributeMap::new();
        key.insert("id".into(), AttributeValue::S("a".into()));
        let raw = transport
            .get_item(zynamo_dynamodb::operation::get_item::GetItemInput::new("t", key))
            .await
            .unwrap()
            .item
            .unwrap();
        assert_eq!(raw["n"], AttributeValue::N("3".into()));
        assert_eq!(raw["tags"], AttributeValue::L(vec![AttributeValue::S("x".into())]));

        let read = document
            .send(GetCommand::new(GetCommandInput::new("t", item(json!({"id": "a"})))))
            .await
            .unwrap();
        assert_eq!(read.item, Some(item(json!({"id": "a", "n": 3, "tags": ["x"]}))));
        assert_eq!(read.metadata.http_status_code, Some(200));
    }

    #[tokio::test]
    async fn translate_options_reach_the_codec() {
        let translate = TranslateConfig {
            unmarshall_options: UnmarshallOptions { wrap_numbers: true },
            ..Default::default()
        };
        let (_, document) = clients(Some(translate)).await;
        assert_eq!(document.config().translate_config(), translate);
        document
            .send(PutCommand::new(PutCommandInput::new("t", item(json!({"id": "a", "n": 1.5})))))
            .await
            .unwrap();
        let read = document
            .send(GetCommand::new(GetCommandInput::new("t", item(json!({"id": "a"})))))
            .await
            .unwrap();
        assert_eq!(read.item.unwrap()["n"], json!("1.5"));
    }

    #[tokio::test]
    async fn shares_the_transport_stack() {
        let (transport, document) = clients(None).await;
        let before = transport.runtime_client().middleware_stack().len();
        document.with_middleware_stack(|stack| stack.remove(zynamo_runtime::logger::LOGGER_MIDDLEWARE));
        assert_eq!(transport.runtime_client().middleware_stack().len(), before - 1);
    }
}
