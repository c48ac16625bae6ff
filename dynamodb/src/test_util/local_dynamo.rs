/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::expression::{self, ComparisonOperator, KeyPredicate};
use crate::model::{KeyType, ReturnValue, TableDescription, TableStatus};
use crate::operation::create_table::{CreateTableInput, CreateTableOutput};
use crate::operation::delete_table::{DeleteTableInput, DeleteTableOutput};
use crate::operation::get_item::{GetItemInput, GetItemOutput};
use crate::operation::put_item::{PutItemInput, PutItemOutput};
use crate::operation::query::{QueryInput, QueryOutput};
use crate::protocol::target_operation;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use zynamo_runtime::handler::HandlerOptions;
use zynamo_runtime::http::{HttpClient, HttpRequest, HttpResponse};
use zynamo_runtime::BoxFallibleFut;
use zynamo_types::{AttributeMap, AttributeValue};

const ERROR_NAMESPACE: &str = "com.amazonaws.dynamodb.v20120810";

/// An in-memory DynamoDB speaking `awsJson1_0`.
///
/// Supports `CreateTable`, `DeleteTable`, `PutItem` (with `attribute_exists` /
/// `attribute_not_exists` conditions), `GetItem` and `Query` (key conditions,
/// `Limit`, `ExclusiveStartKey`, `ScanIndexForward`). Requests without a SigV4
/// `Authorization` header are rejected with `MissingAuthenticationTokenException`.
/// Every request is recorded, including rejected ones. Clones share state.
///
/// ```no_run
/// use zynamo_dynamodb::{Client, Config};
/// use zynamo_dynamodb::test_util::{test_credentials, LocalDynamo};
///
/// let dynamo = LocalDynamo::new();
/// let client = Client::from_conf(
///     Config::builder()
///         .credentials_provider(test_credentials())
///         .http_client(dynamo.clone())
///         .build(),
/// );
/// assert_eq!(dynamo.request_count(), 0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct LocalDynamo {
    state: Arc<Mutex<State>>,
}

#[derive(Debug, Default)]
struct State {
    tables: HashMap<String, Table>,
    requests: Vec<String>,
}

#[derive(Debug)]
struct Table {
    description: TableDescription,
    partition_key: String,
    sort_key: Option<String>,
    items: Vec<AttributeMap>,
}

#[derive(Debug)]
struct Fault {
    code: &'static str,
    message: String,
}

impl Fault {
    fn validation(message: impl Into<String>) -> Self {
        Self {
            code: "ValidationException",
            message: message.into(),
        }
    }

    fn unsigned() -> Self {
        Self {
            code: "MissingAuthenticationTokenException",
            message: "Request is missing Authentication Token".into(),
        }
    }

    fn not_found() -> Self {
        Self {
            code: "ResourceNotFoundException",
            message: "Requested resource not found".into(),
        }
    }
}

impl LocalDynamo {
    /// An empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests received, rejected ones included.
    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Operation names of the requests received, oldest first.
    pub fn requests(&self) -> Vec<String> {
        self.lock().requests.clone()
    }

    /// Number of items in `table`, or `None` if it does not exist.
    pub fn item_count(&self, table: &str) -> Option<usize> {
        self.lock().tables.get(table).map(|t| t.items.len())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn respond(&self, request: &HttpRequest) -> HttpResponse {
        let operation = target_operation(request).unwrap_or("<missing>").to_string();
        let mut state = self.lock();
        state.requests.push(operation.clone());
        let request_id = format!("local-{}", state.requests.len());
        let body = request.body();
        let signed = request
            .headers()
            .get(http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map_or(false, |value| value.starts_with("AWS4-HMAC-SHA256 "));
        let result = match operation.as_str() {
            _ if !signed => Err(Fault::unsigned()),
            "CreateTable" => parse(body).and_then(|input| state.create_table(input)).and_then(render),
            "DeleteTable" => parse(body).and_then(|input| state.delete_table(input)).and_then(render),
            "PutItem" => parse(body).and_then(|input| state.put_item(input)).and_then(render),
            "GetItem" => parse(body).and_then(|input| state.get_item(input)).and_then(render),
            "Query" => parse(body).and_then(|input| state.query(input)).and_then(render),
            other => Err(Fault {
                code: "UnknownOperationException",
                message: format!("unsupported operation `{}`", other),
            }),
        };
        let (status, body) = match result {
            Ok(body) => (200, body),
            Err(fault) => {
                tracing::debug!(code = fault.code, message = %fault.message, "local dynamo rejected request");
                let body = serde_json::json!({
                    "__type": format!("{}#{}", ERROR_NAMESPACE, fault.code),
                    "message": fault.message,
                });
                (400, body.to_string().into_bytes())
            }
        };
        http::Response::builder()
            .status(status)
            .header("content-type", "application/x-amz-json-1.0")
            .header("x-amzn-RequestId", request_id)
            .body(Bytes::from(body))
            .expect("statically valid response")
    }
}

impl HttpClient for LocalDynamo {
    fn call(&self, request: HttpRequest, _options: &HandlerOptions) -> BoxFallibleFut<HttpResponse> {
        let response = self.respond(&request);
        Box::pin(async move { Ok(response) })
    }
}

fn parse<T: DeserializeOwned>(body: &[u8]) -> Result<T, Fault> {
    serde_json::from_slice(body).map_err(|err| Fault::validation(format!("malformed request: {}", err)))
}

fn render<T: Serialize>(output: T) -> Result<Vec<u8>, Fault> {
    serde_json::to_vec(&output).map_err(|err| Fault {
        code: "InternalServerError",
        message: err.to_string(),
    })
}

impl State {
    fn table(&self, name: &str) -> Result<&Table, Fault> {
        self.tables.get(name).ok_or_else(Fault::not_found)
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut Table, Fault> {
        self.tables.get_mut(name).ok_or_else(Fault::not_found)
    }

    fn create_table(&mut self, input: CreateTableInput) -> Result<CreateTableOutput, Fault> {
        if self.tables.contains_key(&input.table_name) {
            return Err(Fault {
                code: "ResourceInUseException",
                message: format!("Table already exists: {}", input.table_name),
            });
        }
        let key_of = |key_type: KeyType| {
            input
                .key_schema
                .iter()
                .filter(|k| k.key_type == key_type)
                .map(|k| k.attribute_name.clone())
                .collect::<Vec<_>>()
        };
        let (mut hash, mut range) = (key_of(KeyType::Hash), key_of(KeyType::Range));
        if hash.len() != 1 || range.len() > 1 {
            return Err(Fault::validation(
                "a key schema has exactly one HASH key and at most one RANGE key",
            ));
        }
        for key in &input.key_schema {
            if !input
                .attribute_definitions
                .iter()
                .any(|d| d.attribute_name == key.attribute_name)
            {
                return Err(Fault::validation(format!(
                    "key attribute `{}` has no attribute definition",
                    key.attribute_name
                )));
            }
        }
        let description = TableDescription {
            table_name: Some(input.table_name.clone()),
            table_status: Some(TableStatus::Active),
            key_schema: input.key_schema,
            attribute_definitions: input.attribute_definitions,
            item_count: Some(0),
            table_arn: Some(format!(
                "arn:aws:dynamodb:local:000000000000:table/{}",
                input.table_name
            )),
            creation_date_time: None,
        };
        self.tables.insert(
            input.table_name,
            Table {
                description: description.clone(),
                partition_key: hash.remove(0),
                sort_key: range.pop(),
                items: Vec::new(),
            },
        );
        Ok(CreateTableOutput {
            table_description: Some(description),
            ..Default::default()
        })
    }

    fn delete_table(&mut self, input: DeleteTableInput) -> Result<DeleteTableOutput, Fault> {
        let table = self.tables.remove(&input.table_name).ok_or_else(Fault::not_found)?;
        Ok(DeleteTableOutput {
            table_description: Some(TableDescription {
                table_status: Some(TableStatus::Deleting),
                item_count: Some(table.items.len() as i64),
                ..table.description
            }),
            ..Default::default()
        })
    }

    fn put_item(&mut self, input: PutItemInput) -> Result<PutItemOutput, Fault> {
        let table = self.table_mut(&input.table_name)?;
        let key = table.key_of(&input.item)?;
        let existing = table.position(&key);
        if let Some(condition) = &input.condition_expression {
            let current = existing.map(|index| &table.items[index]);
            if !evaluate_condition(condition, input.expression_attribute_names.as_ref(), current)? {
                return Err(Fault {
                    code: "ConditionalCheckFailedException",
                    message: "The conditional request failed".into(),
                });
            }
        }
        let old = match existing {
            Some(index) => Some(std::mem::replace(&mut table.items[index], input.item)),
            None => {
                table.items.push(input.item);
                None
            }
        };
        Ok(PutItemOutput {
            attributes: old.filter(|_| input.return_values == Some(ReturnValue::AllOld)),
            ..Default::default()
        })
    }

    fn get_item(&self, input: GetItemInput) -> Result<GetItemOutput, Fault> {
        let table = self.table(&input.table_name)?;
        let key = table.key_of(&input.key)?;
        if key.len() != input.key.len() {
            return Err(Fault::validation(
                "The provided key element does not match the schema",
            ));
        }
        let item = match table.position(&key) {
            Some(index) => Some(project(
                &table.items[index],
                input.projection_expression.as_deref(),
                input.expression_attribute_names.as_ref(),
            )?),
            None => None,
        };
        Ok(GetItemOutput {
            item,
            ..Default::default()
        })
    }

    fn query(&self, input: QueryInput) -> Result<QueryOutput, Fault> {
        let table = self.table(&input.table_name)?;
        if input.index_name.is_some() {
            return Err(Fault::validation("secondary indexes are not supported"));
        }
        if input.filter_expression.is_some() {
            return Err(Fault::validation("FilterExpression is not supported"));
        }
        let expression = input
            .key_condition_expression
            .as_deref()
            .ok_or_else(|| Fault::validation("KeyConditionExpression is required"))?;
        let parsed = expression::parse(expression).map_err(|err| {
            Fault::validation(format!("Invalid KeyConditionExpression: {}", err))
        })?;
        let names = input.expression_attribute_names.as_ref();
        let empty = AttributeMap::new();
        let values = input.expression_attribute_values.as_ref().unwrap_or(&empty);

        let mut partition = None;
        let mut sort = None;
        for predicate in parsed.predicates() {
            let name = expression::resolve_name(predicate.name(), names).ok_or_else(|| {
                Fault::validation(format!("unbound attribute name `{}`", predicate.name()))
            })?;
            let mut operands = Vec::new();
            for placeholder in predicate.values() {
                operands.push(values.get(placeholder).ok_or_else(|| {
                    Fault::validation(format!("unbound attribute value `{}`", placeholder))
                })?);
            }
            if name == table.partition_key && predicate.is_equality() && partition.is_none() {
                partition = Some(operands[0]);
            } else if Some(name) == table.sort_key.as_deref() && sort.is_none() {
                sort = Some((predicate, operands));
            } else {
                return Err(Fault::validation(format!(
                    "Query condition on `{}` is not a valid key condition",
                    name
                )));
            }
        }
        let partition = partition.ok_or_else(|| {
            Fault::validation("Query condition missed key schema element")
        })?;

        let mut matches: Vec<&AttributeMap> = table
            .items
            .iter()
            .filter(|item| {
                item.get(&table.partition_key)
                    .map(|v| compare(v, partition) == Some(Ordering::Equal))
                    .unwrap_or(false)
            })
            .filter(|item| match (&sort, table.sort_key.as_deref()) {
                (Some((predicate, operands)), Some(sort_key)) => item
                    .get(sort_key)
                    .map(|v| matches_predicate(predicate, v, operands))
                    .unwrap_or(false),
                _ => true,
            })
            .collect();
        if let Some(sort_key) = &table.sort_key {
            matches.sort_by(|a, b| match (a.get(sort_key), b.get(sort_key)) {
                (Some(a), Some(b)) => compare(a, b).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            });
        }
        if input.scan_index_forward == Some(false) {
            matches.reverse();
        }
        if let Some(start) = &input.exclusive_start_key {
            let start = table.key_of(start)?;
            if let Some(index) = matches.iter().position(|item| table.has_key(item, &start)) {
                matches.drain(..=index);
            }
        }
        let mut last_evaluated_key = None;
        if let Some(limit) = input.limit {
            let limit = usize::try_from(limit)
                .ok()
                .filter(|l| *l > 0)
                .ok_or_else(|| Fault::validation("Limit must be at least 1"))?;
            if matches.len() > limit {
                matches.truncate(limit);
                last_evaluated_key = matches.last().map(|item| table.key_attributes(item));
            }
        }
        let items = matches
            .into_iter()
            .map(|item| project(item, input.projection_expression.as_deref(), names))
            .collect::<Result<Vec<_>, _>>()?;
        let count = items.len() as i32;
        Ok(QueryOutput {
            items: Some(items),
            count,
            scanned_count: count,
            last_evaluated_key,
            ..Default::default()
        })
    }
}

impl Table {
    fn key_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.partition_key.as_str()).chain(self.sort_key.as_deref())
    }

    /// The key attributes of `item`, failing if any is missing.
    fn key_of(&self, item: &AttributeMap) -> Result<AttributeMap, Fault> {
        let mut key = AttributeMap::new();
        for name in self.key_names() {
            let value = item.get(name).ok_or_else(|| {
                Fault::validation(format!("missing key attribute `{}`", name))
            })?;
            if !matches!(value, AttributeValue::S(_) | AttributeValue::N(_) | AttributeValue::B(_)) {
                return Err(Fault::validation(format!(
                    "key attribute `{}` must be a string, number or binary",
                    name
                )));
            }
            key.insert(name.to_string(), value.clone());
        }
        Ok(key)
    }

    fn key_attributes(&self, item: &AttributeMap) -> AttributeMap {
        self.key_names()
            .filter_map(|name| Some((name.to_string(), item.get(name)?.clone())))
            .collect()
    }

    fn has_key(&self, item: &AttributeMap, key: &AttributeMap) -> bool {
        key.iter().all(|(name, value)| {
            item.get(name)
                .map(|v| compare(v, value) == Some(Ordering::Equal))
                .unwrap_or(false)
        })
    }

    fn position(&self, key: &AttributeMap) -> Option<usize> {
        self.items.iter().position(|item| self.has_key(item, key))
    }
}

fn compare(a: &AttributeValue, b: &AttributeValue) -> Option<Ordering> {
    match (a, b) {
        (AttributeValue::S(a), AttributeValue::S(b)) => Some(a.cmp(b)),
        (AttributeValue::N(a), AttributeValue::N(b)) => {
            let (a, b) = (a.parse::<f64>().ok()?, b.parse::<f64>().ok()?);
            a.partial_cmp(&b)
        }
        (AttributeValue::B(a), AttributeValue::B(b)) => Some(a.as_ref().cmp(b.as_ref())),
        _ => None,
    }
}

fn matches_predicate(predicate: &KeyPredicate, value: &AttributeValue, operands: &[&AttributeValue]) -> bool {
    match predicate {
        KeyPredicate::Comparison { operator, .. } => {
            let Some(ordering) = compare(value, operands[0]) else {
                return false;
            };
            match operator {
                ComparisonOperator::Eq => ordering == Ordering::Equal,
                ComparisonOperator::Lt => ordering == Ordering::Less,
                ComparisonOperator::Le => ordering != Ordering::Greater,
                ComparisonOperator::Gt => ordering == Ordering::Greater,
                ComparisonOperator::Ge => ordering != Ordering::Less,
            }
        }
        KeyPredicate::Between { .. } => {
            compare(value, operands[0]).map_or(false, |o| o != Ordering::Less)
                && compare(value, operands[1]).map_or(false, |o| o != Ordering::Greater)
        }
        KeyPredicate::BeginsWith { .. } => match (value, operands[0]) {
            (AttributeValue::S(value), AttributeValue::S(prefix)) => value.starts_with(prefix.as_str()),
            (AttributeValue::B(value), AttributeValue::B(prefix)) => {
                value.as_ref().starts_with(prefix.as_ref())
            }
            _ => false,
        },
    }
}

/// Evaluate `attribute_exists(name)` or `attribute_not_exists(name)` against the stored item.
fn evaluate_condition(
    condition: &str,
    names: Option<&HashMap<String, String>>,
    current: Option<&AttributeMap>,
) -> Result<bool, Fault> {
    let unsupported = || Fault::validation(format!("unsupported ConditionExpression `{}`", condition));
    let condition = condition.trim();
    let (exists, argument) = if let Some(rest) = condition.strip_prefix("attribute_not_exists") {
        (false, rest)
    } else if let Some(rest) = condition.strip_prefix("attribute_exists") {
        (true, rest)
    } else {
        return Err(unsupported());
    };
    let name = argument
        .trim()
        .strip_prefix('(')
        .and_then(|a| a.strip_suffix(')'))
        .map(str::trim)
        .ok_or_else(unsupported)?;
    let name = expression::resolve_name(name, names).ok_or_else(unsupported)?;
    let present = current.map(|item| item.contains_key(name)).unwrap_or(false);
    Ok(present == exists)
}

fn project(
    item: &AttributeMap,
    projection: Option<&str>,
    names: Option<&HashMap<String, String>>,
) -> Result<AttributeMap, Fault> {
    let Some(projection) = projection else {
        return Ok(item.clone());
    };
    let mut projected = AttributeMap::new();
    for name in projection.split(',').map(str::trim) {
        let name = expression::resolve_name(name, names).ok_or_else(|| {
            Fault::validation(format!("unbound attribute name `{}`", name))
        })?;
        if let Some(value) = item.get(name) {
            projected.insert(name.to_string(), value.clone());
        }
    }
    Ok(projected)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::{KeySchemaElement, ScalarAttributeType};
    use crate::test_util::test_credentials;
    use crate::{Client, Config};
    use pretty_assertions::assert_eq;

    fn s(value: &str) -> AttributeValue {
        AttributeValue::S(value.into())
    }

    fn n(value: &str) -> AttributeValue {
        AttributeValue::N(value.into())
    }

    fn item(pairs: &[(&str, AttributeValue)]) -> AttributeMap {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    async fn orders() -> (LocalDynamo, Client) {
        let dynamo = LocalDynamo::new();
        let client = Client::from_conf(
            Config::builder()
                .credentials_provider(test_credentials())
                .http_client(dynamo.clone())
                .build(),
        );
        client
            .create_table(
                CreateTableInput::new("orders")
                    .key(KeySchemaElement::hash("customer"), ScalarAttributeType::S)
                    .key(KeySchemaElement::range("seq"), ScalarAttributeType::N),
            )
            .await
            .unwrap();
        for seq in ["1", "2", "3", "10"] {
            client
                .put_item(PutItemInput::new(
                    "orders",
                    item(&[("customer", s("c-1")), ("seq", n(seq)), ("total", n("5"))]),
                ))
                .await
                .unwrap();
        }
        client
            .put_item(PutItemInput::new(
                "orders",
                item(&[("customer", s("c-2")), ("seq", n("1"))]),
            ))
            .await
            .unwrap();
        (dynamo, client)
    }

    fn seqs(output: &QueryOutput) -> Vec<AttributeValue> {
        output
            .items
            .iter()
            .flatten()
            .filter_map(|item| item.get("seq").cloned())
            .collect()
    }

    #[tokio::test]
    async fn put_then_get() {
        let (dynamo, client) = orders().await;
        let output = client
            .get_item(GetItemInput::new(
                "orders",
                item(&[("customer", s("c-1")), ("seq", n("2"))]),
            ))
            .await
            .unwrap();
        assert_eq!(output.item.unwrap().get("total"), Some(&n("5")));
        assert_eq!(dynamo.item_count("orders"), Some(5));
        assert_eq!(output.metadata.request_id.as_deref(), Some("local-7"));

        let missing = client
            .get_item(GetItemInput::new(
                "orders",
                item(&[("customer", s("c-9")), ("seq", n("1"))]),
            ))
            .await
            .unwrap();
        assert_eq!(missing.item, None);
    }

    #[tokio::test]
    async fn query_orders_and_pages_numerically() {
        let (_dynamo, client) = orders().await;
        let values = item(&[(":c", s("c-1")), (":min", n("2"))]);

        let all = client
            .query(QueryInput::new("orders", "customer = :c AND seq >= :min").expression_attribute_values(values.clone()))
            .await
            .unwrap();
        assert_eq!(seqs(&all), vec![n("2"), n("3"), n("10")]);
        assert_eq!(all.last_evaluated_key, None);

        let first = client
            .query(
                QueryInput::new("orders", "customer = :c AND seq >= :min")
                    .expression_attribute_values(values.clone())
                    .scan_index_forward(false)
                    .limit(2),
            )
            .await
            .unwrap();
        assert_eq!(seqs(&first), vec![n("10"), n("3")]);
        let next = first.last_evaluated_key.clone().expect("more pages");

        let second = client
            .query(
                QueryInput::new("orders", "customer = :c AND seq >= :min")
                    .expression_attribute_values(values)
                    .scan_index_forward(false)
                    .limit(2)
                    .exclusive_start_key(next),
            )
            .await
            .unwrap();
        assert_eq!(seqs(&second), vec![n("2")]);
    }

    #[tokio::test]
    async fn query_rejects_non_key_conditions() {
        let (_dynamo, client) = orders().await;
        let err = client
            .query(
                QueryInput::new("orders", "total = :t")
                    .expression_attribute_values(item(&[(":t", n("5"))])),
            )
            .await
            .unwrap_err();
        assert_eq!(err.service_error().map(|e| e.kind()), Some(ErrorKind::Validation));
    }

    #[tokio::test]
    async fn conditional_put() {
        let (_dynamo, client) = orders().await;
        let err = client
            .put_item(
                PutItemInput::new("orders", item(&[("customer", s("c-2")), ("seq", n("1"))]))
                    .condition_expression("attribute_not_exists(customer)"),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err.service_error().map(|e| e.kind()),
            Some(ErrorKind::ConditionalCheckFailed)
        );

        let replaced = client
            .put_item(
                PutItemInput::new(
                    "orders",
                    item(&[("customer", s("c-2")), ("seq", n("1")), ("total", n("9"))]),
                )
                .condition_expression("attribute_exists(customer)")
                .return_values(ReturnValue::AllOld),
            )
            .await
            .unwrap();
        assert_eq!(
            replaced.attributes,
            Some(item(&[("customer", s("c-2")), ("seq", n("1"))]))
        );
    }

    #[tokio::test]
    async fn table_lifecycle_errors() {
        let (dynamo, client) = orders().await;
        let err = client
            .create_table(
                CreateTableInput::new("orders")
                    .key(KeySchemaElement::hash("customer"), ScalarAttributeType::S),
            )
            .await
            .unwrap_err();
        assert_eq!(err.service_error().map(|e| e.kind()), Some(ErrorKind::ResourceInUse));

        let deleted = client
            .delete_table(DeleteTableInput::new("orders"))
            .await
            .unwrap();
        let description = deleted.table_description.unwrap();
        assert_eq!(description.table_status, Some(TableStatus::Deleting));
        assert_eq!(description.item_count, Some(5));
        assert_eq!(dynamo.item_count("orders"), None);

        let err = client
            .get_item(GetItemInput::new("orders", item(&[("customer", s("c-1"))])))
            .await
            .unwrap_err();
        assert_eq!(err.service_error().map(|e| e.kind()), Some(ErrorKind::ResourceNotFound));
        assert_eq!(
            dynamo.requests().last().map(String::as_str),
            Some("GetItem")
        );
    }

    #[tokio::test]
    async fn unsigned_requests_are_rejected() {
        let dynamo = LocalDynamo::new();
        let request = http::Request::builder()
            .method("POST")
            .uri("http://localhost:8000/")
            .header("x-amz-target", "DynamoDB_20120810.DeleteTable")
            .body(Bytes::from_static(br#"{"TableName":"orders"}"#))
            .unwrap();
        let response = dynamo.call(request, &HandlerOptions::default()).await.unwrap();
        assert_eq!(response.status(), 400);
        let err = crate::Error::from_response(&response);
        assert_eq!(err.code(), "MissingAuthenticationTokenException");
        assert_eq!(dynamo.requests(), vec!["DeleteTable".to_string()]);
    }
}
