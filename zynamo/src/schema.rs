/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Item schemas.
//!
//! A [`Schema`] parses a structured item into its output type or reports every
//! [`Violation`] it found. Two schemas are provided: [`ObjectSchema`], a
//! declarative description of an item's shape, and [`Typed`], which parses with
//! serde into any `DeserializeOwned` type.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;
use std::marker::PhantomData;
use thiserror::Error;
use zynamo_types::Item;

/// Parses items.
pub trait Schema: Send + Sync {
    /// What a valid item parses into.
    type Output: Send + Sync + 'static;

    /// Parse `item`, or report why it does not conform.
    fn parse(&self, item: &Item) -> Result<Self::Output, ValidationError>;
}

/// One reason an item does not conform to a schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// Where in the item, such as `fishes[2]`. Empty for the item itself.
    pub path: String,
    /// What is wrong.
    pub message: String,
}

impl Violation {
    /// A violation at `path`.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// An item failed to parse.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("item does not match the schema: {}", render(.violations))]
pub struct ValidationError {
    violations: Vec<Violation>,
}

fn render(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// An error reporting `violations`.
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Every violation found.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

/// What an [`ObjectSchema`] does with keys it does not declare.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnknownKeys {
    /// Drop them from the output.
    #[default]
    Strip,
    /// Keep them in the output.
    Passthrough,
    /// Reject the item.
    Strict,
}

/// The shape of a value.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// A string.
    String,
    /// A number.
    Number,
    /// A boolean.
    Boolean,
    /// Anything, including null.
    Any,
    /// The member may be absent. Only meaningful as an object member.
    Optional(Box<Shape>),
    /// The value may be null.
    Nullable(Box<Shape>),
    /// A list whose every element has the shape.
    List(Box<Shape>),
    /// A map with arbitrary keys whose every value has the shape.
    Record(Box<Shape>),
    /// A nested object.
    Object(ObjectSchema),
}

impl Shape {
    /// `shape`, or absent.
    pub fn optional(shape: Shape) -> Self {
        Shape::Optional(Box::new(shape))
    }

    /// `shape`, or null.
    pub fn nullable(shape: Shape) -> Self {
        Shape::Nullable(Box::new(shape))
    }

    /// A list of `shape`.
    pub fn list(shape: Shape) -> Self {
        Shape::List(Box::new(shape))
    }

    /// A map of `shape`.
    pub fn record(shape: Shape) -> Self {
        Shape::Record(Box::new(shape))
    }

    /// Whether an object member of this shape may be absent: `Optional`, seen
    /// through any number of `Nullable` wrappers.
    fn accepts_absent(&self) -> bool {
        match self {
            Shape::Optional(_) => true,
            Shape::Nullable(inner) => inner.accepts_absent(),
            _ => false,
        }
    }

    fn expected(&self) -> &'static str {
        match self {
            Shape::String => "a string",
            Shape::Number => "a number",
            Shape::Boolean => "a boolean",
            Shape::Any => "any value",
            Shape::Optional(inner) | Shape::Nullable(inner) => inner.expected(),
            Shape::List(_) => "a list",
            Shape::Record(_) | Shape::Object(_) => "a map",
        }
    }

    fn parse(&self, value: &Value, path: &str, violations: &mut Vec<Violation>) -> Option<Value> {
        match (self, value) {
            (Shape::Any, _) => Some(value.clone()),
            (Shape::Nullable(_), Value::Null) => Some(Value::Null),
            (Shape::Nullable(inner) | Shape::Optional(inner), _) => inner.parse(value, path, violations),
            (Shape::String, Value::String(_))
            | (Shape::Number, Value::Number(_))
            | (Shape::Boolean, Value::Bool(_)) => Some(value.clone()),
            (Shape::List(element), Value::Array(elements)) => {
                let mut parsed = Vec::with_capacity(elements.len());
                for (index, element_value) in elements.iter().enumerate() {
                    let path = format!("{}[{}]", path, index);
                    parsed.extend(element.parse(element_value, &path, violations));
                }
                (parsed.len() == elements.len()).then_some(Value::Array(parsed))
            }
            (Shape::Record(member), Value::Object(members)) => {
                let mut parsed = Map::with_capacity(members.len());
                for (key, member_value) in members {
                    if let Some(v) = member.parse(member_value, &join(path, key), violations) {
                        parsed.insert(key.clone(), v);
                    }
                }
                (parsed.len() == members.len()).then_some(Value::Object(parsed))
            }
            (Shape::Object(schema), Value::Object(members)) => {
                schema.parse_at(members, path, violations).map(Value::Object)
            }
            (shape, value) => {
                violations.push(Violation::new(
                    path,
                    format!("expected {}, found {}", shape.expected(), kind(value)),
                ));
                None
            }
        }
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a map",
    }
}

/// A declarative item schema.
///
/// ```
/// use zynamo::schema::{ObjectSchema, Schema, Shape};
///
/// let schema = ObjectSchema::new()
///     .field("foo", Shape::String)
///     .field("dog", Shape::optional(Shape::String))
///     .field("fishes", Shape::list(Shape::String));
/// let item = serde_json::json!({"foo": "a", "fishes": ["b"]});
/// assert!(schema.parse(item.as_object().unwrap()).is_ok());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectSchema {
    fields: Vec<(String, Shape)>,
    unknown_keys: UnknownKeys,
}

impl ObjectSchema {
    /// An object with no declared fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name` with `shape`. Fields are required unless [`Shape::Optional`],
    /// possibly wrapped in [`Shape::Nullable`].
    pub fn field(mut self, name: impl Into<String>, shape: Shape) -> Self {
        let name = name.into();
        self.fields.retain(|(existing, _)| *existing != name);
        self.fields.push((name, shape));
        self
    }

    /// Set what happens to undeclared keys.
    pub fn unknown_keys(mut self, unknown_keys: UnknownKeys) -> Self {
        self.unknown_keys = unknown_keys;
        self
    }

    /// Reject undeclared keys.
    pub fn strict(self) -> Self {
        self.unknown_keys(UnknownKeys::Strict)
    }

    /// Keep undeclared keys in the output.
    pub fn passthrough(self) -> Self {
        self.unknown_keys(UnknownKeys::Passthrough)
    }

    fn declares(&self, key: &str) -> bool {
        self.fields.iter().any(|(name, _)| name == key)
    }

    fn parse_at(&self, item: &Item, path: &str, violations: &mut Vec<Violation>) -> Option<Item> {
        let before = violations.len();
        let mut parsed = Map::new();
        for (name, shape) in &self.fields {
            let field_path = join(path, name);
            match (item.get(name), shape) {
                (None, shape) if shape.accepts_absent() => {}
                (None, _) => violations.push(Violation::new(field_path, "required")),
                (Some(value), shape) => {
                    if let Some(value) = shape.parse(value, &field_path, violations) {
                        parsed.insert(name.clone(), value);
                    }
                }
            }
        }
        for (key, value) in item {
            if self.declares(key) {
                continue;
            }
            match self.unknown_keys {
                UnknownKeys::Strip => {}
                UnknownKeys::Passthrough => {
                    parsed.insert(key.clone(), value.clone());
                }
                UnknownKeys::Strict => {
                    violations.push(Violation::new(join(path, key), "unrecognized key"))
                }
            }
        }
        (violations.len() == before).then_some(parsed)
    }
}

impl Schema for ObjectSchema {
    type Output = Item;

    fn parse(&self, item: &Item) -> Result<Item, ValidationError> {
        let mut violations = Vec::new();
        self.parse_at(item, "", &mut violations)
            .ok_or_else(|| ValidationError::new(violations))
    }
}

/// Parses items into `T` with serde.
///
/// The first serde error is the only violation reported.
pub struct Typed<T> {
    _output: PhantomData<fn() -> T>,
}

impl<T> Typed<T> {
    /// A schema parsing into `T`.
    pub fn new() -> Self {
        Self {
            _output: PhantomData,
        }
    }
}

impl<T> Default for Typed<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Typed<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Typed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Typed<{}>", std::any::type_name::<T>())
    }
}

impl<T> Schema for Typed<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    type Output = T;

    fn parse(&self, item: &Item) -> Result<T, ValidationError> {
        serde_json::from_value(Value::Object(item.clone()))
            .map_err(|err| ValidationError::new(vec![Violation::new("", err.to_string())]))
    }
}
