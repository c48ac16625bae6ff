/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Key condition expressions checked against a table's key schema.
//!
//! [`KeyCondition::parse`] accepts an equality on the partition key, optionally
//! followed by `AND` and one predicate on the sort key, and binds every
//! `:placeholder` to its value.

use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use zynamo_dynamodb::expression::{self, ComparisonOperator, KeyPredicate, ParseError};
use zynamo_types::Item;

/// The key attributes of a table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeySchema {
    /// The partition (hash) key.
    pub partition_key: String,
    /// The sort (range) key, if the table has one.
    pub sort_key: Option<String>,
}

impl KeySchema {
    /// A table keyed by `partition_key` only.
    pub fn new(partition_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: None,
        }
    }

    /// Add a sort key.
    pub fn with_sort_key(mut self, sort_key: impl Into<String>) -> Self {
        self.sort_key = Some(sort_key.into());
        self
    }
}

/// A key condition that does not fit the key schema.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KeyConditionError {
    /// The expression is malformed.
    #[error("malformed key condition")]
    Syntax(#[from] ParseError),
    /// The first predicate names another attribute.
    #[error("`{given}` in the key condition must be the partition key `{expected}`")]
    WrongPartitionKey {
        /// The attribute in the expression.
        given: String,
        /// The partition key.
        expected: String,
    },
    /// The partition key is not compared with `=`.
    #[error("the partition key `{name}` must be compared with `=`")]
    PartitionKeyNotEquality {
        /// The partition key.
        name: String,
    },
    /// The second predicate names another attribute.
    #[error("`{given}` in the key condition must be the sort key `{expected}`")]
    WrongSortKey {
        /// The attribute in the expression.
        given: String,
        /// The sort key.
        expected: String,
    },
    /// A sort key predicate was given but the table has no sort key.
    #[error("`{given}` cannot be used in the key condition, the table has no sort key")]
    NoSortKey {
        /// The attribute in the expression.
        given: String,
    },
    /// A value placeholder has no value.
    #[error("`{0}` is not a key of ExpressionAttributeValues")]
    MissingValue(String),
    /// A name placeholder has no name.
    #[error("`{0}` is not a key of ExpressionAttributeNames")]
    MissingName(String),
}

/// A condition on the sort key, with its values bound.
#[derive(Clone, Debug, PartialEq)]
pub enum SortKeyCondition {
    /// `sort_key op value`
    Comparison {
        /// The operator.
        operator: ComparisonOperator,
        /// The operand.
        value: Value,
    },
    /// `sort_key BETWEEN low AND high`
    Between {
        /// Inclusive lower bound.
        low: Value,
        /// Inclusive upper bound.
        high: Value,
    },
    /// `begins_with(sort_key, prefix)`
    BeginsWith {
        /// The prefix.
        prefix: Value,
    },
}

/// A key condition with its attribute names and values resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyCondition {
    /// The partition key.
    pub partition_key: String,
    /// The value the partition key must equal.
    pub partition_value: Value,
    /// The sort key condition, if any.
    pub sort: Option<SortKeyCondition>,
}

impl KeyCondition {
    /// Parse `expression` against `key_schema`, binding placeholders from `values`.
    pub fn parse(
        expression: &str,
        key_schema: &KeySchema,
        values: &Item,
    ) -> Result<Self, KeyConditionError> {
        Self::parse_with_names(expression, key_schema, values, None)
    }

    /// Like [`KeyCondition::parse`], resolving `#placeholders` through `names`.
    pub fn parse_with_names(
        expression: &str,
        key_schema: &KeySchema,
        values: &Item,
        names: Option<&HashMap<String, String>>,
    ) -> Result<Self, KeyConditionError> {
        let mut predicates = expression::parse(expression)?.into_predicates().into_iter();
        let value = |placeholder: &str| {
            values
                .get(placeholder)
                .cloned()
                .ok_or_else(|| KeyConditionError::MissingValue(placeholder.to_string()))
        };
        let name = |predicate: &KeyPredicate| {
            expression::resolve_name(predicate.name(), names)
                .map(str::to_string)
                .ok_or_else(|| KeyConditionError::MissingName(predicate.name().to_string()))
        };

        // The expression parser never returns an empty predicate list.
        let Some(partition) = predicates.next() else {
            return Err(KeyConditionError::MissingName(String::new()));
        };
        let partition_key = name(&partition)?;
        if partition_key != key_schema.partition_key {
            return Err(KeyConditionError::WrongPartitionKey {
                given: partition_key,
                expected: key_schema.partition_key.clone(),
            });
        }
        let partition_value = match &partition {
            KeyPredicate::Comparison {
                operator: ComparisonOperator::Eq,
                value: placeholder,
                ..
            } => value(placeholder)?,
            _ => return Err(KeyConditionError::PartitionKeyNotEquality { name: partition_key }),
        };

        let sort = match predicates.next() {
            None => None,
            Some(predicate) => {
                let given = name(&predicate)?;
                match &key_schema.sort_key {
                    None => return Err(KeyConditionError::NoSortKey { given }),
                    Some(expected) if *expected != given => {
                        return Err(KeyConditionError::WrongSortKey {
                            given,
                            expected: expected.clone(),
                        })
                    }
                    Some(_) => {}
                }
                Some(match predicate {
                    KeyPredicate::Comparison {
                        operator,
                        value: placeholder,
                        ..
                    } => SortKeyCondition::Comparison {
                        operator,
                        value: value(&placeholder)?,
                    },
                    KeyPredicate::Between { low, high, .. } => SortKeyCondition::Between {
                        low: value(&low)?,
                        high: value(&high)?,
                    },
                    KeyPredicate::BeginsWith { prefix, .. } => SortKeyCondition::BeginsWith {
                        prefix: value(&prefix)?,
                    },
                })
            }
        };

        Ok(Self {
            partition_key,
            partition_value,
            sort,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn values(value: Value) -> Item {
        value.as_object().cloned().unwrap()
    }

    fn schema() -> KeySchema {
        KeySchema::new("foo").with_sort_key("created")
    }

    #[test]
    fn partition_key_only() {
        let condition =
            KeyCondition::parse("foo = :foo", &KeySchema::new("foo"), &values(json!({":foo": "a"})))
                .unwrap();
        assert_eq!(
            condition,
            KeyCondition {
                partition_key: "foo".into(),
                partition_value: json!("a"),
                sort: None,
            }
        );
    }

    #[test]
    fn binds_sort_key_predicates() {
        let values = values(json!({":foo": "a", ":lo": 1, ":hi": 9, ":p": "2024"}));
        let between = KeyCondition::parse("foo = :foo AND created BETWEEN :lo AND :hi", &schema(), &values)
            .unwrap();
        assert_eq!(
            between.sort,
            Some(SortKeyCondition::Between {
                low: json!(1),
                high: json!(9)
            })
        );
        let prefix = KeyCondition::parse("foo = :foo and begins_with(created, :p)", &schema(), &values)
            .unwrap();
        assert_eq!(
            prefix.sort,
            Some(SortKeyCondition::BeginsWith { prefix: json!("2024") })
        );
        let lt = KeyCondition::parse("foo = :foo AND created < :hi", &schema(), &values).unwrap();
        assert_eq!(
            lt.sort,
            Some(SortKeyCondition::Comparison {
                operator: ComparisonOperator::Lt,
                value: json!(9)
            })
        );
    }

    #[test]
    fn wrong_partition_key() {
        let err = KeyCondition::parse("bar = :bar", &schema(), &values(json!({":bar": 1}))).unwrap_err();
        assert!(matches!(
            &err,
            KeyConditionError::WrongPartitionKey { given, expected } if given == "bar" && expected == "foo"
        ));
        assert_eq!(
            err.to_string(),
            "`bar` in the key condition must be the partition key `foo`"
        );
    }

    #[test]
    fn malformed_expression() {
        let err = KeyCondition::parse("bar=", &schema(), &values(json!({}))).unwrap_err();
        assert!(matches!(err, KeyConditionError::Syntax(_)));
    }

    #[test]
    fn partition_key_must_be_equality() {
        let err = KeyCondition::parse("foo > :foo", &schema(), &values(json!({":foo": 1}))).unwrap_err();
        assert!(matches!(err, KeyConditionError::PartitionKeyNotEquality { .. }));
    }

    #[test]
    fn sort_key_checks() {
        let values = values(json!({":foo": "a", ":x": 1}));
        let err = KeyCondition::parse("foo = :foo AND other = :x", &schema(), &values).unwrap_err();
        assert!(matches!(err, KeyConditionError::WrongSortKey { .. }));
        let err = KeyCondition::parse("foo = :foo AND other = :x", &KeySchema::new("foo"), &values)
            .unwrap_err();
        assert!(matches!(err, KeyConditionError::NoSortKey { given } if given == "other"));
    }

    #[test]
    fn placeholders_must_be_bound() {
        let err = KeyCondition::parse("foo = :missing", &schema(), &values(json!({}))).unwrap_err();
        assert!(matches!(err, KeyConditionError::MissingValue(p) if p == ":missing"));

        let names: HashMap<String, String> = [("#k".to_string(), "foo".to_string())].into();
        let condition = KeyCondition::parse_with_names(
            "#k = :v",
            &schema(),
            &values(json!({":v": "a"})),
            Some(&names),
        )
        .unwrap();
        assert_eq!(condition.partition_key, "foo");
        let err = KeyCondition::parse_with_names("#nope = :v", &schema(), &values(json!({":v": "a"})), Some(&names))
            .unwrap_err();
        assert!(matches!(err, KeyConditionError::MissingName(n) if n == "#nope"));
    }
}
