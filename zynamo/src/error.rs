/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::expression::KeyConditionError;
use crate::schema::ValidationError;
use thiserror::Error;
use zynamo_runtime::SdkError;

/// Failure of a [`SchemaClient`](crate::SchemaClient) call.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// An item did not match the schema. Nothing was written, or the read was discarded.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A query's key condition does not fit the table's key schema. Nothing was sent.
    #[error(transparent)]
    KeyCondition(#[from] KeyConditionError),
    /// The transport failed.
    #[error(transparent)]
    Sdk(#[from] SdkError<zynamo_dynamodb::Error>),
}

impl Error {
    /// The schema violations, if this is a validation failure.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Error::Validation(err) => Some(err),
            _ => None,
        }
    }

    /// The service error, if DynamoDB rejected the request.
    pub fn service_error(&self) -> Option<&zynamo_dynamodb::Error> {
        match self {
            Error::Sdk(err) => err.service_error(),
            _ => None,
        }
    }
}
