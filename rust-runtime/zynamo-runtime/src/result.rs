/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The error returned by every client call.

use crate::http::HttpResponse;
use crate::BoxError;
use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};

/// Failing result of sending a command.
///
/// `E` is the service's modeled error. Inside the pipeline the service error is
/// carried as a [`BoxError`] and narrowed with
/// [`SdkError::downcast_service_error`] once the call completes.
#[derive(Debug)]
pub enum SdkError<E> {
    /// The request failed during construction. It was not dispatched over the network.
    ConstructionFailure(BoxError),

    /// The request failed during dispatch. An HTTP response was not received. The request MAY
    /// have been sent.
    DispatchFailure(BoxError),

    /// A response was received but it was not parseable according to the protocol.
    ResponseError {
        /// The raw response.
        raw: HttpResponse,
        /// Why it could not be parsed.
        err: BoxError,
    },

    /// An error response was received from the service.
    ServiceError {
        /// The raw response.
        raw: HttpResponse,
        /// The modeled service error.
        err: E,
    },
}

impl<E> SdkError<E> {
    /// Construct a [`SdkError::ConstructionFailure`].
    pub fn construction_failure(err: impl Into<BoxError>) -> Self {
        SdkError::ConstructionFailure(err.into())
    }

    /// Construct a [`SdkError::DispatchFailure`].
    pub fn dispatch_failure(err: impl Into<BoxError>) -> Self {
        SdkError::DispatchFailure(err.into())
    }

    /// The service error, if the service answered with one.
    pub fn service_error(&self) -> Option<&E> {
        match self {
            SdkError::ServiceError { err, .. } => Some(err),
            _ => None,
        }
    }

    /// Consume the error, returning the service error if there is one.
    pub fn into_service_error(self) -> Option<E> {
        match self {
            SdkError::ServiceError { err, .. } => Some(err),
            _ => None,
        }
    }

    /// The raw HTTP response, if one was received.
    pub fn raw_response(&self) -> Option<&HttpResponse> {
        match self {
            SdkError::ResponseError { raw, .. } | SdkError::ServiceError { raw, .. } => Some(raw),
            _ => None,
        }
    }

    /// Map the service error, leaving every other variant untouched.
    pub fn map_service_error<E2>(self, f: impl FnOnce(E) -> E2) -> SdkError<E2> {
        match self {
            SdkError::ConstructionFailure(err) => SdkError::ConstructionFailure(err),
            SdkError::DispatchFailure(err) => SdkError::DispatchFailure(err),
            SdkError::ResponseError { raw, err } => SdkError::ResponseError { raw, err },
            SdkError::ServiceError { raw, err } => SdkError::ServiceError { raw, err: f(err) },
        }
    }
}

impl SdkError<BoxError> {
    /// Narrow a boxed service error to `E`.
    ///
    /// A service error of any other type becomes a [`SdkError::ResponseError`].
    pub fn downcast_service_error<E: Error + 'static>(self) -> SdkError<E> {
        match self {
            SdkError::ServiceError { raw, err } => match err.downcast::<E>() {
                Ok(err) => SdkError::ServiceError { raw, err: *err },
                Err(err) => SdkError::ResponseError { raw, err },
            },
            SdkError::ConstructionFailure(err) => SdkError::ConstructionFailure(err),
            SdkError::DispatchFailure(err) => SdkError::DispatchFailure(err),
            SdkError::ResponseError { raw, err } => SdkError::ResponseError { raw, err },
        }
    }
}

impl<E> Display for SdkError<E>
where
    E: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SdkError::ConstructionFailure(err) => write!(f, "failed to construct request: {}", err),
            SdkError::DispatchFailure(err) => write!(f, "dispatch failure: {}", err),
            SdkError::ResponseError { raw, err } => {
                write!(f, "response error (status {}): {}", raw.status(), err)
            }
            SdkError::ServiceError { err, .. } => write!(f, "service error: {}", err),
        }
    }
}

impl<E> Error for SdkError<E>
where
    E: Error + 'static,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SdkError::ConstructionFailure(err)
            | SdkError::DispatchFailure(err)
            | SdkError::ResponseError { err, .. } => Some(err.as_ref()),
            SdkError::ServiceError { err, .. } => Some(err),
        }
    }
}
