/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Connectors useful for testing code built on the DynamoDB client.

mod local_dynamo;

use crate::config::Credentials;

pub use local_dynamo::LocalDynamo;
pub use zynamo_runtime::test_util::{CaptureRequest, InfallibleClient};

/// Fixed credentials, accepted by [`LocalDynamo`] and by DynamoDB Local.
pub fn test_credentials() -> Credentials {
    Credentials::new("AKIDEXAMPLE", "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY", None, None, "test")
}
