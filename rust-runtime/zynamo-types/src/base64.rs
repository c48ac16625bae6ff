/*
 * Copyright Zynamo Developers. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! A thin wrapper over `base64-simd`

use std::error::Error;
use std::fmt;

/// Failure to decode a base64 value.
#[derive(Debug)]
pub struct DecodeError(base64_simd::Error);

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to decode base64")
    }
}

impl Error for DecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

/// Decode `input` from base64 using the standard base64 alphabet
///
/// If input is not a valid base64 encoded string, this function will return `DecodeError`.
pub fn decode(input: impl AsRef<str>) -> Result<Vec<u8>, DecodeError> {
    base64_simd::STANDARD
        .decode_to_vec(input.as_ref())
        .map_err(DecodeError)
}

/// Encode `input` into base64 using the standard base64 alphabet
pub fn encode(input: impl AsRef<[u8]>) -> String {
    base64_simd::STANDARD.encode_to_string(input.as_ref())
}

#[cfg(test)]
mod test {
    use super::{decode, encode};

    #[test]
    fn round_trips_through_standard_alphabet() {
        assert_eq!(encode(b"AWS"), "QVdT");
        assert_eq!(decode("QVdT").expect("valid base64"), b"AWS".to_vec());
    }

    #[test]
    fn invalid_input_is_an_error() {
        assert!(decode("not base64!").is_err());
    }
}
