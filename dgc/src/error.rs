// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for the certificate pipeline.

use thiserror::Error;

pub use dgc_cose::CoseError;

/// Errors from the Base45 text codec.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Base45Error {
    /// Encoded length ≡ 1 (mod 3) cannot decode to whole bytes.
    #[error("incorrect length: {0} is 1 mod 3")]
    InvalidLength(usize),

    /// A character outside the 45-symbol alphabet.
    #[error("invalid character at position {position}")]
    InvalidCharacter { position: usize },
}

/// Errors from decoding or encoding a certificate token.
#[derive(Debug, Error)]
pub enum DgcError {
    /// The token does not carry the `HC1:` marker.
    #[error("token does not start with the HC1: prefix")]
    InvalidPrefix,

    #[error(transparent)]
    Base45(#[from] Base45Error),

    /// The compressed payload is corrupt.
    #[error("compression codec error: {0}")]
    Codec(#[from] std::io::Error),

    #[error(transparent)]
    Cose(#[from] CoseError),

    /// A required CWT claim is absent or the HCERT container is malformed.
    #[error("malformed CWT claims: {0}")]
    MalformedClaims(String),
}
