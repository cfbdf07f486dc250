// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for the COSE_Sign1 layer.

use thiserror::Error;

/// Errors produced while decoding, encoding, signing, or verifying a
/// COSE_Sign1 message.
#[derive(Debug, Error)]
pub enum CoseError {
    /// The CBOR structure does not form a valid COSE_Sign1 message.
    #[error("malformed COSE_Sign1 message: {0}")]
    MalformedMessage(String),

    /// The algorithm header carries a label outside the supported set.
    #[error("unsupported COSE algorithm: {0}")]
    UnsupportedAlgorithm(i64),

    /// An ECDSA signature violates the expected DER or R‖S layout.
    #[error("malformed ECDSA signature: {0}")]
    MalformedSignature(&'static str),

    /// The key id is not valid standard base64.
    #[error("invalid key id: {0}")]
    InvalidKeyId(base64::DecodeError),

    /// The verification key material could not be parsed.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// The key material is neither a P-256 nor an RSA key.
    #[error("unsupported key type")]
    UnsupportedKeyType,

    /// Signature generation failed.
    #[error("signing failed: {0}")]
    Signing(String),
}
