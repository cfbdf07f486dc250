// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Token decoding: text token → CWT.

use dgc_cose::Sign1Message;

use crate::cwt::Cwt;
use crate::error::DgcError;
use crate::{base45, compression};

/// The fixed marker prefixing every certificate token.
pub const TOKEN_PREFIX: &str = "HC1:";

/// Decode a certificate token.
///
/// Pipeline: strip the `HC1:` marker → Base45 decode → inflate if the zlib
/// header is present → COSE_Sign1 decode → CWT claims decode. The first
/// failing layer's error surfaces unchanged.
pub fn decode_certificate(token: &str) -> Result<Cwt, DgcError> {
    let body = token
        .strip_prefix(TOKEN_PREFIX)
        .ok_or(DgcError::InvalidPrefix)?;

    let decoded = base45::decode(body)?;
    let cose_bytes = compression::decompress_if_needed(&decoded)?;
    tracing::debug!(
        base45_len = body.len(),
        cose_len = cose_bytes.len(),
        compressed = cose_bytes.len() != decoded.len(),
        "decoded token framing"
    );

    let message = Sign1Message::decode(&cose_bytes)?;
    Cwt::from_message(message)
}
