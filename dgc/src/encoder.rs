// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Token encoding: CWT claims → signed text token.

use dgc_cose::{Sign1Message, SigningKeyPair};

use crate::cwt::CwtClaims;
use crate::decoder::TOKEN_PREFIX;
use crate::error::DgcError;
use crate::{base45, compression};

/// Intermediate byte buffers from an encode call, exposed for diagnostics
/// and interoperability testing.
#[derive(Debug, Clone)]
pub struct EncodeIntermediates {
    /// The CWT claim map CBOR (the bytes that get signed inside COSE).
    pub cwt_bytes: Vec<u8>,
    /// The complete tagged COSE_Sign1 CBOR.
    pub cose_bytes: Vec<u8>,
    /// The zlib-compressed COSE bytes.
    pub compressed_bytes: Vec<u8>,
    /// The Base45 token body, without the `HC1:` marker.
    pub base45: String,
}

/// Encodes and signs certificate tokens with an injected key pair.
///
/// The signature algorithm is resolved once from the key kind: ES256 for
/// P-256 keys, PS256 for RSA keys.
#[derive(Debug, Clone)]
pub struct CertificateEncoder {
    key: SigningKeyPair,
    key_id: String,
}

impl CertificateEncoder {
    /// `key_id` is the standard-base64 key id the matching trust store
    /// entry is registered under.
    pub fn new(key: SigningKeyPair, key_id: impl Into<String>) -> Self {
        Self {
            key,
            key_id: key_id.into(),
        }
    }

    /// Encode `claims` into a signed `HC1:` token.
    pub fn encode(&self, claims: &CwtClaims) -> Result<String, DgcError> {
        let (token, _) = self.encode_with_intermediates(claims)?;
        Ok(token)
    }

    /// Encode `claims`, also returning each pipeline stage's bytes.
    pub fn encode_with_intermediates(
        &self,
        claims: &CwtClaims,
    ) -> Result<(String, EncodeIntermediates), DgcError> {
        let cwt_bytes = claims.encode()?;
        let message = Sign1Message::sign(cwt_bytes.clone(), &self.key, &self.key_id)?;
        let cose_bytes = message.encode()?;
        let compressed_bytes = compression::compress(&cose_bytes)?;
        let base45 = base45::encode(&compressed_bytes);

        tracing::debug!(
            alg = ?message.algorithm(),
            kid = %self.key_id,
            token_len = TOKEN_PREFIX.len() + base45.len(),
            "encoded certificate token"
        );

        let token = format!("{TOKEN_PREFIX}{base45}");
        Ok((
            token,
            EncodeIntermediates {
                cwt_bytes,
                cose_bytes,
                compressed_bytes,
                base45,
            },
        ))
    }
}
