// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! CWT claims carried in the COSE_Sign1 payload.
//!
//! The claim set uses the registered integer keys: issuer (1), expiration
//! (4), issued-at (6), and the HCERT container (−260) whose sub-key 1 holds
//! the certificate payload. Timestamps are Unix seconds; expiration policy
//! belongs to the verifier, not this layer.

use minicbor::data::Type;
use minicbor::{Decoder, Encoder};

use dgc_cose::{CoseAlgorithm, Sign1Message};

use crate::certificate::DigitalGreenCertificate;
use crate::error::DgcError;

const CLAIM_ISSUER: i64 = 1;
const CLAIM_EXPIRES: i64 = 4;
const CLAIM_ISSUED_AT: i64 = 6;
const CLAIM_HCERT: i64 = -260;
const HCERT_DGC_V1: i64 = 1;

/// The CWT claim set of a certificate token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CwtClaims {
    /// Issuer (claim 1), usually an ISO 3166 country code.
    pub issuer: String,
    /// Issued-at (claim 6), Unix seconds.
    pub issued_at: i64,
    /// Expiration (claim 4), Unix seconds.
    pub expires_at: i64,
    /// The embedded certificate payload (claim −260, sub-key 1).
    pub certificate: DigitalGreenCertificate,
}

impl CwtClaims {
    /// Decode the claim map from a COSE_Sign1 payload.
    ///
    /// Unknown claims are skipped; all four required claims must be present.
    pub fn decode(payload: &[u8]) -> Result<Self, DgcError> {
        let mut dec = Decoder::new(payload);

        let len = dec
            .map()
            .map_err(|e| DgcError::MalformedClaims(format!("claim set is not a map: {e}")))?
            .ok_or_else(|| {
                DgcError::MalformedClaims(
                    "indefinite-length maps are not supported".to_string(),
                )
            })?;

        let mut issuer = None;
        let mut issued_at = None;
        let mut expires_at = None;
        let mut certificate = None;

        for _ in 0..len {
            let key = match read_int_key(&mut dec)? {
                Some(key) => key,
                None => {
                    dec.skip().map_err(cbor_err)?;
                    continue;
                }
            };
            match key {
                CLAIM_ISSUER => {
                    issuer = Some(
                        dec.str()
                            .map_err(|e| {
                                DgcError::MalformedClaims(format!(
                                    "issuer claim is not a text string: {e}"
                                ))
                            })?
                            .to_string(),
                    )
                }
                CLAIM_ISSUED_AT => issued_at = Some(read_timestamp(&mut dec, "issued-at")?),
                CLAIM_EXPIRES => expires_at = Some(read_timestamp(&mut dec, "expiration")?),
                CLAIM_HCERT => certificate = Some(decode_hcert(&mut dec)?),
                _ => dec.skip().map_err(cbor_err)?,
            }
        }

        Ok(CwtClaims {
            issuer: issuer
                .ok_or_else(|| DgcError::MalformedClaims("missing issuer claim (1)".to_string()))?,
            issued_at: issued_at.ok_or_else(|| {
                DgcError::MalformedClaims("missing issued-at claim (6)".to_string())
            })?,
            expires_at: expires_at.ok_or_else(|| {
                DgcError::MalformedClaims("missing expiration claim (4)".to_string())
            })?,
            certificate: certificate.ok_or_else(|| {
                DgcError::MalformedClaims("missing HCERT claim (-260)".to_string())
            })?,
        })
    }

    /// Encode the claim map to CBOR, ready to be signed as a COSE payload.
    pub fn encode(&self) -> Result<Vec<u8>, DgcError> {
        let mut enc = Encoder::new(Vec::new());
        enc.map(4).map_err(cbor_err)?;
        enc.i64(CLAIM_ISSUER).map_err(cbor_err)?;
        enc.str(&self.issuer).map_err(cbor_err)?;
        enc.i64(CLAIM_EXPIRES).map_err(cbor_err)?;
        enc.i64(self.expires_at).map_err(cbor_err)?;
        enc.i64(CLAIM_ISSUED_AT).map_err(cbor_err)?;
        enc.i64(self.issued_at).map_err(cbor_err)?;
        enc.i64(CLAIM_HCERT).map_err(cbor_err)?;
        enc.map(1).map_err(cbor_err)?;
        enc.i64(HCERT_DGC_V1).map_err(cbor_err)?;
        self.certificate.encode(&mut enc)?;
        Ok(enc.into_writer())
    }
}

/// A decoded certificate token: the claim set plus the COSE message it
/// arrived in, kept for signature verification and revocation hashing.
#[derive(Debug, Clone)]
pub struct Cwt {
    /// The decoded claim set.
    pub claims: CwtClaims,
    cose: Sign1Message,
}

impl Cwt {
    /// Parse the CWT claims out of a decoded COSE_Sign1 message.
    pub fn from_message(message: Sign1Message) -> Result<Self, DgcError> {
        let claims = CwtClaims::decode(message.payload())?;
        tracing::debug!(
            issuer = %claims.issuer,
            expires_at = claims.expires_at,
            "decoded CWT claims"
        );
        Ok(Cwt {
            claims,
            cose: message,
        })
    }

    /// The COSE_Sign1 message this claim set was decoded from.
    pub fn cose(&self) -> &Sign1Message {
        &self.cose
    }

    /// The key id used to select verification keys from a trust store.
    pub fn key_id(&self) -> String {
        self.cose.key_id()
    }

    pub fn algorithm(&self) -> CoseAlgorithm {
        self.cose.algorithm()
    }
}

/// Read an integer claim key; `None` consumes a non-integer key, leaving the
/// value for the caller to skip.
fn read_int_key(dec: &mut Decoder<'_>) -> Result<Option<i64>, DgcError> {
    match dec.datatype().map_err(cbor_err)? {
        Type::I8
        | Type::I16
        | Type::I32
        | Type::I64
        | Type::Int
        | Type::U8
        | Type::U16
        | Type::U32
        | Type::U64 => Ok(Some(dec.i64().map_err(cbor_err)?)),
        _ => {
            dec.skip().map_err(cbor_err)?;
            Ok(None)
        }
    }
}

/// Read a Unix-seconds timestamp, tolerating the epoch tag (1) and the
/// floating-point NumericDate form some issuers emit.
fn read_timestamp(dec: &mut Decoder<'_>, claim: &str) -> Result<i64, DgcError> {
    if matches!(dec.datatype().map_err(cbor_err)?, Type::Tag) {
        dec.tag().map_err(cbor_err)?;
    }
    match dec.datatype().map_err(cbor_err)? {
        Type::F32 => Ok(dec.f32().map_err(cbor_err)? as i64),
        Type::F64 => Ok(dec.f64().map_err(cbor_err)? as i64),
        _ => dec.i64().map_err(|e| {
            DgcError::MalformedClaims(format!("{claim} claim is not a timestamp: {e}"))
        }),
    }
}

fn decode_hcert(dec: &mut Decoder<'_>) -> Result<DigitalGreenCertificate, DgcError> {
    let len = dec
        .map()
        .map_err(|e| DgcError::MalformedClaims(format!("HCERT claim is not a map: {e}")))?
        .ok_or_else(|| {
            DgcError::MalformedClaims("indefinite-length maps are not supported".to_string())
        })?;

    let mut certificate = None;
    for _ in 0..len {
        let key = read_int_key(dec)?;
        match key {
            Some(HCERT_DGC_V1) => certificate = Some(DigitalGreenCertificate::decode(dec)?),
            Some(_) => dec.skip().map_err(cbor_err)?,
            // Non-integer key: its value still needs skipping.
            None => dec.skip().map_err(cbor_err)?,
        }
    }

    certificate
        .ok_or_else(|| DgcError::MalformedClaims("HCERT claim is missing sub-key 1".to_string()))
}

fn cbor_err<E: std::fmt::Display>(e: E) -> DgcError {
    DgcError::MalformedClaims(e.to_string())
}
