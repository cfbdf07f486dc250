// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! COSE header map types and decoding.
//!
//! COSE header parameters live in two header maps:
//! - Protected headers: encoded as a CBOR bstr containing a CBOR map
//! - Unprotected headers: encoded as an inline CBOR map
//!
//! The decoder is intentionally conservative:
//! - Only supports the CBOR types this pipeline needs.
//! - Rejects indefinite-length arrays/maps.
//! - Rejects unsupported key/value types with clear errors.

use std::collections::BTreeMap;

use minicbor::data::Type;
use minicbor::Decoder;

use crate::error::CoseError;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum HeaderKey {
    /// Integer label (the most common COSE header key form).
    Int(i64),
    /// Text label.
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
    Int(i64),
    Bytes(Vec<u8>),
    Text(String),
    Array(Vec<HeaderValue>),
    Map(BTreeMap<HeaderKey, HeaderValue>),
    Bool(bool),
    Null,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CoseHeaderMap {
    /// For protected headers, COSE requires the original CBOR bytes (bstr
    /// content) to be included in Sig_structure. We retain those bytes to
    /// avoid re-encoding.
    encoded_map_cbor: Vec<u8>,

    /// Decoded map used for lookups.
    map: BTreeMap<HeaderKey, HeaderValue>,
}

impl CoseHeaderMap {
    /// Construct a protected header map from its original CBOR bytes + decoded map.
    pub fn new_protected(encoded_map_cbor: Vec<u8>, map: BTreeMap<HeaderKey, HeaderValue>) -> Self {
        Self { encoded_map_cbor, map }
    }

    /// Construct an unprotected header map from a decoded map.
    ///
    /// Unprotected headers are not part of Sig_structure, so `encoded_map_cbor` is empty.
    pub fn new_unprotected(map: BTreeMap<HeaderKey, HeaderValue>) -> Self {
        Self {
            encoded_map_cbor: Vec::new(),
            map,
        }
    }

    pub fn encoded_map_cbor(&self) -> &[u8] {
        &self.encoded_map_cbor
    }

    pub fn get_i64(&self, key: i64) -> Option<i64> {
        self.map.get(&HeaderKey::Int(key)).and_then(|v| match v {
            HeaderValue::Int(i) => Some(*i),
            _ => None,
        })
    }

    pub fn get_bytes(&self, key: i64) -> Option<&[u8]> {
        self.map.get(&HeaderKey::Int(key)).and_then(|v| match v {
            HeaderValue::Bytes(b) => Some(b.as_slice()),
            _ => None,
        })
    }

    pub fn map(&self) -> &BTreeMap<HeaderKey, HeaderValue> {
        &self.map
    }
}

/// Decode a header map from the CBOR bytes contained within a protected header bstr.
///
/// An empty bstr is treated as an empty map, which some producers emit.
pub(crate) fn decode_header_map_from_cbor(
    bytes: &[u8],
) -> Result<BTreeMap<HeaderKey, HeaderValue>, CoseError> {
    if bytes.is_empty() {
        return Ok(BTreeMap::new());
    }

    let mut dec = Decoder::new(bytes);

    let len = dec
        .map()
        .map_err(|e| CoseError::MalformedMessage(format!("failed to read header map: {e}")))?
        .ok_or_else(|| {
            CoseError::MalformedMessage("indefinite-length maps are not supported".to_string())
        })?;

    let mut map = BTreeMap::new();
    for _ in 0..len {
        let key = decode_header_key(&mut dec)?;
        let value = decode_header_value(&mut dec)?;
        map.insert(key, value);
    }

    if dec.position() != bytes.len() {
        return Err(CoseError::MalformedMessage(
            "trailing bytes after header map".to_string(),
        ));
    }

    Ok(map)
}

/// Decode a header map directly from a CBOR decoder.
///
/// This is used for unprotected headers, which appear inline in COSE_Sign1.
pub(crate) fn decode_header_map_from_decoder(
    dec: &mut Decoder<'_>,
) -> Result<BTreeMap<HeaderKey, HeaderValue>, CoseError> {
    let len = dec
        .map()
        .map_err(|e| CoseError::MalformedMessage(format!("failed to read header map: {e}")))?
        .ok_or_else(|| {
            CoseError::MalformedMessage("indefinite-length maps are not supported".to_string())
        })?;

    let mut map = BTreeMap::new();
    for _ in 0..len {
        let key = decode_header_key(dec)?;
        let value = decode_header_value(dec)?;
        map.insert(key, value);
    }

    Ok(map)
}

fn decode_header_key(dec: &mut Decoder<'_>) -> Result<HeaderKey, CoseError> {
    match datatype(dec)? {
        Type::I8
        | Type::I16
        | Type::I32
        | Type::I64
        | Type::Int
        | Type::U8
        | Type::U16
        | Type::U32
        | Type::U64 => {
            let i = dec.i64().map_err(|e| {
                CoseError::MalformedMessage(format!("failed to decode int header key: {e}"))
            })?;
            Ok(HeaderKey::Int(i))
        }
        Type::String => {
            let s = dec.str().map_err(|e| {
                CoseError::MalformedMessage(format!("failed to decode text header key: {e}"))
            })?;
            Ok(HeaderKey::Text(s.to_string()))
        }
        other => Err(CoseError::MalformedMessage(format!(
            "unsupported header key type: {other:?}"
        ))),
    }
}

fn decode_header_value(dec: &mut Decoder<'_>) -> Result<HeaderValue, CoseError> {
    match datatype(dec)? {
        Type::Null => {
            dec.null().map_err(cbor_err)?;
            Ok(HeaderValue::Null)
        }
        Type::Bool => {
            let b = dec.bool().map_err(cbor_err)?;
            Ok(HeaderValue::Bool(b))
        }
        Type::Bytes => {
            let b = dec.bytes().map_err(cbor_err)?;
            Ok(HeaderValue::Bytes(b.to_vec()))
        }
        Type::String => {
            let s = dec.str().map_err(cbor_err)?;
            Ok(HeaderValue::Text(s.to_string()))
        }
        Type::I8
        | Type::I16
        | Type::I32
        | Type::I64
        | Type::Int
        | Type::U8
        | Type::U16
        | Type::U32
        | Type::U64 => {
            let i = dec.i64().map_err(cbor_err)?;
            Ok(HeaderValue::Int(i))
        }
        Type::Array => {
            let len = dec
                .array()
                .map_err(cbor_err)?
                .ok_or_else(|| {
                    CoseError::MalformedMessage(
                        "indefinite-length arrays are not supported".to_string(),
                    )
                })?;
            let mut out = Vec::with_capacity(len as usize);
            for _ in 0..len {
                out.push(decode_header_value(dec)?);
            }
            Ok(HeaderValue::Array(out))
        }
        Type::Map => {
            let len = dec
                .map()
                .map_err(cbor_err)?
                .ok_or_else(|| {
                    CoseError::MalformedMessage(
                        "indefinite-length maps are not supported".to_string(),
                    )
                })?;
            let mut out = BTreeMap::new();
            for _ in 0..len {
                let k = decode_header_key(dec)?;
                let v = decode_header_value(dec)?;
                out.insert(k, v);
            }
            Ok(HeaderValue::Map(out))
        }
        other => Err(CoseError::MalformedMessage(format!(
            "unsupported header value type: {other:?}"
        ))),
    }
}

fn datatype(dec: &mut Decoder<'_>) -> Result<Type, CoseError> {
    dec.datatype().map_err(cbor_err)
}

fn cbor_err<E: std::fmt::Display>(e: E) -> CoseError {
    CoseError::MalformedMessage(e.to_string())
}
