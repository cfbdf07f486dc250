// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Shared helpers for `dgc-cose` integration tests.
//!
//! These build key pairs and hand-rolled COSE_Sign1 byte structures so each
//! test file can focus on one production code path.

#![allow(dead_code)]

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use minicbor::data::Tag;
use minicbor::Encoder;
use rand_core::OsRng;

use dgc_cose::SigningKeyPair;

/// A fixed, valid standard-base64 key id for tests.
pub(crate) fn test_key_id() -> String {
    STANDARD.encode(b"test-kid")
}

pub(crate) fn make_ec_key() -> SigningKeyPair {
    SigningKeyPair::from(p256::ecdsa::SigningKey::random(&mut OsRng))
}

pub(crate) fn make_rsa_key() -> SigningKeyPair {
    let key = rsa::RsaPrivateKey::new(&mut OsRng, 2048).expect("RSA key generation");
    SigningKeyPair::from(key)
}

/// Creates a self-signed P-256 certificate and matching signing key.
pub(crate) fn make_self_signed_p256_cert_and_key() -> (Vec<u8>, SigningKeyPair) {
    use p256::pkcs8::DecodePrivateKey as _;

    let certified = rcgen::generate_simple_self_signed(["example.test".to_string()]).unwrap();
    let cert_der = certified.cert.der().to_vec();

    // rcgen generates a key pair; for generate_simple_self_signed this is P-256.
    let key_der = certified.key_pair.serialize_der();
    let signing_key = p256::ecdsa::SigningKey::from_pkcs8_der(&key_der).unwrap();

    (cert_der, SigningKeyPair::from(signing_key))
}

/// Encodes a protected header map with integer keys and values.
pub(crate) fn encode_protected_header(entries: &[(i64, i64)]) -> Vec<u8> {
    let mut enc = Encoder::new(Vec::new());
    enc.map(entries.len() as u64).unwrap();
    for (key, value) in entries {
        enc.i64(*key).unwrap();
        enc.i64(*value).unwrap();
    }
    enc.into_writer()
}

/// Encodes a protected header map carrying an algorithm and a kid bstr.
pub(crate) fn encode_protected_header_with_kid(alg: i64, kid: &[u8]) -> Vec<u8> {
    let mut enc = Encoder::new(Vec::new());
    enc.map(2).unwrap();
    enc.i64(1).unwrap();
    enc.i64(alg).unwrap();
    enc.i64(4).unwrap();
    enc.bytes(kid).unwrap();
    enc.into_writer()
}

/// Encodes a COSE_Sign1 message from components.
///
/// This is a focused test helper, not a general-purpose COSE encoder.
pub(crate) fn encode_cose_sign1(
    tag: Option<u64>,
    protected_bstr_contents: &[u8],
    unprotected_kid: Option<&[u8]>,
    payload: Option<&[u8]>,
    signature: &[u8],
) -> Vec<u8> {
    let mut enc = Encoder::new(Vec::new());

    if let Some(tag) = tag {
        enc.tag(Tag::new(tag)).unwrap();
    }

    enc.array(4).unwrap();
    enc.bytes(protected_bstr_contents).unwrap();
    match unprotected_kid {
        Some(kid) => {
            enc.map(1).unwrap();
            enc.i64(4).unwrap();
            enc.bytes(kid).unwrap();
        }
        None => {
            enc.map(0).unwrap();
        }
    }
    match payload {
        Some(p) => enc.bytes(p).unwrap(),
        None => enc.null().unwrap(),
    };
    enc.bytes(signature).unwrap();

    enc.into_writer()
}
