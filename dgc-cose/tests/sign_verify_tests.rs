// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for COSE_Sign1 signing and verification.

mod common;

use common::*;
use dgc_cose::{
    encode_sig_structure, CoseAlgorithm, CoseError, Sign1Message, SigningKeyPair,
    P256_COMPONENT_LEN,
};
use p256::pkcs8::EncodePrivateKey as _;
use rand_core::OsRng;

/// ES256: signing produces a raw 64-byte signature that verifies against
/// the signer's SPKI and fails against a different key.
#[test]
fn es256_sign_and_verify() {
    let key = make_ec_key();
    let msg = Sign1Message::sign(b"payload".to_vec(), &key, &test_key_id()).unwrap();

    assert_eq!(msg.algorithm(), CoseAlgorithm::ES256);
    assert_eq!(msg.signature().len(), P256_COMPONENT_LEN * 2);

    let spki = key.public_key_der().unwrap();
    assert!(msg.verify(&spki).unwrap());

    let other = make_ec_key();
    assert!(!msg.verify(&other.public_key_der().unwrap()).unwrap());
}

/// PS256: the PSS signature verifies as-is, no format conversion involved.
#[test]
fn ps256_sign_and_verify() {
    let key = make_rsa_key();
    let msg = Sign1Message::sign(b"payload".to_vec(), &key, &test_key_id()).unwrap();

    assert_eq!(msg.algorithm(), CoseAlgorithm::PS256);
    // 2048-bit modulus.
    assert_eq!(msg.signature().len(), 256);

    let spki = key.public_key_der().unwrap();
    assert!(msg.verify(&spki).unwrap());

    let other = make_rsa_key();
    assert!(!msg.verify(&other.public_key_der().unwrap()).unwrap());
}

/// Verification accepts a full X.509 certificate in place of a bare SPKI.
#[test]
fn verify_accepts_certificate_der() {
    let (cert_der, key) = make_self_signed_p256_cert_and_key();
    let msg = Sign1Message::sign(b"payload".to_vec(), &key, &test_key_id()).unwrap();
    assert!(msg.verify(&cert_der).unwrap());
}

/// A signed message survives an encode/decode cycle and still verifies.
#[test]
fn signed_message_round_trips_through_cbor() {
    let key = make_ec_key();
    let msg = Sign1Message::sign(b"claims".to_vec(), &key, &test_key_id()).unwrap();

    let encoded = msg.encode().unwrap();
    let decoded = Sign1Message::decode(&encoded).unwrap();

    assert_eq!(decoded.algorithm(), CoseAlgorithm::ES256);
    assert_eq!(decoded.key_id(), test_key_id());
    assert_eq!(decoded.payload(), b"claims");
    assert_eq!(decoded.signature(), msg.signature());
    assert!(decoded.verify(&key.public_key_der().unwrap()).unwrap());
}

/// Tampering with the payload after signing invalidates the signature.
#[test]
fn tampered_payload_fails_verification() {
    let key = make_ec_key();
    let msg = Sign1Message::sign(b"original".to_vec(), &key, &test_key_id()).unwrap();

    let encoded = msg.encode().unwrap();
    // The payload bstr "original" appears verbatim in the COSE bytes.
    let needle = b"original";
    let pos = encoded
        .windows(needle.len())
        .position(|w| w == needle)
        .unwrap();
    let mut tampered = encoded.clone();
    tampered[pos] ^= 0x01;

    let decoded = Sign1Message::decode(&tampered).unwrap();
    assert!(!decoded.verify(&key.public_key_der().unwrap()).unwrap());
}

/// The Sig_structure is the canonical 4-element CBOR array with an empty
/// external_aad.
#[test]
fn sig_structure_layout_is_exact() {
    let protected = encode_protected_header(&[(1, -7)]);
    let payload = b"payload";
    let sig_structure = encode_sig_structure(&protected, payload).unwrap();

    let mut expected = vec![0x84];
    expected.push(0x6A);
    expected.extend_from_slice(b"Signature1");
    expected.push(0x40 | protected.len() as u8);
    expected.extend_from_slice(&protected);
    expected.push(0x40);
    expected.push(0x40 | payload.len() as u8);
    expected.extend_from_slice(payload);

    assert_eq!(sig_structure, expected);
}

/// The key id must be valid standard base64.
#[test]
fn sign_rejects_invalid_key_ids() {
    let key = make_ec_key();
    assert!(matches!(
        Sign1Message::sign(b"payload".to_vec(), &key, "not base64 !!!"),
        Err(CoseError::InvalidKeyId(_))
    ));
}

/// PKCS#8 loading resolves the key kind once; garbage is unsupported.
#[test]
fn from_pkcs8_der_resolves_key_kind() {
    let ec = p256::ecdsa::SigningKey::random(&mut OsRng);
    let ec_der = ec.to_pkcs8_der().unwrap();
    let loaded = SigningKeyPair::from_pkcs8_der(ec_der.as_bytes()).unwrap();
    assert_eq!(loaded.algorithm(), CoseAlgorithm::ES256);

    let rsa_key = rsa::RsaPrivateKey::new(&mut OsRng, 2048).unwrap();
    use rsa::pkcs8::EncodePrivateKey as _;
    let rsa_der = rsa_key.to_pkcs8_der().unwrap();
    let loaded = SigningKeyPair::from_pkcs8_der(rsa_der.as_bytes()).unwrap();
    assert_eq!(loaded.algorithm(), CoseAlgorithm::PS256);

    assert!(matches!(
        SigningKeyPair::from_pkcs8_der(b"not a key"),
        Err(CoseError::UnsupportedKeyType)
    ));
}

/// Verification with unparseable key material is an error, not a verdict.
#[test]
fn verify_rejects_garbage_key_material() {
    let key = make_ec_key();
    let msg = Sign1Message::sign(b"payload".to_vec(), &key, &test_key_id()).unwrap();
    assert!(matches!(
        msg.verify(b"garbage"),
        Err(CoseError::InvalidPublicKey(_))
    ));
}
