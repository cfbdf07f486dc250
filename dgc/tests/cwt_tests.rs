// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for CWT claim decoding via the COSE payload.

mod common;

use common::*;
use dgc::{decode_certificate, CwtClaims, DgcError};
use minicbor::Encoder;

/// Claims encode to a CBOR map that decodes back field-for-field.
#[test]
fn claims_round_trip_standalone() {
    let claims = sample_claims();
    let bytes = claims.encode().unwrap();
    assert_eq!(CwtClaims::decode(&bytes).unwrap(), claims);
}

/// Unknown claim keys are skipped, both integer and text keys.
#[test]
fn unknown_claims_are_skipped() {
    let claims = sample_claims();
    let inner = claims.encode().unwrap();

    // Re-wrap the four claims with two extra ones.
    let mut dec = minicbor::Decoder::new(&inner);
    let len = dec.map().unwrap().unwrap();
    let rest = &inner[dec.position()..];

    let mut enc = Encoder::new(Vec::new());
    enc.map(len + 2).unwrap();
    enc.i64(2).unwrap(); // subject claim, unused here
    enc.str("subject").unwrap();
    enc.str("custom").unwrap();
    enc.bool(true).unwrap();
    let mut bytes = enc.into_writer();
    bytes.extend_from_slice(rest);

    assert_eq!(CwtClaims::decode(&bytes).unwrap(), claims);
}

/// Each required claim is individually enforced.
#[test]
fn missing_required_claims_are_rejected() {
    let claims = sample_claims();

    // (claim key to drop, expected error fragment)
    let cases = [
        (1i64, "issuer"),
        (4, "expiration"),
        (6, "issued-at"),
        (-260, "HCERT"),
    ];

    for (drop_key, fragment) in cases {
        let inner = claims.encode().unwrap();
        let mut dec = minicbor::Decoder::new(&inner);
        let len = dec.map().unwrap().unwrap();

        // Re-build the map without the dropped claim, splicing the original
        // value bytes through unchanged.
        let mut enc = Encoder::new(Vec::new());
        enc.map(len - 1).unwrap();
        let mut bytes = enc.into_writer();
        for _ in 0..len {
            let key = dec.i64().unwrap();
            let start = dec.position();
            dec.skip().unwrap();
            let value = &inner[start..dec.position()];
            if key != drop_key {
                let mut enc = Encoder::new(Vec::new());
                enc.i64(key).unwrap();
                bytes.extend_from_slice(&enc.into_writer());
                bytes.extend_from_slice(value);
            }
        }

        let err = CwtClaims::decode(&bytes).unwrap_err();
        assert!(
            matches!(&err, DgcError::MalformedClaims(m) if m.contains(fragment)),
            "dropping claim {drop_key}: got {err:?}"
        );
    }
}

/// An HCERT container without sub-key 1 is malformed.
#[test]
fn hcert_without_dgc_sub_key_is_rejected() {
    let mut enc = Encoder::new(Vec::new());
    enc.map(4).unwrap();
    enc.i64(1).unwrap();
    enc.str("DNK").unwrap();
    enc.i64(4).unwrap();
    enc.i64(NOW + WEEK).unwrap();
    enc.i64(6).unwrap();
    enc.i64(NOW).unwrap();
    enc.i64(-260).unwrap();
    enc.map(1).unwrap();
    enc.i64(2).unwrap(); // not sub-key 1
    enc.map(0).unwrap();
    let bytes = enc.into_writer();

    assert!(matches!(
        CwtClaims::decode(&bytes).unwrap_err(),
        DgcError::MalformedClaims(m) if m.contains("sub-key 1")
    ));
}

/// An HCERT claim that is not a map at all is malformed.
#[test]
fn hcert_that_is_not_a_map_is_rejected() {
    let mut enc = Encoder::new(Vec::new());
    enc.map(4).unwrap();
    enc.i64(1).unwrap();
    enc.str("DNK").unwrap();
    enc.i64(4).unwrap();
    enc.i64(NOW + WEEK).unwrap();
    enc.i64(6).unwrap();
    enc.i64(NOW).unwrap();
    enc.i64(-260).unwrap();
    enc.str("not a map").unwrap();
    let bytes = enc.into_writer();

    assert!(matches!(
        CwtClaims::decode(&bytes).unwrap_err(),
        DgcError::MalformedClaims(m) if m.contains("HCERT")
    ));
}

/// The decoded `Cwt` exposes the claims and the COSE read surface used by
/// the verifier and revocation hashing.
#[test]
fn decoded_cwt_exposes_cose_read_access() {
    let (encoder, _, key_id) = encoder_with_trust(make_ec_key());
    let claims = sample_claims();
    let token = encoder.encode(&claims).unwrap();

    let cwt = decode_certificate(&token).unwrap();
    assert_eq!(cwt.claims.issuer, "DNK");
    assert_eq!(cwt.claims.issued_at, NOW);
    assert_eq!(cwt.claims.expires_at, NOW + WEEK);
    assert_eq!(cwt.key_id(), key_id);
    assert_eq!(cwt.cose().signature().len(), 64);
}
