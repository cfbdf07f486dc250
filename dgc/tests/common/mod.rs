// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Shared helpers for `dgc` integration tests: key pairs, trust stores, and
//! a representative claim set.

#![allow(dead_code)]

use rand_core::OsRng;

use dgc::{
    derive_key_id, CertificateEncoder, CwtClaims, DigitalGreenCertificate, MemoryTrustStore,
    PersonName, SigningKeyPair, TestEntry, VaccinationEntry,
};

/// A fixed "now" so expiry arithmetic is deterministic.
pub(crate) const NOW: i64 = 1_700_000_000;

pub(crate) const WEEK: i64 = 7 * 24 * 3600;

pub(crate) fn make_ec_key() -> SigningKeyPair {
    SigningKeyPair::from(p256::ecdsa::SigningKey::random(&mut OsRng))
}

pub(crate) fn make_rsa_key() -> SigningKeyPair {
    let key = rsa::RsaPrivateKey::new(&mut OsRng, 2048).expect("RSA key generation");
    SigningKeyPair::from(key)
}

/// An encoder plus a trust store already holding the matching public key.
pub(crate) fn encoder_with_trust(key: SigningKeyPair) -> (CertificateEncoder, MemoryTrustStore, String) {
    let spki = key.public_key_der().unwrap();
    let key_id = derive_key_id(&spki);

    let mut trust = MemoryTrustStore::new();
    trust.add_public_key(&spki);

    (CertificateEncoder::new(key, key_id.clone()), trust, key_id)
}

/// Claims shaped like a real issuance: one test entry, one vaccination
/// entry, a name block, valid for a week.
pub(crate) fn sample_claims() -> CwtClaims {
    CwtClaims {
        issuer: "DNK".to_string(),
        issued_at: NOW,
        expires_at: NOW + WEEK,
        certificate: DigitalGreenCertificate {
            version: "1.0.0".to_string(),
            name: Some(PersonName {
                family_name: Some("Testson".to_string()),
                family_name_transliterated: Some("TESTSON".to_string()),
                given_name: Some("Test".to_string()),
                given_name_transliterated: None,
            }),
            date_of_birth: Some("1990-01-01".to_string()),
            vaccinations: vec![VaccinationEntry {
                certificate_id: "URN:UVCI:01:DK:TEST#1".to_string(),
                country: "DK".to_string(),
                dose_number: 2,
                vaccination_date: "2021-04-01".to_string(),
                issuer: "Test Issuer".to_string(),
                manufacturer: "ORG-100030215".to_string(),
                medicinal_product: "EU/1/20/1528".to_string(),
                total_doses: 2,
                disease_agent: "840539006".to_string(),
                vaccine: "1119349007".to_string(),
            }],
            tests: vec![TestEntry {
                certificate_id: "URN:UVCI:01:DK:TEST#2".to_string(),
                country: "IS".to_string(),
                issuer: "Test Issuer".to_string(),
                manufacturer: None,
                test_name: Some("PCR Covid-19".to_string()),
                sample_collection_date: "2021-04-02T10:00:00Z".to_string(),
                testing_centre: "Test Centre".to_string(),
                disease_agent: "840539006".to_string(),
                test_result: "260415000".to_string(),
                test_type: "LP6464-4".to_string(),
            }],
            recoveries: Vec::new(),
        },
    }
}
