// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Revocation hash derivation.
//!
//! Revocation lists distribute 16-byte hashes rather than identifiers. Three
//! derivations exist so a list can match on whichever attribute it indexes:
//! the UCI, the country-prefixed UCI, or the signature itself. All three are
//! deterministic SHA-256 truncations over an already-decoded certificate.

use sha2::{Digest as _, Sha256};

use dgc_cose::CoseAlgorithm;

use crate::cwt::Cwt;

/// Length of a revocation-list hash entry.
pub const REVOCATION_HASH_LEN: usize = 16;

/// Hash the unique certificate identifier of the first entry, preferring
/// vaccination, then recovery, then test entries.
pub fn compute_uci_hash(cwt: &Cwt) -> [u8; REVOCATION_HASH_LEN] {
    let cert = &cwt.claims.certificate;
    let uci = if let Some(entry) = cert.vaccinations.first() {
        entry.certificate_id.clone()
    } else if let Some(entry) = cert.recoveries.first() {
        entry.certificate_id.clone()
    } else if let Some(entry) = cert.tests.first() {
        entry.certificate_id.clone()
    } else {
        String::new()
    };
    truncated_sha256(uci.as_bytes())
}

/// Hash `countryCode + UCI` with the same entry priority as
/// [`compute_uci_hash`].
pub fn compute_country_code_uci_hash(cwt: &Cwt) -> [u8; REVOCATION_HASH_LEN] {
    let cert = &cwt.claims.certificate;
    let joined = if let Some(entry) = cert.vaccinations.first() {
        format!("{}{}", entry.country, entry.certificate_id)
    } else if let Some(entry) = cert.recoveries.first() {
        format!("{}{}", entry.country, entry.certificate_id)
    } else if let Some(entry) = cert.tests.first() {
        format!("{}{}", entry.country, entry.certificate_id)
    } else {
        String::new()
    };
    truncated_sha256(joined.as_bytes())
}

/// Hash the COSE signature: the R component (first half of the raw `R‖S`)
/// for ES256, the whole signature for PS256.
pub fn compute_signature_hash(cwt: &Cwt) -> [u8; REVOCATION_HASH_LEN] {
    let signature = cwt.cose().signature();
    let bytes = match cwt.algorithm() {
        CoseAlgorithm::ES256 => &signature[..signature.len() / 2],
        CoseAlgorithm::PS256 => signature,
    };
    truncated_sha256(bytes)
}

fn truncated_sha256(bytes: &[u8]) -> [u8; REVOCATION_HASH_LEN] {
    let digest = Sha256::digest(bytes);
    let mut out = [0u8; REVOCATION_HASH_LEN];
    out.copy_from_slice(&digest[..REVOCATION_HASH_LEN]);
    out
}

/// Lookup access to an externally maintained revocation list.
pub trait RevocationRepository {
    /// Whether `hash` appears in the list for this key id and issuer.
    fn contains_hash(&self, key_id: &str, issuer: &str, hash: &[u8; REVOCATION_HASH_LEN]) -> bool;
}

/// Checks decoded certificates against a revocation repository.
pub struct RevocationVerifier<'a> {
    repository: &'a dyn RevocationRepository,
}

impl<'a> RevocationVerifier<'a> {
    pub fn new(repository: &'a dyn RevocationRepository) -> Self {
        Self { repository }
    }

    /// Probe the repository with each derived hash in turn.
    pub fn is_revoked(&self, cwt: &Cwt) -> bool {
        let key_id = cwt.key_id();
        let issuer = &cwt.claims.issuer;

        self.repository
            .contains_hash(&key_id, issuer, &compute_uci_hash(cwt))
            || self
                .repository
                .contains_hash(&key_id, issuer, &compute_country_code_uci_hash(cwt))
            || self
                .repository
                .contains_hash(&key_id, issuer, &compute_signature_hash(cwt))
    }
}
