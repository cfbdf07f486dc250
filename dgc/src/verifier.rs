// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Certificate verification: trust lookup, signature check, expiration.

use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use crate::cwt::Cwt;
use crate::trust::TrustStore;

/// Why a certificate failed verification. Exactly one reason is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerificationFailure {
    /// The key id is not present in the trust store.
    #[error("KID not found in trusted public key repository")]
    KeyNotFound,

    /// No trusted key under the key id matches the signature.
    #[error("KID public key does not match signature")]
    SignatureInvalid,

    /// The signature is valid but the certificate has expired.
    #[error("certificate has expired")]
    Expired,
}

/// Verifies decoded certificates against an injected trust store.
///
/// Stateless per call; a single verifier may serve concurrent verifications
/// as long as the trust store's `lookup` is concurrency-safe.
pub struct CertificateVerifier<'a> {
    trust_store: &'a dyn TrustStore,
}

impl<'a> CertificateVerifier<'a> {
    pub fn new(trust_store: &'a dyn TrustStore) -> Self {
        Self { trust_store }
    }

    /// Verify against the wall clock.
    pub fn verify(&self, cwt: &Cwt) -> Result<(), VerificationFailure> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        self.verify_at(cwt, now)
    }

    /// Verify against a caller-supplied clock (Unix seconds).
    ///
    /// Every candidate key under the message's key id is evaluated and only
    /// the last verdict is kept; a store should normally hold one candidate
    /// per key id. A valid signature is still reported as [`VerificationFailure::Expired`]
    /// when the clock is past the expiration claim, and an invalid signature
    /// is reported as such regardless of the clock.
    pub fn verify_at(&self, cwt: &Cwt, now: i64) -> Result<(), VerificationFailure> {
        let key_id = cwt.key_id();
        let candidates = self.trust_store.lookup(&key_id);
        tracing::debug!(kid = %key_id, candidates = candidates.len(), "verifying certificate");
        if candidates.is_empty() {
            return Err(VerificationFailure::KeyNotFound);
        }

        // Last wins, not any-match: ties across multiple candidates resolve
        // to the final evaluation.
        let mut verified = false;
        for candidate in &candidates {
            verified = match cwt.cose().verify(candidate.der()) {
                Ok(verdict) => verdict,
                Err(e) => {
                    tracing::warn!(error = %e, "candidate key rejected");
                    false
                }
            };
        }

        if !verified {
            return Err(VerificationFailure::SignatureInvalid);
        }
        if cwt.claims.expires_at < now {
            return Err(VerificationFailure::Expired);
        }
        Ok(())
    }
}
