// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Trust store interface.
//!
//! The store maps a base64 key id to candidate verification keys. Population
//! (e.g. from a national gateway) is an external concern; the verifier only
//! ever reads. Implementations must be safe for concurrent `lookup` calls.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Verification key material: SubjectPublicKeyInfo DER or a full X.509
/// certificate DER. The COSE layer extracts the SPKI either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedKey {
    der: Vec<u8>,
}

impl TrustedKey {
    pub fn new(der: Vec<u8>) -> Self {
        Self { der }
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }
}

/// Read access to trusted signer keys, injected into the verifier.
pub trait TrustStore {
    /// All candidate keys registered under `key_id`; empty when unknown.
    fn lookup(&self, key_id: &str) -> Vec<TrustedKey>;
}

/// Derive a key id from SubjectPublicKeyInfo DER: the first 8 characters of
/// its standard-base64 encoding.
pub fn derive_key_id(spki_der: &[u8]) -> String {
    let mut encoded = STANDARD.encode(spki_der);
    encoded.truncate(8);
    encoded
}

/// An in-memory trust store, populated by the caller.
#[derive(Debug, Default)]
pub struct MemoryTrustStore {
    keys: HashMap<String, Vec<TrustedKey>>,
}

impl MemoryTrustStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a key under an explicit key id.
    pub fn add(&mut self, key_id: impl Into<String>, key: TrustedKey) {
        self.keys.entry(key_id.into()).or_default().push(key);
    }

    /// Register a public key under its derived key id.
    pub fn add_public_key(&mut self, spki_der: &[u8]) -> String {
        let key_id = derive_key_id(spki_der);
        self.add(key_id.clone(), TrustedKey::new(spki_der.to_vec()));
        key_id
    }
}

impl TrustStore for MemoryTrustStore {
    fn lookup(&self, key_id: &str) -> Vec<TrustedKey> {
        self.keys.get(key_id).cloned().unwrap_or_default()
    }
}
