// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Signing key material.
//!
//! The token format admits exactly two key kinds, so the signing key is a
//! closed union resolved once at construction instead of runtime type checks
//! scattered across the pipeline.

use p256::pkcs8::{DecodePrivateKey as _, EncodePublicKey as _};
use rand_core::OsRng;
use rsa::signature::RandomizedSigner as _;
use rsa::signature::SignatureEncoding as _;
use sha2::Sha256;
use signature::Signer as _;

use crate::algorithms::CoseAlgorithm;
use crate::ecdsa_format::{der_to_concat, P256_COMPONENT_LEN};
use crate::error::CoseError;

/// An asymmetric signing key pair for certificate issuance.
#[derive(Debug, Clone)]
pub enum SigningKeyPair {
    /// P-256 key, signs with ES256.
    Ec(p256::ecdsa::SigningKey),
    /// RSA key, signs with PS256.
    Rsa(rsa::RsaPrivateKey),
}

impl SigningKeyPair {
    /// Load a signing key from PKCS#8 DER, trying P-256 first, then RSA.
    ///
    /// Any other key type fails with [`CoseError::UnsupportedKeyType`].
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self, CoseError> {
        if let Ok(key) = p256::ecdsa::SigningKey::from_pkcs8_der(der) {
            return Ok(SigningKeyPair::Ec(key));
        }
        if let Ok(key) = rsa::RsaPrivateKey::from_pkcs8_der(der) {
            return Ok(SigningKeyPair::Rsa(key));
        }
        Err(CoseError::UnsupportedKeyType)
    }

    /// The COSE algorithm this key signs with.
    pub fn algorithm(&self) -> CoseAlgorithm {
        match self {
            SigningKeyPair::Ec(_) => CoseAlgorithm::ES256,
            SigningKeyPair::Rsa(_) => CoseAlgorithm::PS256,
        }
    }

    /// The SubjectPublicKeyInfo DER for the matching public key.
    pub fn public_key_der(&self) -> Result<Vec<u8>, CoseError> {
        let doc = match self {
            SigningKeyPair::Ec(key) => key
                .verifying_key()
                .to_public_key_der()
                .map_err(|e| CoseError::InvalidPublicKey(format!("bad P-256 public key: {e}")))?,
            SigningKeyPair::Rsa(key) => key
                .to_public_key()
                .to_public_key_der()
                .map_err(|e| CoseError::InvalidPublicKey(format!("bad RSA public key: {e}")))?,
        };
        Ok(doc.as_bytes().to_vec())
    }

    /// Sign `msg` with SHA-256, producing the COSE signature form:
    /// raw `R‖S` for ES256, the PSS signature as-is for PS256.
    pub(crate) fn sign(&self, msg: &[u8]) -> Result<Vec<u8>, CoseError> {
        match self {
            SigningKeyPair::Ec(key) => {
                // The provider emits DER; COSE wants raw R‖S.
                let sig: p256::ecdsa::Signature = key.sign(msg);
                der_to_concat(sig.to_der().as_bytes(), P256_COMPONENT_LEN)
            }
            SigningKeyPair::Rsa(key) => {
                let signing_key = rsa::pss::SigningKey::<Sha256>::new(key.clone());
                let sig = signing_key
                    .try_sign_with_rng(&mut OsRng, msg)
                    .map_err(|e| CoseError::Signing(e.to_string()))?;
                Ok(sig.to_vec())
            }
        }
    }
}

impl From<p256::ecdsa::SigningKey> for SigningKeyPair {
    fn from(key: p256::ecdsa::SigningKey) -> Self {
        SigningKeyPair::Ec(key)
    }
}

impl From<rsa::RsaPrivateKey> for SigningKeyPair {
    fn from(key: rsa::RsaPrivateKey) -> Self {
        SigningKeyPair::Rsa(key)
    }
}
