// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! EU Digital Green Certificate codec and trust pipeline.
//!
//! A certificate token is `"HC1:" + Base45(zlib(COSE_Sign1(CWT)))`. This
//! crate decodes and encodes that stack, verifies signatures against an
//! injected trust store, and derives the truncated hashes used for
//! revocation-list matching. The COSE and signature layers live in the
//! `dgc-cose` crate.
//!
//! ```no_run
//! use dgc::{decode_certificate, CertificateVerifier, MemoryTrustStore};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cwt = decode_certificate("HC1:...")?;
//! let trust = MemoryTrustStore::new();
//! let verifier = CertificateVerifier::new(&trust);
//! match verifier.verify(&cwt) {
//!     Ok(()) => println!("valid for {}", cwt.claims.issuer),
//!     Err(reason) => println!("rejected: {reason}"),
//! }
//! # Ok(())
//! # }
//! ```

// Leaf codecs, exposed as modules.
pub mod base45;
pub mod compression;

// Public API organization (lib.rs is a publisher).
mod certificate;
mod cwt;
mod decoder;
mod encoder;
mod error;
mod revocation;
mod trust;
mod verifier;

pub use certificate::{
    DigitalGreenCertificate, PersonName, RecoveryEntry, TestEntry, VaccinationEntry,
};
pub use cwt::{Cwt, CwtClaims};
pub use decoder::{decode_certificate, TOKEN_PREFIX};
pub use encoder::{CertificateEncoder, EncodeIntermediates};
pub use error::{Base45Error, CoseError, DgcError};
pub use revocation::{
    compute_country_code_uci_hash, compute_signature_hash, compute_uci_hash,
    RevocationRepository, RevocationVerifier, REVOCATION_HASH_LEN,
};
pub use trust::{derive_key_id, MemoryTrustStore, TrustStore, TrustedKey};
pub use verifier::{CertificateVerifier, VerificationFailure};

// The signing key union and algorithm enum are part of the public surface:
// encoding needs the former, revocation consumers often branch on the latter.
pub use dgc_cose::{CoseAlgorithm, SigningKeyPair};
