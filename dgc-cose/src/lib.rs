// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! COSE_Sign1 envelope for EU Digital Green Certificates.
//!
//! This crate is the cryptographic core of the certificate pipeline:
//! parsing and encoding the 4-element COSE_Sign1 structure, building the
//! `Sig_structure` signing base, ES256/PS256 signing and verification, and
//! the ECDSA DER ⇄ raw `R‖S` signature format conversion that COSE
//! interoperability hinges on.

// Internal implementation modules.
mod header_map;
mod sign1;

// Public API organization (lib.rs is a publisher).
mod algorithms;
mod ecdsa_format;
mod error;
mod keys;

pub use algorithms::CoseAlgorithm;
pub use ecdsa_format::{concat_to_der, der_to_concat, P256_COMPONENT_LEN};
pub use error::CoseError;
pub use header_map::{CoseHeaderMap, HeaderKey, HeaderValue};
pub use keys::SigningKeyPair;
pub use sign1::{
    encode_sig_structure, Sign1Message, COSE_SIGN1_TAG, SIG_STRUCTURE_CONTEXT_SIGNATURE1,
};
