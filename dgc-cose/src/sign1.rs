// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! COSE_Sign1 message: parsing, encoding, signing, and verification.
//!
//! COSE_Sign1 is defined (originally) in RFC 8152 and updated in RFC 9052.
//! At a high level, the structure is:
//!
//! ```text
//! COSE_Sign1 = [ protected : bstr,
//!               unprotected : map,
//!               payload : bstr,
//!               signature : bstr ]
//! ```
//!
//! DGC tokens embed their CWT claims as the payload and wrap the array in
//! CBOR tag 18. The parser here is deliberately strict:
//! - Accepts an optional COSE_Sign1 tag (18), but rejects any other tag.
//! - Requires the top-level array length to be exactly 4.
//! - Rejects indefinite-length arrays/maps and trailing bytes.
//! - Requires an embedded payload (certificates are never detached).
//! - Resolves the algorithm and key id before any cryptographic work.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use minicbor::data::{Tag, Type};
use minicbor::{Decoder, Encoder};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::DecodePublicKey as _;
use rsa::RsaPublicKey;
use sha2::Sha256;
use signature::Verifier as _;

use crate::algorithms::CoseAlgorithm;
use crate::ecdsa_format::{concat_to_der, P256_COMPONENT_LEN};
use crate::error::CoseError;
use crate::header_map::{
    decode_header_map_from_cbor, decode_header_map_from_decoder, CoseHeaderMap, HeaderKey,
    HeaderValue,
};
use crate::keys::SigningKeyPair;

/// Standard CBOR tag number used for COSE_Sign1.
pub const COSE_SIGN1_TAG: u64 = 18;

/// Context string for COSE Sig_structure for COSE_Sign1.
pub const SIG_STRUCTURE_CONTEXT_SIGNATURE1: &str = "Signature1";

const HEADER_LABEL_ALG: i64 = 1;
const HEADER_LABEL_KID: i64 = 4;

/// A decoded or freshly signed COSE_Sign1 message.
#[derive(Debug, Clone)]
pub struct Sign1Message {
    protected_headers: CoseHeaderMap,
    unprotected_headers: CoseHeaderMap,
    payload: Vec<u8>,
    signature: Vec<u8>,
    algorithm: CoseAlgorithm,
    kid: Vec<u8>,
}

impl Sign1Message {
    /// Parse a COSE_Sign1 structure from its CBOR encoding.
    pub fn decode(input: &[u8]) -> Result<Self, CoseError> {
        if input.is_empty() {
            return Err(CoseError::MalformedMessage("empty input".to_string()));
        }

        let mut dec = Decoder::new(input);

        // COSE_Sign1 may be tagged (CBOR tag 18) or untagged.
        // If a tag is present, it must be exactly 18.
        if matches!(dec.datatype().map_err(cbor_err)?, Type::Tag) {
            let tag = dec
                .tag()
                .map_err(|e| CoseError::MalformedMessage(format!("failed to read CBOR tag: {e}")))?;
            if tag != Tag::new(COSE_SIGN1_TAG) {
                return Err(CoseError::MalformedMessage(
                    "unexpected CBOR tag (expected COSE_Sign1 tag 18 or no tag)".to_string(),
                ));
            }
        }

        let len = dec
            .array()
            .map_err(|e| {
                CoseError::MalformedMessage(format!("top-level item is not an array: {e}"))
            })?
            .ok_or_else(|| {
                CoseError::MalformedMessage(
                    "indefinite-length arrays are not supported".to_string(),
                )
            })?;

        if len != 4 {
            return Err(CoseError::MalformedMessage(
                "array length was not 4".to_string(),
            ));
        }

        // protected headers (bstr wrapping a CBOR map)
        let protected_bstr = dec
            .bytes()
            .map_err(|e| {
                CoseError::MalformedMessage(format!("failed to read protected headers (bstr): {e}"))
            })?
            .to_vec();
        let protected_map = decode_header_map_from_cbor(&protected_bstr)?;

        // unprotected headers (inline map)
        if !matches!(dec.datatype().map_err(cbor_err)?, Type::Map) {
            return Err(CoseError::MalformedMessage(
                "unprotected headers are not a map".to_string(),
            ));
        }
        let unprotected_map = decode_header_map_from_decoder(&mut dec)?;

        // payload (bstr); detached payloads never occur in certificate tokens
        let payload = match dec.datatype().map_err(cbor_err)? {
            Type::Bytes => dec
                .bytes()
                .map_err(|e| {
                    CoseError::MalformedMessage(format!("failed to read payload (bstr): {e}"))
                })?
                .to_vec(),
            Type::Null => {
                return Err(CoseError::MalformedMessage(
                    "detached payloads are not supported".to_string(),
                ))
            }
            _ => {
                return Err(CoseError::MalformedMessage(
                    "failed to read payload (bstr)".to_string(),
                ))
            }
        };

        // signature (bstr)
        let signature = dec
            .bytes()
            .map_err(|e| {
                CoseError::MalformedMessage(format!("failed to read signature (bstr): {e}"))
            })?
            .to_vec();

        if dec.position() != input.len() {
            return Err(CoseError::MalformedMessage(
                "trailing bytes after COSE_Sign1".to_string(),
            ));
        }

        let protected_headers = CoseHeaderMap::new_protected(protected_bstr, protected_map);
        let unprotected_headers = CoseHeaderMap::new_unprotected(unprotected_map);

        let alg_label = protected_headers
            .get_i64(HEADER_LABEL_ALG)
            .or_else(|| unprotected_headers.get_i64(HEADER_LABEL_ALG))
            .ok_or_else(|| CoseError::MalformedMessage("missing alg header".to_string()))?;
        let algorithm = CoseAlgorithm::from_label(alg_label)?;

        // Key id resolution order: unprotected header first, then protected.
        let kid = unprotected_headers
            .get_bytes(HEADER_LABEL_KID)
            .or_else(|| protected_headers.get_bytes(HEADER_LABEL_KID))
            .ok_or_else(|| CoseError::MalformedMessage("missing key id header".to_string()))?
            .to_vec();

        tracing::debug!(
            alg = alg_label,
            kid = %STANDARD.encode(&kid),
            payload_len = payload.len(),
            "decoded COSE_Sign1"
        );

        Ok(Self {
            protected_headers,
            unprotected_headers,
            payload,
            signature,
            algorithm,
            kid,
        })
    }

    /// Encode this message as tagged COSE_Sign1 CBOR.
    ///
    /// The protected header bytes are written verbatim, so a decoded
    /// message re-encodes with its original signing base intact.
    pub fn encode(&self) -> Result<Vec<u8>, CoseError> {
        let mut enc = Encoder::new(Vec::new());
        enc.tag(Tag::new(COSE_SIGN1_TAG)).map_err(cbor_err)?;
        enc.array(4).map_err(cbor_err)?;
        enc.bytes(self.protected_headers.encoded_map_cbor())
            .map_err(cbor_err)?;
        enc.map(1).map_err(cbor_err)?;
        enc.i64(HEADER_LABEL_KID).map_err(cbor_err)?;
        enc.bytes(&self.kid).map_err(cbor_err)?;
        enc.bytes(&self.payload).map_err(cbor_err)?;
        enc.bytes(&self.signature).map_err(cbor_err)?;
        Ok(enc.into_writer())
    }

    /// Sign `payload`, producing a complete message.
    ///
    /// The algorithm is resolved once from the key kind: ES256 for P-256
    /// keys, PS256 for RSA keys. `key_id` is the standard-base64 form
    /// carried by the trust store; its decoded bytes land in the
    /// unprotected header under label 4.
    pub fn sign(
        payload: Vec<u8>,
        key: &SigningKeyPair,
        key_id: &str,
    ) -> Result<Self, CoseError> {
        let kid = STANDARD.decode(key_id).map_err(CoseError::InvalidKeyId)?;
        let algorithm = key.algorithm();

        let protected_bytes = encode_alg_protected_header(algorithm)?;
        let sig_structure = encode_sig_structure(&protected_bytes, &payload)?;
        let signature = key.sign(&sig_structure)?;

        let protected_map = decode_header_map_from_cbor(&protected_bytes)?;
        let mut unprotected_map = BTreeMap::new();
        unprotected_map.insert(
            HeaderKey::Int(HEADER_LABEL_KID),
            HeaderValue::Bytes(kid.clone()),
        );

        Ok(Self {
            protected_headers: CoseHeaderMap::new_protected(protected_bytes, protected_map),
            unprotected_headers: CoseHeaderMap::new_unprotected(unprotected_map),
            payload,
            signature,
            algorithm,
            kid,
        })
    }

    /// Verify the signature against a public key or certificate.
    ///
    /// `key_der` is either SubjectPublicKeyInfo DER or a full X.509
    /// certificate DER, from which the SPKI is extracted. Returns the
    /// verifier's verdict; a stored signature with an impossible shape is
    /// simply not valid. Unparseable key material is an error, not a
    /// verdict.
    pub fn verify(&self, key_der: &[u8]) -> Result<bool, CoseError> {
        let sig_structure =
            encode_sig_structure(self.protected_headers.encoded_map_cbor(), &self.payload)?;
        let spki = extract_spki_der(key_der);

        match self.algorithm {
            CoseAlgorithm::ES256 => {
                let pk = p256::PublicKey::from_public_key_der(&spki).map_err(|e| {
                    CoseError::InvalidPublicKey(format!("bad P-256 public key: {e}"))
                })?;
                let ep = pk.to_encoded_point(false);
                let vk = p256::ecdsa::VerifyingKey::from_sec1_bytes(ep.as_bytes()).map_err(|e| {
                    CoseError::InvalidPublicKey(format!("bad P-256 public key: {e}"))
                })?;

                // The verifier wants DER; the wire carries raw R‖S.
                let der = match concat_to_der(&self.signature, P256_COMPONENT_LEN) {
                    Ok(der) => der,
                    Err(_) => return Ok(false),
                };
                let sig = match p256::ecdsa::Signature::from_der(&der) {
                    Ok(sig) => sig,
                    Err(_) => return Ok(false),
                };
                Ok(vk.verify(&sig_structure, &sig).is_ok())
            }
            CoseAlgorithm::PS256 => {
                let pk = RsaPublicKey::from_public_key_der(&spki).map_err(|e| {
                    CoseError::InvalidPublicKey(format!("bad RSA public key: {e}"))
                })?;
                let vk = rsa::pss::VerifyingKey::<Sha256>::new(pk);
                let sig = match rsa::pss::Signature::try_from(self.signature.as_slice()) {
                    Ok(sig) => sig,
                    Err(_) => return Ok(false),
                };
                Ok(vk.verify(&sig_structure, &sig).is_ok())
            }
        }
    }

    pub fn protected_headers(&self) -> &CoseHeaderMap {
        &self.protected_headers
    }

    pub fn unprotected_headers(&self) -> &CoseHeaderMap {
        &self.unprotected_headers
    }

    /// The embedded payload (the CWT claims CBOR).
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The signature in COSE form: raw `R‖S` for ES256, PSS bytes for PS256.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub fn algorithm(&self) -> CoseAlgorithm {
        self.algorithm
    }

    /// The key id as the standard-base64 string used for trust lookups.
    pub fn key_id(&self) -> String {
        STANDARD.encode(&self.kid)
    }

    pub fn key_id_bytes(&self) -> &[u8] {
        &self.kid
    }
}

/// Encode the COSE Sig_structure bytes for COSE_Sign1.
///
/// These bytes are what signature algorithms sign and verify:
/// `[ "Signature1", body_protected, external_aad, payload ]` with an empty
/// external_aad.
pub fn encode_sig_structure(
    protected_bytes: &[u8],
    payload: &[u8],
) -> Result<Vec<u8>, CoseError> {
    let mut out = Vec::with_capacity(128 + protected_bytes.len() + payload.len());
    {
        let mut enc = Encoder::new(&mut out);
        enc.array(4).map_err(cbor_err)?;
        enc.str(SIG_STRUCTURE_CONTEXT_SIGNATURE1).map_err(cbor_err)?;
        enc.bytes(protected_bytes).map_err(cbor_err)?;
        enc.bytes(&[]).map_err(cbor_err)?; // external_aad empty bstr
        enc.bytes(payload).map_err(cbor_err)?;
    }
    Ok(out)
}

/// Encode the protected header map `{1: alg}` to its bstr contents.
fn encode_alg_protected_header(alg: CoseAlgorithm) -> Result<Vec<u8>, CoseError> {
    let mut enc = Encoder::new(Vec::new());
    enc.map(1).map_err(cbor_err)?;
    enc.i64(HEADER_LABEL_ALG).map_err(cbor_err)?;
    enc.i64(alg.label()).map_err(cbor_err)?;
    Ok(enc.into_writer())
}

/// Extract SPKI DER from key material that may be a full certificate.
fn extract_spki_der(der: &[u8]) -> Vec<u8> {
    if let Ok((_, cert)) = x509_parser::parse_x509_certificate(der) {
        return cert.tbs_certificate.subject_pki.raw.to_vec();
    }
    der.to_vec()
}

fn cbor_err<E: std::fmt::Display>(e: E) -> CoseError {
    CoseError::MalformedMessage(e.to_string())
}
