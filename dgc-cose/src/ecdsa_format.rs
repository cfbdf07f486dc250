// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! ECDSA signature format conversion.
//!
//! COSE carries ECDSA signatures as raw fixed-width `R‖S` (each component
//! zero-padded to the curve's component length, 32 bytes for P-256), while
//! signature providers produce ASN.1 `SEQUENCE(INTEGER r, INTEGER s)`.
//! RSA-PSS signatures never pass through here.

use crate::error::CoseError;

/// Fixed width of each P-256 signature component in the raw form.
pub const P256_COMPONENT_LEN: usize = 32;

const TRUNCATED: CoseError = CoseError::MalformedSignature("truncated DER signature");

/// Convert a raw fixed-width `R‖S` signature into an ASN.1 DER SEQUENCE.
///
/// Each half is normalized per the DER unsigned-integer rule: leading zero
/// bytes are stripped, and a zero byte is prepended when the remaining high
/// bit is set. The SEQUENCE length is encoded in short form, which holds for
/// every curve whose two INTEGERs fit in 127 bytes (P-256 included).
pub fn concat_to_der(raw: &[u8], component_len: usize) -> Result<Vec<u8>, CoseError> {
    if raw.len() != component_len * 2 {
        return Err(CoseError::MalformedSignature(
            "raw signature is not two components wide",
        ));
    }

    let r = der_unsigned_integer(&raw[..component_len]);
    let s = der_unsigned_integer(&raw[component_len..]);

    let mut der = Vec::with_capacity(2 + r.len() + s.len());
    der.push(0x30);
    der.push((r.len() + s.len()) as u8);
    der.extend_from_slice(&r);
    der.extend_from_slice(&s);
    Ok(der)
}

/// Encode one signature component as a DER INTEGER TLV.
fn der_unsigned_integer(component: &[u8]) -> Vec<u8> {
    let mut offset = 0;
    while offset < component.len() && component[offset] == 0 {
        offset += 1;
    }

    if offset == component.len() {
        return vec![0x02, 0x01, 0x00];
    }

    let body = &component[offset..];
    let pad = usize::from(body[0] & 0x80 != 0);

    let mut der = Vec::with_capacity(2 + pad + body.len());
    der.push(0x02);
    der.push((body.len() + pad) as u8);
    if pad == 1 {
        der.push(0x00);
    }
    der.extend_from_slice(body);
    der
}

/// Convert an ASN.1 DER `SEQUENCE(INTEGER r, INTEGER s)` into raw
/// fixed-width `R‖S`.
///
/// Each component is right-aligned into its half of the output: short
/// components are zero-padded on the left, over-long components (a DER
/// leading zero from a set high bit) are truncated from the left. Long-form
/// SEQUENCE lengths are tolerated; the INTEGER lengths themselves are always
/// short form for the component widths this crate handles.
pub fn der_to_concat(der: &[u8], component_len: usize) -> Result<Vec<u8>, CoseError> {
    if der.first() != Some(&0x30) {
        return Err(CoseError::MalformedSignature("missing SEQUENCE tag"));
    }

    let seq_len = *der.get(1).ok_or(TRUNCATED)?;
    // Offset of the first INTEGER's value bytes: tag + length + INTEGER TLV
    // header. A long-form SEQUENCE length pushes everything right.
    let mut r_off = 4usize;
    if seq_len & 0x80 != 0 {
        r_off = 4 + (seq_len & 0x7f) as usize;
    }

    let mut concat = vec![0u8; component_len * 2];

    let mut r_len = *der.get(r_off - 1).ok_or(TRUNCATED)? as usize;
    let mut r_pad = 0;
    if r_len > component_len {
        r_off += r_len - component_len;
        r_len = component_len;
    } else {
        r_pad = component_len - r_len;
    }
    let r = der.get(r_off..r_off + r_len).ok_or(TRUNCATED)?;
    concat[r_pad..r_pad + r_len].copy_from_slice(r);

    let mut s_off = r_off + r_len + 2;
    let mut s_len = *der.get(s_off - 1).ok_or(TRUNCATED)? as usize;
    let mut s_pad = 0;
    if s_len > component_len {
        s_off += s_len - component_len;
        s_len = component_len;
    } else {
        s_pad = component_len - s_len;
    }
    let s = der.get(s_off..s_off + s_len).ok_or(TRUNCATED)?;
    concat[component_len + s_pad..component_len + s_pad + s_len].copy_from_slice(s);

    Ok(concat)
}
