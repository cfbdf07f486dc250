// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Base45 text encoding (draft-faltstrom-base45).
//!
//! The encoding targets QR alphanumeric mode: each 2-byte chunk becomes a
//! 16-bit value emitted as three base-45 digits, least significant first. A
//! trailing single byte becomes two digits. Decoding reverses the grouping,
//! so any text whose length is 1 mod 3 cannot be a valid encoding.

use crate::error::Base45Error;

const BASE: usize = 45;
const BASE_SQUARED: usize = 2025;

const ALPHABET: &[u8; 45] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// Reverse lookup from a byte of text to its alphabet index.
const DECODE_TABLE: [u8; 256] = build_decode_table();

const INVALID: u8 = 0xFF;

const fn build_decode_table() -> [u8; 256] {
    let mut table = [INVALID; 256];
    let mut i = 0;
    while i < ALPHABET.len() {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
}

/// Encode bytes as Base45 text.
pub fn encode(buffer: &[u8]) -> String {
    let whole_chunks = buffer.len() / 2;
    let mut result =
        Vec::with_capacity(whole_chunks * 3 + if buffer.len() % 2 == 1 { 2 } else { 0 });

    for chunk in buffer.chunks_exact(2) {
        let value = usize::from(chunk[0]) * 256 + usize::from(chunk[1]);
        result.push(ALPHABET[value % BASE]);
        result.push(ALPHABET[value / BASE % BASE]);
        result.push(ALPHABET[value / BASE_SQUARED % BASE]);
    }

    if buffer.len() % 2 == 1 {
        let last = usize::from(buffer[buffer.len() - 1]);
        result.push(ALPHABET[last % BASE]);
        result.push(if last < BASE {
            ALPHABET[0]
        } else {
            ALPHABET[last / BASE % BASE]
        });
    }

    // The alphabet is pure ASCII, so the result is valid UTF-8.
    String::from_utf8(result).expect("base45 alphabet is ASCII")
}

/// Decode Base45 text back to bytes.
///
/// Fails when the length is 1 mod 3 or when any character falls outside the
/// 45-symbol alphabet; the error names the offending position. Out-of-range
/// digit groups wrap modulo 256 rather than erroring; corruption of that
/// shape cannot survive the downstream layers.
pub fn decode(value: &str) -> Result<Vec<u8>, Base45Error> {
    if value.is_empty() {
        return Ok(Vec::new());
    }

    let remainder = value.len() % 3;
    if remainder == 1 {
        return Err(Base45Error::InvalidLength(value.len()));
    }

    let mut digits = Vec::with_capacity(value.len());
    for (position, byte) in value.bytes().enumerate() {
        let digit = DECODE_TABLE[usize::from(byte)];
        if digit == INVALID {
            return Err(Base45Error::InvalidCharacter { position });
        }
        digits.push(usize::from(digit));
    }

    let whole_chunks = digits.len() / 3;
    let mut result =
        Vec::with_capacity(whole_chunks * 2 + if remainder == 2 { 1 } else { 0 });

    for chunk in digits.chunks_exact(3) {
        let value = chunk[0] + BASE * chunk[1] + BASE_SQUARED * chunk[2];
        result.push((value / 256) as u8);
        result.push((value % 256) as u8);
    }

    if remainder == 2 {
        result.push((digits[digits.len() - 2] + BASE * digits[digits.len() - 1]) as u8);
    }

    Ok(result)
}
