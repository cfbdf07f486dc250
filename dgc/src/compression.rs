// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! DEFLATE compression framing for certificate tokens.
//!
//! Tokens compress the COSE bytes with a maximum-level zlib stream before
//! Base45 encoding. Some producers skip compression entirely, so the decode
//! side sniffs for the `0x78 0xDA` zlib header and passes everything else
//! through untouched.

use std::io::{Read as _, Write as _};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

/// The zlib header emitted at maximum compression level.
const ZLIB_BEST_HEADER: [u8; 2] = [0x78, 0xDA];

/// Compress with maximum-level DEFLATE in zlib framing.
pub fn compress(buffer: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(buffer)?;
    encoder.finish()
}

/// Inflate `buffer` when it carries the zlib header, otherwise return it
/// unchanged.
///
/// Corrupt compressed streams propagate the inflate error; an absent header
/// is the sanctioned fallback, not an error.
pub fn decompress_if_needed(buffer: &[u8]) -> std::io::Result<Vec<u8>> {
    if !buffer.starts_with(&ZLIB_BEST_HEADER) {
        return Ok(buffer.to_vec());
    }

    let mut decoder = ZlibDecoder::new(buffer);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}
