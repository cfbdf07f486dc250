// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::error::CoseError;

/// Supported COSE algorithms (IANA COSE Algorithms registry).
///
/// The DGC token format admits exactly two signature algorithms; anything
/// else is rejected before any cryptographic work happens.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(i64)]
pub enum CoseAlgorithm {
    /// ECDSA w/ SHA-256 over P-256.
    ES256 = -7,
    /// RSASSA-PSS w/ SHA-256.
    PS256 = -37,
}

impl CoseAlgorithm {
    /// The integer label used in the COSE `alg` header (label 1).
    pub const fn label(self) -> i64 {
        self as i64
    }

    /// Resolve an `alg` header label to a supported algorithm.
    pub fn from_label(label: i64) -> Result<Self, CoseError> {
        match label {
            -7 => Ok(CoseAlgorithm::ES256),
            -37 => Ok(CoseAlgorithm::PS256),
            other => Err(CoseError::UnsupportedAlgorithm(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for alg in [CoseAlgorithm::ES256, CoseAlgorithm::PS256] {
            assert_eq!(CoseAlgorithm::from_label(alg.label()).unwrap(), alg);
        }
    }

    #[test]
    fn unknown_labels_are_rejected() {
        for label in [-35, -36, -257, 0, 1] {
            assert!(matches!(
                CoseAlgorithm::from_label(label),
                Err(CoseError::UnsupportedAlgorithm(l)) if l == label
            ));
        }
    }
}
