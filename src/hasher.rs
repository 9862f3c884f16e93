//! Block digests: a cheap DJB2 checksum for chain linking, SHA-256 on request.
//!
//! Neither variant is used for authentication. The digest only links each
//! block to its predecessor and makes blocks easy to tell apart by eye.

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::str::FromStr;

const DJB2_SEED: u64 = 5381;

/// Which digest the ledger seals blocks with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Digest {
    /// 64-bit DJB2 rendered as decimal.
    #[default]
    Djb2,
    /// SHA-256 rendered as lowercase hex.
    Sha256,
}

impl Digest {
    /// Digest arbitrary bytes into a stable textual form.
    pub fn digest(&self, bytes: &[u8]) -> String {
        match self {
            Digest::Djb2 => djb2(bytes).to_string(),
            Digest::Sha256 => hex::encode(Sha256::digest(bytes)),
        }
    }
}

fn djb2(bytes: &[u8]) -> u64 {
    bytes.iter().fold(DJB2_SEED, |h, &b| {
        (h << 5).wrapping_add(h).wrapping_add(u64::from(b))
    })
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Digest::Djb2 => f.write_str("djb2"),
            Digest::Sha256 => f.write_str("sha256"),
        }
    }
}

impl FromStr for Digest {
    type Err = UnknownDigest;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "djb2" => Ok(Digest::Djb2),
            "sha256" | "sha-256" => Ok(Digest::Sha256),
            _ => Err(UnknownDigest(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown digest '{0}' (expected djb2 or sha256)")]
pub struct UnknownDigest(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_djb2_empty_is_seed() {
        assert_eq!(Digest::Djb2.digest(b""), "5381");
    }

    #[test]
    fn test_djb2_known_value() {
        // 5381 * 33 + 'a'
        assert_eq!(Digest::Djb2.digest(b"a"), "177670");
        assert_eq!(Digest::Djb2.digest(b"ab"), (177670u64 * 33 + 98).to_string());
    }

    #[test]
    fn test_djb2_wraps_on_long_input() {
        let long = vec![0xffu8; 10_000];
        let first = Digest::Djb2.digest(&long);
        assert_eq!(first, Digest::Djb2.digest(&long));
        assert!(first.parse::<u64>().is_ok());
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            Digest::Sha256.digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_parse_digest() {
        assert_eq!("djb2".parse::<Digest>(), Ok(Digest::Djb2));
        assert_eq!(" SHA256 ".parse::<Digest>(), Ok(Digest::Sha256));
        assert!("md5".parse::<Digest>().is_err());
        assert_eq!(Digest::default(), Digest::Djb2);
    }
}
