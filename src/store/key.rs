//! store::key
//!
//! Encryption keys: literal hex keys and password-derived keys.

use std::fmt;

use sha2::{Digest, Sha256};

/// Size in bytes of an AES-256 key.
pub const KEY_SIZE_AES256: usize = 32;

/// Number of hashing rounds used when deriving a key from a password.
const KDF_ROUNDS: u32 = 64_000;

/// Fixed salt mixed into every password derivation.
const KDF_SALT: &[u8] = b"Salty McNaCl";

/// Encryption algorithm tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// No encryption.
    None,
    /// AES with a 256-bit key.
    Aes256,
}

impl Algorithm {
    fn tag(self) -> u8 {
        match self {
            Algorithm::None => 0,
            Algorithm::Aes256 => 1,
        }
    }
}

/// An encryption key together with the algorithm it is meant for.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey {
    algorithm: Algorithm,
    bytes: [u8; KEY_SIZE_AES256],
}

impl EncryptionKey {
    /// Create an AES-256 key from raw bytes.
    pub fn aes256(bytes: [u8; KEY_SIZE_AES256]) -> Self {
        Self {
            algorithm: Algorithm::Aes256,
            bytes,
        }
    }

    /// Parse a literal hex key.
    ///
    /// Accepts exactly two hex digits (either case) per key byte and nothing
    /// else; returns `None` otherwise.
    pub fn from_hex(text: &str) -> Option<Self> {
        if text.len() != 2 * KEY_SIZE_AES256 || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let mut bytes = [0u8; KEY_SIZE_AES256];
        hex::decode_to_slice(text, &mut bytes).ok()?;
        Some(Self::aes256(bytes))
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn bytes(&self) -> &[u8; KEY_SIZE_AES256] {
        &self.bytes
    }

    /// A one-way fingerprint stored in the database header to check keys.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(b"cblite key check");
        hasher.update([self.algorithm.tag()]);
        hasher.update(self.bytes);
        hex::encode(hasher.finalize())
    }
}

// Never print key material.
impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// Derive a key from a password.
///
/// Returns `None` for an empty password or when `algorithm` is
/// [`Algorithm::None`].
pub fn derive_key_from_password(password: &str, algorithm: Algorithm) -> Option<EncryptionKey> {
    if password.is_empty() || algorithm != Algorithm::Aes256 {
        return None;
    }

    let mut digest: [u8; KEY_SIZE_AES256] = Sha256::new()
        .chain_update(KDF_SALT)
        .chain_update(password.as_bytes())
        .finalize()
        .into();
    for _ in 1..KDF_ROUNDS {
        digest = Sha256::new()
            .chain_update(digest)
            .chain_update(password.as_bytes())
            .finalize()
            .into();
    }
    Some(EncryptionKey::aes256(digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX_KEY: &str = "00112233445566778899aabbccddeeff00112233445566778899AABBCCDDEEFF";

    #[test]
    fn hex_key_accepts_mixed_case() {
        let key = EncryptionKey::from_hex(HEX_KEY).expect("valid hex key");
        assert_eq!(key.algorithm(), Algorithm::Aes256);
        assert_eq!(key.bytes()[1], 0x11);
        assert_eq!(key.bytes()[31], 0xff);
    }

    #[test]
    fn hex_key_rejects_wrong_length() {
        assert!(EncryptionKey::from_hex(&HEX_KEY[..62]).is_none());
        assert!(EncryptionKey::from_hex(&format!("{}00", HEX_KEY)).is_none());
        assert!(EncryptionKey::from_hex("").is_none());
    }

    #[test]
    fn hex_key_rejects_non_hex_characters() {
        let bad = HEX_KEY.replacen('0', "g", 1);
        assert!(EncryptionKey::from_hex(&bad).is_none());
        let spaced = HEX_KEY.replacen("00", " 0", 1);
        assert!(EncryptionKey::from_hex(&spaced).is_none());
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = derive_key_from_password("sekrit", Algorithm::Aes256).expect("derive");
        let b = derive_key_from_password("sekrit", Algorithm::Aes256).expect("derive");
        let c = derive_key_from_password("sekrit2", Algorithm::Aes256).expect("derive");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn derivation_fails_for_empty_password_or_no_algorithm() {
        assert!(derive_key_from_password("", Algorithm::Aes256).is_none());
        assert!(derive_key_from_password("sekrit", Algorithm::None).is_none());
    }

    #[test]
    fn debug_output_hides_key_bytes() {
        let key = EncryptionKey::from_hex(HEX_KEY).expect("valid hex key");
        let rendered = format!("{:?}", key);
        assert!(!rendered.contains("11"));
        assert!(rendered.contains("Aes256"));
    }
}
