//! # Hashing Utilities
//!
//! One hash function, used everywhere: **Keccak-256**. Not SHA3-256 (the
//! NIST-padded sibling), the original Keccak submission that Ethereum froze
//! in 2015 and every EVM-flavoured chain has been stuck with since.
//!
//! It shows up in three places:
//!
//! - the **signing digest**, keccak over the unsigned canonical payload;
//! - the **transaction hash**, keccak over the final signed wire bytes;
//! - **address derivation**, keccak over the 64 raw public-key coordinate
//!   bytes, keeping the last 20.
//!
//! Personal messages get a prefix before hashing so that a signed message can
//! never double as a signed transaction.

use alloy_primitives::{keccak256, Address, B256};

use crate::config::{ADDRESS_LENGTH, MESSAGE_PREFIX};

/// Keccak-256 of arbitrary bytes.
///
/// # Example
///
/// ```
/// use cfx_account::crypto::keccak;
///
/// let digest = keccak(b"");
/// assert_eq!(
///     hex::encode(digest),
///     "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
/// );
/// ```
pub fn keccak(data: &[u8]) -> B256 {
    keccak256(data)
}

/// Digest of a personal message: `keccak(prefix ‖ len(message) ‖ message)`.
///
/// The length is the decimal byte count, not a fixed-width integer. Yes,
/// really. Everyone copied it from the same place.
pub fn message_digest(message: &[u8]) -> B256 {
    let len = message.len().to_string();
    let mut buf = Vec::with_capacity(MESSAGE_PREFIX.len() + len.len() + message.len());
    buf.extend_from_slice(MESSAGE_PREFIX.as_bytes());
    buf.extend_from_slice(len.as_bytes());
    buf.extend_from_slice(message);
    keccak256(&buf)
}

/// Derives an address from raw public-key material by hashing it and keeping
/// the trailing [`ADDRESS_LENGTH`] bytes.
///
/// For secp256k1 keys pass the 64 coordinate bytes (uncompressed form with the
/// 0x04 tag stripped). For lattice keys pass the full public key.
pub fn address_from_key_bytes(key_bytes: &[u8]) -> Address {
    let hash = keccak256(key_bytes);
    Address::from_slice(&hash[hash.len() - ADDRESS_LENGTH..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak_known_vector() {
        assert_eq!(
            hex::encode(keccak(b"hello")),
            "1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8"
        );
    }

    #[test]
    fn test_message_digest_includes_prefix_and_length() {
        let manual = {
            let mut buf = MESSAGE_PREFIX.as_bytes().to_vec();
            buf.extend_from_slice(b"5hello");
            keccak256(&buf)
        };
        assert_eq!(message_digest(b"hello"), manual);
        assert_ne!(message_digest(b"hello"), keccak(b"hello"));
    }

    #[test]
    fn test_message_digest_empty_message() {
        // Zero-length messages still carry the "0" length marker.
        let mut buf = MESSAGE_PREFIX.as_bytes().to_vec();
        buf.push(b'0');
        assert_eq!(message_digest(b""), keccak256(&buf));
    }

    #[test]
    fn test_address_is_hash_suffix() {
        let key = [7u8; 64];
        let hash = keccak(&key);
        assert_eq!(address_from_key_bytes(&key).as_slice(), &hash[12..]);
    }
}
