//! # Key Management
//!
//! Key material for the two signature schemes an account can hold.
//!
//! - [`PrivateKey`] — a secp256k1 scalar. Signs deterministically (RFC 6979)
//!   and its signatures are recoverable, so the chain never needs to see the
//!   public key.
//! - [`LatticeKeypair`] — a Dilithium public/secret key pair. Post-quantum,
//!   opaque, and not recoverable: whoever verifies needs the public key.
//!
//! [`KeyMaterial`] tags which one an account owns. Every operation that cares
//! matches on it exhaustively; there is no "base key" to downcast from.
//!
//! ## Security considerations
//!
//! - Key bytes are never logged, and `Debug` never prints them.
//! - Random keys come from `OsRng`.
//! - Nothing here implements `Serialize`. Exporting a secret is an explicit
//!   call to [`PrivateKey::to_bytes`] or [`LatticeKeypair::secret_key`].

use std::fmt;

use alloy_primitives::Address;
use rand::rngs::OsRng;
use secp256k1::{PublicKey, SecretKey, SECP256K1};

use super::hash::address_from_key_bytes;
use crate::config::PRIVATE_KEY_LENGTH;
use crate::crypto::signatures::SignatureScheme;
use crate::error::{AccountError, Result};

// ---------------------------------------------------------------------------
// PrivateKey
// ---------------------------------------------------------------------------

/// A secp256k1 private scalar.
///
/// # Examples
///
/// ```
/// use cfx_account::crypto::keys::PrivateKey;
///
/// let key = PrivateKey::from_hex(
///     "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318",
/// )
/// .unwrap();
/// assert_eq!(
///     key.address().to_string().to_lowercase(),
///     "0x2c7536e3605d9c16a7a3d7b1898e529396a65c23"
/// );
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    secret: SecretKey,
}

impl PrivateKey {
    /// Draws a fresh key from the OS RNG.
    pub fn random() -> Self {
        Self {
            secret: SecretKey::new(&mut OsRng),
        }
    }

    /// Builds a key from 32 big-endian bytes.
    ///
    /// Zero and values at or above the curve order are rejected; neither is a
    /// usable scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != PRIVATE_KEY_LENGTH {
            return Err(AccountError::malformed(
                "privateKey",
                format!("expected {} bytes, got {}", PRIVATE_KEY_LENGTH, bytes.len()),
            ));
        }
        let secret = SecretKey::from_slice(bytes)
            .map_err(|_| AccountError::malformed("privateKey", "not a valid secp256k1 scalar"))?;
        Ok(Self { secret })
    }

    /// Parses a hex-encoded key, with or without `0x`.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let trimmed = hex_str.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let bytes = hex::decode(digits)
            .map_err(|_| AccountError::malformed("privateKey", "not valid hex"))?;
        Self::from_bytes(&bytes)
    }

    /// The raw 32-byte scalar. Handle with extreme care.
    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_LENGTH] {
        self.secret.secret_bytes()
    }

    /// The matching secp256k1 public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_secret_key(SECP256K1, &self.secret)
    }

    /// The 20-byte address of this key.
    pub fn address(&self) -> Address {
        public_key_to_address(&self.public_key())
    }

    pub(crate) fn secret(&self) -> &SecretKey {
        &self.secret
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey(address={})", self.address())
    }
}

/// Hashes the uncompressed public key coordinates and keeps the last 20 bytes.
pub fn public_key_to_address(public: &PublicKey) -> Address {
    // Strip the 0x04 tag libsecp256k1 puts in front of the coordinates.
    address_from_key_bytes(&public.serialize_uncompressed()[1..])
}

// ---------------------------------------------------------------------------
// LatticeKeypair
// ---------------------------------------------------------------------------

/// A Dilithium key pair produced by the external lattice primitive.
///
/// The byte lengths are fixed by the parameter set; the pair itself doesn't
/// know which set that is, so length checks happen where the primitive's
/// parameters are known ([`LatticeKeypair::from_bytes`] takes them explicitly).
#[derive(Clone, PartialEq, Eq)]
pub struct LatticeKeypair {
    public_key: Vec<u8>,
    secret_key: Vec<u8>,
}

impl LatticeKeypair {
    /// Wraps existing key bytes, checking them against the expected lengths.
    pub fn from_bytes(
        public_key: Vec<u8>,
        secret_key: Vec<u8>,
        public_key_bytes: usize,
        secret_key_bytes: usize,
    ) -> Result<Self> {
        if public_key.len() != public_key_bytes {
            return Err(AccountError::malformed(
                "publicKey",
                format!("expected {} bytes, got {}", public_key_bytes, public_key.len()),
            ));
        }
        if secret_key.len() != secret_key_bytes {
            return Err(AccountError::malformed(
                "secretKey",
                format!("expected {} bytes, got {}", secret_key_bytes, secret_key.len()),
            ));
        }
        Ok(Self {
            public_key,
            secret_key,
        })
    }

    /// The public key. Safe to share.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// The secret key. Not safe to share, log, or look at for too long.
    pub fn secret_key(&self) -> &[u8] {
        &self.secret_key
    }

    /// Identity of a lattice account: the tail of `keccak256(public_key)`.
    pub fn address(&self) -> Address {
        address_from_key_bytes(&self.public_key)
    }
}

impl fmt::Debug for LatticeKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LatticeKeypair(address={}, pk_len={})",
            self.address(),
            self.public_key.len()
        )
    }
}

// ---------------------------------------------------------------------------
// KeyMaterial
// ---------------------------------------------------------------------------

/// The key an account owns, tagged by scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyMaterial {
    /// Classical recoverable scheme.
    Secp256k1(PrivateKey),
    /// Post-quantum lattice scheme.
    Dilithium(LatticeKeypair),
}

impl KeyMaterial {
    /// Which scheme this key belongs to.
    pub fn scheme(&self) -> SignatureScheme {
        match self {
            KeyMaterial::Secp256k1(_) => SignatureScheme::Secp256k1,
            KeyMaterial::Dilithium(_) => SignatureScheme::Dilithium,
        }
    }

    /// The identity derived from this key.
    pub fn address(&self) -> Address {
        match self {
            KeyMaterial::Secp256k1(key) => key.address(),
            KeyMaterial::Dilithium(pair) => pair.address(),
        }
    }
}

impl From<PrivateKey> for KeyMaterial {
    fn from(key: PrivateKey) -> Self {
        KeyMaterial::Secp256k1(key)
    }
}

impl From<LatticeKeypair> for KeyMaterial {
    fn from(pair: LatticeKeypair) -> Self {
        KeyMaterial::Dilithium(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_HEX: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    #[test]
    fn test_known_key_address() {
        let key = PrivateKey::from_hex(KEY_HEX).unwrap();
        assert_eq!(
            hex::encode(key.address()),
            "2c7536e3605d9c16a7a3d7b1898e529396a65c23"
        );
    }

    #[test]
    fn test_hex_prefix_is_optional() {
        let a = PrivateKey::from_hex(KEY_HEX).unwrap();
        let b = PrivateKey::from_hex(&format!("0x{}", KEY_HEX)).unwrap();
        assert_eq!(a, b);
        assert_eq!(hex::encode(a.to_bytes()), KEY_HEX);
    }

    #[test]
    fn test_zero_key_rejected() {
        let err = PrivateKey::from_bytes(&[0u8; 32]).unwrap_err();
        assert!(matches!(err, AccountError::MalformedField { .. }));
    }

    #[test]
    fn test_key_above_order_rejected() {
        assert!(PrivateKey::from_bytes(&[0xffu8; 32]).is_err());
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!(PrivateKey::from_bytes(&[1u8; 31]).is_err());
        assert!(PrivateKey::from_hex("0xzz").is_err());
    }

    #[test]
    fn test_random_keys_differ() {
        assert_ne!(PrivateKey::random(), PrivateKey::random());
    }

    #[test]
    fn test_debug_never_prints_secret() {
        let key = PrivateKey::from_hex(KEY_HEX).unwrap();
        let dbg = format!("{:?}", key);
        assert!(!dbg.contains(KEY_HEX));
        assert!(dbg.contains("address"));
    }

    #[test]
    fn test_lattice_keypair_length_checks() {
        assert!(LatticeKeypair::from_bytes(vec![1; 4], vec![2; 8], 4, 8).is_ok());
        let err = LatticeKeypair::from_bytes(vec![1; 3], vec![2; 8], 4, 8).unwrap_err();
        assert!(matches!(err, AccountError::MalformedField { ref field, .. } if field == "publicKey"));
        assert!(LatticeKeypair::from_bytes(vec![1; 4], vec![2; 7], 4, 8).is_err());
    }

    #[test]
    fn test_key_material_scheme_tag() {
        let classical: KeyMaterial = PrivateKey::random().into();
        assert_eq!(classical.scheme(), SignatureScheme::Secp256k1);

        let pair = LatticeKeypair::from_bytes(vec![9; 4], vec![8; 8], 4, 8).unwrap();
        let expected = pair.address();
        let lattice: KeyMaterial = pair.into();
        assert_eq!(lattice.scheme(), SignatureScheme::Dilithium);
        assert_eq!(lattice.address(), expected);
    }
}
