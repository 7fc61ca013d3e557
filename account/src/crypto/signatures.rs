//! # Digital Signatures
//!
//! The signature engine: one entry point for signing and recovery, whichever
//! scheme the key belongs to.
//!
//! ## Two schemes, one enum
//!
//! A [`Signature`] is either a recoverable secp256k1 signature (three
//! components: `r`, `s`, and a recovery id) or an opaque lattice blob. The
//! engine matches on the tag at every call site, so adding a third scheme is
//! a compile error in every place that needs to think about it. That's the
//! point.
//!
//! ## What "sign" means per scheme
//!
//! - **secp256k1** signs `keccak(payload)`; the digest is what gets recovered
//!   against later.
//! - **Dilithium** signs the payload bytes directly through the external
//!   primitive. There is no recovery; verification needs the public key.

use std::fmt;

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use super::hash::keccak;
use super::keys::KeyMaterial;
use super::lattice::LatticeEngine;
use super::secp;
use crate::config::RECOVERABLE_SIGNATURE_LENGTH;
use crate::error::{AccountError, Result};

/// Which signature scheme a key or signature belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureScheme {
    /// Classical recoverable ECDSA.
    Secp256k1,
    /// Post-quantum lattice signatures.
    Dilithium,
}

impl fmt::Display for SignatureScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureScheme::Secp256k1 => write!(f, "secp256k1"),
            SignatureScheme::Dilithium => write!(f, "dilithium"),
        }
    }
}

/// A recoverable secp256k1 signature.
///
/// `recovery_id` is the raw parity bit (0 or 1). Chain-adjusted `v` values
/// are a wire-format concern and live in the transaction encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EcdsaSignature {
    /// First curve signature half.
    pub r: U256,
    /// Second curve signature half, lower-half form when freshly signed.
    pub s: U256,
    /// Which candidate public key the signature recovers to.
    pub recovery_id: u8,
}

impl EcdsaSignature {
    /// The 65-byte `r ‖ s ‖ v` form.
    pub fn to_bytes(&self) -> [u8; RECOVERABLE_SIGNATURE_LENGTH] {
        let mut out = [0u8; RECOVERABLE_SIGNATURE_LENGTH];
        out[..32].copy_from_slice(&self.r.to_be_bytes::<32>());
        out[32..64].copy_from_slice(&self.s.to_be_bytes::<32>());
        out[64] = self.recovery_id;
        out
    }

    /// Parses the 65-byte `r ‖ s ‖ v` form.
    ///
    /// Accepts `v` as a raw parity bit or with the legacy +27 offset.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != RECOVERABLE_SIGNATURE_LENGTH {
            return Err(AccountError::malformed(
                "signature",
                format!(
                    "expected {} bytes, got {}",
                    RECOVERABLE_SIGNATURE_LENGTH,
                    bytes.len()
                ),
            ));
        }
        let recovery_id = match bytes[64] {
            v @ (0 | 1) => v,
            v @ (27 | 28) => v - 27,
            v => {
                return Err(AccountError::SignatureRejected(format!(
                    "recovery byte {} is not 0, 1, 27 or 28",
                    v
                )))
            }
        };
        Ok(Self {
            r: U256::from_be_slice(&bytes[..32]),
            s: U256::from_be_slice(&bytes[32..64]),
            recovery_id,
        })
    }
}

/// An opaque lattice signature as produced by the primitive.
#[derive(Clone, PartialEq, Eq)]
pub struct LatticeSignature {
    bytes: Vec<u8>,
}

impl LatticeSignature {
    /// Wraps signature bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// The raw signature.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Signature length in bytes. Bounded by the parameter set's maximum.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the signature is empty (never true for a real one).
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for LatticeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LatticeSignature({} bytes)", self.bytes.len())
    }
}

/// A signature from either scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signature {
    /// Recoverable secp256k1 signature.
    Ecdsa(EcdsaSignature),
    /// Opaque lattice signature.
    Lattice(LatticeSignature),
}

impl Signature {
    /// The scheme this signature belongs to.
    pub fn scheme(&self) -> SignatureScheme {
        match self {
            Signature::Ecdsa(_) => SignatureScheme::Secp256k1,
            Signature::Lattice(_) => SignatureScheme::Dilithium,
        }
    }
}

// ---------------------------------------------------------------------------
// SignatureEngine
// ---------------------------------------------------------------------------

/// Signs and recovers across both schemes.
///
/// The classical path needs nothing but the key. The lattice path needs a
/// [`LatticeEngine`], which is injected at construction; an engine without
/// one fails lattice operations with [`AccountError::PrimitiveFailure`].
#[derive(Debug, Clone, Default)]
pub struct SignatureEngine {
    lattice: Option<LatticeEngine>,
}

impl SignatureEngine {
    /// An engine that can only do classical signatures.
    pub fn classical() -> Self {
        Self { lattice: None }
    }

    /// An engine with a lattice primitive attached.
    pub fn with_lattice(lattice: LatticeEngine) -> Self {
        Self {
            lattice: Some(lattice),
        }
    }

    /// The attached lattice engine, if any.
    pub fn lattice(&self) -> Result<&LatticeEngine> {
        self.lattice.as_ref().ok_or_else(|| {
            AccountError::PrimitiveFailure("no lattice primitive configured".into())
        })
    }

    /// Signs a 32-byte digest. Only meaningful for the classical scheme.
    pub fn sign_digest(&self, digest: &B256, key: &KeyMaterial) -> Result<EcdsaSignature> {
        match key {
            KeyMaterial::Secp256k1(private) => secp::sign_digest(digest, private),
            KeyMaterial::Dilithium(_) => Err(AccountError::UnsupportedScheme {
                scheme: SignatureScheme::Dilithium,
                operation: "digest signing",
            }),
        }
    }

    /// Signs a payload with whichever scheme `key` belongs to.
    pub fn sign(&self, payload: &[u8], key: &KeyMaterial) -> Result<Signature> {
        match key {
            KeyMaterial::Secp256k1(private) => {
                secp::sign_digest(&keccak(payload), private).map(Signature::Ecdsa)
            }
            KeyMaterial::Dilithium(pair) => self.lattice()?.sign(payload, pair).map(Signature::Lattice),
        }
    }

    /// Recovers the signer of a digest.
    ///
    /// Lattice signatures carry no recovery information and always fail with
    /// [`AccountError::RecoveryUnsupported`].
    pub fn recover(&self, digest: &B256, signature: &Signature) -> Result<Address> {
        match signature {
            Signature::Ecdsa(sig) => secp::recover_address(digest, sig),
            Signature::Lattice(_) => Err(AccountError::RecoveryUnsupported),
        }
    }

    /// Verifies a payload signature against the signer's key material.
    ///
    /// Classical signatures are checked by recovering against
    /// `keccak(payload)` and comparing addresses; lattice signatures go
    /// through the primitive's `open`.
    pub fn verify(&self, payload: &[u8], signature: &Signature, signer: &KeyMaterial) -> Result<bool> {
        match (signature, signer) {
            (Signature::Ecdsa(sig), KeyMaterial::Secp256k1(key)) => {
                Ok(secp::recover_address(&keccak(payload), sig).ok() == Some(key.address()))
            }
            (Signature::Lattice(sig), KeyMaterial::Dilithium(pair)) => {
                self.lattice()?.verify(payload, sig, pair.public_key())
            }
            (Signature::Ecdsa(_), KeyMaterial::Dilithium(_))
            | (Signature::Lattice(_), KeyMaterial::Secp256k1(_)) => Ok(false),
        }
    }
}
