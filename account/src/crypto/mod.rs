//! # Cryptographic Primitives
//!
//! Everything that touches a key or a digest flows through here.
//!
//! - **secp256k1** for classical, recoverable signatures. Deterministic
//!   nonces (RFC 6979), low-s, and the signer's address can be rebuilt from
//!   the signature alone.
//! - **Dilithium** for post-quantum signatures, through a native library we
//!   load but do not reimplement.
//! - **Keccak-256** for every digest and every address.
//!
//! ## A note on "rolling your own crypto"
//!
//! We don't. The curve math is libsecp256k1, the lattice math is the
//! pq-crystals reference build, and keccak comes from `alloy-primitives`.
//! This module is typed plumbing around them.

pub mod hash;
pub mod keys;
pub mod lattice;
pub mod secp;
pub mod signatures;

pub use hash::{keccak, message_digest};
pub use keys::{KeyMaterial, LatticeKeypair, PrivateKey};
pub use lattice::{DylibPrimitive, LatticeEngine, LatticeParams, LatticePrimitive};
pub use signatures::{EcdsaSignature, LatticeSignature, Signature, SignatureEngine, SignatureScheme};
