//! # Transaction Module
//!
//! Typed transactions, their canonical encoding, and the codec that reads
//! signed wire bytes back.
//!
//! ## Architecture
//!
//! ```text
//! types.rs    — TxType and the four transaction variants
//! request.rs  — JSON field mapping → validated request → typed transaction
//! encoding.rs — signing payload, signing hash, v values, signed wire form
//! codec.rs    — signed wire bytes → transaction + signature
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Validate**: [`TransactionRequest::from_value`] checks a field mapping.
//! 2. **Type**: [`TransactionRequest::into_transaction`] picks the variant.
//! 3. **Sign**: the facade signs [`signing_hash`] and calls [`encode_signed`].
//! 4. **Recover**: [`decode`] returns the fields and signature; recovery runs
//!    against the re-derived signing hash.
//!
//! ## Design Decisions
//!
//! - The signing payload is re-derived from the decoded fields, never sliced
//!   out of the wire bytes. A decode that loses information would then fail
//!   recovery instead of silently recovering the wrong payload.
//! - The transaction hash is Keccak-256 of the full signed wire bytes,
//!   including the type byte for typed envelopes.

pub mod codec;
pub mod encoding;
pub mod request;
pub mod types;

pub use codec::{decode, DecodedTransaction};
pub use encoding::{encode, encode_signed, encode_unsigned, signature_v, signing_hash};
pub use request::TransactionRequest;
pub use types::{
    AccessList, AccessListItem, AccessListTx, DynamicFeeTx, LegacyTx, NativeTx, Transaction,
    TxType,
};
