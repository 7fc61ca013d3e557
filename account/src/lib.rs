// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # cfx-account — Account Signing Library
//!
//! Derive accounts from keys, sign transactions and messages, and recover
//! signers from signed wire bytes, for Conflux and its Ethereum-compatible
//! transaction formats.
//!
//! Two signature schemes live side by side: secp256k1 (recoverable, the one
//! the chain actually accepts in transactions) and Dilithium (post-quantum,
//! reached through a native library we load at startup and never
//! reimplement).
//!
//! ## Architecture
//!
//! - **config** — Protocol constants and the runtime `AccountConfig`.
//! - **error** — The one error type. Never carries key material.
//! - **crypto** — Keccak, keys, both signature schemes, the lattice FFI.
//! - **address** — Narrow interfaces to the address codec, network-id
//!   validation, and the default chain id.
//! - **transaction** — Typed transactions, canonical RLP encoding, decoding.
//! - **account** — The facade tying it together.
//!
//! ## Example
//!
//! ```
//! use cfx_account::Account;
//! use serde_json::json;
//!
//! let key = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
//! let facade = Account::new();
//! let signed = facade
//!     .sign_transaction(
//!         &json!({
//!             "nonce": 0,
//!             "chainId": 1,
//!             "to": "0xF0109fC8DF283027b6285cc889F5aA624EaC1F55",
//!             "value": 1000000000,
//!             "gas": 2000000,
//!             "gasPrice": 234567897654321u64,
//!         }),
//!         key,
//!     )
//!     .unwrap();
//! assert_eq!(signed.v, 37);
//! assert_eq!(
//!     facade.recover_transaction(&signed.raw_transaction).unwrap(),
//!     "0x1c7536e3605d9c16a7a3d7b1898e529396a65c23"
//! );
//! ```
//!
//! ## Design Philosophy
//!
//! 1. Everything is a pure function of its inputs and the key. No globals.
//! 2. No `unsafe` outside the FFI boundary, and that boundary is small.
//! 3. Wire bytes are bit-exact or they are wrong. The tests pin vectors.

pub mod account;
pub mod address;
pub mod config;
pub mod crypto;
pub mod error;
pub mod transaction;

pub use account::{Account, LocalAccount, SignedMessage, SignedTransaction};
pub use error::{AccountError, Result};
