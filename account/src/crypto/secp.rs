//! Classical recoverable signatures over secp256k1.
//!
//! Signing is deterministic: libsecp256k1 derives the per-message nonce from
//! the key and digest with RFC 6979, and always emits the lower-half `s`.
//! The recovery id records which of the two candidate points `R` the
//! signature was built from, so [`recover_address`] can rebuild the public
//! key from `(digest, r, s, id)` alone.

use alloy_primitives::{Address, B256, U256};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, SECP256K1};

use super::keys::{public_key_to_address, PrivateKey};
use super::signatures::EcdsaSignature;
use crate::config::{MAX_RECOVERY_ID, SECP256K1_ORDER};
use crate::error::{AccountError, Result};

/// Signs a 32-byte digest.
///
/// Fails with [`AccountError::SignatureRejected`] in the (astronomically
/// unlikely) case that libsecp256k1 hands back a recovery id above 1.
pub fn sign_digest(digest: &B256, key: &PrivateKey) -> Result<EcdsaSignature> {
    let message = Message::from_digest(digest.0);
    let signature = SECP256K1.sign_ecdsa_recoverable(&message, key.secret());
    let (rec_id, compact) = signature.serialize_compact();

    let recovery_id = u8::try_from(rec_id.to_i32())
        .ok()
        .filter(|id| *id <= MAX_RECOVERY_ID)
        .ok_or_else(|| {
            AccountError::SignatureRejected(format!(
                "recovery id {} outside {{0, 1}}",
                rec_id.to_i32()
            ))
        })?;

    Ok(EcdsaSignature {
        r: U256::from_be_slice(&compact[..32]),
        s: U256::from_be_slice(&compact[32..]),
        recovery_id,
    })
}

/// Recovers the signer's address from a digest and a recoverable signature.
///
/// `r` and `s` must lie in `[1, n-1]`. High-s signatures are accepted here;
/// only signing is required to produce the canonical low-s form.
pub fn recover_address(digest: &B256, signature: &EcdsaSignature) -> Result<Address> {
    check_scalar("r", signature.r)?;
    check_scalar("s", signature.s)?;
    if signature.recovery_id > MAX_RECOVERY_ID {
        return Err(AccountError::SignatureRejected(format!(
            "recovery id {} outside {{0, 1}}",
            signature.recovery_id
        )));
    }

    let rec_id = RecoveryId::from_i32(i32::from(signature.recovery_id))
        .map_err(|e| AccountError::SignatureRejected(e.to_string()))?;

    let mut compact = [0u8; 64];
    compact[..32].copy_from_slice(&signature.r.to_be_bytes::<32>());
    compact[32..].copy_from_slice(&signature.s.to_be_bytes::<32>());

    let recoverable = RecoverableSignature::from_compact(&compact, rec_id)
        .map_err(|e| AccountError::SignatureRejected(e.to_string()))?;
    let public = SECP256K1
        .recover_ecdsa(&Message::from_digest(digest.0), &recoverable)
        .map_err(|e| AccountError::SignatureRejected(e.to_string()))?;

    Ok(public_key_to_address(&public))
}

/// Whether `s` is in the lower half of the curve order.
pub fn is_low_s(s: U256) -> bool {
    s <= SECP256K1_ORDER >> 1usize
}

fn check_scalar(name: &str, value: U256) -> Result<()> {
    if value.is_zero() || value >= SECP256K1_ORDER {
        return Err(AccountError::SignatureRejected(format!(
            "{} outside [1, n-1]",
            name
        )));
    }
    Ok(())
}
