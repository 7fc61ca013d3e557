//! # Canonical Encoder
//!
//! Turns a [`Transaction`] into the bytes that get signed and the bytes that
//! get broadcast. Both are RLP: every scalar is a minimal big-endian string
//! (zero is the empty string), every record is a length-prefixed list.
//!
//! | Variant    | Signing payload                               | Wire form                             |
//! |------------|-----------------------------------------------|---------------------------------------|
//! | Legacy     | `[fields]` or `[fields, chainId, 0, 0]`       | `[fields, v, r, s]`                   |
//! | AccessList | `0x01 ‖ [chainId, fields, accessList]`        | `0x01 ‖ [..., yParity, r, s]`         |
//! | DynamicFee | `0x02 ‖ [chainId, fields, accessList]`        | `0x02 ‖ [..., yParity, r, s]`         |
//! | Native     | `[fields, storageLimit, epochHeight, chainId, data]` | `[[unsigned], v, r, s]`        |
//!
//! An absent recipient is the empty string `0x80`, never twenty zero bytes.

use alloy_primitives::{Address, B256};
use alloy_rlp::{BufMut, Encodable, Header, EMPTY_STRING_CODE};

use super::types::{AccessListTx, DynamicFeeTx, LegacyTx, NativeTx, Transaction};
use crate::config::{EIP155_V_OFFSET, LEGACY_V_OFFSET, MAX_RECOVERY_ID};
use crate::crypto::hash::keccak;
use crate::crypto::signatures::EcdsaSignature;
use crate::error::{AccountError, Result};

/// Encodes the unsigned signing payload.
pub fn encode_unsigned(tx: &Transaction) -> Vec<u8> {
    let mut out = Vec::new();
    put_type_byte(tx, &mut out);
    match tx {
        Transaction::Legacy(tx) => {
            let trailer = tx.chain_id.map_or(0, |id| id.length() + 2);
            list_header(tx.fields_len() + trailer).encode(&mut out);
            tx.encode_fields(&mut out);
            if let Some(chain_id) = tx.chain_id {
                chain_id.encode(&mut out);
                0u8.encode(&mut out);
                0u8.encode(&mut out);
            }
        }
        Transaction::AccessList(tx) => {
            list_header(tx.fields_len()).encode(&mut out);
            tx.encode_fields(&mut out);
        }
        Transaction::DynamicFee(tx) => {
            list_header(tx.fields_len()).encode(&mut out);
            tx.encode_fields(&mut out);
        }
        Transaction::Native(tx) => tx.encode_unsigned_list(&mut out),
    }
    out
}

/// Keccak-256 of the signing payload. This is the digest that gets signed
/// and that recovery runs against.
pub fn signing_hash(tx: &Transaction) -> B256 {
    keccak(&encode_unsigned(tx))
}

/// The `v` value the wire form carries for a given recovery id.
///
/// Legacy transactions use `27 + id`, or `35 + 2·chainId + id` once a chain
/// id is present. Every other variant carries the bare parity bit.
pub fn signature_v(tx: &Transaction, recovery_id: u8) -> Result<u64> {
    if recovery_id > MAX_RECOVERY_ID {
        return Err(AccountError::SignatureRejected(format!(
            "recovery id {} outside {{0, 1}}",
            recovery_id
        )));
    }
    let id = u64::from(recovery_id);
    match tx {
        Transaction::Legacy(LegacyTx { chain_id: None, .. }) => Ok(LEGACY_V_OFFSET + id),
        Transaction::Legacy(LegacyTx {
            chain_id: Some(chain_id),
            ..
        }) => chain_id
            .checked_mul(2)
            .and_then(|v| v.checked_add(EIP155_V_OFFSET + id))
            .ok_or_else(|| {
                AccountError::malformed(
                    "chainId",
                    format!("{} does not fit an EIP-155 v value", chain_id),
                )
            }),
        _ => Ok(id),
    }
}

/// Encodes the signed wire form.
pub fn encode_signed(tx: &Transaction, signature: &EcdsaSignature) -> Result<Vec<u8>> {
    let v = signature_v(tx, signature.recovery_id)?;
    let sig_len = v.length() + signature.r.length() + signature.s.length();

    let mut out = Vec::new();
    put_type_byte(tx, &mut out);
    match tx {
        Transaction::Legacy(tx) => {
            list_header(tx.fields_len() + sig_len).encode(&mut out);
            tx.encode_fields(&mut out);
        }
        Transaction::AccessList(tx) => {
            list_header(tx.fields_len() + sig_len).encode(&mut out);
            tx.encode_fields(&mut out);
        }
        Transaction::DynamicFee(tx) => {
            list_header(tx.fields_len() + sig_len).encode(&mut out);
            tx.encode_fields(&mut out);
        }
        Transaction::Native(tx) => {
            let mut unsigned = Vec::new();
            tx.encode_unsigned_list(&mut unsigned);
            list_header(unsigned.len() + sig_len).encode(&mut out);
            out.put_slice(&unsigned);
        }
    }
    v.encode(&mut out);
    signature.r.encode(&mut out);
    signature.s.encode(&mut out);
    Ok(out)
}

/// Encodes either form: the signing payload when `signature` is `None`,
/// the wire form otherwise.
pub fn encode(tx: &Transaction, signature: Option<&EcdsaSignature>) -> Result<Vec<u8>> {
    match signature {
        Some(sig) => encode_signed(tx, sig),
        None => Ok(encode_unsigned(tx)),
    }
}

/// Typed envelopes lead with their type byte; untyped layouts write nothing.
fn put_type_byte(tx: &Transaction, out: &mut dyn BufMut) {
    if let Some(byte) = tx.tx_type().type_byte() {
        out.put_u8(byte);
    }
}

fn list_header(payload_length: usize) -> Header {
    Header {
        list: true,
        payload_length,
    }
}

fn to_len(to: &Option<Address>) -> usize {
    to.as_ref().map_or(1, |address| address.length())
}

fn encode_to(to: &Option<Address>, out: &mut dyn BufMut) {
    match to {
        Some(address) => address.encode(out),
        None => out.put_u8(EMPTY_STRING_CODE),
    }
}

// ---------------------------------------------------------------------------
// Per-variant field lists
// ---------------------------------------------------------------------------

impl LegacyTx {
    fn fields_len(&self) -> usize {
        self.nonce.length()
            + self.gas_price.length()
            + self.gas_limit.length()
            + to_len(&self.to)
            + self.value.length()
            + self.input.length()
    }

    fn encode_fields(&self, out: &mut dyn BufMut) {
        self.nonce.encode(out);
        self.gas_price.encode(out);
        self.gas_limit.encode(out);
        encode_to(&self.to, out);
        self.value.encode(out);
        self.input.encode(out);
    }
}

impl AccessListTx {
    fn fields_len(&self) -> usize {
        self.chain_id.length()
            + self.nonce.length()
            + self.gas_price.length()
            + self.gas_limit.length()
            + to_len(&self.to)
            + self.value.length()
            + self.input.length()
            + self.access_list.length()
    }

    fn encode_fields(&self, out: &mut dyn BufMut) {
        self.chain_id.encode(out);
        self.nonce.encode(out);
        self.gas_price.encode(out);
        self.gas_limit.encode(out);
        encode_to(&self.to, out);
        self.value.encode(out);
        self.input.encode(out);
        self.access_list.encode(out);
    }
}

impl DynamicFeeTx {
    fn fields_len(&self) -> usize {
        self.chain_id.length()
            + self.nonce.length()
            + self.max_priority_fee_per_gas.length()
            + self.max_fee_per_gas.length()
            + self.gas_limit.length()
            + to_len(&self.to)
            + self.value.length()
            + self.input.length()
            + self.access_list.length()
    }

    fn encode_fields(&self, out: &mut dyn BufMut) {
        self.chain_id.encode(out);
        self.nonce.encode(out);
        self.max_priority_fee_per_gas.encode(out);
        self.max_fee_per_gas.encode(out);
        self.gas_limit.encode(out);
        encode_to(&self.to, out);
        self.value.encode(out);
        self.input.encode(out);
        self.access_list.encode(out);
    }
}

impl NativeTx {
    fn fields_len(&self) -> usize {
        self.nonce.length()
            + self.gas_price.length()
            + self.gas.length()
            + to_len(&self.to)
            + self.value.length()
            + self.storage_limit.length()
            + self.epoch_height.length()
            + self.chain_id.length()
            + self.data.length()
    }

    fn encode_unsigned_list(&self, out: &mut dyn BufMut) {
        list_header(self.fields_len()).encode(out);
        self.nonce.encode(out);
        self.gas_price.encode(out);
        self.gas.encode(out);
        encode_to(&self.to, out);
        self.value.encode(out);
        self.storage_limit.encode(out);
        self.epoch_height.encode(out);
        self.chain_id.encode(out);
        self.data.encode(out);
    }
}
