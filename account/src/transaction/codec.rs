//! # Transaction Codec
//!
//! Decodes signed wire bytes back into a [`Transaction`] plus its signature.
//!
//! The variant comes from the first byte:
//!
//! - `0x01` / `0x02`: typed envelope, the rest is one RLP list;
//! - `>= 0xc0`: a bare list. Nine items is Legacy; four items whose first is
//!   itself a list is Native;
//! - anything else below `0x80` is an unknown envelope.
//!
//! Framing is strict. Every length prefix must be satisfied by the input
//! (otherwise [`AccountError::TruncatedInput`]), every list must hold exactly
//! the expected number of items, integers must be minimal and fit their
//! field, and nothing may follow the outer item.

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_rlp::{Decodable, Header};

use super::encoding::{encode_unsigned, signing_hash};
use super::types::{AccessList, AccessListTx, DynamicFeeTx, LegacyTx, NativeTx, Transaction, TxType};
use crate::config::{EIP155_V_OFFSET, LEGACY_V_OFFSET};
use crate::crypto::hash::keccak;
use crate::crypto::signatures::EcdsaSignature;
use crate::error::{AccountError, Result};

const LEGACY_SIGNED_ITEMS: usize = 9;
const ACCESS_LIST_SIGNED_ITEMS: usize = 11;
const DYNAMIC_FEE_SIGNED_ITEMS: usize = 12;
const NATIVE_SIGNED_ITEMS: usize = 4;
const NATIVE_UNSIGNED_ITEMS: usize = 9;

/// A decoded wire transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTransaction {
    pub transaction: Transaction,
    /// Signature with the raw parity bit as recovery id.
    pub signature: EcdsaSignature,
    /// `v` exactly as it appeared on the wire.
    pub v: u64,
    /// Keccak-256 of the full wire bytes.
    pub hash: B256,
}

impl DecodedTransaction {
    pub fn tx_type(&self) -> TxType {
        self.transaction.tx_type()
    }

    /// The digest the signature was made over.
    pub fn signing_hash(&self) -> B256 {
        signing_hash(&self.transaction)
    }

    /// The unsigned payload the signature was made over.
    pub fn signing_payload(&self) -> Vec<u8> {
        encode_unsigned(&self.transaction)
    }
}

/// Decodes signed wire bytes.
pub fn decode(raw: &[u8]) -> Result<DecodedTransaction> {
    let first = *raw.first().ok_or(AccountError::TruncatedInput)?;

    let (transaction, signature, v) = match first {
        0xc0..=0xff => decode_untyped(raw)?,
        0x00..=0x7f => decode_typed(first, &raw[1..])?,
        _ => {
            return Err(AccountError::InvalidEncoding(format!(
                "transaction starts with string prefix 0x{:02x}",
                first
            )))
        }
    };

    Ok(DecodedTransaction {
        transaction,
        signature,
        v,
        hash: keccak(raw),
    })
}

type Decoded = (Transaction, EcdsaSignature, u64);

fn decode_untyped(raw: &[u8]) -> Result<Decoded> {
    let mut buf = raw;
    let payload = open_outer_list(&mut buf)?;
    ensure_consumed(buf, "transaction")?;

    match item_count(payload)? {
        LEGACY_SIGNED_ITEMS => decode_legacy(payload),
        NATIVE_SIGNED_ITEMS => decode_native(payload),
        n => Err(AccountError::InvalidEncoding(format!(
            "list of {} items is neither a legacy nor a native transaction",
            n
        ))),
    }
}

fn decode_typed(type_byte: u8, raw: &[u8]) -> Result<Decoded> {
    let tx_type = TxType::from_type_byte(type_byte)?;
    let expected = if tx_type == TxType::AccessList {
        ACCESS_LIST_SIGNED_ITEMS
    } else {
        DYNAMIC_FEE_SIGNED_ITEMS
    };

    let mut buf = raw;
    let payload = open_outer_list(&mut buf)?;
    ensure_consumed(buf, "transaction")?;
    expect_items(payload, expected, tx_type)?;

    let mut body = payload;
    let chain_id: u64 = field("chainId", &mut body)?;
    let nonce: u64 = field("nonce", &mut body)?;

    let transaction = if tx_type == TxType::AccessList {
        Transaction::AccessList(AccessListTx {
            chain_id,
            nonce,
            gas_price: field("gasPrice", &mut body)?,
            gas_limit: field("gas", &mut body)?,
            to: decode_to(&mut body)?,
            value: field("value", &mut body)?,
            input: field("data", &mut body)?,
            access_list: field::<AccessList>("accessList", &mut body)?,
        })
    } else {
        Transaction::DynamicFee(DynamicFeeTx {
            chain_id,
            nonce,
            max_priority_fee_per_gas: field("maxPriorityFeePerGas", &mut body)?,
            max_fee_per_gas: field("maxFeePerGas", &mut body)?,
            gas_limit: field("gas", &mut body)?,
            to: decode_to(&mut body)?,
            value: field("value", &mut body)?,
            input: field("data", &mut body)?,
            access_list: field::<AccessList>("accessList", &mut body)?,
        })
    };

    let (signature, v) = decode_parity_signature(&mut body)?;
    Ok((transaction, signature, v))
}

fn decode_legacy(payload: &[u8]) -> Result<Decoded> {
    let mut body = payload;
    let nonce: u64 = field("nonce", &mut body)?;
    let gas_price: u128 = field("gasPrice", &mut body)?;
    let gas_limit: u64 = field("gas", &mut body)?;
    let to = decode_to(&mut body)?;
    let value: U256 = field("value", &mut body)?;
    let input: Bytes = field("data", &mut body)?;
    let v: u64 = field("v", &mut body)?;
    let r: U256 = field("r", &mut body)?;
    let s: U256 = field("s", &mut body)?;

    let (chain_id, recovery_id) = split_legacy_v(v)?;
    let transaction = Transaction::Legacy(LegacyTx {
        chain_id,
        nonce,
        gas_price,
        gas_limit,
        to,
        value,
        input,
    });
    Ok((transaction, EcdsaSignature { r, s, recovery_id }, v))
}

fn decode_native(payload: &[u8]) -> Result<Decoded> {
    let mut body = payload;
    let header = Header::decode(&mut body)?;
    if !header.list {
        return Err(AccountError::InvalidEncoding(
            "native transaction must start with the unsigned field list".into(),
        ));
    }
    let (inner, rest) = body.split_at(header.payload_length);
    body = rest;

    if item_count(inner)? != NATIVE_UNSIGNED_ITEMS {
        return Err(AccountError::InvalidEncoding(format!(
            "native unsigned list must hold {} items",
            NATIVE_UNSIGNED_ITEMS
        )));
    }

    let mut fields = inner;
    let transaction = Transaction::Native(NativeTx {
        nonce: field("nonce", &mut fields)?,
        gas_price: field("gasPrice", &mut fields)?,
        gas: field("gas", &mut fields)?,
        to: decode_to(&mut fields)?,
        value: field("value", &mut fields)?,
        storage_limit: field("storageLimit", &mut fields)?,
        epoch_height: field("epochHeight", &mut fields)?,
        chain_id: field("chainId", &mut fields)?,
        data: field("data", &mut fields)?,
    });

    let (signature, v) = decode_parity_signature(&mut body)?;
    Ok((transaction, signature, v))
}

/// Reads `v, r, s` where `v` must be a bare parity bit.
fn decode_parity_signature(body: &mut &[u8]) -> Result<(EcdsaSignature, u64)> {
    let v: u64 = field("v", body)?;
    let r: U256 = field("r", body)?;
    let s: U256 = field("s", body)?;
    let recovery_id = match v {
        0 | 1 => v as u8,
        other => {
            return Err(AccountError::SignatureRejected(format!(
                "y-parity {} is not 0 or 1",
                other
            )))
        }
    };
    Ok((EcdsaSignature { r, s, recovery_id }, v))
}

/// Splits a legacy `v` into the chain id it encodes (if any) and the parity.
fn split_legacy_v(v: u64) -> Result<(Option<u64>, u8)> {
    match v {
        27 | 28 => Ok((None, (v - LEGACY_V_OFFSET) as u8)),
        v if v >= EIP155_V_OFFSET => {
            let offset = v - EIP155_V_OFFSET;
            Ok((Some(offset / 2), (offset % 2) as u8))
        }
        other => Err(AccountError::SignatureRejected(format!(
            "legacy v {} is neither 27/28 nor EIP-155",
            other
        ))),
    }
}

// ---------------------------------------------------------------------------
// Framing helpers
// ---------------------------------------------------------------------------

/// Reads the outermost list header. A short outer item means the input was
/// cut off, so `InputTooShort` maps to [`AccountError::TruncatedInput`] here
/// and only here.
fn open_outer_list<'a>(buf: &mut &'a [u8]) -> Result<&'a [u8]> {
    let header = Header::decode(buf).map_err(|e| match e {
        alloy_rlp::Error::InputTooShort => AccountError::TruncatedInput,
        other => AccountError::from(other),
    })?;
    if !header.list {
        return Err(AccountError::InvalidEncoding(
            "transaction body must be a list".into(),
        ));
    }
    let (payload, rest) = buf.split_at(header.payload_length);
    *buf = rest;
    Ok(payload)
}

fn ensure_consumed(rest: &[u8], what: &str) -> Result<()> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(AccountError::InvalidEncoding(format!(
            "{} trailing bytes after {}",
            rest.len(),
            what
        )))
    }
}

/// Counts the top-level items in a list payload.
fn item_count(mut payload: &[u8]) -> Result<usize> {
    let mut count = 0;
    while !payload.is_empty() {
        let header = Header::decode(&mut payload)?;
        // Single bytes below 0x80 are their own payload and leave the
        // cursor in place.
        payload = &payload[header.payload_length..];
        count += 1;
    }
    Ok(count)
}

fn expect_items(payload: &[u8], expected: usize, tx_type: TxType) -> Result<()> {
    let found = item_count(payload)?;
    if found != expected {
        return Err(AccountError::InvalidEncoding(format!(
            "{} transaction must hold {} items, found {}",
            tx_type, expected, found
        )));
    }
    Ok(())
}

/// Decodes one field, naming it in the error.
fn field<T: Decodable>(name: &str, buf: &mut &[u8]) -> Result<T> {
    T::decode(buf).map_err(|e| match e {
        alloy_rlp::Error::Overflow => {
            AccountError::malformed(name, "value exceeds the field's width")
        }
        other => AccountError::InvalidEncoding(format!("{}: {}", name, other)),
    })
}

/// Recipient: the empty string for contract creation, else exactly 20 bytes.
fn decode_to(buf: &mut &[u8]) -> Result<Option<Address>> {
    let mut peek = *buf;
    let header = Header::decode(&mut peek)?;
    if header.list {
        return Err(AccountError::InvalidEncoding("to: unexpected list".into()));
    }
    match header.payload_length {
        0 => {
            *buf = peek;
            Ok(None)
        }
        20 => field::<Address>("to", buf).map(Some),
        n => Err(AccountError::InvalidEncoding(format!(
            "to: expected 0 or 20 bytes, got {}",
            n
        ))),
    }
}
