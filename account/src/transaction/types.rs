//! Core type definitions for transactions.
//!
//! Four variants share one enum. Field widths follow the wire format of each
//! variant, so a value that fits the struct also fits the encoding; the
//! request layer is where out-of-width input gets rejected.

use std::fmt;

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_rlp::{RlpDecodable, RlpEncodable};
use serde::{Deserialize, Serialize};

use crate::error::{AccountError, Result};

// ---------------------------------------------------------------------------
// TxType
// ---------------------------------------------------------------------------

/// Discriminant for the wire layout a transaction uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxType {
    /// Pre-typed list, optionally replay-protected with EIP-155.
    Legacy,
    /// `0x01` envelope with an access list.
    AccessList,
    /// `0x02` envelope with priority and max fee fields.
    DynamicFee,
    /// The chain's own layout with storage limit and epoch height.
    Native,
}

impl TxType {
    /// The leading envelope byte, for the typed variants.
    pub fn type_byte(&self) -> Option<u8> {
        match self {
            Self::AccessList => Some(0x01),
            Self::DynamicFee => Some(0x02),
            Self::Legacy | Self::Native => None,
        }
    }

    /// Maps an envelope byte back to its variant.
    pub fn from_type_byte(byte: u8) -> Result<Self> {
        match byte {
            0x01 => Ok(Self::AccessList),
            0x02 => Ok(Self::DynamicFee),
            other => Err(AccountError::UnsupportedType(other)),
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => write!(f, "Legacy"),
            Self::AccessList => write!(f, "AccessList"),
            Self::DynamicFee => write!(f, "DynamicFee"),
            Self::Native => write!(f, "Native"),
        }
    }
}

// ---------------------------------------------------------------------------
// Access lists
// ---------------------------------------------------------------------------

/// One pre-declared account and the storage slots the transaction touches.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, RlpEncodable, RlpDecodable, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct AccessListItem {
    /// Account whose storage is accessed.
    pub address: Address,
    /// Slots read or written.
    pub storage_keys: Vec<B256>,
}

/// Encodes as `[[address, [key, ...]], ...]`.
pub type AccessList = Vec<AccessListItem>;

// ---------------------------------------------------------------------------
// Variants
// ---------------------------------------------------------------------------

/// A pre-typed transaction.
///
/// `chain_id` is `None` only for the pre-EIP-155 form, which carries no
/// replay protection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyTx {
    pub chain_id: Option<u64>,
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    /// `None` creates a contract.
    pub to: Option<Address>,
    pub value: U256,
    pub input: Bytes,
}

/// An `0x01` transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessListTx {
    pub chain_id: u64,
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub to: Option<Address>,
    pub value: U256,
    pub input: Bytes,
    pub access_list: AccessList,
}

/// An `0x02` transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicFeeTx {
    pub chain_id: u64,
    pub nonce: u64,
    pub max_priority_fee_per_gas: u128,
    pub max_fee_per_gas: u128,
    pub gas_limit: u64,
    pub to: Option<Address>,
    pub value: U256,
    pub input: Bytes,
    pub access_list: AccessList,
}

/// A transaction in the chain's own layout.
///
/// Nonce, gas price and gas are full 256-bit quantities here. The storage
/// limit caps the collateral the sender may be charged; the epoch height
/// bounds where the transaction may be packed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeTx {
    pub nonce: U256,
    pub gas_price: U256,
    pub gas: U256,
    pub to: Option<Address>,
    pub value: U256,
    pub storage_limit: u64,
    pub epoch_height: u64,
    pub chain_id: u32,
    pub data: Bytes,
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// Any unsigned transaction the encoder understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Transaction {
    Legacy(LegacyTx),
    AccessList(AccessListTx),
    DynamicFee(DynamicFeeTx),
    Native(NativeTx),
}

impl Transaction {
    pub fn tx_type(&self) -> TxType {
        match self {
            Self::Legacy(_) => TxType::Legacy,
            Self::AccessList(_) => TxType::AccessList,
            Self::DynamicFee(_) => TxType::DynamicFee,
            Self::Native(_) => TxType::Native,
        }
    }

    /// The chain id the transaction is bound to, if any.
    pub fn chain_id(&self) -> Option<u64> {
        match self {
            Self::Legacy(tx) => tx.chain_id,
            Self::AccessList(tx) => Some(tx.chain_id),
            Self::DynamicFee(tx) => Some(tx.chain_id),
            Self::Native(tx) => Some(u64::from(tx.chain_id)),
        }
    }

    /// Overwrites the chain id, checking it fits the variant's width.
    pub fn set_chain_id(&mut self, chain_id: u64) -> Result<()> {
        match self {
            Self::Legacy(tx) => tx.chain_id = Some(chain_id),
            Self::AccessList(tx) => tx.chain_id = chain_id,
            Self::DynamicFee(tx) => tx.chain_id = chain_id,
            Self::Native(tx) => {
                tx.chain_id = u32::try_from(chain_id).map_err(|_| {
                    AccountError::malformed("chainId", format!("{} exceeds 32 bits", chain_id))
                })?
            }
        }
        Ok(())
    }

    /// Recipient, or `None` for contract creation.
    pub fn to(&self) -> Option<Address> {
        match self {
            Self::Legacy(tx) => tx.to,
            Self::AccessList(tx) => tx.to,
            Self::DynamicFee(tx) => tx.to,
            Self::Native(tx) => tx.to,
        }
    }

    pub fn value(&self) -> U256 {
        match self {
            Self::Legacy(tx) => tx.value,
            Self::AccessList(tx) => tx.value,
            Self::DynamicFee(tx) => tx.value,
            Self::Native(tx) => tx.value,
        }
    }

    /// Call data or init code.
    pub fn input(&self) -> &Bytes {
        match self {
            Self::Legacy(tx) => &tx.input,
            Self::AccessList(tx) => &tx.input,
            Self::DynamicFee(tx) => &tx.input,
            Self::Native(tx) => &tx.data,
        }
    }

    pub fn is_create(&self) -> bool {
        self.to().is_none()
    }
}

impl From<LegacyTx> for Transaction {
    fn from(tx: LegacyTx) -> Self {
        Self::Legacy(tx)
    }
}

impl From<AccessListTx> for Transaction {
    fn from(tx: AccessListTx) -> Self {
        Self::AccessList(tx)
    }
}

impl From<DynamicFeeTx> for Transaction {
    fn from(tx: DynamicFeeTx) -> Self {
        Self::DynamicFee(tx)
    }
}

impl From<NativeTx> for Transaction {
    fn from(tx: NativeTx) -> Self {
        Self::Native(tx)
    }
}
