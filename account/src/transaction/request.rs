//! Field-mapping validation.
//!
//! Callers hand the facade a loosely typed JSON object (the shape a wallet or
//! RPC layer produces). [`TransactionRequest::from_value`] checks every key
//! and quantity, and [`TransactionRequest::into_transaction`] picks the
//! variant and narrows each quantity to the width that variant's wire format
//! allows. Anything unexpected is a [`AccountError::MalformedField`] naming
//! the offending key.

use alloy_primitives::{Address, Bytes, U256};
use serde_json::{Map, Value};

use super::types::{
    AccessList, AccessListTx, DynamicFeeTx, LegacyTx, NativeTx, Transaction, TxType,
};
use crate::address::AddressCodec;
use crate::error::{AccountError, Result};

/// A validated but not yet typed transaction request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionRequest {
    /// Declared sender. Checked against the signing key, never encoded.
    pub from: Option<Address>,
    pub tx_type: Option<TxType>,
    pub nonce: Option<U256>,
    pub chain_id: Option<U256>,
    pub to: Option<Address>,
    pub value: Option<U256>,
    pub data: Bytes,
    pub gas: Option<U256>,
    pub gas_price: Option<U256>,
    pub max_fee_per_gas: Option<U256>,
    pub max_priority_fee_per_gas: Option<U256>,
    pub access_list: Option<AccessList>,
    pub storage_limit: Option<U256>,
    pub epoch_height: Option<U256>,
}

impl TransactionRequest {
    /// Validates a JSON object. `null` values count as absent.
    pub fn from_value(value: &Value, codec: &dyn AddressCodec) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| AccountError::malformed("transaction", "expected a JSON object"))?;
        Self::from_map(object, codec)
    }

    fn from_map(object: &Map<String, Value>, codec: &dyn AddressCodec) -> Result<Self> {
        let mut request = Self::default();

        for (key, value) in object {
            if value.is_null() {
                if is_known_key(key) {
                    continue;
                }
                return Err(AccountError::malformed(key, "unknown field"));
            }
            match key.as_str() {
                "from" => request.from = Some(parse_address(key, value, codec)?),
                "type" => request.tx_type = Some(parse_type(value)?),
                "nonce" => request.nonce = Some(parse_quantity(key, value)?),
                "chainId" => request.chain_id = Some(parse_quantity(key, value)?),
                "to" => request.to = parse_recipient(value, codec)?,
                "value" => request.value = Some(parse_quantity(key, value)?),
                "data" => request.data = parse_data(value)?,
                "gas" => request.gas = Some(parse_quantity(key, value)?),
                "gasPrice" => request.gas_price = Some(parse_quantity(key, value)?),
                "maxFeePerGas" => request.max_fee_per_gas = Some(parse_quantity(key, value)?),
                "maxPriorityFeePerGas" => {
                    request.max_priority_fee_per_gas = Some(parse_quantity(key, value)?)
                }
                "accessList" => request.access_list = Some(parse_access_list(value)?),
                "storageLimit" => request.storage_limit = Some(parse_quantity(key, value)?),
                "epochHeight" => request.epoch_height = Some(parse_quantity(key, value)?),
                other => return Err(AccountError::malformed(other, "unknown field")),
            }
        }

        Ok(request)
    }

    /// The variant this request encodes as.
    pub fn resolved_type(&self) -> TxType {
        if let Some(tx_type) = self.tx_type {
            return tx_type;
        }
        if self.storage_limit.is_some() || self.epoch_height.is_some() {
            TxType::Native
        } else if self.max_fee_per_gas.is_some() || self.max_priority_fee_per_gas.is_some() {
            TxType::DynamicFee
        } else if self.access_list.is_some() {
            TxType::AccessList
        } else {
            TxType::Legacy
        }
    }

    /// Builds the typed transaction.
    ///
    /// `default_chain_id` fills an omitted `chainId`. Without either, only a
    /// legacy transaction can be built (as a pre-EIP-155 one).
    pub fn into_transaction(self, default_chain_id: Option<u64>) -> Result<Transaction> {
        let tx_type = self.resolved_type();

        let chain_id = match self.chain_id {
            Some(id) => Some(narrow::<u64>("chainId", id)?),
            None => default_chain_id,
        };
        let nonce = required("nonce", self.nonce)?;
        let gas = required("gas", self.gas)?;
        let value = self.value.unwrap_or_default();

        let tx = match tx_type {
            TxType::Legacy => {
                forbid(
                    tx_type,
                    &[
                        ("maxFeePerGas", self.max_fee_per_gas.is_some()),
                        ("maxPriorityFeePerGas", self.max_priority_fee_per_gas.is_some()),
                        ("accessList", self.access_list.is_some()),
                        ("storageLimit", self.storage_limit.is_some()),
                        ("epochHeight", self.epoch_height.is_some()),
                    ],
                )?;
                Transaction::Legacy(LegacyTx {
                    chain_id,
                    nonce: narrow("nonce", nonce)?,
                    gas_price: narrow("gasPrice", required("gasPrice", self.gas_price)?)?,
                    gas_limit: narrow("gas", gas)?,
                    to: self.to,
                    value,
                    input: self.data,
                })
            }
            TxType::AccessList => {
                forbid(
                    tx_type,
                    &[
                        ("maxFeePerGas", self.max_fee_per_gas.is_some()),
                        ("maxPriorityFeePerGas", self.max_priority_fee_per_gas.is_some()),
                        ("storageLimit", self.storage_limit.is_some()),
                        ("epochHeight", self.epoch_height.is_some()),
                    ],
                )?;
                Transaction::AccessList(AccessListTx {
                    chain_id: required("chainId", chain_id)?,
                    nonce: narrow("nonce", nonce)?,
                    gas_price: narrow("gasPrice", required("gasPrice", self.gas_price)?)?,
                    gas_limit: narrow("gas", gas)?,
                    to: self.to,
                    value,
                    input: self.data,
                    access_list: self.access_list.unwrap_or_default(),
                })
            }
            TxType::DynamicFee => {
                forbid(
                    tx_type,
                    &[
                        ("gasPrice", self.gas_price.is_some()),
                        ("storageLimit", self.storage_limit.is_some()),
                        ("epochHeight", self.epoch_height.is_some()),
                    ],
                )?;
                Transaction::DynamicFee(DynamicFeeTx {
                    chain_id: required("chainId", chain_id)?,
                    nonce: narrow("nonce", nonce)?,
                    max_priority_fee_per_gas: narrow(
                        "maxPriorityFeePerGas",
                        required("maxPriorityFeePerGas", self.max_priority_fee_per_gas)?,
                    )?,
                    max_fee_per_gas: narrow(
                        "maxFeePerGas",
                        required("maxFeePerGas", self.max_fee_per_gas)?,
                    )?,
                    gas_limit: narrow("gas", gas)?,
                    to: self.to,
                    value,
                    input: self.data,
                    access_list: self.access_list.unwrap_or_default(),
                })
            }
            TxType::Native => {
                forbid(
                    tx_type,
                    &[
                        ("maxFeePerGas", self.max_fee_per_gas.is_some()),
                        ("maxPriorityFeePerGas", self.max_priority_fee_per_gas.is_some()),
                        ("accessList", self.access_list.is_some()),
                    ],
                )?;
                Transaction::Native(NativeTx {
                    nonce,
                    gas_price: required("gasPrice", self.gas_price)?,
                    gas,
                    to: self.to,
                    value,
                    storage_limit: narrow(
                        "storageLimit",
                        required("storageLimit", self.storage_limit)?,
                    )?,
                    epoch_height: narrow(
                        "epochHeight",
                        required("epochHeight", self.epoch_height)?,
                    )?,
                    chain_id: narrow(
                        "chainId",
                        U256::from(required("chainId", chain_id)?),
                    )?,
                    data: self.data,
                })
            }
        };

        Ok(tx)
    }

}

/// Fails on the first field that is present but foreign to `tx_type`.
fn forbid(tx_type: TxType, fields: &[(&str, bool)]) -> Result<()> {
    match fields.iter().find(|(_, present)| *present) {
        Some((name, _)) => Err(AccountError::malformed(
            *name,
            format!("not a field of {} transactions", tx_type),
        )),
        None => Ok(()),
    }
}

const KNOWN_KEYS: [&str; 14] = [
    "from",
    "type",
    "nonce",
    "chainId",
    "to",
    "value",
    "data",
    "gas",
    "gasPrice",
    "maxFeePerGas",
    "maxPriorityFeePerGas",
    "accessList",
    "storageLimit",
    "epochHeight",
];

fn is_known_key(key: &str) -> bool {
    KNOWN_KEYS.contains(&key)
}

fn required<T>(field: &str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| AccountError::malformed(field, "required field is missing"))
}

fn narrow<T: TryFrom<U256>>(field: &str, value: U256) -> Result<T> {
    T::try_from(value).map_err(|_| {
        AccountError::malformed(
            field,
            format!("{} exceeds {} bits", value, std::mem::size_of::<T>() * 8),
        )
    })
}

/// A non-negative integer: a JSON number or a decimal / `0x` hex string.
fn parse_quantity(field: &str, value: &Value) -> Result<U256> {
    match value {
        Value::Number(number) => {
            if let Some(n) = number.as_u64() {
                Ok(U256::from(n))
            } else if number.is_i64() {
                Err(AccountError::malformed(field, "must not be negative"))
            } else {
                Err(AccountError::malformed(
                    field,
                    format!("{} is not a whole number in range", number),
                ))
            }
        }
        Value::String(text) => {
            let text = text.trim();
            let (digits, radix) = match text
                .strip_prefix("0x")
                .or_else(|| text.strip_prefix("0X"))
            {
                Some(hex) => (hex, 16),
                None => (text, 10),
            };
            if digits.is_empty() {
                return Err(AccountError::malformed(field, "empty quantity"));
            }
            U256::from_str_radix(digits, radix)
                .map_err(|e| AccountError::malformed(field, format!("{:?}: {}", text, e)))
        }
        other => Err(AccountError::malformed(
            field,
            format!("expected a number or string, got {}", other),
        )),
    }
}

fn parse_type(value: &Value) -> Result<TxType> {
    let raw = parse_quantity("type", value)?;
    match u8::try_from(raw) {
        Ok(0) => Ok(TxType::Legacy),
        Ok(byte) => TxType::from_type_byte(byte),
        Err(_) => Err(AccountError::malformed("type", format!("{} is not a type byte", raw))),
    }
}

fn parse_address(field: &str, value: &Value, codec: &dyn AddressCodec) -> Result<Address> {
    match value {
        Value::String(text) => codec.decode(text).map_err(|e| match e {
            AccountError::MalformedField { reason, .. } => AccountError::malformed(field, reason),
            other => other,
        }),
        other => Err(AccountError::malformed(
            field,
            format!("expected an address string, got {}", other),
        )),
    }
}

/// `""` means contract creation, like an absent key.
fn parse_recipient(value: &Value, codec: &dyn AddressCodec) -> Result<Option<Address>> {
    match value {
        Value::String(text) if text.trim().is_empty() => Ok(None),
        other => parse_address("to", other, codec).map(Some),
    }
}

fn parse_data(value: &Value) -> Result<Bytes> {
    let text = value
        .as_str()
        .ok_or_else(|| AccountError::malformed("data", "expected a hex string"))?;
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    hex::decode(digits)
        .map(Bytes::from)
        .map_err(|e| AccountError::malformed("data", e.to_string()))
}

fn parse_access_list(value: &Value) -> Result<AccessList> {
    serde_json::from_value(value.clone())
        .map_err(|e| AccountError::malformed("accessList", e.to_string()))
}
