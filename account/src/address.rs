//! # Address & Network Collaborators
//!
//! The account core needs three things from the outside world and owns none
//! of them:
//!
//! - an [`AddressCodec`] to turn user-supplied address strings into 20 raw
//!   bytes and raw bytes into the chain-native hex form;
//! - a [`NetworkIdValidator`] to reject network ids the chain can't express;
//! - optionally a [`ChainIdProvider`] that knows the default network.
//!
//! Each is a trait so the base32 codec, a live node, or a test double can be
//! plugged in. The defaults below cover hex addresses and a fixed network id,
//! which is all the core itself ever needs.
//!
//! ## Chain-native hex
//!
//! Conflux addresses share their 20 bytes with the Ethereum address of the
//! same key, except that the top nibble of the first byte is a type tag.
//! User accounts use `0x1`:
//!
//! ```text
//! legacy:  0x2c7536e3605d9c16a7a3d7b1898e529396a65c23
//! native:  0x1c7536e3605d9c16a7a3d7b1898e529396a65c23
//! ```

use std::fmt;
use std::str::FromStr;

use alloy_primitives::Address;

use crate::config::{MAX_NETWORK_ID, MIN_NETWORK_ID};
use crate::error::{AccountError, Result};

/// Type nibble of a user (externally owned) account.
pub const USER_ACCOUNT_NIBBLE: u8 = 0x10;

/// Converts between textual and raw address forms.
pub trait AddressCodec: Send + Sync + fmt::Debug {
    /// Parses an address string into its 20 raw bytes.
    fn decode(&self, address: &str) -> Result<Address>;

    /// Renders raw bytes in the chain-native hex form.
    fn to_native_hex(&self, address: &Address) -> String;
}

/// Accepts 40-digit hex addresses (with or without `0x`) in either the legacy
/// or the native form, and renders the lowercase native form.
#[derive(Debug, Clone, Copy, Default)]
pub struct HexAddressCodec;

impl AddressCodec for HexAddressCodec {
    fn decode(&self, address: &str) -> Result<Address> {
        let trimmed = address.trim();
        let prefixed = if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
            trimmed.to_string()
        } else {
            format!("0x{}", trimmed)
        };
        Address::from_str(&prefixed)
            .map_err(|e| AccountError::malformed("address", format!("{}: {}", address, e)))
    }

    fn to_native_hex(&self, address: &Address) -> String {
        to_native_hex(address)
    }
}

/// Rewrites the type nibble to the user-account tag.
pub fn to_native_address(address: &Address) -> Address {
    let mut bytes = address.0 .0;
    bytes[0] = (bytes[0] & 0x0f) | USER_ACCOUNT_NIBBLE;
    Address::from(bytes)
}

/// [`to_native_address`] rendered as lowercase hex.
pub fn to_native_hex(address: &Address) -> String {
    format!("0x{}", hex::encode(to_native_address(address)))
}

// ---------------------------------------------------------------------------
// Network ids
// ---------------------------------------------------------------------------

/// Decides which network ids are acceptable.
pub trait NetworkIdValidator: Send + Sync + fmt::Debug {
    /// Returns `Ok(())` if `network_id` names a possible network.
    fn validate(&self, network_id: u64) -> Result<()>;
}

/// Accepts ids in `[MIN_NETWORK_ID, MAX_NETWORK_ID]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeNetworkIdValidator;

impl NetworkIdValidator for RangeNetworkIdValidator {
    fn validate(&self, network_id: u64) -> Result<()> {
        if (MIN_NETWORK_ID..=MAX_NETWORK_ID).contains(&network_id) {
            Ok(())
        } else {
            Err(AccountError::malformed(
                "networkId",
                format!(
                    "{} outside [{}, {}]",
                    network_id, MIN_NETWORK_ID, MAX_NETWORK_ID
                ),
            ))
        }
    }
}

/// Supplies a default network id when none is given explicitly.
pub trait ChainIdProvider: Send + Sync + fmt::Debug {
    /// The current network id, if known.
    fn chain_id(&self) -> Option<u64>;
}

/// A provider that always answers with the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticChainId(pub u64);

impl ChainIdProvider for StaticChainId {
    fn chain_id(&self) -> Option<u64> {
        Some(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_hex_rewrites_type_nibble() {
        let codec = HexAddressCodec;
        let addr = codec
            .decode("0x2c7536E3605D9C16a7a3D7b1898e529396a65c23")
            .unwrap();
        assert_eq!(
            codec.to_native_hex(&addr),
            "0x1c7536e3605d9c16a7a3d7b1898e529396a65c23"
        );
    }

    #[test]
    fn test_native_form_is_idempotent() {
        let codec = HexAddressCodec;
        let native = "0x1c7536e3605d9c16a7a3d7b1898e529396a65c23";
        let addr = codec.decode(native).unwrap();
        assert_eq!(codec.to_native_hex(&addr), native);
    }

    #[test]
    fn test_decode_without_prefix() {
        let codec = HexAddressCodec;
        let a = codec.decode("f0109fc8df283027b6285cc889f5aa624eac1f55").unwrap();
        let b = codec.decode("0xF0109fC8DF283027b6285cc889F5aA624EaC1F55").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        let codec = HexAddressCodec;
        assert!(codec.decode("0x1234").is_err());
        assert!(codec.decode("cfx:aak2rra2njvd77ezwjvx04kkds9fzagfe6ku8scz91").is_err());
        assert!(matches!(
            codec.decode("0xzz7536e3605d9c16a7a3d7b1898e529396a65c23"),
            Err(AccountError::MalformedField { .. })
        ));
    }

    #[test]
    fn test_network_id_range() {
        let v = RangeNetworkIdValidator;
        assert!(v.validate(1).is_ok());
        assert!(v.validate(1029).is_ok());
        assert!(v.validate(u32::MAX as u64).is_ok());
        assert!(v.validate(0).is_err());
        assert!(v.validate(u32::MAX as u64 + 1).is_err());
    }

    #[test]
    fn test_static_chain_id() {
        assert_eq!(StaticChainId(1029).chain_id(), Some(1029));
    }
}
