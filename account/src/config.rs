//! # Constants & Runtime Configuration
//!
//! Every magic number in the account library lives here. If you're
//! hardcoding a curve order or a Dilithium buffer size somewhere else,
//! you're doing it wrong and you owe the team coffee.
//!
//! The second half of the file holds [`AccountConfig`], the explicit runtime
//! configuration handed to [`crate::account::Account::from_config`]. There is
//! no ambient network context anywhere in this crate: whatever a facade
//! knows about networks and native libraries, it was told at construction.

use std::fs;
use std::path::{Path, PathBuf};

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::error::{AccountError, Result};

// ---------------------------------------------------------------------------
// Network Identifiers
// ---------------------------------------------------------------------------

/// Conflux mainnet (Tethys).
pub const NETWORK_ID_MAINNET: u64 = 1029;

/// Conflux testnet.
pub const NETWORK_ID_TESTNET: u64 = 1;

/// Smallest network id the default validator accepts.
pub const MIN_NETWORK_ID: u64 = 1;

/// Largest network id the default validator accepts. Native transactions
/// carry the chain id as a u32, so anything above this could never be signed.
pub const MAX_NETWORK_ID: u64 = u32::MAX as u64;

// ---------------------------------------------------------------------------
// Classical (secp256k1) Parameters
// ---------------------------------------------------------------------------

/// secp256k1 private scalar length in bytes.
pub const PRIVATE_KEY_LENGTH: usize = 32;

/// Address length. The last 20 bytes of keccak256(pubkey).
pub const ADDRESS_LENGTH: usize = 20;

/// `r ‖ s ‖ v` — the compact recoverable signature form.
pub const RECOVERABLE_SIGNATURE_LENGTH: usize = 65;

/// Order of the secp256k1 group. Every valid `r` and `s` lives in `[1, n-1]`.
pub const SECP256K1_ORDER: U256 = U256::from_limbs([
    0xbfd2_5e8c_d036_4141,
    0xbaae_dce6_af48_a03b,
    0xffff_ffff_ffff_fffe,
    0xffff_ffff_ffff_ffff,
]);

/// `v` offset for legacy transactions signed without a chain id.
pub const LEGACY_V_OFFSET: u64 = 27;

/// `v` offset for EIP-155 replay-protected legacy transactions:
/// `v = 35 + 2 * chain_id + recovery_id`.
pub const EIP155_V_OFFSET: u64 = 35;

/// Upper bound on how many recovery ids the classical engine considers.
/// Ids 2 and 3 only occur when R.x overflows the group order and are rejected.
pub const MAX_RECOVERY_ID: u8 = 1;

// ---------------------------------------------------------------------------
// Lattice (Dilithium2) Parameters
// ---------------------------------------------------------------------------

/// Dilithium2 public key length (CRYPTO_PUBLICKEYBYTES).
pub const DILITHIUM2_PUBLIC_KEY_BYTES: usize = 1312;

/// Dilithium2 secret key length (CRYPTO_SECRETKEYBYTES).
pub const DILITHIUM2_SECRET_KEY_BYTES: usize = 2544;

/// Dilithium2 maximum signature length (CRYPTO_BYTES).
pub const DILITHIUM2_SIGNATURE_BYTES: usize = 2420;

/// Symbol namespace of the pq-crystals reference build. The library exports
/// `<prefix>_keypair`, `<prefix>` (sign) and `<prefix>_open`.
pub const DILITHIUM2_SYMBOL_PREFIX: &str = "pqcrystals_dilithium2_ref";

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Prefix for personal-message signing. Keeps a signed message from ever
/// being a valid transaction payload.
pub const MESSAGE_PREFIX: &str = "\x19Conflux Signed Message:\n";

// ---------------------------------------------------------------------------
// Runtime configuration
// ---------------------------------------------------------------------------

/// Where the lattice primitive lives and how it may be called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatticeConfig {
    /// Path to the shared library exporting the Dilithium2 reference API.
    pub library_path: PathBuf,

    /// Symbol namespace inside the library.
    #[serde(default = "default_symbol_prefix")]
    pub symbol_prefix: String,

    /// Whether the library may be entered from several threads at once.
    /// The reference build shares RNG state, so the default is `false`.
    #[serde(default)]
    pub reentrant: bool,

    /// Public key length of the configured parameter set.
    #[serde(default = "default_public_key_bytes")]
    pub public_key_bytes: usize,

    /// Secret key length of the configured parameter set.
    #[serde(default = "default_secret_key_bytes")]
    pub secret_key_bytes: usize,

    /// Maximum signature length of the configured parameter set.
    #[serde(default = "default_signature_bytes")]
    pub signature_bytes: usize,
}

impl LatticeConfig {
    /// Dilithium2 defaults for a library at `library_path`.
    pub fn dilithium2(library_path: impl Into<PathBuf>) -> Self {
        Self {
            library_path: library_path.into(),
            symbol_prefix: default_symbol_prefix(),
            reentrant: false,
            public_key_bytes: DILITHIUM2_PUBLIC_KEY_BYTES,
            secret_key_bytes: DILITHIUM2_SECRET_KEY_BYTES,
            signature_bytes: DILITHIUM2_SIGNATURE_BYTES,
        }
    }
}

fn default_symbol_prefix() -> String {
    DILITHIUM2_SYMBOL_PREFIX.to_string()
}

fn default_public_key_bytes() -> usize {
    DILITHIUM2_PUBLIC_KEY_BYTES
}

fn default_secret_key_bytes() -> usize {
    DILITHIUM2_SECRET_KEY_BYTES
}

fn default_signature_bytes() -> usize {
    DILITHIUM2_SIGNATURE_BYTES
}

/// Explicit configuration for an [`Account`](crate::account::Account) facade.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AccountConfig {
    /// Network id new accounts are bound to when none is given explicitly.
    #[serde(default)]
    pub default_network_id: Option<u64>,

    /// Lattice primitive to load at startup. `None` disables lattice signing.
    #[serde(default)]
    pub lattice: Option<LatticeConfig>,
}

impl AccountConfig {
    /// Parses a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| AccountError::Config(e.to_string()))
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| AccountError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&raw)
    }
}

/// Returns a friendly name for a network id, mainly for logging.
pub fn network_name(network_id: u64) -> String {
    match network_id {
        NETWORK_ID_MAINNET => "mainnet".to_string(),
        NETWORK_ID_TESTNET => "testnet".to_string(),
        other => format!("network({})", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_network_ids_are_distinct() {
        assert_ne!(NETWORK_ID_MAINNET, NETWORK_ID_TESTNET);
        assert!((MIN_NETWORK_ID..=MAX_NETWORK_ID).contains(&NETWORK_ID_MAINNET));
    }

    #[test]
    fn test_curve_order_matches_known_hex() {
        let expected = U256::from_str_radix(
            "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141",
            16,
        )
        .unwrap();
        assert_eq!(SECP256K1_ORDER, expected);
    }

    #[test]
    fn test_dilithium2_parameter_sizes() {
        // Secret key carries the public key plus the secret vectors, so it
        // must be the larger of the two.
        assert!(DILITHIUM2_SECRET_KEY_BYTES > DILITHIUM2_PUBLIC_KEY_BYTES);
        assert_eq!(DILITHIUM2_SIGNATURE_BYTES, 2420);
    }

    #[test]
    fn test_lattice_config_defaults_fill_in() {
        let cfg = AccountConfig::from_json(
            r#"{"defaultNetworkId": 1029, "lattice": {"libraryPath": "/opt/pq/libdilithium2.so"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.default_network_id, Some(1029));
        let lattice = cfg.lattice.unwrap();
        assert_eq!(lattice, LatticeConfig::dilithium2("/opt/pq/libdilithium2.so"));
    }

    #[test]
    fn test_unknown_config_keys_are_rejected() {
        let err = AccountConfig::from_json(r#"{"w3": "http://localhost"}"#).unwrap_err();
        assert!(matches!(err, AccountError::Config(_)));
    }

    #[test]
    fn test_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"defaultNetworkId": 1}}"#).unwrap();
        let cfg = AccountConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.default_network_id, Some(NETWORK_ID_TESTNET));
        assert!(cfg.lattice.is_none());
    }

    #[test]
    fn test_missing_config_file_is_config_error() {
        let err = AccountConfig::from_file(Path::new("/nonexistent/cfx.json")).unwrap_err();
        assert!(matches!(err, AccountError::Config(_)));
    }

    #[test]
    fn test_network_name_formatting() {
        assert_eq!(network_name(NETWORK_ID_MAINNET), "mainnet");
        assert_eq!(network_name(8888), "network(8888)");
    }
}
