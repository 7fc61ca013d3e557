//! # Account Facade
//!
//! [`Account`] is the entry point: it owns the collaborators (address codec,
//! network-id validator, optional chain-id provider, signature engine) and
//! hands out [`LocalAccount`]s, each holding one key.
//!
//! ## Binding
//!
//! A `LocalAccount` starts either unbound or bound to a network id. It is
//! bound at creation when a network id is passed explicitly or when the
//! facade has a chain-id provider. [`LocalAccount::bind`] performs the
//! transition later; binding again to the same id is a no-op, binding to a
//! different id fails with [`AccountError::NetworkMismatch`]. There is no
//! global network context.
//!
//! ## Signing
//!
//! ```text
//! JSON fields ─▶ TransactionRequest ─▶ Transaction ─▶ signing hash
//!                  (from checked,         (chain id        │
//!                   then dropped)          filled/checked)  ▼
//!   SignedTransaction ◀── keccak ◀── wire bytes ◀── secp256k1 signature
//! ```
//!
//! Recovery runs the same pipe backwards from the wire bytes.

use std::sync::Arc;

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::address::{
    to_native_address, AddressCodec, ChainIdProvider, HexAddressCodec, NetworkIdValidator,
    RangeNetworkIdValidator, StaticChainId,
};
use crate::config::{network_name, AccountConfig};
use crate::crypto::hash::{keccak, message_digest};
use crate::crypto::keys::{KeyMaterial, LatticeKeypair, PrivateKey};
use crate::crypto::lattice::LatticeEngine;
use crate::crypto::signatures::{Signature, SignatureEngine, SignatureScheme};
use crate::error::{AccountError, Result};
use crate::transaction::{
    decode, encode_signed, signature_v, signing_hash, DecodedTransaction, Transaction,
    TransactionRequest,
};

/// A signed transaction, ready to broadcast.
///
/// Owns everything by value; it does not point back at the account that
/// produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransaction {
    /// Signed wire bytes.
    pub raw_transaction: Bytes,
    /// Keccak-256 of `raw_transaction`.
    pub hash: B256,
    pub r: U256,
    pub s: U256,
    /// `v` as carried on the wire (chain-adjusted for legacy transactions).
    pub v: u64,
}

/// A signed personal message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedMessage {
    /// Prefixed message digest that was signed.
    pub message_hash: B256,
    pub r: U256,
    pub s: U256,
    /// Raw recovery id, 0 or 1.
    pub v: u8,
    /// The 65-byte `r ‖ s ‖ v` form.
    pub signature: Bytes,
}

// ---------------------------------------------------------------------------
// Account (facade)
// ---------------------------------------------------------------------------

/// Creates accounts and performs key-addressed operations.
#[derive(Debug, Clone)]
pub struct Account {
    codec: Arc<dyn AddressCodec>,
    validator: Arc<dyn NetworkIdValidator>,
    chain_id_provider: Option<Arc<dyn ChainIdProvider>>,
    engine: SignatureEngine,
}

impl Default for Account {
    fn default() -> Self {
        Self::new()
    }
}

impl Account {
    /// Hex addresses, range-checked network ids, no default network, no
    /// lattice primitive.
    pub fn new() -> Self {
        Self {
            codec: Arc::new(HexAddressCodec),
            validator: Arc::new(RangeNetworkIdValidator),
            chain_id_provider: None,
            engine: SignatureEngine::classical(),
        }
    }

    /// Builds a facade from explicit configuration, resolving the lattice
    /// library (if configured) once, here.
    pub fn from_config(config: &AccountConfig) -> Result<Self> {
        let mut account = Self::new();
        if let Some(network_id) = config.default_network_id {
            account.validator.validate(network_id)?;
            account = account.with_chain_id_provider(StaticChainId(network_id));
        }
        if let Some(lattice) = &config.lattice {
            account = account.with_lattice(LatticeEngine::from_config(lattice)?);
        }
        debug!(
            default_network = %config.default_network_id.map(network_name).unwrap_or_default(),
            lattice = config.lattice.is_some(),
            "account facade configured"
        );
        Ok(account)
    }

    pub fn with_codec(mut self, codec: impl AddressCodec + 'static) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    pub fn with_validator(mut self, validator: impl NetworkIdValidator + 'static) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    pub fn with_chain_id_provider(mut self, provider: impl ChainIdProvider + 'static) -> Self {
        self.chain_id_provider = Some(Arc::new(provider));
        self
    }

    pub fn with_lattice(mut self, lattice: LatticeEngine) -> Self {
        self.engine = SignatureEngine::with_lattice(lattice);
        self
    }

    pub fn engine(&self) -> &SignatureEngine {
        &self.engine
    }

    pub fn codec(&self) -> &dyn AddressCodec {
        self.codec.as_ref()
    }

    /// The network id new accounts inherit, if a provider is installed.
    pub fn default_network_id(&self) -> Option<u64> {
        self.chain_id_provider.as_ref().and_then(|p| p.chain_id())
    }

    // -- account creation --------------------------------------------------

    /// A fresh classical account with a key from the OS RNG.
    pub fn create(&self) -> Result<LocalAccount> {
        self.from_key_material(PrivateKey::random(), None)
    }

    /// A fresh lattice account with a key pair from the primitive.
    pub fn create_lattice(&self) -> Result<LocalAccount> {
        let keypair = self.engine.lattice()?.generate_keypair()?;
        self.from_key_material(keypair, None)
    }

    /// An account for a hex-encoded secp256k1 private key.
    pub fn from_key(&self, private_key: &str, network_id: Option<u64>) -> Result<LocalAccount> {
        self.from_key_material(PrivateKey::from_hex(private_key)?, network_id)
    }

    /// An account for existing lattice key bytes, checked against the
    /// primitive's parameter set.
    pub fn from_lattice_keys(
        &self,
        public_key: Vec<u8>,
        secret_key: Vec<u8>,
        network_id: Option<u64>,
    ) -> Result<LocalAccount> {
        let params = self.engine.lattice()?.params();
        let keypair = LatticeKeypair::from_bytes(
            public_key,
            secret_key,
            params.public_key_bytes,
            params.secret_key_bytes,
        )?;
        self.from_key_material(keypair, network_id)
    }

    /// An account for any key material. An explicit `network_id` wins over
    /// the facade's provider.
    pub fn from_key_material(
        &self,
        key: impl Into<KeyMaterial>,
        network_id: Option<u64>,
    ) -> Result<LocalAccount> {
        let network_id = network_id.or_else(|| self.default_network_id());
        if let Some(id) = network_id {
            self.validator.validate(id)?;
        }
        Ok(LocalAccount {
            key: key.into(),
            network_id,
            codec: Arc::clone(&self.codec),
            validator: Arc::clone(&self.validator),
            engine: self.engine.clone(),
        })
    }

    // -- key-addressed operations ------------------------------------------

    /// Signs a transaction field mapping with a hex private key.
    pub fn sign_transaction(&self, transaction: &Value, private_key: &str) -> Result<SignedTransaction> {
        self.from_key(private_key, None)?.sign_transaction(transaction)
    }

    /// Decodes signed wire bytes without recovering the signer.
    pub fn decode_transaction(&self, raw: &[u8]) -> Result<DecodedTransaction> {
        decode(raw)
    }

    /// Recovers the signer's raw address from signed wire bytes.
    pub fn recover_transaction_address(&self, raw: &[u8]) -> Result<Address> {
        let decoded = decode(raw)?;
        let address = self
            .engine
            .recover(&decoded.signing_hash(), &Signature::Ecdsa(decoded.signature))?;
        debug!(
            tx_type = %decoded.tx_type(),
            hash = %decoded.hash,
            "recovered transaction signer"
        );
        Ok(address)
    }

    /// Recovers the signer of signed wire bytes, in chain-native hex form.
    pub fn recover_transaction(&self, raw: &[u8]) -> Result<String> {
        let address = self.recover_transaction_address(raw)?;
        Ok(self.codec.to_native_hex(&address))
    }

    /// [`Account::recover_transaction`] for `0x`-prefixed (or bare) hex input.
    pub fn recover_transaction_hex(&self, raw_hex: &str) -> Result<String> {
        self.recover_transaction(&decode_hex("rawTransaction", raw_hex)?)
    }

    /// Signs a personal message with a hex private key.
    pub fn sign_message(&self, message: &[u8], private_key: &str) -> Result<SignedMessage> {
        self.from_key(private_key, None)?.sign_message(message)
    }

    /// Recovers the signer of a personal message in chain-native hex form.
    ///
    /// Lattice signatures fail with [`AccountError::RecoveryUnsupported`].
    pub fn recover_message(&self, message: &[u8], signature: &Signature) -> Result<String> {
        let address = self.engine.recover(&message_digest(message), signature)?;
        Ok(self.codec.to_native_hex(&address))
    }
}

// ---------------------------------------------------------------------------
// LocalAccount
// ---------------------------------------------------------------------------

/// One key plus the network it is bound to.
///
/// Immutable: [`bind`](Self::bind) consumes the account and returns a new
/// one. The key never leaves except through [`key`](Self::key).
#[derive(Debug, Clone)]
pub struct LocalAccount {
    key: KeyMaterial,
    network_id: Option<u64>,
    codec: Arc<dyn AddressCodec>,
    validator: Arc<dyn NetworkIdValidator>,
    engine: SignatureEngine,
}

impl LocalAccount {
    /// Raw 20-byte identity.
    pub fn address(&self) -> Address {
        self.key.address()
    }

    /// Identity in chain-native hex form.
    pub fn hex_address(&self) -> String {
        self.codec.to_native_hex(&self.address())
    }

    pub fn scheme(&self) -> SignatureScheme {
        self.key.scheme()
    }

    pub fn network_id(&self) -> Option<u64> {
        self.network_id
    }

    pub fn is_bound(&self) -> bool {
        self.network_id.is_some()
    }

    pub fn key(&self) -> &KeyMaterial {
        &self.key
    }

    /// Binds to `network_id`. Idempotent for the same id.
    pub fn bind(mut self, network_id: u64) -> Result<Self> {
        self.validator.validate(network_id)?;
        match self.network_id {
            Some(bound) if bound != network_id => Err(AccountError::NetworkMismatch {
                bound,
                requested: network_id,
            }),
            _ => {
                self.network_id = Some(network_id);
                Ok(self)
            }
        }
    }

    /// Validates and signs a transaction field mapping.
    ///
    /// A `from` field must name this account, in either its legacy or its
    /// chain-native form, and is dropped before encoding. The input is not modified.
    pub fn sign_transaction(&self, transaction: &Value) -> Result<SignedTransaction> {
        let mut request = TransactionRequest::from_value(transaction, self.codec.as_ref())?;

        if let Some(from) = request.from.take() {
            let derived = self.address();
            if from != derived && from != to_native_address(&derived) {
                return Err(AccountError::SenderMismatch {
                    declared: format!("0x{}", hex::encode(from)),
                    derived: self.hex_address(),
                });
            }
        }

        self.sign_typed(request.into_transaction(self.network_id)?)
    }

    /// Signs an already typed transaction.
    ///
    /// A legacy transaction without a chain id picks up the bound network.
    /// A declared chain id must match it.
    pub fn sign_typed(&self, mut transaction: Transaction) -> Result<SignedTransaction> {
        if let Some(bound) = self.network_id {
            match transaction.chain_id() {
                Some(requested) if requested != bound => {
                    return Err(AccountError::NetworkMismatch { bound, requested })
                }
                Some(_) => {}
                None => transaction.set_chain_id(bound)?,
            }
        }

        let digest = signing_hash(&transaction);
        let signature = self.engine.sign_digest(&digest, &self.key).map_err(|e| match e {
            AccountError::UnsupportedScheme { scheme, .. } => AccountError::UnsupportedScheme {
                scheme,
                operation: "transaction signing",
            },
            other => other,
        })?;

        let raw = encode_signed(&transaction, &signature)?;
        let hash = keccak(&raw);
        let v = signature_v(&transaction, signature.recovery_id)?;

        debug!(
            tx_type = %transaction.tx_type(),
            chain_id = ?transaction.chain_id(),
            %hash,
            "signed transaction"
        );

        Ok(SignedTransaction {
            raw_transaction: raw.into(),
            hash,
            r: signature.r,
            s: signature.s,
            v,
        })
    }

    /// Signs a personal message with the classical scheme.
    pub fn sign_message(&self, message: &[u8]) -> Result<SignedMessage> {
        let message_hash = message_digest(message);
        let signature = self
            .engine
            .sign_digest(&message_hash, &self.key)
            .map_err(|e| match e {
                AccountError::UnsupportedScheme { scheme, .. } => AccountError::UnsupportedScheme {
                    scheme,
                    operation: "personal message signing",
                },
                other => other,
            })?;
        Ok(SignedMessage {
            message_hash,
            r: signature.r,
            s: signature.s,
            v: signature.recovery_id,
            signature: Bytes::copy_from_slice(&signature.to_bytes()),
        })
    }

    /// Signs arbitrary bytes with whichever scheme the key belongs to.
    ///
    /// Classical keys sign `keccak(message)`; lattice keys hand the bytes to
    /// the primitive as-is.
    pub fn sign_bytes(&self, message: &[u8]) -> Result<Signature> {
        self.engine.sign(message, &self.key)
    }

    /// Verifies a [`sign_bytes`](Self::sign_bytes) signature against this
    /// account's key.
    pub fn verify_bytes(&self, message: &[u8], signature: &Signature) -> Result<bool> {
        self.engine.verify(message, signature, &self.key)
    }
}

fn decode_hex(field: &str, text: &str) -> Result<Vec<u8>> {
    let digits = text
        .trim()
        .strip_prefix("0x")
        .unwrap_or_else(|| text.trim());
    hex::decode(digits).map_err(|e| AccountError::malformed(field, e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;
    use std::thread;

    use serde_json::json;

    use super::*;
    use crate::crypto::lattice::fake::FakePrimitive;
    use crate::crypto::signatures::EcdsaSignature;
    use crate::transaction::TxType;

    const KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
    const NATIVE_ADDRESS: &str = "0x1c7536e3605d9c16a7a3d7b1898e529396a65c23";

    fn vector() -> Value {
        json!({
            "nonce": 0,
            "chainId": 1,
            "to": "0xF0109fC8DF283027b6285cc889F5aA624EaC1F55",
            "value": 1000000000,
            "gas": 2000000,
            "gasPrice": 234567897654321u64,
        })
    }

    fn lattice_facade() -> Account {
        Account::new().with_lattice(LatticeEngine::new(Arc::new(FakePrimitive::default())))
    }

    #[test]
    fn test_known_vector() {
        let signed = Account::new().sign_transaction(&vector(), KEY).unwrap();
        assert_eq!(signed.v, 37);
        assert_eq!(
            signed.r,
            U256::from_str(
                "4487286261793418179817841024889747115779324305375823110249149479905075174044"
            )
            .unwrap()
        );
        assert_eq!(
            signed.s,
            U256::from_str(
                "30785525769477805655994251009256770582792548537338581640010273753578382951464"
            )
            .unwrap()
        );
        assert_eq!(
            signed.hash,
            B256::from_str("0xd8f64a42b57be0d565f385378db2f6bf324ce14a594afc05de90436e9ce01f60")
                .unwrap()
        );
        assert_eq!(
            Account::new().recover_transaction(&signed.raw_transaction).unwrap(),
            NATIVE_ADDRESS
        );
    }

    #[test]
    fn test_from_matching_key_equals_omission() {
        let account = Account::new();
        let plain = account.sign_transaction(&vector(), KEY).unwrap();

        for from in [
            "0x2c7536e3605d9c16a7a3d7b1898e529396a65c23",
            NATIVE_ADDRESS,
        ] {
            let mut tx = vector();
            tx["from"] = json!(from);
            assert_eq!(account.sign_transaction(&tx, KEY).unwrap(), plain);
        }
    }

    #[test]
    fn test_from_other_key_is_sender_mismatch() {
        let mut tx = vector();
        tx["from"] = json!("0xF0109fC8DF283027b6285cc889F5aA624EaC1F55");
        let err = Account::new().sign_transaction(&tx, KEY).unwrap_err();
        assert!(matches!(err, AccountError::SenderMismatch { .. }));
    }

    #[test]
    fn test_from_with_other_type_nibble_is_sender_mismatch() {
        for from in [
            "0x8c7536e3605d9c16a7a3d7b1898e529396a65c23",
            "0x0c7536e3605d9c16a7a3d7b1898e529396a65c23",
            "0xfc7536e3605d9c16a7a3d7b1898e529396a65c23",
        ] {
            let mut tx = vector();
            tx["from"] = json!(from);
            let err = Account::new().sign_transaction(&tx, KEY).unwrap_err();
            match err {
                AccountError::SenderMismatch { declared, derived } => {
                    assert_eq!(declared, from);
                    assert_eq!(derived, NATIVE_ADDRESS);
                }
                other => panic!("unexpected error {:?}", other),
            }
        }
    }

    #[test]
    fn test_input_is_not_mutated() {
        let mut tx = vector();
        tx["from"] = json!(NATIVE_ADDRESS);
        let before = tx.clone();
        Account::new().sign_transaction(&tx, KEY).unwrap();
        assert_eq!(tx, before);
    }

    #[test]
    fn test_signing_is_deterministic() {
        let account = Account::new().from_key(KEY, None).unwrap();
        assert_eq!(
            account.sign_transaction(&vector()).unwrap(),
            account.sign_transaction(&vector()).unwrap()
        );
    }

    #[test]
    fn test_bind_transitions() {
        let facade = Account::new();
        let account = facade.from_key(KEY, None).unwrap();
        assert!(!account.is_bound());

        let bound = account.bind(1029).unwrap();
        assert_eq!(bound.network_id(), Some(1029));

        let again = bound.clone().bind(1029).unwrap();
        assert_eq!(again.network_id(), Some(1029));

        assert_eq!(
            bound.bind(1).unwrap_err(),
            AccountError::NetworkMismatch {
                bound: 1029,
                requested: 1
            }
        );
    }

    #[test]
    fn test_bind_validates_network_id() {
        let account = Account::new().from_key(KEY, None).unwrap();
        assert!(matches!(
            account.bind(0),
            Err(AccountError::MalformedField { .. })
        ));
        assert!(Account::new().from_key(KEY, Some(u64::MAX)).is_err());
    }

    #[test]
    fn test_provider_binds_new_accounts() {
        let facade = Account::new().with_chain_id_provider(StaticChainId(1029));
        let account = facade.from_key(KEY, None).unwrap();
        assert_eq!(account.network_id(), Some(1029));

        let explicit = facade.from_key(KEY, Some(1)).unwrap();
        assert_eq!(explicit.network_id(), Some(1));
    }

    #[test]
    fn test_bound_account_checks_and_fills_chain_id() {
        let account = Account::new().from_key(KEY, Some(1029)).unwrap();

        let err = account.sign_transaction(&vector()).unwrap_err();
        assert_eq!(
            err,
            AccountError::NetworkMismatch {
                bound: 1029,
                requested: 1
            }
        );

        let mut tx = vector();
        tx.as_object_mut().unwrap().remove("chainId");
        let signed = account.sign_transaction(&tx).unwrap();
        let decoded = decode(&signed.raw_transaction).unwrap();
        assert_eq!(decoded.transaction.chain_id(), Some(1029));
        assert_eq!(signed.v, 35 + 2 * 1029 + u64::from(decoded.signature.recovery_id));
    }

    #[test]
    fn test_unbound_legacy_without_chain_id() {
        let mut tx = vector();
        tx.as_object_mut().unwrap().remove("chainId");
        let signed = Account::new().sign_transaction(&tx, KEY).unwrap();
        assert!(signed.v == 27 || signed.v == 28);
        assert_eq!(
            Account::new().recover_transaction(&signed.raw_transaction).unwrap(),
            NATIVE_ADDRESS
        );
    }

    #[test]
    fn test_native_transaction_roundtrip() {
        let account = Account::new().from_key(KEY, Some(1029)).unwrap();
        let signed = account
            .sign_transaction(&json!({
                "nonce": "0x5",
                "gas": 21000,
                "gasPrice": 1,
                "to": "0x1c7536e3605d9c16a7a3d7b1898e529396a65c23",
                "value": "1000000000000000000",
                "storageLimit": 0,
                "epochHeight": 42,
                "data": "0x",
            }))
            .unwrap();
        assert!(signed.v <= 1);

        let facade = Account::new();
        let decoded = facade.decode_transaction(&signed.raw_transaction).unwrap();
        assert_eq!(decoded.tx_type(), TxType::Native);
        assert_eq!(decoded.transaction.chain_id(), Some(1029));
        assert_eq!(
            facade.recover_transaction(&signed.raw_transaction).unwrap(),
            NATIVE_ADDRESS
        );
    }

    #[test]
    fn test_recover_hex_input() {
        let signed = Account::new().sign_transaction(&vector(), KEY).unwrap();
        let hex_raw = format!("0x{}", hex::encode(&signed.raw_transaction));
        assert_eq!(
            Account::new().recover_transaction_hex(&hex_raw).unwrap(),
            NATIVE_ADDRESS
        );
        assert!(Account::new().recover_transaction_hex("0xzz").is_err());
    }

    #[test]
    fn test_truncated_raw_is_rejected() {
        let signed = Account::new().sign_transaction(&vector(), KEY).unwrap();
        let raw = &signed.raw_transaction[..signed.raw_transaction.len() - 1];
        assert_eq!(
            Account::new().recover_transaction(raw),
            Err(AccountError::TruncatedInput)
        );
    }

    #[test]
    fn test_personal_message_roundtrip() {
        let facade = Account::new();
        let signed = facade.sign_message(b"hello conflux", KEY).unwrap();
        assert!(signed.v <= 1);
        assert_eq!(signed.signature.len(), 65);
        assert_eq!(signed.message_hash, message_digest(b"hello conflux"));

        let sig = EcdsaSignature::from_bytes(&signed.signature).unwrap();
        assert_eq!(
            facade
                .recover_message(b"hello conflux", &Signature::Ecdsa(sig))
                .unwrap(),
            NATIVE_ADDRESS
        );
        assert_ne!(
            facade
                .recover_message(b"hello conflux!", &Signature::Ecdsa(sig))
                .ok(),
            Some(NATIVE_ADDRESS.to_string())
        );
    }

    #[test]
    fn test_lattice_account_signs_bytes_but_not_transactions() {
        let facade = lattice_facade();
        let account = facade.create_lattice().unwrap();
        assert_eq!(account.scheme(), SignatureScheme::Dilithium);

        let sig = account.sign_bytes(b"post-quantum").unwrap();
        assert!(account.verify_bytes(b"post-quantum", &sig).unwrap());
        assert!(!account.verify_bytes(b"pre-quantum", &sig).unwrap());

        assert_eq!(
            facade.recover_message(b"post-quantum", &sig),
            Err(AccountError::RecoveryUnsupported)
        );
        assert_eq!(
            account.sign_transaction(&vector()).unwrap_err(),
            AccountError::UnsupportedScheme {
                scheme: SignatureScheme::Dilithium,
                operation: "transaction signing",
            }
        );
        assert!(matches!(
            account.sign_message(b"x"),
            Err(AccountError::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn test_lattice_keys_roundtrip_through_bytes() {
        let facade = lattice_facade();
        let original = facade.create_lattice().unwrap();
        let KeyMaterial::Dilithium(pair) = original.key() else {
            panic!("expected a lattice key");
        };
        let restored = facade
            .from_lattice_keys(pair.public_key().to_vec(), pair.secret_key().to_vec(), None)
            .unwrap();
        assert_eq!(restored.address(), original.address());

        assert!(matches!(
            facade.from_lattice_keys(vec![0; 3], vec![0; 3], None),
            Err(AccountError::MalformedField { .. })
        ));
    }

    #[test]
    fn test_lattice_without_primitive() {
        assert!(matches!(
            Account::new().create_lattice(),
            Err(AccountError::PrimitiveFailure(_))
        ));
    }

    #[test]
    fn test_from_config() {
        let config = AccountConfig::from_json(r#"{"defaultNetworkId": 1029}"#).unwrap();
        let facade = Account::from_config(&config).unwrap();
        assert_eq!(facade.default_network_id(), Some(1029));
        assert_eq!(facade.create().unwrap().network_id(), Some(1029));

        let bad = AccountConfig {
            default_network_id: Some(0),
            lattice: None,
        };
        assert!(Account::from_config(&bad).is_err());
    }

    #[test]
    fn test_concurrent_signing() {
        let facade = Account::new();
        let account = facade.from_key(KEY, None).unwrap();
        let expected = account.sign_transaction(&vector()).unwrap();

        let account = &account;
        thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(move || account.sign_transaction(&vector()).unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    #[test]
    fn test_signed_transaction_serializes_camel_case() {
        let signed = Account::new().sign_transaction(&vector(), KEY).unwrap();
        let value = serde_json::to_value(&signed).unwrap();
        assert!(value.get("rawTransaction").is_some());
        assert_eq!(value["v"], json!(37));
    }
}
