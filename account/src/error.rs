//! Error types for account operations.
//!
//! Every signing, decoding, and recovery path returns an [`AccountError`].
//! The enum is exhaustive over the ways those paths can fail, and none of
//! its variants ever carries key material. If you find yourself wanting to
//! put a private key into an error message, go for a walk instead.

use thiserror::Error;

use crate::crypto::signatures::SignatureScheme;

/// Errors that can occur while encoding, signing, decoding, or recovering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    /// A field violates its declared width, range, or shape.
    #[error("malformed field `{field}`: {reason}")]
    MalformedField {
        /// The offending field, in request (camelCase) naming.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The transaction declares a sender that is not the key's identity.
    #[error("transaction `from` does not match the signing key: declared {declared}, key is {derived}")]
    SenderMismatch {
        /// The declared sender, as given (lowercase hex).
        declared: String,
        /// The identity derived from the signing key.
        derived: String,
    },

    /// An account is already bound to a different network.
    #[error("network mismatch: account is bound to {bound}, requested {requested}")]
    NetworkMismatch {
        /// The network id the account is bound to.
        bound: u64,
        /// The conflicting network id.
        requested: u64,
    },

    /// Fewer bytes are available than the length prefixes declare.
    #[error("truncated input")]
    TruncatedInput,

    /// List or item framing is inconsistent, or an integer is non-canonical.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// The leading discriminant byte names no known transaction type.
    #[error("unsupported transaction type: 0x{0:02x}")]
    UnsupportedType(u8),

    /// A signature could not be produced or does not recover to a key.
    #[error("signature rejected: {0}")]
    SignatureRejected(String),

    /// The external lattice primitive is missing or reported failure.
    #[error("lattice primitive failure: {0}")]
    PrimitiveFailure(String),

    /// Signer recovery was requested for a scheme that cannot provide it.
    #[error("signer recovery is not supported for lattice signatures")]
    RecoveryUnsupported,

    /// The key's scheme cannot perform the requested operation.
    #[error("{operation} is not supported by the {scheme} scheme")]
    UnsupportedScheme {
        /// The scheme of the key that was used.
        scheme: SignatureScheme,
        /// The operation that was attempted.
        operation: &'static str,
    },

    /// The runtime configuration could not be read or is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl AccountError {
    /// Shorthand for [`AccountError::MalformedField`].
    pub fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AccountError>;

/// Maps a wire-level decode error onto the account taxonomy.
///
/// `InputTooShort` is deliberately *not* mapped to [`AccountError::TruncatedInput`]
/// here: by the time inner items are decoded the outer list has already been
/// length-checked, so a short inner item is a framing inconsistency.
impl From<alloy_rlp::Error> for AccountError {
    fn from(err: alloy_rlp::Error) -> Self {
        match err {
            alloy_rlp::Error::Overflow => {
                AccountError::malformed("integer", "value exceeds its declared width")
            }
            alloy_rlp::Error::LeadingZero => {
                AccountError::InvalidEncoding("integer has leading zero bytes".into())
            }
            other => AccountError::InvalidEncoding(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overflow_maps_to_malformed_field() {
        let err: AccountError = alloy_rlp::Error::Overflow.into();
        assert!(matches!(err, AccountError::MalformedField { .. }));
    }

    #[test]
    fn test_leading_zero_maps_to_invalid_encoding() {
        let err: AccountError = alloy_rlp::Error::LeadingZero.into();
        assert!(matches!(err, AccountError::InvalidEncoding(_)));
    }

    #[test]
    fn test_display_is_readable() {
        let err = AccountError::NetworkMismatch {
            bound: 1029,
            requested: 1,
        };
        assert_eq!(
            err.to_string(),
            "network mismatch: account is bound to 1029, requested 1"
        );
        assert_eq!(
            AccountError::UnsupportedType(0x7f).to_string(),
            "unsupported transaction type: 0x7f"
        );
    }
}
