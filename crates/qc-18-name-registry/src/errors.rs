//! # Error Types
//!
//! All error types for the name registry subsystem.

use crate::domain::value_objects::{Address, Amount, Timestamp, TokenId};
use thiserror::Error;

// =============================================================================
// REGISTRY ERRORS
// =============================================================================

/// Errors returned by registry operations.
///
/// Every variant aborts the whole operation; no state is mutated when one of
/// these is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Name exceeds the configured maximum length.
    #[error("domain name is too long: {length} > {max} characters")]
    NameTooLong { length: usize, max: usize },

    /// Name is empty or contains characters outside the allowed charset.
    #[error("invalid domain name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// A live, non-lapsed record already exists for this name.
    #[error("domain already registered: {0}")]
    AlreadyRegistered(String),

    /// Payment is below the computed minimum.
    #[error("insufficient payment: required {required}, provided {provided}")]
    InsufficientPayment { required: Amount, provided: Amount },

    /// No record was ever registered under this name.
    #[error("domain not found: {0}")]
    NotFound(String),

    /// No live record holds this token id.
    #[error("token not found: {0}")]
    TokenNotFound(TokenId),

    /// Caller is not the current owner of the record.
    #[error("caller {caller} is not the owner of {name}")]
    NotOwner { name: String, caller: Address },

    /// Caller is not the treasury controller.
    #[error("caller {caller} is not authorized to withdraw")]
    NotAuthorized { caller: Address },

    /// The record's lease has lapsed.
    #[error("lease for {name} expired at {expired_at}")]
    LeaseExpired { name: String, expired_at: Timestamp },

    /// Data payload exceeds the configured maximum length.
    #[error("data is too long: {length} > {max} characters")]
    DataTooLong { length: usize, max: usize },

    /// Transfer target is the zero address.
    #[error("invalid recipient: cannot transfer to the zero address")]
    InvalidRecipient,

    /// Checked arithmetic failed (treasury sum or lease timestamp).
    #[error("arithmetic overflow in {0}")]
    ArithmeticOverflow(&'static str),

    /// External payout of a withdrawal failed; the balance was restored.
    #[error("payout failed: {0}")]
    PayoutFailed(String),

    /// Metadata encoding or decoding failed.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

impl RegistryError {
    /// Returns true if retrying with a higher payment could succeed.
    #[must_use]
    pub fn is_payment_error(&self) -> bool {
        matches!(self, Self::InsufficientPayment { .. })
    }

    /// Short, stable label used for metrics and structured logs.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NameTooLong { .. } => "name_too_long",
            Self::InvalidName { .. } => "invalid_name",
            Self::AlreadyRegistered(_) => "already_registered",
            Self::InsufficientPayment { .. } => "insufficient_payment",
            Self::NotFound(_) => "not_found",
            Self::TokenNotFound(_) => "token_not_found",
            Self::NotOwner { .. } => "not_owner",
            Self::NotAuthorized { .. } => "not_authorized",
            Self::LeaseExpired { .. } => "lease_expired",
            Self::DataTooLong { .. } => "data_too_long",
            Self::InvalidRecipient => "invalid_recipient",
            Self::ArithmeticOverflow(_) => "arithmetic_overflow",
            Self::PayoutFailed(_) => "payout_failed",
            Self::Codec(_) => "codec",
        }
    }
}

// =============================================================================
// CODEC ERRORS
// =============================================================================

/// Errors from the metadata transport encoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The data URI does not start with the expected media-type prefix.
    #[error("missing media prefix: expected {expected}")]
    MissingMediaPrefix { expected: &'static str },

    /// Payload is not valid base64.
    #[error("invalid base64: {0}")]
    Base64(String),

    /// Decoded payload is not valid UTF-8.
    #[error("invalid utf-8: {0}")]
    Utf8(String),

    /// Decoded payload is not a valid metadata document.
    #[error("invalid json: {0}")]
    Json(String),

    /// Embedded image is not well-formed markup.
    #[error("malformed image at byte {offset}: {reason}")]
    MalformedImage { offset: usize, reason: String },
}

// =============================================================================
// PAYOUT ERRORS
// =============================================================================

/// Errors from the external funds-transfer collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayoutError {
    /// Recipient rejected the transfer.
    #[error("recipient {0} rejected the transfer")]
    Rejected(Address),

    /// Settlement layer is unavailable.
    #[error("payout backend unavailable: {0}")]
    Unavailable(String),
}

impl From<PayoutError> for RegistryError {
    fn from(err: PayoutError) -> Self {
        RegistryError::PayoutFailed(err.to_string())
    }
}

// =============================================================================
// CONFIG ERRORS
// =============================================================================

/// Errors from loading or validating [`crate::config::RegistryConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the config file failed.
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// TOML could not be parsed into the config struct.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of its allowed range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// =============================================================================
// TESTS
// =============================================================================
