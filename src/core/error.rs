//! Error types surfaced by the directory, catalog and ledger.

use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WalletError>;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email is already registered: {0}")]
    DuplicateEmail(String),

    #[error("User is not authenticated")]
    Unauthenticated,

    #[error("Insufficient balance to subscribe: available {available}, requested {requested}")]
    InsufficientBalance {
        available: Decimal,
        requested: Decimal,
    },

    #[error("No active subscription found for fund {0}")]
    NoActiveSubscription(String),

    #[error("The minimum amount for this fund is ${}", crate::core::money::format_amount(.minimum))]
    AmountBelowMinimum { minimum: Decimal },

    #[error("Fund not found: {0}")]
    FundNotFound(String),

    #[error("Storage operation failed: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("Failed to encode snapshot: {0}")]
    Serialization(#[from] serde_json::Error),
}
