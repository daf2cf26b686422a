//! Core business logic: users, funds and the subscription ledger

pub mod catalog;
pub mod config;
pub mod directory;
pub mod error;
pub mod ledger;
pub mod log;
pub mod money;
pub mod store;

// Re-export main types for cleaner imports
pub use catalog::{CategoryFilter, Fund, FundCatalog, FundCategory, RiskTier};
pub use directory::{DocumentType, NewUser, User, UserDirectory};
pub use error::WalletError;
pub use ledger::{
    LedgerSummary, NotificationChannel, Transaction, TransactionKind, TransactionLedger,
};
pub use store::KeyValueStore;
