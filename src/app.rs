//! Wires the catalog, directory and ledger together over one store.
use crate::core::config::AppConfig;
use crate::core::error::Result;
use crate::core::{FundCatalog, KeyValueStore, TransactionLedger, User, UserDirectory};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub struct App {
    pub catalog: FundCatalog,
    pub directory: UserDirectory,
    pub ledger: TransactionLedger,
    pub latency: Duration,
}

impl App {
    pub async fn open(config: &AppConfig, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let mut directory = UserDirectory::restore(
            Arc::clone(&store),
            &config.seed_users,
            config.starting_balance,
        )
        .await?;
        directory.on_session_change(|user| match user {
            Some(u) => debug!(email = %u.email, balance = %u.balance, "Session updated"),
            None => debug!("Session cleared"),
        });

        let mut ledger = TransactionLedger::restore(store).await?;
        ledger.on_change(|transactions| {
            debug!(count = transactions.len(), "Ledger snapshot written");
        });

        Ok(Self {
            catalog: FundCatalog::new(config.funds()),
            directory,
            ledger,
            latency: config.latency(),
        })
    }

    /// The session user, or `Unauthenticated` when nobody is logged in.
    pub fn require_user(&self) -> Result<&User> {
        self.directory
            .current_user()
            .ok_or(crate::core::WalletError::Unauthenticated)
    }
}
