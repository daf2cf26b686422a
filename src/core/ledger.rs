//! Append-only record of fund subscriptions and cancellations.
//!
//! The ledger is stored most-recent-first. Balances live in the
//! [`UserDirectory`]; the ledger debits and credits them through the session
//! passed into each mutating call.
use crate::core::directory::UserDirectory;
use crate::core::error::{Result, WalletError};
use crate::core::money::format_amount;
use crate::core::store::{self, KeyValueStore, LEDGER_KEY};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Open,
    Cancel,
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TransactionKind::Open => "Subscription",
                TransactionKind::Cancel => "Cancellation",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
    Email,
    Sms,
}

impl Display for NotificationChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                NotificationChannel::Email => "Email",
                NotificationChannel::Sms => "SMS",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub fund_id: String,
    pub fund_name: String,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
    pub status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_channel: Option<NotificationChannel>,
}

impl Transaction {
    fn is_completed(&self, kind: TransactionKind) -> bool {
        self.kind == kind && self.status == TransactionStatus::Completed
    }
}

/// Aggregates shown alongside a user's history.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSummary {
    pub subscriptions: usize,
    pub cancellations: usize,
    pub invested_total: Decimal,
}

type LedgerListener = Box<dyn Fn(&[Transaction]) + Send + Sync>;

pub struct TransactionLedger {
    transactions: Vec<Transaction>,
    store: Arc<dyn KeyValueStore>,
    listeners: Vec<LedgerListener>,
}

impl TransactionLedger {
    pub async fn restore(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let transactions = store::load_snapshot::<Vec<Transaction>>(store.as_ref(), LEDGER_KEY)
            .await?
            .unwrap_or_default();
        debug!("Restored {} transactions", transactions.len());
        Ok(Self {
            transactions,
            store,
            listeners: Vec::new(),
        })
    }

    /// Registers a callback invoked with the full list after every append.
    pub fn on_change(&mut self, listener: impl Fn(&[Transaction]) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Debits `amount` from the session user and records a completed subscription.
    ///
    /// The fund minimum is not checked here; callers validate it against the
    /// catalog first.
    pub async fn subscribe(
        &mut self,
        session: &mut UserDirectory,
        fund_id: &str,
        fund_name: &str,
        amount: Decimal,
        channel: NotificationChannel,
    ) -> Result<Transaction> {
        let user = session.current_user().ok_or(WalletError::Unauthenticated)?;
        if amount > user.balance {
            return Err(WalletError::InsufficientBalance {
                available: user.balance,
                requested: amount,
            });
        }

        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            fund_id: fund_id.to_string(),
            fund_name: fund_name.to_string(),
            kind: TransactionKind::Open,
            amount,
            timestamp: Utc::now(),
            status: TransactionStatus::Completed,
            notification: Some(format!(
                "Successfully subscribed to fund {fund_name}. Notification sent by {channel}"
            )),
            notification_channel: Some(channel),
        };
        let new_balance = user.balance - amount;

        self.record(session, transaction.clone(), new_balance).await?;
        debug!(
            "Subscribed {} to fund {} for {}",
            transaction.user_id, fund_id, amount
        );
        Ok(transaction)
    }

    /// Refunds the most recently recorded subscription amount for the fund and
    /// records a completed cancellation.
    pub async fn cancel(
        &mut self,
        session: &mut UserDirectory,
        fund_id: &str,
        fund_name: &str,
    ) -> Result<Transaction> {
        let user = session.current_user().ok_or(WalletError::Unauthenticated)?;

        // Stored order is most-recent-first, so this is the latest subscription.
        let refund = self
            .transactions
            .iter()
            .find(|t| {
                t.user_id == user.id
                    && t.fund_id == fund_id
                    && t.is_completed(TransactionKind::Open)
            })
            .map(|t| t.amount)
            .ok_or_else(|| WalletError::NoActiveSubscription(fund_id.to_string()))?;

        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            fund_id: fund_id.to_string(),
            fund_name: fund_name.to_string(),
            kind: TransactionKind::Cancel,
            amount: refund,
            timestamp: Utc::now(),
            status: TransactionStatus::Completed,
            notification: Some(format!(
                "Successfully cancelled fund {fund_name}. Refunded amount: ${}",
                format_amount(&refund)
            )),
            notification_channel: None,
        };
        let new_balance = user.balance + refund;

        self.record(session, transaction.clone(), new_balance).await?;
        debug!(
            "Cancelled {} from fund {}, refunded {}",
            transaction.user_id, fund_id, refund
        );
        Ok(transaction)
    }

    /// All of the user's transactions, most recent first.
    pub fn list_by_user(&self, user_id: &str) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .collect()
    }

    /// Fund ids with a completed subscription and no completed cancellation.
    ///
    /// This is a set difference over fund ids, not a pairing of events: once a
    /// fund has been cancelled it stays inactive even after a new subscription.
    pub fn active_fund_ids(&self, user_id: &str) -> BTreeSet<String> {
        let user_transactions = self.list_by_user(user_id);
        let cancelled: BTreeSet<&str> = user_transactions
            .iter()
            .filter(|t| t.is_completed(TransactionKind::Cancel))
            .map(|t| t.fund_id.as_str())
            .collect();

        user_transactions
            .iter()
            .filter(|t| t.is_completed(TransactionKind::Open))
            .filter(|t| !cancelled.contains(t.fund_id.as_str()))
            .map(|t| t.fund_id.clone())
            .collect()
    }

    /// Replays the user's events: subscriptions add, cancellations subtract.
    pub fn invested_total(&self, user_id: &str) -> Decimal {
        self.list_by_user(user_id)
            .iter()
            .fold(Decimal::ZERO, |total, t| {
                if t.is_completed(TransactionKind::Open) {
                    total + t.amount
                } else if t.is_completed(TransactionKind::Cancel) {
                    total - t.amount
                } else {
                    total
                }
            })
    }

    pub fn summary(&self, user_id: &str) -> LedgerSummary {
        let transactions = self.list_by_user(user_id);
        LedgerSummary {
            subscriptions: transactions
                .iter()
                .filter(|t| t.kind == TransactionKind::Open)
                .count(),
            cancellations: transactions
                .iter()
                .filter(|t| t.kind == TransactionKind::Cancel)
                .count(),
            invested_total: self.invested_total(user_id),
        }
    }

    /// Persists the ledger with `transaction` prepended, then moves the session
    /// balance. Memory is only updated once both writes have succeeded.
    async fn record(
        &mut self,
        session: &mut UserDirectory,
        transaction: Transaction,
        new_balance: Decimal,
    ) -> Result<()> {
        let mut transactions = Vec::with_capacity(self.transactions.len() + 1);
        transactions.push(transaction);
        transactions.extend(self.transactions.iter().cloned());
        store::save_snapshot(self.store.as_ref(), LEDGER_KEY, &transactions).await?;

        if let Err(e) = session.update_balance(new_balance).await {
            if let Err(rollback) =
                store::save_snapshot(self.store.as_ref(), LEDGER_KEY, &self.transactions).await
            {
                warn!(error = %rollback, "Failed to restore ledger snapshot");
            }
            return Err(e);
        }

        self.transactions = transactions;
        for listener in &self.listeners {
            listener(&self.transactions);
        }
        Ok(())
    }
}
