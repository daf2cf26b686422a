use super::ui;
use crate::app::App;
use crate::core::money::format_amount;
use crate::core::{NotificationChannel, Transaction, WalletError};
use anyhow::Result;
use rust_decimal::Decimal;
use tracing::info;

/// Checks the fund minimum against the catalog, then records the subscription.
pub async fn subscribe(
    app: &mut App,
    fund_id: &str,
    amount: Decimal,
    channel: NotificationChannel,
) -> Result<Transaction> {
    app.require_user()?;
    app.catalog.validate_minimum(fund_id, amount)?;
    let fund_name = app
        .catalog
        .get_by_id(fund_id)
        .map(|f| f.name.clone())
        .ok_or_else(|| WalletError::FundNotFound(fund_id.to_string()))?;

    ui::simulate_latency(app.latency, "Processing subscription...").await;
    let transaction = app
        .ledger
        .subscribe(&mut app.directory, fund_id, &fund_name, amount, channel)
        .await?;
    info!(fund = %fund_name, %amount, "Subscription recorded");
    Ok(transaction)
}

/// Cancels a fund that currently shows as subscribed.
pub async fn cancel(app: &mut App, fund_id: &str) -> Result<Transaction> {
    let user = app.require_user()?;
    let fund_name = app
        .catalog
        .get_by_id(fund_id)
        .map(|f| f.name.clone())
        .ok_or_else(|| WalletError::FundNotFound(fund_id.to_string()))?;
    if !app.ledger.active_fund_ids(&user.id).contains(fund_id) {
        return Err(WalletError::NoActiveSubscription(fund_id.to_string()).into());
    }

    ui::simulate_latency(app.latency, "Processing cancellation...").await;
    let transaction = app
        .ledger
        .cancel(&mut app.directory, fund_id, &fund_name)
        .await?;
    info!(fund = %fund_name, amount = %transaction.amount, "Cancellation recorded");
    Ok(transaction)
}

/// Prints the confirmation for a recorded transaction along with the new balance.
pub fn print_confirmation(app: &App, transaction: &Transaction) {
    if let Some(message) = &transaction.notification {
        println!("{}", ui::style_text(message, ui::StyleType::Success));
    }
    if let Some(user) = app.directory.current_user() {
        println!(
            "{}: {}",
            ui::style_text("Available balance", ui::StyleType::TotalLabel),
            ui::style_text(
                &format!("${}", format_amount(&user.balance)),
                ui::StyleType::TotalValue
            )
        );
    }
}
