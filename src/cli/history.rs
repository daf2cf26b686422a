use super::ui;
use crate::app::App;
use crate::core::money::format_amount;
use crate::core::{LedgerSummary, Transaction, TransactionKind};
use anyhow::Result;
use comfy_table::Cell;

/// Renders transactions as a table, optionally keeping only one kind.
pub fn render_transactions(transactions: &[&Transaction], kind: Option<TransactionKind>) -> String {
    let rows: Vec<&&Transaction> = transactions
        .iter()
        .filter(|t| kind.is_none_or(|k| t.kind == k))
        .collect();
    if rows.is_empty() {
        return ui::style_text("No transactions yet.", ui::StyleType::Subtle);
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Fund"),
        ui::header_cell("Type"),
        ui::header_cell("Amount"),
        ui::header_cell("Notified By"),
    ]);

    for t in rows {
        table.add_row(vec![
            Cell::new(t.timestamp.format("%Y-%m-%d %H:%M").to_string()),
            Cell::new(&t.fund_name),
            Cell::new(t.kind.to_string()),
            ui::signed_amount_cell(&t.amount, t.kind == TransactionKind::Cancel),
            Cell::new(
                t.notification_channel
                    .map_or("-".to_string(), |c| c.to_string()),
            ),
        ]);
    }
    table.to_string()
}

pub fn render_summary(summary: &LedgerSummary) -> String {
    format!(
        "Subscriptions: {}  Cancellations: {}\n{}: {}",
        summary.subscriptions,
        summary.cancellations,
        ui::style_text("Invested Total", ui::StyleType::TotalLabel),
        ui::style_text(
            &format!("${}", format_amount(&summary.invested_total)),
            ui::StyleType::TotalValue
        )
    )
}

pub async fn run(app: &App, kind: Option<TransactionKind>) -> Result<()> {
    let user = app.require_user()?;
    ui::simulate_latency(app.latency, "Loading history...").await;

    let transactions = app.ledger.list_by_user(&user.id);
    println!(
        "{}\n",
        ui::style_text("Transaction History", ui::StyleType::Title)
    );
    println!("{}", render_transactions(&transactions, kind));
    println!("\n{}", render_summary(&app.ledger.summary(&user.id)));
    Ok(())
}
