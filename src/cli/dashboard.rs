use super::{history, ui};
use crate::app::App;
use crate::core::User;
use crate::core::money::format_amount;
use anyhow::Result;
use rust_decimal::Decimal;

const RECENT_TRANSACTIONS: usize = 5;

pub fn render_profile(user: &User, invested: &Decimal, active_funds: usize) -> String {
    let mut output = format!(
        "Dashboard: {}\n\n",
        ui::style_text(&format!("{} {}", user.name, user.surname), ui::StyleType::Title)
    );
    output.push_str(&format!(
        "{}\n",
        ui::style_text(
            &format!(
                "{} | {} {} | {}",
                user.email, user.document_type, user.document_number, user.phone
            ),
            ui::StyleType::Subtle
        )
    ));
    output.push_str(&format!(
        "\n{}: {}",
        ui::style_text("Available Balance", ui::StyleType::TotalLabel),
        ui::style_text(
            &format!("${}", format_amount(&user.balance)),
            ui::StyleType::TotalValue
        )
    ));
    output.push_str(&format!(
        "\n{}: ${} across {} active fund(s)",
        ui::style_text("Invested", ui::StyleType::TotalLabel),
        format_amount(invested),
        active_funds
    ));
    output
}

pub async fn run(app: &App) -> Result<()> {
    let user = app.require_user()?;
    ui::simulate_latency(app.latency, "Loading dashboard...").await;

    let invested = app.ledger.invested_total(&user.id);
    let active = app.ledger.active_fund_ids(&user.id);
    let recent: Vec<_> = app
        .ledger
        .list_by_user(&user.id)
        .into_iter()
        .take(RECENT_TRANSACTIONS)
        .collect();

    println!("{}", render_profile(user, &invested, active.len()));
    println!(
        "\n{}\n",
        ui::style_text("Recent Transactions", ui::StyleType::Title)
    );
    println!("{}", history::render_transactions(&recent, None));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DocumentType;
    use rust_decimal_macros::dec;

    #[test]
    fn test_render_profile() {
        let user = User {
            id: "1".to_string(),
            name: "Admin".to_string(),
            surname: "BTG".to_string(),
            email: "admin@btg.com".to_string(),
            balance: dec!(49900000),
            document_type: DocumentType::CitizenId,
            document_number: "123456789".to_string(),
            phone: "3001234567".to_string(),
        };

        let rendered = render_profile(&user, &dec!(100000), 1);
        assert!(rendered.contains("Admin BTG"));
        assert!(rendered.contains("CC 123456789"));
        assert!(rendered.contains("$49,900,000"));
        assert!(rendered.contains("$100,000 across 1 active fund(s)"));
    }
}
