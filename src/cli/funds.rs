use super::ui;
use crate::app::App;
use crate::core::{CategoryFilter, Fund};
use anyhow::Result;
use comfy_table::{Cell, Color};
use std::collections::BTreeSet;

fn status_cell(fund: &Fund, active: &BTreeSet<String>) -> Cell {
    if active.contains(&fund.id) {
        Cell::new("Subscribed").fg(Color::Green)
    } else if fund.available {
        Cell::new("Available")
    } else {
        Cell::new("Unavailable").fg(Color::DarkGrey)
    }
}

pub fn render_funds(funds: &[&Fund], active: &BTreeSet<String>) -> String {
    if funds.is_empty() {
        return ui::style_text("No funds match the given filters.", ui::StyleType::Subtle);
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("ID"),
        ui::header_cell("Fund"),
        ui::header_cell("Category"),
        ui::header_cell("Minimum"),
        ui::header_cell("Annual Yield"),
        ui::header_cell("Risk"),
        ui::header_cell("Status"),
    ]);

    for fund in funds {
        table.add_row(vec![
            Cell::new(&fund.id),
            Cell::new(&fund.name),
            Cell::new(fund.category.to_string()),
            ui::amount_cell(&fund.minimum_amount),
            ui::percentage_cell(&fund.annual_yield),
            Cell::new(fund.risk.to_string()),
            status_cell(fund, active),
        ]);
    }
    table.to_string()
}

pub async fn run(app: &App, category: CategoryFilter, search: Option<&str>) -> Result<()> {
    ui::simulate_latency(app.latency, "Loading funds...").await;
    let funds = app.catalog.browse(category, search);
    let active = app
        .directory
        .current_user()
        .map(|u| app.ledger.active_fund_ids(&u.id))
        .unwrap_or_default();

    println!("{}\n", ui::style_text("Investment Funds", ui::StyleType::Title));
    println!("{}", render_funds(&funds, &active));
    Ok(())
}
