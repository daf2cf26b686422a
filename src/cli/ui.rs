use crate::core::money::format_amount;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalLabel,
    TotalValue,
    Success,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalLabel => style(text).bold(),
        StyleType::TotalValue => style(text).green().bold(),
        StyleType::Success => style(text).green(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Right-aligned money cell, e.g. `$1,250,000`.
pub fn amount_cell(amount: &Decimal) -> Cell {
    Cell::new(format!("${}", format_amount(amount))).set_alignment(CellAlignment::Right)
}

/// Money cell signed and colored by direction: green for inflows, red for outflows.
pub fn signed_amount_cell(amount: &Decimal, inflow: bool) -> Cell {
    let (sign, color) = if inflow {
        ("+", Color::Green)
    } else {
        ("-", Color::Red)
    };
    Cell::new(format!("{sign}${}", format_amount(amount)))
        .fg(color)
        .set_alignment(CellAlignment::Right)
}

/// Formats a yield percentage cell in bold green.
pub fn percentage_cell(value: &Decimal) -> Cell {
    Cell::new(format!("{value:.2}%"))
        .add_attribute(Attribute::Bold)
        .fg(Color::Green)
        .set_alignment(CellAlignment::Right)
}

/// Creates a spinner for operations without a known length.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "));
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Waits out the configured delay behind a spinner. Returns at once for a zero delay.
pub async fn simulate_latency(latency: Duration, message: &str) {
    if latency.is_zero() {
        return;
    }
    let pb = new_spinner(message);
    tokio::time::sleep(latency).await;
    pb.finish_and_clear();
}
