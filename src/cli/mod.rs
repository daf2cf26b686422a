//! Command-line presentation of the wallet screens

pub mod auth;
pub mod dashboard;
pub mod funds;
pub mod history;
pub mod setup;
pub mod subscriptions;
pub mod ui;
