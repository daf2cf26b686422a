pub mod app;
pub mod cli;
pub mod core;
pub mod store;

use crate::app::App;
use crate::core::config::AppConfig;
use crate::core::{CategoryFilter, KeyValueStore, NewUser, NotificationChannel, TransactionKind};
use anyhow::Result;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub enum AppCommand {
    Login {
        email: String,
        password: String,
    },
    Register {
        profile: NewUser,
        password: String,
    },
    Logout,
    Dashboard,
    Funds {
        category: CategoryFilter,
        search: Option<String>,
    },
    Subscribe {
        fund_id: String,
        amount: Decimal,
        channel: NotificationChannel,
    },
    Cancel {
        fund_id: String,
    },
    History {
        kind: Option<TransactionKind>,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Fund wallet starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = store::DiskStore::open(&config.data_path()?)?;
    run_command_with_store(command, &config, Arc::new(store)).await
}

/// Runs a command against an already opened store.
pub async fn run_command_with_store(
    command: AppCommand,
    config: &AppConfig,
    store: Arc<dyn KeyValueStore>,
) -> Result<()> {
    let mut app = App::open(config, store).await?;

    match command {
        AppCommand::Login { email, password } => {
            cli::auth::login(&mut app, &email, &password).await
        }
        AppCommand::Register { profile, password } => {
            cli::auth::register(&mut app, profile, &password).await
        }
        AppCommand::Logout => cli::auth::logout(&mut app).await,
        AppCommand::Dashboard => cli::dashboard::run(&app).await,
        AppCommand::Funds { category, search } => {
            cli::funds::run(&app, category, search.as_deref()).await
        }
        AppCommand::Subscribe {
            fund_id,
            amount,
            channel,
        } => {
            let transaction =
                cli::subscriptions::subscribe(&mut app, &fund_id, amount, channel).await?;
            cli::subscriptions::print_confirmation(&app, &transaction);
            Ok(())
        }
        AppCommand::Cancel { fund_id } => {
            let transaction = cli::subscriptions::cancel(&mut app, &fund_id).await?;
            cli::subscriptions::print_confirmation(&app, &transaction);
            Ok(())
        }
        AppCommand::History { kind } => cli::history::run(&app, kind).await,
    }
}
