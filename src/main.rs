use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use fundwallet::core::log::init_logging;
use fundwallet::core::{
    CategoryFilter, DocumentType, FundCategory, NewUser, NotificationChannel, TransactionKind,
};
use rust_decimal::Decimal;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum CategoryArg {
    All,
    Fpv,
    Fic,
    Fdo,
}

#[derive(Clone, Copy, ValueEnum)]
enum ChannelArg {
    Email,
    Sms,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    All,
    Open,
    Cancel,
}

#[derive(Clone, Copy, ValueEnum)]
enum DocumentArg {
    Cc,
    Ce,
    Ti,
    Passport,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Log in with an existing account
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and log in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        surname: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, value_enum, default_value = "cc")]
        document_type: DocumentArg,
        #[arg(long)]
        document_number: String,
        #[arg(long)]
        phone: String,
    },
    /// Close the current session
    Logout,
    /// Display balance, invested total and recent activity
    Dashboard,
    /// List available funds
    Funds {
        /// Only show funds in this category
        #[arg(long, value_enum, default_value = "all")]
        category: CategoryArg,
        /// Case-insensitive match on fund name or description
        #[arg(long)]
        search: Option<String>,
    },
    /// Subscribe to a fund
    Subscribe {
        fund_id: String,
        #[arg(long)]
        amount: Decimal,
        /// How to deliver the confirmation
        #[arg(long, value_enum, default_value = "email")]
        notify: ChannelArg,
    },
    /// Cancel an active fund subscription
    Cancel { fund_id: String },
    /// Display transaction history
    History {
        #[arg(long, value_enum, default_value = "all")]
        kind: KindArg,
    },
}

impl From<Commands> for fundwallet::AppCommand {
    fn from(cmd: Commands) -> fundwallet::AppCommand {
        match cmd {
            Commands::Login { email, password } => {
                fundwallet::AppCommand::Login { email, password }
            }
            Commands::Register {
                name,
                surname,
                email,
                password,
                document_type,
                document_number,
                phone,
            } => fundwallet::AppCommand::Register {
                profile: NewUser {
                    name,
                    surname,
                    email,
                    document_type: match document_type {
                        DocumentArg::Cc => DocumentType::CitizenId,
                        DocumentArg::Ce => DocumentType::ForeignerId,
                        DocumentArg::Ti => DocumentType::MinorId,
                        DocumentArg::Passport => DocumentType::Passport,
                    },
                    document_number,
                    phone,
                },
                password,
            },
            Commands::Logout => fundwallet::AppCommand::Logout,
            Commands::Dashboard => fundwallet::AppCommand::Dashboard,
            Commands::Funds { category, search } => fundwallet::AppCommand::Funds {
                category: match category {
                    CategoryArg::All => CategoryFilter::All,
                    CategoryArg::Fpv => CategoryFilter::Only(FundCategory::Fpv),
                    CategoryArg::Fic => CategoryFilter::Only(FundCategory::Fic),
                    CategoryArg::Fdo => CategoryFilter::Only(FundCategory::Fdo),
                },
                search,
            },
            Commands::Subscribe {
                fund_id,
                amount,
                notify,
            } => fundwallet::AppCommand::Subscribe {
                fund_id,
                amount,
                channel: match notify {
                    ChannelArg::Email => NotificationChannel::Email,
                    ChannelArg::Sms => NotificationChannel::Sms,
                },
            },
            Commands::Cancel { fund_id } => fundwallet::AppCommand::Cancel { fund_id },
            Commands::History { kind } => fundwallet::AppCommand::History {
                kind: match kind {
                    KindArg::All => None,
                    KindArg::Open => Some(TransactionKind::Open),
                    KindArg::Cancel => Some(TransactionKind::Cancel),
                },
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fundwallet::cli::setup::setup(),
        Some(cmd) => fundwallet::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
