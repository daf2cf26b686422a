use crate::core::catalog::{Fund, default_funds};
use crate::core::directory::{DocumentType, NewUser, SeedUser};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

fn default_starting_balance() -> Decimal {
    dec!(500000)
}

fn default_seed_users() -> Vec<SeedUser> {
    vec![SeedUser {
        id: "1".to_string(),
        profile: NewUser {
            name: "Admin".to_string(),
            surname: "BTG".to_string(),
            email: "admin@btg.com".to_string(),
            document_type: DocumentType::CitizenId,
            document_number: "123456789".to_string(),
            phone: "3001234567".to_string(),
        },
        password: "admin123".to_string(),
        balance: dec!(50000000),
    }]
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Where the snapshot keyspace lives; defaults to the platform data dir.
    pub data_path: Option<String>,
    /// Balance credited to newly registered users.
    #[serde(default = "default_starting_balance")]
    pub starting_balance: Decimal,
    /// Simulated delay before each operation completes.
    #[serde(default)]
    pub latency_ms: u64,
    #[serde(default = "default_seed_users")]
    pub seed_users: Vec<SeedUser>,
    /// Replaces the built-in fund catalog when set.
    pub funds: Option<Vec<Fund>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_path: None,
            starting_balance: default_starting_balance(),
            latency_ms: 0,
            seed_users: default_seed_users(),
            funds: None,
        }
    }
}

impl AppConfig {
    /// Loads the default config file, or the built-in defaults when it does not exist.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "fundwallet", "fundwallet")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("in", "fundwallet", "fundwallet")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    pub fn funds(&self) -> Vec<Fund> {
        self.funds.clone().unwrap_or_else(default_funds)
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
