//! Configuration file handling for fintrack.
//!
//! The configuration file is stored at `$FINTRACK_HOME/config.json` and holds the default user
//! along with a few report settings. The SQLite database lives next to it.

use crate::db::Db;
use crate::error::Res;
use crate::utils;
use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "fintrack";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const FINTRACK_SQLITE: &str = "fintrack.sqlite";
const TREND_MONTHS: u32 = 6;
const RECENT_LIMIT: u32 = 5;

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$FINTRACK_HOME` and from there it loads `$FINTRACK_HOME/config.json`. It provides
/// paths to other items that are expected in a certain location within the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    db_path: PathBuf,
}

impl Config {
    /// Creates the home directory, an initial `config.json` and an empty SQLite database.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the fintrack home, e.g. `$HOME/fintrack`
    /// - `default_user` - The user that commands act for when none is given. A random id is
    ///   generated when this is `None`.
    ///
    /// # Errors
    /// - Returns an error if a config file already exists or any file operation fails.
    pub async fn create(dir: impl Into<PathBuf>, default_user: Option<String>) -> Res<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the fintrack home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "A config file already exists at '{}'",
                config_path.display()
            );
        }

        let default_user = match default_user {
            Some(user) => validate_user(&user).map(|_| user)?,
            None => utils::generate_id(),
        };
        let config_file = ConfigFile {
            default_user,
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        let db_path = root.join(FINTRACK_SQLITE);
        Db::init(&db_path)
            .await
            .context("Unable to create SQLite DB")?;

        Ok(Self {
            root,
            config_path,
            config_file,
            db_path,
        })
    }

    /// This will
    /// - validate that `fintrack_home` exists and that the config file exists
    /// - load and validate the config file
    /// - return the loaded configuration object
    pub async fn load(fintrack_home: impl Into<PathBuf>) -> Res<Self> {
        let maybe_relative = fintrack_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The fintrack home directory is missing, run 'fintrack init' first")?;

        let _ = utils::read_dir(&root)
            .await
            .context("fintrack home is not readable")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        Ok(Self {
            db_path: root.join(FINTRACK_SQLITE),
            root,
            config_path,
            config_file,
        })
    }

    /// A configuration with default settings that is not backed by any file. Used with the
    /// in-memory store when no home directory has been initialized.
    pub fn detached(fintrack_home: impl Into<PathBuf>, default_user: impl Into<String>) -> Self {
        let root = fintrack_home.into();
        Self {
            config_path: root.join(CONFIG_JSON),
            db_path: root.join(FINTRACK_SQLITE),
            config_file: ConfigFile {
                default_user: default_user.into(),
                ..ConfigFile::default()
            },
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn default_user(&self) -> &str {
        &self.config_file.default_user
    }

    /// How many months the trend report covers.
    pub fn trend_months(&self) -> u32 {
        self.config_file.trend_months
    }

    /// How many recent transactions the dashboard shows.
    pub fn recent_limit(&self) -> u32 {
        self.config_file.recent_limit
    }
}

/// Rejects user ids that could never have been meant, i.e. blank ones.
pub(crate) fn validate_user(user: &str) -> Res<()> {
    ensure!(!user.trim().is_empty(), "The user must not be blank");
    Ok(())
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "fintrack",
///   "config_version": 1,
///   "default_user": "5e0c4b8e-8a0f-4c1e-9d7a-2f3b1c9d8e7f",
///   "trend_months": 6,
///   "recent_limit": 5
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "fintrack"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// The user that commands act for unless `--user` is given
    default_user: String,

    /// Number of months covered by the trend report
    #[serde(default = "default_trend_months")]
    trend_months: u32,

    /// Number of transactions shown on the dashboard
    #[serde(default = "default_recent_limit")]
    recent_limit: u32,
}

fn default_trend_months() -> u32 {
    TREND_MONTHS
}

fn default_recent_limit() -> u32 {
    RECENT_LIMIT
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            default_user: String::new(),
            trend_months: TREND_MONTHS,
            recent_limit: RECENT_LIMIT,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it is not a fintrack config.
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;
        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        ensure!(
            config.config_version <= CONFIG_VERSION,
            "Unsupported config_version {} in config file, expected at most {}",
            config.config_version,
            CONFIG_VERSION
        );
        validate_user(&config.default_user)
            .with_context(|| format!("Invalid default_user in {}", path.display()))?;
        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path, data)
            .await
            .context("Unable to write config file")
    }
}
