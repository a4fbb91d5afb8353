use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory along with:
/// - An initial `config.json` holding the default user and default report settings
/// - An empty SQLite database at the current schema version
///
/// # Arguments
/// - `fintrack_home` - The directory that will be the root of data directory, e.g.
///   `$HOME/fintrack`
/// - `user` - The default user. A random id is generated when this is `None`.
///
/// # Errors
/// - Returns an error if the directory already holds a config file or any file operation fails.
pub async fn init(fintrack_home: &Path, user: Option<&str>) -> Result<Out<String>> {
    let config = Config::create(fintrack_home, user.map(str::to_string))
        .await
        .context("Unable to create the data directory and configs")
        .pub_result(ErrorType::Config)?;
    let message = format!(
        "Successfully created the fintrack directory at '{}' for user {}",
        config.root().display(),
        config.default_user()
    );
    Ok(Out::new(message, config.default_user().to_string()))
}
