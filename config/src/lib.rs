//! Load configuration from a project `.env` and apply it to the process
//! environment, with priority: **existing env > .env**. A typed [`Settings`]
//! view validates the keys the application needs at startup.

mod dotenv;
mod settings;

use std::path::Path;
use thiserror::Error;

pub use settings::{Settings, SettingsError};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("read .env: {0}")]
    DotenvRead(std::io::Error),
}

/// Loads a `.env` file (current directory, or `override_dir` if given) and sets
/// environment variables only for keys that are **not** already set, so values
/// exported by the caller always win over the file.
pub fn load_and_apply(override_dir: Option<&Path>) -> Result<(), LoadError> {
    let map = dotenv::load_env_map(override_dir).map_err(LoadError::DotenvRead)?;
    for (key, value) in map {
        if std::env::var(&key).is_err() {
            std::env::set_var(&key, value);
        }
    }
    Ok(())
}
