//! Configuration sources for an app instance.
//!
//! Options come from three places: caller defaults, the environment (overlaid
//! on [`DEFAULTS`]), and caller overrides. A YAML file of options can serve as
//! the defaults layer.

mod app_id;
mod env;
mod error;
mod options;

pub use app_id::AppId;
pub use env::{DEFAULT_WEBHOOK_PATH, DEFAULTS, Env};
pub use error::ConfigError;
pub use options::{DEFAULT_BASE_URL, Options, base_url};

use std::fs;

impl Options {
    /// Load options from a YAML file at the given path.
    ///
    /// Keys are the snake_case field names of [`Options`]; missing keys stay
    /// unset. The logger cannot be set from a file.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let options: Options = serde_yaml::from_str(&content)?;
        Ok(options)
    }
}
