//! Assembles GitHub App configuration and builds an app instance from it.
//!
//! Options are resolved from three sources in fixed precedence: caller
//! overrides beat environment variables, which beat caller defaults. See
//! [`create_probot`].

pub mod config;
pub mod create;
pub mod error;
pub mod logging;
pub mod private_key;
pub mod probot;

pub use config::{AppId, Env, Options};
pub use create::{CreateOptions, create_probot, create_probot_with};
pub use error::CreateError;
pub use logging::{LogFormat, LogOptions, Logger};
pub use probot::{Credentials, Probot};
