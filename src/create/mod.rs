//! Builds an app instance from defaults, environment and overrides.

use std::convert::Infallible;
use std::path::PathBuf;

use crate::config::{Env, Options};
use crate::error::CreateError;
use crate::logging::{LogOptions, Logger};
use crate::private_key::PrivateKeyLoader;
use crate::probot::Probot;

/// Inputs to [`create_probot`].
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Win over every other source.
    pub overrides: Options,
    /// Lowest precedence; env-derived values replace them.
    pub defaults: Options,
    /// Environment snapshot; the live process environment when `None`.
    pub env: Option<Env>,
    /// Directory private key paths resolve against; `.` when `None`.
    pub cwd: Option<PathBuf>,
}

impl CreateOptions {
    pub fn with_overrides(mut self, overrides: Options) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_defaults(mut self, defaults: Options) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_env(mut self, env: Env) -> Self {
        self.env = Some(env);
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }
}

/// Resolves options and builds a [`Probot`].
pub fn create_probot(options: CreateOptions) -> Result<Probot, CreateError> {
    create_probot_with(options, |resolved| Ok::<_, Infallible>(Probot::new(resolved)))
}

/// Resolves options and hands them to `constructor`.
///
/// The options passed on always carry a logger: the caller's own when one was
/// given in `defaults` or `overrides`, otherwise a `"probot"` child of a
/// `"server"` logger built from the environment.
pub fn create_probot_with<T, F, E>(options: CreateOptions, constructor: F) -> Result<T, CreateError>
where
    F: FnOnce(Options) -> Result<T, E>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let CreateOptions {
        overrides,
        defaults,
        env,
        cwd,
    } = options;

    let env = env.unwrap_or_else(Env::from_process);
    let private_key = PrivateKeyLoader::new(cwd.unwrap_or_else(|| PathBuf::from("."))).load(&env)?;

    let env = env.with_defaults();
    let env_options = Options::from_env(&env, private_key);

    let mut resolved = defaults.merge(env_options).merge(overrides);

    if resolved.log.is_none() {
        let log_options = LogOptions::from_env(&env, resolved.log_level.as_deref());
        let server = Logger::new(log_options)?.child("server");
        server.debug(&format!(
            "options resolved: base_url={} webhook_path={} app_id={}",
            resolved.base_url.as_deref().unwrap_or_default(),
            resolved.webhook_path.as_deref().unwrap_or_default(),
            resolved
                .app_id
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default()
        ));
        resolved.log = Some(server.child("probot"));
    }

    constructor(resolved).map_err(|e| CreateError::Construct(e.into()))
}
