//! The configured app instance.

use crate::config::{AppId, DEFAULT_BASE_URL, DEFAULT_WEBHOOK_PATH, Options};
use crate::logging::{LogOptions, Logger};

/// Secret used when none is configured, matching local development setups.
pub const DEFAULT_SECRET: &str = "development";

/// How the instance authenticates outbound API calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Personal or installation access token.
    Token(String),
    /// GitHub App id and private key.
    App { app_id: u64, private_key: String },
    /// No usable credentials.
    Unauthenticated,
}

/// App instance built from resolved options.
#[derive(Debug, Clone)]
pub struct Probot {
    app_id: Option<AppId>,
    private_key: Option<String>,
    secret: String,
    webhook_path: String,
    base_url: String,
    redis_config: Option<String>,
    github_token: Option<String>,
    webhook_proxy: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    log_level: Option<String>,
    log: Logger,
}

impl Probot {
    /// Creates an instance, filling gaps with defaults.
    ///
    /// Without a logger in `options` a stdout logger at the configured level is built.
    pub fn new(options: Options) -> Self {
        let log = match options.log {
            Some(log) => log,
            None => default_logger(options.log_level.as_deref()),
        };

        let probot = Self {
            app_id: options.app_id,
            private_key: options.private_key.filter(|k| !k.is_empty()),
            secret: options
                .secret
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_SECRET.to_string()),
            webhook_path: options
                .webhook_path
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| DEFAULT_WEBHOOK_PATH.to_string()),
            base_url: options
                .base_url
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            redis_config: options.redis_config.filter(|r| !r.is_empty()),
            github_token: options.github_token.filter(|t| !t.is_empty()),
            webhook_proxy: options.webhook_proxy.filter(|p| !p.is_empty()),
            host: options.host,
            port: options.port,
            log_level: options.log_level,
            log,
        };

        probot.log.debug(&format!(
            "instance configured: base_url={} webhook_path={} auth={}",
            probot.base_url,
            probot.webhook_path,
            probot.credentials().kind()
        ));

        probot
    }

    /// Picks the authentication strategy: token first, then App credentials.
    pub fn credentials(&self) -> Credentials {
        if let Some(ref token) = self.github_token {
            return Credentials::Token(token.clone());
        }

        let app_id = self.app_id.as_ref().and_then(AppId::as_u64).filter(|id| *id != 0);
        match (app_id, &self.private_key) {
            (Some(app_id), Some(private_key)) => Credentials::App {
                app_id,
                private_key: private_key.clone(),
            },
            _ => Credentials::Unauthenticated,
        }
    }

    pub fn app_id(&self) -> Option<&AppId> {
        self.app_id.as_ref()
    }

    pub fn private_key(&self) -> Option<&str> {
        self.private_key.as_deref()
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn webhook_path(&self) -> &str {
        &self.webhook_path
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn redis_config(&self) -> Option<&str> {
        self.redis_config.as_deref()
    }

    pub fn webhook_proxy(&self) -> Option<&str> {
        self.webhook_proxy.as_deref()
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn log_level(&self) -> Option<&str> {
        self.log_level.as_deref()
    }

    pub fn log(&self) -> &Logger {
        &self.log
    }

    pub fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

impl Credentials {
    /// Short label without secret material, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Credentials::Token(_) => "token",
            Credentials::App { .. } => "app",
            Credentials::Unauthenticated => "unauthenticated",
        }
    }
}

fn default_logger(level: Option<&str>) -> Logger {
    let mut options = LogOptions::default();
    if let Some(level) = level {
        options.level = level.to_string();
    }
    Logger::without_reporting(options)
}
