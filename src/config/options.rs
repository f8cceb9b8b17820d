//! The options record and its precedence merge.

use serde::Deserialize;

use super::{AppId, Env};
use crate::logging::Logger;

/// API root used when no enterprise host is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Application options. Every key is optional so partial records can be merged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Options {
    /// Logging verbosity: "trace", "debug", "info", "warn", "error", "fatal".
    pub log_level: Option<String>,
    /// GitHub App id.
    pub app_id: Option<AppId>,
    /// PEM-encoded App private key.
    pub private_key: Option<String>,
    /// Webhook signing secret.
    pub secret: Option<String>,
    /// Redis connection string for a shared cache/queue.
    pub redis_config: Option<String>,
    /// HTTP path inbound webhooks are served on.
    pub webhook_path: Option<String>,
    /// Root endpoint for outbound API calls.
    pub base_url: Option<String>,
    /// Personal access token; takes precedence over App credentials.
    pub github_token: Option<String>,
    /// Proxy URL forwarding webhooks during development.
    pub webhook_proxy: Option<String>,
    /// Interface the webhook server binds to.
    pub host: Option<String>,
    /// Port the webhook server listens on.
    pub port: Option<u16>,
    /// Logger handed to the instance.
    #[serde(skip)]
    pub log: Option<Logger>,
}

impl Options {
    /// Derives options from an environment that already carries the defaults.
    ///
    /// `private_key` comes from the key loader; an empty key leaves the field absent.
    pub fn from_env(env: &Env, private_key: Option<String>) -> Self {
        Options {
            log_level: env.get("LOG_LEVEL").map(str::to_string),
            app_id: Some(AppId::parse(env.get("APP_ID").unwrap_or_default())),
            private_key: private_key.filter(|key| !key.is_empty()),
            secret: env.get("WEBHOOK_SECRET").map(str::to_string),
            redis_config: env.get("REDIS_URL").map(str::to_string),
            webhook_path: env.get("WEBHOOK_PATH").map(str::to_string),
            base_url: Some(base_url(env)),
            ..Options::default()
        }
    }

    /// Overlays `other` on `self`. Keys set in `other` win; absent keys keep `self`'s value.
    pub fn merge(self, other: Options) -> Options {
        Options {
            log_level: other.log_level.or(self.log_level),
            app_id: other.app_id.or(self.app_id),
            private_key: other.private_key.or(self.private_key),
            secret: other.secret.or(self.secret),
            redis_config: other.redis_config.or(self.redis_config),
            webhook_path: other.webhook_path.or(self.webhook_path),
            base_url: other.base_url.or(self.base_url),
            github_token: other.github_token.or(self.github_token),
            webhook_proxy: other.webhook_proxy.or(self.webhook_proxy),
            host: other.host.or(self.host),
            port: other.port.or(self.port),
            log: other.log.or(self.log),
        }
    }
}

/// Resolves the API root from `GHE_HOST` and `GHE_PROTOCOL`.
pub fn base_url(env: &Env) -> String {
    match env.non_empty("GHE_HOST") {
        Some(host) => {
            let protocol = env.non_empty("GHE_PROTOCOL").unwrap_or("https");
            format!("{}://{}/api/v3", protocol, host)
        }
        None => DEFAULT_BASE_URL.to_string(),
    }
}
