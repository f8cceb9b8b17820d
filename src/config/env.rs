//! Environment snapshot and the built-in defaults for recognised variables.

use std::collections::HashMap;

/// Path inbound webhooks are served on unless `WEBHOOK_PATH` says otherwise.
pub const DEFAULT_WEBHOOK_PATH: &str = "/api/github/webhooks";

/// Built-in defaults for the recognised variables.
///
/// `None` marks a variable that is recognised but has no default (`LOG_FORMAT`).
pub const DEFAULTS: &[(&str, Option<&str>)] = &[
    ("APP_ID", Some("")),
    ("WEBHOOK_SECRET", Some("")),
    ("WEBHOOK_PATH", Some(DEFAULT_WEBHOOK_PATH)),
    ("GHE_HOST", Some("")),
    ("GHE_PROTOCOL", Some("https")),
    ("LOG_FORMAT", None),
    ("LOG_LEVEL", Some("warn")),
    ("LOG_LEVEL_IN_STRING", Some("false")),
    ("LOG_MESSAGE_KEY", Some("msg")),
    ("REDIS_URL", Some("")),
    ("SENTRY_DSN", Some("")),
];

/// Immutable snapshot of environment variables.
///
/// A name missing from the snapshot is an absent value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Env {
    vars: HashMap<String, String>,
}

impl Env {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        std::env::vars_os()
            .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
            .collect()
    }

    /// Returns the value of `name`, if set.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Returns the value of `name` only when it is set to a non-empty string.
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.is_empty())
    }

    /// Sets `name` to `value`, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Builder form of [`Env::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Returns a new snapshot where this environment is overlaid on [`DEFAULTS`].
    ///
    /// Variables set here win; defaults only fill names that are missing.
    pub fn with_defaults(&self) -> Env {
        let mut merged = self.clone();
        for (name, default) in DEFAULTS {
            if let Some(default) = default {
                merged
                    .vars
                    .entry((*name).to_string())
                    .or_insert_with(|| (*default).to_string());
            }
        }
        merged
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Env
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<HashMap<String, String>> for Env {
    fn from(vars: HashMap<String, String>) -> Self {
        Self { vars }
    }
}
