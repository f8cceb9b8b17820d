//! Forwards error-level events to a Sentry DSN.

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{Event, Level, Subscriber, warn};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

use super::fields::JsonVisitor;
use super::{LogError, NAME_FIELD};

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);
const REPORT_QUEUE_SIZE: usize = 100;

/// Parsed Sentry data source name: `scheme://public_key@host[:port]/[path/]project_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dsn {
    scheme: String,
    public_key: String,
    host: String,
    path: String,
    project_id: String,
}

impl Dsn {
    pub fn parse(dsn: &str) -> Result<Self, LogError> {
        let invalid = |reason: &str| LogError::InvalidDsn(format!("{}: {}", reason, dsn));

        let url = Url::parse(dsn).map_err(|e| invalid(&e.to_string()))?;

        let scheme = url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(invalid("unsupported scheme"));
        }
        if url.username().is_empty() {
            return Err(invalid("missing public key"));
        }
        let host = url.host_str().ok_or_else(|| invalid("missing host"))?;
        let host = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        let (path, project_id) = url
            .path()
            .trim_end_matches('/')
            .rsplit_once('/')
            .ok_or_else(|| invalid("missing project id"))?;
        if project_id.is_empty() {
            return Err(invalid("missing project id"));
        }

        Ok(Self {
            scheme: scheme.to_string(),
            public_key: url.username().to_string(),
            host,
            path: path.to_string(),
            project_id: project_id.to_string(),
        })
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Endpoint events are posted to.
    pub fn store_url(&self) -> String {
        format!(
            "{}://{}{}/api/{}/store/",
            self.scheme, self.host, self.path, self.project_id
        )
    }

    fn auth_header(&self) -> String {
        format!(
            "Sentry sentry_version=7, sentry_client={}/{}, sentry_key={}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            self.public_key
        )
    }
}

/// One error event queued for delivery.
#[derive(Debug, Clone)]
pub(crate) struct Report {
    pub(crate) logger: Option<String>,
    pub(crate) message: String,
    pub(crate) extra: Map<String, Value>,
    pub(crate) timestamp: DateTime<Utc>,
}

impl Report {
    fn from_event(event: &Event<'_>) -> Self {
        let mut visitor = JsonVisitor::default();
        event.record(&mut visitor);

        let logger = match visitor.take(NAME_FIELD) {
            Some(Value::String(name)) => Some(name),
            _ => None,
        };
        let message = match visitor.take("message") {
            Some(Value::String(message)) => message,
            Some(other) => other.to_string(),
            None => String::new(),
        };

        Self {
            logger,
            message,
            extra: visitor.fields,
            timestamp: Utc::now(),
        }
    }

    pub(crate) fn to_payload(&self) -> Value {
        json!({
            "timestamp": self.timestamp.to_rfc3339(),
            "level": "error",
            "platform": "other",
            "logger": self.logger,
            "message": self.message,
            "extra": self.extra,
        })
    }
}

/// Layer queueing error events for a background delivery worker.
pub(crate) struct ErrorReportLayer {
    sender: mpsc::Sender<Report>,
    dropped: Arc<AtomicU64>,
}

impl ErrorReportLayer {
    /// Starts the delivery worker on the current tokio runtime.
    ///
    /// Returns `None` outside a runtime; reporting is then unavailable.
    pub(crate) fn spawn(dsn: Dsn) -> Result<Option<Self>, LogError> {
        let Ok(handle) = Handle::try_current() else {
            return Ok(None);
        };

        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()?;

        let (sender, receiver) = mpsc::channel(REPORT_QUEUE_SIZE);
        let dropped = Arc::new(AtomicU64::new(0));
        handle.spawn(Self::run_worker(
            receiver,
            http_client,
            dsn,
            Arc::clone(&dropped),
        ));

        Ok(Some(Self { sender, dropped }))
    }

    async fn run_worker(
        mut receiver: mpsc::Receiver<Report>,
        http_client: reqwest::Client,
        dsn: Dsn,
        dropped: Arc<AtomicU64>,
    ) {
        let url = dsn.store_url();
        let auth = dsn.auth_header();

        while let Some(report) = receiver.recv().await {
            let missed = dropped.swap(0, Ordering::Relaxed);
            if missed > 0 {
                warn!(dropped = missed, "Error reports dropped while the queue was full");
            }
            if let Err(e) = Self::send_report(&http_client, &url, &auth, &report).await {
                // Error-level events would be queued again.
                warn!(error = %e, "Failed to deliver error report");
            }
        }
    }

    async fn send_report(
        http_client: &reqwest::Client,
        url: &str,
        auth: &str,
        report: &Report,
    ) -> Result<(), String> {
        let response = http_client
            .post(url)
            .header("X-Sentry-Auth", auth)
            .json(&report.to_payload())
            .send()
            .await
            .map_err(|e| format!("HTTP request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(format!("Sentry API error: {} - {}", status, body));
        }

        Ok(())
    }
}

impl<S: Subscriber> Layer<S> for ErrorReportLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != Level::ERROR {
            return;
        }
        // Logging from here would re-enter this subscriber, so drops are only counted.
        if self.sender.try_send(Report::from_event(event)).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}
