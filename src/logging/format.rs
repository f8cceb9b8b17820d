//! Pino-compatible JSON lines.

use chrono::Utc;
use serde_json::{Map, Value};
use std::fmt;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use super::fields::JsonVisitor;
use super::NAME_FIELD;

/// Writes one JSON object per event with pino's field layout.
#[derive(Debug, Clone)]
pub(crate) struct PinoJsonFormat {
    pub(crate) message_key: String,
    pub(crate) level_in_string: bool,
    pub(crate) hostname: Option<String>,
}

impl PinoJsonFormat {
    pub(crate) fn new(message_key: String, level_in_string: bool) -> Self {
        Self {
            message_key,
            level_in_string,
            hostname: hostname::get()
                .ok()
                .map(|name| name.to_string_lossy().into_owned()),
        }
    }

    fn level_value(&self, level: Level) -> Value {
        if self.level_in_string {
            Value::String(level_label(level).to_string())
        } else {
            Value::from(pino_level(level))
        }
    }
}

/// Numeric pino level for a tracing level.
pub(crate) fn pino_level(level: Level) -> u64 {
    match level {
        Level::TRACE => 10,
        Level::DEBUG => 20,
        Level::INFO => 30,
        Level::WARN => 40,
        _ => 50,
    }
}

pub(crate) fn level_label(level: Level) -> &'static str {
    match level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        _ => "error",
    }
}

impl<S, N> FormatEvent<S, N> for PinoJsonFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = JsonVisitor::default();
        event.record(&mut visitor);

        let mut record = Map::new();
        record.insert("level".into(), self.level_value(*event.metadata().level()));
        record.insert("time".into(), Value::from(Utc::now().timestamp_millis()));
        record.insert("pid".into(), Value::from(std::process::id()));
        if let Some(hostname) = &self.hostname {
            record.insert("hostname".into(), Value::from(hostname.as_str()));
        }
        if let Some(name) = visitor.take(NAME_FIELD) {
            record.insert("name".into(), name);
        }
        if let Some(message) = visitor.take("message") {
            record.insert(self.message_key.clone(), message);
        }
        record.extend(visitor.fields);

        let line = serde_json::to_string(&Value::Object(record)).map_err(|_| fmt::Error)?;
        writeln!(writer, "{}", line)
    }
}
