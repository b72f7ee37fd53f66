//! tracing 연동 레이어
//!
//! `tracing` 이벤트를 등록된 [`Logger`]로 전달합니다.

use std::fmt::Write as FmtWrite;
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use crate::logging::formatter::{LogLevel, LogRecord};
use crate::logging::system::Logger;

// 이 크레이트 내부 이벤트는 다시 로거로 보내지 않음
const INTERNAL_TARGET: &str = env!("CARGO_CRATE_NAME");

/// 로거로 이벤트를 전달하는 레이어
pub struct LoggerLayer {
    logger: Arc<Logger>,
}

impl LoggerLayer {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }
}

fn is_internal(target: &str) -> bool {
    target == INTERNAL_TARGET
        || target
            .strip_prefix(INTERNAL_TARGET)
            .is_some_and(|rest| rest.starts_with("::"))
}

impl<S> Layer<S> for LoggerLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if is_internal(metadata.target()) {
            return;
        }

        let level = LogLevel::from(*metadata.level());
        if !self.logger.is_enabled(level) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let mut message = visitor.finish();
        if let Some(scope) = ctx.event_scope(event) {
            let spans: Vec<&str> = scope.from_root().map(|span| span.name()).collect();
            if !spans.is_empty() {
                message = format!("{}: {}", spans.join("::"), message);
            }
        }

        self.logger
            .emit(&LogRecord::new(level, self.logger.name(), message));
    }
}

/// `message` 필드와 나머지 `key=value` 필드 수집
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn push_field(&mut self, field: &Field, value: std::fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={}", field.name(), value);
    }

    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.push_field(field, format_args!("{}", value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.push_field(field, format_args!("{:?}", value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push_field(field, format_args!("{}", value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push_field(field, format_args!("{}", value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push_field(field, format_args!("{}", value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::writer::{Appender, InMemoryAppender};
    use tracing_subscriber::layer::SubscriberExt;

    fn memory_logger(level: LogLevel) -> (Arc<Logger>, Arc<InMemoryAppender>) {
        let memory = Arc::new(InMemoryAppender::new("memory"));
        let logger = Arc::new(Logger::new(
            "Bridge",
            level,
            vec![memory.clone() as Arc<dyn Appender>],
        ));
        (logger, memory)
    }

    #[test]
    fn test_events_are_forwarded_with_fields() {
        let (logger, memory) = memory_logger(LogLevel::Info);
        let subscriber = tracing_subscriber::registry().with(LoggerLayer::new(logger));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "app", port = 50051, secure = true, "server started");
            tracing::warn!(target: "app", "disk almost full");
        });

        let logs = memory.get_logs();
        assert_eq!(logs.len(), 2);
        assert!(logs[0].contains("[Bridge/INFO]: server started port=50051 secure=true"));
        assert!(logs[1].contains("[Bridge/WARN]: disk almost full"));
    }

    #[test]
    fn test_level_filtering() {
        let (logger, memory) = memory_logger(LogLevel::Warn);
        let subscriber = tracing_subscriber::registry().with(LoggerLayer::new(logger));

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!(target: "app", "hidden");
            tracing::info!(target: "app", "hidden");
            tracing::error!(target: "app", "shown");
        });

        let logs = memory.get_logs();
        assert_eq!(logs.len(), 1);
        assert!(logs[0].contains("[Bridge/ERROR]: shown"));
    }

    #[test]
    fn test_span_names_prefix_message() {
        let (logger, memory) = memory_logger(LogLevel::Info);
        let subscriber = tracing_subscriber::registry().with(LoggerLayer::new(logger));

        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!(target: "app", "startup");
            let _guard = span.enter();
            tracing::info!(target: "app", "loading");
        });

        assert!(memory.get_logs()[0].contains("startup: loading"));
    }

    #[test]
    fn test_internal_events_are_ignored() {
        let (logger, memory) = memory_logger(LogLevel::Trace);
        let subscriber = tracing_subscriber::registry().with(LoggerLayer::new(logger));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "persistent_logger::logging::registry", "internal");
            tracing::info!(target: "persistent_logger_ext", "external");
        });

        let logs = memory.get_logs();
        assert_eq!(logs.len(), 1);
        assert!(logs[0].contains("external"));
    }

    #[test]
    fn test_is_internal() {
        assert!(is_internal("persistent_logger"));
        assert!(is_internal("persistent_logger::logging::builder"));
        assert!(!is_internal("persistent_logger_ext"));
        assert!(!is_internal("app"));
    }
}
