//! `tracing` output routed to the browser console.
//!
//! `init` installs a registry with a [`ConsoleLayer`]. Each event becomes one
//! line, `LEVEL target: message key=value ...`, sent to the console method
//! matching its level. Off wasm the line goes to stderr instead.

use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

/// Forwards events at or above `max_level` to the console.
pub struct ConsoleLayer {
    max_level: Level,
}

impl ConsoleLayer {
    pub fn new(max_level: Level) -> Self {
        Self { max_level }
    }
}

impl<S: Subscriber> Layer<S> for ConsoleLayer {
    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        *metadata.level() <= self.max_level
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if *meta.level() > self.max_level {
            return;
        }
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        let line = visitor.finish(*meta.level(), meta.target());
        emit(*meta.level(), &line);
    }
}

/// Collects the message and the remaining fields of one event.
#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl LineVisitor {
    fn finish(self, level: Level, target: &str) -> String {
        format_line(level, target, &self.message, &self.fields)
    }
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

fn format_line(level: Level, target: &str, message: &str, fields: &str) -> String {
    format!("{:>5} {}: {}{}", level, target, message, fields)
}

#[cfg(target_arch = "wasm32")]
fn emit(level: Level, line: &str) {
    let value = line.into();
    match level {
        Level::ERROR => web_sys::console::error_1(&value),
        Level::WARN => web_sys::console::warn_1(&value),
        Level::INFO => web_sys::console::info_1(&value),
        _ => web_sys::console::log_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(_level: Level, line: &str) {
    eprintln!("{}", line);
}

/// Install the global subscriber. Calling it twice only logs a warning.
pub fn init(max_level: Level) {
    let result = tracing_subscriber::registry()
        .with(ConsoleLayer::new(max_level))
        .try_init();
    if let Err(e) = result {
        tracing::warn!("logging already initialised: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_layout() {
        let line = format_line(Level::INFO, "wealth_inc::economy", "purchased", " upgrade=\"autoClicker\"");
        assert_eq!(line, " INFO wealth_inc::economy: purchased upgrade=\"autoClicker\"");
    }

    #[test]
    fn visitor_separates_message_from_fields() {
        let mut v = LineVisitor::default();
        v.message.push_str("bonus collected");
        let _ = write!(v.fields, " amount=3000");
        assert_eq!(
            v.finish(Level::WARN, "t"),
            " WARN t: bonus collected amount=3000"
        );
    }

    #[test]
    fn layer_filters_by_level() {
        let subscriber = tracing_subscriber::registry().with(ConsoleLayer::new(Level::WARN));
        tracing::subscriber::with_default(subscriber, || {
            assert!(!tracing::enabled!(Level::DEBUG));
            assert!(tracing::enabled!(Level::WARN));
            assert!(tracing::enabled!(Level::ERROR));
        });
    }
}
