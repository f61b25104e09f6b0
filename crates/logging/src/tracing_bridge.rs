//! crates/logging/src/tracing_bridge.rs
//! Bridge between the tracing crate and chacl's verbosity system.
//!
//! [`ChaclLayer`] maps tracing events onto info and debug flags based on the
//! event target, filters them against a [`VerbosityConfig`], and writes the
//! survivors as `chacl: ...` lines to a writer owned by the layer. Warnings and
//! errors are always written regardless of flag levels.
//!
//! # Usage
//!
//! ```rust,ignore
//! use logging::{SharedWriter, VerbosityConfig, scoped};
//!
//! let sink = SharedWriter::new(Vec::new());
//! let _guard = scoped(VerbosityConfig::from_verbose_level(1), sink.clone(), None);
//! tracing::info!(target: "chacl::name", "updated /srv/share");
//! assert!(sink.contents().starts_with(b"chacl: updated"));
//! ```

use std::fmt::Write as _;
use std::io::Write;
use std::sync::{Mutex, PoisonError};

use super::config::VerbosityConfig;
use super::levels::{DebugFlag, InfoFlag};
use tracing::subscriber::DefaultGuard;
use tracing::{Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;

/// Environment variable holding an optional [`EnvFilter`] directive.
pub const LOG_ENV: &str = "CHACL_LOG";

/// A tracing layer that renders events permitted by a [`VerbosityConfig`].
pub struct ChaclLayer<W> {
    config: VerbosityConfig,
    writer: Mutex<W>,
}

impl<W> ChaclLayer<W> {
    /// Create a new layer writing to `writer`.
    #[must_use]
    pub fn new(config: VerbosityConfig, writer: W) -> Self {
        Self {
            config,
            writer: Mutex::new(writer),
        }
    }

    /// Map a tracing target to an info flag.
    fn target_to_info_flag(target: &str) -> Option<InfoFlag> {
        match target {
            t if t.ends_with("::name") || t == "name" => Some(InfoFlag::Name),
            t if t.ends_with("::rules") || t == "rules" => Some(InfoFlag::Rules),
            t if t.ends_with("::stats") || t == "stats" => Some(InfoFlag::Stats),
            _ => None,
        }
    }

    /// Map a tracing target to a debug flag.
    fn target_to_debug_flag(target: &str) -> Option<DebugFlag> {
        match target {
            t if t.ends_with("::acl") || t == "acl" => Some(DebugFlag::Acl),
            t if t.ends_with("::plan") || t == "plan" => Some(DebugFlag::Plan),
            t if t.ends_with("::principal") || t == "principal" => Some(DebugFlag::Principal),
            t if t.ends_with("::walk") || t == "walk" => Some(DebugFlag::Walk),
            _ => None,
        }
    }

    /// Map a tracing level to a verbosity level.
    const fn level_to_verbosity_level(level: &Level) -> u8 {
        match *level {
            Level::ERROR | Level::WARN => 0,
            Level::INFO | Level::DEBUG => 1,
            Level::TRACE => 2,
        }
    }

    fn enabled_for(&self, target: &str, level: &Level) -> bool {
        let verbosity_level = Self::level_to_verbosity_level(level);
        if verbosity_level == 0 {
            return true;
        }
        if let Some(flag) = Self::target_to_debug_flag(target) {
            return self.config.debug_gte(flag, verbosity_level);
        }
        if let Some(flag) = Self::target_to_info_flag(target) {
            return self.config.info_gte(flag, verbosity_level);
        }
        false
    }
}

impl<S, W> Layer<S> for ChaclLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: Write + Send + 'static,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !self.enabled_for(metadata.target(), metadata.level()) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let prefix = match *metadata.level() {
            Level::ERROR => "chacl: error: ",
            Level::WARN => "chacl: warning: ",
            _ => "chacl: ",
        };

        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(writer, "{prefix}{}", visitor.finish());
    }
}

/// Visitor collecting the message and any structured fields of an event.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields.trim_start().to_owned()
        } else {
            format!("{}{}", self.message, self.fields)
        }
    }
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            value.clone_into(&mut self.message);
        } else {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }
}

/// Reads the [`LOG_ENV`] filter, ignoring unparsable directives.
pub fn env_filter() -> Option<EnvFilter> {
    std::env::var(LOG_ENV)
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
}

/// Install a [`ChaclLayer`] as the default subscriber for the current thread.
///
/// The returned guard restores the previous subscriber when dropped, so each
/// run gets its own writer and verbosity.
pub fn scoped<W>(config: VerbosityConfig, writer: W, filter: Option<EnvFilter>) -> DefaultGuard
where
    W: Write + Send + 'static,
{
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(ChaclLayer::new(config, writer));
    tracing::subscriber::set_default(subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestLayer = ChaclLayer<Vec<u8>>;

    #[test]
    fn test_target_to_info_flag() {
        assert_eq!(
            TestLayer::target_to_info_flag("chacl::name"),
            Some(InfoFlag::Name)
        );
        assert_eq!(
            TestLayer::target_to_info_flag("chacl::rules"),
            Some(InfoFlag::Rules)
        );
        assert_eq!(TestLayer::target_to_info_flag("unknown"), None);
    }

    #[test]
    fn test_target_to_debug_flag() {
        assert_eq!(
            TestLayer::target_to_debug_flag("chacl::acl"),
            Some(DebugFlag::Acl)
        );
        assert_eq!(
            TestLayer::target_to_debug_flag("chacl::walk"),
            Some(DebugFlag::Walk)
        );
        assert_eq!(TestLayer::target_to_debug_flag("chacl::name"), None);
    }

    #[test]
    fn test_level_to_verbosity_level() {
        assert_eq!(TestLayer::level_to_verbosity_level(&Level::ERROR), 0);
        assert_eq!(TestLayer::level_to_verbosity_level(&Level::WARN), 0);
        assert_eq!(TestLayer::level_to_verbosity_level(&Level::INFO), 1);
        assert_eq!(TestLayer::level_to_verbosity_level(&Level::DEBUG), 1);
        assert_eq!(TestLayer::level_to_verbosity_level(&Level::TRACE), 2);
    }

    #[test]
    fn warnings_bypass_flag_levels() {
        let layer = TestLayer::new(VerbosityConfig::default(), Vec::new());
        assert!(layer.enabled_for("chacl::skip", &Level::WARN));
        assert!(!layer.enabled_for("chacl::name", &Level::INFO));
        assert!(!layer.enabled_for("other", &Level::INFO));
    }
}
