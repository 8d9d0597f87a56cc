//! Logging config and utilities
//!
//! This module is only used by the main binary and provides logging config structures and setup
//! helper functions

mod defaults;
mod format_style;
mod log_rotation_kind;
mod parsers;

use std::path::PathBuf;

use format_style::FormatStyle;
use log_rotation_kind::LogRotationKind;
use serde::Deserialize;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, Layer as LayerTrait, Registry};

/// Crates that are only worth hearing from when something goes wrong
const QUIET_AT_INFO: [&str; 3] = ["rmcp=warn", "reqwest=warn", "hyper=warn"];

/// Logging related options
#[derive(Debug, Deserialize)]
pub struct Logging {
    /// The log level to use for tracing
    #[serde(
        default = "defaults::log_level",
        deserialize_with = "parsers::from_str"
    )]
    pub level: Level,

    /// Directory for rolling log files. Logs go to stderr when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Log file rotation period to use when log file path provided
    #[serde(default = "defaults::default_rotation")]
    pub rotation: LogRotationKind,

    #[serde(default)]
    pub format: FormatStyle,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            path: None,
            rotation: defaults::default_rotation(),
            format: Default::default(),
        }
    }
}

type LoggingLayerResult = (
    Box<dyn LayerTrait<Registry> + Send + Sync>,
    Option<WorkerGuard>,
);

pub struct LoggingLayerBuilder {
    writer: Option<BoxMakeWriter>,
    worker_guard: Option<WorkerGuard>,
    ansi_enabled: bool,
}

impl LoggingLayerBuilder {
    pub fn new() -> Self {
        Self {
            writer: None,
            worker_guard: None,
            ansi_enabled: false,
        }
    }

    // Unit tests inject their own writer; otherwise one is built from the config in build()
    #[allow(dead_code)]
    pub fn with_writer<W>(mut self, mw: W) -> Self
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        self.writer = Some(BoxMakeWriter::new(mw));
        self
    }

    pub fn build(mut self, logging: &Logging) -> Result<LoggingLayerResult, anyhow::Error> {
        if self.writer.is_none() {
            let (writer, guard, with_ansi) = self.build_writer(logging);
            self.writer = Some(writer);
            self.worker_guard = guard;
            self.ansi_enabled = with_ansi;
        }

        let Some(writer) = self.writer else {
            return Err(anyhow::Error::msg("No log writer set"));
        };

        let layer = tracing_subscriber::fmt::layer();
        let formatted_layer = match logging.format {
            FormatStyle::Full => layer
                .with_writer(writer)
                .with_ansi(self.ansi_enabled)
                .with_target(false)
                .boxed(),
            FormatStyle::Compact => layer
                .compact()
                .with_writer(writer)
                .with_ansi(self.ansi_enabled)
                .with_target(false)
                .boxed(),
            FormatStyle::Json => layer
                .json()
                .with_writer(writer)
                .with_ansi(self.ansi_enabled)
                .with_target(false)
                .boxed(),
            FormatStyle::Pretty => layer
                .pretty()
                .with_writer(writer)
                .with_ansi(self.ansi_enabled)
                .with_target(false)
                .boxed(),
        };

        Ok((formatted_layer, self.worker_guard))
    }

    fn build_writer(&self, logging: &Logging) -> (BoxMakeWriter, Option<WorkerGuard>, bool) {
        macro_rules! log_error {
            () => {
                |e| eprintln!("Failed to setup logging: {e:?}")
            };
        }

        // stdout carries the stdio transport, so console logs always go to stderr
        match logging.path.clone() {
            Some(path) => std::fs::create_dir_all(&path)
                .map(|_| path)
                .inspect_err(log_error!())
                .ok()
                .and_then(|path| {
                    RollingFileAppender::builder()
                        .rotation(logging.rotation.clone().into())
                        .filename_prefix("contentful_mcp_server")
                        .filename_suffix("log")
                        .build(path)
                        .inspect_err(log_error!())
                        .ok()
                })
                .map(|appender| {
                    let (non_blocking_appender, guard) = tracing_appender::non_blocking(appender);
                    (
                        BoxMakeWriter::new(non_blocking_appender),
                        Some(guard),
                        false,
                    )
                })
                .unwrap_or_else(|| {
                    eprintln!("Log file setup failed - falling back to stderr");
                    (BoxMakeWriter::new(std::io::stderr), None, true)
                }),
            None => (BoxMakeWriter::new(std::io::stderr), None, true),
        }
    }
}

impl Logging {
    pub fn env_filter(logging: &Logging) -> Result<EnvFilter, anyhow::Error> {
        let mut env_filter = EnvFilter::from_default_env().add_directive(logging.level.into());

        if logging.level == Level::INFO {
            for directive in QUIET_AT_INFO {
                env_filter = env_filter.add_directive(directive.parse()?);
            }
        }
        Ok(env_filter)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    use regex::Regex;
    use tracing::subscriber;
    use tracing_core::Level;
    use tracing_subscriber::Registry;
    use tracing_subscriber::fmt::MakeWriter;
    use tracing_subscriber::layer::SubscriberExt;

    use super::format_style::FormatStyle;
    use super::log_rotation_kind::LogRotationKind;
    use super::{Logging, LoggingLayerBuilder};

    struct TestBuffer(Arc<Mutex<Vec<u8>>>);
    struct TestWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for TestWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for TestBuffer {
        type Writer = TestWriter;
        fn make_writer(&'a self) -> Self::Writer {
            TestWriter(self.0.clone())
        }
    }

    fn logging(format: FormatStyle) -> Logging {
        Logging {
            level: Level::INFO,
            path: None,
            rotation: LogRotationKind::Minutely,
            format,
        }
    }

    /// Log one message with the given format and return everything written
    fn capture(format: FormatStyle, message: &str) -> String {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let (logging_layer, _) = LoggingLayerBuilder::new()
            .with_writer(TestBuffer(buf.clone()))
            .build(&logging(format))
            .unwrap();

        let sub = Registry::default().with(logging_layer);
        subscriber::with_default(sub, || {
            tracing::info!("{}", message);
        });

        String::from_utf8(buf.lock().unwrap().clone()).unwrap()
    }

    #[test]
    fn logs_in_json_format() {
        let out = capture(FormatStyle::Json, "hello!");

        assert!(out.contains("\"message\":\"hello!\""));
    }

    #[test]
    fn logs_in_full_format() {
        let expected_log_msg = "cache refreshed";
        let out = capture(FormatStyle::Full, expected_log_msg);

        let pattern = format!(
            r"(?m)^\S+Z\s+INFO\s+{msg}$",
            msg = regex::escape(expected_log_msg)
        );
        let re = Regex::new(&pattern).unwrap();

        assert!(
            re.is_match(out.as_str()),
            "Log output did not match expected full format.\n  Expected pattern: {pattern}\n  Got: {out}"
        );
    }

    #[test]
    fn logs_in_compact_format() {
        let expected_log_msg = "cache refreshed";
        let out = capture(FormatStyle::Compact, expected_log_msg);

        let pattern = format!(
            r"(?m)^\S+Z\s+INFO\s+{msg}$",
            msg = regex::escape(expected_log_msg)
        );
        let re = Regex::new(&pattern).unwrap();

        assert!(
            re.is_match(out.as_str()),
            "Log output did not match expected compact format.\n  Expected pattern: {pattern}\n  Got: {out}"
        );
    }

    #[test]
    fn logs_in_pretty_format() {
        let expected_log_msg = "cache refreshed";
        let out = capture(FormatStyle::Pretty, expected_log_msg);

        // Message line followed by the source location, e.g.
        //  2026-03-02T09:12:44.102311Z  INFO  cache refreshed
        //     at crates/contentful-mcp-server/src/metadata_cache.rs:120
        let pattern = format!(
            r"(?m)^\s*\S+Z\s+INFO\s+{msg}\r?\n\s+at\s+.+\r?\n?(in)?.*$",
            msg = regex::escape(expected_log_msg)
        );
        let re = Regex::new(&pattern).unwrap();

        assert!(
            re.is_match(out.as_str()),
            "Log output did not match expected pretty format.\n  Expected pattern: {pattern}\n  Got: {out}"
        );
    }

    #[test]
    fn noisy_crates_are_clamped_at_info() {
        let filter = Logging::env_filter(&logging(FormatStyle::Full))
            .unwrap()
            .to_string();

        assert!(filter.contains("rmcp=warn"));
        assert!(filter.contains("reqwest=warn"));
        assert!(filter.contains("hyper=warn"));
    }

    #[test]
    fn debug_level_is_not_clamped() {
        let filter = Logging::env_filter(&Logging {
            level: Level::DEBUG,
            ..logging(FormatStyle::Full)
        })
        .unwrap()
        .to_string();

        assert!(!filter.contains("rmcp=warn"));
    }

    #[test]
    fn level_and_format_come_from_config() {
        let logging: Logging = serde_json::from_value(serde_json::json!({
            "level": "debug",
            "format": "json",
            "rotation": "daily",
        }))
        .unwrap();

        assert_eq!(logging.level, Level::DEBUG);
        assert_eq!(logging.format, FormatStyle::Json);
        assert_eq!(logging.rotation, LogRotationKind::Daily);
        assert!(logging.path.is_none());
    }
}
