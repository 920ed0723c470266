//! Tracing subscriber setup shared by the gateway binaries.
//!
//! Everything is driven by environment variables so the same binary can log
//! human-readable output on a developer machine and JSON lines in a
//! container:
//!
//! | Variable        | Values                        | Default                     |
//! |-----------------|-------------------------------|-----------------------------|
//! | `LOG_LEVEL`     | any `EnvFilter` directive     | `info`                      |
//! | `LOG_FORMAT`    | `human`, `json`               | `human`                     |
//! | `LOG_OUTPUT`    | `console`, `file`, `both`     | `console`                   |
//! | `LOG_FILE_PATH` | path of the rolling log file  | `/tmp/registry-gateway.log` |
//!
//! `RUST_LOG` wins over `LOG_LEVEL` when both are set.

use std::{
    env,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::Directive, fmt::MakeWriter, prelude::*, registry, EnvFilter};

const DEFAULT_LOG_FILE: &str = "/tmp/registry-gateway.log";

// --- Custom "Tee" Writer ---
struct Tee<A, B> {
    a: A,
    b: B,
}

impl<A, B> Write for Tee<A, B>
where
    A: Write,
    B: Write,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let res_a = self.a.write(buf);
        let res_b = self.b.write(buf);
        res_a.or(res_b)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.a.flush()?;
        self.b.flush()
    }
}

#[derive(Clone)]
struct MakeTee<A, B> {
    make_a: A,
    make_b: B,
}

impl<'a, A, B, W1, W2> MakeWriter<'a> for MakeTee<A, B>
where
    A: MakeWriter<'a, Writer = W1>,
    B: MakeWriter<'a, Writer = W2>,
    W1: Write + 'a,
    W2: Write + 'a,
{
    type Writer = Tee<W1, W2>;
    fn make_writer(&'a self) -> Self::Writer {
        Tee {
            a: self.make_a.make_writer(),
            b: self.make_b.make_writer(),
        }
    }
}

/// Where formatted events are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Console,
    File,
    Both,
    /// Unknown `LOG_OUTPUT` values disable the fmt layer entirely.
    Silent,
}

impl LogOutput {
    fn parse(value: &str) -> Self {
        match value {
            "console" => LogOutput::Console,
            "file" => LogOutput::File,
            "both" => LogOutput::Both,
            _ => LogOutput::Silent,
        }
    }

    fn uses_console(self) -> bool {
        matches!(self, LogOutput::Console | LogOutput::Both)
    }

    fn uses_file(self) -> bool {
        matches!(self, LogOutput::File | LogOutput::Both)
    }
}

/// Logging settings resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: String,
    pub json: bool,
    pub output: LogOutput,
    pub file_path: PathBuf,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            output: LogOutput::Console,
            file_path: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl LogSettings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup, used by tests to avoid
    /// mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            level: lookup("LOG_LEVEL").unwrap_or(defaults.level),
            json: lookup("LOG_FORMAT").is_some_and(|format| format == "json"),
            output: lookup("LOG_OUTPUT")
                .map(|output| LogOutput::parse(&output))
                .unwrap_or(defaults.output),
            file_path: lookup("LOG_FILE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.file_path),
        }
    }

    fn env_filter(&self) -> EnvFilter {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));
        // Connection-level chatter from the HTTP stack drowns out request logs.
        ["tokio=warn", "hyper=warn", "hyper_util=warn", "reqwest=warn"]
            .into_iter()
            .filter_map(|directive| directive.parse::<Directive>().ok())
            .fold(filter, |filter, directive| filter.add_directive(directive))
    }

    fn file_writer(&self) -> (tracing_appender::non_blocking::NonBlocking, WorkerGuard) {
        let log_dir = self.file_path.parent().unwrap_or_else(|| Path::new("/tmp"));
        let log_filename = self
            .file_path
            .file_name()
            .unwrap_or("registry-gateway.log".as_ref());
        let file_appender = tracing_appender::rolling::daily(log_dir, log_filename);
        tracing_appender::non_blocking(file_appender)
    }
}

/// Initializes the global tracing subscriber from environment variables.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the process when file output is enabled.
pub fn init_subscriber() -> Option<WorkerGuard> {
    init_with_settings(&LogSettings::from_env())
}

/// Initializes the global tracing subscriber from explicit settings.
pub fn init_with_settings(settings: &LogSettings) -> Option<WorkerGuard> {
    let subscriber = registry().with(settings.env_filter());
    let is_json = settings.json;

    match (settings.output.uses_console(), settings.output.uses_file()) {
        (true, true) => {
            let (non_blocking, guard) = settings.file_writer();
            let tee_writer = MakeTee {
                make_a: std::io::stdout,
                make_b: non_blocking,
            };
            let fmt_layer = tracing_subscriber::fmt::layer().with_writer(tee_writer);
            if is_json {
                subscriber.with(fmt_layer.json()).init();
            } else {
                subscriber.with(fmt_layer).init();
            }
            Some(guard)
        }
        (true, false) => {
            let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);
            if is_json {
                subscriber.with(fmt_layer.json()).init();
            } else {
                subscriber.with(fmt_layer).init();
            }
            None
        }
        (false, true) => {
            let (non_blocking, guard) = settings.file_writer();
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking);
            if is_json {
                subscriber.with(fmt_layer.json()).init();
            } else {
                subscriber.with(fmt_layer).init();
            }
            Some(guard)
        }
        (false, false) => {
            subscriber.init();
            None
        }
    }
}
