//! log4rs setup for processes embedding the compiler.
//!
//! The library itself only emits through the `log` facade. Compile diagnostics go to the
//! `gridquery::compile` target and executed plans to `gridquery::query`; the helpers here route
//! each target to its own rolling file.

use log::LevelFilter;
use log4rs::Handle;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

type BoxError = Box<dyn std::error::Error>;

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";
const ROLL_SIZE: u64 = 10 * 1024 * 1024;
const DEFAULT_RETENTION: u32 = 7;

static HANDLE: Mutex<Option<Handle>> = parking_lot::const_mutex(None);

/// Initializes logging from a log4rs config file.
///
/// # Errors
/// Returns an error if the file cannot be read or a logger is already installed.
pub fn init_path(path: &Path) -> Result<(), BoxError> {
    log4rs::init_file(path, log4rs::config::Deserializers::default())?;
    Ok(())
}

/// Maps `error|warn|info|debug|trace|off` to a level; anything else is `info`.
#[must_use]
pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn rolling(base: &Path, stem: &str, keep: u32) -> Result<RollingFileAppender, BoxError> {
    let roller = FixedWindowRoller::builder()
        .build(&format!("{}", base.join(format!("{stem}.{{}}.log")).display()), keep)?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE)), Box::new(roller));
    Ok(RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(base.join(format!("{stem}.log")), Box::new(policy))?)
}

/// Configures logging for the process, replacing any configuration installed by an earlier call.
///
/// - `dir`: directory for log files; the current directory if `None`.
/// - `level`: see [`parse_level`]; `info` if `None`.
/// - `retention`: rolled files kept per log (default 7).
///
/// Writes `app.log`, plus `compile.log` and `query.log` for the compiler and executor targets.
///
/// # Errors
/// Returns an error if the directory or a log file cannot be created, or if a non-log4rs
/// logger is already installed.
pub fn configure_logging(
    dir: Option<&Path>,
    level: Option<&str>,
    retention: Option<usize>,
) -> Result<(), BoxError> {
    let base = match dir {
        Some(d) => PathBuf::from(d),
        None => std::env::current_dir()?,
    };
    std::fs::create_dir_all(&base)?;
    let keep = retention.map_or(DEFAULT_RETENTION, |r| u32::try_from(r).unwrap_or(u32::MAX));
    let lvl = level.map_or(LevelFilter::Info, parse_level);

    let config = Config::builder()
        .appender(Appender::builder().build("app", Box::new(rolling(&base, "app", keep)?)))
        .appender(Appender::builder().build("compile", Box::new(rolling(&base, "compile", keep)?)))
        .appender(Appender::builder().build("query", Box::new(rolling(&base, "query", keep)?)))
        .logger(Logger::builder().appender("compile").additive(false).build("gridquery::compile", lvl))
        .logger(Logger::builder().appender("query").additive(false).build("gridquery::query", lvl))
        .build(Root::builder().appender("app").build(lvl))?;

    let mut slot = HANDLE.lock();
    if let Some(handle) = slot.as_ref() {
        handle.set_config(config);
    } else {
        *slot = Some(log4rs::init_config(config)?);
    }
    Ok(())
}

/// Configures logging from `GRIDQUERY_LOG_DIR`, `GRIDQUERY_LOG_LEVEL` and
/// `GRIDQUERY_LOG_RETENTION`, each optional.
///
/// # Errors
/// See [`configure_logging`].
pub fn configure_from_env() -> Result<(), BoxError> {
    let dir = std::env::var("GRIDQUERY_LOG_DIR").ok().map(PathBuf::from);
    let level = std::env::var("GRIDQUERY_LOG_LEVEL").ok();
    let retention =
        std::env::var("GRIDQUERY_LOG_RETENTION").ok().and_then(|s| s.parse::<usize>().ok());
    configure_logging(dir.as_deref(), level.as_deref(), retention)
}
