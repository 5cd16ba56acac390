//! Logger setup.
//!
//! `log` facade with an `env_logger` backend. The level comes from `RUST_LOG`
//! when it is set, otherwise from the CLI flags:
//!
//! | flags   | level |
//! |---------|-------|
//! | `-q`    | error |
//! | (none)  | info  |
//! | `-v`    | debug |
//! | `-vv`   | trace |
//!
//! Debug builds prefix each line with a timestamp, and with the module path
//! when verbose. Release builds print level and message only.

use std::io::Write;

use env_logger::Builder;
use log::LevelFilter;

/// Initialize the global logger.
///
/// Returns `false` if a logger was already installed (e.g. a second
/// `run_app` call in the same test process); the existing logger is kept.
pub fn init_logging(verbose: u8, quiet: bool) -> bool {
    let mut builder = Builder::new();

    let from_env = std::env::var_os("RUST_LOG").is_some();
    if from_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }
    configure_format(&mut builder, verbose);

    let installed = builder.try_init().is_ok();
    if installed {
        log::debug!(
            "Logging initialized at {} ({})",
            current_level_name(),
            if from_env { "RUST_LOG" } else { "CLI flags" }
        );
    }
    installed
}

/// Map CLI verbosity flags to a level filter. `quiet` wins over `verbose`.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

#[cfg(debug_assertions)]
fn configure_format(builder: &mut Builder, verbose: u8) {
    builder.format(move |buf, record| {
        let level = record.level();
        let style = buf.default_level_style(level);
        let timestamp = buf.timestamp_seconds();
        if verbose > 0 {
            writeln!(
                buf,
                "{timestamp} {style}{level:<5}{style:#} [{}] {}",
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        } else {
            writeln!(buf, "{timestamp} {style}{level:<5}{style:#} {}", record.args())
        }
    });
}

#[cfg(not(debug_assertions))]
fn configure_format(builder: &mut Builder, _verbose: u8) {
    builder.format(|buf, record| {
        let level = record.level();
        let style = buf.default_level_style(level);
        writeln!(buf, "{style}{level:<5}{style:#} {}", record.args())
    });
}

/// Name of the currently active maximum log level.
#[must_use]
fn current_level_name() -> &'static str {
    match log::max_level() {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}
