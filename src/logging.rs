//! Logging setup for dupesweep.
//!
//! Engine code logs through the `log` facade; the binary installs an
//! `env_logger` backend here. The effective level is chosen as:
//!
//! 1. `RUST_LOG`, when set
//! 2. `--quiet`: errors only
//! 3. `-v`: debug, `-vv`: trace
//! 4. otherwise info
//!
//! Debug builds prefix each line with a timestamp (and the module path from
//! `-v` upward). Release builds print `LEVEL message`.

use std::env;
use std::io::Write;

use env_logger::Builder;
use log::LevelFilter;

/// Install the global logger.
///
/// Returns `false` if a logger was already installed, which happens when
/// several tests drive the binary entry point in one process.
///
/// ```rust,no_run
/// use dupesweep::logging::init_logging;
///
/// init_logging(1, false);
/// log::debug!("visible with -v");
/// ```
pub fn init_logging(verbose: u8, quiet: bool) -> bool {
    let mut builder = Builder::new();

    let from_env = env::var_os("RUST_LOG").is_some();
    if from_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(level_for(verbose, quiet));
    }

    apply_format(&mut builder, verbose);

    let installed = builder.try_init().is_ok();
    if installed {
        log::debug!(
            "Logging initialized at {} (from {})",
            log::max_level(),
            if from_env { "RUST_LOG" } else { "CLI flags" }
        );
    }
    installed
}

/// Level selected by the verbosity flags alone.
fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

#[cfg(debug_assertions)]
fn apply_format(builder: &mut Builder, verbose: u8) {
    builder.format(move |buf, record| {
        let style = buf.default_level_style(record.level());
        let timestamp = buf.timestamp_seconds();
        if verbose == 0 {
            writeln!(
                buf,
                "{} {style}{:<5}{style:#} {}",
                timestamp,
                record.level(),
                record.args()
            )
        } else {
            writeln!(
                buf,
                "{} {style}{:<5}{style:#} [{}] {}",
                timestamp,
                record.level(),
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        }
    });
}

#[cfg(not(debug_assertions))]
fn apply_format(builder: &mut Builder, _verbose: u8) {
    builder.format(|buf, record| {
        let style = buf.default_level_style(record.level());
        writeln!(buf, "{style}{:<5}{style:#} {}", record.level(), record.args())
    });
}
