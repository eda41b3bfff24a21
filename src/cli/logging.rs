//! Diagnostic logging
//!
//! Reports are printed to stdout; diagnostics go through `log` to stderr so
//! they never end up in a piped report.

use std::sync::Once;

use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};

static LOGGING_INIT_ONCE: Once = Once::new();

/// Log level for a `-v` count: warnings by default, `-v` info, `-vv` and up debug
#[must_use]
pub const fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

/// Initialize stderr logging. Does nothing if logging is already initialized.
pub fn init(verbosity: u8) {
    LOGGING_INIT_ONCE.call_once(|| {
        let config = ConfigBuilder::new()
            .set_time_level(LevelFilter::Off)
            .set_target_level(LevelFilter::Off)
            .set_location_level(LevelFilter::Trace)
            .build();
        if let Err(e) = TermLogger::init(
            level_for(verbosity),
            config,
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ) {
            eprintln!("logging disabled: {e}");
        }
    });
}
