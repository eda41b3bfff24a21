//! CLI output and logging
//!
//! Colored rendering of reports on stdout and `log` setup for diagnostics
//! on stderr.

pub mod display;
pub mod logging;

pub use display::print_run_header;
pub use logging::init as init_logging;
