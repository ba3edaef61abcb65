//! Logger setup shared by the command-line tools

use log::{LevelFilter, debug};

/// Initialize the logger. Warnings only by default, debug output with `verbose`.
/// `RUST_LOG` directives, when set, take precedence over that level.
pub fn init_logger(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let initialized = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .try_init()
        .is_ok();

    if initialized {
        debug!("Logger initialized with level: {level:?}");
    }
}
