//! Logger setup plus conditional logging macros that check a module-level
//! `ENABLE_LOGS` flag.
//!
//! Usage:
//! ```rust,ignore
//! // In your module, define the flag first:
//! const ENABLE_LOGS: bool = true;
//!
//! // Then use the macros (they're exported at the crate root):
//! crate::log_info!("This will log if ENABLE_LOGS is true");
//! ```

/// Installs `env_logger` with an `Info` default; `RUST_LOG` overrides it.
/// Safe to call more than once.
pub fn init() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_target(false)
        .try_init();
}

/// Macro for conditional info logging.
/// Checks the `ENABLE_LOGS` const in the calling module.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// Macro for conditional warn logging.
/// Checks the `ENABLE_LOGS` const in the calling module.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

/// Macro for conditional error logging.
/// Checks the `ENABLE_LOGS` const in the calling module.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}
