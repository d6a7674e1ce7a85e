//! Logging shorthands.
//!
//! Thin wrappers over `tracing` so every crate logs with the same targets.
//! The terminal formatter keys its symbols off these targets.

pub const SUCCESS_TARGET: &str = "huntr::success";
pub const PRINT_TARGET: &str = "huntr::print";

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::tracing::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::tracing::info!(target: "huntr::success", $($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::tracing::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::tracing::error!($($arg)*)
    };
}
