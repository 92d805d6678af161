//! Diagnostics.
//!
//! Two independent mechanisms, for two different audiences:
//!
//! - Compile-time-silenced tracing macros (`debug_log!`, `debug_error!`,
//!   `debug_warn!`, `debug_trace!`), gated behind the `dev-log` feature and
//!   compiled to nothing otherwise. These are for contributors developing
//!   this crate.
//! - A runtime toggle, the `CORVID_DEBUG` environment variable, read once
//!   and cached, that an *embedding application*'s end users can set to see
//!   why their argv was rejected without recompiling anything. This is the
//!   diagnostics toggle [`crate::matcher`] consults when building a
//!   [`crate::report::NoMatchReport`].

use once_cell::sync::Lazy;

/// Whether `CORVID_DEBUG` is set to a truthy value in the current process.
///
/// Read once on first use; later changes to the environment are not
/// observed, matching the rest of this crate's "decide once, then treat as
/// immutable" convention.
pub static DEBUG_ENABLED: Lazy<bool> = Lazy::new(|| {
    std::env::var("CORVID_DEBUG")
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
});

/// Emit a rejection-trace line if `CORVID_DEBUG` is enabled.
#[macro_export]
macro_rules! trace_rejection {
    ($($arg:tt)*) => {
        if *$crate::debug::DEBUG_ENABLED {
            eprintln!("[corvid] {}", format!($($arg)*));
        }
    };
}

/// General-purpose debug logging macro, compiled out unless `dev-log` is enabled.
#[macro_export]
#[cfg(feature = "dev-log")]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        println!("[DEBUG] {}", format!($($arg)*));
    };
}

#[macro_export]
#[cfg(not(feature = "dev-log"))]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

/// Error logging macro for recoverable errors, compiled out unless `dev-log` is enabled.
#[macro_export]
#[cfg(feature = "dev-log")]
macro_rules! debug_error {
    ($($arg:tt)*) => {
        eprintln!("[ERROR] {}", format!($($arg)*));
    };
}

#[macro_export]
#[cfg(not(feature = "dev-log"))]
macro_rules! debug_error {
    ($($arg:tt)*) => {};
}

/// Warning logging macro, compiled out unless `dev-log` is enabled.
#[macro_export]
#[cfg(feature = "dev-log")]
macro_rules! debug_warn {
    ($($arg:tt)*) => {
        eprintln!("[WARN] {}", format!($($arg)*));
    };
}

#[macro_export]
#[cfg(not(feature = "dev-log"))]
macro_rules! debug_warn {
    ($($arg:tt)*) => {};
}

/// Detailed trace logging, compiled out unless `dev-log` is enabled.
#[macro_export]
#[cfg(feature = "dev-log")]
macro_rules! debug_trace {
    ($($arg:tt)*) => {
        println!("[TRACE] {}", format!($($arg)*));
    };
}

#[macro_export]
#[cfg(not(feature = "dev-log"))]
macro_rules! debug_trace {
    ($($arg:tt)*) => {};
}
