//! Logging shims.
//!
//! Records go to `defmt` when that feature is enabled, to `tracing` on std
//! builds, and are discarded otherwise. Format strings must stay within the
//! subset both backends accept: plain `{}` placeholders over primitives and
//! `&str`.

#![allow(unused_macros)]

macro_rules! log_with {
    ($level:ident, $($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::$level!($($arg)*);
        #[cfg(all(feature = "std", not(feature = "defmt")))]
        ::tracing::$level!($($arg)*);
        #[cfg(not(any(feature = "std", feature = "defmt")))]
        {
            let _ = ::core::format_args!($($arg)*);
        }
    }};
}

macro_rules! trace {
    ($($arg:tt)*) => { log_with!(trace, $($arg)*) };
}

macro_rules! debug {
    ($($arg:tt)*) => { log_with!(debug, $($arg)*) };
}

macro_rules! info {
    ($($arg:tt)*) => { log_with!(info, $($arg)*) };
}

macro_rules! warn {
    ($($arg:tt)*) => { log_with!(warn, $($arg)*) };
}

macro_rules! error {
    ($($arg:tt)*) => { log_with!(error, $($arg)*) };
}
