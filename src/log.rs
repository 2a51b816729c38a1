//! Logging shim.
//!
//! With the `tracing` feature the `debug!`, `info!` and `warn!` macros are the
//! `tracing` ones, structured fields included. Without it they evaluate to
//! `()`, so they can sit in statement or expression position (a bare match
//! arm, say) either way. The fields are still referenced from a closure that
//! never runs, which keeps bindings such as an `error` that only gets logged
//! counted as used.
//!
//! Call sites import from here, never from `tracing` directly:
//!
//! ```ignore
//! use crate::log::warn;
//! warn!(request = %id, %error, "diagram replaced by placeholder");
//! ```

#[cfg(feature = "tracing")]
pub use tracing::{debug, info, warn};

/// Touches every field value of a tracing-style argument list.
#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! __boardprint_fields {
    () => {};
    ($message:literal $(, $($arg:expr),* $(,)?)?) => {
        $($(let _ = &$arg;)*)?
    };
    (%$field:ident $(, $($rest:tt)*)?) => {
        let _ = &$field;
        $($crate::__boardprint_fields!($($rest)*);)?
    };
    (?$field:ident $(, $($rest:tt)*)?) => {
        let _ = &$field;
        $($crate::__boardprint_fields!($($rest)*);)?
    };
    ($key:ident = %$value:expr $(, $($rest:tt)*)?) => {
        let _ = &$value;
        $($crate::__boardprint_fields!($($rest)*);)?
    };
    ($key:ident = ?$value:expr $(, $($rest:tt)*)?) => {
        let _ = &$value;
        $($crate::__boardprint_fields!($($rest)*);)?
    };
    ($key:ident = $value:expr $(, $($rest:tt)*)?) => {
        let _ = &$value;
        $($crate::__boardprint_fields!($($rest)*);)?
    };
    ($field:ident $(, $($rest:tt)*)?) => {
        let _ = &$field;
        $($crate::__boardprint_fields!($($rest)*);)?
    };
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! __boardprint_debug {
    ($($arg:tt)*) => {{
        let _ = || {
            $crate::__boardprint_fields!($($arg)*);
        };
    }};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! __boardprint_info {
    ($($arg:tt)*) => {{
        let _ = || {
            $crate::__boardprint_fields!($($arg)*);
        };
    }};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! __boardprint_warn {
    ($($arg:tt)*) => {{
        let _ = || {
            $crate::__boardprint_fields!($($arg)*);
        };
    }};
}

#[cfg(not(feature = "tracing"))]
pub use crate::{
    __boardprint_debug as debug, __boardprint_info as info, __boardprint_warn as warn,
};
