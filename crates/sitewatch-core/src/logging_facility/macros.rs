//! Operation logging macros
//!
//! Every operation logs a `start` event and exactly one of `end` or
//! `end_error`, each tagged with `component` (the calling module) and `op`.
//! Extra `key = value` fields are passed through to `tracing` unchanged.

/// Shared expansion of the three public macros
#[doc(hidden)]
#[macro_export]
macro_rules! __log_op_event {
    ($level:ident, $op:expr, $event:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            $($($field)*,)?
            component = module_path!(),
            op = $op,
            event = $event
        )
    };
}

/// Log the start of an operation
///
/// ```
/// # use sitewatch_core::log_op_start;
/// log_op_start!("check_target");
/// log_op_start!("check_target", state_key = "example.com_docs");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_event!(
            info,
            $op,
            $crate::core_types::schema::EVENT_START
            $(, $($field)*)?
        )
    };
}

/// Log the successful end of an operation; `duration_ms` is mandatory
///
/// ```
/// # use sitewatch_core::log_op_end;
/// log_op_end!("check_target", duration_ms = 42, changed = false);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_event!(
            info,
            $op,
            $crate::core_types::schema::EVENT_END,
            duration_ms = $duration
            $(, $($field)*)?
        )
    };
}

/// Log a failed operation with its stable error code
///
/// `$err` may be an `ExError` or anything converting into one, such as
/// `WatchError`. It is cloned, so the caller keeps ownership.
///
/// ```
/// # use sitewatch_core::log_op_error;
/// # use sitewatch_core::errors::{ExError, ExErrorKind};
/// let err = ExError::new(ExErrorKind::Persistence).with_message("disk full");
/// log_op_error!("check_target", err, duration_ms = 10);
/// assert_eq!(err.code(), "ERR_PERSISTENCE");
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = ::core::clone::Clone::clone(&$err).into();
        $crate::__log_op_event!(
            error,
            $op,
            $crate::core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            error = %ex_err
            $(, $($field)*)?
        );
    }};
}
