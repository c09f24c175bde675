//! Field keys and event names shared by the logging macros and their tests

pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_STATE_KEY: &str = "state_key";
pub const FIELD_ERR_CODE: &str = "err_code";

/// Lifecycle of one logged operation
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
