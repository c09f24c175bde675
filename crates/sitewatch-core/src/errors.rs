//! Error handling
//!
//! [`ExError`] is the structured error passed across crate boundaries: a
//! stable [`ExErrorKind`] code plus operation and entity context. Loading
//! and resolving configuration produce the narrower [`WatchError`], which
//! converts into it.

use thiserror::Error;

/// Result of configuration loading and target resolution
pub type Result<T> = std::result::Result<T, WatchError>;

/// Error classification
///
/// Each kind maps to a stable error code usable in logs, tests and the
/// orchestrator-facing run outcome. Acquisition failures are deliberately
/// absent: a failed fetch becomes error-state content, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Configuration
    ConfigNotFound,
    InvalidConfig,
    InvalidTemplate,
    UnresolvableTarget,
    DuplicateStateKey,

    // Storage
    Io,
    Persistence,
    HistoryConflict,

    // Notification delivery
    Delivery,
    Timeout,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// `ERR_*` code written to logs and reports
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::ConfigNotFound => "ERR_CONFIG_NOT_FOUND",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::InvalidTemplate => "ERR_INVALID_TEMPLATE",
            ExErrorKind::UnresolvableTarget => "ERR_UNRESOLVABLE_TARGET",
            ExErrorKind::DuplicateStateKey => "ERR_DUPLICATE_STATE_KEY",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::HistoryConflict => "ERR_HISTORY_CONFLICT",
            ExErrorKind::Delivery => "ERR_DELIVERY",
            ExErrorKind::Timeout => "ERR_TIMEOUT",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Structured error
///
/// Carries a classification for programmatic handling plus the context
/// needed to tell which target or delivery the failure belongs to.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    message: String,
}

impl ExError {
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            message: String::new(),
        }
    }

    /// Name of the operation that failed, e.g. `append_snapshot`
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// A state key, target label, recipient or webhook hint
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        match (&self.op, &self.entity_id) {
            (Some(op), Some(entity)) => write!(f, " {} {}", op, entity)?,
            (Some(op), None) => write!(f, " {}", op)?,
            (None, Some(entity)) => write!(f, " {}", entity)?,
            (None, None) => {}
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

/// Domain error taxonomy for configuration and target resolution
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WatchError {
    /// Configuration file does not exist
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration file exists but cannot be parsed or validated
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Webhook payload template is not valid JSON or uses an unknown placeholder
    #[error("Invalid webhook template: {reason}")]
    InvalidTemplate { reason: String },

    /// Target has no usable source or no canonical URL can be derived
    #[error("Target cannot be resolved ({target}): {reason}")]
    UnresolvableTarget { target: String, reason: String },

    /// Two targets map onto the same state key
    #[error("Target {target} shares state key {state_key} with an earlier target")]
    DuplicateStateKey { target: String, state_key: String },
}

impl From<WatchError> for ExError {
    fn from(err: WatchError) -> Self {
        match err {
            WatchError::ConfigNotFound { path } => ExError::new(ExErrorKind::ConfigNotFound)
                .with_entity_id(path)
                .with_op("load_config")
                .with_message("Configuration file not found"),

            WatchError::InvalidConfig { reason } => ExError::new(ExErrorKind::InvalidConfig)
                .with_op("load_config")
                .with_message(reason),

            WatchError::InvalidTemplate { reason } => ExError::new(ExErrorKind::InvalidTemplate)
                .with_op("parse_webhook_template")
                .with_message(reason),

            WatchError::UnresolvableTarget { target, reason } => {
                ExError::new(ExErrorKind::UnresolvableTarget)
                    .with_entity_id(target)
                    .with_op("resolve_target")
                    .with_message(reason)
            }

            WatchError::DuplicateStateKey { target, state_key } => {
                ExError::new(ExErrorKind::DuplicateStateKey)
                    .with_entity_id(target)
                    .with_op("resolve_target")
                    .with_message(format!("State key {} already in use", state_key))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_codes_are_unique() {
        let kinds = [
            ExErrorKind::ConfigNotFound,
            ExErrorKind::InvalidConfig,
            ExErrorKind::InvalidTemplate,
            ExErrorKind::UnresolvableTarget,
            ExErrorKind::DuplicateStateKey,
            ExErrorKind::Io,
            ExErrorKind::Persistence,
            ExErrorKind::HistoryConflict,
            ExErrorKind::Delivery,
            ExErrorKind::Timeout,
            ExErrorKind::Internal,
        ];
        let mut codes: Vec<&str> = kinds.iter().map(|k| k.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
    }

    #[test]
    fn test_display_includes_code_op_and_entity() {
        let err = ExError::new(ExErrorKind::Persistence)
            .with_op("append_snapshot")
            .with_entity_id("example.com_docs")
            .with_message("disk full");
        let rendered = err.to_string();
        assert!(rendered.starts_with("[ERR_PERSISTENCE]"));
        assert!(rendered.contains("append_snapshot"));
        assert!(rendered.contains("disk full"));
        assert!(rendered.contains("example.com_docs"));
    }
}
