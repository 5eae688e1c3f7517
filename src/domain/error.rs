//! Domain error types.

/// Top-level error type for tradecore.
#[derive(Debug, thiserror::Error)]
pub enum TradecoreError {
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("value not set for indicator {indicator}")]
    ValueNotSet { indicator: String },

    #[error("dependency cycle through indicator {indicator}")]
    DependencyCycle { indicator: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("event parse error at line {line}: {reason}")]
    EventParse { line: usize, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TradecoreError {
    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        TradecoreError::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub(crate) fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        TradecoreError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&TradecoreError> for std::process::ExitCode {
    fn from(err: &TradecoreError) -> Self {
        let code: u8 = match err {
            TradecoreError::Io(_) => 1,
            TradecoreError::ConfigParse { .. }
            | TradecoreError::ConfigMissing { .. }
            | TradecoreError::ConfigInvalid { .. } => 2,
            TradecoreError::EventParse { .. } => 3,
            TradecoreError::InvalidArgument { .. }
            | TradecoreError::ValueNotSet { .. }
            | TradecoreError::DependencyCycle { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
