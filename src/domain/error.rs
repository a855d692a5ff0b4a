//! Domain error types.

/// Top-level error type for altair.
#[derive(Debug, thiserror::Error)]
pub enum AltairError {
    #[error("data unavailable for {ticker}: {reason}")]
    DataUnavailable { ticker: String, reason: String },

    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    #[error("no position for {ticker}")]
    NotFound { ticker: String },

    #[error("no current price for {ticker}")]
    PriceUnavailable { ticker: String },

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

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to format output")]
    Format(#[from] std::fmt::Error),
}

impl AltairError {
    pub fn data_unavailable(ticker: &str, reason: impl Into<String>) -> Self {
        AltairError::DataUnavailable {
            ticker: ticker.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        AltairError::InvalidParameter {
            reason: reason.into(),
        }
    }

    /// True for errors the caller should degrade around rather than abort on.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AltairError::DataUnavailable { .. } | AltairError::PriceUnavailable { .. }
        )
    }
}

impl From<&AltairError> for std::process::ExitCode {
    fn from(err: &AltairError) -> Self {
        let code: u8 = match err {
            AltairError::Io(_) | AltairError::Format(_) => 1,
            AltairError::ConfigParse { .. }
            | AltairError::ConfigMissing { .. }
            | AltairError::ConfigInvalid { .. } => 2,
            AltairError::InvalidParameter { .. } => 3,
            AltairError::DataUnavailable { .. } => 4,
            AltairError::NotFound { .. } | AltairError::PriceUnavailable { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
