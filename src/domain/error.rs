//! Engine error types.

/// Top-level error type for backtally.
#[derive(Debug, thiserror::Error)]
pub enum BacktallyError {
    #[error("portfolio has no stocks to simulate")]
    EmptyPortfolio,

    #[error("no historical data for {code} in the requested range")]
    NoHistoricalData { code: String },

    #[error("{metric} is undefined for this value series")]
    UndefinedMetric { metric: String },

    #[error("invalid input range: {reason}")]
    InvalidRange { reason: String },

    #[error("at least one signal factor must be selected")]
    EmptyFactorSet,

    #[error("unknown signal factor: {label}")]
    UnknownFactor { label: String },

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

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BacktallyError {
    /// Process exit status for this error kind.
    pub fn exit_status(&self) -> u8 {
        match self {
            BacktallyError::Io(_) => 1,
            BacktallyError::ConfigParse { .. }
            | BacktallyError::ConfigMissing { .. }
            | BacktallyError::ConfigInvalid { .. } => 2,
            BacktallyError::Data { .. } => 3,
            BacktallyError::InvalidRange { .. }
            | BacktallyError::EmptyFactorSet
            | BacktallyError::UnknownFactor { .. }
            | BacktallyError::UndefinedMetric { .. } => 4,
            BacktallyError::EmptyPortfolio | BacktallyError::NoHistoricalData { .. } => 5,
        }
    }
}

impl From<&BacktallyError> for std::process::ExitCode {
    fn from(err: &BacktallyError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
