use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] histfeed_core::ConfigError),

    #[error(transparent)]
    InstrumentId(#[from] histfeed_core::InstrumentIdError),

    #[error("environment variable {var} is not set")]
    MissingApiKey { var: &'static str },

    #[error("transport setup failed: {0}")]
    Transport(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::InstrumentId(_) => 2,
            Self::MissingApiKey { .. } => 3,
            Self::Transport(_) => 4,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}
