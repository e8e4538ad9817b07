use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// The record carries no usable `_id`/`id`; the only fatal condition for a single record.
    #[error("Record has no identity field")]
    MissingIdentity,

    #[error("Invalid raw record: {reason}")]
    InvalidRecord { reason: String },

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown view consumer: {0}")]
    UnknownView(String),
}

impl PipelineError {
    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::MissingIdentity => "missing_identity",
            PipelineError::InvalidRecord { .. } => "invalid_record",
            PipelineError::Toml(_) => "toml",
            PipelineError::Config(_) => "config",
            PipelineError::UnknownView(_) => "unknown_view",
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
