use thiserror::Error;

#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("Schema parse error: {0}")]
    SchemaParse(String),

    #[error("Document parse error in {file}: {message}")]
    DocumentParse { file: String, message: String },

    #[error("Invalid schema:\n{}", .0.join("\n"))]
    InvalidSchema(Vec<String>),

    #[error("Invalid documents:\n{}", .0.join("\n"))]
    InvalidDocuments(Vec<String>),

    #[error("Checks failed:\n{}", .0.join("\n"))]
    CheckFailed(Vec<String>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Code generation error: {0}")]
    Codegen(String),

    #[error("Introspection error: {0}")]
    Introspection(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Server error: {0}")]
    Server(String),
}

impl From<toml::de::Error> for MirrorError {
    fn from(err: toml::de::Error) -> Self {
        MirrorError::Config(format!("TOML parse error: {}", err))
    }
}

impl From<toml::ser::Error> for MirrorError {
    fn from(err: toml::ser::Error) -> Self {
        MirrorError::Serialization(format!("TOML serialization error: {}", err))
    }
}

impl From<config::ConfigError> for MirrorError {
    fn from(err: config::ConfigError) -> Self {
        MirrorError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MirrorError>;
