use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubnormError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported text encoding: {0}")]
    Encoding(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unparsable dialogue at line {line_number}: {line}")]
    UnparsableLine { line_number: usize, line: String },

    #[error("Degenerate duration: end {end} is not after start {start}")]
    DegenerateDuration { start: String, end: String },
}

pub type Result<T> = std::result::Result<T, SubnormError>;
