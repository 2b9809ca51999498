use thiserror::Error;

#[derive(Error, Debug)]
pub enum FoliageError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Tile simulation has not been initialized")]
    NotInitialized,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, FoliageError>;
