use thiserror::Error;

#[derive(Error, Debug)]
pub enum FuseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Cannot unpack sentence: {0}")]
    Unpack(String),

    #[error("Checksum mismatch: expected {expected:02X}, got {actual:02X}")]
    Checksum { expected: u8, actual: u8 },

    #[error("Render failed: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, FuseError>;
