use thiserror::Error;

#[derive(Error, Debug)]
pub enum EstError {
    /// Bad construction input (empty environment, missing settings file).
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// The settings table could not be read as CSV.
    #[error("Settings format error: {0}")]
    Format(String),

    /// The settings table is readable but describes an invalid setup.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Lookup error: {0}")]
    Lookup(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, EstError>;
