//! Error types for swiped

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("trace error: {0}")]
    Trace(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Rejected configuration from element attributes or the settings file
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{attribute}=\"{value}\" is not a base-10 integer")]
    InvalidNumber {
        attribute: &'static str,
        value: String,
    },

    #[error("threshold {0} must be a finite number >= 0")]
    InvalidThreshold(String),
}

pub type Result<T> = std::result::Result<T, Error>;
