//! Error types for cursor, compiler and streaming operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Wire protocol error: {0}")]
    Protocol(String),

    #[error("Compilation error: {0}")]
    Compile(String),

    #[error("Tool \"{0}\" has not been defined")]
    ToolMissing(String),

    #[error("Handshake timed out after {0} s")]
    HandshakeTimeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
