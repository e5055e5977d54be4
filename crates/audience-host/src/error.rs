//! Error types for the host boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("type not found: {0}")]
    MissingType(String),

    #[error("method not found: {owner}#{name}")]
    MissingMethod { owner: String, name: String },

    #[error("field not found: {owner}#{name}")]
    MissingField { owner: String, name: String },

    #[error("constructor not found: {owner}({params})")]
    MissingConstructor { owner: String, params: String },

    #[error("{0} is not an enumeration")]
    NotAnEnum(String),

    #[error("host call failed: {0}")]
    Invocation(String),

    #[error("invalid host manifest: {0}")]
    Manifest(#[from] toml::de::Error),

    #[error("host io error: {0}")]
    Io(#[from] std::io::Error),
}
