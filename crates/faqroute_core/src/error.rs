use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FaqError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Invalid config file: {0}")]
    Config(#[from] toml::de::Error),

    #[error("No API key found. Set OPENROUTER_API_KEY or OPENAI_API_KEY")]
    MissingCredential,

    #[error("Invalid retrieval parameter: {0}")]
    InvalidParams(String),

    #[error("Unknown category: {0} (expected HR, Finance or IT)")]
    UnknownCategory(String),

    #[error("Provider {0} returned an empty completion")]
    EmptyCompletion(String),

    #[error("All {0} completion providers failed")]
    ProvidersExhausted(usize),
}

pub type Result<T> = std::result::Result<T, FaqError>;
