use ct2_bridge::BridgeError;
use thiserror::Error;

/// Error types for offline machine translation
#[derive(Error, Debug)]
pub enum MtError {
    /// Failure in the translation adapter or its engine
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    /// Error while loading or running a tokenizer
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// The model family cannot translate this language pair
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Malformed locale code
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),

    /// Error during translation phase
    #[error("Translation error: {0}")]
    TranslationError(String),

    /// Configuration error (bad value, unknown engine, missing directory)
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Network(#[from] reqwest::Error),

    /// Model files could not be fetched
    #[error("Download error: {0}")]
    Download(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for MT operations
pub type MtResult<T> = Result<T, MtError>;
