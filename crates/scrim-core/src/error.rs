//! Error types for the Scrim overlay layer

use thiserror::Error;

/// Main error type for Scrim operations
#[derive(Debug, Error)]
pub enum ScrimError {
    #[error("Resource error: {0}")]
    Resource(String),

    #[error("Script error: {0}")]
    Script(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Device error: {0}")]
    Device(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScrimError {
    /// Create a resource error from a string
    pub fn resource<S: Into<String>>(msg: S) -> Self {
        Self::Resource(msg.into())
    }

    /// Create a script error from a string
    pub fn script<S: Into<String>>(msg: S) -> Self {
        Self::Script(msg.into())
    }

    /// Create a render error from a string
    pub fn render<S: Into<String>>(msg: S) -> Self {
        Self::Render(msg.into())
    }

    /// Create a device error from a string
    pub fn device<S: Into<String>>(msg: S) -> Self {
        Self::Device(msg.into())
    }

    /// Create a configuration error from a string
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
}

/// Result type alias for Scrim operations
pub type Result<T> = std::result::Result<T, ScrimError>;
