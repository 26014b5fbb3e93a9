//! Core functionality for the Scrim overlay layer
//!
//! This crate provides the building blocks shared by the drawing and
//! rendering crates: color handling, configuration, error types and
//! logging setup.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::OverlayConfig;
pub use error::{Result, ScrimError};
pub use types::Color;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        config::OverlayConfig,
        error::{Result, ScrimError},
        types::Color,
    };
}

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
