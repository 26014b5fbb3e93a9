//! Overlay configuration

use serde::{Deserialize, Serialize};

use crate::types::Color;

/// Configuration for the overlay layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// How often script draw callbacks run, in Hz
    pub script_rate_hz: f64,
    /// Capacity of each font's shaped-text cache
    pub layout_cache_capacity: usize,
    /// Color the overlay surface is cleared to before a repaint
    pub clear_color: Color,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            script_rate_hz: 60.0,
            layout_cache_capacity: 100,
            clear_color: Color::TRANSPARENT,
        }
    }
}

impl OverlayConfig {
    /// Script tick interval derived from the configured rate
    pub fn script_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.script_rate_hz)
    }
}
