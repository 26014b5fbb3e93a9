//! Scrim - script-driven 2D overlay drawing
//!
//! Scrim renders an immediate-mode vector overlay on top of a host
//! application's swapchain. Scripts emit draw commands at their own rate;
//! a positional frame-differencing cache rasterizes only what changed, and
//! the resident overlay texture is composited onto every presented frame.

pub use scrim_core;
pub use scrim_draw;
pub use scrim_renderer;

/// Unified prelude module that exports all commonly used types
pub mod prelude {
    pub use scrim_core::prelude::*;
    pub use scrim_draw::{Command, DrawList, DrawScope, Font, Image};
    pub use scrim_renderer::{
        DrawTarget, FrameScheduler, OverlayContext, PaintStats, Painter, SurfaceDesc,
    };
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
