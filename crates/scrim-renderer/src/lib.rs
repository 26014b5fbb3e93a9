//! Frame-differenced overlay rendering for Scrim
//!
//! The consumer side of the overlay: a positional geometry cache that
//! turns each frame's command stream into minimal raster work, a
//! dual-rate scheduler decoupling script ticks from presentation, and the
//! compositing bridge that blits the shared overlay texture onto the
//! host's frame every present.

pub mod bridge;
pub mod context;
pub mod geometry;
pub mod gpu;
pub mod painter;
pub mod scheduler;
pub mod target;

pub use bridge::{CompositingBridge, SurfaceDesc};
pub use context::{
    DrawCallback, FrameTimings, InitCallback, OverlayContext, ResourceContext,
};
pub use gpu::{FrameRecorder, RasterBackend};
pub use painter::{PaintStats, Painter};
pub use scheduler::{Clock, DeadlineClock, FrameScheduler, MonotonicClock, TickState};
pub use target::DrawTarget;
