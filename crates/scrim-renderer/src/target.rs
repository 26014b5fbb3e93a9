//! Drawing context abstraction
//!
//! The painter executes draw calls against this trait instead of a
//! concrete GPU surface, so the cache logic runs (and is tested) without a
//! device. The wgpu-backed implementation lives in [`crate::gpu`].

use std::sync::Arc;

use lyon::path::Path;
use scrim_core::{Color, Result};
use scrim_draw::{Image, TextLayout};

/// One repaint tick's live drawing context.
///
/// Methods are called in command order; implementations must preserve that
/// order (painter's algorithm). Any error aborts the repaint tick.
pub trait DrawTarget {
    /// Fill a vector geometry
    fn fill_path(&mut self, path: &Path, color: Color) -> Result<()>;

    /// Stroke the outline of a vector geometry
    fn stroke_path(&mut self, path: &Path, thickness: f32, color: Color) -> Result<()>;

    /// Draw a straight line segment
    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, thickness: f32, color: Color)
        -> Result<()>;

    /// Draw an image scaled into the given box
    fn image(&mut self, image: &Arc<Image>, x: f32, y: f32, w: f32, h: f32) -> Result<()>;

    /// Draw a shaped text run, tinted by `color`
    fn text(&mut self, layout: &Arc<TextLayout>, x: f32, y: f32, color: Color) -> Result<()>;
}
