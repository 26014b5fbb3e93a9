//! Command list shared between the script and render actors
//!
//! The script actor holds a [`DrawScope`] for the duration of one draw
//! phase and appends commands in callback order; that order is the
//! positional key the renderer's cache diffs against, so it is preserved
//! exactly. The render actor never iterates under the lock: it swaps the
//! sequence into its own front buffer and releases the mutex before any
//! raster work happens.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use scrim_core::Color;

use crate::command::Command;
use crate::font::Font;
use crate::image::Image;

/// Ordered sequence of draw commands behind a mutex
#[derive(Default)]
pub struct DrawList {
    commands: Mutex<Vec<Command>>,
}

impl DrawList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Take exclusive append access for one draw phase.
    ///
    /// Blocks if the render actor is mid-swap; both critical sections are
    /// short by contract.
    pub fn acquire(&self) -> DrawScope<'_> {
        DrawScope {
            commands: self.commands.lock(),
        }
    }

    /// Exchange the current sequence with `front`.
    ///
    /// Used by the render actor to consume one frame's commands without
    /// holding the lock during drawing. The previous front-buffer content
    /// is handed back to the producer side, which clears it at the start
    /// of its next draw phase.
    pub fn swap(&self, front: &mut Vec<Command>) {
        std::mem::swap(&mut *self.commands.lock(), front);
    }

    /// Drop all pending commands (state-reset events)
    pub fn clear(&self) {
        self.commands.lock().clear();
    }

    /// Number of pending commands
    pub fn len(&self) -> usize {
        self.commands.lock().len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.commands.lock().is_empty()
    }
}

/// Scope-bound append handle over the command sequence.
///
/// Append order is significant: it becomes the slot index the renderer
/// caches against.
pub struct DrawScope<'a> {
    commands: MutexGuard<'a, Vec<Command>>,
}

impl DrawScope<'_> {
    /// Remove every pending command
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Number of commands appended so far
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether no commands have been appended
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Append an already-built command
    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn text(&mut self, font: &Arc<Font>, text: impl Into<String>, x: f32, y: f32, color: Color) {
        self.commands.push(Command::Text {
            font: Arc::clone(font),
            text: text.into(),
            x,
            y,
            color,
        });
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.commands.push(Command::FillRect { x, y, w, h, color });
    }

    pub fn outline_rect(&mut self, x: f32, y: f32, w: f32, h: f32, thickness: f32, color: Color) {
        self.commands.push(Command::OutlineRect {
            x,
            y,
            w,
            h,
            thickness,
            color,
        });
    }

    pub fn rounded_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        rx: f32,
        ry: f32,
        thickness: f32,
        color: Color,
    ) {
        self.commands.push(Command::RoundedRect {
            x,
            y,
            w,
            h,
            rx,
            ry,
            thickness,
            color,
        });
    }

    pub fn fill_rounded_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        rx: f32,
        ry: f32,
        color: Color,
    ) {
        self.commands.push(Command::FillRoundedRect {
            x,
            y,
            w,
            h,
            rx,
            ry,
            color,
        });
    }

    #[allow(clippy::too_many_arguments)]
    pub fn quad(
        &mut self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        x3: f32,
        y3: f32,
        x4: f32,
        y4: f32,
        thickness: f32,
        color: Color,
    ) {
        self.commands.push(Command::Quad {
            x1,
            y1,
            x2,
            y2,
            x3,
            y3,
            x4,
            y4,
            thickness,
            color,
        });
    }

    #[allow(clippy::too_many_arguments)]
    pub fn fill_quad(
        &mut self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        x3: f32,
        y3: f32,
        x4: f32,
        y4: f32,
        color: Color,
    ) {
        self.commands.push(Command::FillQuad {
            x1,
            y1,
            x2,
            y2,
            x3,
            y3,
            x4,
            y4,
            color,
        });
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, thickness: f32, color: Color) {
        self.commands.push(Command::Line {
            x1,
            y1,
            x2,
            y2,
            thickness,
            color,
        });
    }

    /// Draw an image at its native pixel size
    pub fn image(&mut self, image: &Arc<Image>, x: f32, y: f32) {
        let (w, h) = image.size();
        self.image_sized(image, x, y, w as f32, h as f32);
    }

    /// Draw an image scaled to `w` x `h`
    pub fn image_sized(&mut self, image: &Arc<Image>, x: f32, y: f32, w: f32, h: f32) {
        self.commands.push(Command::Image {
            image: Arc::clone(image),
            x,
            y,
            w,
            h,
        });
    }

    pub fn fill_circle(&mut self, x: f32, y: f32, r: f32, color: Color) {
        self.fill_oval(x, y, r, r, color);
    }

    pub fn circle(&mut self, x: f32, y: f32, r: f32, thickness: f32, color: Color) {
        self.oval(x, y, r, r, thickness, color);
    }

    pub fn fill_oval(&mut self, x: f32, y: f32, rx: f32, ry: f32, color: Color) {
        self.commands.push(Command::FillCircle { x, y, rx, ry, color });
    }

    pub fn oval(&mut self, x: f32, y: f32, rx: f32, ry: f32, thickness: f32, color: Color) {
        self.commands.push(Command::Circle {
            x,
            y,
            rx,
            ry,
            thickness,
            color,
        });
    }

    #[allow(clippy::too_many_arguments)]
    pub fn pie(
        &mut self,
        x: f32,
        y: f32,
        r: f32,
        start_angle: f32,
        sweep_angle: f32,
        color: Color,
        clockwise: bool,
    ) {
        self.commands.push(Command::Pie {
            x,
            y,
            r,
            start_angle,
            sweep_angle,
            color,
            clockwise,
        });
    }

    #[allow(clippy::too_many_arguments)]
    pub fn ring(
        &mut self,
        x: f32,
        y: f32,
        outer_radius: f32,
        inner_radius: f32,
        start_angle: f32,
        sweep_angle: f32,
        color: Color,
        clockwise: bool,
    ) {
        self.commands.push(Command::Ring {
            x,
            y,
            outer_radius,
            inner_radius,
            start_angle,
            sweep_angle,
            color,
            clockwise,
        });
    }
}
