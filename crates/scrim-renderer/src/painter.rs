//! Positional frame-differencing cache
//!
//! The painter keeps one cache slot per command position: slot `i` always
//! holds whatever the `i`-th command of the previous frame was, plus the
//! vector geometry derived from it. Each repaint tick starts with a pure
//! comparison pass over the whole sequence; only if something changed does
//! the draw pass run, and only slots whose command actually changed rebuild
//! their geometry. Reordering two identical commands therefore invalidates
//! both slots: the cache is positional, not content-addressed.

use lyon::path::Path;
use scrim_core::Result;
use scrim_draw::Command;

use crate::geometry;
use crate::target::DrawTarget;

/// Per-tick cache counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PaintStats {
    /// Slots whose command matched the previous frame
    pub hits: u32,
    /// Slots that (re)built geometry
    pub misses: u32,
    /// Operations the cache skips entirely (lines, images)
    pub uncached: u32,
    /// Whether this tick needed any rasterization at all
    pub need_repaint: bool,
}

struct CachedSlot {
    command: Command,
    geometry: Option<Path>,
}

/// Slot-indexed geometry cache and draw dispatcher
#[derive(Default)]
pub struct Painter {
    slots: Vec<Option<CachedSlot>>,
    /// Command count of the previous frame; trailing slots beyond this are
    /// stale and never consulted.
    active: usize,
    stats: PaintStats,
}

impl Painter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Init phase: grow the slot array, reset counters and decide whether
    /// this tick needs a repaint at all.
    ///
    /// Comparison only; no slot is written here. Returns false when the
    /// incoming sequence has the same length as the previous frame and
    /// every slot compares equal, in which case the tick can exit early
    /// and leave the surface's pixels as they are.
    pub fn begin_frame(&mut self, commands: &[Command]) -> bool {
        self.stats = PaintStats::default();

        if self.slots.len() < commands.len() {
            self.slots.resize_with(commands.len(), || None);
        }

        let mut need_repaint = self.active != commands.len();
        if !need_repaint {
            for (slot, command) in self.slots.iter().zip(commands) {
                let equal = matches!(slot, Some(slot) if slot.command.approx_eq(command));
                if !equal {
                    need_repaint = true;
                    break;
                }
            }
        }

        self.active = commands.len();
        self.stats.need_repaint = need_repaint;
        need_repaint
    }

    /// Draw phase: diff each slot and issue draw calls against `target`.
    ///
    /// Only meaningful after [`Self::begin_frame`] returned true; errors
    /// propagate immediately and abort the tick.
    pub fn paint(&mut self, commands: &[Command], target: &mut dyn DrawTarget) -> Result<()> {
        for (index, command) in commands.iter().enumerate() {
            self.paint_slot(index, command, target)?;
        }
        Ok(())
    }

    fn paint_slot(
        &mut self,
        index: usize,
        command: &Command,
        target: &mut dyn DrawTarget,
    ) -> Result<()> {
        // Lines and images are cheaper to draw than to diff. They still
        // occupy their slot so the next init phase sees the frame they
        // were part of.
        if command.is_uncached() {
            self.stats.uncached += 1;
            self.slots[index] = Some(CachedSlot {
                command: command.clone(),
                geometry: None,
            });
            return match command {
                Command::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    thickness,
                    color,
                } => target.line(*x1, *y1, *x2, *y2, *thickness, *color),
                Command::Image { image, x, y, w, h } => target.image(image, *x, *y, *w, *h),
                _ => Ok(()),
            };
        }

        let hit = matches!(&self.slots[index], Some(slot) if slot.command.approx_eq(command));
        if hit {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
            self.slots[index] = Some(CachedSlot {
                command: command.clone(),
                geometry: geometry::build(command),
            });
        }

        let Some(slot) = &self.slots[index] else {
            return Ok(());
        };

        match command {
            Command::Text {
                font, text, x, y, color, ..
            } => {
                let layout = font.layout(text);
                target.text(&layout, *x, *y, *color)
            }

            Command::FillRect { color, .. }
            | Command::FillRoundedRect { color, .. }
            | Command::FillQuad { color, .. }
            | Command::FillCircle { color, .. }
            | Command::Pie { color, .. }
            | Command::Ring { color, .. } => match &slot.geometry {
                Some(path) => target.fill_path(path, *color),
                // Degenerate sweep: nothing to draw.
                None => Ok(()),
            },

            Command::OutlineRect {
                thickness, color, ..
            }
            | Command::RoundedRect {
                thickness, color, ..
            }
            | Command::Quad {
                thickness, color, ..
            }
            | Command::Circle {
                thickness, color, ..
            } => match &slot.geometry {
                Some(path) => target.stroke_path(path, *thickness, *color),
                None => Ok(()),
            },

            Command::Line { .. } | Command::Image { .. } => Ok(()),
        }
    }

    /// Counters for the current tick
    pub fn stats(&self) -> PaintStats {
        self.stats
    }

    /// Total slot capacity (grow-only)
    pub fn slot_capacity(&self) -> usize {
        self.slots.len()
    }

    /// Drop every cached slot (device reset, script reload)
    pub fn clear(&mut self) {
        self.slots.clear();
        self.active = 0;
        self.stats = PaintStats::default();
    }
}
