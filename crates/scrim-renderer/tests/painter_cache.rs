//! Positional cache behavior: hit/miss accounting, repaint detection and
//! draw-call suppression across consecutive frames.

use std::sync::Arc;

use cosmic_text::FontSystem;
use lyon::path::Path;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use scrim_core::{Color, Result, ScrimError};
use scrim_draw::{Command, Font, Image, TextLayout};
use scrim_renderer::{DrawTarget, Painter};

/// Counts draw calls instead of rasterizing
#[derive(Debug, Default, PartialEq, Eq)]
struct RecordingTarget {
    fills: usize,
    strokes: usize,
    lines: usize,
    images: usize,
    texts: usize,
}

impl RecordingTarget {
    fn total(&self) -> usize {
        self.fills + self.strokes + self.lines + self.images + self.texts
    }
}

impl DrawTarget for RecordingTarget {
    fn fill_path(&mut self, _path: &Path, _color: Color) -> Result<()> {
        self.fills += 1;
        Ok(())
    }

    fn stroke_path(&mut self, _path: &Path, _thickness: f32, _color: Color) -> Result<()> {
        self.strokes += 1;
        Ok(())
    }

    fn line(
        &mut self,
        _x1: f32,
        _y1: f32,
        _x2: f32,
        _y2: f32,
        _thickness: f32,
        _color: Color,
    ) -> Result<()> {
        self.lines += 1;
        Ok(())
    }

    fn image(&mut self, _image: &Arc<Image>, _x: f32, _y: f32, _w: f32, _h: f32) -> Result<()> {
        self.images += 1;
        Ok(())
    }

    fn text(&mut self, _layout: &Arc<TextLayout>, _x: f32, _y: f32, _color: Color) -> Result<()> {
        self.texts += 1;
        Ok(())
    }
}

/// Fails every fill, for error propagation checks
struct FailingTarget;

impl DrawTarget for FailingTarget {
    fn fill_path(&mut self, _path: &Path, _color: Color) -> Result<()> {
        Err(ScrimError::render("allocation failed"))
    }

    fn stroke_path(&mut self, _path: &Path, _thickness: f32, _color: Color) -> Result<()> {
        Ok(())
    }

    fn line(
        &mut self,
        _x1: f32,
        _y1: f32,
        _x2: f32,
        _y2: f32,
        _thickness: f32,
        _color: Color,
    ) -> Result<()> {
        Ok(())
    }

    fn image(&mut self, _image: &Arc<Image>, _x: f32, _y: f32, _w: f32, _h: f32) -> Result<()> {
        Ok(())
    }

    fn text(&mut self, _layout: &Arc<TextLayout>, _x: f32, _y: f32, _color: Color) -> Result<()> {
        Ok(())
    }
}

fn fill_rect(x: f32, color: u32) -> Command {
    Command::FillRect {
        x,
        y: 10.0,
        w: 50.0,
        h: 50.0,
        color: Color(color),
    }
}

fn test_font() -> Arc<Font> {
    let font_system = Arc::new(Mutex::new(FontSystem::new()));
    Arc::new(Font::new(font_system, "Sans", 14.0, false, false, 100))
}

#[test]
fn test_identical_sequence_skips_second_tick() {
    let mut painter = Painter::new();
    let frame = vec![fill_rect(10.0, 0xFFFF_0000), fill_rect(80.0, 0xFF00_FF00)];

    let mut target = RecordingTarget::default();
    assert!(painter.begin_frame(&frame));
    painter.paint(&frame, &mut target).unwrap();
    assert_eq!(painter.stats().misses, 2);
    assert_eq!(painter.stats().hits, 0);
    assert_eq!(target.fills, 2);

    // Same ordered sequence again: nothing to do at all.
    assert!(!painter.begin_frame(&frame));
    assert!(!painter.stats().need_repaint);
}

#[test]
fn test_reordering_identical_commands_invalidates() {
    let mut painter = Painter::new();
    let first = fill_rect(10.0, 0xFFFF_0000);
    let second = fill_rect(80.0, 0xFF00_FF00);

    let mut target = RecordingTarget::default();
    let frame = vec![first.clone(), second.clone()];
    assert!(painter.begin_frame(&frame));
    painter.paint(&frame, &mut target).unwrap();

    // Same set of commands, swapped order: positional, so both slots miss.
    let swapped = vec![second, first];
    assert!(painter.begin_frame(&swapped));
    let mut target = RecordingTarget::default();
    painter.paint(&swapped, &mut target).unwrap();
    assert_eq!(painter.stats().misses, 2);
    assert_eq!(painter.stats().hits, 0);
}

#[test]
fn test_float_noise_within_tolerance_is_a_hit() {
    let mut painter = Painter::new();
    let mut target = RecordingTarget::default();

    let frame = vec![fill_rect(10.0, 0xFFFF_0000)];
    painter.begin_frame(&frame);
    painter.paint(&frame, &mut target).unwrap();

    assert!(!painter.begin_frame(&[fill_rect(10.00005, 0xFFFF_0000)]));
    assert!(painter.begin_frame(&[fill_rect(10.001, 0xFFFF_0000)]));
}

#[test]
fn test_slots_grow_but_never_shrink() {
    let mut painter = Painter::new();
    let rects =
        |count: usize| -> Vec<Command> { (0..count).map(|i| fill_rect(i as f32, 0xFF00_00FF)).collect() };

    let mut target = RecordingTarget::default();
    let five = rects(5);
    painter.begin_frame(&five);
    painter.paint(&five, &mut target).unwrap();
    assert_eq!(painter.slot_capacity(), 5);

    // Growing to ten: the first five hit, the trailing five are new.
    let ten = rects(10);
    assert!(painter.begin_frame(&ten));
    let mut target = RecordingTarget::default();
    painter.paint(&ten, &mut target).unwrap();
    assert_eq!(painter.slot_capacity(), 10);
    assert_eq!(painter.stats().hits, 5);
    assert_eq!(painter.stats().misses, 5);

    // Shrinking back: the slot array keeps its length, only slots 0-4 are
    // consulted and they all still match.
    assert!(painter.begin_frame(&five));
    let mut target = RecordingTarget::default();
    painter.paint(&five, &mut target).unwrap();
    assert_eq!(painter.slot_capacity(), 10);
    assert_eq!(painter.stats().hits, 5);
    assert_eq!(painter.stats().misses, 0);

    // And a repeated five-command tick is fully idempotent again.
    assert!(!painter.begin_frame(&five));
}

#[test]
fn test_unchanged_rect_and_text_over_three_ticks() {
    let font = test_font();
    let frame = vec![
        fill_rect(10.0, 0xFFFF_0000),
        Command::Text {
            font,
            text: "hi".to_string(),
            x: 0.0,
            y: 0.0,
            color: Color(0xFFFF_FFFF),
        },
    ];

    let mut painter = Painter::new();
    let mut target = RecordingTarget::default();

    assert!(painter.begin_frame(&frame));
    painter.paint(&frame, &mut target).unwrap();
    assert_eq!(painter.stats().misses, 2);
    assert_eq!(target.fills, 1);
    assert_eq!(target.texts, 1);

    for _ in 0..2 {
        let mut target = RecordingTarget::default();
        assert!(!painter.begin_frame(&frame));
        // Early exit: the draw phase never runs.
        assert_eq!(target.total(), 0);
    }
}

#[test]
fn test_recolor_misses_one_slot_and_keeps_the_other() {
    let font = test_font();
    let text = Command::Text {
        font,
        text: "hi".to_string(),
        x: 0.0,
        y: 0.0,
        color: Color(0xFFFF_FFFF),
    };

    let mut painter = Painter::new();
    let mut target = RecordingTarget::default();
    let frame = vec![fill_rect(10.0, 0xFFFF_0000), text.clone()];
    painter.begin_frame(&frame);
    painter.paint(&frame, &mut target).unwrap();

    // Recolored rect: color participates in equality, so slot 0 misses
    // even though the geometry bounds are unchanged; slot 1 stays a hit.
    let recolored = vec![fill_rect(10.0, 0xFF00_FF00), text];
    assert!(painter.begin_frame(&recolored));
    let mut target = RecordingTarget::default();
    painter.paint(&recolored, &mut target).unwrap();
    assert_eq!(painter.stats().misses, 1);
    assert_eq!(painter.stats().hits, 1);
    assert_eq!(target.fills, 1);
    assert_eq!(target.texts, 1);
}

#[test]
fn test_lines_and_images_bypass_the_cache() {
    let image = Arc::new(Image::from_rgba(2, 2, vec![255u8; 16]));
    let frame = vec![
        Command::Line {
            x1: 0.0,
            y1: 0.0,
            x2: 10.0,
            y2: 10.0,
            thickness: 1.0,
            color: Color::WHITE,
        },
        Command::Image {
            image,
            x: 5.0,
            y: 5.0,
            w: 2.0,
            h: 2.0,
        },
        fill_rect(20.0, 0xFFFF_0000),
    ];

    let mut painter = Painter::new();
    let mut target = RecordingTarget::default();
    assert!(painter.begin_frame(&frame));
    painter.paint(&frame, &mut target).unwrap();
    assert_eq!(painter.stats().uncached, 2);
    assert_eq!(painter.stats().misses, 1);
    assert_eq!(target.lines, 1);
    assert_eq!(target.images, 1);

    // Uncached operations still count toward whole-sequence equality.
    assert!(!painter.begin_frame(&frame));
}

#[test]
fn test_degenerate_sweep_draws_nothing() {
    let pie = Command::Pie {
        x: 50.0,
        y: 50.0,
        r: 20.0,
        start_angle: 0.0,
        sweep_angle: 0.0,
        color: Color::RED,
        clockwise: true,
    };

    let mut painter = Painter::new();
    let mut target = RecordingTarget::default();
    let frame = vec![pie];
    assert!(painter.begin_frame(&frame));
    painter.paint(&frame, &mut target).unwrap();
    assert_eq!(target.total(), 0);

    // The slot still remembers the command, so the next tick settles.
    assert!(!painter.begin_frame(&frame));
}

#[test]
fn test_pie_normalized_angles_compare_unequal_but_draw_identically() {
    // -30 and 330 are the same sector; equality is on raw fields, so the
    // slot misses, but the rebuilt geometry is identical.
    let sector = |start: f32| Command::Pie {
        x: 50.0,
        y: 50.0,
        r: 20.0,
        start_angle: start,
        sweep_angle: 40.0,
        color: Color::RED,
        clockwise: true,
    };

    let mut painter = Painter::new();
    let mut target = RecordingTarget::default();
    painter.begin_frame(&[sector(-30.0)]);
    painter.paint(&[sector(-30.0)], &mut target).unwrap();
    assert_eq!(target.fills, 1);

    assert!(painter.begin_frame(&[sector(330.0)]));
    let mut target = RecordingTarget::default();
    painter.paint(&[sector(330.0)], &mut target).unwrap();
    assert_eq!(target.fills, 1);
}

#[test]
fn test_stroke_commands_use_stroke_calls() {
    let frame = vec![
        Command::OutlineRect {
            x: 0.0,
            y: 0.0,
            w: 10.0,
            h: 10.0,
            thickness: 2.0,
            color: Color::WHITE,
        },
        Command::Circle {
            x: 20.0,
            y: 20.0,
            rx: 5.0,
            ry: 5.0,
            thickness: 1.0,
            color: Color::WHITE,
        },
    ];

    let mut painter = Painter::new();
    let mut target = RecordingTarget::default();
    painter.begin_frame(&frame);
    painter.paint(&frame, &mut target).unwrap();
    assert_eq!(target.strokes, 2);
    assert_eq!(target.fills, 0);
}

#[test]
fn test_draw_failure_propagates() {
    let mut painter = Painter::new();
    let frame = vec![fill_rect(0.0, 0xFFFF_0000)];
    painter.begin_frame(&frame);
    assert!(painter.paint(&frame, &mut FailingTarget).is_err());
}

#[test]
fn test_clear_forces_full_rebuild() {
    let mut painter = Painter::new();
    let mut target = RecordingTarget::default();
    let frame = vec![fill_rect(0.0, 0xFFFF_0000)];
    painter.begin_frame(&frame);
    painter.paint(&frame, &mut target).unwrap();
    assert!(!painter.begin_frame(&frame));

    painter.clear();
    assert_eq!(painter.slot_capacity(), 0);
    assert!(painter.begin_frame(&frame));
    let mut target = RecordingTarget::default();
    painter.paint(&frame, &mut target).unwrap();
    assert_eq!(painter.stats().misses, 1);
    assert_eq!(target.fills, 1);
}
