//! Full producer/consumer loop: registration, deferred init, script
//! ticking against an injected clock, per-callback error isolation and
//! state-reset hooks. No GPU involved; frames land in a recording target.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use lyon::path::Path;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use scrim_core::{Color, OverlayConfig, Result};
use scrim_draw::{Font, Image, TextLayout};
use scrim_renderer::{Clock, DrawTarget, OverlayContext};

/// Manually advanced clock shared with the context under test
#[derive(Clone)]
struct TestClock {
    now: Arc<Mutex<Instant>>,
}

impl TestClock {
    fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

#[derive(Debug, Default)]
struct RecordingTarget {
    fills: usize,
    strokes: usize,
    lines: usize,
    images: usize,
    texts: usize,
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

fn context_with_clock(clock: &TestClock) -> OverlayContext {
    OverlayContext::with_clock(OverlayConfig::default(), Box::new(clock.clone()))
}

#[test]
fn test_init_runs_once_before_first_draw() {
    let clock = TestClock::new();
    let mut context = context_with_clock(&clock);

    let init_runs = Arc::new(AtomicUsize::new(0));
    let draw_runs = Arc::new(AtomicUsize::new(0));

    let init_counter = Arc::clone(&init_runs);
    let draw_counter = Arc::clone(&draw_runs);
    context.register(
        Box::new(move |_resources| {
            init_counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
        Box::new(move |scope| {
            draw_counter.fetch_add(1, Ordering::SeqCst);
            scope.fill_rect(0.0, 0.0, 10.0, 10.0, Color::RED);
            Ok(())
        }),
    );

    context.pre_frame();
    assert_eq!(init_runs.load(Ordering::SeqCst), 1);
    assert_eq!(draw_runs.load(Ordering::SeqCst), 1);
    assert!(context.repaint_pending());

    // Another pre-frame before the deadline: init does not rerun, and the
    // script phase is not due yet.
    clock.advance(Duration::from_millis(1));
    context.pre_frame();
    assert_eq!(init_runs.load(Ordering::SeqCst), 1);
    assert_eq!(draw_runs.load(Ordering::SeqCst), 1);

    clock.advance(Duration::from_millis(17));
    context.pre_frame();
    assert_eq!(draw_runs.load(Ordering::SeqCst), 2);
}

#[test]
fn test_unchanged_frames_rasterize_once() {
    let clock = TestClock::new();
    let mut context = context_with_clock(&clock);

    context.register(
        Box::new(|_| Ok(())),
        Box::new(|scope| {
            scope.fill_rect(10.0, 10.0, 50.0, 50.0, Color(0xFFFF_0000));
            scope.outline_rect(5.0, 5.0, 60.0, 60.0, 2.0, Color::WHITE);
            Ok(())
        }),
    );

    let mut target = RecordingTarget::default();
    context.pre_frame();
    assert!(context.render_tick(&mut target).unwrap());
    assert_eq!(target.fills, 1);
    assert_eq!(target.strokes, 1);
    assert_eq!(context.stats().misses, 2);

    // Two more script ticks emitting the identical stream: the repaint
    // gate opens but the diff finds nothing to do.
    for _ in 0..2 {
        clock.advance(Duration::from_millis(17));
        context.pre_frame();
        assert!(context.repaint_pending());
        let mut target = RecordingTarget::default();
        assert!(!context.render_tick(&mut target).unwrap());
        assert_eq!(target.fills, 0);
        assert!(!context.stats().need_repaint);
    }
}

#[test]
fn test_changing_stream_repaints_each_tick() {
    let clock = TestClock::new();
    let mut context = context_with_clock(&clock);

    let tick = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&tick);
    context.register(
        Box::new(|_| Ok(())),
        Box::new(move |scope| {
            let offset = counter.fetch_add(1, Ordering::SeqCst) as f32;
            scope.fill_rect(10.0 + offset, 10.0, 50.0, 50.0, Color::RED);
            Ok(())
        }),
    );

    for round in 0..3 {
        if round > 0 {
            clock.advance(Duration::from_millis(17));
        }
        context.pre_frame();
        let mut target = RecordingTarget::default();
        assert!(context.render_tick(&mut target).unwrap());
        assert_eq!(target.fills, 1);
        assert_eq!(context.stats().misses, 1);
    }
}

#[test]
fn test_no_repaint_without_script_tick() {
    let clock = TestClock::new();
    let mut context = context_with_clock(&clock);
    context.register(
        Box::new(|_| Ok(())),
        Box::new(|scope| {
            scope.fill_rect(0.0, 0.0, 1.0, 1.0, Color::RED);
            Ok(())
        }),
    );

    context.pre_frame();
    let mut target = RecordingTarget::default();
    assert!(context.render_tick(&mut target).unwrap());

    // Presents between script deadlines consume nothing.
    for _ in 0..3 {
        let mut target = RecordingTarget::default();
        assert!(!context.render_tick(&mut target).unwrap());
        assert_eq!(target.fills, 0);
    }
}

#[test]
fn test_draw_error_does_not_block_siblings() {
    let clock = TestClock::new();
    let mut context = context_with_clock(&clock);

    context.register(
        Box::new(|_| Ok(())),
        Box::new(|_scope| anyhow::bail!("callback exploded")),
    );
    context.register(
        Box::new(|_| Ok(())),
        Box::new(|scope| {
            scope.fill_rect(0.0, 0.0, 10.0, 10.0, Color::GREEN);
            Ok(())
        }),
    );

    context.pre_frame();
    assert_eq!(context.last_error(), Some("callback exploded"));

    // The second registration's commands still made it through.
    let mut target = RecordingTarget::default();
    assert!(context.render_tick(&mut target).unwrap());
    assert_eq!(target.fills, 1);
}

#[test]
fn test_init_error_is_recorded_and_does_not_repeat() {
    let clock = TestClock::new();
    let mut context = context_with_clock(&clock);

    let init_runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&init_runs);
    context.register(
        Box::new(move |_resources| {
            counter.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("missing asset")
        }),
        Box::new(|scope| {
            scope.fill_rect(0.0, 0.0, 1.0, 1.0, Color::RED);
            Ok(())
        }),
    );

    context.pre_frame();
    assert_eq!(context.last_error(), Some("missing asset"));
    assert_eq!(init_runs.load(Ordering::SeqCst), 1);

    // Init is not retried; the draw phase carries on.
    clock.advance(Duration::from_millis(17));
    context.pre_frame();
    assert_eq!(init_runs.load(Ordering::SeqCst), 1);
    assert!(context.repaint_pending());
}

#[test]
fn test_resources_created_in_init_are_drawable() {
    let clock = TestClock::new();
    let mut context = context_with_clock(&clock);

    let font_slot: Arc<Mutex<Option<Arc<Font>>>> = Arc::new(Mutex::new(None));

    let init_slot = Arc::clone(&font_slot);
    let draw_slot = Arc::clone(&font_slot);
    context.register(
        Box::new(move |resources| {
            let font = resources.create_font("Sans", 14.0, false, false);
            let (_w, _h) = resources.measure_text(&font, "hi");
            *init_slot.lock() = Some(font);
            Ok(())
        }),
        Box::new(move |scope| {
            if let Some(font) = draw_slot.lock().as_ref() {
                scope.text(font, "hi", 0.0, 0.0, Color::WHITE);
            }
            Ok(())
        }),
    );

    context.pre_frame();
    let mut target = RecordingTarget::default();
    assert!(context.render_tick(&mut target).unwrap());
    assert_eq!(target.texts, 1);
}

#[test]
fn test_rate_setter_round_trips_and_slows_ticking() {
    let clock = TestClock::new();
    let mut context = context_with_clock(&clock);
    context.register(
        Box::new(|_| Ok(())),
        Box::new(|scope| {
            scope.fill_rect(0.0, 0.0, 1.0, 1.0, Color::RED);
            Ok(())
        }),
    );

    assert!((context.repaint_rate() - 60.0).abs() < 1e-9);
    context.set_repaint_rate(10.0);
    assert!((context.repaint_rate() - 10.0).abs() < 1e-9);

    context.pre_frame();
    assert!(context.render_tick(&mut RecordingTarget::default()).unwrap());

    // 60 Hz worth of presents pass without a new script tick at 10 Hz.
    for _ in 0..5 {
        clock.advance(Duration::from_millis(17));
        context.pre_frame();
    }
    assert!(!context.repaint_pending());

    clock.advance(Duration::from_millis(20));
    context.pre_frame();
    assert!(context.repaint_pending());
}

#[test]
fn test_script_unload_clears_everything() {
    let clock = TestClock::new();
    let mut context = context_with_clock(&clock);
    context.register(
        Box::new(|_| Ok(())),
        Box::new(|_| anyhow::bail!("recorded")),
    );
    context.pre_frame();
    assert!(context.last_error().is_some());

    context.on_script_unloaded();
    assert!(context.last_error().is_none());
    assert!(context.draw_list().is_empty());

    // No registrations left: pre-frame is a no-op.
    clock.advance(Duration::from_millis(17));
    context.pre_frame();
    assert!(!context.repaint_pending());
}

#[test]
fn test_device_reset_rebuilds_caches_and_reruns_init() {
    let clock = TestClock::new();
    let mut context = context_with_clock(&clock);

    let init_runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&init_runs);
    context.register(
        Box::new(move |_resources| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
        Box::new(|scope| {
            scope.fill_rect(0.0, 0.0, 10.0, 10.0, Color::RED);
            Ok(())
        }),
    );

    let font = context.create_font("Sans", 14.0, false, false);
    font.layout("cached");
    assert_eq!(font.cached_layouts(), 1);

    context.pre_frame();
    assert!(context.render_tick(&mut RecordingTarget::default()).unwrap());

    context.on_device_reset();

    // Shaped text is gone and init is owed another run.
    assert_eq!(font.cached_layouts(), 0);
    clock.advance(Duration::from_millis(17));
    context.pre_frame();
    assert_eq!(init_runs.load(Ordering::SeqCst), 2);

    // The identical command stream now repaints from scratch.
    let mut target = RecordingTarget::default();
    assert!(context.render_tick(&mut target).unwrap());
    assert_eq!(target.fills, 1);
    assert_eq!(context.stats().misses, 1);
}
