//! Overlay context and host lifecycle hooks
//!
//! One [`OverlayContext`] holds everything the overlay needs between host
//! callbacks: the shared command list, the positional cache, the dual-rate
//! scheduler, device-resident GPU state and the registered script
//! callbacks. It is constructed when the script environment comes up and
//! torn down (or reset) with it; the host passes it explicitly into each
//! hook rather than reaching through a global.
//!
//! Threading: [`OverlayContext::pre_frame`] belongs to the host's script
//! phase, everything else to its render/present phase. Only the command
//! list itself is shared between the two, behind its own mutex.

use std::path::Path;
use std::sync::{Arc, Weak};
use std::time::Duration;

use cosmic_text::FontSystem;
use parking_lot::Mutex;
use scrim_core::{OverlayConfig, Result};
use scrim_draw::{Command, DrawList, DrawScope, Font, Image};
use tracing::{debug, error, info};

use crate::bridge::{CompositingBridge, SurfaceDesc};
use crate::gpu::{FrameRecorder, RasterBackend};
use crate::painter::{PaintStats, Painter};
use crate::scheduler::{Clock, FrameScheduler, MonotonicClock};
use crate::target::DrawTarget;

/// Script setup callback: runs once per registration, before the first
/// draw phase that includes it
pub type InitCallback = Box<dyn FnMut(&mut ResourceContext<'_>) -> anyhow::Result<()> + Send>;

/// Script draw callback: runs every script tick with the command list held
pub type DrawCallback = Box<dyn FnMut(&mut DrawScope<'_>) -> anyhow::Result<()> + Send>;

struct Registration {
    init: InitCallback,
    draw: DrawCallback,
    initialized: bool,
}

/// Wall-clock cost of the most recent phases
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameTimings {
    /// Script draw phase (callbacks + command append)
    pub script: Duration,
    /// Repaint consume (diff, geometry, raster submission)
    pub draw: Duration,
    /// Whole present hook, including the blit
    pub total: Duration,
}

/// Resource creation surface handed to init callbacks
pub struct ResourceContext<'a> {
    font_system: Arc<Mutex<FontSystem>>,
    layout_cache_capacity: usize,
    fonts: &'a mut Vec<Weak<Font>>,
}

impl ResourceContext<'_> {
    /// Create a shared font
    pub fn create_font(&mut self, family: &str, size: f32, bold: bool, italic: bool) -> Arc<Font> {
        let font = Arc::new(Font::new(
            Arc::clone(&self.font_system),
            family,
            size,
            bold,
            italic,
            self.layout_cache_capacity,
        ));
        self.fonts.push(Arc::downgrade(&font));
        font
    }

    /// Decode a shared image; `Ok(None)` when the file does not exist
    pub fn create_image(&self, path: impl AsRef<Path>) -> Result<Option<Arc<Image>>> {
        Ok(Image::open(path)?.map(Arc::new))
    }

    /// Measure a string against a font without drawing anything
    pub fn measure_text(&self, font: &Arc<Font>, text: &str) -> (f32, f32) {
        font.measure(text)
    }
}

/// All overlay state for one script environment
pub struct OverlayContext {
    config: OverlayConfig,
    clock: Box<dyn Clock>,
    draw_list: Arc<DrawList>,
    front: Vec<Command>,
    painter: Painter,
    scheduler: FrameScheduler,
    registrations: Vec<Registration>,
    needs_init: bool,
    font_system: Arc<Mutex<FontSystem>>,
    fonts: Vec<Weak<Font>>,
    last_error: Option<String>,
    timings: FrameTimings,
    backend: Option<RasterBackend>,
    bridge: Option<CompositingBridge>,
}

impl OverlayContext {
    pub fn new(config: OverlayConfig) -> Self {
        Self::with_clock(config, Box::new(MonotonicClock))
    }

    /// Construct with an explicit time source (tests inject a fake clock)
    pub fn with_clock(config: OverlayConfig, clock: Box<dyn Clock>) -> Self {
        let now = clock.now();
        let scheduler = FrameScheduler::new(config.script_interval(), now);
        info!(rate_hz = config.script_rate_hz, "overlay context created");
        Self {
            scheduler,
            clock,
            draw_list: Arc::new(DrawList::new()),
            front: Vec::new(),
            painter: Painter::new(),
            registrations: Vec::new(),
            needs_init: false,
            font_system: Arc::new(Mutex::new(FontSystem::new())),
            fonts: Vec::new(),
            last_error: None,
            timings: FrameTimings::default(),
            backend: None,
            bridge: None,
            config,
        }
    }

    /// Register an (init, draw) callback pair.
    ///
    /// The init callback runs once before the next script draw phase; the
    /// draw callback runs every script tick in registration order.
    pub fn register(&mut self, init: InitCallback, draw: DrawCallback) {
        self.registrations.push(Registration {
            init,
            draw,
            initialized: false,
        });
        self.needs_init = true;
    }

    /// Resource creation handle, also available to the host directly
    pub fn resources(&mut self) -> ResourceContext<'_> {
        ResourceContext {
            font_system: Arc::clone(&self.font_system),
            layout_cache_capacity: self.config.layout_cache_capacity,
            fonts: &mut self.fonts,
        }
    }

    pub fn create_font(&mut self, family: &str, size: f32, bold: bool, italic: bool) -> Arc<Font> {
        self.resources().create_font(family, size, bold, italic)
    }

    pub fn create_image(&self, path: impl AsRef<Path>) -> Result<Option<Arc<Image>>> {
        Ok(Image::open(path)?.map(Arc::new))
    }

    /// Measure a string against a font without drawing anything
    pub fn measure_text(&self, font: &Arc<Font>, text: &str) -> (f32, f32) {
        font.measure(text)
    }

    /// The shared command list (producer side)
    pub fn draw_list(&self) -> &Arc<DrawList> {
        &self.draw_list
    }

    /// Backing texture dimensions, once GPU state exists
    pub fn surface_size(&self) -> Option<(u32, u32)> {
        self.bridge.as_ref().map(CompositingBridge::surface_size)
    }

    /// Script tick rate in Hz
    pub fn repaint_rate(&self) -> f64 {
        self.scheduler.rate_hz()
    }

    /// Change the script tick rate at runtime
    pub fn set_repaint_rate(&mut self, hz: f64) {
        self.scheduler.set_rate_hz(hz);
    }

    /// Most recent script or render failure, if any
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Cache counters for the most recent repaint tick
    pub fn stats(&self) -> PaintStats {
        self.painter.stats()
    }

    /// Phase costs for the most recent tick
    pub fn timings(&self) -> FrameTimings {
        self.timings
    }

    /// Whether a completed script phase is waiting to be rasterized
    pub fn repaint_pending(&self) -> bool {
        self.scheduler.repaint_armed()
    }

    /// Host hook: the script environment is going away.
    ///
    /// Drops every registration and pending command; resources the host
    /// still holds simply stop being referenced.
    pub fn on_script_unloaded(&mut self) {
        self.draw_list.clear();
        self.registrations.clear();
        self.needs_init = false;
        self.last_error = None;
        info!("script environment unloaded");
    }

    /// Host hook: the graphics device was reset.
    ///
    /// Every device-resident cache is invalid: GPU state is dropped and
    /// rebuilt lazily, cached geometry and shaped text are discarded, and
    /// init callbacks run again so scripts can recreate their resources.
    pub fn on_device_reset(&mut self) {
        self.draw_list.clear();
        self.front.clear();
        self.painter.clear();
        self.backend = None;
        self.bridge = None;

        for font in self.fonts.iter().filter_map(Weak::upgrade) {
            font.clear_layout_cache();
        }
        self.fonts.retain(|font| font.strong_count() > 0);

        for registration in &mut self.registrations {
            registration.initialized = false;
        }
        self.needs_init = !self.registrations.is_empty();
        debug!("device reset: caches cleared");
    }

    /// Host hook: pre-frame tick, before presentation.
    ///
    /// Runs pending init callbacks, then the script draw phase when its
    /// deadline has passed. Each callback is isolated: a failure is
    /// recorded as the last error and does not block its siblings.
    pub fn pre_frame(&mut self) {
        if self.registrations.is_empty() {
            return;
        }

        if self.needs_init {
            self.run_init_callbacks();
        }

        let now = self.clock.now();
        if !self.scheduler.script_due(now) {
            return;
        }
        self.scheduler.begin_script();

        let script_start = self.clock.now();
        {
            let mut scope = self.draw_list.acquire();
            scope.clear();
            for registration in &mut self.registrations {
                if let Err(err) = (registration.draw)(&mut scope) {
                    let message = format!("{err:#}");
                    error!("script draw callback failed: {message}");
                    self.last_error = Some(message);
                }
            }
        }

        let now = self.clock.now();
        self.timings.script = now - script_start;
        self.scheduler.finish_script(now);
    }

    fn run_init_callbacks(&mut self) {
        let mut resources = ResourceContext {
            font_system: Arc::clone(&self.font_system),
            layout_cache_capacity: self.config.layout_cache_capacity,
            fonts: &mut self.fonts,
        };

        for registration in &mut self.registrations {
            if registration.initialized {
                continue;
            }
            if let Err(err) = (registration.init)(&mut resources) {
                let message = format!("{err:#}");
                error!("script init callback failed: {message}");
                self.last_error = Some(message);
            }
            registration.initialized = true;
        }
        self.needs_init = false;
    }

    /// Consume the pending repaint, if any, against an arbitrary drawing
    /// context.
    ///
    /// Swaps the command list out under its lock, diffs it against the
    /// positional cache and, when anything changed, replays the frame into
    /// `target`. Returns whether the target received draw calls. This is
    /// the GPU-free core of [`Self::on_present`]; integration tests and
    /// custom embedders drive it directly.
    pub fn render_tick(&mut self, target: &mut dyn DrawTarget) -> Result<bool> {
        if !self.scheduler.take_repaint() {
            return Ok(false);
        }

        self.draw_list.swap(&mut self.front);
        if !self.painter.begin_frame(&self.front) {
            return Ok(false);
        }
        self.painter.paint(&self.front, target)?;
        Ok(true)
    }

    /// Host hook: one presented frame.
    ///
    /// Rasterizes into the overlay texture when a repaint is both pending
    /// and needed, then blits the (possibly stale) texture onto
    /// `frame_view` unconditionally. Skipped entirely while script init is
    /// still outstanding.
    pub fn on_present(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        frame_view: &wgpu::TextureView,
        desc: &SurfaceDesc,
    ) -> Result<()> {
        if self.registrations.is_empty() {
            return Ok(());
        }

        if self.bridge.as_ref().map_or(true, |bridge| !bridge.matches(desc)) {
            if self.bridge.is_some() {
                // The host's render target changed shape under us.
                self.on_device_reset();
            }
            self.bridge = Some(CompositingBridge::new(device, desc));
        }
        if self.backend.is_none() {
            self.backend = Some(RasterBackend::new(device, Arc::clone(&self.font_system)));
        }

        if self.needs_init {
            return Ok(());
        }

        let total_start = self.clock.now();
        let draw_start = self.clock.now();
        let mut recorder = FrameRecorder::new();
        let mut tick_result = Ok(());

        match self.render_tick(&mut recorder) {
            Ok(true) => {
                if let (Some(bridge), Some(backend)) =
                    (self.bridge.as_mut(), self.backend.as_mut())
                {
                    match bridge.begin_scope() {
                        Ok(()) => {
                            let mut encoder =
                                device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                                    label: Some("Overlay Raster Encoder"),
                                });
                            let flushed = backend.flush(
                                device,
                                queue,
                                &mut encoder,
                                bridge.view(),
                                bridge.surface_size(),
                                self.config.clear_color,
                                recorder,
                            );
                            // The scope closes even when encoding failed,
                            // so the texture never stays acquired.
                            bridge.end_scope(queue, encoder);
                            tick_result = flushed;
                        }
                        Err(err) => tick_result = Err(err),
                    }
                }
            }
            Ok(false) => {}
            Err(err) => tick_result = Err(err),
        }
        self.timings.draw = self.clock.now() - draw_start;

        if let Err(err) = &tick_result {
            let message = err.to_string();
            error!("repaint tick failed: {message}");
            self.last_error = Some(message);
        }

        if let Some(bridge) = &self.bridge {
            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Overlay Blit Encoder"),
            });
            bridge.blit(&mut encoder, frame_view);
            queue.submit(std::iter::once(encoder.finish()));
        }

        self.timings.total = self.clock.now() - total_start;
        tick_result
    }
}
