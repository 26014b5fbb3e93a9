//! Font resources and shaped-text caching
//!
//! A [`Font`] pairs a cosmic-text format description with a private LRU
//! cache from string to shaped [`TextLayout`]. The cache is keyed on text
//! alone (position is applied at draw time), since the same string is
//! frequently redrawn at different coordinates frame after frame.

use std::fmt;
use std::sync::Arc;

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, Style, Weight};
use parking_lot::Mutex;

use crate::lru::LruCache;

/// Line height multiplier applied to the font size
const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// A shaped, measured text run ready for rasterization
pub struct TextLayout {
    buffer: Buffer,
    width: f32,
    height: f32,
}

impl TextLayout {
    /// The shaped cosmic-text buffer
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Laid-out width in pixels
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Laid-out height in pixels
    pub fn height(&self) -> f32 {
        self.height
    }

    /// `(width, height)` in pixels
    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }
}

impl fmt::Debug for TextLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextLayout")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// A font shared by draw commands across frames.
///
/// Commands compare fonts by identity (`Arc::ptr_eq`), so two fonts created
/// with identical parameters are still distinct resources.
pub struct Font {
    family: String,
    size: f32,
    bold: bool,
    italic: bool,
    font_system: Arc<Mutex<FontSystem>>,
    layouts: Mutex<LruCache<String, Arc<TextLayout>>>,
}

impl Font {
    /// Create a font against the shared shaping engine.
    ///
    /// Unknown family names resolve through cosmic-text's fallback chain
    /// rather than failing.
    pub fn new(
        font_system: Arc<Mutex<FontSystem>>,
        family: &str,
        size: f32,
        bold: bool,
        italic: bool,
        layout_cache_capacity: usize,
    ) -> Self {
        Self {
            family: family.to_string(),
            size,
            bold,
            italic,
            font_system,
            layouts: Mutex::new(LruCache::new(layout_cache_capacity)),
        }
    }

    /// Family name the font was created with
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Font size in pixels
    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn bold(&self) -> bool {
        self.bold
    }

    pub fn italic(&self) -> bool {
        self.italic
    }

    fn attrs(&self) -> Attrs<'_> {
        Attrs::new()
            .family(Family::Name(&self.family))
            .weight(if self.bold { Weight::BOLD } else { Weight::NORMAL })
            .style(if self.italic { Style::Italic } else { Style::Normal })
    }

    /// Shape `text`, returning the cached layout when this string was
    /// shaped recently.
    ///
    /// On a miss the string is shaped against the font's format and
    /// inserted, evicting the least-recently-used layout once the cache is
    /// at capacity.
    pub fn layout(&self, text: &str) -> Arc<TextLayout> {
        let mut layouts = self.layouts.lock();
        if let Some(layout) = layouts.get(text) {
            return Arc::clone(layout);
        }

        let layout = Arc::new(self.shape(text));
        layouts.put(text.to_string(), Arc::clone(&layout));
        layout
    }

    /// Measure `text` without touching any drawing state
    pub fn measure(&self, text: &str) -> (f32, f32) {
        self.layout(text).size()
    }

    /// Drop every cached layout (device reset, script reload)
    pub fn clear_layout_cache(&self) {
        self.layouts.lock().clear();
    }

    /// Number of currently cached layouts
    pub fn cached_layouts(&self) -> usize {
        self.layouts.lock().len()
    }

    fn shape(&self, text: &str) -> TextLayout {
        let mut font_system = self.font_system.lock();

        let metrics = Metrics::new(self.size, self.size * LINE_HEIGHT_FACTOR);
        let mut buffer = Buffer::new(&mut font_system, metrics);
        buffer.set_size(&mut font_system, None, None);
        buffer.set_text(&mut font_system, text, self.attrs(), Shaping::Advanced);
        buffer.shape_until_scroll(&mut font_system, false);

        let mut width: f32 = 0.0;
        let mut height: f32 = 0.0;
        for run in buffer.layout_runs() {
            let line_width = run.glyphs.iter().map(|glyph| glyph.w).sum::<f32>();
            width = width.max(line_width);
            height += run.line_height;
        }

        TextLayout {
            buffer,
            width,
            height,
        }
    }
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("family", &self.family)
            .field("size", &self.size)
            .field("bold", &self.bold)
            .field("italic", &self.italic)
            .finish()
    }
}
