//! Draw command value model
//!
//! One `Command` is one drawing operation together with its parameters.
//! Commands are compared per frame slot by the renderer's positional cache,
//! so equality has to be cheap and tolerant of float round-trip noise:
//! numeric fields compare within [`EPSILON`], colors and strings compare
//! exactly, and resource fields compare by identity.

use std::sync::Arc;

use scrim_core::Color;

use crate::font::Font;
use crate::image::Image;

/// Absolute tolerance for numeric command fields
pub const EPSILON: f32 = 1e-4;

fn feq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// One drawing operation
#[derive(Debug, Clone)]
pub enum Command {
    Text {
        font: Arc<Font>,
        text: String,
        x: f32,
        y: f32,
        color: Color,
    },
    FillRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Color,
    },
    OutlineRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        thickness: f32,
        color: Color,
    },
    RoundedRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        rx: f32,
        ry: f32,
        thickness: f32,
        color: Color,
    },
    FillRoundedRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        rx: f32,
        ry: f32,
        color: Color,
    },
    Quad {
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
    },
    FillQuad {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        x3: f32,
        y3: f32,
        x4: f32,
        y4: f32,
        color: Color,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        thickness: f32,
        color: Color,
    },
    Image {
        image: Arc<Image>,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    },
    FillCircle {
        x: f32,
        y: f32,
        rx: f32,
        ry: f32,
        color: Color,
    },
    Circle {
        x: f32,
        y: f32,
        rx: f32,
        ry: f32,
        thickness: f32,
        color: Color,
    },
    Pie {
        x: f32,
        y: f32,
        r: f32,
        start_angle: f32,
        sweep_angle: f32,
        color: Color,
        clockwise: bool,
    },
    Ring {
        x: f32,
        y: f32,
        outer_radius: f32,
        inner_radius: f32,
        start_angle: f32,
        sweep_angle: f32,
        color: Color,
        clockwise: bool,
    },
}

impl Command {
    /// Value equality with float tolerance.
    ///
    /// Variant tags must match; numeric fields match within [`EPSILON`];
    /// colors, strings and the clockwise flag match exactly; font and image
    /// references match when they point at the same resource.
    pub fn approx_eq(&self, other: &Command) -> bool {
        use Command::*;

        match (self, other) {
            (
                Text { font: fa, text: ta, x: xa, y: ya, color: ca },
                Text { font: fb, text: tb, x: xb, y: yb, color: cb },
            ) => feq(*xa, *xb) && feq(*ya, *yb) && ca == cb && ta == tb && Arc::ptr_eq(fa, fb),

            (
                FillRect { x: xa, y: ya, w: wa, h: ha, color: ca },
                FillRect { x: xb, y: yb, w: wb, h: hb, color: cb },
            ) => feq(*xa, *xb) && feq(*ya, *yb) && feq(*wa, *wb) && feq(*ha, *hb) && ca == cb,

            (
                OutlineRect { x: xa, y: ya, w: wa, h: ha, thickness: tha, color: ca },
                OutlineRect { x: xb, y: yb, w: wb, h: hb, thickness: thb, color: cb },
            ) => {
                feq(*xa, *xb)
                    && feq(*ya, *yb)
                    && feq(*wa, *wb)
                    && feq(*ha, *hb)
                    && feq(*tha, *thb)
                    && ca == cb
            }

            (
                RoundedRect {
                    x: xa, y: ya, w: wa, h: ha, rx: rxa, ry: rya, thickness: tha, color: ca,
                },
                RoundedRect {
                    x: xb, y: yb, w: wb, h: hb, rx: rxb, ry: ryb, thickness: thb, color: cb,
                },
            ) => {
                feq(*xa, *xb)
                    && feq(*ya, *yb)
                    && feq(*wa, *wb)
                    && feq(*ha, *hb)
                    && feq(*rxa, *rxb)
                    && feq(*rya, *ryb)
                    && feq(*tha, *thb)
                    && ca == cb
            }

            (
                FillRoundedRect { x: xa, y: ya, w: wa, h: ha, rx: rxa, ry: rya, color: ca },
                FillRoundedRect { x: xb, y: yb, w: wb, h: hb, rx: rxb, ry: ryb, color: cb },
            ) => {
                feq(*xa, *xb)
                    && feq(*ya, *yb)
                    && feq(*wa, *wb)
                    && feq(*ha, *hb)
                    && feq(*rxa, *rxb)
                    && feq(*rya, *ryb)
                    && ca == cb
            }

            (
                Quad {
                    x1: x1a, y1: y1a, x2: x2a, y2: y2a,
                    x3: x3a, y3: y3a, x4: x4a, y4: y4a,
                    thickness: tha, color: ca,
                },
                Quad {
                    x1: x1b, y1: y1b, x2: x2b, y2: y2b,
                    x3: x3b, y3: y3b, x4: x4b, y4: y4b,
                    thickness: thb, color: cb,
                },
            ) => {
                feq(*x1a, *x1b)
                    && feq(*y1a, *y1b)
                    && feq(*x2a, *x2b)
                    && feq(*y2a, *y2b)
                    && feq(*x3a, *x3b)
                    && feq(*y3a, *y3b)
                    && feq(*x4a, *x4b)
                    && feq(*y4a, *y4b)
                    && feq(*tha, *thb)
                    && ca == cb
            }

            (
                FillQuad {
                    x1: x1a, y1: y1a, x2: x2a, y2: y2a,
                    x3: x3a, y3: y3a, x4: x4a, y4: y4a,
                    color: ca,
                },
                FillQuad {
                    x1: x1b, y1: y1b, x2: x2b, y2: y2b,
                    x3: x3b, y3: y3b, x4: x4b, y4: y4b,
                    color: cb,
                },
            ) => {
                feq(*x1a, *x1b)
                    && feq(*y1a, *y1b)
                    && feq(*x2a, *x2b)
                    && feq(*y2a, *y2b)
                    && feq(*x3a, *x3b)
                    && feq(*y3a, *y3b)
                    && feq(*x4a, *x4b)
                    && feq(*y4a, *y4b)
                    && ca == cb
            }

            (
                Line { x1: x1a, y1: y1a, x2: x2a, y2: y2a, thickness: tha, color: ca },
                Line { x1: x1b, y1: y1b, x2: x2b, y2: y2b, thickness: thb, color: cb },
            ) => {
                feq(*x1a, *x1b)
                    && feq(*y1a, *y1b)
                    && feq(*x2a, *x2b)
                    && feq(*y2a, *y2b)
                    && feq(*tha, *thb)
                    && ca == cb
            }

            (
                Image { image: ia, x: xa, y: ya, w: wa, h: ha },
                Image { image: ib, x: xb, y: yb, w: wb, h: hb },
            ) => {
                feq(*xa, *xb)
                    && feq(*ya, *yb)
                    && feq(*wa, *wb)
                    && feq(*ha, *hb)
                    && Arc::ptr_eq(ia, ib)
            }

            (
                FillCircle { x: xa, y: ya, rx: rxa, ry: rya, color: ca },
                FillCircle { x: xb, y: yb, rx: rxb, ry: ryb, color: cb },
            ) => feq(*xa, *xb) && feq(*ya, *yb) && feq(*rxa, *rxb) && feq(*rya, *ryb) && ca == cb,

            (
                Circle { x: xa, y: ya, rx: rxa, ry: rya, thickness: tha, color: ca },
                Circle { x: xb, y: yb, rx: rxb, ry: ryb, thickness: thb, color: cb },
            ) => {
                feq(*xa, *xb)
                    && feq(*ya, *yb)
                    && feq(*rxa, *rxb)
                    && feq(*rya, *ryb)
                    && feq(*tha, *thb)
                    && ca == cb
            }

            (
                Pie {
                    x: xa, y: ya, r: ra,
                    start_angle: sa, sweep_angle: swa,
                    color: ca, clockwise: cwa,
                },
                Pie {
                    x: xb, y: yb, r: rb,
                    start_angle: sb, sweep_angle: swb,
                    color: cb, clockwise: cwb,
                },
            ) => {
                feq(*xa, *xb)
                    && feq(*ya, *yb)
                    && feq(*ra, *rb)
                    && feq(*sa, *sb)
                    && feq(*swa, *swb)
                    && ca == cb
                    && cwa == cwb
            }

            (
                Ring {
                    x: xa, y: ya,
                    outer_radius: oa, inner_radius: ina,
                    start_angle: sa, sweep_angle: swa,
                    color: ca, clockwise: cwa,
                },
                Ring {
                    x: xb, y: yb,
                    outer_radius: ob, inner_radius: inb,
                    start_angle: sb, sweep_angle: swb,
                    color: cb, clockwise: cwb,
                },
            ) => {
                feq(*xa, *xb)
                    && feq(*ya, *yb)
                    && feq(*oa, *ob)
                    && feq(*ina, *inb)
                    && feq(*sa, *sb)
                    && feq(*swa, *swb)
                    && ca == cb
                    && cwa == cwb
            }

            _ => false,
        }
    }

    /// Whether this operation produces a cached vector geometry object.
    ///
    /// Lines and images are drawn directly; text is compared per slot but
    /// its shaping lives in the font's layout cache instead.
    pub fn carries_geometry(&self) -> bool {
        !matches!(
            self,
            Command::Text { .. } | Command::Line { .. } | Command::Image { .. }
        )
    }

    /// Whether the positional cache skips this operation entirely
    pub fn is_uncached(&self) -> bool {
        matches!(self, Command::Line { .. } | Command::Image { .. })
    }
}
