//! Vector geometry construction
//!
//! Builds the lyon path for each shape command. Paths are what the
//! positional cache stores per slot, so construction has to be a pure
//! function of the command parameters: the same command always produces
//! the same path.
//!
//! Angle conventions follow the script API: degrees, measured from the
//! positive X axis, increasing clockwise in the y-down pixel space.

use lyon::math::{point, vector, Angle, Box2D};
use lyon::path::builder::{BorderRadii, SvgPathBuilder};
use lyon::path::{ArcFlags, Path, Winding};
use scrim_draw::Command;

/// Build the vector geometry for `command`.
///
/// Returns `None` for operations that carry no geometry object (text,
/// lines, images) and for degenerate arcs that draw nothing.
pub fn build(command: &Command) -> Option<Path> {
    match command {
        Command::Text { .. } | Command::Line { .. } | Command::Image { .. } => None,

        Command::FillRect { x, y, w, h, .. } => Some(rect(*x, *y, *w, *h)),
        Command::OutlineRect { x, y, w, h, .. } => Some(rect(*x, *y, *w, *h)),

        Command::RoundedRect {
            x, y, w, h, rx, ry, ..
        }
        | Command::FillRoundedRect {
            x, y, w, h, rx, ry, ..
        } => Some(rounded_rect(*x, *y, *w, *h, *rx, *ry)),

        Command::Quad {
            x1, y1, x2, y2, x3, y3, x4, y4, ..
        }
        | Command::FillQuad {
            x1, y1, x2, y2, x3, y3, x4, y4, ..
        } => Some(quad(*x1, *y1, *x2, *y2, *x3, *y3, *x4, *y4)),

        Command::FillCircle { x, y, rx, ry, .. } | Command::Circle { x, y, rx, ry, .. } => {
            Some(ellipse(*x, *y, *rx, *ry))
        }

        Command::Pie {
            x,
            y,
            r,
            start_angle,
            sweep_angle,
            clockwise,
            ..
        } => pie(*x, *y, *r, *start_angle, *sweep_angle, *clockwise),

        Command::Ring {
            x,
            y,
            outer_radius,
            inner_radius,
            start_angle,
            sweep_angle,
            clockwise,
            ..
        } => ring(
            *x,
            *y,
            *outer_radius,
            *inner_radius,
            *start_angle,
            *sweep_angle,
            *clockwise,
        ),
    }
}

/// Axis-aligned rectangle from position and size
pub fn rect(x: f32, y: f32, w: f32, h: f32) -> Path {
    let mut builder = Path::builder();
    builder.add_rectangle(
        &Box2D::new(point(x, y), point(x + w, y + h)),
        Winding::Positive,
    );
    builder.build()
}

/// Rectangle with rounded corners.
///
/// Corner rounding is circular; the tighter of the two requested radii is
/// used for both axes.
pub fn rounded_rect(x: f32, y: f32, w: f32, h: f32, rx: f32, ry: f32) -> Path {
    let mut builder = Path::builder();
    builder.add_rounded_rectangle(
        &Box2D::new(point(x, y), point(x + w, y + h)),
        &BorderRadii::new(rx.min(ry)),
        Winding::Positive,
    );
    builder.build()
}

/// Closed four-point polygon in the given vertex order
#[allow(clippy::too_many_arguments)]
pub fn quad(x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32, x4: f32, y4: f32) -> Path {
    let mut builder = Path::builder();
    builder.begin(point(x1, y1));
    builder.line_to(point(x2, y2));
    builder.line_to(point(x3, y3));
    builder.line_to(point(x4, y4));
    builder.end(true);
    builder.build()
}

/// Centered ellipse with independent X/Y radii
pub fn ellipse(cx: f32, cy: f32, rx: f32, ry: f32) -> Path {
    let mut builder = Path::builder();
    builder.add_ellipse(point(cx, cy), vector(rx, ry), Angle::radians(0.0), Winding::Positive);
    builder.build()
}

/// Circular sector.
///
/// Returns `None` when the clamped sweep is zero; a full 360 degree sweep
/// degenerates to the whole circle rather than an arc with coincident
/// endpoints.
pub fn pie(cx: f32, cy: f32, r: f32, start_angle: f32, sweep_angle: f32, clockwise: bool) -> Option<Path> {
    let sweep = sweep_angle.clamp(0.0, 360.0);
    if sweep == 0.0 {
        return None;
    }
    if sweep >= 360.0 {
        return Some(ellipse(cx, cy, r, r));
    }

    let start_rad = normalize_start(start_angle).to_radians();
    let end_rad = arc_end(start_rad, sweep, clockwise);

    let center = point(cx, cy);
    let arc_start = point(cx + r * start_rad.cos(), cy + r * start_rad.sin());
    let arc_end = point(cx + r * end_rad.cos(), cy + r * end_rad.sin());

    let mut builder = Path::builder().with_svg();
    builder.move_to(center);
    builder.line_to(arc_start);
    builder.arc_to(
        vector(r, r),
        Angle::radians(0.0),
        ArcFlags {
            large_arc: sweep > 180.0,
            sweep: clockwise,
        },
        arc_end,
    );
    builder.line_to(center);
    builder.close();
    Some(builder.build())
}

/// Annulus sector between two radii.
///
/// Same degeneracies as [`pie`]: zero sweep draws nothing, a full sweep
/// becomes the whole annulus.
pub fn ring(
    cx: f32,
    cy: f32,
    outer_radius: f32,
    inner_radius: f32,
    start_angle: f32,
    sweep_angle: f32,
    clockwise: bool,
) -> Option<Path> {
    let sweep = sweep_angle.clamp(0.0, 360.0);
    if sweep == 0.0 {
        return None;
    }
    if sweep >= 360.0 {
        return Some(annulus(cx, cy, outer_radius, inner_radius));
    }

    let start_rad = normalize_start(start_angle).to_radians();
    let end_rad = arc_end(start_rad, sweep, clockwise);
    let large_arc = sweep > 180.0;

    let at = |radius: f32, angle: f32| point(cx + radius * angle.cos(), cy + radius * angle.sin());
    let outer_start = at(outer_radius, start_rad);
    let outer_end = at(outer_radius, end_rad);
    let inner_end = at(inner_radius, end_rad);
    let inner_start = at(inner_radius, start_rad);

    // Outer arc out, straight edge in, inner arc traced back the opposite
    // way, straight edge out again.
    let mut builder = Path::builder().with_svg();
    builder.move_to(outer_start);
    builder.arc_to(
        vector(outer_radius, outer_radius),
        Angle::radians(0.0),
        ArcFlags {
            large_arc,
            sweep: clockwise,
        },
        outer_end,
    );
    builder.line_to(inner_end);
    builder.arc_to(
        vector(inner_radius, inner_radius),
        Angle::radians(0.0),
        ArcFlags {
            large_arc,
            sweep: !clockwise,
        },
        inner_start,
    );
    builder.line_to(outer_start);
    builder.close();
    Some(builder.build())
}

/// Full annulus: outer ellipse minus inner ellipse.
///
/// The inner subpath winds the other way so the hole falls out under the
/// non-zero fill rule.
pub fn annulus(cx: f32, cy: f32, outer_radius: f32, inner_radius: f32) -> Path {
    let mut builder = Path::builder();
    builder.add_ellipse(
        point(cx, cy),
        vector(outer_radius, outer_radius),
        Angle::radians(0.0),
        Winding::Positive,
    );
    builder.add_ellipse(
        point(cx, cy),
        vector(inner_radius, inner_radius),
        Angle::radians(0.0),
        Winding::Negative,
    );
    builder.build()
}

fn normalize_start(start_angle: f32) -> f32 {
    let start = if start_angle < 0.0 {
        start_angle + 360.0
    } else {
        start_angle
    };
    start.clamp(0.0, 360.0)
}

fn arc_end(start_rad: f32, sweep_deg: f32, clockwise: bool) -> f32 {
    if clockwise {
        start_rad + sweep_deg.to_radians()
    } else {
        start_rad - sweep_deg.to_radians()
    }
}
