use serde::{Deserialize, Serialize};

use crate::tracking::TrackedPoint;

/// Pixel size of the surface the normalized points are projected onto.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn project(&self, p: TrackedPoint) -> (f64, f64) {
        (p.x * self.width, p.y * self.height)
    }
}

/// Rectangle spanned by two fingertips, snapped to whole grid units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantizedRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub unit_w: u32,
    pub unit_h: u32,
    pub snapped_right: f64,
    pub snapped_bottom: f64,
}

impl QuantizedRect {
    pub fn dims(&self) -> (u32, u32) {
        (self.unit_w, self.unit_h)
    }

    /// Saturates at `u32::MAX` for grids too fine to count.
    pub fn area(&self) -> u32 {
        self.unit_w.saturating_mul(self.unit_h)
    }

    pub fn perimeter(&self) -> u32 {
        self.unit_w.saturating_add(self.unit_h).saturating_mul(2)
    }

    pub fn snapped_width(&self) -> f64 {
        self.snapped_right - self.left
    }

    pub fn snapped_height(&self) -> f64 {
        self.snapped_bottom - self.top
    }

    /// Centre of the snapped box, where the dimension label goes.
    pub fn centre(&self) -> (f64, f64) {
        (
            self.left + self.snapped_width() / 2.0,
            self.top + self.snapped_height() / 2.0,
        )
    }

    pub fn dimension_label(&self) -> String {
        format!("{} x {}", self.unit_w, self.unit_h)
    }
}

/// Count of whole units in `extent`, never below one.
fn units(extent: f64, unit_px: f64) -> u32 {
    let n = (extent / unit_px).round();
    if n.is_finite() && n >= 1.0 {
        n as u32
    } else {
        1
    }
}

/// Snap the box spanned by `a` and `b` to the grid.
///
/// Always yields a shape of at least 1x1; coincident points are a valid
/// (degenerate) gesture, not an error.
pub fn quantize(a: TrackedPoint, b: TrackedPoint, canvas: Canvas, unit_px: f64) -> QuantizedRect {
    let (ax, ay) = canvas.project(a);
    let (bx, by) = canvas.project(b);

    let left = ax.min(bx);
    let right = ax.max(bx);
    let top = ay.min(by);
    let bottom = ay.max(by);

    let unit_w = units(right - left, unit_px);
    let unit_h = units(bottom - top, unit_px);

    QuantizedRect {
        left,
        top,
        right,
        bottom,
        unit_w,
        unit_h,
        snapped_right: left + unit_w as f64 * unit_px,
        snapped_bottom: top + unit_h as f64 * unit_px,
    }
}
