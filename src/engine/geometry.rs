// src/engine/geometry.rs
//
// Target box arithmetic and source rectangles for compositing.

use crate::ops::{CompositeMode, ResizePolicy};

/// Axis-aligned rectangle in pixel space. Coordinates are fractional, as
/// they are for a 2D canvas draw call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle anchored at the origin.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f64, height as f64)
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Intersect with `[0, width) x [0, height)`.
    pub fn clip_to(&self, width: u32, height: u32) -> Self {
        let x0 = self.x.max(0.0);
        let y0 = self.y.max(0.0);
        let x1 = (self.x + self.width).min(width as f64);
        let y1 = (self.y + self.height).min(height as f64);
        Self::new(x0, y0, (x1 - x0).max(0.0), (y1 - y0).max(0.0))
    }

    pub fn covers(&self, width: u32, height: u32) -> bool {
        self.x <= 0.0
            && self.y <= 0.0
            && self.x + self.width >= width as f64
            && self.y + self.height >= height as f64
    }
}

/// Target pixel box for a source of `src_w x src_h` under `policy`.
///
/// A fixed ratio is fit *within* the source: the constraining side is kept
/// and the other side shrunk to match the ratio. Fractional sides are
/// rounded, and may round to zero; such a box fails the surface check.
/// The policy must already be validated.
pub fn target_dimensions(src_w: u32, src_h: u32, policy: &ResizePolicy) -> (u32, u32) {
    match *policy {
        ResizePolicy::ExplicitDimensions { width, height } => (width, height),
        ResizePolicy::FixedRatio(ratio) => {
            let current = src_w as f64 / src_h as f64;
            if current > ratio {
                // Source is wider than the target ratio
                (round_side(src_h as f64 * ratio), src_h)
            } else {
                // Source is taller (or equal)
                (src_w, round_side(src_w as f64 / ratio))
            }
        }
        ResizePolicy::Original => (src_w, src_h),
    }
}

fn round_side(value: f64) -> u32 {
    // `as` saturates, so huge values land on u32::MAX and fail the surface check
    value.round() as u32
}

/// Offset of a target-sized window centered on the source. Negative when
/// the target is larger than the source along an axis.
pub fn centered_offset(src_w: u32, src_h: u32, target_w: u32, target_h: u32) -> (f64, f64) {
    (
        (src_w as f64 - target_w as f64) / 2.0,
        (src_h as f64 - target_h as f64) / 2.0,
    )
}

/// Largest centered region of the source with the target's aspect ratio.
pub fn cover_source_rect(src_w: u32, src_h: u32, target_w: u32, target_h: u32) -> Rect {
    let (sw, sh) = (src_w as f64, src_h as f64);
    let target_ratio = target_w as f64 / target_h as f64;
    if sw / sh > target_ratio {
        let width = sh * target_ratio;
        Rect::new((sw - width) / 2.0, 0.0, width, sh)
    } else {
        let height = sw / target_ratio;
        Rect::new(0.0, (sh - height) / 2.0, sw, height)
    }
}

/// Region of the source drawn onto the target surface.
pub fn source_rect(
    mode: CompositeMode,
    src_w: u32,
    src_h: u32,
    target_w: u32,
    target_h: u32,
) -> Rect {
    match mode {
        CompositeMode::Stretch => Rect::from_size(src_w, src_h),
        CompositeMode::CoverCrop => cover_source_rect(src_w, src_h, target_w, target_h),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_clip() {
        let rect = Rect::new(-5.0, 10.0, 30.0, 100.0).clip_to(20, 50);
        assert_eq!(rect, Rect::new(0.0, 10.0, 20.0, 40.0));
        assert!(Rect::new(30.0, 0.0, 5.0, 5.0).clip_to(20, 20).is_empty());
    }

    #[test]
    fn test_rect_covers() {
        assert!(Rect::from_size(10, 10).covers(10, 10));
        assert!(!Rect::new(1.0, 0.0, 10.0, 10.0).covers(10, 10));
        assert!(Rect::new(0.0, 0.0, 0.0, 3.0).is_empty());
    }
}
