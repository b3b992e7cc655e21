//! Magnifying lens coordinate mapping.
//!
//! The lens shows the page scaled by [`MAGNIFICATION`] and shifted so the
//! point under the pointer sits in the middle of the lens. All values are in
//! pixels relative to the top-left corner of the page's rendered box.

/// Zoom factor of the lens.
pub const MAGNIFICATION: f32 = 1.25;

/// Pointer and geometry for one lens update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LensInput {
    /// Pointer offset from the rendered image's top-left corner.
    pub pointer: (f32, f32),
    /// Rendered image size.
    pub rendered: (f32, f32),
    /// Lens size.
    pub lens: (f32, f32),
    pub magnification: f32,
}

impl LensInput {
    pub const fn new(pointer: (f32, f32), rendered: (f32, f32), lens: (f32, f32)) -> Self {
        Self {
            pointer,
            rendered,
            lens,
            magnification: MAGNIFICATION,
        }
    }

    fn pointer_inside(&self) -> bool {
        let (x, y) = self.pointer;
        let (w, h) = self.rendered;
        x >= 0.0 && y >= 0.0 && x <= w && y <= h
    }
}

/// Lens background placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LensFrame {
    /// Size of the zoomed page backing the lens.
    pub background_size: (f32, f32),
    /// Offset of the zoomed page inside the lens, usually negative.
    pub background_position: (f32, f32),
    /// Lens size the frame was computed for.
    pub lens: (f32, f32),
    /// 1.0 when shown, 0.0 when hidden.
    pub opacity: f32,
}

impl LensFrame {
    pub const fn hidden() -> Self {
        Self {
            background_size: (0.0, 0.0),
            background_position: (0.0, 0.0),
            lens: (0.0, 0.0),
            opacity: 0.0,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }

    /// Region of a `source`-sized image that the lens currently shows.
    ///
    /// Returns `(x, y, width, height)` in source pixels, clipped to the
    /// image. `None` when the frame is hidden or the region is empty.
    pub fn source_crop(&self, source: (u32, u32)) -> Option<(u32, u32, u32, u32)> {
        if !self.is_visible() || self.background_size.0 <= 0.0 || self.background_size.1 <= 0.0 {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let scale_x = source.0 as f32 / self.background_size.0;
        #[allow(clippy::cast_precision_loss)]
        let scale_y = source.1 as f32 / self.background_size.1;

        let (x0, x1) = clip_span(
            -self.background_position.0 * scale_x,
            self.lens.0 * scale_x,
            source.0,
        )?;
        let (y0, y1) = clip_span(
            -self.background_position.1 * scale_y,
            self.lens.1 * scale_y,
            source.1,
        )?;
        Some((x0, y0, x1 - x0, y1 - y0))
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn clip_span(start: f32, length: f32, limit: u32) -> Option<(u32, u32)> {
    let lo = start.max(0.0).floor();
    let hi = (start + length).min(limit as f32).ceil();
    if hi <= lo {
        return None;
    }
    Some((lo as u32, (hi as u32).min(limit)))
}

/// Map a pointer position to the lens background.
///
/// A pointer outside the rendered image hides the lens.
pub fn map_lens(input: LensInput) -> LensFrame {
    if !input.pointer_inside() {
        return LensFrame::hidden();
    }
    let m = input.magnification;
    let (x, y) = input.pointer;
    let (w, h) = input.rendered;
    let (lens_w, lens_h) = input.lens;
    LensFrame {
        background_size: (w * m, h * m),
        background_position: (-(x * m - lens_w / 2.0), -(y * m - lens_h / 2.0)),
        lens: input.lens,
        opacity: 1.0,
    }
}
