//! Page image decoding, caching and terminal graphics setup.
//!
//! Supports multiple terminal graphics protocols through `ratatui-image`:
//! - Kitty graphics protocol
//! - Sixel
//! - iTerm2
//! - Unicode half-blocks (fallback)

mod loader;

pub use loader::{ImageCache, ImageLoader};

use std::time::Duration;

use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use ratatui::layout::Rect;
use ratatui_image::picker::Picker;
#[cfg(unix)]
use ratatui_image::picker::cap_parser::QueryStdioOptions;

const PICKER_QUERY_TIMEOUT_MS: u64 = 250;

/// Cell size in pixels assumed when no picker is available.
pub const FALLBACK_FONT_SIZE: (u16, u16) = (8, 16);

/// Create a picker for terminal image rendering.
///
/// The picker detects terminal capabilities and chooses the best protocol.
pub fn create_picker(force_half_cell: bool) -> Option<Picker> {
    if force_half_cell {
        tracing::debug!(target: "folio::render", "half-cell rendering forced");
        return Some(Picker::halfblocks());
    }

    // On Windows, skip the stdio capability query: it can leave orphaned reader
    // threads on the console input buffer. Fall back to half-block rendering.
    #[cfg(not(unix))]
    {
        tracing::debug!(target: "folio::render", "graphics query skipped on this platform");
        return Some(Picker::halfblocks());
    }

    #[cfg(unix)]
    {
        let picker = match Picker::from_query_stdio_with_options(query_options()) {
            Ok(picker) => picker,
            Err(err) => {
                tracing::warn!("terminal graphics query failed, using half blocks: {err}");
                Picker::halfblocks()
            }
        };
        tracing::debug!(
            target: "folio::render",
            protocol = ?picker.protocol_type(),
            font = ?picker.font_size(),
            "graphics picker ready"
        );
        Some(picker)
    }
}

/// Scale `image` to fit inside `area` cells, preserving aspect ratio.
///
/// Returns the scaled image and the cell size it occupies. `None` when the
/// area or image is empty.
pub fn fit_to_cells(
    image: &DynamicImage,
    area: Rect,
    font_size: (u16, u16),
    smooth: bool,
) -> Option<(DynamicImage, u16, u16)> {
    let (img_w, img_h) = image.dimensions();
    if area.width == 0 || area.height == 0 || img_w == 0 || img_h == 0 {
        return None;
    }
    let font_w = u32::from(font_size.0.max(1));
    let font_h = u32::from(font_size.1.max(1));
    let max_w = u32::from(area.width) * font_w;
    let max_h = u32::from(area.height) * font_h;
    let filter = if smooth {
        image::imageops::FilterType::CatmullRom
    } else {
        image::imageops::FilterType::Nearest
    };
    let scaled = image.resize(max_w, max_h, filter);
    let (w, h) = scaled.dimensions();
    #[allow(clippy::cast_possible_truncation)]
    // Both values are bounded by the area, which is u16.
    let cols = w.div_ceil(font_w).clamp(1, u32::from(area.width)) as u16;
    #[allow(clippy::cast_possible_truncation)]
    let rows = h.div_ceil(font_h).clamp(1, u32::from(area.height)) as u16;
    Some((scaled, cols, rows))
}

/// Whether terminal output should be treated as truecolor-capable.
pub fn supports_truecolor_terminal() -> bool {
    if let Ok(force) = std::env::var("FOLIO_TRUECOLOR") {
        let value = force.to_ascii_lowercase();
        return matches!(value.as_str(), "1" | "true" | "yes" | "on");
    }
    if std::env::var("TERM_PROGRAM")
        .ok()
        .as_deref()
        .is_some_and(|v| v == "Apple_Terminal")
    {
        return false;
    }
    supports_truecolor_from_env(
        std::env::var("COLORTERM").ok().as_deref(),
        std::env::var("TERM").ok().as_deref(),
    )
}

/// Quantize image RGB channels to the ANSI-256 palette while preserving alpha.
pub fn quantize_to_ansi256(image: &DynamicImage) -> DynamicImage {
    let (width, height) = image.dimensions();
    let mut out = RgbaImage::new(width, height);
    let src = image.to_rgba8();

    for (x, y, px) in src.enumerate_pixels() {
        let idx = rgb_to_xterm_256(px[0], px[1], px[2]);
        let (r, g, b) = xterm_256_to_rgb(idx);
        out.put_pixel(x, y, Rgba([r, g, b, px[3]]));
    }

    DynamicImage::ImageRgba8(out)
}

#[cfg(unix)]
fn query_options() -> QueryStdioOptions {
    let mut options = QueryStdioOptions::default();
    options.timeout = Duration::from_millis(PICKER_QUERY_TIMEOUT_MS);
    options
}

fn supports_truecolor_from_env(colorterm: Option<&str>, term: Option<&str>) -> bool {
    if let Some(ct) = colorterm {
        let lower = ct.to_ascii_lowercase();
        if lower.contains("truecolor") || lower.contains("24bit") {
            return true;
        }
    }
    if let Some(t) = term {
        let lower = t.to_ascii_lowercase();
        if lower.contains("direct") || lower.contains("truecolor") {
            return true;
        }
    }
    false
}

/// Nearest colour-cube entry of the xterm 256 palette.
pub fn rgb_to_xterm_256(r: u8, g: u8, b: u8) -> u8 {
    #[allow(clippy::cast_possible_truncation)]
    let to_cube = |v: u8| ((u16::from(v) * 5) / 255) as u8;
    let ri = to_cube(r);
    let gi = to_cube(g);
    let bi = to_cube(b);
    16 + (36 * ri) + (6 * gi) + bi
}

fn xterm_256_to_rgb(i: u8) -> (u8, u8, u8) {
    match i {
        0 => (0, 0, 0),
        1 => (205, 0, 0),
        2 => (0, 205, 0),
        3 => (205, 205, 0),
        4 => (0, 0, 238),
        5 => (205, 0, 205),
        6 => (0, 205, 205),
        7 => (229, 229, 229),
        8 => (127, 127, 127),
        9 => (255, 0, 0),
        10 => (0, 255, 0),
        11 => (255, 255, 0),
        12 => (92, 92, 255),
        13 => (255, 0, 255),
        14 => (0, 255, 255),
        15 => (255, 255, 255),
        16..=231 => {
            let i = i - 16;
            let r = (i / 36) % 6;
            let g = (i / 6) % 6;
            let b = i % 6;
            let to_val = |c: u8| if c == 0 { 0 } else { 55 + c * 40 };
            (to_val(r), to_val(g), to_val(b))
        }
        232..=255 => {
            let gray = 8 + (i - 232) * 10;
            (gray, gray, gray)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_picker_query_timeout_is_fast() {
        let options = query_options();
        assert_eq!(options.timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_supports_truecolor_from_env_detects_24bit() {
        assert!(supports_truecolor_from_env(
            Some("truecolor"),
            Some("xterm-256color")
        ));
        assert!(supports_truecolor_from_env(Some("24BIT"), Some("screen")));
    }

    #[test]
    fn test_supports_truecolor_from_env_detects_non_truecolor() {
        assert!(!supports_truecolor_from_env(None, Some("xterm-256color")));
    }

    #[test]
    fn test_quantize_to_ansi256_preserves_alpha() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([12, 34, 56, 77])));
        let quantized = quantize_to_ansi256(&image).to_rgba8();
        assert_eq!(quantized.get_pixel(0, 0)[3], 77);
    }

    #[test]
    fn test_fit_to_cells_preserves_aspect_for_portrait_page() {
        let page = DynamicImage::ImageRgba8(RgbaImage::new(400, 800));
        let (scaled, cols, rows) =
            fit_to_cells(&page, Rect::new(0, 0, 40, 20), (8, 16), false).unwrap();
        // 20 rows * 16px = 320px tall; width follows at 160px = 20 cols.
        assert_eq!(scaled.dimensions(), (160, 320));
        assert_eq!((cols, rows), (20, 20));
    }

    #[test]
    fn test_fit_to_cells_rejects_empty_area() {
        let page = DynamicImage::ImageRgba8(RgbaImage::new(10, 10));
        assert!(fit_to_cells(&page, Rect::new(0, 0, 0, 5), (8, 16), false).is_none());
    }
}
