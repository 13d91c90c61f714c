//! Rasterisation: compose the final RGBA canvas.
//!
//! The canvas starts fully transparent, is filled with the background when
//! that colour has any alpha, and then receives the text drawn from the
//! top-left corner, one glyph cell per character. Nothing wraps; glyphs that
//! fall outside the canvas are clipped.

use crate::error::Text2ImgError;
use crate::font::{GlyphMask, MonoFace};
use crate::pipeline::metrics::CanvasSize;
use crate::pipeline::normalize::NormalizedText;
use image::{Rgba, RgbaImage};
use std::collections::HashMap;
use tracing::debug;

/// Allocate a transparent canvas, failing instead of aborting when the
/// buffer cannot be reserved.
pub fn allocate_canvas(size: CanvasSize) -> Result<RgbaImage, Text2ImgError> {
    if size.is_empty() {
        return Err(Text2ImgError::EmptyCanvas {
            width: size.width,
            height: size.height,
        });
    }
    let too_large = || Text2ImgError::CanvasTooLarge {
        width: size.width.into(),
        height: size.height.into(),
    };

    let len = (size.width as usize)
        .checked_mul(size.height as usize)
        .and_then(|n| n.checked_mul(4))
        .filter(|&n| n <= isize::MAX as usize)
        .ok_or_else(too_large)?;
    let mut buffer: Vec<u8> = Vec::new();
    buffer.try_reserve_exact(len).map_err(|_| too_large())?;
    buffer.resize(len, 0);

    RgbaImage::from_raw(size.width, size.height, buffer).ok_or_else(too_large)
}

/// Render `text` onto a fresh canvas of `size`.
pub fn render(
    text: &NormalizedText,
    size: CanvasSize,
    face: &dyn MonoFace,
    foreground: Rgba<u8>,
    background: Rgba<u8>,
) -> Result<RgbaImage, Text2ImgError> {
    let mut canvas = allocate_canvas(size)?;
    if background[3] != 0 {
        for pixel in canvas.pixels_mut() {
            *pixel = background;
        }
    }

    let line_height = face.line_height();
    let mut glyphs: HashMap<char, GlyphMask> = HashMap::new();
    let mut drawn = 0usize;

    for (row, line) in text.lines().enumerate() {
        let y = (row as f32 * line_height).round() as i64;
        if y >= i64::from(size.height) {
            break;
        }
        let mut pen_x = 0.0f32;
        for ch in line.chars() {
            let x = pen_x.round() as i64;
            pen_x += face.advance(ch);
            if x >= i64::from(size.width) {
                continue;
            }
            let mask = glyphs.entry(ch).or_insert_with(|| face.rasterize(ch));
            if mask.is_empty() {
                continue;
            }
            blit(&mut canvas, mask, x, y, foreground);
            drawn += 1;
        }
    }

    debug!(
        "Rasterised {} glyphs onto {}x{} canvas",
        drawn,
        canvas.width(),
        canvas.height()
    );
    Ok(canvas)
}

/// Composite `mask` in `color` with its cell origin at (`cell_x`, `cell_y`).
fn blit(canvas: &mut RgbaImage, mask: &GlyphMask, cell_x: i64, cell_y: i64, color: Rgba<u8>) {
    let (width, height) = (i64::from(canvas.width()), i64::from(canvas.height()));
    let origin_x = cell_x + i64::from(mask.left);
    let origin_y = cell_y + i64::from(mask.top);

    for my in 0..mask.height {
        let py = origin_y + my as i64;
        if py < 0 || py >= height {
            continue;
        }
        for mx in 0..mask.width {
            let px = origin_x + mx as i64;
            if px < 0 || px >= width {
                continue;
            }
            let coverage = mask.coverage[my * mask.width + mx];
            if coverage == 0 {
                continue;
            }
            blend(canvas.get_pixel_mut(px as u32, py as u32), color, coverage);
        }
    }
}

/// Source-over compositing of `src` scaled by `coverage` onto `dst`.
fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>, coverage: u8) {
    let sa = u32::from(src[3]) * u32::from(coverage) / 255;
    if sa == 0 {
        return;
    }
    let da = u32::from(dst[3]) * (255 - sa) / 255;
    let out_a = sa + da;
    for i in 0..3 {
        let c = (u32::from(src[i]) * sa + u32::from(dst[i]) * da) / out_a;
        dst[i] = c.min(255) as u8;
    }
    dst[3] = out_a.min(255) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BLACK, TRANSPARENT, WHITE};
    use crate::font::BitmapFace;
    use crate::pipeline::metrics::exact_size;
    use crate::pipeline::normalize::normalize;

    fn has_ink(img: &RgbaImage, rows: std::ops::Range<u32>) -> bool {
        rows.flat_map(|y| (0..img.width()).map(move |x| (x, y)))
            .any(|(x, y)| img.get_pixel(x, y)[3] != 0)
    }

    #[test]
    fn two_lines_give_two_inked_bands() {
        let face = BitmapFace::new(2);
        let text = normalize("Hello\r\nWorld");
        let size = exact_size(&text, &face);
        assert_eq!(size, CanvasSize { width: 80, height: 32 });

        let img = render(&text, size, &face, BLACK, TRANSPARENT).unwrap();
        assert!(has_ink(&img, 0..16));
        assert!(has_ink(&img, 16..32));
    }

    #[test]
    fn default_background_stays_transparent() {
        let face = BitmapFace::new(1);
        let text = normalize("  ");
        let img = render(&text, CanvasSize { width: 16, height: 8 }, &face, BLACK, TRANSPARENT)
            .unwrap();
        assert!(img.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn opaque_background_fills_canvas() {
        let face = BitmapFace::new(1);
        let text = normalize("|");
        let img = render(&text, CanvasSize { width: 8, height: 8 }, &face, BLACK, WHITE).unwrap();
        assert!(img.pixels().all(|p| p[3] == 255));
        assert!(img.pixels().any(|p| *p == WHITE));
        assert!(img.pixels().any(|p| *p == BLACK));
    }

    #[test]
    fn glyphs_outside_canvas_are_clipped() {
        let face = BitmapFace::new(1);
        let text = normalize("WWWW\nWWWW\nWWWW");
        let img = render(&text, CanvasSize { width: 12, height: 10 }, &face, BLACK, TRANSPARENT)
            .unwrap();
        assert_eq!(img.dimensions(), (12, 10));
    }

    #[test]
    fn zero_area_is_an_error() {
        let face = BitmapFace::new(1);
        let err = render(&normalize(""), CanvasSize { width: 0, height: 8 }, &face, BLACK, TRANSPARENT)
            .unwrap_err();
        assert!(matches!(err, Text2ImgError::EmptyCanvas { .. }));
    }

    #[test]
    fn blend_partial_coverage_over_white() {
        let mut px = WHITE;
        blend(&mut px, BLACK, 128);
        assert_eq!(px[3], 255);
        assert!(px[0] > 100 && px[0] < 160, "got {px:?}");
    }

    #[test]
    fn blend_onto_transparent_keeps_source_colour() {
        let mut px = TRANSPARENT;
        blend(&mut px, Rgba([200, 10, 20, 255]), 255);
        assert_eq!(px, Rgba([200, 10, 20, 255]));
    }
}
