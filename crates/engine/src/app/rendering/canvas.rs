use crate::assets::{FrameRect, SpriteSheet};
use crate::geometry::Rect;

use super::glyphs::{glyph_advance, glyph_for, GLYPH_HEIGHT, GLYPH_WIDTH};

pub type Rgba = [u8; 4];

/// Borrowed RGBA8 frame with clipped drawing primitives. Every write is
/// bounds checked, so callers may pass partially or fully off-screen shapes.
pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    /// `None` for a zero-sized surface or a buffer that does not match the
    /// requested dimensions.
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        if frame.len() != expected {
            return None;
        }
        Some(Self {
            frame,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear(&mut self, color: Rgba) {
        for pixel in self.frame.chunks_exact_mut(4) {
            pixel.copy_from_slice(&color);
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        let offset = self.byte_offset(x, y)?;
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.frame[offset..offset + 4]);
        Some(out)
    }

    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        let alpha = color[3];
        if alpha == 0 {
            return;
        }
        let Some(offset) = self.byte_offset(x, y) else {
            return;
        };
        let dst = &mut self.frame[offset..offset + 4];
        if alpha == u8::MAX {
            dst.copy_from_slice(&color);
            return;
        }
        let src_weight = alpha as u16;
        let dst_weight = 255 - src_weight;
        for channel in 0..3 {
            dst[channel] =
                ((color[channel] as u16 * src_weight + dst[channel] as u16 * dst_weight) / 255) as u8;
        }
        dst[3] = dst[3].max(alpha);
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        let Some((left, top, right, bottom)) = self.clip(rect) else {
            return;
        };
        for y in top..bottom {
            for x in left..right {
                self.blend_pixel(x, y, color);
            }
        }
    }

    pub fn stroke_rect(&mut self, rect: Rect, thickness: f32, color: Rgba) {
        let t = thickness.max(1.0);
        if rect.width <= t * 2.0 || rect.height <= t * 2.0 {
            self.fill_rect(rect, color);
            return;
        }
        self.fill_rect(Rect { height: t, ..rect }, color);
        self.fill_rect(
            Rect {
                top: rect.bottom() - t,
                height: t,
                ..rect
            },
            color,
        );
        let inner_top = rect.top + t;
        let inner_height = rect.height - t * 2.0;
        self.fill_rect(
            Rect {
                top: inner_top,
                width: t,
                height: inner_height,
                ..rect
            },
            color,
        );
        self.fill_rect(
            Rect {
                left: rect.right() - t,
                top: inner_top,
                width: t,
                height: inner_height,
            },
            color,
        );
    }

    /// Nearest-neighbour blit of `src` from `sheet` into `dst`, optionally
    /// mirrored horizontally. Fully transparent texels are skipped.
    pub fn draw_sprite(&mut self, sheet: &SpriteSheet, src: FrameRect, dst: Rect, mirror_x: bool) {
        if src.width == 0 || src.height == 0 {
            return;
        }
        let dst_left = dst.left.round() as i32;
        let dst_top = dst.top.round() as i32;
        let dst_width = dst.width.round() as i32;
        let dst_height = dst.height.round() as i32;
        if dst_width <= 0 || dst_height <= 0 {
            return;
        }
        let Some((left, top, right, bottom)) = self.clip(dst) else {
            return;
        };
        let x_ratio = src.width as f32 / dst_width as f32;
        let y_ratio = src.height as f32 / dst_height as f32;

        for out_y in top..bottom {
            let v = (((out_y - dst_top) as f32 * y_ratio) as u32).min(src.height - 1);
            for out_x in left..right {
                let u = (((out_x - dst_left) as f32 * x_ratio) as u32).min(src.width - 1);
                let u = if mirror_x { src.width - 1 - u } else { u };
                let Some(texel) = sheet.pixel(src.x + u, src.y + v) else {
                    continue;
                };
                self.blend_pixel(out_x, out_y, texel);
            }
        }
    }

    /// Stretches the whole sheet over the canvas.
    pub fn draw_backdrop(&mut self, sheet: &SpriteSheet) {
        let dst = Rect {
            left: 0.0,
            top: 0.0,
            width: self.width as f32,
            height: self.height as f32,
        };
        self.draw_sprite(sheet, sheet.full_rect(), dst, false);
    }

    /// Draws `text` with its top-left corner at (`x`, `y`).
    pub fn draw_text(&mut self, x: f32, y: f32, text: &str, scale: i32, color: Rgba) {
        let scale = scale.max(1);
        let mut origin_x = x.round() as i32;
        let origin_y = y.round() as i32;
        for ch in text.chars() {
            let glyph = glyph_for(ch);
            for row in 0..GLYPH_HEIGHT {
                for col in 0..GLYPH_WIDTH {
                    if !glyph.is_set(col, row) {
                        continue;
                    }
                    for sy in 0..scale {
                        for sx in 0..scale {
                            self.blend_pixel(
                                origin_x + col * scale + sx,
                                origin_y + row * scale + sy,
                                color,
                            );
                        }
                    }
                }
            }
            origin_x += glyph_advance(scale);
        }
    }

    fn byte_offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        let pixel = (y as usize)
            .checked_mul(self.width as usize)?
            .checked_add(x as usize)?;
        let offset = pixel.checked_mul(4)?;
        (offset + 4 <= self.frame.len()).then_some(offset)
    }

    fn clip(&self, rect: Rect) -> Option<(i32, i32, i32, i32)> {
        if !(rect.left.is_finite() && rect.top.is_finite() && rect.width.is_finite() && rect.height.is_finite()) {
            return None;
        }
        let left = (rect.left.round() as i32).max(0);
        let top = (rect.top.round() as i32).max(0);
        let right = (rect.right().round() as i32).min(self.width as i32);
        let bottom = (rect.bottom().round() as i32).min(self.height as i32);
        (left < right && top < bottom).then_some((left, top, right, bottom))
    }
}
