//! RGBA8 raster surface.
//!
//! The canvas is the sandbox's world: painting, terrain rendering and save
//! files all go through these pixels.

use crate::color::{Rgba, SKY};

/// A 2D RGBA8 pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel data (row-major).
    pub data: Vec<Rgba>,
}

impl Canvas {
    /// Create a new canvas filled with a color.
    pub fn new(width: u32, height: u32, fill: Rgba) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            data: vec![fill; size],
        }
    }

    /// Create a new canvas filled with the sky color.
    pub fn new_sky(width: u32, height: u32) -> Self {
        Self::new(width, height, SKY)
    }

    /// Build a canvas from tightly packed RGBA8 bytes.
    ///
    /// Returns `None` if the byte count does not match the dimensions.
    pub fn from_rgba8(width: u32, height: u32, bytes: &[u8]) -> Option<Self> {
        if bytes.len() != width as usize * height as usize * 4 {
            return None;
        }
        let data = bytes
            .chunks_exact(4)
            .map(|px| Rgba::rgba(px[0], px[1], px[2], px[3]))
            .collect();
        Some(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get a pixel at the given coordinates.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Rgba {
        self.data[self.index(x, y)]
    }

    /// Get a pixel, or `None` outside the canvas.
    #[inline]
    pub fn try_get(&self, x: u32, y: u32) -> Option<Rgba> {
        (x < self.width && y < self.height).then(|| self.get(x, y))
    }

    /// Set a pixel at the given coordinates.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: Rgba) {
        let idx = self.index(x, y);
        self.data[idx] = color;
    }

    /// Fill the whole canvas.
    pub fn fill(&mut self, color: Rgba) {
        self.data.fill(color);
    }

    /// Reset every pixel to the sky color.
    pub fn clear(&mut self) {
        self.fill(SKY);
    }

    /// Fill a rectangle, clipped to the canvas. Replaces pixels (no blending).
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgba) {
        let x_end = x.saturating_add(w).min(self.width);
        let y_end = y.saturating_add(h).min(self.height);
        for py in y.min(y_end)..y_end {
            let row = self.index(0, py);
            self.data[row + x.min(x_end) as usize..row + x_end as usize].fill(color);
        }
    }

    /// Alpha-composite a `w`x`h` region of `src` at (`sx`, `sy`) onto this
    /// canvas at (`dx`, `dy`). Both rectangles are clipped.
    #[allow(clippy::too_many_arguments)]
    pub fn blit(&mut self, src: &Canvas, sx: u32, sy: u32, w: u32, h: u32, dx: u32, dy: u32) {
        let w = w
            .min(src.width.saturating_sub(sx))
            .min(self.width.saturating_sub(dx));
        let h = h
            .min(src.height.saturating_sub(sy))
            .min(self.height.saturating_sub(dy));

        for row in 0..h {
            for col in 0..w {
                let s = src.get(sx + col, sy + row);
                let d = self.get(dx + col, dy + row);
                self.set(dx + col, dy + row, s.over(d));
            }
        }
    }

    /// Composite all of `src` with its top-left corner at (`dx`, `dy`).
    pub fn draw_image(&mut self, src: &Canvas, dx: u32, dy: u32) {
        self.blit(src, 0, 0, src.width, src.height, dx, dy);
    }

    /// Copy a region into a new canvas.
    pub fn crop(&self, x: u32, y: u32, w: u32, h: u32) -> Canvas {
        let mut out = Canvas::new(w, h, Rgba::transparent());
        for row in 0..h {
            for col in 0..w {
                if let Some(px) = self.try_get(x + col, y + row) {
                    out.set(col, row, px);
                }
            }
        }
        out
    }

    /// Convert to 8-bit RGBA bytes.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.data.len() * 4);
        for color in &self.data {
            bytes.extend_from_slice(&color.to_array());
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sky() {
        let c = Canvas::new_sky(4, 3);
        assert_eq!(c.data.len(), 12);
        assert!(c.data.iter().all(|p| *p == SKY));
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut c = Canvas::new_sky(8, 8);
        let red = Rgba::rgb(255, 0, 0);
        c.fill_rect(6, 6, 4, 4, red);
        assert_eq!(c.get(7, 7), red);
        assert_eq!(c.get(6, 6), red);
        assert_eq!(c.get(5, 5), SKY);
        // Fully outside: no panic, no change.
        c.fill_rect(20, 20, 4, 4, red);
    }

    #[test]
    fn test_blit_respects_alpha() {
        let mut src = Canvas::new(2, 1, Rgba::transparent());
        src.set(0, 0, Rgba::rgb(1, 2, 3));
        let mut dst = Canvas::new_sky(4, 4);
        dst.blit(&src, 0, 0, 2, 1, 1, 1);
        assert_eq!(dst.get(1, 1), Rgba::rgb(1, 2, 3));
        assert_eq!(dst.get(2, 1), SKY);
    }

    #[test]
    fn test_blit_clips_at_edges() {
        let src = Canvas::new(4, 4, Rgba::rgb(9, 9, 9));
        let mut dst = Canvas::new_sky(3, 3);
        dst.blit(&src, 0, 0, 4, 4, 2, 2);
        assert_eq!(dst.get(2, 2), Rgba::rgb(9, 9, 9));
        assert_eq!(dst.get(1, 1), SKY);
    }

    #[test]
    fn test_rgba8_round_trip_length() {
        let c = Canvas::new_sky(3, 2);
        let bytes = c.to_rgba8();
        assert_eq!(bytes.len(), 24);
        assert_eq!(Canvas::from_rgba8(3, 2, &bytes), Some(c));
        assert_eq!(Canvas::from_rgba8(3, 3, &bytes), None);
    }

    #[test]
    fn test_crop() {
        let mut c = Canvas::new_sky(4, 4);
        c.set(2, 1, Rgba::rgb(5, 5, 5));
        let sub = c.crop(2, 1, 2, 2);
        assert_eq!(sub.get(0, 0), Rgba::rgb(5, 5, 5));
        assert_eq!(sub.get(1, 1), SKY);
    }
}
