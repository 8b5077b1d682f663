//! Color utilities for the canvas.

/// 8-bit RGBA color, straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Background color of an empty canvas cell.
pub const SKY: Rgba = Rgba::rgb(0, 107, 196);

impl Rgba {
    /// Create an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color with alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fully transparent black.
    pub const fn transparent() -> Self {
        Self::rgba(0, 0, 0, 0)
    }

    pub const fn from_array(px: [u8; 4]) -> Self {
        Self::rgba(px[0], px[1], px[2], px[3])
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub const fn is_opaque(self) -> bool {
        self.a == 255
    }

    /// Composite `self` over `dst` (Porter-Duff source-over).
    ///
    /// Opaque sources replace the destination and fully transparent sources
    /// leave it untouched, so tile layers occlude exactly where they are
    /// opaque.
    pub fn over(self, dst: Rgba) -> Rgba {
        match self.a {
            255 => return self,
            0 => return dst,
            _ => {}
        }

        let sa = self.a as u32;
        let da = dst.a as u32;
        // Output alpha scaled by 255: sa*255 + da*(255 - sa)
        let out_a = sa * 255 + da * (255 - sa);
        if out_a == 0 {
            return Rgba::transparent();
        }

        let channel = |s: u8, d: u8| -> u8 {
            let num = s as u32 * sa * 255 + d as u32 * da * (255 - sa);
            ((num + out_a / 2) / out_a) as u8
        };

        Rgba {
            r: channel(self.r, dst.r),
            g: channel(self.g, dst.g),
            b: channel(self.b, dst.b),
            a: ((out_a + 127) / 255) as u8,
        }
    }
}
