//! Pixel format descriptions and conversions.
//!
//! A [`PixelFormat`] describes how a true-color pixel is packed into bytes:
//! storage size, endianness, and the bit position and range of each channel.
//!
//! # Critical Note: Stride is in Pixels, Not Bytes!
//!
//! Strides throughout this crate are measured in **pixels**. When computing
//! byte offsets always multiply by `bytes_per_pixel()`:
//!
//! ```text
//! byte_offset = (y * stride + x) * bytes_per_pixel
//! ```
//!
//! # Example
//!
//! ```
//! use radic_pixelbuffer::PixelFormat;
//!
//! let pf = PixelFormat::rgb888();
//! assert_eq!(pf.bytes_per_pixel(), 4);
//!
//! let raw = pf.from_rgb888([0xAA, 0xBB, 0xCC, 0xFF]);
//! assert_eq!(raw, vec![0xCC, 0xBB, 0xAA, 0x00]);
//! assert_eq!(pf.to_rgb888(&raw), [0xAA, 0xBB, 0xCC, 0xFF]);
//! ```

/// True-color pixel layout.
#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub struct PixelFormat {
    /// Storage size of one pixel in bits (24 or 32 in practice).
    pub bits_per_pixel: u8,

    /// Significant color bits.
    pub depth: u8,

    /// Byte order of multi-byte pixels.
    pub big_endian: bool,

    pub red_max: u16,
    pub green_max: u16,
    pub blue_max: u16,

    pub red_shift: u8,
    pub green_shift: u8,
    pub blue_shift: u8,
}

impl PixelFormat {
    /// Bytes used to store one pixel.
    pub fn bytes_per_pixel(&self) -> u8 {
        self.bits_per_pixel.div_ceil(8)
    }

    /// 32bpp little-endian XRGB, the layout produced by most desktop
    /// session backends.
    pub fn rgb888() -> Self {
        Self {
            bits_per_pixel: 32,
            depth: 24,
            big_endian: false,
            red_max: 255,
            green_max: 255,
            blue_max: 255,
            red_shift: 16,
            green_shift: 8,
            blue_shift: 0,
        }
    }

    /// Packed 24bpp with bytes in R, G, B order.
    pub fn rgb24() -> Self {
        Self {
            bits_per_pixel: 24,
            depth: 24,
            big_endian: true,
            red_max: 255,
            green_max: 255,
            blue_max: 255,
            red_shift: 16,
            green_shift: 8,
            blue_shift: 0,
        }
    }

    /// Decode one pixel into `[r, g, b, 255]`.
    ///
    /// # Panics
    ///
    /// Panics if `pixel` is not exactly `bytes_per_pixel()` long.
    pub fn to_rgb888(&self, pixel: &[u8]) -> [u8; 4] {
        let bpp = self.bytes_per_pixel() as usize;
        assert_eq!(
            pixel.len(),
            bpp,
            "pixel length {} does not match bytes_per_pixel {}",
            pixel.len(),
            bpp
        );

        let mut value = 0u32;
        if self.big_endian {
            for &byte in pixel {
                value = (value << 8) | byte as u32;
            }
        } else {
            for (i, &byte) in pixel.iter().enumerate() {
                value |= (byte as u32) << (i * 8);
            }
        }

        let channel = |shift: u8, max: u16| -> u8 {
            let raw = (value >> shift) & max as u32;
            ((raw * 255) / (max.max(1) as u32)) as u8
        };

        [
            channel(self.red_shift, self.red_max),
            channel(self.green_shift, self.green_max),
            channel(self.blue_shift, self.blue_max),
            255,
        ]
    }

    /// Encode `[r, g, b, _]` into this format's byte layout.
    pub fn from_rgb888(&self, rgb: [u8; 4]) -> Vec<u8> {
        let r = (rgb[0] as u32 * self.red_max as u32) / 255;
        let g = (rgb[1] as u32 * self.green_max as u32) / 255;
        let b = (rgb[2] as u32 * self.blue_max as u32) / 255;
        let mut value = (r << self.red_shift) | (g << self.green_shift) | (b << self.blue_shift);

        let bpp = self.bytes_per_pixel() as usize;
        let mut result = vec![0u8; bpp];
        if self.big_endian {
            for i in 0..bpp {
                result[bpp - 1 - i] = (value & 0xFF) as u8;
                value >>= 8;
            }
        } else {
            for item in result.iter_mut() {
                *item = (value & 0xFF) as u8;
                value >>= 8;
            }
        }
        result
    }

    pub fn is_rgb888(&self) -> bool {
        *self == Self::rgb888()
    }
}

impl Default for PixelFormat {
    fn default() -> Self {
        Self::rgb888()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb888_round_trip() {
        let pf = PixelFormat::rgb888();
        let raw = pf.from_rgb888([10, 20, 30, 255]);
        assert_eq!(raw, vec![30, 20, 10, 0]);
        assert_eq!(pf.to_rgb888(&raw), [10, 20, 30, 255]);
        assert!(pf.is_rgb888());
    }

    #[test]
    fn test_rgb24_byte_order() {
        let pf = PixelFormat::rgb24();
        assert_eq!(pf.bytes_per_pixel(), 3);
        assert_eq!(pf.from_rgb888([1, 2, 3, 255]), vec![1, 2, 3]);
        assert_eq!(pf.to_rgb888(&[1, 2, 3]), [1, 2, 3, 255]);
        assert!(!pf.is_rgb888());
    }

    #[test]
    #[should_panic(expected = "does not match bytes_per_pixel")]
    fn test_wrong_pixel_length_panics() {
        PixelFormat::rgb888().to_rgb888(&[0, 0, 0]);
    }
}
