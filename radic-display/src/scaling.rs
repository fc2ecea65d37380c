//! Integer presentation scaling.
//!
//! The presentable copy of a frame is the composited frame enlarged by a
//! whole-number factor. Factor 1 is a plain copy; larger factors are
//! resampled with the `image` crate using the configured [`ScaleFilter`].

use crate::DisplayError;
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Pixel, Rgb, Rgba};
use radic_pixelbuffer::ManagedPixelBuffer;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// Filtering options for scaling operations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleFilter {
    /// Nearest neighbor filtering (sharp, pixelated)
    #[default]
    Nearest,
    /// Linear filtering (smooth, blurred)
    Linear,
}

impl fmt::Display for ScaleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nearest => write!(f, "Nearest"),
            Self::Linear => write!(f, "Linear"),
        }
    }
}

impl From<ScaleFilter> for FilterType {
    fn from(filter: ScaleFilter) -> Self {
        match filter {
            ScaleFilter::Nearest => FilterType::Nearest,
            ScaleFilter::Linear => FilterType::Triangle,
        }
    }
}

/// The two-level scale the shortcut toggles between.
pub fn toggled_scale(scale: u32) -> u32 {
    if scale == 1 {
        2
    } else {
        1
    }
}

/// Enlarge `src` by `factor` in both directions, keeping the aspect ratio.
///
/// # Errors
///
/// Fails for pixel formats that are neither 24 nor 32 bits per pixel.
pub fn scale_buffer(
    src: &ManagedPixelBuffer,
    factor: u32,
    filter: ScaleFilter,
) -> Result<ManagedPixelBuffer, DisplayError> {
    let factor = factor.max(1);
    if factor == 1 || src.is_null() {
        return Ok(src.clone());
    }

    let width = src.width().saturating_mul(factor);
    let height = src.height().saturating_mul(factor);
    trace!(
        "Scaling {}x{} -> {}x{} ({})",
        src.width(),
        src.height(),
        width,
        height,
        filter
    );

    let raw = match src.format().bytes_per_pixel() {
        4 => resize_raw::<Rgba<u8>>(src, width, height, filter)?,
        3 => resize_raw::<Rgb<u8>>(src, width, height, filter)?,
        _ => return Err(DisplayError::UnsupportedFormat(src.format().bits_per_pixel)),
    };

    Ok(ManagedPixelBuffer::from_raw(
        width,
        height,
        width as usize,
        *src.format(),
        raw,
    )?)
}

// Channels are resampled byte-wise, so the channel order of the source
// format is irrelevant here.
fn resize_raw<P>(
    src: &ManagedPixelBuffer,
    width: u32,
    height: u32,
    filter: ScaleFilter,
) -> Result<Vec<u8>, DisplayError>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let packed = src.packed_data().into_owned();
    let image: ImageBuffer<P, Vec<u8>> = ImageBuffer::from_raw(src.width(), src.height(), packed)
        .ok_or_else(|| {
            DisplayError::Buffer(anyhow::anyhow!(
                "pixel data does not fill a {}x{} image",
                src.width(),
                src.height()
            ))
        })?;
    Ok(imageops::resize(&image, width, height, filter.into()).into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;
    use radic_common::Rect;
    use radic_pixelbuffer::{MutablePixelBuffer, PixelFormat};

    #[test]
    fn test_scale_filter_display() {
        assert_eq!(format!("{}", ScaleFilter::Nearest), "Nearest");
        assert_eq!(format!("{}", ScaleFilter::Linear), "Linear");
        assert_eq!(ScaleFilter::default(), ScaleFilter::Nearest);
    }

    #[test]
    fn test_toggled_scale() {
        assert_eq!(toggled_scale(1), 2);
        assert_eq!(toggled_scale(2), 1);
        assert_eq!(toggled_scale(3), 1);
    }

    #[test]
    fn test_factor_one_is_copy() {
        let src = ManagedPixelBuffer::filled(8, 4, PixelFormat::rgb888(), [1, 2, 3, 255]);
        let out = scale_buffer(&src, 1, ScaleFilter::Linear).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn test_factor_two_doubles_dimensions() {
        for format in [PixelFormat::rgb888(), PixelFormat::rgb24()] {
            let mut src = ManagedPixelBuffer::new(20, 10, format);
            let white = format.from_rgb888([255, 255, 255, 255]);
            src.fill_rect(Rect::new(0, 0, 10, 10), &white).unwrap();

            let out = scale_buffer(&src, 2, ScaleFilter::Nearest).unwrap();
            assert_eq!(out.size(), radic_common::Size::new(40, 20));
            assert_eq!(out.rgb_at(5, 10), Some([255, 255, 255, 255]));
            assert_eq!(out.rgb_at(35, 10), Some([0, 0, 0, 255]));
        }
    }

    #[test]
    fn test_unsupported_format() {
        let format = PixelFormat {
            bits_per_pixel: 16,
            depth: 16,
            big_endian: false,
            red_max: 31,
            green_max: 63,
            blue_max: 31,
            red_shift: 11,
            green_shift: 5,
            blue_shift: 0,
        };
        let src = ManagedPixelBuffer::new(4, 4, format);
        assert!(matches!(
            scale_buffer(&src, 2, ScaleFilter::Nearest),
            Err(DisplayError::UnsupportedFormat(16))
        ));
    }
}
