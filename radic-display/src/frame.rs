//! Frames as handed over by a session backend.

use radic_common::{Rect, Size};
use radic_pixelbuffer::ManagedPixelBuffer;

/// A complete frame plus the region that changed since the previous one.
///
/// The dirty rectangle is normalised on construction: an empty rectangle
/// means the whole frame, and anything else is clamped to the frame
/// bounds (falling back to the whole frame when nothing is left).
#[derive(Debug, Clone)]
pub struct Frame {
    buffer: ManagedPixelBuffer,
    dirty: Rect,
}

impl Frame {
    pub fn new(buffer: ManagedPixelBuffer, dirty: Rect) -> Self {
        let dirty = clamp_dirty(buffer.size(), dirty);
        Self { buffer, dirty }
    }

    /// A frame whose every pixel is dirty.
    pub fn whole(buffer: ManagedPixelBuffer) -> Self {
        let dirty = Rect::from_size(buffer.size());
        Self { buffer, dirty }
    }

    pub fn buffer(&self) -> &ManagedPixelBuffer {
        &self.buffer
    }

    /// Effective dirty rectangle, always inside the frame bounds.
    pub fn dirty(&self) -> Rect {
        self.dirty
    }

    pub fn size(&self) -> Size {
        self.buffer.size()
    }

    pub fn is_null(&self) -> bool {
        self.buffer.is_null()
    }

    pub fn is_whole(&self) -> bool {
        self.dirty == Rect::from_size(self.size())
    }

    /// Combine with a frame this one replaces before it was composed.
    ///
    /// Pixels always come from `self`; the dirty region grows to cover
    /// what `older` changed too. Frames of different geometry cannot be
    /// combined and the result is marked whole.
    pub fn absorb(self, older: Frame) -> Frame {
        if older.size() != self.size() || older.buffer.format() != self.buffer.format() {
            return Frame::whole(self.buffer);
        }
        let dirty = self.dirty.union(&older.dirty);
        Frame {
            buffer: self.buffer,
            dirty,
        }
    }

    pub fn into_parts(self) -> (ManagedPixelBuffer, Rect) {
        (self.buffer, self.dirty)
    }
}

fn clamp_dirty(size: Size, dirty: Rect) -> Rect {
    let full = Rect::from_size(size);
    if dirty.is_empty() {
        return full;
    }
    dirty.intersect(&full).unwrap_or(full)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use radic_pixelbuffer::PixelFormat;

    fn buffer(w: u32, h: u32) -> ManagedPixelBuffer {
        ManagedPixelBuffer::new(w, h, PixelFormat::rgb888())
    }

    #[test]
    fn test_empty_dirty_means_whole_frame() {
        let frame = Frame::new(buffer(100, 50), Rect::default());
        assert_eq!(frame.dirty(), Rect::new(0, 0, 100, 50));
        assert!(frame.is_whole());
    }

    #[test]
    fn test_dirty_is_clamped() {
        let frame = Frame::new(buffer(100, 50), Rect::new(90, 40, 20, 20));
        assert_eq!(frame.dirty(), Rect::new(90, 40, 10, 10));
    }

    #[test]
    fn test_out_of_bounds_dirty_means_whole_frame() {
        let frame = Frame::new(buffer(100, 50), Rect::new(200, 200, 5, 5));
        assert!(frame.is_whole());
    }

    #[test]
    fn test_dirty_past_i32_limit_means_whole_frame() {
        let frame = Frame::new(buffer(16, 16), Rect::new(i32::MAX - 5, 0, 10, 10));
        assert!(frame.is_whole());
        let frame = Frame::new(buffer(16, 16), Rect::new(-3, -3, u32::MAX, u32::MAX));
        assert!(frame.is_whole());
    }

    #[test]
    fn test_absorb_unions_dirty_regions() {
        let older = Frame::new(buffer(100, 100), Rect::new(0, 0, 10, 10));
        let newer = Frame::new(buffer(100, 100), Rect::new(50, 50, 10, 10));
        assert_eq!(newer.absorb(older).dirty(), Rect::new(0, 0, 60, 60));
    }

    #[test]
    fn test_absorb_across_resize_is_whole() {
        let older = Frame::new(buffer(50, 50), Rect::new(0, 0, 10, 10));
        let newer = Frame::new(buffer(100, 100), Rect::new(50, 50, 10, 10));
        assert!(newer.absorb(older).is_whole());
    }

    proptest! {
        #[test]
        fn dirty_always_inside_frame(
            w in 1u32..300, h in 1u32..300,
            x in any::<i32>(), y in any::<i32>(), dw in any::<u32>(), dh in any::<u32>(),
        ) {
            let frame = Frame::new(buffer(w, h), Rect::new(x, y, dw, dh));
            prop_assert!(Rect::from_size(frame.size()).contains_rect(&frame.dirty()));
            prop_assert!(!frame.dirty().is_empty());
        }
    }
}
