//! Display-control and pointer message types.

use bitflags::bitflags;
use radic_common::Size;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Pointer event flags as carried by the remote input channel.
    ///
    /// Wheel events carry the rotation magnitude in the low bits
    /// (see [`PointerFlags::wheel`]).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PointerFlags: u16 {
        const WHEEL_NEGATIVE = 0x0100;
        const WHEEL = 0x0200;
        const HWHEEL = 0x0400;
        const MOVE = 0x0800;
        /// Left button
        const BUTTON1 = 0x1000;
        /// Right button
        const BUTTON2 = 0x2000;
        /// Middle button
        const BUTTON3 = 0x4000;
        const DOWN = 0x8000;
        const ROTATION_MASK = 0x00FF;
    }
}

impl PointerFlags {
    /// Wheel flags for a signed rotation; magnitude is clamped to 255.
    pub fn wheel(horizontal: bool, delta: i32) -> Self {
        let magnitude = delta.unsigned_abs().min(0xFF) as u16;
        let mut flags = if horizontal { Self::HWHEEL } else { Self::WHEEL };
        flags |= Self::from_bits_retain(magnitude);
        if delta < 0 {
            flags |= Self::WHEEL_NEGATIVE;
        }
        flags
    }

    /// Rotation magnitude of a wheel event.
    pub fn rotation(self) -> u16 {
        (self & Self::ROTATION_MASK).bits()
    }
}

bitflags! {
    /// Per-monitor flags of a layout entry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MonitorFlags: u32 {
        const PRIMARY = 0x0000_0001;
    }
}

/// Monitor orientation in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    #[default]
    Landscape,
    Portrait,
    LandscapeFlipped,
    PortraitFlipped,
}

impl Orientation {
    pub fn degrees(self) -> u16 {
        match self {
            Self::Landscape => 0,
            Self::Portrait => 90,
            Self::LandscapeFlipped => 180,
            Self::PortraitFlipped => 270,
        }
    }
}

/// Desktop properties advertised alongside each monitor layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesktopMetrics {
    pub orientation: Orientation,
    /// Percent, 100 = unscaled.
    pub desktop_scale_factor: u32,
    /// Percent, 100 = unscaled.
    pub device_scale_factor: u32,
}

impl Default for DesktopMetrics {
    fn default() -> Self {
        Self {
            orientation: Orientation::Landscape,
            desktop_scale_factor: 100,
            device_scale_factor: 100,
        }
    }
}

/// One monitor entry of a display-control layout request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorLayout {
    pub flags: MonitorFlags,
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
    pub physical_width: u32,
    pub physical_height: u32,
    pub orientation: Orientation,
    pub desktop_scale_factor: u32,
    pub device_scale_factor: u32,
}

impl MonitorLayout {
    /// A single primary monitor at the origin.
    pub fn single_primary(size: Size, metrics: &DesktopMetrics) -> Self {
        Self {
            flags: MonitorFlags::PRIMARY,
            left: 0,
            top: 0,
            width: size.width,
            height: size.height,
            physical_width: size.width,
            physical_height: size.height,
            orientation: metrics.orientation,
            desktop_scale_factor: metrics.desktop_scale_factor,
            device_scale_factor: metrics.device_scale_factor,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Bounds the display-control channel accepts for a monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorLimits {
    #[serde(default = "default_min_size")]
    pub min: Size,
    #[serde(default = "default_max_size")]
    pub max: Size,
}

fn default_min_size() -> Size {
    Size::new(MonitorLimits::MIN_DIMENSION, MonitorLimits::MIN_DIMENSION)
}

fn default_max_size() -> Size {
    Size::new(MonitorLimits::MAX_DIMENSION, MonitorLimits::MAX_DIMENSION)
}

impl MonitorLimits {
    pub const MIN_DIMENSION: u32 = 200;
    pub const MAX_DIMENSION: u32 = 8192;

    pub fn clamp(&self, size: Size) -> Size {
        size.clamp(self.min, self.max)
    }
}

impl Default for MonitorLimits {
    fn default() -> Self {
        Self {
            min: default_min_size(),
            max: default_max_size(),
        }
    }
}
