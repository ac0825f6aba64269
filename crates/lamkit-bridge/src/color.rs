//! Colour spaces and the surface pixel formats they imply.

use std::fmt;

use lamkit_core::NativeHandle;

/// Colour spaces the native module can create.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    /// Standard sRGB. The runtime creates this one during initialisation.
    #[default]
    Srgb,
    /// Display P3 wide gamut.
    DisplayP3,
    /// Adobe RGB (1998).
    AdobeRgb,
}

impl fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Srgb => write!(f, "sRGB"),
            Self::DisplayP3 => write!(f, "Display P3"),
            Self::AdobeRgb => write!(f, "Adobe RGB"),
        }
    }
}

/// A native colour space object together with what it describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorSpaceHandle {
    /// Which colour space the handle refers to.
    pub space: ColorSpace,
    /// The native object.
    pub handle: NativeHandle,
}

/// Per-pixel layout of a surface's colour buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorType {
    /// 8 bits per channel, RGBA order.
    Rgba8888,
    /// 16-bit float per channel, RGBA order.
    RgbaF16,
}

/// Sized internal format of the backing render buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// `GL_RGBA8`.
    Rgba8,
    /// `GL_RGBA16F`.
    Rgba16F,
}

impl PixelFormat {
    /// The GL enum value for this format.
    pub fn gl_enum(self) -> u32 {
        match self {
            Self::Rgba8 => 0x8058,
            Self::Rgba16F => 0x881A,
        }
    }
}

/// Colour type and render buffer format chosen for a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorSettings {
    /// Colour type of the surface.
    pub color_type: ColorType,
    /// Render buffer format backing it.
    pub pixel_format: PixelFormat,
}

impl ColorSettings {
    /// Settings for 8-bit sRGB surfaces.
    pub const SRGB: ColorSettings = ColorSettings {
        color_type: ColorType::Rgba8888,
        pixel_format: PixelFormat::Rgba8,
    };

    /// Settings for wide-gamut surfaces.
    pub const WIDE_GAMUT: ColorSettings = ColorSettings {
        color_type: ColorType::RgbaF16,
        pixel_format: PixelFormat::Rgba16F,
    };

    /// Pick settings for a colour space. `None` means unspecified and is
    /// treated as sRGB; every other space gets half-float storage.
    pub fn for_color_space(space: Option<ColorSpace>) -> Self {
        match space {
            None | Some(ColorSpace::Srgb) => Self::SRGB,
            Some(_) => Self::WIDE_GAMUT,
        }
    }
}
