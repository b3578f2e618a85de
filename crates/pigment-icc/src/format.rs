//! Pixel format descriptors.
//!
//! Little CMS describes buffers with a packed 32-bit format word. This module
//! builds that word from a profile's color space, the sample type and the
//! alpha layout.

use crate::{IccError, IccResult, Profile};
use lcms2::{ColorSpaceSignature, PixelFormat};

const PT_GRAY: u32 = 3;
const PT_RGB: u32 = 4;
const PT_CMY: u32 = 5;
const PT_CMYK: u32 = 6;
const PT_YCBCR: u32 = 7;
const PT_YUV: u32 = 8;
const PT_XYZ: u32 = 9;
const PT_LAB: u32 = 10;
const PT_HSV: u32 = 12;
const PT_HLS: u32 = 13;
const PT_YXY: u32 = 14;

const fn colorspace_sh(pt: u32) -> u32 {
    pt << 16
}

const fn channels_sh(n: u32) -> u32 {
    n << 3
}

const fn extra_sh(n: u32) -> u32 {
    n << 7
}

const fn float_sh(f: u32) -> u32 {
    f << 22
}

const fn premul_sh(p: u32) -> u32 {
    p << 23
}

/// How an alpha channel travels alongside the color channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alpha {
    /// Color channels only.
    #[default]
    None,
    /// One trailing straight alpha sample per pixel.
    Present,
    /// One trailing alpha sample, color channels premultiplied by it.
    Premultiplied,
}

impl Alpha {
    /// Number of extra samples per pixel.
    pub fn extra(self) -> usize {
        match self {
            Alpha::None => 0,
            Alpha::Present | Alpha::Premultiplied => 1,
        }
    }
}

/// Sample types a [`Transform`](crate::Transform) can operate on.
pub trait Sample: bytemuck::Pod + Default + Send + Sync + 'static {
    /// Value of the format word's byte field (0 encodes 8-byte doubles).
    const BYTES: u32;
    /// Whether samples are floating point.
    const FLOAT: bool;

    /// Converts from the engine's normalized `f64` representation.
    fn from_unit(v: f64) -> Self;

    /// Converts back to the engine's normalized `f64` representation.
    fn to_unit(self) -> f64;
}

impl Sample for f64 {
    const BYTES: u32 = 0;
    const FLOAT: bool = true;

    fn from_unit(v: f64) -> Self {
        v
    }

    fn to_unit(self) -> f64 {
        self
    }
}

impl Sample for f32 {
    const BYTES: u32 = 4;
    const FLOAT: bool = true;

    fn from_unit(v: f64) -> Self {
        v as f32
    }

    fn to_unit(self) -> f64 {
        self as f64
    }
}

impl Sample for u16 {
    const BYTES: u32 = 2;
    const FLOAT: bool = false;

    fn from_unit(v: f64) -> Self {
        (v * 65535.0).clamp(0.0, 65535.0) as u16
    }

    fn to_unit(self) -> f64 {
        self as f64 / 65535.0
    }
}

/// Maps an ICC color space signature to its lcms pixel type and channel count.
pub(crate) fn color_space_code(sig: ColorSpaceSignature) -> Option<(u32, usize)> {
    let code = match sig {
        ColorSpaceSignature::GrayData => (PT_GRAY, 1),
        ColorSpaceSignature::RgbData => (PT_RGB, 3),
        ColorSpaceSignature::CmyData => (PT_CMY, 3),
        ColorSpaceSignature::CmykData => (PT_CMYK, 4),
        ColorSpaceSignature::YCbCrData => (PT_YCBCR, 3),
        ColorSpaceSignature::LuvData => (PT_YUV, 3),
        ColorSpaceSignature::XYZData => (PT_XYZ, 3),
        ColorSpaceSignature::LabData => (PT_LAB, 3),
        ColorSpaceSignature::HsvData => (PT_HSV, 3),
        ColorSpaceSignature::HlsData => (PT_HLS, 3),
        ColorSpaceSignature::YxyData => (PT_YXY, 3),
        _ => return None,
    };
    Some(code)
}

/// Builds the lcms pixel format for buffers of `T` in `profile`'s color space.
///
/// With `masked` set, the color space field is cleared for everything but
/// XYZ so lcms moves values in its normalized float encoding (Lab as
/// `L/100, (a+128)/255, (b+128)/255`) instead of native units.
///
/// # Errors
///
/// Fails for color spaces without a pixel type mapping.
pub fn pixel_format<T: Sample>(profile: &Profile, alpha: Alpha, masked: bool) -> IccResult<PixelFormat> {
    let sig = profile.color_space();
    let (pt, channels) = color_space_code(sig)
        .ok_or_else(|| IccError::UnsupportedColorSpace(format!("{sig:?}")))?;

    let mut word = colorspace_sh(pt) | channels_sh(channels as u32) | T::BYTES;
    if T::FLOAT {
        word |= float_sh(1);
    }
    if alpha != Alpha::None {
        word |= extra_sh(1);
    }
    if alpha == Alpha::Premultiplied {
        word |= premul_sh(1);
    }
    if masked && pt != PT_XYZ {
        word &= !colorspace_sh(0b11111);
    }
    Ok(PixelFormat(word))
}
