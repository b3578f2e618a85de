//! Color spaces and the conversion graph between them.
//!
//! Every space stores its channels normalized to 0..1 (unbounded spaces may
//! leave that range) and knows how to reach one *anchor* ICC profile:
//!
//! ```text
//!   HSL  HSV  Gray  CMYK  OkLab  OkLCH  OkHSL  OkHSV  Named
//!     \    \    |    |     |      /      /      /     /
//!      +----+---+----+-----+-----+------+------+-----+
//!                          |
//!                        sRGB  <---- ICC ---->  any other anchor
//!                                                (Lab, XYZ, CMS...)
//! ```
//!
//! Converting between two spaces that share an anchor is pure math. When the
//! anchors differ, a [`Transform`] bridges them.
//!
//! # Spaces
//!
//! | Space | Anchor | CSS output |
//! |-------|--------|------------|
//! | [`Rgb`] | sRGB | `#rrggbb` |
//! | [`LinearRgb`] | linear sRGB | `color(srgb-linear r g b)` |
//! | [`Hsl`] | sRGB | `hsl(h s l)` |
//! | [`Hsv`] | sRGB | `hwb(h w b)` |
//! | [`Gray`] | sRGB | `#rrggbb` |
//! | [`DeviceCmyk`] | sRGB | `device-cmyk(c m y k)` |
//! | [`NamedColor`] | sRGB | keyword or `#rrggbb` |
//! | [`OkLab`], [`OkLch`] | sRGB | `oklab()`, `oklch()` |
//! | [`OkHsl`], [`OkHsv`] | sRGB | `#rrggbb` |
//! | [`Xyz`], [`Luv`], [`Hsluv`] | XYZ D65 | `color(xyz ...)`, hex |
//! | [`Xyz50`] | XYZ D50 | `color(xyz-d50 ...)` |
//! | [`Lab`], [`Lch`] | Lab | `lab()`, `lch()` |
//! | [`CmsSpace`] | its own profile | `#rrggbb icc-color(...)` |

use crate::components::Components;
use glam::{DMat3, DVec3};
use pigment_icc::{GamutChecker, Intent, Profile, Transform};
use std::fmt;
use std::sync::Arc;
use tracing::{trace, warn};

mod cms;
mod cmyk;
mod gray;
mod hsl;
mod hsluv;
mod hsv;
mod lab;
mod lch;
mod linear_rgb;
mod luv;
mod named;
mod okhsl;
mod oklab;
mod oklch;
mod rgb;
mod xyz;

pub use cms::CmsSpace;
pub use cmyk::DeviceCmyk;
pub use gray::Gray;
pub use hsl::Hsl;
pub use hsluv::Hsluv;
pub use hsv::Hsv;
pub use lab::Lab;
pub use lch::Lch;
pub use linear_rgb::LinearRgb;
pub use luv::Luv;
pub use named::{css_name_for, css_named_color, NamedColor, CSS_COLOR_NAMES};
pub use okhsl::{OkHsl, OkHsv};
pub use oklab::OkLab;
pub use oklch::OkLch;
pub use rgb::Rgb;
pub use xyz::{Xyz, Xyz50};

pub(crate) use hsv::HwbParser;
pub(crate) use hsl::HslParser;
pub(crate) use lab::LabParser;
pub(crate) use lch::LchParser;
pub(crate) use named::NameParser;
pub(crate) use cms::IccColorParser;
pub(crate) use oklab::OkLabParser;
pub(crate) use oklch::OkLchParser;
pub(crate) use rgb::RgbParser;

/// Kind of color model. One registered space per type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum SpaceType {
    /// No space.
    #[default]
    None,
    /// sRGB.
    Rgb,
    /// Linear-light sRGB.
    LinearRgb,
    /// Hue, saturation, lightness.
    Hsl,
    /// Hue, saturation, value.
    Hsv,
    /// Device CMYK.
    Cmyk,
    /// Device CMY.
    Cmy,
    /// HSLuv.
    Hsluv,
    /// Ottosson's OkHSL.
    Okhsl,
    /// Ottosson's OkHSV.
    Okhsv,
    /// CIE LCh(ab).
    Lch,
    /// CIE L*u*v*.
    Luv,
    /// Oklab.
    Oklab,
    /// Oklch.
    Oklch,
    /// CIE L*a*b*.
    Lab,
    /// YCbCr (profile only).
    YCbCr,
    /// CIE XYZ, D65 white.
    Xyz,
    /// CIE XYZ, D50 white.
    Xyz50,
    /// CIE Yxy (profile only).
    Yxy,
    /// Single gray channel.
    Gray,
    /// ICC profile-backed space.
    Cms,
    /// CSS named color.
    CssName,
}

/// Behavior shared by every color space.
///
/// Channel vectors passed in and out never include opacity; a [`Color`]
/// keeps that separately, so conversions cannot disturb it.
///
/// [`Color`]: crate::Color
pub trait Space: Send + Sync + fmt::Debug {
    /// Kind of model.
    fn space_type(&self) -> SpaceType;

    /// Unique display name.
    fn name(&self) -> &str;

    /// Short label.
    fn short_name(&self) -> &str {
        self.name()
    }

    /// SVG `color-interpolation`/`color-profile` aliases.
    fn svg_names(&self) -> Vec<String> {
        Vec::new()
    }

    /// Icon identifier.
    fn icon(&self) -> &str;

    /// Number of channels, opacity excluded.
    fn component_count(&self) -> usize;

    /// Type whose component table describes these channels.
    fn component_type(&self) -> SpaceType {
        self.space_type()
    }

    /// Channel metadata.
    fn components(&self, alpha: bool) -> &'static Components {
        Components::get(self.component_type(), alpha)
    }

    /// Anchor profile the conversion math targets.
    fn profile(&self) -> Arc<Profile>;

    /// Preferred rendering intent when converting to or from this space.
    fn intent(&self) -> Intent {
        Intent::Unknown
    }

    /// Weight of [`intent`](Self::intent) against the other side's.
    fn intent_priority(&self) -> i32 {
        0
    }

    /// True when channels can meaningfully leave 0..1.
    fn is_unbounded(&self) -> bool {
        false
    }

    /// False only for profile-backed spaces whose profile is missing.
    fn is_valid(&self) -> bool {
        true
    }

    /// Converts channels into the anchor profile's representation, in place.
    fn space_to_profile(&self, _io: &mut Vec<f64>) {}

    /// Converts anchor profile channels back into this space, in place.
    fn profile_to_space(&self, _io: &mut Vec<f64>) {}

    /// CSS text for `values`, with an opacity suffix when `opacity` is given
    /// and the syntax allows one.
    fn to_css(&self, values: &[f64], opacity: Option<f64>) -> String;

    /// True when the total ink coverage is excessive. Only ink spaces say yes.
    fn over_ink(&self, _values: &[f64]) -> bool {
        false
    }
}

impl dyn Space + '_ {
    /// Same space: same type and name.
    pub fn same_as(&self, other: &dyn Space) -> bool {
        self.space_type() == other.space_type() && self.name() == other.name()
    }

    /// True when `values` holds the channel count, optionally plus opacity.
    pub fn is_valid_data(&self, values: &[f64]) -> bool {
        let n = self.component_count();
        values.len() == n || values.len() == n + 1
    }

    /// Rendering intent for a conversion from this space into `to`.
    ///
    /// The target's intent wins unless this space outranks it and has an
    /// intent of its own. Unknown falls back to perceptual.
    pub fn bridge_intent(&self, to: &dyn Space) -> Intent {
        let intent = if self.intent_priority() <= to.intent_priority() || self.intent() == Intent::Unknown {
            to.intent()
        } else {
            self.intent()
        };
        match intent {
            Intent::Unknown => Intent::Perceptual,
            other => other,
        }
    }

    /// Builds the native transform between this space's anchor and `to`'s.
    ///
    /// Returns `None` when both share an anchor and no transform is needed.
    /// Keep the result around to convert many colors with
    /// [`convert_using`](Self::convert_using).
    pub fn bridge(&self, to: &dyn Space) -> pigment_icc::IccResult<Option<Transform>> {
        let from_profile = self.profile();
        let to_profile = to.profile();
        if *from_profile == *to_profile {
            return Ok(None);
        }
        Transform::new(&from_profile, &to_profile, self.bridge_intent(to)).map(Some)
    }

    /// Converts channel values from this space into `to`, in place.
    ///
    /// A native transform is created for the call when the anchors differ.
    /// On failure the values are restored to this space and false returned.
    pub fn convert(&self, io: &mut Vec<f64>, to: &dyn Space) -> bool {
        if self.same_as(to) {
            return true;
        }
        match self.bridge(to) {
            Ok(transform) => self.convert_through(io, to, transform.as_ref()),
            Err(e) => {
                warn!(from = self.name(), to = to.name(), error = %e, "no transform between spaces");
                false
            }
        }
    }

    /// Like [`convert`](Self::convert) but reuses a transform from
    /// [`bridge`](Self::bridge).
    pub fn convert_using(&self, io: &mut Vec<f64>, to: &dyn Space, transform: &Transform) -> bool {
        if self.same_as(to) {
            return true;
        }
        self.convert_through(io, to, Some(transform))
    }

    fn convert_through(&self, io: &mut Vec<f64>, to: &dyn Space, transform: Option<&Transform>) -> bool {
        trace!(from = self.name(), to = to.name(), "convert");
        self.space_to_profile(io);
        let bridged = match transform {
            None => Ok(()),
            Some(t) => t.apply(io),
        };
        match bridged {
            Ok(()) => {
                to.profile_to_space(io);
                true
            }
            Err(e) => {
                warn!(from = self.name(), to = to.name(), error = %e, "color transform failed");
                self.profile_to_space(io);
                false
            }
        }
    }

    /// Packs the color as `0xRRGGBBAA` sRGB with `opacity` as alpha.
    ///
    /// Four values are read as RGB plus opacity, which is multiplied in.
    /// A color that cannot reach sRGB packs as transparent black.
    pub fn to_rgba(&self, values: &[f64], opacity: f64) -> u32 {
        let mut rgb = values.to_vec();
        if self.space_type() != SpaceType::Rgb {
            rgb.truncate(self.component_count());
            if !self.convert(&mut rgb, &Rgb) {
                warn!(space = self.name(), "cannot express color as sRGB");
                return 0;
            }
        }
        match rgb.as_slice() {
            [r, g, b] => compose_rgba(*r, *g, *b, opacity),
            [r, g, b, a] => compose_rgba(*r, *g, *b, opacity * a),
            _ => {
                warn!(space = self.name(), count = rgb.len(), "expected 3 or 4 sRGB values");
                0
            }
        }
    }

    /// True when `values` cannot be reproduced in `to`'s anchor profile.
    ///
    /// Spaces sharing an anchor are never out of gamut of each other.
    pub fn out_of_gamut(&self, values: &[f64], to: &dyn Space) -> bool {
        let from_profile = self.profile();
        let to_profile = to.profile();
        if *from_profile == *to_profile {
            return false;
        }
        let mut device = values.to_vec();
        self.space_to_profile(&mut device);
        match GamutChecker::new(&from_profile, &to_profile) {
            Ok(checker) => checker.is_out_of_gamut(&device),
            Err(e) => {
                warn!(from = self.name(), to = to.name(), error = %e, "no gamut checker");
                false
            }
        }
    }
}

/// Maps `v` from 0..1 onto `a..b`.
pub(crate) fn scale_up(v: f64, a: f64, b: f64) -> f64 {
    v * (b - a) + a
}

/// Maps `v` from `a..b` onto 0..1.
pub(crate) fn scale_down(v: f64, a: f64, b: f64) -> f64 {
    (v - a) / (b - a)
}

/// Builds a matrix from row-major coefficients.
pub(crate) fn row_major(m: &[[f64; 3]; 3]) -> DMat3 {
    DMat3::from_cols_array_2d(m).transpose()
}

/// Multiplies the first three values of `io` by a row-major matrix, in place.
pub(crate) fn apply_matrix(m: &[[f64; 3]; 3], io: &mut [f64]) {
    if let [x, y, z, ..] = *io {
        let v = row_major(m) * DVec3::new(x, y, z);
        io[..3].copy_from_slice(&v.to_array());
    }
}

/// sRGB EOTF: decodes an sRGB encoded channel to linear light.
///
/// # Formula
///
/// ```text
/// if V <= 0.04045:
///     L = V / 12.92
/// else:
///     L = ((V + 0.055) / 1.055)^2.4
/// ```
///
/// Negative inputs mirror the curve so unbounded values survive.
pub fn to_linear(v: f64) -> f64 {
    if v.abs() <= 0.04045 {
        v / 12.92
    } else {
        v.signum() * ((v.abs() + 0.055) / 1.055).powf(2.4)
    }
}

/// sRGB OETF: encodes linear light to sRGB.
///
/// # Formula
///
/// ```text
/// if L <= 0.0031308:
///     V = L * 12.92
/// else:
///     V = 1.055 * L^(1/2.4) - 0.055
/// ```
pub fn from_linear(v: f64) -> f64 {
    if v.abs() <= 0.0031308 {
        v * 12.92
    } else {
        v.signum() * (1.055 * v.abs().powf(1.0 / 2.4) - 0.055)
    }
}

/// Packs 0..1 floats into `0xRRGGBBAA`.
pub(crate) fn compose_rgba(r: f64, g: f64, b: f64, a: f64) -> u32 {
    let byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u32;
    (byte(r) << 24) | (byte(g) << 16) | (byte(b) << 8) | byte(a)
}

/// Hex text of the color as sRGB, with alpha when `opacity` is given.
pub(crate) fn hex_via_rgb(space: &dyn Space, values: &[f64], opacity: Option<f64>) -> String {
    let rgba = space.to_rgba(values, opacity.unwrap_or(1.0));
    crate::utils::rgba_to_hex(rgba, opacity.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_linear_roundtrip() {
        for i in 0..=100 {
            let v = i as f64 / 100.0;
            assert_abs_diff_eq!(from_linear(to_linear(v)), v, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(to_linear(0.5), 0.214, epsilon = 1e-3);
        assert_abs_diff_eq!(to_linear(-0.5), -0.214, epsilon = 1e-3);
    }

    #[test]
    fn test_scale_helpers() {
        assert_eq!(scale_up(0.5, -128.0, 127.0), -0.5);
        assert_eq!(scale_down(-0.5, -128.0, 127.0), 0.5);
    }

    #[test]
    fn test_apply_matrix_is_row_major() {
        let mut io = vec![1.0, 0.0, 0.0, 0.5];
        apply_matrix(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]], &mut io);
        assert_eq!(io, vec![1.0, 4.0, 7.0, 0.5]);
    }

    #[test]
    fn test_compose_rgba() {
        assert_eq!(compose_rgba(1.0, 0.0, 0.5, 1.0), 0xff0080ff);
        assert_eq!(compose_rgba(2.0, -1.0, 0.0, 0.0), 0xff000000);
    }

    #[test]
    fn test_bridge_intent() {
        let cmyk = CmsSpace::anonymous("press", 4);
        cmyk.set_intent(Intent::Saturation);
        let rgb: &dyn Space = &Rgb;
        // target outranks or source has no intent: target wins
        assert_eq!(rgb.bridge_intent(&cmyk), Intent::Saturation);
        assert_eq!(rgb.bridge_intent(&Hsl), Intent::Perceptual);
        // source outranks and has an intent
        let cms: &dyn Space = &cmyk;
        assert_eq!(cms.bridge_intent(&Rgb), Intent::Saturation);
    }

    #[test]
    fn test_same_anchor_needs_no_transform() {
        let hsl: &dyn Space = &Hsl;
        assert!(hsl.bridge(&OkLab).unwrap().is_none());
        assert!(hsl.bridge(&Lab).unwrap().is_some());
    }

    #[test]
    fn test_convert_same_space_is_noop() {
        let rgb: &dyn Space = &Rgb;
        let mut values = vec![0.1, 0.2, 0.3];
        assert!(rgb.convert(&mut values, &Rgb));
        assert_eq!(values, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_to_rgba() {
        let hsl: &dyn Space = &Hsl;
        assert_eq!(hsl.to_rgba(&[0.0, 1.0, 0.5], 1.0), 0xff0000ff);
        let rgb: &dyn Space = &Rgb;
        assert_eq!(rgb.to_rgba(&[0.0, 0.0, 1.0, 0.5], 1.0), 0x0000ff80);
        assert_eq!(rgb.to_rgba(&[0.0, 0.0, 1.0], 0.0), 0x0000ff00);
    }

    #[test]
    fn test_valid_data() {
        let cmyk: &dyn Space = &DeviceCmyk;
        assert!(cmyk.is_valid_data(&[0.0; 4]));
        assert!(cmyk.is_valid_data(&[0.0; 5]));
        assert!(!cmyk.is_valid_data(&[0.0; 3]));
    }

    #[test]
    fn test_helpers_on_borrowed_space() {
        // a local, not 'static, trait object
        let gray = CmsSpace::anonymous("local-gray", 1);
        let space: &dyn Space = &gray;
        assert!(space.same_as(space));
        assert!(!space.same_as(&Rgb));
        assert!(space.is_valid_data(&[0.5, 1.0]));
        assert!(!space.is_valid_data(&[0.5, 0.5, 0.5]));
    }
}
