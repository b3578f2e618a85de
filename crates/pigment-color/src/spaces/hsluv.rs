//! HSLuv: a perceptual HSL built on CIE LCh(uv).
//!
//! Saturation is chroma as a fraction of the most the sRGB gamut allows at
//! the given lightness and hue. That maximum is found by casting a ray from
//! the origin of the u,v plane at the hue angle against the six lines where
//! one sRGB channel reaches 0 or 1.

use super::luv::{EPSILON, KAPPA};
use super::xyz::{anchor_to_xyz, xyz_to_anchor};
use super::{hex_via_rgb, Luv, Space, SpaceType};
use pigment_icc::Profile;
use std::sync::Arc;

/// XYZ (D65) to linear sRGB, rows per channel.
const M: [[f64; 3]; 3] = [
    [3.24096994190452134377, -1.53738317757009345794, -0.49861076029300328366],
    [-0.96924363628087982613, 1.87596750150772066772, 0.04155505740717561247],
    [0.05563007969699360846, -0.20397695888897656435, 1.05697151424287856072],
];

/// HSLuv, printed as hex.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hsluv;

/// A gamut boundary `a·x + b·y + c = 0` in the u,v plane.
#[derive(Debug, Clone, Copy)]
struct Line {
    a: f64,
    b: f64,
    c: f64,
}

impl Line {
    /// Distance from the origin to this line along `angle`, if the ray hits it.
    fn ray_length(&self, angle: f64) -> Option<f64> {
        let (sin, cos) = angle.sin_cos();
        let den = self.a * cos + self.b * sin;
        if den == 0.0 {
            return None;
        }
        let t = -self.c / den;
        (t >= 0.0 && t.is_finite()).then_some(t)
    }
}

/// The six sRGB boundary lines at lightness `l` (0..100).
fn bounds(l: f64) -> [Line; 6] {
    let tl = l + 16.0;
    let sub1 = tl * tl * tl / 1_560_896.0;
    let sub2 = if sub1 > EPSILON { sub1 } else { l / KAPPA };
    let mut lines = [Line { a: 0.0, b: 0.0, c: 0.0 }; 6];
    for (channel, &[m1, m2, m3]) in M.iter().enumerate() {
        for t in 0..2 {
            let t = t as f64;
            let top1 = (284_517.0 * m1 - 94_839.0 * m3) * sub2;
            let top2 = (838_422.0 * m3 + 769_860.0 * m2 + 731_718.0 * m1) * l * sub2 - 769_860.0 * t * l;
            let bottom = (632_260.0 * m3 - 126_452.0 * m2) * sub2 + 126_452.0 * t;
            lines[channel * 2 + t as usize] = Line { a: top1, b: -bottom, c: top2 };
        }
    }
    lines
}

/// Largest in-gamut chroma at lightness `l` (0..100) and hue `h` (degrees).
pub(crate) fn max_chroma(l: f64, h: f64) -> f64 {
    let angle = h.to_radians();
    bounds(l)
        .iter()
        .filter_map(|line| line.ray_length(angle))
        .fold(f64::MAX, f64::min)
}

/// HSLuv (all 0..1) to real `L, u, v`.
pub(crate) fn hsluv_to_luv([h, s, l]: [f64; 3]) -> [f64; 3] {
    let (h, s, l) = (h * 360.0, s * 100.0, l * 100.0);
    let c = if l > 99.9999999 || l < 1e-8 { 0.0 } else { max_chroma(l, h) / 100.0 * s };
    let h = if s < 1e-8 { 0.0 } else { h };
    let (sin, cos) = h.to_radians().sin_cos();
    [l, cos * c, sin * c]
}

/// Real `L, u, v` to HSLuv (all 0..1).
pub(crate) fn luv_to_hsluv([l, u, v]: [f64; 3]) -> [f64; 3] {
    let c = u.hypot(v);
    let h = if c < 1e-8 { 0.0 } else { v.atan2(u).to_degrees().rem_euclid(360.0) };
    let s = if l > 99.9999999 || l < 1e-8 { 0.0 } else { c / max_chroma(l, h) * 100.0 };
    [h / 360.0, s / 100.0, l / 100.0]
}

impl Space for Hsluv {
    fn space_type(&self) -> SpaceType {
        SpaceType::Hsluv
    }

    fn name(&self) -> &str {
        "HSLuv"
    }

    fn icon(&self) -> &str {
        "color-selector-hsluv"
    }

    fn component_count(&self) -> usize {
        3
    }

    fn profile(&self) -> Arc<Profile> {
        Profile::xyz_d65()
    }

    fn space_to_profile(&self, io: &mut Vec<f64>) {
        if let [h, s, l, ..] = io[..] {
            io[..3].copy_from_slice(&Luv::to_xyz(hsluv_to_luv([h, s, l])));
            xyz_to_anchor(io);
        }
    }

    fn profile_to_space(&self, io: &mut Vec<f64>) {
        if let [x, y, z, ..] = io[..] {
            let mut xyz = [x, y, z];
            anchor_to_xyz(&mut xyz);
            io[..3].copy_from_slice(&luv_to_hsluv(Luv::from_xyz(xyz)));
        }
    }

    fn to_css(&self, values: &[f64], opacity: Option<f64>) -> String {
        hex_via_rgb(self, values, opacity)
    }
}
