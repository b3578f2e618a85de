//! OkHSL and OkHSV: HSL and HSV shaped models over Oklab.
//!
//! Both follow Ottosson's construction: the sRGB gamut slice at a hue is
//! approximated by a triangle through its cusp, lightness goes through a
//! toe curve, and saturation is chroma relative to that slice.

use super::{from_linear, hex_via_rgb, to_linear, OkLab, Space, SpaceType};
use pigment_icc::Profile;
use std::f64::consts::PI;
use std::sync::Arc;

/// Lightness treated as pure black or white.
const EDGE: f64 = 1e-6;

/// Below this Oklab chroma a color is gray.
const GRAY: f64 = 1e-6;

/// OkHSL, printed as hex.
#[derive(Debug, Clone, Copy, Default)]
pub struct OkHsl;

/// OkHSV, printed as hex.
#[derive(Debug, Clone, Copy, Default)]
pub struct OkHsv;

/// Lightness and chroma of a cusp.
#[derive(Debug, Clone, Copy)]
struct Cusp {
    l: f64,
    c: f64,
}

const K1: f64 = 0.206;
const K2: f64 = 0.03;
const K3: f64 = (1.0 + K1) / (1.0 + K2);

fn toe(x: f64) -> f64 {
    0.5 * (K3 * x - K1 + ((K3 * x - K1) * (K3 * x - K1) + 4.0 * K2 * K3 * x).sqrt())
}

fn toe_inv(x: f64) -> f64 {
    (x * x + K1 * x) / (K3 * (x + K2))
}

/// Cone response coefficients of a unit hue direction.
fn cone_k(a: f64, b: f64) -> (f64, f64, f64) {
    (
        0.3963377774 * a + 0.2158037573 * b,
        -0.1055613458 * a - 0.0638541728 * b,
        -0.0894841775 * a - 1.2914855480 * b,
    )
}

/// Largest saturation `C/L` inside sRGB along the unit hue `(a, b)`.
fn max_saturation(a: f64, b: f64) -> f64 {
    let (k0, k1, k2, k3, k4, wl, wm, ws) = if -1.88170328 * a - 0.80936493 * b > 1.0 {
        (1.19086277, 1.76576728, 0.59662641, 0.75515197, 0.56771245, 4.0767416621, -3.3077115913, 0.2309699292)
    } else if 1.81444104 * a - 1.19445276 * b > 1.0 {
        (0.73956515, -0.45954404, 0.08285427, 0.12541070, 0.14503204, -1.2684380046, 2.6097574011, -0.3413193965)
    } else {
        (1.35733652, -0.00915799, -1.15130210, -0.50559606, 0.00692167, -0.0041960863, -0.7034186147, 1.7076147010)
    };
    let mut s = k0 + k1 * a + k2 * b + k3 * a * a + k4 * a * b;

    // one Halley step
    let (k_l, k_m, k_s) = cone_k(a, b);
    let (l_, m_, s_) = (1.0 + s * k_l, 1.0 + s * k_m, 1.0 + s * k_s);
    let (l, m, s3) = (l_ * l_ * l_, m_ * m_ * m_, s_ * s_ * s_);
    let (l_ds, m_ds, s_ds) = (3.0 * k_l * l_ * l_, 3.0 * k_m * m_ * m_, 3.0 * k_s * s_ * s_);
    let (l_ds2, m_ds2, s_ds2) = (6.0 * k_l * k_l * l_, 6.0 * k_m * k_m * m_, 6.0 * k_s * k_s * s_);
    let f = wl * l + wm * m + ws * s3;
    let f1 = wl * l_ds + wm * m_ds + ws * s_ds;
    let f2 = wl * l_ds2 + wm * m_ds2 + ws * s_ds2;
    s -= f * f1 / (f1 * f1 - 0.5 * f * f2);
    s
}

fn find_cusp(a: f64, b: f64) -> Cusp {
    let s_cusp = max_saturation(a, b);
    let [r, g, b_] = OkLab::to_linear_rgb([1.0, s_cusp * a, s_cusp * b]);
    let l = (1.0 / r.max(g).max(b_)).cbrt();
    Cusp { l, c: l * s_cusp }
}

/// Parameter `t` where the line from `(l0, 0)` to `(l1, c1)` leaves the gamut.
fn find_gamut_intersection(a: f64, b: f64, l1: f64, c1: f64, l0: f64, cusp: Cusp) -> f64 {
    if (l1 - l0) * cusp.c - (cusp.l - l0) * c1 <= 0.0 {
        return cusp.c * l0 / (c1 * cusp.l + cusp.c * (l0 - l1));
    }
    let mut t = cusp.c * (l0 - 1.0) / (c1 * (cusp.l - 1.0) + cusp.c * (l0 - l1));

    let (k_l, k_m, k_s) = cone_k(a, b);
    let dl = l1 - l0;
    let (l_dt, m_dt, s_dt) = (dl + c1 * k_l, dl + c1 * k_m, dl + c1 * k_s);

    let l = l0 * (1.0 - t) + t * l1;
    let c = t * c1;
    let (l_, m_, s_) = (l + c * k_l, l + c * k_m, l + c * k_s);
    let cone = [l_ * l_ * l_, m_ * m_ * m_, s_ * s_ * s_];
    let d1 = [3.0 * l_dt * l_ * l_, 3.0 * m_dt * m_ * m_, 3.0 * s_dt * s_ * s_];
    let d2 = [6.0 * l_dt * l_dt * l_, 6.0 * m_dt * m_dt * m_, 6.0 * s_dt * s_dt * s_];

    let rows = [
        [4.0767416621, -3.3077115913, 0.2309699292],
        [-1.2684380046, 2.6097574011, -0.3413193965],
        [-0.0041960863, -0.7034186147, 1.7076147010],
    ];
    let dot = |w: &[f64; 3], v: &[f64; 3]| w[0] * v[0] + w[1] * v[1] + w[2] * v[2];
    let step = rows
        .iter()
        .map(|w| {
            let f = dot(w, &cone) - 1.0;
            let f1 = dot(w, &d1);
            let f2 = dot(w, &d2);
            let u = f1 / (f1 * f1 - 0.5 * f * f2);
            if u >= 0.0 { -f * u } else { f64::MAX }
        })
        .fold(f64::MAX, f64::min);
    t += step;
    t
}

/// `(S, T)` slopes of a cusp triangle.
fn to_st(cusp: Cusp) -> (f64, f64) {
    (cusp.c / cusp.l, cusp.c / (1.0 - cusp.l))
}

/// Smooth approximation of the cusp slopes.
fn st_mid(a: f64, b: f64) -> (f64, f64) {
    let s = 0.11516993
        + 1.0
            / (7.44778970
                + 4.15901240 * b
                + a * (-2.19557347
                    + 1.75198401 * b
                    + a * (-2.13704948 - 10.02301043 * b + a * (-4.24894561 + 5.38770819 * b + 4.69891013 * a))));
    let t = 0.11239642
        + 1.0
            / (1.61320320 - 0.68124379 * b
                + a * (0.40370612
                    + 0.90148123 * b
                    + a * (-0.27087943 + 0.61223990 * b + a * (0.00299215 - 0.45399568 * b - 0.14661872 * a))));
    (s, t)
}

/// Chroma at saturation 0+, the mid point and the gamut edge.
fn chroma_bounds(l: f64, a: f64, b: f64) -> (f64, f64, f64) {
    let cusp = find_cusp(a, b);
    let c_max = find_gamut_intersection(a, b, l, 1.0, l, cusp);
    let (s_max, t_max) = to_st(cusp);
    let k = c_max / (l * s_max).min((1.0 - l) * t_max);

    let (s_mid, t_mid) = st_mid(a, b);
    let (ca, cb) = (l * s_mid, (1.0 - l) * t_mid);
    let c_mid = 0.9 * k * (1.0 / (1.0 / ca.powi(4) + 1.0 / cb.powi(4))).sqrt().sqrt();

    let (ca, cb) = (l * 0.4, (1.0 - l) * 0.8);
    let c_0 = (1.0 / (1.0 / (ca * ca) + 1.0 / (cb * cb))).sqrt();
    (c_0, c_mid, c_max)
}

/// Oklab of an sRGB color split into lightness, chroma, unit hue and hue turn.
fn polar(rgb: [f64; 3]) -> (f64, f64, f64, f64, f64) {
    let [l, a, b] = OkLab::from_linear_rgb(rgb.map(to_linear));
    let c = a.hypot(b);
    if c < GRAY {
        return (l, 0.0, 1.0, 0.0, 0.0);
    }
    let h = 0.5 + 0.5 * (-b).atan2(-a) / PI;
    (l, c, a / c, b / c, h)
}

fn oklab_to_srgb(l: f64, c: f64, a: f64, b: f64) -> [f64; 3] {
    OkLab::to_linear_rgb([l, c * a, c * b]).map(from_linear)
}

const MID: f64 = 0.8;
const MID_INV: f64 = 1.25;

/// OkHSL (all 0..1) to sRGB.
pub(crate) fn okhsl_to_srgb([h, s, l]: [f64; 3]) -> [f64; 3] {
    if l >= 1.0 {
        return [1.0; 3];
    }
    if l <= 0.0 {
        return [0.0; 3];
    }
    let (b, a) = (2.0 * PI * h).sin_cos();
    let l = toe_inv(l);
    let (c_0, c_mid, c_max) = chroma_bounds(l, a, b);
    let c = if s < MID {
        let t = MID_INV * s;
        let k1 = MID * c_0;
        let k2 = 1.0 - k1 / c_mid;
        t * k1 / (1.0 - k2 * t)
    } else {
        let t = (s - MID) / (1.0 - MID);
        let k1 = (1.0 - MID) * c_mid * c_mid * MID_INV * MID_INV / c_0;
        let k2 = 1.0 - k1 / (c_max - c_mid);
        c_mid + t * k1 / (1.0 - k2 * t)
    };
    oklab_to_srgb(l, c, a, b)
}

/// sRGB to OkHSL (all 0..1).
pub(crate) fn srgb_to_okhsl(rgb: [f64; 3]) -> [f64; 3] {
    let (l, c, a, b, h) = polar(rgb);
    if l <= EDGE {
        return [0.0; 3];
    }
    if l >= 1.0 - EDGE {
        return [0.0, 0.0, 1.0];
    }
    let (c_0, c_mid, c_max) = chroma_bounds(l, a, b);
    let s = if c < c_mid {
        let k1 = MID * c_0;
        let k2 = 1.0 - k1 / c_mid;
        c / (k1 + k2 * c) * MID
    } else {
        let k1 = (1.0 - MID) * c_mid * c_mid * MID_INV * MID_INV / c_0;
        let k2 = 1.0 - k1 / (c_max - c_mid);
        let t = (c - c_mid) / (k1 + k2 * (c - c_mid));
        MID + (1.0 - MID) * t
    };
    [h, s, toe(l)]
}

const S0: f64 = 0.5;

/// OkHSV (all 0..1) to sRGB.
pub(crate) fn okhsv_to_srgb([h, s, v]: [f64; 3]) -> [f64; 3] {
    if v <= EDGE {
        return [0.0; 3];
    }
    let (b, a) = (2.0 * PI * h).sin_cos();
    let (s_max, t_max) = to_st(find_cusp(a, b));
    let k = 1.0 - S0 / s_max;

    let den = S0 + t_max - t_max * k * s;
    let l_v = 1.0 - s * S0 / den;
    let c_v = s * t_max * S0 / den;
    let mut l = v * l_v;
    let mut c = v * c_v;

    let l_vt = toe_inv(l_v);
    let c_vt = c_v * l_vt / l_v;
    let l_new = toe_inv(l);
    c *= l_new / l;
    l = l_new;

    let [r, g, b_] = OkLab::to_linear_rgb([l_vt, a * c_vt, b * c_vt]);
    let scale = (1.0 / r.max(g).max(b_).max(0.0)).cbrt();
    oklab_to_srgb(l * scale, c * scale, a, b)
}

/// sRGB to OkHSV (all 0..1).
pub(crate) fn srgb_to_okhsv(rgb: [f64; 3]) -> [f64; 3] {
    let (l, c, a, b, h) = polar(rgb);
    if l <= EDGE {
        return [0.0; 3];
    }
    let (s_max, t_max) = to_st(find_cusp(a, b));
    let k = 1.0 - S0 / s_max;

    let t = t_max / (c + l * t_max);
    let l_v = t * l;
    let c_v = t * c;
    let l_vt = toe_inv(l_v);
    let c_vt = c_v * l_vt / l_v;

    let [r, g, b_] = OkLab::to_linear_rgb([l_vt, a * c_vt, b * c_vt]);
    let scale = (1.0 / r.max(g).max(b_).max(0.0)).cbrt();
    let l = toe(l / scale);

    let v = l / l_v;
    let s = (S0 + t_max) * c_v / (t_max * S0 + t_max * k * c_v);
    [h, s, v]
}

macro_rules! ok_space {
    ($ty:ident, $kind:ident, $name:literal, $to_srgb:ident, $from_srgb:ident) => {
        impl Space for $ty {
            fn space_type(&self) -> SpaceType {
                SpaceType::$kind
            }

            fn name(&self) -> &str {
                $name
            }

            fn icon(&self) -> &str {
                "color-selector-okhsx"
            }

            fn component_count(&self) -> usize {
                3
            }

            fn profile(&self) -> Arc<Profile> {
                Profile::srgb()
            }

            fn space_to_profile(&self, io: &mut Vec<f64>) {
                if let [x, y, z, ..] = io[..] {
                    io[..3].copy_from_slice(&$to_srgb([x, y, z]));
                }
            }

            fn profile_to_space(&self, io: &mut Vec<f64>) {
                if let [r, g, b, ..] = io[..] {
                    io[..3].copy_from_slice(&$from_srgb([r, g, b]));
                }
            }

            fn to_css(&self, values: &[f64], opacity: Option<f64>) -> String {
                hex_via_rgb(self, values, opacity)
            }
        }
    };
}

ok_space!(OkHsl, Okhsl, "OkHsl", okhsl_to_srgb, srgb_to_okhsl);
ok_space!(OkHsv, Okhsv, "OkHsv", okhsv_to_srgb, srgb_to_okhsv);

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const SAMPLES: [[f64; 3]; 5] = [
        [0.2, 0.4, 0.6],
        [0.9, 0.1, 0.3],
        [0.5, 0.8, 0.3],
        [1.0, 1.0, 0.0],
        [0.05, 0.02, 0.9],
    ];

    #[test]
    fn test_okhsl_roundtrip() {
        for rgb in SAMPLES {
            let back = okhsl_to_srgb(srgb_to_okhsl(rgb));
            for i in 0..3 {
                assert_abs_diff_eq!(back[i], rgb[i], epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn test_okhsv_roundtrip() {
        for rgb in SAMPLES {
            let back = okhsv_to_srgb(srgb_to_okhsv(rgb));
            for i in 0..3 {
                assert_abs_diff_eq!(back[i], rgb[i], epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn test_edges() {
        assert_eq!(srgb_to_okhsl([0.0; 3]), [0.0; 3]);
        assert_eq!(srgb_to_okhsl([1.0; 3]), [0.0, 0.0, 1.0]);
        assert_eq!(okhsl_to_srgb([0.3, 1.0, 1.0]), [1.0; 3]);
        assert_eq!(srgb_to_okhsv([0.0; 3]), [0.0; 3]);
        assert_eq!(okhsv_to_srgb([0.3, 1.0, 0.0]), [0.0; 3]);
    }

    #[test]
    fn test_gray_has_no_saturation() {
        let [h, s, l] = srgb_to_okhsl([0.5; 3]);
        assert_eq!(h, 0.0);
        assert_abs_diff_eq!(s, 0.0, epsilon = 1e-9);
        assert!(l > 0.4 && l < 0.6);

        let [_, s, v] = srgb_to_okhsv([0.5; 3]);
        assert_abs_diff_eq!(s, 0.0, epsilon = 1e-9);
        assert!(v > 0.4 && v < 0.6);
    }

    #[test]
    fn test_full_saturation_red() {
        let [_, s, v] = srgb_to_okhsv([1.0, 0.0, 0.0]);
        assert_abs_diff_eq!(s, 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(v, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_to_css() {
        assert_eq!(OkHsl.to_css(&[0.0, 0.0, 1.0], None), "#ffffff");
    }
}
