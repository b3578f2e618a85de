//! Oklch, the polar form of Oklab, and its sRGB gamut boundary.

use super::oklab::AB_RANGE;
use super::{OkLab, Space, SpaceType};
use crate::parser::{scaled_values, ColorParser, Cursor, Parsed};
use crate::printer::CssPrinter;
use pigment_icc::Profile;
use std::f64::consts::PI;
use std::sync::Arc;

/// Below this chroma the hue is undefined and reads as 0.
const ACHROMATIC: f64 = 0.001;

/// Oklch, printed as `oklch(L C H)`. Stored chroma is `C / 0.4`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OkLch;

/// Real `L, C, H°` to real Oklab.
pub(crate) fn oklch_to_oklab([l, c, h]: [f64; 3]) -> [f64; 3] {
    let (sin, cos) = h.to_radians().sin_cos();
    [l, c * cos, c * sin]
}

/// Real Oklab to real `L, C, H°`.
pub(crate) fn oklab_to_oklch([l, a, b]: [f64; 3]) -> [f64; 3] {
    let c = a.hypot(b);
    if c <= ACHROMATIC {
        return [l, c, 0.0];
    }
    let h = b.atan2(a).rem_euclid(2.0 * PI).to_degrees();
    [l, c, h]
}

/// Polynomial coefficients, in chroma, of one linear sRGB channel at a
/// fixed lightness and hue.
struct ChannelBound {
    l2cos: f64,
    l2sin: f64,
    lcos2: f64,
    lcossin: f64,
    lsin2: f64,
    cos3: f64,
    cos2sin: f64,
    cossin2: f64,
    sin3: f64,
}

const BOUNDS: [ChannelBound; 3] = [
    ChannelBound {
        l2cos: 5.83279532899080641005754476131631984,
        l2sin: 2.3780791275435732378965655753413412,
        lcos2: 1.81614129917652075864819542521099165275,
        lcossin: 2.11851258971260413543962953223104329409,
        lsin2: 1.68484527361538384522450980300698198391,
        cos3: 0.257535869797624151773507242289856932594,
        cos2sin: 0.414490345667882332785000888243122224651,
        cossin2: 0.126596511492002610582126014059213892767,
        sin3: -0.455702039844046560333204117380816048203,
    },
    ChannelBound {
        l2cos: -2.243030176177044107983968331289088261,
        l2sin: 0.00129441240977850026657772225608,
        lcos2: -0.5187087369791308621879921351291952375,
        lcossin: -0.7820717390897833607054953914674219281,
        lsin2: -1.8531911425339782749638630868227383795,
        cos3: -0.0817959138495637068389017598370049459,
        cos2sin: -0.1239788660641220973883495153116480854,
        cossin2: 0.0792215342150077349794741576353537047,
        sin3: 0.7218132301017783162780535454552058572,
    },
    ChannelBound {
        l2cos: -0.2406412780923628220925350522352767957,
        l2sin: -6.48404701978782955733370693958213669,
        lcos2: 0.015528352128452044798222201797574285162,
        lcossin: 1.153466975472590255156068122829360981648,
        lsin2: 8.535379923500727607267514499627438513637,
        cos3: -0.0006573855374563134769075967180540368,
        cos2sin: -0.0519029179849443823389557527273309386,
        cossin2: -0.763927972885238036962716856256210617,
        sin3: -3.67825541507929556013845659620477582,
    },
];

/// Real roots of `a·x³ + b·x² + c·x + d`, ascending.
fn solve_cubic(a: f64, b: f64, c: f64, d: f64) -> Vec<f64> {
    const TINY: f64 = 1e-12;
    let mut roots = if a.abs() < TINY {
        solve_quadratic(b, c, d)
    } else {
        let (b, c, d) = (b / a, c / a, d / a);
        let shift = b / 3.0;
        let p = c - b * b / 3.0;
        let q = 2.0 * b * b * b / 27.0 - b * c / 3.0 + d;
        let disc = q * q / 4.0 + p * p * p / 27.0;
        if disc > TINY {
            let sq = disc.sqrt();
            vec![(-q / 2.0 + sq).cbrt() + (-q / 2.0 - sq).cbrt() - shift]
        } else if disc < -TINY {
            let r = 2.0 * (-p / 3.0).sqrt();
            let phi = ((3.0 * q) / (p * r)).clamp(-1.0, 1.0).acos() / 3.0;
            (0..3).map(|k| r * (phi - 2.0 * PI * k as f64 / 3.0).cos() - shift).collect()
        } else {
            let u = (-q / 2.0).cbrt();
            vec![2.0 * u - shift, -u - shift]
        }
    };
    roots.sort_by(f64::total_cmp);
    roots
}

fn solve_quadratic(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a.abs() < 1e-12 {
        return if b.abs() < 1e-12 { Vec::new() } else { vec![-c / b] };
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Vec::new();
    }
    let sq = disc.sqrt();
    vec![(-b - sq) / (2.0 * a), (-b + sq) / (2.0 * a)]
}

impl OkLch {
    /// Largest chroma still inside sRGB at lightness `l` (0..1) and hue
    /// `h` (degrees). Real chroma, not the stored fraction.
    ///
    /// Each linear sRGB channel is a cubic in chroma along the hue ray; the
    /// bound is the nearest positive chroma where any channel reaches 0 or 1.
    pub fn max_chroma(l: f64, h: f64) -> f64 {
        const EPS: f64 = 1e-7;
        if !(EPS..=1.0 - EPS).contains(&l) {
            return 0.0;
        }
        let (s, c) = h.to_radians().sin_cos();
        let (l2, l3) = (l * l, l * l * l);
        let (c2, c3) = (c * c, c * c * c);
        let s2 = 1.0 - c2;
        let s3 = s2 * s;

        let mut bound = f64::INFINITY;
        for ch in &BOUNDS {
            let k1 = ch.l2cos * l2 * c + ch.l2sin * l2 * s;
            let k2 = ch.lcos2 * l * c2 + ch.lcossin * l * c * s + ch.lsin2 * l * s2;
            let k3 = ch.cos3 * c3 + ch.cos2sin * c2 * s + ch.cossin2 * c * s2 + ch.sin3 * s3;
            for target in [0.0, 1.0] {
                let first = solve_cubic(k3, k2, k1, l3 - target).into_iter().find(|root| *root >= EPS);
                if let Some(root) = first {
                    bound = bound.min(root);
                }
            }
        }
        if bound.is_finite() { bound } else { 0.0 }
    }
}

impl Space for OkLch {
    fn space_type(&self) -> SpaceType {
        SpaceType::Oklch
    }

    fn name(&self) -> &str {
        "OkLch"
    }

    fn icon(&self) -> &str {
        "color-selector-oklch"
    }

    fn component_count(&self) -> usize {
        3
    }

    fn profile(&self) -> Arc<Profile> {
        Profile::srgb()
    }

    fn space_to_profile(&self, io: &mut Vec<f64>) {
        if let [l, c, h, ..] = io[..] {
            let lab = oklch_to_oklab([l, c * AB_RANGE, h * 360.0]);
            io[..3].copy_from_slice(&OkLab::to_srgb(lab));
        }
    }

    fn profile_to_space(&self, io: &mut Vec<f64>) {
        if let [r, g, b, ..] = io[..] {
            let [l, c, h] = oklab_to_oklch(OkLab::from_srgb([r, g, b]));
            io[..3].copy_from_slice(&[l, c / AB_RANGE, h / 360.0]);
        }
    }

    fn to_css(&self, values: &[f64], opacity: Option<f64>) -> String {
        let [l, c, h, ..] = values else {
            return String::new();
        };
        CssPrinter::func("oklch", 3)
            .values(&[*l, c * AB_RANGE, h * 360.0])
            .opacity(opacity)
            .finish()
    }
}

/// `oklch(L C H [/ A])`, where 100% chroma is 0.4.
pub(crate) struct OkLchParser;

impl ColorParser for OkLchParser {
    fn prefix(&self) -> &str {
        "oklch"
    }

    fn space_type(&self) -> SpaceType {
        SpaceType::Oklch
    }

    fn parse(&self, cursor: &mut Cursor<'_>) -> Option<Parsed> {
        scaled_values(cursor, [(1.0, 100.0), (AB_RANGE, 100.0), (360.0, 100.0)]).map(Parsed::from)
    }
}
