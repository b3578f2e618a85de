//! Björn Ottosson's Oklab.
//!
//! Linear sRGB goes through an LMS cone response, a cube root and a second
//! matrix. Stored a and b map -0.4..0.4 onto 0..1.

use super::{from_linear, row_major, scale_down, scale_up, to_linear, Space, SpaceType};
use crate::parser::{scaled_values, ColorParser, Cursor, Parsed};
use crate::printer::CssPrinter;
use glam::DVec3;
use pigment_icc::Profile;
use std::sync::Arc;

/// Bound of the stored a and b range.
pub(crate) const AB_RANGE: f64 = 0.4;

const LRGB_TO_CONE: [[f64; 3]; 3] = [
    [0.4122214708, 0.5363325363, 0.0514459929],
    [0.2119034982, 0.6806995451, 0.1073969566],
    [0.0883024619, 0.2817188376, 0.6299787005],
];

const CONE_TO_LRGB: [[f64; 3]; 3] = [
    [4.0767416613479942676681908333711298900607278264432, -3.30771159040819331315866078424893188865618253342, 0.230969928729427886449650619561935920170561518112],
    [-1.2684380040921760691815055595117506020901414005992, 2.60975740066337143024050095284233623056192338553, -0.341319396310219620992658250306535533187548361872],
    [-0.0041960865418371092973767821251846315637521173374, -0.70341861445944960601310996913659932654899822384, 1.707614700930944853864541790660472961199090408527],
];

const CONE_TO_LAB: [[f64; 3]; 3] = [
    [0.2104542553, 0.793617785, -0.0040720468],
    [1.9779984951, -2.428592205, 0.4505937099],
    [0.0259040371, 0.7827717662, -0.808675766],
];

const LAB_TO_CONE: [[f64; 3]; 3] = [
    [0.99999999845051981426207542502031373637162589278552, 0.39633779217376785682345989261573192476766903603, 0.215803758060758803423141461830037892590617787467],
    [1.00000000888176077671607524567047071276183677410134, -0.10556134232365634941095687705472233997368274024, -0.063854174771705903405254198817795633810975771082],
    [1.00000005467241091770129286515344610721841028698942, -0.08948418209496575968905274586339134130669669716, -1.291485537864091739948928752914772401878545675371],
];

/// Oklab, printed as `oklab(L a b)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OkLab;

impl OkLab {
    /// Real Oklab to linear sRGB.
    pub fn to_linear_rgb(lab: [f64; 3]) -> [f64; 3] {
        let cone = row_major(&LAB_TO_CONE) * DVec3::from_array(lab);
        let cone = cone * cone * cone;
        (row_major(&CONE_TO_LRGB) * cone).to_array()
    }

    /// Linear sRGB to real Oklab.
    pub fn from_linear_rgb(rgb: [f64; 3]) -> [f64; 3] {
        let cone = row_major(&LRGB_TO_CONE) * DVec3::from_array(rgb);
        let cone = DVec3::new(cone.x.cbrt(), cone.y.cbrt(), cone.z.cbrt());
        (row_major(&CONE_TO_LAB) * cone).to_array()
    }

    /// Real Oklab to gamma encoded sRGB.
    pub(crate) fn to_srgb(lab: [f64; 3]) -> [f64; 3] {
        Self::to_linear_rgb(lab).map(from_linear)
    }

    /// Gamma encoded sRGB to real Oklab.
    pub(crate) fn from_srgb(rgb: [f64; 3]) -> [f64; 3] {
        Self::from_linear_rgb(rgb.map(to_linear))
    }

    /// Stored channels to real `L, a, b`.
    pub(crate) fn unpack(values: &[f64]) -> [f64; 3] {
        [values[0], scale_up(values[1], -AB_RANGE, AB_RANGE), scale_up(values[2], -AB_RANGE, AB_RANGE)]
    }

    /// Real `L, a, b` to stored channels.
    pub(crate) fn pack([l, a, b]: [f64; 3]) -> [f64; 3] {
        [l, scale_down(a, -AB_RANGE, AB_RANGE), scale_down(b, -AB_RANGE, AB_RANGE)]
    }
}

impl Space for OkLab {
    fn space_type(&self) -> SpaceType {
        SpaceType::Oklab
    }

    fn name(&self) -> &str {
        "OkLab"
    }

    fn icon(&self) -> &str {
        "color-selector-oklab"
    }

    fn component_count(&self) -> usize {
        3
    }

    fn profile(&self) -> Arc<Profile> {
        Profile::srgb()
    }

    fn is_unbounded(&self) -> bool {
        true
    }

    fn space_to_profile(&self, io: &mut Vec<f64>) {
        if io.len() >= 3 {
            let rgb = OkLab::to_srgb(OkLab::unpack(io));
            io[..3].copy_from_slice(&rgb);
        }
    }

    fn profile_to_space(&self, io: &mut Vec<f64>) {
        if let [r, g, b, ..] = io[..] {
            io[..3].copy_from_slice(&OkLab::pack(OkLab::from_srgb([r, g, b])));
        }
    }

    fn to_css(&self, values: &[f64], opacity: Option<f64>) -> String {
        if values.len() < 3 {
            return String::new();
        }
        CssPrinter::func("oklab", 3).values(&OkLab::unpack(values)).opacity(opacity).finish()
    }
}

/// `oklab(L a b [/ A])`, where 100% a or b is 0.4.
pub(crate) struct OkLabParser;

impl ColorParser for OkLabParser {
    fn prefix(&self) -> &str {
        "oklab"
    }

    fn space_type(&self) -> SpaceType {
        SpaceType::Oklab
    }

    fn parse(&self, cursor: &mut Cursor<'_>) -> Option<Parsed> {
        let mut values = scaled_values(cursor, [(1.0, 100.0), (AB_RANGE, 100.0), (AB_RANGE, 100.0)])?;
        values[1] = (values[1] + 1.0) / 2.0;
        values[2] = (values[2] + 1.0) / 2.0;
        Some(values.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parsers;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_reference_values() {
        // white and the sRGB primaries from the Oklab reference
        let white = OkLab::from_linear_rgb([1.0, 1.0, 1.0]);
        assert_abs_diff_eq!(white[0], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(white[1], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(white[2], 0.0, epsilon = 1e-6);

        let red = OkLab::from_srgb([1.0, 0.0, 0.0]);
        assert_abs_diff_eq!(red[0], 0.62796, epsilon = 1e-4);
        assert_abs_diff_eq!(red[1], 0.22486, epsilon = 1e-4);
        assert_abs_diff_eq!(red[2], 0.12585, epsilon = 1e-4);
    }

    #[test]
    fn test_roundtrip() {
        for rgb in [[0.2, 0.4, 0.6], [1.0, 1.0, 0.0], [0.05, 0.0, 0.9]] {
            let back = OkLab::to_srgb(OkLab::from_srgb(rgb));
            for i in 0..3 {
                assert_abs_diff_eq!(back[i], rgb[i], epsilon = 1e-7);
            }
        }
    }

    #[test]
    fn test_to_css() {
        let values = OkLab::pack([0.5, -0.1, 0.2]);
        assert_eq!(OkLab.to_css(&values, Some(0.25)), "oklab(0.5 -0.1 0.2 / 25%)");
    }

    #[test]
    fn test_parse() {
        let p = Parsers::get().parse("oklab(62.8% 0.225 -25%)").unwrap();
        let [l, a, b] = OkLab::unpack(&p.values);
        assert_abs_diff_eq!(l, 0.628, epsilon = 1e-9);
        assert_abs_diff_eq!(a, 0.225, epsilon = 1e-9);
        assert_abs_diff_eq!(b, -0.1, epsilon = 1e-9);
    }
}
