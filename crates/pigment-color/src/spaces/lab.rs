//! CIE L*a*b*.
//!
//! Stored as `L/100, (a+128)/255, (b+128)/255`, which is exactly the
//! normalized float encoding the Lab anchor profile reads, so no math runs
//! on the way to the profile.

use super::{scale_down, scale_up, Space, SpaceType};
use crate::parser::{scaled_values, ColorParser, Cursor, Parsed};
use crate::printer::CssPrinter;
use pigment_icc::Profile;
use std::sync::Arc;

/// Lowest encodable a*/b*.
pub(crate) const AB_MIN: f64 = -128.0;
/// Highest encodable a*/b*.
pub(crate) const AB_MAX: f64 = 127.0;

const EPSILON: f64 = 0.008856;
const KAPPA: f64 = 7.787;

/// CIE L*a*b* (D50), printed as `lab(L a b)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lab;

impl Lab {
    /// Converts real `L, a, b` to XYZ relative to the reference white.
    ///
    /// # Formula
    ///
    /// ```text
    /// fy = (L + 16) / 116,  fx = a / 500 + fy,  fz = fy - b / 200
    /// t  = f^3              if f^3 > 0.008856
    ///      (f - 16/116) / 7.787  otherwise
    /// ```
    pub fn to_xyz(lab: [f64; 3]) -> [f64; 3] {
        let [l, a, b] = lab;
        let fy = (l + 16.0) / 116.0;
        let fx = a / 500.0 + fy;
        let fz = fy - b / 200.0;
        let inverse = |f: f64| {
            let cube = f.powi(3);
            if cube > EPSILON { cube } else { (f - 16.0 / 116.0) / KAPPA }
        };
        [inverse(fx), inverse(fy), inverse(fz)]
    }

    /// Converts XYZ relative to the reference white to real `L, a, b`.
    pub fn from_xyz(xyz: [f64; 3]) -> [f64; 3] {
        let forward = |t: f64| {
            if t > EPSILON { t.cbrt() } else { KAPPA * t + 16.0 / 116.0 }
        };
        let [x, y, z] = xyz;
        let l = if y > EPSILON { 116.0 * y.cbrt() - 16.0 } else { 903.3 * y };
        let (fx, fy, fz) = (forward(x), forward(y), forward(z));
        [l, 500.0 * (fx - fy), 200.0 * (fy - fz)]
    }

    /// Stored channels to real `L, a, b`.
    pub(crate) fn unpack(values: &[f64]) -> [f64; 3] {
        [values[0] * 100.0, scale_up(values[1], AB_MIN, AB_MAX), scale_up(values[2], AB_MIN, AB_MAX)]
    }

    /// Real `L, a, b` to stored channels.
    pub(crate) fn pack(lab: [f64; 3]) -> [f64; 3] {
        [lab[0] / 100.0, scale_down(lab[1], AB_MIN, AB_MAX), scale_down(lab[2], AB_MIN, AB_MAX)]
    }
}

impl Space for Lab {
    fn space_type(&self) -> SpaceType {
        SpaceType::Lab
    }

    fn name(&self) -> &str {
        "Lab"
    }

    fn icon(&self) -> &str {
        "color-selector-lab"
    }

    fn component_count(&self) -> usize {
        3
    }

    fn profile(&self) -> Arc<Profile> {
        Profile::lab()
    }

    fn is_unbounded(&self) -> bool {
        true
    }

    fn to_css(&self, values: &[f64], opacity: Option<f64>) -> String {
        if values.len() < 3 {
            return String::new();
        }
        CssPrinter::func("lab", 3).values(&Lab::unpack(values)).opacity(opacity).finish()
    }
}

/// `lab(L a b [/ A])`, L in 0..100, a and b where 100% is 125.
pub(crate) struct LabParser;

impl ColorParser for LabParser {
    fn prefix(&self) -> &str {
        "lab"
    }

    fn space_type(&self) -> SpaceType {
        SpaceType::Lab
    }

    fn parse(&self, cursor: &mut Cursor<'_>) -> Option<Parsed> {
        let pc = 100.0 / 125.0;
        let mut values = scaled_values(cursor, [(100.0, 100.0), (1.0, pc), (1.0, pc)])?;
        values[1] = scale_down(values[1], AB_MIN, AB_MAX);
        values[2] = scale_down(values[2], AB_MIN, AB_MAX);
        Some(values.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spaces::Rgb;
    use crate::Parsers;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_xyz_roundtrip() {
        for lab in [[50.0, 20.0, -30.0], [90.0, -60.0, 70.0], [5.0, 1.0, -1.0]] {
            let back = Lab::from_xyz(Lab::to_xyz(lab));
            for i in 0..3 {
                assert_abs_diff_eq!(back[i], lab[i], epsilon = 0.05);
            }
        }
        let white = Lab::to_xyz([100.0, 0.0, 0.0]);
        assert_abs_diff_eq!(white[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_white_from_srgb() {
        let rgb: &dyn Space = &Rgb;
        let mut io = vec![1.0, 1.0, 1.0];
        assert!(rgb.convert(&mut io, &Lab));
        let [l, a, b] = Lab::unpack(&io);
        assert_abs_diff_eq!(l, 100.0, epsilon = 0.5);
        assert_abs_diff_eq!(a, 0.0, epsilon = 0.5);
        assert_abs_diff_eq!(b, 0.0, epsilon = 0.5);
    }

    #[test]
    fn test_to_css() {
        let values = Lab::pack([50.0, 20.0, -30.0]);
        assert_eq!(Lab.to_css(&values, None), "lab(50 20 -30)");
    }

    #[test]
    fn test_parse() {
        let p = Parsers::get().parse("lab(50% 100% -20)").unwrap();
        assert_eq!(p.space_type, SpaceType::Lab);
        let [l, a, b] = Lab::unpack(&p.values);
        assert_abs_diff_eq!(l, 50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(a, 125.0, epsilon = 1e-9);
        assert_abs_diff_eq!(b, -20.0, epsilon = 1e-9);

        let p = Parsers::get().parse("lab(50 0 0 / 0.5)").unwrap();
        assert_eq!(p.values.len(), 4);
        assert_abs_diff_eq!(p.values[3], 0.5);
    }
}
