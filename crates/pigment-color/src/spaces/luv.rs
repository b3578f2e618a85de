//! CIE L*u*v* under D65.

use super::xyz::{anchor_to_xyz, xyz_to_anchor, D65_WHITE};
use super::{hex_via_rgb, scale_down, scale_up, Space, SpaceType};
use pigment_icc::Profile;
use std::sync::Arc;

/// u′ and v′ of the D65 white.
const REF_UV: (f64, f64) = chromaticity(D65_WHITE);
const REF_U: f64 = REF_UV.0;
const REF_V: f64 = REF_UV.1;
pub(crate) const EPSILON: f64 = 0.0088564516;
pub(crate) const KAPPA: f64 = 903.2962962;

const U_MIN: f64 = -100.0;
const U_MAX: f64 = 200.0;
const V_MIN: f64 = -200.0;
const V_MAX: f64 = 120.0;

/// CIE L*u*v*, stored as `L/100` with u and v mapped from -100..200 and
/// -200..120.
#[derive(Debug, Clone, Copy, Default)]
pub struct Luv;

/// CIE 1976 u′v′ of an XYZ color.
const fn chromaticity([x, y, z]: [f64; 3]) -> (f64, f64) {
    let d = x + 15.0 * y + 3.0 * z;
    (4.0 * x / d, 9.0 * y / d)
}

/// Relative luminance to L*.
pub(crate) fn y_to_l(y: f64) -> f64 {
    if y <= EPSILON { y * KAPPA } else { 116.0 * y.cbrt() - 16.0 }
}

/// L* to relative luminance.
pub(crate) fn l_to_y(l: f64) -> f64 {
    if l <= 8.0 { l / KAPPA } else { ((l + 16.0) / 116.0).powi(3) }
}

impl Luv {
    /// Real `L, u, v` to XYZ with Y = 1 at white.
    pub fn to_xyz([l, u, v]: [f64; 3]) -> [f64; 3] {
        if l <= 1e-8 {
            return [0.0; 3];
        }
        let var_u = u / (13.0 * l) + REF_U;
        let var_v = v / (13.0 * l) + REF_V;
        let y = l_to_y(l);
        let x = -(9.0 * y * var_u) / ((var_u - 4.0) * var_v - var_u * var_v);
        let z = (9.0 * y - 15.0 * var_v * y - var_v * x) / (3.0 * var_v);
        [x, y, z]
    }

    /// XYZ with Y = 1 at white to real `L, u, v`.
    pub fn from_xyz([x, y, z]: [f64; 3]) -> [f64; 3] {
        let l = y_to_l(y);
        let den = x + 15.0 * y + 3.0 * z;
        if l < 1e-8 || den == 0.0 {
            return [l.max(0.0), 0.0, 0.0];
        }
        let var_u = 4.0 * x / den;
        let var_v = 9.0 * y / den;
        [l, 13.0 * l * (var_u - REF_U), 13.0 * l * (var_v - REF_V)]
    }
}

impl Space for Luv {
    fn space_type(&self) -> SpaceType {
        SpaceType::Luv
    }

    fn name(&self) -> &str {
        "Luv"
    }

    fn icon(&self) -> &str {
        "color-selector-luv"
    }

    fn component_count(&self) -> usize {
        3
    }

    fn profile(&self) -> Arc<Profile> {
        Profile::xyz_d65()
    }

    fn is_unbounded(&self) -> bool {
        true
    }

    fn space_to_profile(&self, io: &mut Vec<f64>) {
        if let [l, u, v, ..] = io[..] {
            let luv = [l * 100.0, scale_up(u, U_MIN, U_MAX), scale_up(v, V_MIN, V_MAX)];
            io[..3].copy_from_slice(&Luv::to_xyz(luv));
            xyz_to_anchor(io);
        }
    }

    fn profile_to_space(&self, io: &mut Vec<f64>) {
        if let [x, y, z, ..] = io[..] {
            let mut xyz = [x, y, z];
            anchor_to_xyz(&mut xyz);
            let [l, u, v] = Luv::from_xyz(xyz);
            io[..3].copy_from_slice(&[l / 100.0, scale_down(u, U_MIN, U_MAX), scale_down(v, V_MIN, V_MAX)]);
        }
    }

    fn to_css(&self, values: &[f64], opacity: Option<f64>) -> String {
        hex_via_rgb(self, values, opacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spaces::Rgb;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_luminance_curve() {
        assert_abs_diff_eq!(y_to_l(1.0), 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(l_to_y(y_to_l(0.5)), 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(l_to_y(y_to_l(0.001)), 0.001, epsilon = 1e-9);
    }

    #[test]
    fn test_xyz_roundtrip() {
        let xyz = [0.3, 0.4, 0.5];
        let back = Luv::to_xyz(Luv::from_xyz(xyz));
        for i in 0..3 {
            assert_abs_diff_eq!(back[i], xyz[i], epsilon = 1e-6);
        }
    }

    #[test]
    fn test_white_is_neutral() {
        let [l, u, v] = Luv::from_xyz(D65_WHITE);
        assert_abs_diff_eq!(l, 100.0, epsilon = 1e-6);
        assert_abs_diff_eq!(u, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(v, 0.0, epsilon = 1e-9);

        // white point of the published D65 chromaticity, x 0.3127 y 0.3290
        assert_abs_diff_eq!(REF_U, 0.1978, epsilon = 1e-4);
        assert_abs_diff_eq!(REF_V, 0.4683, epsilon = 1e-4);
    }

    #[test]
    fn test_srgb_white_is_neutral() {
        let rgb: &dyn Space = &Rgb;
        let mut io = vec![1.0, 1.0, 1.0];
        assert!(rgb.convert(&mut io, &Luv));
        assert_abs_diff_eq!(io[0], 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(scale_up(io[1], U_MIN, U_MAX), 0.0, epsilon = 0.1);
        assert_abs_diff_eq!(scale_up(io[2], V_MIN, V_MAX), 0.0, epsilon = 0.1);
    }

    #[test]
    fn test_black_is_origin() {
        assert_eq!(Luv::to_xyz([0.0, 10.0, 10.0]), [0.0; 3]);
        assert_eq!(Luv::from_xyz([0.0, 0.0, 0.0]), [0.0; 3]);
    }

    #[test]
    fn test_srgb_roundtrip() {
        let rgb: &dyn Space = &Rgb;
        let luv: &dyn Space = &Luv;
        let mut io = vec![0.8, 0.3, 0.1];
        assert!(rgb.convert(&mut io, &Luv));
        assert!(luv.convert(&mut io, &Rgb));
        assert_abs_diff_eq!(io[0], 0.8, epsilon = 2e-3);
        assert_abs_diff_eq!(io[1], 0.3, epsilon = 2e-3);
        assert_abs_diff_eq!(io[2], 0.1, epsilon = 2e-3);
        assert_eq!(Luv.to_css(&[1.0, scale_down(0.0, U_MIN, U_MAX), scale_down(0.0, V_MIN, V_MAX)], None), "#ffffff");
    }
}
