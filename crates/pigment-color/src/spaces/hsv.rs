//! Hue, saturation, value over sRGB. CSS reads and writes it as HWB.

use super::{Space, SpaceType};
use crate::parser::{function_values, ColorParser, Cursor, Parsed};
use crate::printer::CssPrinter;
use pigment_icc::Profile;
use std::sync::Arc;

/// HSV, printed as `hwb(H W B)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hsv;

/// Converts HSV (all 0..1) to sRGB.
pub(crate) fn hsv_to_rgb(h: f64, s: f64, v: f64) -> [f64; 3] {
    let d = h * 5.99999999;
    let f = d - d.floor();
    let w = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match d as i64 {
        0 => [v, t, w],
        1 => [q, v, w],
        2 => [w, v, t],
        3 => [w, q, v],
        4 => [t, w, v],
        _ => [v, w, q],
    }
}

/// Converts sRGB to HSV (all 0..1).
pub(crate) fn rgb_to_hsv(r: f64, g: f64, b: f64) -> [f64; 3] {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let s = if max > 0.0 { delta / max } else { 0.0 };
    if s == 0.0 {
        return [0.0, 0.0, max];
    }
    let h = if r == max {
        (g - b) / delta
    } else if g == max {
        2.0 + (b - r) / delta
    } else {
        4.0 + (r - g) / delta
    };
    let mut h = h / 6.0;
    if h < 0.0 {
        h += 1.0;
    }
    [h, s, max]
}

impl Space for Hsv {
    fn space_type(&self) -> SpaceType {
        SpaceType::Hsv
    }

    fn name(&self) -> &str {
        "HSV"
    }

    fn icon(&self) -> &str {
        "color-selector-hsx"
    }

    fn component_count(&self) -> usize {
        3
    }

    fn profile(&self) -> Arc<Profile> {
        Profile::srgb()
    }

    fn space_to_profile(&self, io: &mut Vec<f64>) {
        if let [h, s, v, ..] = io[..] {
            io[..3].copy_from_slice(&hsv_to_rgb(h, s, v));
        }
    }

    fn profile_to_space(&self, io: &mut Vec<f64>) {
        if let [r, g, b, ..] = io[..] {
            io[..3].copy_from_slice(&rgb_to_hsv(r, g, b));
        }
    }

    fn to_css(&self, values: &[f64], opacity: Option<f64>) -> String {
        let [h, s, v, ..] = values else {
            return String::new();
        };
        CssPrinter::func("hwb", 3)
            .values(&[h * 360.0, (1.0 - s) * v * 100.0, (1.0 - v) * 100.0])
            .opacity(opacity)
            .finish()
    }
}

/// `hwb()` and `hwba()`, read into HSV.
pub(crate) struct HwbParser {
    pub(crate) alpha: bool,
}

impl ColorParser for HwbParser {
    fn prefix(&self) -> &str {
        if self.alpha { "hwba" } else { "hwb" }
    }

    fn space_type(&self) -> SpaceType {
        SpaceType::Hsv
    }

    fn parse(&self, cursor: &mut Cursor<'_>) -> Option<Parsed> {
        let mut values = function_values(cursor, [360.0, 100.0, 100.0], false, 4)?;
        if values.len() < 3 {
            return None;
        }
        let (mut white, mut black) = (values[1], values[2]);
        let total = white + black;
        if total > 1.0 {
            white /= total;
            black /= total;
        }
        values[1] = if black == 1.0 { 0.0 } else { 1.0 - white / (1.0 - black) };
        values[2] = 1.0 - black;
        Some(values.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parsers;
    use approx::assert_abs_diff_eq;

    fn assert_rgb(actual: [f64; 3], expected: [f64; 3]) {
        for i in 0..3 {
            assert_abs_diff_eq!(actual[i], expected[i], epsilon = 1e-6);
        }
    }

    #[test]
    fn test_sextants() {
        assert_rgb(hsv_to_rgb(0.0, 1.0, 1.0), [1.0, 0.0, 0.0]);
        assert_rgb(hsv_to_rgb(1.0 / 3.0, 1.0, 1.0), [0.0, 1.0, 0.0]);
        assert_rgb(hsv_to_rgb(2.0 / 3.0, 1.0, 1.0), [0.0, 0.0, 1.0]);
        assert_rgb(hsv_to_rgb(1.0, 1.0, 1.0), [1.0, 0.0, 0.0]);
        assert_rgb(hsv_to_rgb(0.5, 0.0, 0.4), [0.4, 0.4, 0.4]);
    }

    #[test]
    fn test_roundtrip() {
        for rgb in [[0.2, 0.4, 0.6], [0.9, 0.1, 0.3], [0.5, 0.5, 0.1]] {
            let [h, s, v] = rgb_to_hsv(rgb[0], rgb[1], rgb[2]);
            assert_rgb(hsv_to_rgb(h, s, v), rgb);
        }
    }

    #[test]
    fn test_hwb_output() {
        assert_eq!(Hsv.to_css(&[0.0, 1.0, 1.0], None), "hwb(0 0 0)");
        assert_eq!(Hsv.to_css(&[0.5, 0.5, 0.8], Some(1.0)), "hwb(180 40 20 / 100%)");
    }

    #[test]
    fn test_hwb_input() {
        let p = Parsers::get().parse("hwb(180 40% 20%)").unwrap();
        assert_eq!(p.space_type, SpaceType::Hsv);
        assert_abs_diff_eq!(p.values[0], 0.5);
        assert_abs_diff_eq!(p.values[1], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(p.values[2], 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_hwb_normalizes_excess() {
        let p = Parsers::get().parse("hwb(0 100% 100%)").unwrap();
        // white and black halve to 0.5 each: mid gray
        assert_abs_diff_eq!(p.values[1], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.values[2], 0.5, epsilon = 1e-12);

        let p = Parsers::get().parse("hwb(0 0% 100%)").unwrap();
        assert_eq!(p.values[1], 0.0);
        assert_eq!(p.values[2], 0.0);
    }
}
