//! Hue, saturation, lightness over sRGB.

use super::{Space, SpaceType};
use crate::parser::{function_values, is_legacy, ColorParser, Cursor, Parsed};
use crate::printer::CssPrinter;
use pigment_icc::Profile;
use std::sync::Arc;

/// HSL, printed as `hsl(H S L)` with hue in degrees.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hsl;

/// Converts HSL (all 0..1) to sRGB.
pub(crate) fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [f64; 3] {
    let a = s * l.min(1.0 - l);
    let f = |n: f64| {
        let k = (n + h * 12.0).rem_euclid(12.0);
        l - a * (k - 3.0).min(9.0 - k).clamp(-1.0, 1.0)
    };
    [f(0.0), f(8.0), f(4.0)]
}

/// Converts sRGB to HSL (all 0..1).
pub(crate) fn rgb_to_hsl(r: f64, g: f64, b: f64) -> [f64; 3] {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let d = max - min;
    if d <= f64::EPSILON {
        return [0.0, 0.0, l];
    }
    let s = d / (1.0 - (2.0 * l - 1.0).abs());
    let h = if max == r {
        (g - b) / d
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    [(h / 6.0).rem_euclid(1.0), s, l]
}

impl Space for Hsl {
    fn space_type(&self) -> SpaceType {
        SpaceType::Hsl
    }

    fn name(&self) -> &str {
        "HSL"
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
        if let [h, s, l, ..] = io[..] {
            io[..3].copy_from_slice(&hsl_to_rgb(h, s, l));
        }
    }

    fn profile_to_space(&self, io: &mut Vec<f64>) {
        if let [r, g, b, ..] = io[..] {
            io[..3].copy_from_slice(&rgb_to_hsl(r, g, b));
        }
    }

    fn to_css(&self, values: &[f64], opacity: Option<f64>) -> String {
        let [h, s, l, ..] = values else {
            return String::new();
        };
        CssPrinter::func("hsl", 3)
            .values(&[h * 360.0, s * 100.0, l * 100.0])
            .opacity(opacity)
            .finish()
    }
}

/// `hsl()` and `hsla()`. Comma syntax limits `hsl` to three values.
pub(crate) struct HslParser {
    pub(crate) alpha: bool,
}

impl ColorParser for HslParser {
    fn prefix(&self) -> &str {
        if self.alpha { "hsla" } else { "hsl" }
    }

    fn space_type(&self) -> SpaceType {
        SpaceType::Hsl
    }

    fn parse(&self, cursor: &mut Cursor<'_>) -> Option<Parsed> {
        let legacy = is_legacy(cursor);
        let max = if legacy && !self.alpha { 3 } else { 4 };
        function_values(cursor, [360.0, 100.0, 100.0], legacy, max)
            .filter(|v| v.len() >= 3)
            .map(Parsed::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parsers;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_primaries() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), [1.0, 0.0, 0.0]);
        let green = hsl_to_rgb(1.0 / 3.0, 1.0, 0.5);
        assert_abs_diff_eq!(green[1], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(green[0], 0.0, epsilon = 1e-12);
        assert_eq!(hsl_to_rgb(0.7, 0.0, 0.25), [0.25, 0.25, 0.25]);
    }

    #[test]
    fn test_roundtrip() {
        for rgb in [[0.2, 0.4, 0.6], [0.9, 0.1, 0.3], [0.5, 0.5, 0.1], [0.0, 1.0, 0.5]] {
            let [h, s, l] = rgb_to_hsl(rgb[0], rgb[1], rgb[2]);
            let back = hsl_to_rgb(h, s, l);
            for i in 0..3 {
                assert_abs_diff_eq!(back[i], rgb[i], epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_gray_has_no_hue() {
        assert_eq!(rgb_to_hsl(0.3, 0.3, 0.3), [0.0, 0.0, 0.3]);
    }

    #[test]
    fn test_to_css() {
        assert_eq!(Hsl.to_css(&[1.0 / 3.0, 0.5, 0.25], None), "hsl(120 50 25)");
        assert_eq!(Hsl.to_css(&[0.0, 1.0, 0.5], Some(0.4)), "hsl(0 100 50 / 40%)");
    }

    #[test]
    fn test_parse() {
        let p = Parsers::get().parse("hsl(120deg 100% 25%)").unwrap();
        assert_abs_diff_eq!(p.values[0], 1.0 / 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.values[1], 1.0);
        assert_abs_diff_eq!(p.values[2], 0.25);

        let p = Parsers::get().parse("hsla(0.5turn, 10%, 20%, 0.5)").unwrap();
        assert_eq!(p.values, vec![0.5, 0.1, 0.2, 0.5]);

        // legacy hsl takes no alpha
        assert!(Parsers::get().parse("hsl(0, 10%, 20%, 0.5)").is_none());
    }
}
