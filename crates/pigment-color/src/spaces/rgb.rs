//! sRGB, the hub every closed-form space converts through.

use super::{compose_rgba, Space, SpaceType};
use crate::parser::{function_values, icc_follows, is_legacy, ColorParser, Cursor, Parsed};
use crate::utils::rgba_to_hex;
use pigment_icc::Profile;
use std::sync::Arc;

/// Gamma encoded sRGB, printed as `#rrggbb` or `#rrggbbaa`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rgb;

impl Space for Rgb {
    fn space_type(&self) -> SpaceType {
        SpaceType::Rgb
    }

    fn name(&self) -> &str {
        "RGB"
    }

    fn svg_names(&self) -> Vec<String> {
        vec!["sRGB".to_string()]
    }

    fn icon(&self) -> &str {
        "color-selector-rgb"
    }

    fn component_count(&self) -> usize {
        3
    }

    fn profile(&self) -> Arc<Profile> {
        Profile::srgb()
    }

    fn to_css(&self, values: &[f64], opacity: Option<f64>) -> String {
        let [r, g, b, ..] = values else {
            return String::new();
        };
        rgba_to_hex(compose_rgba(*r, *g, *b, opacity.unwrap_or(1.0)), opacity.is_some())
    }
}

/// `rgb()` and `rgba()`, comma or space separated, channels 0..255 or %.
pub(crate) struct RgbParser {
    pub(crate) alpha: bool,
}

impl ColorParser for RgbParser {
    fn prefix(&self) -> &str {
        if self.alpha { "rgba" } else { "rgb" }
    }

    fn space_type(&self) -> SpaceType {
        SpaceType::Rgb
    }

    fn parse(&self, cursor: &mut Cursor<'_>) -> Option<Parsed> {
        let legacy = is_legacy(cursor);
        let values = function_values(cursor, [255.0; 3], legacy, 4)?;
        if values.len() < 3 {
            return None;
        }
        let more = icc_follows(cursor);
        Some(Parsed { values, cms_name: None, more })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parsers;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_to_css() {
        assert_eq!(Rgb.to_css(&[1.0, 0.0, 0.5], None), "#ff0080");
        assert_eq!(Rgb.to_css(&[1.0, 0.0, 0.5], Some(0.5)), "#ff008080");
        assert_eq!(Rgb.to_css(&[0.0, 0.0], None), "");
    }

    #[test]
    fn test_parse_forms() {
        for text in ["rgb(255 0 0)", "rgb(255, 0, 0)", "rgb(100% 0% 0%)", "RGBA(255,0,0,1)", "rgb(255 0 0 / 100%)"] {
            let parsed = Parsers::get().parse(text).unwrap();
            assert_eq!(parsed.space_type, SpaceType::Rgb, "{text}");
            assert_abs_diff_eq!(parsed.values[0], 1.0);
            assert_abs_diff_eq!(parsed.values[1], 0.0);
            assert_abs_diff_eq!(parsed.values[2], 0.0);
        }
        let parsed = Parsers::get().parse("rgba(0, 0, 255, 0.25)").unwrap();
        assert_abs_diff_eq!(parsed.values[3], 0.25);
    }

    #[test]
    fn test_parse_rejects_short() {
        assert!(Parsers::get().parse("rgb(255 0)").is_none());
    }

    #[test]
    fn test_rgb_with_icc_fallback() {
        let parsed = Parsers::get().parse("rgb(255 0 0) icc-color(x, 0.5)").unwrap();
        assert_eq!(parsed.space_type, SpaceType::Cms);
        assert_eq!(parsed.fallback, Some(vec![1.0, 0.0, 0.0]));
    }
}
