//! Small color helpers: hex packing, palette identifiers and derived UI
//! shades.

use crate::color::Color;
use crate::error::{ColorError, ColorResult};
use crate::spaces::{css_name_for, SpaceType};
use regex::Regex;
use std::sync::OnceLock;

/// Reads a strict `#RRGGBBAA` string. An empty string is transparent black.
///
/// Only meant for values the application writes itself, such as stored
/// preferences; use [`Color::parse`] for anything a user typed.
///
/// # Errors
///
/// Returns [`ColorError::InvalidHex`] for anything but nine characters
/// starting with `#`.
///
/// # Example
///
/// ```rust
/// use pigment_color::utils::hex_to_rgba;
///
/// assert_eq!(hex_to_rgba("#ff00ffff").unwrap(), 0xff00ffff);
/// assert!(hex_to_rgba("#fff").is_err());
/// ```
pub fn hex_to_rgba(value: &str) -> ColorResult<u32> {
    if value.is_empty() {
        return Ok(0);
    }
    match value.strip_prefix('#') {
        Some(digits) if value.len() == 9 => {
            u32::from_str_radix(digits, 16).map_err(|_| ColorError::InvalidHex(value.to_string()))
        }
        _ => Err(ColorError::InvalidHex(value.to_string())),
    }
}

/// `#rrggbb` for `0xRRGGBBAA`, or `#rrggbbaa` when `alpha` is set.
pub fn rgba_to_hex(rgba: u32, alpha: bool) -> String {
    if alpha { format!("#{rgba:08x}") } else { format!("#{:06x}", rgba >> 8) }
}

/// Channels of `0xRRGGBBAA` as 0..1 floats, with alpha last when `alpha` is set.
pub fn rgba_to_values(rgba: u32, alpha: bool) -> Vec<f64> {
    let shifts: &[u32] = if alpha { &[24, 16, 8, 0] } else { &[24, 16, 8] };
    shifts.iter().map(|s| ((rgba >> s) & 0xff) as f64 / 255.0).collect()
}

/// A mostly unique identifier for a color, for palette entries.
///
/// Named colors use their name, CSS keywords become `css-<name>`, anything
/// else is the space name followed by two hex digits per channel.
pub fn color_to_id(color: Option<&Color>) -> String {
    let Some(color) = color else {
        return "none".to_string();
    };
    if let Some(name) = color.name().filter(|n| !n.starts_with('#')) {
        return desc_to_id(name);
    }
    if color.space().space_type() == SpaceType::CssName && css_name_for(color.to_rgba(1.0) >> 8).is_some() {
        return format!("css-{}", color.to_css(false));
    }
    let digits: String = color
        .all_values()
        .iter()
        .map(|v| format!("{:02x}", (v * 255.0) as u32))
        .collect();
    format!("{}-{}", color.space().name(), digits).to_lowercase()
}

/// Turns a free-form color description into an identifier.
///
/// Symbols collapse into single dashes, leading digits move to the end
/// (an id cannot start with one) and the result is lower case.
pub fn desc_to_id(desc: &str) -> String {
    static PATTERNS: OnceLock<[Regex; 4]> = OnceLock::new();
    let [symbols, dashes, edges, leading_digits] = PATTERNS.get_or_init(|| {
        [r"[^\p{L}\p{N}]", r"-{2,}", r"^-|-$", r"^(\d+)(-?)(\D*)"].map(|p| Regex::new(p).expect("valid regex"))
    });
    let name = symbols.replace_all(desc, "-");
    let name = dashes.replace_all(&name, "-");
    let name = edges.replace_all(&name, "");
    let name = leading_digits.replace(&name, "${3}${2}${1}");
    name.to_lowercase()
}

/// A slightly darker or lighter shade of `orig`, e.g. for checkerboards.
///
/// Lightness moves by `0.08 * amount` in HSL, upwards for very dark colors.
pub fn make_contrasted_color(orig: &Color, amount: f64) -> Color {
    let Some(mut color) = orig.converted_to(SpaceType::Hsl) else {
        return orig.clone();
    };
    let lightness = color.get(2);
    let step = if lightness < 0.08 { 0.08 } else { -0.08 };
    color.set(2, lightness + step * amount);
    if color.convert(orig.space()) { color } else { orig.clone() }
}

/// A shade of `orig` suited to a dark or light theme, in RGB.
pub fn make_theme_color(orig: &Color, dark: bool) -> Color {
    let Some(mut color) = orig.converted_to(SpaceType::Hsluv) else {
        return orig.clone();
    };
    if dark {
        // limit saturation for contrast with artwork, then darken
        color.set(1, color.get(1).min(0.8));
        color.set(2, (color.get(2) * 0.7).min(0.3));
    } else {
        color.set(2, (color.get(2) + (1.0 - color.get(2)) * 0.5).max(0.8));
    }
    color.converted_to(SpaceType::Rgb).unwrap_or(color)
}

/// A subdued version of `orig` for disabled widgets, in RGB.
///
/// Saturation drops to 30% and lightness is compressed to 35% of its
/// range, floored at 0.2 on dark themes and 0.7 on light ones.
pub fn make_disabled_color(orig: &Color, dark: bool) -> Color {
    let Some(mut hsl) = orig.converted_to(SpaceType::Hsluv) else {
        return orig.clone();
    };
    let saturation = hsl.get(1) * 0.30;
    let lightness = 0.35 * hsl.get(2) + if dark { 0.20 } else { 0.70 };
    hsl.set(1, saturation);
    hsl.set(2, lightness);
    hsl.converted_to(SpaceType::Rgb).unwrap_or(hsl)
}

/// Perceived lightness (0..1) of an HSLuv lightness `l` (0..100).
pub fn perceptual_lightness(l: f64) -> f64 {
    if l <= 0.885645168 { l * 0.09032962963 } else { l.cbrt() * 0.249914424 - 0.16 }
}

/// Perceived lightness (0..1) of `color`.
pub fn get_perceptual_lightness(color: &Color) -> f64 {
    color
        .converted_to(SpaceType::Hsluv)
        .map_or(0.0, |c| perceptual_lightness(c.get(2) * 100.0))
}

/// Gray level and opacity for drawing over a background of lightness `l`:
/// dark ink over light backgrounds, light ink over dark ones.
pub fn get_contrasting_color(l: f64) -> (f64, f64) {
    const THRESHOLD: f64 = 0.85;
    if l > THRESHOLD {
        let t = (l - THRESHOLD) / (1.0 - THRESHOLD);
        (0.0, 0.4 - 0.1 * t)
    } else {
        let t = (THRESHOLD - l) / THRESHOLD;
        (1.0, 0.6 + 0.1 * t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn parse(text: &str) -> Color {
        Color::parse(text).unwrap()
    }

    #[test]
    fn test_hex_to_rgba() {
        assert_eq!(hex_to_rgba("#ff00ffff").unwrap(), 0xff00ffff);
        assert_eq!(hex_to_rgba("").unwrap(), 0);
        assert!(matches!(hex_to_rgba("ff00ffff0"), Err(ColorError::InvalidHex(_))));
        assert!(hex_to_rgba("#ff00ffzz").is_err());
    }

    #[test]
    fn test_rgba_to_hex() {
        assert_eq!(rgba_to_hex(0xff00ff00, false), "#ff00ff");
        assert_eq!(rgba_to_hex(0xff00ffff, true), "#ff00ffff");
        assert_eq!(rgba_to_hex(0x000000ff, false), "#000000");
    }

    #[test]
    fn test_rgba_to_values() {
        assert_eq!(rgba_to_values(0xff0000ff, false), vec![1.0, 0.0, 0.0]);
        assert_eq!(rgba_to_values(0x00ff0000, true), vec![0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_color_to_id() {
        assert_eq!(color_to_id(None), "none");
        assert_eq!(color_to_id(Color::parse("not-a-color").as_ref()), "none");
        assert_eq!(color_to_id(Some(&parse("red"))), "css-red");
        assert_eq!(color_to_id(Some(&parse("#0000ff"))), "rgb-0000ff");

        let mut color = parse("hsl(0.5, 50, 100)");
        assert_eq!(color_to_id(Some(&color)), "hsl-007fff");

        color.set_name("Huey // Dewy_! Lewy");
        assert_eq!(color_to_id(Some(&color)), "huey-dewy-lewy");

        assert!(color.convert_to(SpaceType::Rgb));
        assert_eq!(color_to_id(Some(&color)), "rgb-ffffff");
    }

    #[test]
    fn test_desc_to_id() {
        assert_eq!(desc_to_id("thing"), "thing");
        assert_eq!(desc_to_id("Thing Two"), "thing-two");
        assert_eq!(desc_to_id("  Thing   Threé  "), "thing-threé");
        assert_eq!(desc_to_id("   Wobble blink CAPLINK!"), "wobble-blink-caplink");
        assert_eq!(desc_to_id("42 Shades"), "shades-42");
    }

    #[test]
    fn test_make_contrasted_color() {
        let cases = [
            (0x000000ff, 0.2, 0x040404ff),
            (0x000000ff, 0.4, 0x080808ff),
            (0x000000ff, 0.6, 0x0c0c0cff),
            (0xffffffff, 0.2, 0xfbfbfbff),
            (0xffffffff, 0.4, 0xf7f7f7ff),
            (0xffffffff, 0.6, 0xf3f3f3ff),
            (0xa1a1a1ff, 0.2, 0x9d9d9dff),
            (0x1a1a1aff, 0.4, 0x121212ff),
            (0x808080ff, 0.6, 0x747474ff),
        ];
        for (rgba, amount, expected) in cases {
            let color = Color::from_rgba(rgba, false);
            assert_eq!(make_contrasted_color(&color, amount).to_rgba(1.0), expected, "{rgba:08x} {amount}");
        }
    }

    #[test]
    fn test_get_perceptual_lightness() {
        assert_abs_diff_eq!(get_perceptual_lightness(&parse("red")), 0.780, epsilon = 0.002);
        assert_abs_diff_eq!(get_perceptual_lightness(&parse("black")), 0.0, epsilon = 0.001);
        assert_abs_diff_eq!(get_perceptual_lightness(&parse("white")), 1.0, epsilon = 0.002);
    }

    #[test]
    fn test_contrasting_color() {
        let (gray, alpha) = get_contrasting_color(0.1);
        assert_eq!(gray, 1.0);
        assert_abs_diff_eq!(alpha, 0.688, epsilon = 0.001);

        let (gray, alpha) = get_contrasting_color(0.9);
        assert_eq!(gray, 0.0);
        assert_abs_diff_eq!(alpha, 0.366, epsilon = 0.001);
    }

    #[test]
    fn test_theme_and_disabled_colors() {
        let white = parse("white");
        assert_eq!(make_theme_color(&white, false).to_rgba(1.0), 0xffffffff);
        assert_eq!(make_theme_color(&parse("black"), true).to_rgba(1.0), 0x000000ff);

        let disabled = make_disabled_color(&parse("red"), false);
        assert_eq!(disabled.space().space_type(), SpaceType::Rgb);
        let [r, g, b] = [disabled.get(0), disabled.get(1), disabled.get(2)];
        // desaturated and light
        assert!(r > g && (g - b).abs() < 0.02, "{r} {g} {b}");
        assert!(g > 0.7);
    }
}
