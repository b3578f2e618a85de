//! Parsing and printing CSS color text through the public API.

use approx::assert_abs_diff_eq;
use pigment_color::{Color, Manager, SpaceType, Traits};

fn assert_values(actual: &[f64], expected: &[f64], epsilon: f64) {
    assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
    for (a, e) in actual.iter().zip(expected) {
        assert_abs_diff_eq!(*a, *e, epsilon = epsilon);
    }
}

#[test]
fn test_print_then_parse_reproduces_values() {
    // every space with a CSS grammar, with and without opacity
    let cases: &[(SpaceType, &[f64], f64)] = &[
        (SpaceType::Rgb, &[0.2, 0.4, 0.6], 1.0 / 255.0),
        (SpaceType::Hsl, &[0.3, 0.6, 0.4], 1e-5),
        (SpaceType::Hsv, &[0.7, 0.5, 0.8], 1e-5),
        (SpaceType::Lab, &[0.5, 0.6, 0.3], 1e-5),
        (SpaceType::Lch, &[0.6, 0.3, 0.25], 1e-5),
        (SpaceType::Oklab, &[0.6, 0.55, 0.4], 1e-3),
        (SpaceType::Oklch, &[0.7, 0.3, 0.8], 1e-3),
        (SpaceType::Cmyk, &[0.1, 0.2, 0.3, 0.4], 1e-3),
        (SpaceType::Xyz, &[0.3, 0.2, 0.1], 1e-3),
        (SpaceType::Xyz50, &[0.3, 0.2, 0.1], 1e-3),
        (SpaceType::LinearRgb, &[0.25, 0.5, 0.75], 1e-3),
    ];
    for (space_type, values, epsilon) in cases {
        for opacity in [None, Some(0.5)] {
            let mut all = values.to_vec();
            all.extend(opacity);
            let color = Color::new(*space_type, all.clone()).unwrap();
            let css = color.to_string();
            let parsed = Color::parse(&css).unwrap_or_else(|| panic!("cannot parse {css}"));
            assert_eq!(parsed.space().space_type(), *space_type, "{css}");
            assert_values(&parsed.all_values(), &all, *epsilon);
        }
    }
}

#[test]
fn test_hsl_to_rgb() {
    let mut color = Color::parse("hsl(0 100% 50%)").unwrap();
    assert_eq!(color.space().space_type(), SpaceType::Hsl);
    assert_values(color.values(), &[0.0, 1.0, 0.5], 1e-12);

    assert!(color.convert_to(SpaceType::Rgb));
    assert_values(color.values(), &[1.0, 0.0, 0.0], 1e-9);
    assert_eq!(color.to_css(true), "#ff0000");
}

#[test]
fn test_device_cmyk_to_rgb() {
    let color = Color::parse("device-cmyk(0 0.2 0.2 0.2)").unwrap();
    assert!(!color.is_over_inked());
    let rgb = color.converted_to(SpaceType::Rgb).unwrap();
    assert_values(rgb.values(), &[0.8, 0.64, 0.64], 1e-9);
}

#[test]
fn test_syntax_variants_agree() {
    let expected = Color::parse("#ff8000").unwrap();
    for text in [
        "#FF8000",
        "rgb(255 128 0)",
        "rgb(255, 128, 0)",
        "rgba(255, 128, 0, 1)",
        "rgb(100% 50.2% 0%)",
        "color(srgb 1 0.502 0)",
    ] {
        let color = Color::parse(text).unwrap_or_else(|| panic!("cannot parse {text}"));
        assert!(color.is_similar(&expected, 2e-3), "{text}: {color:?}");
    }
}

#[test]
fn test_named_colors() {
    let red = Color::parse("RED").unwrap();
    assert_eq!(red.space().space_type(), SpaceType::CssName);
    assert_eq!(red.to_string(), "red");
    assert_eq!(red.to_rgba(1.0), 0xff0000ff);
    assert_eq!(red.with_opacity(0.5).to_string(), "#ff000080");

    let purple = Color::parse("rebeccapurple").unwrap();
    assert_eq!(purple.to_rgba(1.0), 0x663399ff);
}

#[test]
fn test_malformed_text() {
    for text in [
        "", "   ", "#", "#12", "#12345", "#ggg", "rgb(", "rgb(1 2)", "hsl(x y z)", "lab()",
        "notacolor", "color(display-p3 1 0 0)", "icc-color()", "device-cmyk(1 1 1)",
    ] {
        assert!(Color::parse(text).is_none(), "{text:?} parsed");
    }
}

#[test]
fn test_icc_fallback_survives() {
    let color = Color::parse("#112233 icc-color(myprofile, 0.1, 0.2, 0.3)").unwrap();
    assert_eq!(color.space().space_type(), SpaceType::Cms);
    assert!(!color.space().is_valid());
    assert_values(&color.values()[..3], &[0x11 as f64 / 255.0, 0x22 as f64 / 255.0, 0x33 as f64 / 255.0], 1e-12);
    assert_eq!(color.to_string(), "#112233 icc-color(myprofile, 0.1, 0.2, 0.3)");
}

#[test]
fn test_conversion_chain_preserves_color() {
    let original = Color::parse("rgb(30 144 200 / 40%)").unwrap();
    let manager = Manager::get();
    let mut color = original.clone();
    // gray drops chroma, so it is left out
    for space in manager.spaces(Traits::NONE).into_iter().filter(|s| s.space_type() != SpaceType::Gray) {
        assert!(color.convert(&space), "to {}", space.name());
        assert_eq!(color.opacity(), 0.4);
    }
    assert!(color.convert(original.space()));
    assert!(color.is_close(&original, 1e-3), "{color:?}");
}

#[test]
fn test_hub_equivalence() {
    let manager = Manager::get();
    let hsl = Color::parse("hsl(210 40% 60%)").unwrap();
    let oklch = manager.find(SpaceType::Oklch).unwrap();
    let rgb = manager.find(SpaceType::Rgb).unwrap();

    let direct = hsl.converted(&oklch).unwrap();
    let stepped = hsl.converted(&rgb).unwrap().converted(&oklch).unwrap();
    assert!(direct.is_close(&stepped, 1e-9));
}
