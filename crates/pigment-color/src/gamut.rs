//! CSS Color 4 gamut mapping.
//!
//! [`to_gamut_css`] brings a color into a bounded space the way browsers do:
//! lightness is kept, chroma is reduced in Oklch by binary search until
//! clipping the result is no longer noticeable (deltaE OK below the JND).

use crate::color::Color;
use crate::spaces::{OkLab, Space, SpaceType};
use std::sync::Arc;

/// Just noticeable difference, in deltaE OK.
const JND: f64 = 0.02;

/// Chroma search resolution.
const EPSILON: f64 = 0.0001;

/// True when `color`, converted into `space`, has a channel outside
/// `-epsilon..=1 + epsilon`. Unbounded spaces have no gamut.
pub fn out_of_gamut(color: &Color, space: &Arc<dyn Space>, epsilon: f64) -> bool {
    if space.is_unbounded() {
        return false;
    }
    let converted;
    let values = if color.space().same_as(space.as_ref()) {
        color.values()
    } else {
        match color.converted(space) {
            Some(c) => {
                converted = c;
                converted.values()
            }
            None => return false,
        }
    };
    values.iter().any(|v| *v < -epsilon || *v > 1.0 + epsilon)
}

/// Euclidean distance of two colors in Oklab.
pub fn delta_e_ok(color: &Color, sample: &Color) -> f64 {
    let (Some(c), Some(s)) = (color.converted_to(SpaceType::Oklab), sample.converted_to(SpaceType::Oklab)) else {
        return f64::INFINITY;
    };
    let [l1, a1, b1] = OkLab::unpack(c.values());
    let [l2, a2, b2] = OkLab::unpack(s.values());
    ((l1 - l2).powi(2) + (a1 - a2).powi(2) + (b1 - b2).powi(2)).sqrt()
}

/// `origin` converted into `space`, gamut mapped per CSS Color 4.
///
/// Colors lighter than white or darker than black map to the media white
/// or black. Opacity is kept. `None` when a conversion fails.
///
/// # Example
///
/// ```rust
/// use pigment_color::{to_gamut_css, Color, Manager, SpaceType};
///
/// let rgb = Manager::get().find(SpaceType::Rgb).unwrap();
/// let wide = Color::new(SpaceType::Oklch, vec![0.7, 0.8, 150.0 / 360.0]).unwrap();
/// let mapped = to_gamut_css(&wide, &rgb).unwrap();
/// assert!(mapped.values().iter().all(|v| (0.0..=1.0).contains(v)));
/// ```
pub fn to_gamut_css(origin: &Color, space: &Arc<dyn Space>) -> Option<Color> {
    if space.is_unbounded() {
        return origin.converted(space);
    }
    let origin_oklch = origin.converted_to(SpaceType::Oklch)?;
    let lightness = origin_oklch[0];
    if lightness >= 1.0 || lightness <= 0.0 {
        let rgba = if lightness >= 1.0 { 0xffffffff } else { 0x000000ff };
        let mut media = Color::from_rgba(rgba, false).converted(space)?;
        if origin.has_opacity() {
            media.set_opacity(origin.opacity());
        }
        return Some(media);
    }
    if !out_of_gamut(origin, space, 0.0) {
        return origin.converted(space);
    }

    let clip = |color: &Color| color.converted(space).map(|c| c.normalized());
    let mut current = origin_oklch.clone();
    let mut clipped = clip(&current)?;
    if delta_e_ok(&clipped, &current) < JND {
        return Some(clipped);
    }

    let (mut min, mut max) = (0.0, origin_oklch[1]);
    let mut min_in_gamut = true;
    while max - min > EPSILON {
        let chroma = (min + max) / 2.0;
        current.set(1, chroma);
        if min_in_gamut && !out_of_gamut(&current, space, 0.0) {
            min = chroma;
            continue;
        }
        clipped = clip(&current)?;
        let difference = delta_e_ok(&clipped, &current);
        if difference < JND {
            if JND - difference < EPSILON {
                break;
            }
            min_in_gamut = false;
            min = chroma;
        } else {
            max = chroma;
        }
    }
    Some(clipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Manager;
    use approx::assert_abs_diff_eq;

    fn space(space_type: SpaceType) -> Arc<dyn Space> {
        Manager::get().find(space_type).unwrap()
    }

    fn oklch(l: f64, c: f64, h: f64) -> Color {
        Color::new(SpaceType::Oklch, vec![l, c / 0.4, h / 360.0]).unwrap()
    }

    #[test]
    fn test_out_of_gamut() {
        let rgb = space(SpaceType::Rgb);
        let hot = Color::new(SpaceType::Rgb, vec![1.2, 0.0, 0.0]).unwrap();
        assert!(out_of_gamut(&hot, &rgb, 0.0));
        assert!(!out_of_gamut(&hot, &rgb, 0.3));
        assert!(!out_of_gamut(&hot, &space(SpaceType::Lab), 0.0));

        assert!(out_of_gamut(&oklch(0.7, 0.35, 150.0), &rgb, 1e-6));
        assert!(!out_of_gamut(&Color::parse("teal").unwrap(), &rgb, 1e-6));
    }

    #[test]
    fn test_delta_e_ok() {
        let red = Color::parse("red").unwrap();
        assert_abs_diff_eq!(delta_e_ok(&red, &red), 0.0, epsilon = 1e-9);
        let white = Color::parse("white").unwrap();
        let black = Color::parse("black").unwrap();
        assert_abs_diff_eq!(delta_e_ok(&white, &black), 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_in_gamut_is_converted() {
        let color = Color::parse("hsl(200 50% 40%)").unwrap();
        let mapped = to_gamut_css(&color, &space(SpaceType::Rgb)).unwrap();
        assert!(mapped.is_similar(&color, 1e-6));
        assert_eq!(mapped.space().space_type(), SpaceType::Rgb);
    }

    #[test]
    fn test_maps_wide_chroma() {
        let wide = oklch(0.7, 0.35, 150.0);
        let mapped = to_gamut_css(&wide, &space(SpaceType::Rgb)).unwrap();
        let [r, g, b] = [mapped[0], mapped[1], mapped[2]];
        assert!([r, g, b].iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(g > r && g > b, "{r} {g} {b}");

        // lightness survives within the JND
        let back = mapped.converted_to(SpaceType::Oklch).unwrap();
        assert_abs_diff_eq!(back[0], 0.7, epsilon = JND);
    }

    #[test]
    fn test_lightness_extremes() {
        let rgb = space(SpaceType::Rgb);
        let bright = Color::new(SpaceType::Oklch, vec![1.2, 0.5, 0.1, 0.5]).unwrap();
        let mapped = to_gamut_css(&bright, &rgb).unwrap();
        assert_eq!(mapped.to_rgba(1.0), 0xffffff80);

        let dark = Color::new(SpaceType::Oklch, vec![-0.1, 0.5, 0.1]).unwrap();
        let mapped = to_gamut_css(&dark, &rgb).unwrap();
        assert_eq!(mapped.to_rgba(1.0), 0x000000ff);
        assert!(!mapped.has_opacity());
    }

    #[test]
    fn test_unbounded_target() {
        let wide = oklch(0.7, 0.35, 150.0);
        let lab = to_gamut_css(&wide, &space(SpaceType::Lab)).unwrap();
        assert_eq!(lab.space().space_type(), SpaceType::Lab);
    }
}
