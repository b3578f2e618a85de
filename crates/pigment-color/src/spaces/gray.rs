//! Single channel gray over sRGB.

use super::{hex_via_rgb, Space, SpaceType};
use pigment_icc::Profile;
use std::sync::Arc;

/// Gray level, lightness of the HSL model.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gray;

impl Space for Gray {
    fn space_type(&self) -> SpaceType {
        SpaceType::Gray
    }

    fn name(&self) -> &str {
        "Gray"
    }

    fn icon(&self) -> &str {
        "color-selector-gray"
    }

    fn component_count(&self) -> usize {
        1
    }

    fn profile(&self) -> Arc<Profile> {
        Profile::srgb()
    }

    fn space_to_profile(&self, io: &mut Vec<f64>) {
        if let Some(&g) = io.first() {
            io.splice(..1, [g, g, g]);
        }
    }

    fn profile_to_space(&self, io: &mut Vec<f64>) {
        if let [r, g, b, ..] = io[..] {
            let level = (r.max(g).max(b) + r.min(g).min(b)) / 2.0;
            io.splice(..3, [level]);
        }
    }

    fn to_css(&self, values: &[f64], opacity: Option<f64>) -> String {
        if values.is_empty() {
            return String::new();
        }
        hex_via_rgb(self, values, opacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expands_to_rgb() {
        let mut io = vec![0.25];
        Gray.space_to_profile(&mut io);
        assert_eq!(io, vec![0.25, 0.25, 0.25]);
    }

    #[test]
    fn test_collapses_to_lightness() {
        let mut io = vec![1.0, 0.0, 0.5];
        Gray.profile_to_space(&mut io);
        assert_eq!(io, vec![0.5]);
    }

    #[test]
    fn test_to_css() {
        assert_eq!(Gray.to_css(&[1.0], None), "#ffffff");
        assert_eq!(Gray.to_css(&[0.0], Some(0.5)), "#00000080");
        assert_eq!(Gray.to_css(&[], None), "");
    }

    #[test]
    fn test_rgba() {
        let gray: &dyn Space = &Gray;
        assert_eq!(gray.to_rgba(&[0.0], 1.0), 0x000000ff);
    }
}
