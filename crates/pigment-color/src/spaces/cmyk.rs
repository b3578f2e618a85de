//! Uncalibrated device CMYK.

use super::{Space, SpaceType};
use crate::printer::CssPrinter;
use pigment_icc::Profile;
use std::sync::Arc;

/// Total coverage above which ink is excessive, as a fraction of 400%.
const INK_LIMIT: f64 = 3.2;

/// CMYK by the naive CSS `device-cmyk()` formula, without a profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceCmyk;

impl Space for DeviceCmyk {
    fn space_type(&self) -> SpaceType {
        SpaceType::Cmyk
    }

    fn name(&self) -> &str {
        "DeviceCMYK"
    }

    fn short_name(&self) -> &str {
        "CMYK"
    }

    fn svg_names(&self) -> Vec<String> {
        vec!["DeviceCMYK".to_string()]
    }

    fn icon(&self) -> &str {
        "color-selector-cmyk"
    }

    fn component_count(&self) -> usize {
        4
    }

    fn profile(&self) -> Arc<Profile> {
        Profile::srgb()
    }

    /// `channel = 1 - min(1, ink * (1 - k) + k)`
    fn space_to_profile(&self, io: &mut Vec<f64>) {
        if let [c, m, y, k, ..] = io[..] {
            let white = 1.0 - k;
            let channel = |ink: f64| 1.0 - (ink * white + k).min(1.0);
            io.splice(..4, [channel(c), channel(m), channel(y)]);
        }
    }

    fn profile_to_space(&self, io: &mut Vec<f64>) {
        if let [r, g, b, ..] = io[..] {
            let k = 1.0 - r.max(g).max(b);
            let white = 1.0 - k;
            let ink = |v: f64| if white == 0.0 { 0.0 } else { (1.0 - v - k) / white };
            io.splice(..3, [ink(r), ink(g), ink(b), k]);
        }
    }

    fn to_css(&self, values: &[f64], opacity: Option<f64>) -> String {
        CssPrinter::func("device-cmyk", 4)
            .values(values.get(..4).unwrap_or_default())
            .opacity(opacity)
            .finish()
    }

    fn over_ink(&self, values: &[f64]) -> bool {
        values.iter().take(4).sum::<f64>() > INK_LIMIT
    }
}
