//! Linear-light sRGB.

use super::{Space, SpaceType};
use crate::printer::CssPrinter;
use pigment_icc::Profile;
use std::sync::Arc;

/// sRGB primaries without the transfer curve, `color(srgb-linear ...)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearRgb;

impl Space for LinearRgb {
    fn space_type(&self) -> SpaceType {
        SpaceType::LinearRgb
    }

    fn name(&self) -> &str {
        "linearRGB"
    }

    fn svg_names(&self) -> Vec<String> {
        vec!["linearRGB".to_string()]
    }

    fn icon(&self) -> &str {
        "color-selector-rgb"
    }

    fn component_count(&self) -> usize {
        3
    }

    fn profile(&self) -> Arc<Profile> {
        Profile::linear_rgb()
    }

    fn to_css(&self, values: &[f64], opacity: Option<f64>) -> String {
        CssPrinter::color("srgb-linear", 3)
            .values(values.get(..3).unwrap_or_default())
            .opacity(opacity)
            .finish()
    }
}
