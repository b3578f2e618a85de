//! CIE XYZ under D65 and D50 white.
//!
//! Values are plain XYZ with Y = 1 for the white point. The D50 anchor takes
//! them unchanged; the D65 anchor is linear Rec.2020, one fixed matrix away.

use super::{apply_matrix, Space, SpaceType};
use crate::printer::CssPrinter;
use pigment_icc::Profile;
use std::sync::Arc;

/// CIE XYZ (D65) to linear Rec.2020.
const XYZ_TO_REC2020: [[f64; 3]; 3] = [
    [1.716651187971268, -0.355670783776392, -0.253366281373660],
    [-0.666684351832489, 1.616481236634939, 0.015768545813911],
    [0.017639857445311, -0.042770613257809, 0.942103121235474],
];

/// Linear Rec.2020 to CIE XYZ (D65).
const REC2020_TO_XYZ: [[f64; 3]; 3] = [
    [0.636958048301291, 0.144616903586208, 0.168880975164172],
    [0.262700212011267, 0.677998071518871, 0.059301716469862],
    [0.000000000000000, 0.028072693049087, 1.060985057710791],
];

/// The D65 white as the hub sees it: linear Rec.2020 `(1, 1, 1)`.
pub(crate) const D65_WHITE: [f64; 3] = [
    REC2020_TO_XYZ[0][0] + REC2020_TO_XYZ[0][1] + REC2020_TO_XYZ[0][2],
    REC2020_TO_XYZ[1][0] + REC2020_TO_XYZ[1][1] + REC2020_TO_XYZ[1][2],
    REC2020_TO_XYZ[2][0] + REC2020_TO_XYZ[2][1] + REC2020_TO_XYZ[2][2],
];

/// Moves D65 XYZ values into the anchor profile's channels.
pub(crate) fn xyz_to_anchor(io: &mut [f64]) {
    apply_matrix(&XYZ_TO_REC2020, io);
}

/// Reads D65 XYZ values back from the anchor profile's channels.
pub(crate) fn anchor_to_xyz(io: &mut [f64]) {
    apply_matrix(&REC2020_TO_XYZ, io);
}

/// XYZ relative to D65, `color(xyz ...)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Xyz;

/// XYZ relative to D50, `color(xyz-d50 ...)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Xyz50;

impl Space for Xyz {
    fn space_type(&self) -> SpaceType {
        SpaceType::Xyz
    }

    fn name(&self) -> &str {
        "XYZ"
    }

    fn svg_names(&self) -> Vec<String> {
        vec!["xyz".to_string(), "xyz-d65".to_string()]
    }

    fn icon(&self) -> &str {
        "color-selector-xyz"
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
        xyz_to_anchor(io);
    }

    fn profile_to_space(&self, io: &mut Vec<f64>) {
        anchor_to_xyz(io);
    }

    fn to_css(&self, values: &[f64], opacity: Option<f64>) -> String {
        CssPrinter::color("xyz", 3)
            .values(values.get(..3).unwrap_or_default())
            .opacity(opacity)
            .finish()
    }
}

impl Space for Xyz50 {
    fn space_type(&self) -> SpaceType {
        SpaceType::Xyz50
    }

    fn name(&self) -> &str {
        "XYZ D50"
    }

    fn short_name(&self) -> &str {
        "XYZ50"
    }

    fn svg_names(&self) -> Vec<String> {
        vec!["xyz-d50".to_string()]
    }

    fn icon(&self) -> &str {
        "color-selector-xyz"
    }

    fn component_count(&self) -> usize {
        3
    }

    fn component_type(&self) -> SpaceType {
        SpaceType::Xyz
    }

    fn profile(&self) -> Arc<Profile> {
        Profile::xyz_d50()
    }

    fn is_unbounded(&self) -> bool {
        true
    }

    fn to_css(&self, values: &[f64], opacity: Option<f64>) -> String {
        CssPrinter::color("xyz-d50", 3)
            .values(values.get(..3).unwrap_or_default())
            .opacity(opacity)
            .finish()
    }
}
