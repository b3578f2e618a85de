//! CIE LCh(ab), the polar form of Lab.

use super::{Lab, Space, SpaceType};
use crate::parser::{scaled_values, ColorParser, Cursor, Parsed};
use crate::printer::CssPrinter;
use pigment_icc::Profile;
use std::sync::Arc;

/// Chroma at stored value 1.
const CHROMA_MAX: f64 = 150.0;

/// Below this chroma the hue is undefined and reads as 0.
const ACHROMATIC: f64 = 1e-8;

/// CIE LCh(ab), printed as `lch(L C H)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lch;

/// Real `L, C, H°` to real `L, a, b`.
pub(crate) fn lch_to_lab([l, c, h]: [f64; 3]) -> [f64; 3] {
    let (sin, cos) = h.to_radians().sin_cos();
    [l, cos * c, sin * c]
}

/// Real `L, a, b` to real `L, C, H°`.
pub(crate) fn lab_to_lch([l, a, b]: [f64; 3]) -> [f64; 3] {
    let c = a.hypot(b);
    if c < ACHROMATIC {
        return [l, c, 0.0];
    }
    let mut h = b.atan2(a).to_degrees();
    if h < 0.0 {
        h += 360.0;
    }
    [l, c, h]
}

impl Space for Lch {
    fn space_type(&self) -> SpaceType {
        SpaceType::Lch
    }

    fn name(&self) -> &str {
        "LCH"
    }

    fn icon(&self) -> &str {
        "color-selector-lch"
    }

    fn component_count(&self) -> usize {
        3
    }

    fn profile(&self) -> Arc<Profile> {
        Profile::lab()
    }

    fn is_unbounded(&self) -> bool {
        true
    }

    fn space_to_profile(&self, io: &mut Vec<f64>) {
        if let [l, c, h, ..] = io[..] {
            let lab = lch_to_lab([l * 100.0, c * CHROMA_MAX, h * 360.0]);
            io[..3].copy_from_slice(&Lab::pack(lab));
        }
    }

    fn profile_to_space(&self, io: &mut Vec<f64>) {
        if io.len() >= 3 {
            let [l, c, h] = lab_to_lch(Lab::unpack(io));
            io[..3].copy_from_slice(&[l / 100.0, c / CHROMA_MAX, h / 360.0]);
        }
    }

    fn to_css(&self, values: &[f64], opacity: Option<f64>) -> String {
        let [l, c, h, ..] = values else {
            return String::new();
        };
        CssPrinter::func("lch", 3)
            .values(&[l * 100.0, c * CHROMA_MAX, h * 360.0])
            .opacity(opacity)
            .finish()
    }
}

/// `lch(L C H [/ A])`, where 100% chroma is 150.
pub(crate) struct LchParser;

impl ColorParser for LchParser {
    fn prefix(&self) -> &str {
        "lch"
    }

    fn space_type(&self) -> SpaceType {
        SpaceType::Lch
    }

    fn parse(&self, cursor: &mut Cursor<'_>) -> Option<Parsed> {
        scaled_values(cursor, [(100.0, 100.0), (CHROMA_MAX, 100.0), (360.0, 100.0)]).map(Parsed::from)
    }
}
