//! ICC profile-backed color spaces.
//!
//! A [`CmsSpace`] stores raw device channels of its profile (CMYK inks, gray,
//! a camera RGB...). Its anchor *is* that profile, so the space math is a
//! pass-through and all real work happens in the ICC transform.
//!
//! A space whose profile could not be found is *anonymous*: it carries an
//! sRGB fallback triple ahead of the device channels and converts as plain
//! sRGB, so `#112233 icc-color(missing, 0.1, 0.2, 0.3)` still renders and
//! prints back unchanged.

use super::{hex_via_rgb, Space, SpaceType};
use crate::parser::{ColorParser, Cursor, Parsed};
use crate::printer::CssPrinter;
use lcms2::ColorSpaceSignature;
use pigment_icc::{Intent, Profile};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Channels of the sRGB fallback carried by anonymous spaces.
const FALLBACK: usize = 3;

/// Total ink above which a CMYK color is over-inked.
const INK_LIMIT: f64 = 3.2;

/// A color space defined by an ICC profile.
pub struct CmsSpace {
    name: String,
    profile: Option<Arc<Profile>>,
    profile_size: usize,
    profile_type: SpaceType,
    intent: Mutex<Intent>,
}

impl CmsSpace {
    /// Space backed by `profile`, named `name` or, when empty, after the
    /// profile description.
    pub fn new(profile: Arc<Profile>, name: &str) -> Self {
        let name = if name.is_empty() { profile.name(true) } else { name.to_string() };
        Self {
            name,
            profile_size: profile.channels(),
            profile_type: signature_type(profile.color_space()),
            profile: Some(profile),
            intent: Mutex::new(Intent::Unknown),
        }
    }

    /// Placeholder for a profile that is not available, with `size` device
    /// channels after the sRGB fallback.
    pub fn anonymous(name: &str, size: usize) -> Self {
        let profile_type = match size {
            1 => SpaceType::Gray,
            3 => SpaceType::Rgb,
            4 => SpaceType::Cmyk,
            _ => SpaceType::None,
        };
        Self {
            name: name.to_string(),
            profile: None,
            profile_size: size,
            profile_type,
            intent: Mutex::new(Intent::Unknown),
        }
    }

    /// The backing profile, if resolved.
    pub fn icc_profile(&self) -> Option<&Arc<Profile>> {
        self.profile.as_ref()
    }

    /// Number of device channels in the profile.
    pub fn profile_size(&self) -> usize {
        self.profile_size
    }

    /// Model of the profile's device channels.
    pub fn profile_type(&self) -> SpaceType {
        self.profile_type
    }

    /// Sets the rendering intent used for transforms into or out of this space.
    pub fn set_intent(&self, intent: Intent) {
        *self.intent.lock().unwrap_or_else(PoisonError::into_inner) = intent;
    }

    /// Offset of the device channels within a value vector.
    fn device_offset(&self) -> usize {
        if self.profile.is_some() { 0 } else { FALLBACK }
    }
}

/// Model of an ICC color space signature.
fn signature_type(sig: ColorSpaceSignature) -> SpaceType {
    match sig {
        ColorSpaceSignature::GrayData => SpaceType::Gray,
        ColorSpaceSignature::RgbData => SpaceType::Rgb,
        ColorSpaceSignature::CmyData => SpaceType::Cmy,
        ColorSpaceSignature::CmykData => SpaceType::Cmyk,
        ColorSpaceSignature::HsvData => SpaceType::Hsv,
        ColorSpaceSignature::HlsData => SpaceType::Hsl,
        ColorSpaceSignature::LabData => SpaceType::Lab,
        ColorSpaceSignature::LuvData => SpaceType::Luv,
        ColorSpaceSignature::XYZData => SpaceType::Xyz,
        ColorSpaceSignature::YCbCrData => SpaceType::YCbCr,
        ColorSpaceSignature::YxyData => SpaceType::Yxy,
        _ => SpaceType::None,
    }
}

impl Space for CmsSpace {
    fn space_type(&self) -> SpaceType {
        SpaceType::Cms
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn svg_names(&self) -> Vec<String> {
        vec![self.name.clone()]
    }

    fn icon(&self) -> &str {
        "color-selector-cms"
    }

    fn component_count(&self) -> usize {
        self.profile_size + self.device_offset()
    }

    fn component_type(&self) -> SpaceType {
        self.profile_type
    }

    fn profile(&self) -> Arc<Profile> {
        self.profile.clone().unwrap_or_else(Profile::srgb)
    }

    fn intent(&self) -> Intent {
        *self.intent.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn intent_priority(&self) -> i32 {
        100
    }

    fn is_valid(&self) -> bool {
        self.profile.is_some()
    }

    fn space_to_profile(&self, io: &mut Vec<f64>) {
        if self.profile.is_none() {
            io.truncate(FALLBACK);
        } else if io.len() >= self.profile_size + FALLBACK {
            // values still carrying a fallback from before the profile resolved
            io.drain(..FALLBACK);
        }
    }

    fn profile_to_space(&self, io: &mut Vec<f64>) {
        if self.profile.is_none() {
            io.resize(FALLBACK + self.profile_size, 0.0);
        }
    }

    fn to_css(&self, values: &[f64], _opacity: Option<f64>) -> String {
        let offset = self.device_offset();
        if values.len() < offset + self.profile_size {
            return String::new();
        }
        let device = &values[offset..offset + self.profile_size];
        let icc = CssPrinter::icc_color(&self.name, self.profile_size).values(device).finish();
        format!("{} {}", hex_via_rgb(self, values, None), icc)
    }

    fn over_ink(&self, values: &[f64]) -> bool {
        if self.profile_type != SpaceType::Cmyk {
            return false;
        }
        let offset = self.device_offset();
        values
            .get(offset..offset + 4)
            .is_some_and(|inks| inks.iter().sum::<f64>() > INK_LIMIT)
    }
}

impl fmt::Debug for CmsSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CmsSpace")
            .field("name", &self.name)
            .field("profile_size", &self.profile_size)
            .field("profile_type", &self.profile_type)
            .field("valid", &self.profile.is_some())
            .finish_non_exhaustive()
    }
}

/// `icc-color(name, v1, v2, ...)`, values unscaled, percentages over 100.
pub(crate) struct IccColorParser;

impl ColorParser for IccColorParser {
    fn prefix(&self) -> &str {
        "icc-color"
    }

    fn space_type(&self) -> SpaceType {
        SpaceType::Cms
    }

    fn parse(&self, cursor: &mut Cursor<'_>) -> Option<Parsed> {
        cursor.skip_ws();
        let name = cursor.take_while(|c| c != b',' && c != b')' && !c.is_ascii_whitespace());
        if name.is_empty() {
            return None;
        }
        cursor.skip_ws();
        if cursor.peek() == Some(b',') {
            cursor.bump();
        }
        let mut values = Vec::new();
        let mut end = false;
        while !end {
            if !cursor.append_value(&mut values, &mut end, Some(b','), 1.0, 100.0) {
                return None;
            }
        }
        Some(Parsed { values, cms_name: Some(name.to_string()), more: false })
    }
}
