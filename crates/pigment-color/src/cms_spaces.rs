//! A registry of ICC profile spaces known by name, such as the profiles
//! attached to one document.

use crate::color::Color;
use crate::error::{ColorError, ColorResult};
use crate::manager::{with_fallback, Manager};
use crate::parser::Parsers;
use crate::spaces::{CmsSpace, Space};
use pigment_icc::{Intent, Profile};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Named [`CmsSpace`]s, resolving `icc-color(name, ...)` in parsed text.
///
/// Names a document refers to without a matching profile get an anonymous
/// space, created once and reused, so colors keep their device values and
/// sRGB fallback until the profile turns up.
///
/// # Example
///
/// ```rust
/// use pigment_color::{CmsSpaces, SpaceType};
/// use pigment_icc::{Intent, Profile};
///
/// let cms = CmsSpaces::new();
/// cms.add_profile(Profile::srgb(), "screen", Intent::Perceptual).unwrap();
///
/// let color = cms.parse("#ff0000 icc-color(screen, 1, 0, 0)").unwrap();
/// assert!(color.space().is_valid());
/// assert_eq!(color.to_rgba(1.0), 0xff0000ff);
///
/// let unknown = cms.parse("#00ff00 icc-color(press, 0.5, 0, 0, 0)").unwrap();
/// assert!(!unknown.space().is_valid());
/// assert_eq!(unknown.to_rgba(1.0), 0x00ff00ff);
/// ```
#[derive(Default)]
pub struct CmsSpaces {
    spaces: Mutex<BTreeMap<String, Arc<CmsSpace>>>,
}

impl CmsSpaces {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Arc<CmsSpace>>> {
        self.spaces.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `profile` as `name` (the sanitized profile description when
    /// empty). An unknown intent becomes perceptual.
    ///
    /// A registered name still held by an anonymous placeholder is taken
    /// over by the real profile.
    ///
    /// # Errors
    ///
    /// Returns [`ColorError::DuplicateSpace`] when a profile already holds the name.
    pub fn add_profile(&self, profile: Arc<Profile>, name: &str, intent: Intent) -> ColorResult<Arc<CmsSpace>> {
        let space = CmsSpace::new(profile, name);
        let mut spaces = self.lock();
        if spaces.get(space.name()).is_some_and(|s| s.is_valid()) {
            return Err(ColorError::DuplicateSpace(space.name().to_string()));
        }
        space.set_intent(if intent == Intent::Unknown { Intent::Perceptual } else { intent });
        info!(name = space.name(), intent = %space.intent(), "add color profile");
        let space = Arc::new(space);
        spaces.insert(space.name().to_string(), space.clone());
        Ok(space)
    }

    /// Loads an ICC file and registers it like [`add_profile`](Self::add_profile).
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read as a profile or the name is taken.
    pub fn add_profile_file(&self, path: &Path, name: &str, intent: Intent) -> ColorResult<Arc<CmsSpace>> {
        let profile = Profile::from_file(path, false)?;
        self.add_profile(Arc::new(profile), name, intent)
    }

    /// Unregisters `name`. False when it was not registered.
    pub fn remove_profile(&self, name: &str) -> bool {
        self.lock().remove(name).is_some()
    }

    /// The space registered as `name`, anonymous placeholders included.
    pub fn get(&self, name: &str) -> Option<Arc<CmsSpace>> {
        self.lock().get(name).cloned()
    }

    /// Registered spaces ordered by name. Anonymous placeholders are left out.
    pub fn spaces(&self) -> Vec<Arc<CmsSpace>> {
        self.lock().values().filter(|s| s.is_valid()).cloned().collect()
    }

    /// Changes the rendering intent of `name`. False when it is not registered.
    pub fn set_intent(&self, name: &str, intent: Intent) -> bool {
        match self.get(name) {
            Some(space) => {
                space.set_intent(intent);
                true
            }
            None => false,
        }
    }

    /// A CSS `color(<ident> ...)` space: a registered profile, else a
    /// built-in space from the shared [`Manager`].
    pub fn find_svg_space(&self, name: &str) -> Option<Arc<dyn Space>> {
        match self.get(name).filter(|s| s.is_valid()) {
            Some(space) => Some(space as Arc<dyn Space>),
            None => Manager::get().find_svg_space(name),
        }
    }

    /// A name for `profile` under `intent`, and whether a space with that
    /// name and intent already exists.
    ///
    /// `preferred` is returned when it already holds the same profile and
    /// intent. Otherwise the name is the sanitized profile description,
    /// suffixed with the intent when that name is taken under another intent.
    pub fn check_profile_name(&self, profile: &Profile, intent: Intent, preferred: Option<&str>) -> (String, bool) {
        let matches = |space: &CmsSpace| space.icc_profile().is_some_and(|p| **p == *profile);
        if let Some(name) = preferred {
            if self.get(name).is_some_and(|s| matches(&s) && s.intent() == intent) {
                return (name.to_string(), true);
            }
        }
        let name = profile.name(true);
        match self.get(&name) {
            None => (name, false),
            Some(space) if space.intent() == intent => (name, matches(&space)),
            Some(_) => {
                let name = format!("{name}-{}", intent.id());
                let exists = self.get(&name).is_some_and(|s| matches(&s));
                (name, exists)
            }
        }
    }

    /// Parses CSS color text, resolving `icc-color` names against this
    /// registry.
    ///
    /// An unknown name gets an anonymous space sized to the device values,
    /// carrying the sRGB fallback (black when none was given). A placeholder
    /// of another size is rebuilt. `None` when a registered profile has a
    /// different channel count; device values never become opacity.
    pub fn parse(&self, text: &str) -> Option<Color> {
        let parsed = Parsers::get().parse(text)?;
        let Some(cms_name) = parsed.cms_name else {
            return Manager::get().if_valid(parsed.space_type, parsed.values);
        };
        let count = parsed.values.len();
        let space = {
            let mut spaces = self.lock();
            match spaces.get(&cms_name) {
                Some(space) if space.is_valid() || space.profile_size() == count => space.clone(),
                _ => {
                    debug!(name = %cms_name, channels = count, "unknown color profile, using anonymous space");
                    let space = Arc::new(CmsSpace::anonymous(&cms_name, count));
                    spaces.insert(cms_name.clone(), space.clone());
                    space
                }
            }
        };
        if space.profile_size() != count {
            debug!(name = %cms_name, expected = space.profile_size(), actual = count, "icc-color channel count mismatch");
            return None;
        }
        let values = if space.is_valid() { parsed.values } else { with_fallback(parsed.fallback, parsed.values) };
        let space: Arc<dyn Space> = space;
        Color::with_space(space, values).ok()
    }
}

impl fmt::Debug for CmsSpaces {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.lock().keys().cloned().collect();
        f.debug_struct("CmsSpaces").field("spaces", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SpaceType;
    use approx::assert_abs_diff_eq;

    fn gray_profile() -> Arc<Profile> {
        let white = lcms2::CIExyY { x: 0.3127, y: 0.3290, Y: 1.0 };
        let inner = lcms2::Profile::new_gray(&white, &lcms2::ToneCurve::new(2.2)).unwrap();
        Arc::new(Profile::from_lcms(inner))
    }

    #[test]
    fn test_add_and_get() {
        let cms = CmsSpaces::new();
        let space = cms.add_profile(Profile::srgb(), "screen", Intent::Unknown).unwrap();
        assert_eq!(space.intent(), Intent::Perceptual);
        assert!(cms.get("screen").is_some());
        assert!(cms.get("other").is_none());
        assert!(matches!(
            cms.add_profile(Profile::srgb(), "screen", Intent::Perceptual),
            Err(ColorError::DuplicateSpace(_))
        ));
        assert_eq!(cms.spaces().len(), 1);
    }

    #[test]
    fn test_unnamed_profile_uses_description() {
        let cms = CmsSpaces::new();
        let space = cms.add_profile(Profile::srgb(), "", Intent::Perceptual).unwrap();
        assert_eq!(space.name(), Profile::srgb().name(true));
    }

    #[test]
    fn test_remove_and_set_intent() {
        let cms = CmsSpaces::new();
        cms.add_profile(gray_profile(), "gray", Intent::Perceptual).unwrap();
        assert!(cms.set_intent("gray", Intent::Saturation));
        assert_eq!(cms.get("gray").unwrap().intent(), Intent::Saturation);
        assert!(!cms.set_intent("nope", Intent::Saturation));
        assert!(cms.remove_profile("gray"));
        assert!(!cms.remove_profile("gray"));
    }

    #[test]
    fn test_parse_known_profile() {
        let cms = CmsSpaces::new();
        cms.add_profile(gray_profile(), "gray", Intent::Perceptual).unwrap();
        let color = cms.parse("icc-color(gray, 1)").unwrap();
        assert_eq!(color.space().space_type(), SpaceType::Cms);
        assert_eq!(color.values(), &[1.0]);
        assert_eq!(color.to_rgba(1.0), 0xffffffff);
        assert_eq!(color.to_css(false), "#ffffff icc-color(gray, 1)");

        let mut rgb = color.converted_to(SpaceType::Rgb).unwrap();
        assert_abs_diff_eq!(rgb[1], 1.0, epsilon = 1e-3);
        assert!(rgb.convert(color.space()));
        assert_abs_diff_eq!(rgb[0], 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_parse_unknown_profile_is_cached() {
        let cms = CmsSpaces::new();
        let color = cms.parse("#112233 icc-color(myprofile, 0.1, 0.2, 0.3)").unwrap();
        assert!(!color.space().is_valid());
        assert_abs_diff_eq!(color[0], 0x11 as f64 / 255.0);
        assert_eq!(color.to_string(), "#112233 icc-color(myprofile, 0.1, 0.2, 0.3)");

        let first = cms.get("myprofile").unwrap();
        cms.parse("icc-color(myprofile, 0, 0, 0)").unwrap();
        assert!(Arc::ptr_eq(&first, &cms.get("myprofile").unwrap()));
        // placeholders are not listed and can be replaced by the real profile
        assert!(cms.spaces().is_empty());
        assert!(cms.add_profile(Profile::srgb(), "myprofile", Intent::Perceptual).is_ok());
        assert!(cms.get("myprofile").unwrap().is_valid());
    }

    #[test]
    fn test_parse_channel_count_changes() {
        let cms = CmsSpaces::new();
        let three = cms.parse("#112233 icc-color(press, 0.1, 0.2, 0.3)").unwrap();
        assert_eq!(three.values().len(), 6);

        let four = cms.parse("#112233 icc-color(press, 0.1, 0.2, 0.3, 0.4)").unwrap();
        assert!(!four.has_opacity());
        assert_eq!(four.values().len(), 7);
        assert_eq!(four.to_string(), "#112233 icc-color(press, 0.1, 0.2, 0.3, 0.4)");
        assert_eq!(cms.get("press").unwrap().profile_size(), 4);
        // colors parsed earlier keep their own placeholder
        assert_eq!(three.to_string(), "#112233 icc-color(press, 0.1, 0.2, 0.3)");
    }

    #[test]
    fn test_parse_rejects_wrong_profile_size() {
        let cms = CmsSpaces::new();
        cms.add_profile(gray_profile(), "gray", Intent::Perceptual).unwrap();
        assert!(cms.parse("icc-color(gray, 0.5, 0.25)").is_none());
        assert!(cms.parse("icc-color(gray, 0.5, 0.25, 0.1)").is_none());
        let color = cms.parse("icc-color(gray, 0.5)").unwrap();
        assert!(!color.has_opacity());
        assert!(cms.get("gray").unwrap().is_valid());
    }

    #[test]
    fn test_parse_plain_css() {
        let cms = CmsSpaces::new();
        let color = cms.parse("hsl(120 100% 50%)").unwrap();
        assert_eq!(color.space().space_type(), SpaceType::Hsl);
    }

    #[test]
    fn test_find_svg_space() {
        let cms = CmsSpaces::new();
        cms.add_profile(gray_profile(), "gray", Intent::Perceptual).unwrap();
        assert_eq!(cms.find_svg_space("gray").unwrap().space_type(), SpaceType::Cms);
        assert_eq!(cms.find_svg_space("xyz-d50").unwrap().space_type(), SpaceType::Xyz50);
        assert!(cms.find_svg_space("nope").is_none());
    }

    #[test]
    fn test_check_profile_name() {
        let cms = CmsSpaces::new();
        let srgb = Profile::srgb();
        let base = srgb.name(true);
        assert_eq!(cms.check_profile_name(&srgb, Intent::Perceptual, None), (base.clone(), false));

        cms.add_profile(srgb.clone(), "", Intent::Perceptual).unwrap();
        assert_eq!(cms.check_profile_name(&srgb, Intent::Perceptual, None), (base.clone(), true));
        assert_eq!(cms.check_profile_name(&srgb, Intent::Perceptual, Some(&base)), (base.clone(), true));

        let suffixed = format!("{base}-saturation");
        assert_eq!(cms.check_profile_name(&srgb, Intent::Saturation, None), (suffixed.clone(), false));
        cms.add_profile(srgb.clone(), &suffixed, Intent::Saturation).unwrap();
        assert_eq!(cms.check_profile_name(&srgb, Intent::Saturation, None), (suffixed, true));
    }
}
