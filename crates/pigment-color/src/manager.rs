//! Registry of the color spaces colors may live in.

use crate::color::Color;
use crate::components::Traits;
use crate::error::{ColorError, ColorResult};
use crate::parser::Parsers;
use crate::spaces::{
    CmsSpace, DeviceCmyk, Gray, Hsl, Hsluv, Hsv, Lab, Lch, LinearRgb, Luv, NamedColor, OkHsl, OkHsv, OkLab,
    OkLch, Rgb, Space, SpaceType, Xyz, Xyz50,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::{debug, error};

/// Holds one space per [`SpaceType`] and resolves CSS `color()` identifiers.
///
/// [`Manager::get`] is the shared registry with every built-in space;
/// build your own with [`Manager::empty`] and [`add_space`](Self::add_space).
///
/// # Example
///
/// ```rust
/// use pigment_color::{Manager, SpaceType, Traits};
///
/// let manager = Manager::get();
/// assert_eq!(manager.find(SpaceType::Hsl).unwrap().name(), "HSL");
/// assert_eq!(manager.find_by_name("OkLch").unwrap().space_type(), SpaceType::Oklch);
/// assert!(manager.find_svg_space("xyz-d50").is_some());
/// assert!(!manager.spaces(Traits::PICKER).is_empty());
/// ```
pub struct Manager {
    spaces: Vec<Arc<dyn Space>>,
    svg_names: HashMap<String, Arc<dyn Space>>,
}

impl Manager {
    /// A registry with no spaces.
    pub fn empty() -> Self {
        Self { spaces: Vec::new(), svg_names: HashMap::new() }
    }

    /// A registry with every built-in space.
    pub fn new() -> Self {
        let builtins: [Arc<dyn Space>; 17] = [
            Arc::new(Rgb),
            Arc::new(NamedColor),
            Arc::new(DeviceCmyk),
            Arc::new(Gray),
            Arc::new(Hsl),
            Arc::new(Hsluv),
            Arc::new(Hsv),
            Arc::new(Lab),
            Arc::new(LinearRgb),
            Arc::new(Lch),
            Arc::new(Luv),
            Arc::new(OkHsl),
            Arc::new(OkHsv),
            Arc::new(OkLab),
            Arc::new(OkLch),
            Arc::new(Xyz),
            Arc::new(Xyz50),
        ];
        let mut manager = Self::empty();
        for space in builtins {
            if let Err(e) = manager.add_space(space) {
                error!(error = %e, "cannot register built-in color space");
            }
        }
        manager
    }

    /// The shared built-in registry.
    pub fn get() -> &'static Manager {
        static MANAGER: OnceLock<Manager> = OnceLock::new();
        MANAGER.get_or_init(Manager::new)
    }

    /// Registers `space` and its CSS identifiers.
    ///
    /// # Errors
    ///
    /// [`ColorError::DuplicateSpace`] when a space of the same type is
    /// registered, [`ColorError::DuplicateSvgName`] when one of its CSS
    /// identifiers is taken. Nothing is registered on error.
    pub fn add_space(&mut self, space: Arc<dyn Space>) -> ColorResult<Arc<dyn Space>> {
        if self.find(space.space_type()).is_some() {
            return Err(ColorError::DuplicateSpace(space.name().to_string()));
        }
        let svg_names = space.svg_names();
        if let Some(taken) = svg_names.iter().find(|n| self.svg_names.contains_key(*n)) {
            return Err(ColorError::DuplicateSvgName(taken.clone()));
        }
        debug!(space = space.name(), "register color space");
        for name in svg_names {
            self.svg_names.insert(name, space.clone());
        }
        self.spaces.push(space.clone());
        Ok(space)
    }

    /// Unregisters `space` and its CSS identifiers. False if it was not registered.
    pub fn remove_space(&mut self, space: &Arc<dyn Space>) -> bool {
        let Some(pos) = self.spaces.iter().position(|s| s.same_as(space.as_ref())) else {
            return false;
        };
        let removed = self.spaces.remove(pos);
        self.svg_names.retain(|_, s| !s.same_as(removed.as_ref()));
        true
    }

    /// Registered spaces whose channels carry any of `traits`, in
    /// registration order. [`Traits::NONE`] lists all of them.
    pub fn spaces(&self, traits: Traits) -> Vec<Arc<dyn Space>> {
        self.spaces
            .iter()
            .filter(|s| traits == Traits::NONE || s.components(false).traits().intersects(traits))
            .cloned()
            .collect()
    }

    /// The space of `space_type`.
    pub fn find(&self, space_type: SpaceType) -> Option<Arc<dyn Space>> {
        self.spaces.iter().find(|s| s.space_type() == space_type).cloned()
    }

    /// The space named `name`, as returned by [`Space::name`].
    pub fn find_by_name(&self, name: &str) -> Option<Arc<dyn Space>> {
        self.spaces.iter().find(|s| s.name() == name).cloned()
    }

    /// The space a CSS `color(<ident> ...)` identifier refers to.
    pub fn find_svg_space(&self, name: &str) -> Option<Arc<dyn Space>> {
        self.svg_names.get(name).cloned()
    }

    /// A color in the space of `space_type`, or `None` for an unknown type
    /// or bad value count.
    pub fn if_valid(&self, space_type: SpaceType, values: Vec<f64>) -> Option<Color> {
        let space = self.find(space_type)?;
        Color::with_space(space, values).ok()
    }

    /// Parses CSS color text into a color in one of these spaces.
    ///
    /// `icc-color(name, ...)` cannot be resolved here, so it yields a color
    /// in an anonymous [`CmsSpace`] that renders through its sRGB fallback
    /// (black when none was given). See [`CmsSpaces::parse`](crate::CmsSpaces::parse)
    /// for resolving profile names.
    pub fn parse(&self, text: &str) -> Option<Color> {
        let parsed = Parsers::get().parse(text)?;
        let Some(cms_name) = parsed.cms_name else {
            return self.if_valid(parsed.space_type, parsed.values);
        };
        let space = CmsSpace::anonymous(&cms_name, parsed.values.len());
        let values = with_fallback(parsed.fallback, parsed.values);
        Color::with_space(Arc::new(space), values).ok()
    }
}

/// Prepends a three channel sRGB fallback, or black, to device values.
pub(crate) fn with_fallback(fallback: Option<Vec<f64>>, values: Vec<f64>) -> Vec<f64> {
    let mut all = match fallback {
        Some(rgb) if rgb.len() == 3 => rgb,
        _ => vec![0.0; 3],
    };
    all.extend(values);
    all
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.spaces.iter().map(|s| s.name()).collect();
        f.debug_struct("Manager").field("spaces", &names).finish_non_exhaustive()
    }
}
