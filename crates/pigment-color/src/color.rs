//! The color value type.

use crate::error::{ColorError, ColorResult};
use crate::manager::Manager;
use crate::spaces::{Rgb, Space, SpaceType};
use crate::utils::rgba_to_values;
use rand::Rng;
use std::fmt;
use std::ops::Index;
use std::sync::Arc;

/// Channel tolerance under which two colors compare equal.
const EQ_EPSILON: f64 = 1e-5;

/// Smallest channel change [`Color::set`] reports.
const CHANGE_EPSILON: f64 = 0.001;

/// A color: channel values in a [`Space`], an optional opacity and an
/// optional palette name.
///
/// Channels are normalized to 0..1 (unbounded spaces may leave that range).
/// Opacity lives beside the channels rather than among them, so space
/// conversions never touch it. Index `component_count()` addresses it
/// wherever a channel index is accepted, and bit `component_count()` of a
/// pin mask protects it.
///
/// # Example
///
/// ```rust
/// use pigment_color::{Color, SpaceType};
///
/// let mut color = Color::parse("hsl(0 100% 50% / 50%)").unwrap();
/// assert_eq!(color.space().space_type(), SpaceType::Hsl);
/// assert_eq!(color.opacity(), 0.5);
///
/// assert!(color.convert_to(SpaceType::Rgb));
/// assert_eq!(color.to_css(true), "#ff000080");
/// assert_eq!(color.to_string(), "#ff000080");
/// ```
#[derive(Clone)]
pub struct Color {
    space: Arc<dyn Space>,
    values: Vec<f64>,
    opacity: Option<f64>,
    name: Option<String>,
}

impl Color {
    /// A color in the registered space of `space_type`.
    ///
    /// # Errors
    ///
    /// Fails when no such space is registered or `values` does not hold its
    /// channel count, optionally plus opacity.
    pub fn new(space_type: SpaceType, values: Vec<f64>) -> ColorResult<Self> {
        let space = Manager::get()
            .find(space_type)
            .ok_or_else(|| ColorError::UnknownSpace(format!("{space_type:?}")))?;
        Self::with_space(space, values)
    }

    /// A color in `space`. A value past the channel count is the opacity.
    ///
    /// # Errors
    ///
    /// Returns [`ColorError::InvalidValues`] when `values` does not hold the
    /// space's channel count, optionally plus opacity.
    pub fn with_space(space: Arc<dyn Space>, mut values: Vec<f64>) -> ColorResult<Self> {
        if !space.is_valid_data(&values) {
            return Err(ColorError::InvalidValues {
                space: space.name().to_string(),
                expected: space.component_count(),
                actual: values.len(),
            });
        }
        let opacity = (values.len() > space.component_count()).then(|| values.pop()).flatten();
        Ok(Self { space, values, opacity, name: None })
    }

    /// An sRGB color from `0xRRGGBBAA`, keeping the alpha byte as opacity
    /// when `opacity` is set.
    pub fn from_rgba(rgba: u32, opacity: bool) -> Self {
        let mut values = rgba_to_values(rgba, opacity);
        let opacity = opacity.then(|| values.pop()).flatten();
        Self { space: rgb_space(), values, opacity, name: None }
    }

    /// Parses CSS color text with the shared [`Manager`].
    pub fn parse(text: &str) -> Option<Self> {
        Manager::get().parse(text)
    }

    /// Like [`new`](Self::new) but `None` for bad data.
    pub fn if_valid(space_type: SpaceType, values: Vec<f64>) -> Option<Self> {
        Manager::get().if_valid(space_type, values)
    }

    /// The space the values belong to.
    pub fn space(&self) -> &Arc<dyn Space> {
        &self.space
    }

    /// Channel values, opacity excluded.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Channel values followed by the opacity, if any.
    pub fn all_values(&self) -> Vec<f64> {
        self.values.iter().copied().chain(self.opacity).collect()
    }

    /// Replaces the values, and the opacity when one more value is given.
    /// Clears the name.
    ///
    /// # Errors
    ///
    /// Returns [`ColorError::InvalidValues`] when the count does not fit the space.
    pub fn set_values(&mut self, values: Vec<f64>) -> ColorResult<()> {
        let Self { values: new_values, opacity, .. } = Self::with_space(self.space.clone(), values)?;
        self.values = new_values;
        if opacity.is_some() {
            self.opacity = opacity;
        }
        self.name = None;
        Ok(())
    }

    /// Channel `index`, or the opacity at `component_count()`, which reads as
    /// 1.0 when absent.
    pub fn get(&self, index: usize) -> f64 {
        self[index]
    }

    /// Sets channel `index` or, at `component_count()`, the opacity.
    /// Returns true when the value moved by at least 0.001.
    pub fn set(&mut self, index: usize, value: f64) -> bool {
        if index == self.opacity_channel() && self.opacity.is_none() {
            self.opacity = Some(1.0);
        }
        match self.value_mut(index) {
            Some(slot) => {
                let changed = (*slot - value).abs() >= CHANGE_EPSILON;
                *slot = value;
                changed
            }
            None => false,
        }
    }

    /// Takes on `other`. With `keep_space` the result is converted back into
    /// this color's space and keeps its opacity presence.
    ///
    /// Returns true when anything changed.
    pub fn set_color(&mut self, other: &Color, keep_space: bool) -> bool {
        if keep_space {
            let previous = self.clone();
            if self.set_color(other, false) {
                self.convert(&previous.space);
                self.enable_opacity(previous.has_opacity());
                return !self.is_near(&previous, CHANGE_EPSILON);
            }
            false
        } else if self != other {
            *self = other.clone();
            true
        } else {
            false
        }
    }

    /// Parses `text` and takes it on with [`set_color`](Self::set_color).
    pub fn set_parsed(&mut self, text: &str, keep_space: bool) -> bool {
        Color::parse(text).is_some_and(|color| self.set_color(&color, keep_space))
    }

    /// Replaces the color with sRGB `0xRRGGBBAA`.
    pub fn set_rgba(&mut self, rgba: u32, opacity: bool) -> bool {
        if self.space.space_type() == SpaceType::Rgb && self.has_opacity() == opacity && rgba == self.to_rgba(1.0) {
            return false;
        }
        *self = Color::from_rgba(rgba, opacity);
        true
    }

    /// True when an opacity is set.
    pub fn has_opacity(&self) -> bool {
        self.opacity.is_some()
    }

    /// Adds a fully opaque opacity, or drops the opacity.
    pub fn enable_opacity(&mut self, enable: bool) {
        match (enable, self.opacity) {
            (true, None) => self.opacity = Some(1.0),
            (false, Some(_)) => self.opacity = None,
            _ => {}
        }
    }

    /// Index addressing the opacity.
    pub fn opacity_channel(&self) -> usize {
        self.space.component_count()
    }

    /// The opacity, 1.0 when absent.
    pub fn opacity(&self) -> f64 {
        self.opacity.unwrap_or(1.0)
    }

    /// Removes the opacity and returns what it was.
    pub fn steal_opacity(&mut self) -> f64 {
        self.opacity.take().unwrap_or(1.0)
    }

    /// Sets the opacity, returning true if it changed.
    pub fn set_opacity(&mut self, opacity: f64) -> bool {
        let changed = self.opacity != Some(opacity);
        self.opacity = Some(opacity);
        changed
    }

    /// Multiplies the opacity by `opacity`.
    pub fn add_opacity(&mut self, opacity: f64) -> bool {
        self.set_opacity(self.opacity() * opacity)
    }

    /// Copy with the opacity multiplied by `opacity`.
    pub fn with_opacity(&self, opacity: f64) -> Color {
        let mut copy = self.clone();
        copy.add_opacity(opacity);
        copy
    }

    /// Pin mask bit protecting `channel`.
    ///
    /// 0 for channels past the opacity channel or beyond the 32 the mask holds.
    pub fn pin(&self, channel: usize) -> u32 {
        if channel > self.opacity_channel() {
            return 0;
        }
        u32::try_from(channel).ok().and_then(|c| 1u32.checked_shl(c)).unwrap_or(0)
    }

    /// Sum of squared channel differences after converting `other` into
    /// this color's space.
    pub fn difference(&self, other: &Color) -> f64 {
        let Some(copy) = other.converted_like(self) else {
            return 0.0;
        };
        self.all_values()
            .iter()
            .zip(copy.all_values())
            .map(|(a, b)| (a - b).powi(2))
            .sum()
    }

    /// Same space and every value, opacity included, within `epsilon`.
    pub fn is_close(&self, other: &Color, epsilon: f64) -> bool {
        self.space.same_as(other.space.as_ref()) && self.is_near(other, epsilon)
    }

    /// Like [`is_close`](Self::is_close) after converting `other` into this
    /// color's space.
    pub fn is_similar(&self, other: &Color, epsilon: f64) -> bool {
        if self.space.same_as(other.space.as_ref()) {
            return self.is_close(other, epsilon);
        }
        other.converted(&self.space).is_some_and(|copy| self.is_close(&copy, epsilon))
    }

    fn is_near(&self, other: &Color, epsilon: f64) -> bool {
        let (a, b) = (self.all_values(), other.all_values());
        a.len() == b.len() && a.iter().zip(&b).all(|(x, y)| (x - y).abs() < epsilon)
    }

    /// Converts into `to` in place. Clears the name.
    ///
    /// Returns false, leaving the color untouched, when `to` is an invalid
    /// profile space or the conversion fails.
    pub fn convert(&mut self, to: &Arc<dyn Space>) -> bool {
        if !to.is_valid() {
            return false;
        }
        if !self.space.same_as(to.as_ref()) {
            let mut values = self.values.clone();
            if !self.space.convert(&mut values, to.as_ref()) {
                return false;
            }
            self.values = values;
            self.space = to.clone();
        }
        self.name = None;
        true
    }

    /// Converts into the registered space of `space_type`.
    pub fn convert_to(&mut self, space_type: SpaceType) -> bool {
        Manager::get().find(space_type).is_some_and(|space| self.convert(&space))
    }

    /// Converts into `other`'s space and matches its opacity presence.
    pub fn convert_like(&mut self, other: &Color) -> bool {
        if self.convert(&other.space) {
            self.enable_opacity(other.has_opacity());
            return true;
        }
        false
    }

    /// Converted copy, or `None` when the conversion fails.
    pub fn converted(&self, to: &Arc<dyn Space>) -> Option<Color> {
        let mut copy = self.clone();
        copy.convert(to).then_some(copy)
    }

    /// Copy converted into the registered space of `space_type`.
    pub fn converted_to(&self, space_type: SpaceType) -> Option<Color> {
        let mut copy = self.clone();
        copy.convert_to(space_type).then_some(copy)
    }

    /// Copy converted like [`convert_like`](Self::convert_like).
    pub fn converted_like(&self, other: &Color) -> Option<Color> {
        let mut copy = self.clone();
        copy.convert_like(other).then_some(copy)
    }

    /// CSS text, with opacity when `opacity` is set and the syntax allows.
    pub fn to_css(&self, opacity: bool) -> String {
        self.space.to_css(&self.values, if opacity { self.opacity } else { None })
    }

    /// `0xRRGGBBAA` sRGB, alpha being this color's opacity times `opacity`.
    pub fn to_rgba(&self, opacity: f64) -> u32 {
        self.space.to_rgba(&self.values, opacity * self.opacity())
    }

    /// `0xAARRGGBB`.
    pub fn to_argb(&self, opacity: f64) -> u32 {
        self.to_rgba(opacity).rotate_right(8)
    }

    /// `0xAABBGGRR`.
    pub fn to_abgr(&self, opacity: f64) -> u32 {
        self.to_rgba(opacity).swap_bytes()
    }

    /// Palette name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Sets the palette name. Conversions and value changes clear it.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// True when `to`'s anchor profile cannot reproduce this color.
    pub fn is_out_of_gamut(&self, to: &Arc<dyn Space>) -> bool {
        self.space.out_of_gamut(&self.values, to.as_ref())
    }

    /// True when the space counts the ink coverage as excessive.
    pub fn is_over_inked(&self) -> bool {
        self.space.over_ink(&self.values)
    }

    /// Wraps hues and clamps every other channel, opacity included, to 0..1.
    pub fn normalize(&mut self) {
        for component in self.space.components(self.has_opacity()) {
            if let Some(slot) = self.value_mut(component.index) {
                *slot = component.normalize(*slot);
            }
        }
    }

    /// Normalized copy.
    pub fn normalized(&self) -> Color {
        let mut copy = self.clone();
        copy.normalize();
        copy
    }

    /// Lays `other` over this color using `other`'s opacity.
    pub fn compose(&mut self, other: &Color) {
        let alpha = other.opacity();
        let pin = self.pin(self.opacity_channel());
        self.mutate_with(other, pin, |value, theirs| *value = *value * (1.0 - alpha) + theirs * alpha);
        self.set_opacity(1.0 - (1.0 - self.opacity()) * (1.0 - alpha));
    }

    /// Composed copy.
    pub fn composed(&self, other: &Color) -> Color {
        let mut copy = self.clone();
        copy.compose(other);
        copy
    }

    /// Moves unpinned values towards `other` by `pos` (0 keeps this color,
    /// 1 takes `other`).
    pub fn average(&mut self, other: &Color, pos: f64, pin: u32) {
        self.mutate_with(other, pin, |value, theirs| *value = *value * (1.0 - pos) + theirs * pos);
    }

    /// Averaged copy with nothing pinned.
    pub fn averaged(&self, other: &Color, pos: f64) -> Color {
        let mut copy = self.clone();
        copy.average(other, pos, 0);
        copy
    }

    /// Replaces every unpinned value `v` with `1 - v`. Without a pin mask,
    /// the opacity is pinned.
    pub fn invert(&mut self, pin: Option<u32>) {
        let pin = pin.unwrap_or_else(|| self.pin(self.opacity_channel()));
        self.for_each_unpinned(pin, |value| *value = 1.0 - *value);
    }

    /// Adds random noise of up to `force / 2` either way to every unpinned
    /// value, then normalizes.
    pub fn jitter(&mut self, force: f64, pin: u32) {
        self.jitter_with(force, pin, &mut rand::thread_rng());
    }

    /// [`jitter`](Self::jitter) drawing from `rng`.
    pub fn jitter_with<R: Rng + ?Sized>(&mut self, force: f64, pin: u32, rng: &mut R) {
        self.for_each_unpinned(pin, |value| *value += (rng.r#gen::<f64>() - 0.5) * force);
        self.normalize();
    }

    fn value_mut(&mut self, index: usize) -> Option<&mut f64> {
        if index < self.values.len() {
            self.values.get_mut(index)
        } else if index == self.opacity_channel() {
            self.opacity.as_mut()
        } else {
            None
        }
    }

    fn for_each_unpinned(&mut self, pin: u32, mut f: impl FnMut(&mut f64)) {
        for index in 0..=self.opacity_channel() {
            if pin & self.pin(index) != 0 {
                continue;
            }
            if let Some(value) = self.value_mut(index) {
                f(value);
            }
        }
    }

    fn mutate_with(&mut self, other: &Color, pin: u32, mut f: impl FnMut(&mut f64, f64)) {
        let converted;
        let other = if self.space.same_as(other.space.as_ref()) && self.has_opacity() == other.has_opacity() {
            other
        } else {
            match other.converted_like(self) {
                Some(copy) => {
                    converted = copy;
                    &converted
                }
                None => return,
            }
        };
        for index in 0..=self.opacity_channel() {
            if pin & self.pin(index) != 0 {
                continue;
            }
            let theirs = other.get(index);
            if let Some(value) = self.value_mut(index) {
                f(value, theirs);
            }
        }
    }
}

/// The registered sRGB space.
fn rgb_space() -> Arc<dyn Space> {
    Manager::get().find(SpaceType::Rgb).unwrap_or_else(|| Arc::new(Rgb))
}

impl Index<usize> for Color {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        match self.values.get(index) {
            Some(value) => value,
            None => self.opacity.as_ref().unwrap_or(&1.0),
        }
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.space.same_as(other.space.as_ref()) && self.is_near(other, EQ_EPSILON)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css(true))
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Color")
            .field("space", &self.space.name())
            .field("values", &self.values)
            .field("opacity", &self.opacity)
            .field("name", &self.name)
            .finish()
    }
}
