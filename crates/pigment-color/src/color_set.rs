//! Groups of colors edited together, keyed by id.
//!
//! A [`ColorSet`] backs multi-selection pickers: every color can be moved at
//! once, per component averages can be read and shifted, and listeners hear
//! about grabs, releases, changes and clears.

use crate::color::Color;
use crate::components::{Component, Components};
use crate::error::{ColorError, ColorResult};
use crate::spaces::Space;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Id used by [`ColorSet::set_single`].
const SINGLE: &str = "single";

/// Notification sent to [`ColorSet`] listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSetEvent {
    /// A continuous edit started.
    Grabbed,
    /// A continuous edit ended.
    Released,
    /// One or more colors changed or were added.
    Changed,
    /// Every color was removed.
    Cleared,
}

type Listener = Box<dyn FnMut(ColorSetEvent) + Send>;

/// Colors keyed by id, modified collectively.
///
/// Optional constraints are fixed at construction: every new entry is
/// converted into the constrained space and has its opacity added or dropped
/// to match the alpha constraint. Component operations need a space
/// constraint, since a component only means something in its own space.
///
/// # Example
///
/// ```rust
/// use pigment_color::{Color, ColorSet, Manager, SpaceType};
///
/// let rgb = Manager::get().find(SpaceType::Rgb).unwrap();
/// let mut set = ColorSet::new(Some(rgb.clone()), Some(false));
/// set.set("a", &Color::parse("#ff000080").unwrap());
/// set.set("b", &Color::parse("hsl(0 100% 50%)").unwrap());
/// assert!(set.is_same());
///
/// let red = &rgb.components(false)[0];
/// assert_eq!(set.set_all_component(red, 0.5).unwrap(), 2);
/// assert_eq!(set.get_average(red).unwrap(), 0.5);
/// ```
pub struct ColorSet {
    colors: Vec<(String, Color)>,
    space: Option<Arc<dyn Space>>,
    alpha: Option<bool>,
    grabbed: bool,
    blocked: bool,
    listeners: Vec<Listener>,
}

impl ColorSet {
    /// Empty set, optionally constrained to a space and to having (or not
    /// having) opacity.
    pub fn new(space: Option<Arc<dyn Space>>, alpha: Option<bool>) -> Self {
        Self { colors: Vec::new(), space, alpha, grabbed: false, blocked: false, listeners: Vec::new() }
    }

    /// Registers a listener for every event this set sends.
    pub fn connect(&mut self, listener: impl FnMut(ColorSetEvent) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Space constraint, if any.
    pub fn space_constraint(&self) -> Option<&Arc<dyn Space>> {
        self.space.as_ref()
    }

    /// Alpha constraint, if any.
    pub fn alpha_constraint(&self) -> Option<bool> {
        self.alpha
    }

    /// Channels of the constrained space, with alpha when alpha is required.
    /// `None` for an unconstrained set.
    pub fn components(&self) -> Option<&'static Components> {
        self.space.as_ref().map(|space| space.components(self.alpha == Some(true)))
    }

    /// True while a continuous edit is under way.
    pub fn is_grabbed(&self) -> bool {
        self.grabbed
    }

    /// True while events are suppressed.
    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    /// Suppresses events until [`unblock`](Self::unblock).
    pub fn block(&mut self) {
        self.blocked = true;
    }

    /// Lets events through again.
    pub fn unblock(&mut self) {
        self.blocked = false;
    }

    /// Starts a continuous edit. Sends [`ColorSetEvent::Grabbed`] once.
    pub fn grab(&mut self) {
        if !self.blocked && !self.grabbed {
            self.emit(ColorSetEvent::Grabbed);
            self.grabbed = true;
        }
    }

    /// Ends a continuous edit. Sends [`ColorSetEvent::Released`] once.
    pub fn release(&mut self) {
        if !self.blocked && self.grabbed {
            self.grabbed = false;
            self.emit(ColorSetEvent::Released);
        }
    }

    /// Removes every color, sending [`ColorSetEvent::Cleared`] if there were any.
    pub fn clear(&mut self) {
        if !self.colors.is_empty() {
            self.colors.clear();
            self.emit(ColorSetEvent::Cleared);
        }
    }

    /// Sets the color under `id`, adding it if new.
    ///
    /// Existing entries keep their space and opacity presence. Returns true
    /// when anything changed.
    pub fn set(&mut self, id: impl Into<String>, color: &Color) -> bool {
        let changed = self.insert(id.into(), color);
        if changed {
            self.emit(ColorSetEvent::Changed);
        }
        changed
    }

    /// The color under `id`, normalized.
    pub fn get(&self, id: &str) -> Option<Color> {
        self.colors.iter().find(|(cid, _)| cid == id).map(|(_, color)| color.normalized())
    }

    /// Uses the set for a single color, dropping anything else it held.
    pub fn set_single(&mut self, color: &Color) -> bool {
        if self.colors.len() != 1 || self.colors[0].0 != SINGLE {
            self.colors.clear();
        }
        self.set(SINGLE, color)
    }

    /// The color stored by [`set_single`](Self::set_single).
    pub fn single(&self) -> Option<Color> {
        self.get(SINGLE)
    }

    /// Takes every color of `other` by id, adding ids not present yet.
    /// Returns how many entries changed or were added.
    pub fn set_all_from(&mut self, other: &ColorSet) -> usize {
        let mut changed = 0;
        for (id, color) in other.iter() {
            if self.insert(id.clone(), color) {
                changed += 1;
            }
        }
        if changed > 0 {
            self.emit(ColorSetEvent::Changed);
        }
        changed
    }

    /// Makes every color equal `other`, each kept in its own space.
    /// Returns how many changed.
    pub fn set_all(&mut self, other: &Color) -> usize {
        self.mutate_all(|color| {
            color.set_color(other, true);
        })
    }

    /// Sets component `component` to `value` in every color.
    /// Returns how many changed.
    ///
    /// # Errors
    ///
    /// Fails when the component is not of the constrained space.
    pub fn set_all_component(&mut self, component: &Component, value: f64) -> ColorResult<usize> {
        self.check(component, "set_all_component")?;
        Ok(self.mutate_all(|color| {
            color.set(component.index, value);
        }))
    }

    /// Normalized values of `component` across all colors.
    ///
    /// # Errors
    ///
    /// Fails when the component is not of the constrained space.
    pub fn get_all(&self, component: &Component) -> ColorResult<Vec<f64>> {
        self.check(component, "get_all")?;
        Ok(self.colors.iter().map(|(_, color)| component.normalize(color[component.index])).collect())
    }

    /// Normalized mean of `component` across all colors.
    ///
    /// # Errors
    ///
    /// Fails on an empty set or a component not of the constrained space.
    pub fn get_average(&self, component: &Component) -> ColorResult<f64> {
        self.check(component, "get_average")?;
        if self.colors.is_empty() {
            return Err(ColorError::EmptySet);
        }
        let sum: f64 = self.colors.iter().map(|(_, color)| color[component.index]).sum();
        Ok(component.normalize(sum / self.colors.len() as f64))
    }

    /// Shifts `component` in every color by the same delta so that its
    /// mean becomes `value`.
    ///
    /// Values are not normalized, so colors pushed past a bound keep their
    /// spread until read back through [`get`](Self::get). An empty set is
    /// left alone.
    ///
    /// # Errors
    ///
    /// Fails when the component is not of the constrained space.
    pub fn set_average(&mut self, component: &Component, value: f64) -> ColorResult<()> {
        self.check(component, "set_average")?;
        if self.colors.is_empty() {
            return Ok(());
        }
        let sum: f64 = self.colors.iter().map(|(_, color)| color[component.index]).sum();
        let delta = value - component.normalize(sum / self.colors.len() as f64);
        for (_, color) in &mut self.colors {
            let moved = color[component.index] + delta;
            color.set(component.index, moved);
        }
        self.emit(ColorSetEvent::Changed);
        Ok(())
    }

    /// Mean color, in the [best space](Self::best_space). Carries opacity
    /// unless the set is constrained to have none.
    ///
    /// # Errors
    ///
    /// Fails on an empty set.
    pub fn average(&self) -> ColorResult<Color> {
        let space = self.best_space().ok_or(ColorError::EmptySet)?;
        let len = space.component_count() + usize::from(self.alpha.unwrap_or(true));
        let mut values = vec![0.0; len];
        for (_, color) in &self.colors {
            let converted = if color.space().same_as(space.as_ref()) {
                Some(color.clone())
            } else {
                color.converted(&space)
            };
            if let Some(converted) = converted {
                for (i, value) in values.iter_mut().enumerate() {
                    *value += converted[i];
                }
            }
        }
        let count = self.colors.len() as f64;
        values.iter_mut().for_each(|value| *value /= count);
        Color::with_space(space, values)
    }

    /// True when every color equals the first. An empty set counts as same.
    pub fn is_same(&self) -> bool {
        match self.colors.first() {
            Some((_, first)) => self.colors.iter().all(|(_, color)| color == first),
            None => true,
        }
    }

    /// The constrained space, or else the space most colors are in. Ties go
    /// to the space that reached the count first.
    pub fn best_space(&self) -> Option<Arc<dyn Space>> {
        if let Some(space) = &self.space {
            return Some(space.clone());
        }
        let mut counts: Vec<(&Arc<dyn Space>, usize)> = Vec::new();
        let mut best = None;
        let mut biggest = 0;
        for (_, color) in &self.colors {
            let index = match counts.iter().position(|(space, _)| space.same_as(color.space().as_ref())) {
                Some(index) => index,
                None => {
                    counts.push((color.space(), 0));
                    counts.len() - 1
                }
            };
            counts[index].1 += 1;
            if counts[index].1 > biggest {
                biggest = counts[index].1;
                best = Some(counts[index].0.clone());
            }
        }
        best
    }

    /// True when `component` belongs to the constrained space.
    pub fn is_valid(&self, component: &Component) -> bool {
        self.space.as_ref().is_some_and(|space| space.component_type() == component.space_type)
    }

    /// Number of colors.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// True when the set holds no colors.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Iterates `(id, color)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Color)> {
        self.colors.iter().map(|(id, color)| (id, color))
    }

    fn check(&self, component: &Component, operation: &'static str) -> ColorResult<()> {
        if self.is_valid(component) {
            Ok(())
        } else {
            Err(ColorError::IncompatibleComponent { component: component.id.to_string(), operation })
        }
    }

    /// Stores `color` under `id` without sending events.
    fn insert(&mut self, id: String, color: &Color) -> bool {
        if let Some((_, existing)) = self.colors.iter_mut().find(|(cid, _)| *cid == id) {
            let was = existing.clone();
            existing.set_color(color, true);
            return was != *existing;
        }
        let mut copy = color.clone();
        if let Some(space) = &self.space {
            copy.convert(space);
        }
        if let Some(alpha) = self.alpha {
            copy.enable_opacity(alpha);
        }
        self.colors.push((id, copy));
        true
    }

    fn mutate_all(&mut self, mut f: impl FnMut(&mut Color)) -> usize {
        let mut changed = 0;
        for (_, color) in &mut self.colors {
            let was = color.clone();
            f(color);
            if was != *color {
                changed += 1;
            }
        }
        if changed > 0 {
            self.emit(ColorSetEvent::Changed);
        }
        changed
    }

    fn emit(&mut self, event: ColorSetEvent) {
        if self.blocked {
            return;
        }
        trace!(?event, colors = self.colors.len(), "color set event");
        self.blocked = true;
        for listener in &mut self.listeners {
            listener(event);
        }
        self.blocked = false;
    }
}

impl Default for ColorSet {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl fmt::Debug for ColorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorSet")
            .field("colors", &self.colors)
            .field("space", &self.space.as_ref().map(|space| space.name()))
            .field("alpha", &self.alpha)
            .field("grabbed", &self.grabbed)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
