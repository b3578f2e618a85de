//! Channel metadata for each color space.
//!
//! A [`Components`] set lists the channels of one space in order, with the
//! unit each is presented in and the scale that maps the stored 0..1 value
//! to that unit. Sets are built once and shared for the life of the process.

use crate::SpaceType;
use std::collections::HashMap;
use std::ops::{BitAnd, BitOr};
use std::sync::OnceLock;

/// How a space is meant to be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Traits(u8);

impl Traits {
    /// No traits.
    pub const NONE: Traits = Traits(0);
    /// Offered in color pickers.
    pub const PICKER: Traits = Traits(1);
    /// Internal use: has converters and CSS output but no picker.
    pub const INTERNAL: Traits = Traits(2);
    /// Only reachable through an ICC profile; no closed-form math.
    pub const CMS: Traits = Traits(4);

    /// True when any trait in `other` is set.
    pub fn intersects(self, other: Traits) -> bool {
        self.0 & other.0 != 0
    }

    /// True when every trait in `other` is set.
    pub fn contains(self, other: Traits) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Traits {
    type Output = Traits;

    fn bitor(self, rhs: Traits) -> Traits {
        Traits(self.0 | rhs.0)
    }
}

impl BitAnd for Traits {
    type Output = Traits;

    fn bitand(self, rhs: Traits) -> Traits {
        Traits(self.0 & rhs.0)
    }
}

/// Presentation unit of a channel. Dictates its scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    /// One byte, 0..255.
    EightBit,
    /// 0..100%.
    Percent,
    /// 0..360 degrees.
    Degree,
    /// 0..1024, for linear gray.
    Linear1024,
    /// 0..40, OkLCH chroma where 100% is 0.4.
    Chroma40,
}

impl Unit {
    /// Multiplier from the stored 0..1 value to the presented value.
    pub fn scale(self) -> u32 {
        match self {
            Unit::EightBit => 255,
            Unit::Percent => 100,
            Unit::Degree => 360,
            Unit::Linear1024 => 1024,
            Unit::Chroma40 => 40,
        }
    }
}

/// One channel of a color space.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// Space this channel belongs to.
    pub space_type: SpaceType,
    /// Position in the value vector.
    pub index: usize,
    /// Short identifier, e.g. `"r"` or `"alpha"`.
    pub id: &'static str,
    /// Label.
    pub name: &'static str,
    /// Longer description.
    pub tip: &'static str,
    /// Presentation unit.
    pub unit: Unit,
    /// Multiplier from 0..1 to the unit.
    pub scale: u32,
}

impl Component {
    fn new(id: &'static str, name: &'static str, tip: &'static str, unit: Unit) -> Self {
        Self { space_type: SpaceType::None, index: 0, id, name, tip, unit, scale: unit.scale() }
    }

    /// Clamps `value` to 0..1, except hues which wrap around.
    pub fn normalize(&self, value: f64) -> f64 {
        if self.unit == Unit::Degree && !(0.0..=1.0).contains(&value) {
            return value - value.floor();
        }
        value.clamp(0.0, 1.0)
    }
}

/// The ordered channels of one color space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Components {
    space_type: SpaceType,
    wheel_type: SpaceType,
    traits: Traits,
    components: Vec<Component>,
}

impl Components {
    fn new(space_type: SpaceType, wheel_type: SpaceType, traits: Traits, components: Vec<Component>) -> Self {
        let components = components
            .into_iter()
            .enumerate()
            .map(|(index, c)| Component { space_type, index, ..c })
            .collect();
        Self { space_type, wheel_type, traits, components }
    }

    /// Channel set for `space_type`, optionally followed by an alpha channel.
    ///
    /// Unknown types get an empty set.
    pub fn get(space_type: SpaceType, alpha: bool) -> &'static Components {
        static TABLES: OnceLock<[HashMap<SpaceType, Components>; 2]> = OnceLock::new();
        static EMPTY: OnceLock<Components> = OnceLock::new();

        let tables = TABLES.get_or_init(|| [build(false), build(true)]);
        tables[alpha as usize]
            .get(&space_type)
            .unwrap_or_else(|| EMPTY.get_or_init(Components::default))
    }

    /// Space the channels belong to.
    pub fn space_type(&self) -> SpaceType {
        self.space_type
    }

    /// Space a color wheel should use when picking in this space.
    pub fn wheel_type(&self) -> SpaceType {
        self.wheel_type
    }

    /// Usage traits.
    pub fn traits(&self) -> Traits {
        self.traits
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// True when the set has no channels.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Iterates the channels in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Component> {
        self.components.iter()
    }
}

impl std::ops::Index<usize> for Components {
    type Output = Component;

    fn index(&self, index: usize) -> &Component {
        &self.components[index]
    }
}

impl<'a> IntoIterator for &'a Components {
    type Item = &'a Component;
    type IntoIter = std::slice::Iter<'a, Component>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.iter()
    }
}

fn table() -> Vec<Components> {
    use SpaceType as T;
    use Unit::*;
    let c = Component::new;

    vec![
        Components::new(T::Rgb, T::Rgb, Traits::PICKER, vec![
            c("r", "R", "Red", EightBit),
            c("g", "G", "Green", EightBit),
            c("b", "B", "Blue", EightBit),
        ]),
        Components::new(T::LinearRgb, T::None, Traits::INTERNAL, vec![
            c("r", "lR", "Linear Red", EightBit),
            c("g", "lG", "Linear Green", EightBit),
            c("b", "lB", "Linear Blue", EightBit),
        ]),
        Components::new(T::Hsl, T::Hsl, Traits::PICKER, vec![
            c("h", "H", "Hue", Degree),
            c("s", "S", "Saturation", Percent),
            c("l", "L", "Lightness", Percent),
        ]),
        Components::new(T::Hsv, T::Hsv, Traits::PICKER, vec![
            c("h", "H", "Hue", Degree),
            c("s", "S", "Saturation", Percent),
            c("v", "V", "Value", Percent),
        ]),
        Components::new(T::Cmyk, T::None, Traits::PICKER, vec![
            c("c", "C", "Cyan", Percent),
            c("m", "M", "Magenta", Percent),
            c("y", "Y", "Yellow", Percent),
            c("k", "K", "Black", Percent),
        ]),
        Components::new(T::Cmy, T::None, Traits::PICKER, vec![
            c("c", "C", "Cyan", Percent),
            c("m", "M", "Magenta", Percent),
            c("y", "Y", "Yellow", Percent),
        ]),
        Components::new(T::Hsluv, T::Hsluv, Traits::PICKER, vec![
            c("h", "H*", "Hue", Degree),
            c("s", "S*", "Saturation", Percent),
            c("l", "L*", "Lightness", Percent),
        ]),
        Components::new(T::Okhsl, T::Okhsl, Traits::PICKER, vec![
            c("h", "Hok", "Hue", Degree),
            c("s", "Sok", "Saturation", Percent),
            c("l", "Lok", "Lightness", Percent),
        ]),
        Components::new(T::Okhsv, T::Okhsv, Traits::INTERNAL, vec![
            c("h", "Hok", "Hue", Degree),
            c("s", "Sok", "Saturation", Percent),
            c("v", "Vok", "Value", Percent),
        ]),
        Components::new(T::Lch, T::None, Traits::INTERNAL, vec![
            c("l", "L", "Luminance", EightBit),
            c("c", "C", "Chroma", EightBit),
            c("h", "H", "Hue", Degree),
        ]),
        Components::new(T::Luv, T::None, Traits::INTERNAL, vec![
            c("l", "L", "Luminance", Percent),
            c("u", "U", "Chroma U", Percent),
            c("v", "V", "Chroma V", Percent),
        ]),
        Components::new(T::Oklab, T::None, Traits::INTERNAL, vec![
            c("l", "Lok", "Lightness", Percent),
            c("a", "Aok", "Component A", Percent),
            c("b", "Bok", "Component B", Percent),
        ]),
        Components::new(T::Oklch, T::Okhsl, Traits::PICKER, vec![
            c("l", "Lok", "Lightness", Percent),
            c("c", "Cok", "Chroma", Chroma40),
            c("h", "Hok", "Hue", Degree),
        ]),
        Components::new(T::Lab, T::None, Traits::INTERNAL, vec![
            c("l", "L", "Lightness", Percent),
            c("a", "A", "Component A", EightBit),
            c("b", "B", "Component B", EightBit),
        ]),
        Components::new(T::YCbCr, T::None, Traits::CMS, vec![
            c("y", "Y", "Y", EightBit),
            c("cb", "Cb", "Cb", EightBit),
            c("cr", "Cr", "Cr", EightBit),
        ]),
        Components::new(T::Xyz, T::None, Traits::INTERNAL, vec![
            c("x", "X", "X", EightBit),
            c("y", "Y", "Y", EightBit),
            c("z", "Z", "Z", EightBit),
        ]),
        Components::new(T::Xyz50, T::None, Traits::INTERNAL, vec![
            c("x", "X", "X", EightBit),
            c("y", "Y", "Y", EightBit),
            c("z", "Z", "Z", EightBit),
        ]),
        Components::new(T::Yxy, T::None, Traits::INTERNAL, vec![
            c("y1", "Y", "Y", EightBit),
            c("x", "x", "x", EightBit),
            c("y2", "y", "y", EightBit),
        ]),
        Components::new(T::Gray, T::None, Traits::INTERNAL, vec![c("gray", "G", "Gray", Linear1024)]),
    ]
}

fn build(alpha: bool) -> HashMap<SpaceType, Components> {
    table()
        .into_iter()
        .map(|mut set| {
            if alpha {
                // "alpha" rather than "a" so it never clashes with Lab's a
                let index = set.components.len();
                set.components.push(Component {
                    space_type: set.space_type,
                    index,
                    ..Component::new("alpha", "A", "Alpha", Unit::Percent)
                });
            }
            (set.space_type, set)
        })
        .collect()
}
