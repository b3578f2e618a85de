//! # pigment-color
//!
//! Color values, color spaces and CSS color text for the pigment engine.
//!
//! - **Spaces** - RGB, HSL, HSV, Gray, CMYK, Lab/LCH, Oklab/Oklch,
//!   OkHSL/OkHSV, Luv/HSLuv, XYZ and ICC profile spaces behind one
//!   [`Space`] trait
//! - **Colors** - [`Color`] values with opacity, conversion, mixing and
//!   gamut checks, and [`ColorSet`] groups edited together
//! - **CSS** - a prefix-dispatched parser ([`Parsers`]) and per-space
//!   printers, including `icc-color()` fallbacks
//! - **Gamut mapping** - CSS Color 4 chroma reduction in Oklch
//!
//! # Architecture
//!
//! ```text
//!           Color  ----  Manager / CmsSpaces
//!             |               |
//!          Space trait  ------+
//!             |
//!   math to an anchor profile
//!             |
//!        pigment-icc  (lcms2 transforms between anchors)
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use pigment_color::{Color, SpaceType};
//!
//! let mut color = Color::parse("hsl(0 100% 50%)").unwrap();
//! assert_eq!(color.values(), &[0.0, 1.0, 0.5]);
//!
//! color.convert_to(SpaceType::Rgb);
//! assert_eq!(color.to_string(), "#ff0000");
//!
//! color.convert_to(SpaceType::Lab);
//! assert!(color.to_string().starts_with("lab("));
//! ```
//!
//! # Dependencies
//!
//! - [`pigment-icc`] - ICC profiles, transforms and gamut checks

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod cms_spaces;
mod color;
mod color_set;
mod components;
mod error;
mod gamut;
mod manager;
mod parser;
mod printer;
pub mod spaces;
pub mod utils;

pub use cms_spaces::CmsSpaces;
pub use color::Color;
pub use color_set::{ColorSet, ColorSetEvent};
pub use components::{Component, Components, Traits, Unit};
pub use error::{ColorError, ColorResult};
pub use gamut::{delta_e_ok, out_of_gamut, to_gamut_css};
pub use manager::Manager;
pub use parser::{ColorParser, Cursor, Parsed, ParsedColor, Parsers};
pub use printer::{format_number, CssPrinter};
pub use spaces::{
    CmsSpace, DeviceCmyk, Gray, Hsl, Hsluv, Hsv, Lab, Lch, LinearRgb, Luv, NamedColor, OkHsl, OkHsv, OkLab,
    OkLch, Rgb, Space, SpaceType, Xyz, Xyz50,
};

pub use pigment_icc as icc;

/// Prelude with commonly used types
pub mod prelude {
    pub use crate::{CmsSpaces, Color, ColorError, ColorResult, Manager, Space, SpaceType};
    pub use pigment_icc::{Intent, Profile};
}
