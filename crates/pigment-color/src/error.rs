//! Error types for color operations.
//!
//! Malformed user text never produces an error: parsers return `None`.
//! Errors here cover invalid channel data, registry misuse and failures
//! bubbling up from the ICC layer.

use pigment_icc::IccError;
use thiserror::Error;

/// Color operation error.
#[derive(Debug, Error)]
pub enum ColorError {
    /// Channel data does not fit the color space.
    #[error("invalid values for {space}: expected {expected} channels, got {actual}")]
    InvalidValues {
        /// Name of the color space.
        space: String,
        /// Number of channels the space carries.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },

    /// No color space is registered under that type or name.
    #[error("unknown color space: {0}")]
    UnknownSpace(String),

    /// A space with the same type (or CMS name) is already registered.
    #[error("color space already registered: {0}")]
    DuplicateSpace(String),

    /// An SVG color space alias is already taken by another space.
    #[error("svg color space name already registered: {0}")]
    DuplicateSvgName(String),

    /// The conversion between two spaces failed.
    #[error("unsupported conversion: {from} -> {to}")]
    UnsupportedConversion {
        /// Source color space.
        from: String,
        /// Target color space.
        to: String,
    },

    /// Text could not be read as a color.
    #[error("parse error: {0}")]
    ParseError(String),

    /// Hex string is not in `#RRGGBBAA` form.
    #[error("badly formatted color, expected #RRGGBBAA: {0}")]
    InvalidHex(String),

    /// A component from another space was used on a color set.
    #[error("incompatible color component {component} in ColorSet::{operation}")]
    IncompatibleComponent {
        /// Component id.
        component: String,
        /// Set operation that rejected it.
        operation: &'static str,
    },

    /// The color set holds no colors.
    #[error("color set is empty")]
    EmptySet,

    /// ICC layer failure.
    #[error(transparent)]
    Icc(#[from] IccError),
}

/// Result type for color operations.
pub type ColorResult<T> = Result<T, ColorError>;
