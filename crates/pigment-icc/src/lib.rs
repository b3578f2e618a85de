//! # pigment-icc
//!
//! ICC color management layer for the pigment color engine.
//!
//! This crate wraps Little CMS 2 behind a small set of safe types:
//!
//! - [`Profile`] owns one native profile handle plus its identity
//!   (profile ID, content checksum, description, color space, class)
//! - [`Transform`] converts pixels between two profiles with a rendering
//!   intent, optional alpha handling and optional soft proofing
//! - [`GamutChecker`] answers "is this color reproducible on the target"
//! - [`BufferTransform`] converts whole interleaved float images
//! - [`ProfileSystem`] discovers `.icc`/`.icm` files in profile directories
//!
//! # Example
//!
//! ```rust
//! use pigment_icc::{Intent, Profile, Transform};
//!
//! let srgb = Profile::srgb();
//! let lab = Profile::lab();
//!
//! let transform = Transform::<f64>::new(&srgb, &lab, Intent::RelativeColorimetric).unwrap();
//! // Values travel in the normalized float encoding, so Lab L comes out in 0..1.
//! let mut values = vec![1.0, 1.0, 1.0];
//! transform.apply(&mut values).unwrap();
//! assert!((values[0] - 1.0).abs() < 1e-3);
//! ```
//!
//! # Thread Safety
//!
//! A [`Profile`] serializes access to its native handle, so profiles are
//! `Send + Sync` and can be shared through `Arc`. Transforms are created on
//! demand and are not cached.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod buffer;
mod error;
mod format;
mod gamut;
mod profile;
mod system;
mod transform;

pub use buffer::{premultiply, splice, BufferTransform};
pub use error::{IccError, IccResult};
pub use format::{pixel_format, Alpha, Sample};
pub use gamut::GamutChecker;
pub use profile::{is_icc_file, Profile, ProfileClass};
pub use system::{ProfileDir, ProfileDirsConfig, ProfileSystem};
pub use transform::{Transform, TransformOptions};

use std::fmt;
use std::str::FromStr;

/// Rendering intent for color transformations.
///
/// Determines how out-of-gamut colors are handled during conversion.
/// Besides the four ICC intents, color spaces may carry [`Intent::Unknown`]
/// (no preference, resolved to perceptual) and [`Intent::Auto`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Intent {
    /// No preference recorded. Treated as perceptual at transform time.
    #[default]
    Unknown,

    /// Let the engine decide. Treated as perceptual at transform time.
    Auto,

    /// Compresses the source gamut to fit within the destination.
    ///
    /// Best for photographic images.
    Perceptual,

    /// Maps source white to destination white and clips the rest.
    ///
    /// Black point compensation is enabled for this intent.
    RelativeColorimetric,

    /// Relative colorimetric without black point compensation.
    RelativeColorimetricNoBpc,

    /// Maintains saturation at the expense of accuracy.
    Saturation,

    /// Colorimetric match without white point adaptation.
    AbsoluteColorimetric,
}

impl Intent {
    /// All intents, in declaration order.
    pub const ALL: [Intent; 7] = [
        Intent::Unknown,
        Intent::Auto,
        Intent::Perceptual,
        Intent::RelativeColorimetric,
        Intent::RelativeColorimetricNoBpc,
        Intent::Saturation,
        Intent::AbsoluteColorimetric,
    ];

    /// Stable kebab-case identifier, as used in configuration and on the CLI.
    pub fn id(self) -> &'static str {
        match self {
            Intent::Unknown => "unknown",
            Intent::Auto => "auto",
            Intent::Perceptual => "perceptual",
            Intent::RelativeColorimetric => "relative-colorimetric",
            Intent::RelativeColorimetricNoBpc => "relative-colorimetric-nobpc",
            Intent::Saturation => "saturation",
            Intent::AbsoluteColorimetric => "absolute-colorimetric",
        }
    }

    /// Whether transforms built with this intent use black point compensation.
    ///
    /// Only plain relative colorimetric does.
    pub fn black_point_compensation(self) -> bool {
        self == Intent::RelativeColorimetric
    }
}

impl From<Intent> for lcms2::Intent {
    fn from(intent: Intent) -> Self {
        match intent {
            Intent::Unknown | Intent::Auto | Intent::Perceptual => lcms2::Intent::Perceptual,
            Intent::RelativeColorimetric | Intent::RelativeColorimetricNoBpc => {
                lcms2::Intent::RelativeColorimetric
            }
            Intent::Saturation => lcms2::Intent::Saturation,
            Intent::AbsoluteColorimetric => lcms2::Intent::AbsoluteColorimetric,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Intent {
    type Err = IccError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        Intent::ALL
            .into_iter()
            .find(|intent| intent.id() == key)
            .ok_or_else(|| IccError::UnknownIntent(s.to_string()))
    }
}
