//! ICC profile wrapper.

use crate::format::color_space_code;
use crate::{IccError, IccResult};
use base64::Engine;
use lcms2::{ColorSpaceSignature, Profile as LcmsProfile, ProfileClassSignature};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tracing::{debug, error};

const ICC_HEADER_LEN: usize = 128;

/// Device class of a profile, reduced to what the engine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileClass {
    /// Monitor profile (`mntr`).
    Display,
    /// Printer or press profile (`prtr`).
    Output,
    /// Input device profile (`scnr`).
    Input,
    /// Any other class (color space, abstract, link, named).
    Other,
}

/// An ICC color profile.
///
/// Owns exactly one native profile handle together with the identity data
/// read from it when it was opened: the 16-byte profile ID from the header
/// (hex), a SHA-256 checksum of the serialized bytes, the description text,
/// the color space signature and the device class.
///
/// # Example
///
/// ```rust
/// use pigment_icc::Profile;
///
/// let srgb = Profile::srgb();
/// assert_eq!(srgb.name(true), "sRGB-built-in");
/// assert_eq!(srgb.channels(), 3);
/// ```
pub struct Profile {
    inner: Mutex<LcmsProfile>,
    path: Option<PathBuf>,
    in_home: bool,
    id: String,
    checksum: String,
    description: String,
    color_space: ColorSpaceSignature,
    class: ProfileClass,
}

impl Profile {
    fn wrap(inner: LcmsProfile, path: Option<PathBuf>, in_home: bool) -> Self {
        let bytes = inner.icc().unwrap_or_else(|e| {
            error!(error = %e, "profile could not be serialized");
            Vec::new()
        });
        let checksum = hex(&Sha256::digest(&bytes));
        let id = match bytes.get(84..100) {
            Some(header_id) if header_id.iter().any(|b| *b != 0) => hex(header_id),
            _ => checksum.clone(),
        };
        let description = inner
            .info(lcms2::InfoType::Description, lcms2::Locale::none())
            .unwrap_or_default();
        let class = match inner.device_class() {
            ProfileClassSignature::DisplayClass => ProfileClass::Display,
            ProfileClassSignature::OutputClass => ProfileClass::Output,
            ProfileClassSignature::InputClass => ProfileClass::Input,
            _ => ProfileClass::Other,
        };
        let color_space = inner.color_space();
        Self {
            inner: Mutex::new(inner),
            path,
            in_home,
            id,
            checksum,
            description,
            color_space,
            class,
        }
    }

    /// Loads a profile from an ICC file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the .icc or .icm file
    /// * `in_home` - Whether the file came from a user profile directory
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or contains invalid data.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use pigment_icc::Profile;
    /// use std::path::Path;
    ///
    /// let profile = Profile::from_file(Path::new("monitor.icc"), false).unwrap();
    /// ```
    pub fn from_file(path: &Path, in_home: bool) -> IccResult<Self> {
        let inner = LcmsProfile::new_file(path)
            .map_err(|e| IccError::LoadFailed(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "loaded profile");
        Ok(Self::wrap(inner, Some(path.to_path_buf()), in_home))
    }

    /// Creates a profile from raw ICC data.
    ///
    /// # Arguments
    ///
    /// * `data` - Raw ICC profile bytes
    pub fn from_data(data: &[u8]) -> IccResult<Self> {
        let inner = LcmsProfile::new_icc(data).map_err(|e| IccError::InvalidProfile(e.to_string()))?;
        Ok(Self::wrap(inner, None, false))
    }

    /// Creates a profile from base64-encoded ICC data.
    pub fn from_base64(text: &str) -> IccResult<Self> {
        let data = base64::engine::general_purpose::STANDARD
            .decode(text.trim())
            .map_err(|e| IccError::InvalidProfile(format!("base64: {e}")))?;
        Self::from_data(&data)
    }

    /// Wraps an already opened lcms profile.
    pub fn from_lcms(inner: LcmsProfile) -> Self {
        Self::wrap(inner, None, false)
    }

    /// The shared built-in sRGB profile.
    pub fn srgb() -> Arc<Profile> {
        static CELL: OnceLock<Arc<Profile>> = OnceLock::new();
        CELL.get_or_init(|| Arc::new(Self::wrap(LcmsProfile::new_srgb(), None, false)))
            .clone()
    }

    /// The shared built-in linear sRGB profile (sRGB primaries, gamma 1.0).
    pub fn linear_rgb() -> Arc<Profile> {
        static CELL: OnceLock<Arc<Profile>> = OnceLock::new();
        CELL.get_or_init(|| {
            let primaries = lcms2::CIExyYTRIPLE {
                Red: lcms2::CIExyY { x: 0.64, y: 0.33, Y: 1.0 },
                Green: lcms2::CIExyY { x: 0.30, y: 0.60, Y: 1.0 },
                Blue: lcms2::CIExyY { x: 0.15, y: 0.06, Y: 1.0 },
            };
            Arc::new(Self::matrix_shaper(&primaries, "Linear sRGB built-in"))
        })
        .clone()
    }

    /// The shared D65 XYZ anchor profile.
    ///
    /// A gamma 1.0 matrix-shaper on the Rec.2020 primaries: its linear RGB
    /// values relate to CIE XYZ (D65) through a fixed 3x3 matrix, and the
    /// unbounded float path carries out-of-range values through unclipped.
    pub fn xyz_d65() -> Arc<Profile> {
        static CELL: OnceLock<Arc<Profile>> = OnceLock::new();
        CELL.get_or_init(|| {
            let primaries = lcms2::CIExyYTRIPLE {
                Red: lcms2::CIExyY { x: 0.708, y: 0.292, Y: 1.0 },
                Green: lcms2::CIExyY { x: 0.170, y: 0.797, Y: 1.0 },
                Blue: lcms2::CIExyY { x: 0.131, y: 0.046, Y: 1.0 },
            };
            Arc::new(Self::matrix_shaper(&primaries, "XYZ D65 built-in"))
        })
        .clone()
    }

    /// The shared CIE XYZ (D50) profile.
    pub fn xyz_d50() -> Arc<Profile> {
        static CELL: OnceLock<Arc<Profile>> = OnceLock::new();
        CELL.get_or_init(|| Arc::new(Self::wrap(LcmsProfile::new_xyz(), None, false)))
            .clone()
    }

    /// The shared CIE Lab (D50, v4) profile.
    pub fn lab() -> Arc<Profile> {
        static CELL: OnceLock<Arc<Profile>> = OnceLock::new();
        CELL.get_or_init(|| {
            let inner = LcmsProfile::new_lab4_context(lcms2::GlobalContext::new(), &lcms2::CIExyY::d50())
                .unwrap_or_else(|e| {
                    error!(error = %e, "failed to build Lab profile, using XYZ");
                    LcmsProfile::new_xyz()
                });
            Arc::new(Self::wrap(inner, None, false))
        })
        .clone()
    }

    fn matrix_shaper(primaries: &lcms2::CIExyYTRIPLE, description: &str) -> Self {
        let curve = lcms2::ToneCurve::new(1.0);
        let curves = [&curve, &curve, &curve];
        let inner = LcmsProfile::new_rgb(&d65_white(), primaries, &curves)
            .unwrap_or_else(|e| {
                error!(error = %e, "failed to build linear RGB profile, using sRGB");
                LcmsProfile::new_srgb()
            });
        let mut profile = Self::wrap(inner, None, false);
        profile.description = description.to_string();
        profile
    }

    /// Returns the profile description, optionally sanitized for use as an
    /// identifier (anything but ASCII alphanumerics, `-` and `_` becomes `-`).
    pub fn name(&self, sanitize: bool) -> String {
        if !sanitize {
            return self.description.clone();
        }
        self.description
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
            .collect()
    }

    /// Hex profile ID from the header, or the checksum when the header ID is zero.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Hex SHA-256 of the serialized profile bytes.
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    /// File the profile was loaded from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether the profile came from a user profile directory.
    pub fn in_home(&self) -> bool {
        self.in_home
    }

    /// Returns the color space signature.
    pub fn color_space(&self) -> ColorSpaceSignature {
        self.color_space
    }

    /// Returns the device class.
    pub fn profile_class(&self) -> ProfileClass {
        self.class
    }

    /// Number of color channels, 0 when the color space is not supported.
    pub fn channels(&self) -> usize {
        color_space_code(self.color_space).map_or(0, |(_, n)| n)
    }

    /// Monitor profiles are offered for display correction.
    pub fn is_for_display(&self) -> bool {
        self.class == ProfileClass::Display
    }

    /// Printer profiles are offered for separations and proofing.
    pub fn is_output(&self) -> bool {
        self.class == ProfileClass::Output
    }

    /// Exports the profile as ICC data.
    pub fn to_bytes(&self) -> IccResult<Vec<u8>> {
        self.lock().icc().map_err(|e| IccError::CreateFailed(e.to_string()))
    }

    /// Exports the profile as base64-encoded ICC data.
    pub fn dump_base64(&self) -> IccResult<String> {
        Ok(base64::engine::general_purpose::STANDARD.encode(self.to_bytes()?))
    }

    fn lock(&self) -> MutexGuard<'_, LcmsProfile> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PartialEq for Profile {
    fn eq(&self, other: &Self) -> bool {
        self.checksum == other.checksum
    }
}

impl std::fmt::Debug for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profile")
            .field("description", &self.description)
            .field("color_space", &self.color_space)
            .field("class", &self.class)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Runs `f` with the native handles of `profiles`, in the same order.
///
/// Each distinct profile is locked once, in address order, so the same
/// profile may appear several times and concurrent callers cannot deadlock.
pub(crate) fn with_handles<R>(profiles: &[&Profile], f: impl FnOnce(&[&LcmsProfile]) -> R) -> R {
    let mut unique: Vec<&Profile> = Vec::with_capacity(profiles.len());
    let mut slots = Vec::with_capacity(profiles.len());
    for profile in profiles {
        match unique.iter().position(|u| std::ptr::eq(*u, *profile)) {
            Some(i) => slots.push(i),
            None => {
                slots.push(unique.len());
                unique.push(profile);
            }
        }
    }

    let mut order: Vec<usize> = (0..unique.len()).collect();
    order.sort_by_key(|&i| unique[i] as *const Profile as usize);
    let mut guards: Vec<Option<MutexGuard<'_, LcmsProfile>>> = unique.iter().map(|_| None).collect();
    for i in order {
        guards[i] = Some(unique[i].lock());
    }

    let handles: Vec<&LcmsProfile> = slots.iter().filter_map(|&i| guards[i].as_deref()).collect();
    f(&handles)
}

/// Checks whether `path` looks like an ICC profile: a header of at least
/// 128 bytes carrying the `acsp` signature and a declared size that fits
/// the file.
pub fn is_icc_file(path: &Path) -> bool {
    let Ok(mut file) = File::open(path) else {
        return false;
    };
    let len = file.metadata().map(|m| m.len()).unwrap_or(0);
    let mut header = [0u8; ICC_HEADER_LEN];
    if file.read_exact(&mut header).is_err() {
        return false;
    }
    let declared = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as u64;
    &header[36..40] == b"acsp" && declared >= ICC_HEADER_LEN as u64 && declared <= len
}

/// D65 white point.
fn d65_white() -> lcms2::CIExyY {
    lcms2::CIExyY { x: 0.3127, y: 0.3290, Y: 1.0 }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_srgb() {
        let profile = Profile::srgb();
        assert_eq!(profile.color_space(), ColorSpaceSignature::RgbData);
        assert_eq!(profile.name(false), "sRGB built-in");
        assert_eq!(profile.name(true), "sRGB-built-in");
        assert_eq!(profile.checksum().len(), 64);
        assert!(Arc::ptr_eq(&profile, &Profile::srgb()));
    }

    #[test]
    fn test_builtin_spaces() {
        assert_eq!(Profile::xyz_d50().color_space(), ColorSpaceSignature::XYZData);
        assert_eq!(Profile::lab().color_space(), ColorSpaceSignature::LabData);
        assert_eq!(Profile::xyz_d65().channels(), 3);
        assert_eq!(Profile::linear_rgb().name(true), "Linear-sRGB-built-in");
        assert_ne!(*Profile::linear_rgb(), *Profile::srgb());
    }

    #[test]
    fn test_bytes_round_trip() {
        let srgb = Profile::srgb();
        let data = srgb.to_bytes().unwrap();
        let reloaded = Profile::from_data(&data).unwrap();
        assert_eq!(reloaded.color_space(), ColorSpaceSignature::RgbData);
        assert_eq!(reloaded.name(false), srgb.name(false));

        let encoded = srgb.dump_base64().unwrap();
        let decoded = Profile::from_base64(&encoded).unwrap();
        assert_eq!(decoded.checksum(), reloaded.checksum());
    }

    #[test]
    fn test_invalid_data() {
        assert!(Profile::from_data(b"not a profile").is_err());
        assert!(Profile::from_base64("%%%").is_err());
    }

    #[test]
    fn test_is_icc_file() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("srgb.icc");
        std::fs::write(&good, Profile::srgb().to_bytes().unwrap()).unwrap();
        assert!(is_icc_file(&good));

        let bad = dir.path().join("notes.icc");
        let mut f = File::create(&bad).unwrap();
        f.write_all(&[0u8; 200]).unwrap();
        assert!(!is_icc_file(&bad));

        assert!(!is_icc_file(&dir.path().join("missing.icc")));
    }

    #[test]
    fn test_with_handles_same_profile_twice() {
        let srgb = Profile::srgb();
        let lab = Profile::lab();
        let spaces = with_handles(&[&*srgb, &*lab, &*srgb], |h| {
            h.iter().map(|p| p.color_space()).collect::<Vec<_>>()
        });
        assert_eq!(
            spaces,
            vec![ColorSpaceSignature::RgbData, ColorSpaceSignature::LabData, ColorSpaceSignature::RgbData]
        );
    }
}
