//! CLI command implementations

pub mod convert;
pub mod gamut;
pub mod parse;
pub mod profile;
pub mod profiles;

use crate::ProfileOptions;
use anyhow::{bail, Context, Result};
use pigment_color::{format_number, Color, ColorError, Manager, Space, Traits};
use pigment_icc::{Profile, ProfileDirsConfig, ProfileSystem};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Environment variable with extra profile directories, separated like `PATH`.
pub const PROFILE_DIRS_ENV: &str = "PIGMENT_PROFILE_DIRS";

/// Parses CSS color text.
pub fn parse_color(text: &str) -> Result<Color> {
    Color::parse(text).ok_or_else(|| ColorError::ParseError(text.to_string()).into())
}

/// Finds a space by CSS `color()` name or space name, ignoring case.
pub fn find_space(name: &str) -> Result<Arc<dyn Space>> {
    let manager = Manager::get();
    if let Some(space) = manager.find_svg_space(name) {
        return Ok(space);
    }
    manager
        .spaces(Traits::NONE)
        .into_iter()
        .find(|s| s.name().eq_ignore_ascii_case(name) || s.svg_names().iter().any(|n| n.eq_ignore_ascii_case(name)))
        .ok_or_else(|| ColorError::UnknownSpace(name.to_string()).into())
}

/// Scans the configured profile directories.
pub fn profile_system(options: &ProfileOptions) -> Result<ProfileSystem> {
    let mut system = match &options.config {
        Some(path) => {
            let config = ProfileDirsConfig::load(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?;
            ProfileSystem::from_config(&config)
        }
        None => ProfileSystem::new(),
    };
    if let Some(dirs) = std::env::var_os(PROFILE_DIRS_ENV) {
        for dir in std::env::split_paths(&dirs) {
            system.add_directory(dir, false);
        }
    }
    for dir in &options.dirs {
        system.add_directory(dir, true);
    }
    system.refresh();
    Ok(system)
}

/// Loads a profile from a file, or looks it up by name or ID in the
/// profile directories.
pub fn load_profile(key: &str, options: &ProfileOptions) -> Result<Arc<Profile>> {
    let path = Path::new(key);
    if path.is_file() {
        debug!(path = %path.display(), "loading profile file");
        let profile = Profile::from_file(path, false)
            .with_context(|| format!("Failed to load profile: {}", path.display()))?;
        return Ok(Arc::new(profile));
    }
    match profile_system(options)?.profile(key) {
        Some(profile) => Ok(profile),
        None => bail!("No profile file or installed profile named '{key}'"),
    }
}

/// Space separated values with at most three decimals.
pub fn format_values(values: &[f64]) -> String {
    values.iter().map(|v| format_number(*v)).collect::<Vec<_>>().join(" ")
}
