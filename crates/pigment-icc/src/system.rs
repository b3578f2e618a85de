//! Discovery of installed ICC profiles.
//!
//! A [`ProfileSystem`] scans a list of directories for `.icc` and `.icm`
//! files and keeps the loaded profiles for lookup by name, ID or path. The
//! directory list can come from a small YAML document:
//!
//! ```yaml
//! directories:
//!   - path: /usr/share/color/icc
//!   - path: ~/.local/share/color/icc
//!     user: true
//! ```

use crate::{is_icc_file, IccError, IccResult, Profile};
use glob::MatchOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One profile directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDir {
    /// Directory to scan (not recursive).
    pub path: PathBuf,
    /// Whether profiles found here belong to the user rather than the system.
    #[serde(default)]
    pub user: bool,
}

/// Profile directory configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDirsConfig {
    /// Directories to scan, in order.
    #[serde(default)]
    pub directories: Vec<ProfileDir>,
}

impl ProfileDirsConfig {
    /// Parses a configuration from YAML text.
    pub fn from_yaml(text: &str) -> IccResult<Self> {
        serde_yaml::from_str(text).map_err(|e| IccError::Config(e.to_string()))
    }

    /// Loads a configuration file.
    pub fn load(path: &Path) -> IccResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text).map_err(|e| IccError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Serializes the configuration as YAML.
    pub fn to_yaml(&self) -> IccResult<String> {
        serde_yaml::to_string(self).map_err(|e| IccError::Config(e.to_string()))
    }
}

/// Registry of ICC profiles found on disk.
///
/// # Example
///
/// ```rust,no_run
/// use pigment_icc::ProfileSystem;
///
/// let mut system = ProfileSystem::new();
/// system.add_directory("/usr/share/color/icc", false);
/// system.refresh();
/// for profile in system.display_profiles() {
///     println!("{}", profile.name(false));
/// }
/// ```
#[derive(Debug, Default)]
pub struct ProfileSystem {
    directories: Vec<ProfileDir>,
    profiles: Vec<Arc<Profile>>,
}

impl ProfileSystem {
    /// Creates an empty system with no directories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a system from a directory configuration and scans it.
    pub fn from_config(config: &ProfileDirsConfig) -> Self {
        let mut system = Self { directories: config.directories.clone(), profiles: Vec::new() };
        system.refresh();
        system
    }

    /// Appends a directory to scan. Takes effect on the next [`refresh`](Self::refresh).
    pub fn add_directory(&mut self, path: impl Into<PathBuf>, user: bool) {
        self.directories.push(ProfileDir { path: path.into(), user });
    }

    /// Forgets all directories (loaded profiles stay until the next refresh).
    pub fn clear_directories(&mut self) {
        self.directories.clear();
    }

    /// Directories that will be scanned.
    pub fn directories(&self) -> &[ProfileDir] {
        &self.directories
    }

    /// Rescans every directory and replaces the loaded profile list.
    ///
    /// Files that are not ICC profiles or fail to load are skipped with a
    /// warning, as are profiles whose name is already taken by a profile
    /// with a different ID. Returns the number of profiles loaded.
    pub fn refresh(&mut self) -> usize {
        let mut profiles: Vec<Arc<Profile>> = Vec::new();
        let options = MatchOptions { case_sensitive: false, ..MatchOptions::default() };

        for dir in &self.directories {
            let base = glob::Pattern::escape(&dir.path.to_string_lossy());
            for ext in ["icc", "icm"] {
                let pattern = format!("{base}/*.{ext}");
                let entries = match glob::glob_with(&pattern, options) {
                    Ok(entries) => entries,
                    Err(e) => {
                        warn!(pattern = %pattern, error = %e, "bad profile directory pattern");
                        continue;
                    }
                };
                for path in entries.flatten() {
                    if !is_icc_file(&path) {
                        warn!(path = %path.display(), "not an ICC profile, skipping");
                        continue;
                    }
                    let profile = match Profile::from_file(&path, dir.user) {
                        Ok(profile) => profile,
                        Err(e) => {
                            warn!(error = %e, "skipping profile");
                            continue;
                        }
                    };
                    let name = profile.name(false);
                    if let Some(other) = profiles.iter().find(|p| p.name(false) == name) {
                        if other.id() != profile.id() {
                            warn!(
                                path = %path.display(),
                                name = %name,
                                "profile name already used by a different profile, skipping"
                            );
                        }
                        continue;
                    }
                    debug!(path = %path.display(), name = %name, "registered profile");
                    profiles.push(Arc::new(profile));
                }
            }
        }

        profiles.sort_by_key(|p| p.name(false));
        info!(count = profiles.len(), "profiles loaded");
        self.profiles = profiles;
        self.profiles.len()
    }

    /// All loaded profiles, sorted by name.
    pub fn profiles(&self) -> &[Arc<Profile>] {
        &self.profiles
    }

    /// Monitor profiles.
    pub fn display_profiles(&self) -> Vec<Arc<Profile>> {
        self.profiles.iter().filter(|p| p.is_for_display()).cloned().collect()
    }

    /// Printer and press profiles.
    pub fn output_profiles(&self) -> Vec<Arc<Profile>> {
        self.profiles.iter().filter(|p| p.is_output()).cloned().collect()
    }

    /// Looks a profile up by name, ID or file path.
    pub fn profile(&self, key: &str) -> Option<Arc<Profile>> {
        self.profiles
            .iter()
            .find(|p| {
                p.name(false) == key
                    || p.name(true) == key
                    || p.id() == key
                    || p.path().is_some_and(|path| path == Path::new(key))
            })
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_yaml() {
        let cfg = ProfileDirsConfig::from_yaml(
            "directories:\n  - path: /usr/share/color/icc\n  - path: /home/me/icc\n    user: true\n",
        )
        .unwrap();
        assert_eq!(cfg.directories.len(), 2);
        assert!(!cfg.directories[0].user);
        assert!(cfg.directories[1].user);

        let back = ProfileDirsConfig::from_yaml(&cfg.to_yaml().unwrap()).unwrap();
        assert_eq!(back, cfg);
        assert!(ProfileDirsConfig::from_yaml("directories: 3").is_err());
    }

    #[test]
    fn test_refresh_and_lookup() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("srgb.icc"), Profile::srgb().to_bytes().unwrap()).unwrap();
        std::fs::write(dir.path().join("lab.ICM"), Profile::lab().to_bytes().unwrap()).unwrap();
        std::fs::write(dir.path().join("junk.icc"), b"definitely not a profile").unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"text").unwrap();

        let mut system = ProfileSystem::new();
        system.add_directory(dir.path(), true);
        assert_eq!(system.refresh(), 2);

        let names: Vec<String> = system.profiles().iter().map(|p| p.name(false)).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);

        let srgb = system.profile("sRGB built-in").unwrap();
        assert!(srgb.in_home());
        assert!(srgb.is_for_display());
        assert_eq!(system.display_profiles().len(), 1);
        assert!(system.output_profiles().is_empty());

        let by_id = system.profile(srgb.id()).unwrap();
        assert!(Arc::ptr_eq(&by_id, &srgb));
        let by_path = system.profile(&dir.path().join("srgb.icc").to_string_lossy()).unwrap();
        assert!(Arc::ptr_eq(&by_path, &srgb));
        assert!(system.profile("nope").is_none());
    }

    #[test]
    fn test_duplicate_name_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = Profile::srgb().to_bytes().unwrap();
        std::fs::write(dir.path().join("a.icc"), &bytes).unwrap();
        std::fs::write(dir.path().join("b.icc"), &bytes).unwrap();

        let mut system = ProfileSystem::new();
        system.add_directory(dir.path(), false);
        assert_eq!(system.refresh(), 1);
    }

    #[test]
    fn test_missing_directory() {
        let mut system = ProfileSystem::new();
        system.add_directory("/definitely/not/here", false);
        assert_eq!(system.refresh(), 0);
        system.clear_directories();
        assert!(system.directories().is_empty());
    }
}
