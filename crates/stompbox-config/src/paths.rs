//! Preset lookup on disk.
//!
//! User presets live in `<config dir>/stompbox/presets/`
//! (`~/.config/stompbox/presets/` on Linux).

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::factory_presets::get_factory_preset;
use crate::preset::Preset;

const APP_NAME: &str = "stompbox";
const PRESETS_SUBDIR: &str = "presets";

/// Directory for user presets. Falls back to `./stompbox/presets` when the
/// platform has no config directory.
pub fn user_presets_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join(PRESETS_SUBDIR)
}

/// Locates a preset file: `name` as a path, then `<name>.toml` in
/// `search_dir`.
pub fn find_preset_file(name: &str, search_dir: &Path) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }

    let filename = if name.ends_with(".toml") {
        name.to_string()
    } else {
        format!("{name}.toml")
    };
    let candidate = search_dir.join(filename);
    candidate.is_file().then_some(candidate)
}

/// Resolves a preset by path, user preset name or factory preset name, in
/// that order.
pub fn find_preset(name_or_path: &str) -> Result<Preset> {
    find_preset_in(name_or_path, &user_presets_dir())
}

/// [`find_preset`] with an explicit user preset directory.
pub fn find_preset_in(name_or_path: &str, search_dir: &Path) -> Result<Preset> {
    if let Some(path) = find_preset_file(name_or_path, search_dir) {
        return Preset::load(path);
    }
    get_factory_preset(name_or_path)
        .ok_or_else(|| ConfigError::PresetNotFound(name_or_path.to_string()))
}

/// Preset files in `dir`, sorted by name. Empty if the directory is missing.
pub fn list_presets_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut presets: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    presets.sort();
    presets
}
