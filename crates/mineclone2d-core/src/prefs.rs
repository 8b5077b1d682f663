//! Persisted preferences.
//!
//! Preferences live in a flat string key/value store. [`load_settings`]
//! parses them into typed [`Settings`]; missing or malformed values trigger a
//! single rewrite of the defaults followed by one retry. Writes after startup
//! are best-effort: a failing store only costs persistence, never the session.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::atlas::TileId;
use crate::grid::GridConfig;

/// Store keys.
pub mod keys {
    pub const TILE_SIZE: &str = "tile_size";
    pub const X_TILES_COUNT: &str = "x_tiles_count";
    pub const Y_TILES_COUNT: &str = "y_tiles_count";
    pub const RANDOM_MODE: &str = "random_mode";
    pub const PAINT_MODE: &str = "paint_mode";
    pub const BLOCK_LAST_INDEX: &str = "block_last_index";
    pub const FIRST_TIMER: &str = "first_timer";

    pub const ALL: [&str; 7] = [
        TILE_SIZE,
        X_TILES_COUNT,
        Y_TILES_COUNT,
        RANDOM_MODE,
        PAINT_MODE,
        BLOCK_LAST_INDEX,
        FIRST_TIMER,
    ];
}

/// Errors from a preference store backend.
#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("preferences storage is unavailable")]
    Unavailable,

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed preferences file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from turning stored strings into [`Settings`].
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("preference '{0}' is not set")]
    Missing(&'static str),

    #[error("preference '{key}' has invalid value '{value}'")]
    Invalid { key: &'static str, value: String },

    #[error("unknown preference '{0}'")]
    UnknownKey(String),

    #[error(
        "preferences are still invalid after resetting to defaults ({cause}); \
         clear the stored preferences and try again"
    )]
    Unrecoverable { cause: Box<SettingsError> },

    #[error(transparent)]
    Store(#[from] PrefsError),
}

/// A flat string key/value store.
pub trait PrefsStore {
    fn get(&self, key: &str) -> Result<Option<String>, PrefsError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), PrefsError>;

    /// Remove every key.
    fn clear(&mut self) -> Result<(), PrefsError>;

    /// Snapshot of every stored pair.
    fn entries(&self) -> Result<BTreeMap<String, String>, PrefsError>;
}

impl<T: PrefsStore + ?Sized> PrefsStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, PrefsError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PrefsError> {
        (**self).set(key, value)
    }

    fn clear(&mut self) -> Result<(), PrefsError> {
        (**self).clear()
    }

    fn entries(&self) -> Result<BTreeMap<String, String>, PrefsError> {
        (**self).entries()
    }
}

/// In-process store. A disabled store fails every operation, like browser
/// storage that has been turned off.
#[derive(Debug, Clone, Default)]
pub struct MemoryPrefsStore {
    values: BTreeMap<String, String>,
    disabled: bool,
}

impl MemoryPrefsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disabled() -> Self {
        Self {
            values: BTreeMap::new(),
            disabled: true,
        }
    }

    fn check(&self) -> Result<(), PrefsError> {
        if self.disabled {
            Err(PrefsError::Unavailable)
        } else {
            Ok(())
        }
    }
}

impl PrefsStore for MemoryPrefsStore {
    fn get(&self, key: &str) -> Result<Option<String>, PrefsError> {
        self.check()?;
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PrefsError> {
        self.check()?;
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), PrefsError> {
        self.check()?;
        self.values.clear();
        Ok(())
    }

    fn entries(&self) -> Result<BTreeMap<String, String>, PrefsError> {
        self.check()?;
        Ok(self.values.clone())
    }
}

/// JSON-file store, one object of string values.
#[derive(Debug, Clone)]
pub struct FilePrefsStore {
    path: PathBuf,
}

impl FilePrefsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the user config directory.
    pub fn open_default() -> Result<Self, PrefsError> {
        Self::default_path()
            .map(Self::new)
            .ok_or(PrefsError::Unavailable)
    }

    /// `<config dir>/mineclone2d/prefs.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("mineclone2d").join("prefs.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> PrefsError {
        PrefsError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, PrefsError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.io_err(e)),
        };
        serde_json::from_str(&text).map_err(|source| PrefsError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<(), PrefsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        let json = serde_json::to_string_pretty(values).map_err(|source| PrefsError::Malformed {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(|e| self.io_err(e))
    }
}

impl PrefsStore for FilePrefsStore {
    fn get(&self, key: &str) -> Result<Option<String>, PrefsError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PrefsError> {
        // A corrupt file is replaced rather than blocking every later write.
        let mut values = match self.read_all() {
            Ok(values) => values,
            Err(PrefsError::Malformed { .. }) => BTreeMap::new(),
            Err(e) => return Err(e),
        };
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }

    fn clear(&mut self) -> Result<(), PrefsError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_err(e)),
        }
    }

    fn entries(&self) -> Result<BTreeMap<String, String>, PrefsError> {
        self.read_all()
    }
}

/// Typed user settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub grid: GridConfig,
    /// Pick a random tile after every placement.
    pub random_mode: bool,
    /// Keep placing/erasing while dragging.
    pub paint_mode: bool,
    pub selected_tile: TileId,
    /// Show the help screen on the next start.
    pub first_timer: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            random_mode: false,
            paint_mode: true,
            selected_tile: TileId(0),
            first_timer: true,
        }
    }
}

/// Parse a stored boolean. Only the exact strings `true` and `false` count.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn format_bool(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn read_raw(store: &dyn PrefsStore, key: &'static str) -> Result<String, SettingsError> {
    store.get(key)?.ok_or(SettingsError::Missing(key))
}

fn read_u32(store: &dyn PrefsStore, key: &'static str, allow_zero: bool) -> Result<u32, SettingsError> {
    let raw = read_raw(store, key)?;
    match raw.trim().parse::<u32>() {
        Ok(v) if allow_zero || v > 0 => Ok(v),
        _ => Err(SettingsError::Invalid { key, value: raw }),
    }
}

fn read_bool(store: &dyn PrefsStore, key: &'static str) -> Result<bool, SettingsError> {
    let raw = read_raw(store, key)?;
    parse_bool(&raw).ok_or(SettingsError::Invalid { key, value: raw })
}

/// Reject a grid whose canvas would overflow or exceed the edge limit.
///
/// The offending count is blamed; a tile size that cannot fit even one tile
/// is blamed on `tile_size`.
fn check_grid(grid: GridConfig) -> Result<GridConfig, SettingsError> {
    if grid.checked_pixel_size().is_some() {
        return Ok(grid);
    }
    let (key, value) = if GridConfig::new(grid.tile_size, 1, 1)
        .checked_pixel_size()
        .is_none()
    {
        (keys::TILE_SIZE, grid.tile_size)
    } else if GridConfig::new(grid.tile_size, grid.x_tiles, 1)
        .checked_pixel_size()
        .is_none()
    {
        (keys::X_TILES_COUNT, grid.x_tiles)
    } else {
        (keys::Y_TILES_COUNT, grid.y_tiles)
    };
    Err(SettingsError::Invalid {
        key,
        value: value.to_string(),
    })
}

/// Parse settings without any repair.
pub fn read_settings(store: &dyn PrefsStore) -> Result<Settings, SettingsError> {
    Ok(Settings {
        grid: check_grid(GridConfig {
            tile_size: read_u32(store, keys::TILE_SIZE, false)?,
            x_tiles: read_u32(store, keys::X_TILES_COUNT, false)?,
            y_tiles: read_u32(store, keys::Y_TILES_COUNT, false)?,
        })?,
        random_mode: read_bool(store, keys::RANDOM_MODE)?,
        paint_mode: read_bool(store, keys::PAINT_MODE)?,
        selected_tile: TileId(read_u32(store, keys::BLOCK_LAST_INDEX, true)?),
        first_timer: read_bool(store, keys::FIRST_TIMER)?,
    })
}

/// Write every setting.
pub fn write_settings(store: &mut dyn PrefsStore, settings: &Settings) -> Result<(), PrefsError> {
    store.set(keys::TILE_SIZE, &settings.grid.tile_size.to_string())?;
    store.set(keys::X_TILES_COUNT, &settings.grid.x_tiles.to_string())?;
    store.set(keys::Y_TILES_COUNT, &settings.grid.y_tiles.to_string())?;
    store.set(keys::RANDOM_MODE, format_bool(settings.random_mode))?;
    store.set(keys::PAINT_MODE, format_bool(settings.paint_mode))?;
    store.set(keys::BLOCK_LAST_INDEX, &settings.selected_tile.to_string())?;
    store.set(keys::FIRST_TIMER, format_bool(settings.first_timer))?;
    Ok(())
}

/// Load settings, repairing the store once if needed.
///
/// - valid store: its settings;
/// - missing/invalid values: defaults are written and the read retried once;
///   a second failure is [`SettingsError::Unrecoverable`];
/// - store unavailable (read or repair write fails): in-memory defaults.
pub fn load_settings(store: &mut dyn PrefsStore) -> Result<Settings, SettingsError> {
    match read_settings(store) {
        Ok(settings) => return Ok(settings),
        Err(SettingsError::Store(e)) => {
            warn!("preferences unavailable, using defaults for this session: {}", e);
            return Ok(Settings::default());
        }
        Err(e) => debug!("preferences need repair: {}", e),
    }

    if let Err(e) = write_settings(store, &Settings::default()) {
        warn!("could not reset preferences, using defaults for this session: {}", e);
        return Ok(Settings::default());
    }

    read_settings(store).map_err(|cause| SettingsError::Unrecoverable {
        cause: Box::new(cause),
    })
}

/// Reset the store to defaults.
pub fn reset_settings(store: &mut dyn PrefsStore) -> Result<Settings, PrefsError> {
    store.clear()?;
    let defaults = Settings::default();
    write_settings(store, &defaults)?;
    Ok(defaults)
}

/// Validate and store a single user-supplied value.
pub fn set_preference(store: &mut dyn PrefsStore, key: &str, value: &str) -> Result<(), SettingsError> {
    let key: &'static str = keys::ALL
        .iter()
        .copied()
        .find(|k| *k == key)
        .ok_or_else(|| SettingsError::UnknownKey(key.to_string()))?;

    let invalid = || SettingsError::Invalid {
        key,
        value: value.to_string(),
    };
    match key {
        keys::RANDOM_MODE | keys::PAINT_MODE | keys::FIRST_TIMER => {
            parse_bool(value).ok_or_else(invalid)?;
        }
        keys::BLOCK_LAST_INDEX => {
            value.trim().parse::<u32>().map_err(|_| invalid())?;
        }
        _ => {
            let v = match value.trim().parse::<u32>() {
                Ok(v) if v > 0 => v,
                _ => return Err(invalid()),
            };
            // Checked against the other stored dimensions, or the defaults.
            let mut grid = read_settings(&*store)
                .map(|s| s.grid)
                .unwrap_or_default();
            match key {
                keys::TILE_SIZE => grid.tile_size = v,
                keys::X_TILES_COUNT => grid.x_tiles = v,
                _ => grid.y_tiles = v,
            }
            if grid.checked_pixel_size().is_none() {
                return Err(invalid());
            }
        }
    }

    store.set(key, value.trim())?;
    Ok(())
}

/// Best-effort single write; failures are logged and swallowed.
pub fn persist(store: &mut dyn PrefsStore, key: &str, value: &str) {
    if let Err(e) = store.set(key, value) {
        warn!("could not persist preference '{}': {}", key, e);
    }
}

/// Best-effort boolean write.
pub fn persist_bool(store: &mut dyn PrefsStore, key: &str, value: bool) {
    persist(store, key, format_bool(value));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Store whose reads always see the same broken value, even after writes.
    struct StuckStore;

    impl PrefsStore for StuckStore {
        fn get(&self, _key: &str) -> Result<Option<String>, PrefsError> {
            Ok(Some("garbage".to_string()))
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<(), PrefsError> {
            Ok(())
        }
        fn clear(&mut self) -> Result<(), PrefsError> {
            Ok(())
        }
        fn entries(&self) -> Result<BTreeMap<String, String>, PrefsError> {
            Ok(BTreeMap::new())
        }
    }

    #[test]
    fn test_empty_store_is_repaired_with_defaults() {
        let mut store = MemoryPrefsStore::new();
        let settings = load_settings(&mut store).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(store.get(keys::TILE_SIZE).unwrap().as_deref(), Some("16"));
        assert_eq!(store.get(keys::PAINT_MODE).unwrap().as_deref(), Some("true"));
        assert_eq!(store.entries().unwrap().len(), keys::ALL.len());
    }

    #[test]
    fn test_valid_store_is_read() {
        let mut store = MemoryPrefsStore::new();
        let custom = Settings {
            grid: GridConfig::new(32, 20, 10),
            random_mode: true,
            paint_mode: false,
            selected_tile: TileId(7),
            first_timer: false,
        };
        write_settings(&mut store, &custom).unwrap();
        assert_eq!(load_settings(&mut store).unwrap(), custom);
    }

    #[test]
    fn test_invalid_value_resets_everything() {
        let mut store = MemoryPrefsStore::new();
        write_settings(
            &mut store,
            &Settings {
                selected_tile: TileId(5),
                ..Settings::default()
            },
        )
        .unwrap();
        store.set(keys::RANDOM_MODE, "yes").unwrap();

        let settings = load_settings(&mut store).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(store.get(keys::BLOCK_LAST_INDEX).unwrap().as_deref(), Some("0"));
    }

    #[test]
    fn test_zero_tile_size_is_invalid() {
        let mut store = MemoryPrefsStore::new();
        write_settings(&mut store, &Settings::default()).unwrap();
        store.set(keys::TILE_SIZE, "0").unwrap();
        assert!(matches!(
            read_settings(&store),
            Err(SettingsError::Invalid { key: "tile_size", .. })
        ));
    }

    #[test]
    fn test_repair_loop_is_fatal() {
        let err = load_settings(&mut StuckStore).unwrap_err();
        assert!(matches!(err, SettingsError::Unrecoverable { .. }));
    }

    #[test]
    fn test_disabled_store_degrades_to_defaults() {
        let mut store = MemoryPrefsStore::disabled();
        assert_eq!(load_settings(&mut store).unwrap(), Settings::default());
        // Best-effort writes do not fail.
        persist_bool(&mut store, keys::PAINT_MODE, false);
    }

    #[test]
    fn test_parse_bool_is_strict() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("false"), Some(false));
        assert_eq!(parse_bool("True"), None);
        assert_eq!(parse_bool("1"), None);
    }

    #[test]
    fn test_set_preference_validates() {
        let mut store = MemoryPrefsStore::new();
        set_preference(&mut store, keys::TILE_SIZE, "32").unwrap();
        set_preference(&mut store, keys::BLOCK_LAST_INDEX, "0").unwrap();
        assert!(set_preference(&mut store, keys::TILE_SIZE, "0").is_err());
        assert!(set_preference(&mut store, keys::PAINT_MODE, "on").is_err());
        assert!(matches!(
            set_preference(&mut store, "volume", "3"),
            Err(SettingsError::UnknownKey(_))
        ));
        assert_eq!(store.get(keys::TILE_SIZE).unwrap().as_deref(), Some("32"));
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");
        let mut store = FilePrefsStore::new(&path);
        assert_eq!(store.get(keys::TILE_SIZE).unwrap(), None);

        let settings = load_settings(&mut store).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(path.exists());

        let reopened = FilePrefsStore::new(&path);
        assert_eq!(read_settings(&reopened).unwrap(), Settings::default());

        store.clear().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_file_store_malformed_is_repaired() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{ not json").unwrap();
        let mut store = FilePrefsStore::new(&path);

        // A malformed file reads as a store error, so the session falls back
        // to defaults; an explicit reset rewrites it.
        assert_eq!(load_settings(&mut store).unwrap(), Settings::default());
        reset_settings(&mut store).unwrap();
        assert_eq!(read_settings(&store).unwrap(), Settings::default());
    }

    #[test]
    fn test_overflowing_grid_is_repaired() {
        let mut store = MemoryPrefsStore::new();
        write_settings(&mut store, &Settings::default()).unwrap();
        store.set(keys::X_TILES_COUNT, "300000000").unwrap();
        store.set(keys::Y_TILES_COUNT, "1").unwrap();
        assert!(matches!(
            read_settings(&store),
            Err(SettingsError::Invalid { key: "x_tiles_count", .. })
        ));

        let settings = load_settings(&mut store).unwrap();
        assert_eq!(settings.grid, GridConfig::default());
    }

    #[test]
    fn test_oversized_canvas_is_invalid() {
        let mut store = MemoryPrefsStore::new();
        write_settings(&mut store, &Settings::default()).unwrap();
        store.set(keys::Y_TILES_COUNT, "1025").unwrap();
        assert!(matches!(
            read_settings(&store),
            Err(SettingsError::Invalid { key: "y_tiles_count", .. })
        ));

        store.set(keys::Y_TILES_COUNT, "28").unwrap();
        store.set(keys::TILE_SIZE, "20000").unwrap();
        assert!(matches!(
            read_settings(&store),
            Err(SettingsError::Invalid { key: "tile_size", .. })
        ));
    }

    #[test]
    fn test_set_preference_rejects_oversized_grid() {
        let mut store = MemoryPrefsStore::new();
        write_settings(&mut store, &Settings::default()).unwrap();
        assert!(matches!(
            set_preference(&mut store, keys::X_TILES_COUNT, "300000000"),
            Err(SettingsError::Invalid { key: "x_tiles_count", .. })
        ));
        // 16px * 1025 tiles is past the edge limit; 1024 is not.
        assert!(set_preference(&mut store, keys::Y_TILES_COUNT, "1025").is_err());
        set_preference(&mut store, keys::Y_TILES_COUNT, "1024").unwrap();
        // The larger tile no longer fits the stored row count.
        assert!(set_preference(&mut store, keys::TILE_SIZE, "32").is_err());
        assert_eq!(store.get(keys::TILE_SIZE).unwrap().as_deref(), Some("16"));
        assert_eq!(load_settings(&mut store).unwrap().grid.y_tiles, 1024);
    }

    #[test]
    fn test_file_store_set_keeps_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::create_dir(&path).unwrap();
        let mut store = FilePrefsStore::new(&path);
        assert!(matches!(
            store.set(keys::TILE_SIZE, "16"),
            Err(PrefsError::Io { .. })
        ));
        assert!(path.is_dir());
    }

    #[test]
    fn test_file_store_set_replaces_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{ not json").unwrap();
        let mut store = FilePrefsStore::new(&path);
        store.set(keys::TILE_SIZE, "16").unwrap();
        assert_eq!(store.entries().unwrap().len(), 1);
    }
}
