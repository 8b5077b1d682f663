//! File-backed preferences: repair, validation and session write-through.

use mineclone2d_core::prefs::{keys, load_settings, read_settings, set_preference};
use mineclone2d_core::{
    DeterministicRng, PrefsStore, Sandbox, Settings, SettingsError, Stroke, TileId,
};
use mineclone2d_tests::AtlasFixture;
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::fs;

fn stored(fixture: &AtlasFixture) -> BTreeMap<String, String> {
    let text = fs::read_to_string(fixture.prefs_path()).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[test]
fn test_first_load_writes_defaults() {
    let fixture = AtlasFixture::new();
    let mut store = fixture.prefs_store();
    assert!(!fixture.prefs_path().exists());

    let settings = load_settings(&mut store).unwrap();
    assert_eq!(settings, Settings::default());

    let values = stored(&fixture);
    assert_eq!(values.len(), keys::ALL.len());
    assert_eq!(values[keys::TILE_SIZE], "16");
    assert_eq!(values[keys::X_TILES_COUNT], "40");
    assert_eq!(values[keys::Y_TILES_COUNT], "28");
    assert_eq!(values[keys::PAINT_MODE], "true");
    assert_eq!(values[keys::FIRST_TIMER], "true");
}

#[test]
fn test_invalid_value_is_repaired() {
    let fixture = AtlasFixture::new();
    let mut store = fixture.prefs_store();
    load_settings(&mut store).unwrap();
    store.set(keys::RANDOM_MODE, "true").unwrap();
    store.set(keys::TILE_SIZE, "sixteen").unwrap();

    assert!(matches!(
        read_settings(&store),
        Err(SettingsError::Invalid { key: "tile_size", .. })
    ));

    // Repair rewrites every key, so the valid random_mode is reset too.
    let settings = load_settings(&mut store).unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(stored(&fixture)[keys::RANDOM_MODE], "false");
}

#[test]
fn test_zero_grid_dimension_is_repaired() {
    let fixture = AtlasFixture::new();
    let mut store = fixture.prefs_store();
    load_settings(&mut store).unwrap();
    store.set(keys::X_TILES_COUNT, "0").unwrap();
    assert_eq!(load_settings(&mut store).unwrap().grid.x_tiles, 40);
}

#[test]
fn test_malformed_file_falls_back_to_defaults() {
    let fixture = AtlasFixture::new();
    fs::write(fixture.prefs_path(), "{ not json").unwrap();
    let mut store = fixture.prefs_store();
    assert_eq!(load_settings(&mut store).unwrap(), Settings::default());
}

#[test]
fn test_valid_values_survive_reload() {
    let fixture = AtlasFixture::new();
    let mut store = fixture.prefs_store();
    load_settings(&mut store).unwrap();
    set_preference(&mut store, keys::X_TILES_COUNT, "20").unwrap();
    set_preference(&mut store, keys::PAINT_MODE, "false").unwrap();

    let settings = load_settings(&mut fixture.prefs_store()).unwrap();
    assert_eq!(settings.grid.x_tiles, 20);
    assert!(!settings.paint_mode);
}

#[test]
fn test_set_preference_validates() {
    let fixture = AtlasFixture::new();
    let mut store = fixture.prefs_store();
    assert!(matches!(
        set_preference(&mut store, "volume", "3"),
        Err(SettingsError::UnknownKey(_))
    ));
    assert!(matches!(
        set_preference(&mut store, keys::RANDOM_MODE, "yes"),
        Err(SettingsError::Invalid { .. })
    ));
    assert!(matches!(
        set_preference(&mut store, keys::TILE_SIZE, "0"),
        Err(SettingsError::Invalid { .. })
    ));
    set_preference(&mut store, keys::BLOCK_LAST_INDEX, "0").unwrap();
    assert_eq!(store.get(keys::BLOCK_LAST_INDEX).unwrap().as_deref(), Some("0"));
}

#[test]
fn test_session_writes_through() {
    let fixture = AtlasFixture::new();
    let mut store = fixture.prefs_store();
    let settings = load_settings(&mut store).unwrap();
    let mut sb = Sandbox::new(fixture.atlas(), settings, store, DeterministicRng::new(2)).unwrap();

    assert!(sb.take_first_run());
    assert!(!sb.take_first_run());
    sb.toggle_random_mode();
    sb.toggle_paint_mode();
    sb.select(TileId(6)).unwrap();
    sb.place(0, 0, Stroke::Press).unwrap();

    let reloaded = load_settings(&mut fixture.prefs_store()).unwrap();
    assert!(!reloaded.first_timer);
    assert!(reloaded.random_mode);
    assert!(!reloaded.paint_mode);
    // Random mode picked the next tile after placing.
    assert_eq!(reloaded.selected_tile, sb.selected());
}

#[test]
fn test_unwritable_store_keeps_session_alive() {
    let fixture = AtlasFixture::new();
    // A directory where the file should be makes every write fail.
    fs::create_dir(fixture.prefs_path()).unwrap();
    let mut store = fixture.prefs_store();

    let settings = load_settings(&mut store).unwrap();
    assert_eq!(settings, Settings::default());

    let mut sb = Sandbox::new(fixture.atlas(), settings, store, DeterministicRng::new(2)).unwrap();
    sb.toggle_random_mode();
    sb.cycle(mineclone2d_core::Direction::Next);
    assert!(sb.settings().random_mode);
    assert_eq!(sb.selected(), TileId(1));
    assert!(sb.store().get(keys::RANDOM_MODE).is_err());
}
