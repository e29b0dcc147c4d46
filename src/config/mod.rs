use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{DEFAULT_DEBOUNCE_MS, HISTORY_LIMIT, MAX_RECENT_PROJECTS};
use crate::document::Canvas;

/// System set for config loading (other plugins can run after this)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigLoaded;

/// Canvas size used for new projects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasDefaults {
    /// Width in tiles
    pub width: u32,
    /// Height in tiles
    pub height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
}

impl Default for CanvasDefaults {
    fn default() -> Self {
        let canvas = Canvas::default();
        Self {
            width: canvas.width,
            height: canvas.height,
            tile_width: canvas.tile_width,
            tile_height: canvas.tile_height,
        }
    }
}

impl CanvasDefaults {
    /// Canvas for a new document. Zero sizes fall back to 1.
    pub fn to_canvas(self) -> Canvas {
        Canvas {
            width: self.width.max(1),
            height: self.height.max(1),
            tile_width: self.tile_width.max(1),
            tile_height: self.tile_height.max(1),
            ..Canvas::default()
        }
    }
}

/// Undo history tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Maximum number of undo steps kept
    pub limit: usize,
    /// Restore the active layer and tile selection on undo
    pub restore_view: bool,
    /// Quiet period before a slider or color edit is recorded
    pub debounce_ms: u64,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            limit: HISTORY_LIMIT,
            restore_view: true,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

/// Application configuration persisted to disk
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfigData {
    /// Recently opened or saved projects, most recent first
    #[serde(default)]
    pub recent_projects: Vec<PathBuf>,

    /// Last opened project (not auto-loaded, just remembered for quick access)
    #[serde(default)]
    pub last_project_path: Option<PathBuf>,

    #[serde(default)]
    pub default_canvas: CanvasDefaults,

    #[serde(default)]
    pub history: HistorySettings,
}

/// Runtime configuration resource
#[derive(Resource)]
pub struct AppConfig {
    /// The persisted configuration data
    pub data: AppConfigData,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Whether config needs to be saved (dirty flag)
    pub dirty: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: AppConfigData::default(),
            config_path: crate::paths::config_file(),
            dirty: false,
        }
    }
}

/// Resource for the "project file missing" warning dialog
#[derive(Resource, Default)]
pub struct MissingProjectWarning {
    pub show: bool,
    pub path: Option<PathBuf>,
}

/// Resource to notify user when config was reset to defaults
#[derive(Resource, Default)]
pub struct ConfigResetNotification {
    /// Whether to show the notification dialog
    pub show: bool,
    /// The reason for the reset (parse error, read error, etc.)
    pub reason: Option<String>,
}

/// Message to trigger config save
#[derive(Message)]
pub struct SaveConfigRequest;

/// Message recording a project that was just opened or saved
#[derive(Message)]
pub struct AddRecentProjectRequest {
    pub path: PathBuf,
}

/// Parse config JSON, falling back to defaults with a reason on failure
fn parse_config(json: &str) -> (AppConfigData, Option<String>) {
    match serde_json::from_str(json) {
        Ok(data) => (data, None),
        Err(e) => {
            warn!("Failed to parse config file: {}", e);
            (
                AppConfigData::default(),
                Some(format!("Configuration file was corrupted: {}", e)),
            )
        }
    }
}

/// Load configuration from disk
fn load_config() -> (AppConfig, Option<String>) {
    let config_path = crate::paths::config_file();

    let (data, reset_reason) = if config_path.exists() {
        match std::fs::read_to_string(&config_path) {
            Ok(json) => {
                let parsed = parse_config(&json);
                if parsed.1.is_none() {
                    info!("Loaded config from {:?}", config_path);
                }
                parsed
            }
            Err(e) => {
                warn!("Failed to read config file: {}", e);
                (
                    AppConfigData::default(),
                    Some(format!("Could not read configuration file: {}", e)),
                )
            }
        }
    } else {
        info!("No config file found, using defaults");
        (AppConfigData::default(), None)
    };

    let config = AppConfig {
        data,
        config_path,
        dirty: false,
    };
    (config, reset_reason)
}

/// Save configuration to disk
fn save_config(config: &AppConfig) {
    match serde_json::to_string_pretty(&config.data) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&config.config_path, json) {
                error!("Failed to save config: {}", e);
            } else {
                info!("Config saved to {:?}", config.config_path);
            }
        }
        Err(e) => {
            error!("Failed to serialize config: {}", e);
        }
    }
}

/// Startup system to load config from disk into the existing resource
fn load_config_system(
    mut config: ResMut<AppConfig>,
    mut reset_notification: ResMut<ConfigResetNotification>,
) {
    let (loaded, reset_reason) = load_config();
    *config = loaded;

    if let Some(reason) = reset_reason {
        reset_notification.show = true;
        reset_notification.reason = Some(reason);
    }
}

/// Startup system to check if the last project still exists
fn check_last_project_exists(config: Res<AppConfig>, mut warning: ResMut<MissingProjectWarning>) {
    if let Some(ref path) = config.data.last_project_path
        && !path.exists()
    {
        warning.show = true;
        warning.path = Some(path.clone());
        info!("Last opened project no longer exists: {:?}", path);
    }
}

/// System to save config when requested
fn save_config_system(mut events: MessageReader<SaveConfigRequest>, mut config: ResMut<AppConfig>) {
    for _ in events.read() {
        if config.dirty {
            save_config(&config);
            config.dirty = false;
        }
    }
}

/// Move `path` to the front of the recent list and remember it as the last project
fn remember_project(data: &mut AppConfigData, path: PathBuf) {
    data.recent_projects.retain(|p| p != &path);
    data.recent_projects.insert(0, path.clone());
    data.recent_projects.truncate(MAX_RECENT_PROJECTS);
    data.last_project_path = Some(path);
}

fn add_recent_project_system(
    mut events: MessageReader<AddRecentProjectRequest>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) {
    for event in events.read() {
        remember_project(&mut config.data, event.path.clone());
        config.dirty = true;
        save_events.write(SaveConfigRequest);
    }
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AppConfig>()
            .init_resource::<MissingProjectWarning>()
            .init_resource::<ConfigResetNotification>()
            .add_message::<SaveConfigRequest>()
            .add_message::<AddRecentProjectRequest>()
            .add_systems(
                Startup,
                (load_config_system, check_last_project_exists)
                    .chain()
                    .in_set(ConfigLoaded),
            )
            .add_systems(
                Update,
                (
                    add_recent_project_system.run_if(on_message::<AddRecentProjectRequest>),
                    save_config_system.run_if(on_message::<SaveConfigRequest>),
                )
                    .chain(),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_data_default() {
        let data = AppConfigData::default();
        assert!(data.recent_projects.is_empty());
        assert!(data.last_project_path.is_none());
        assert_eq!(data.history.limit, 100);
        assert!(data.history.restore_view);
        assert_eq!(data.history.debounce_ms, 150);
        assert_eq!(data.default_canvas.to_canvas(), Canvas::default());
    }

    #[test]
    fn test_app_config_data_serialization() {
        let data = AppConfigData {
            recent_projects: vec![PathBuf::from("/maps/one.tfproj"), PathBuf::from("/maps/two.tfproj")],
            last_project_path: Some(PathBuf::from("/maps/one.tfproj")),
            default_canvas: CanvasDefaults {
                width: 64,
                height: 48,
                tile_width: 8,
                tile_height: 8,
            },
            history: HistorySettings {
                limit: 20,
                restore_view: false,
                debounce_ms: 300,
            },
        };

        let json = serde_json::to_string(&data).unwrap();
        let parsed: AppConfigData = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.recent_projects, data.recent_projects);
        assert_eq!(parsed.last_project_path, data.last_project_path);
        assert_eq!(parsed.default_canvas, data.default_canvas);
        assert_eq!(parsed.history, data.history);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let (data, reason) = parse_config(r#"{ "history": { "limit": 10 } }"#);
        assert!(reason.is_none());
        assert_eq!(data.history.limit, 10);
        assert_eq!(data.history.debounce_ms, DEFAULT_DEBOUNCE_MS);
        assert_eq!(data.default_canvas, CanvasDefaults::default());
    }

    #[test]
    fn test_corrupt_config_resets_with_reason() {
        let (data, reason) = parse_config("{ not json");
        assert!(data.recent_projects.is_empty());
        assert!(reason.unwrap().starts_with("Configuration file was corrupted"));
    }

    #[test]
    fn test_recent_projects_are_deduplicated_and_capped() {
        let mut data = AppConfigData::default();
        for i in 0..7 {
            remember_project(&mut data, PathBuf::from(format!("p{}.tfproj", i)));
        }
        remember_project(&mut data, PathBuf::from("p4.tfproj"));

        assert_eq!(data.recent_projects.len(), MAX_RECENT_PROJECTS);
        assert_eq!(data.recent_projects[0], PathBuf::from("p4.tfproj"));
        assert_eq!(data.recent_projects.iter().filter(|p| p.ends_with("p4.tfproj")).count(), 1);
        assert_eq!(data.last_project_path, Some(PathBuf::from("p4.tfproj")));
    }

    #[test]
    fn test_zero_canvas_defaults_are_clamped() {
        let canvas = CanvasDefaults {
            width: 0,
            height: 5,
            tile_width: 0,
            tile_height: 16,
        }
        .to_canvas();
        assert_eq!((canvas.width, canvas.tile_width), (1, 1));
    }

    #[test]
    fn test_missing_project_warning_default() {
        let warning = MissingProjectWarning::default();
        assert!(!warning.show);
        assert!(warning.path.is_none());
    }
}
