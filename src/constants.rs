//! Centralized constants used across the application.
//!
//! This module contains magic numbers and configuration values that are used
//! in multiple places or would benefit from being named constants.

/// Default window width in pixels
pub const DEFAULT_WINDOW_WIDTH: f32 = 1600.0;

/// Default window height in pixels
pub const DEFAULT_WINDOW_HEIGHT: f32 = 900.0;

/// Default maximum number of undo steps
pub const HISTORY_LIMIT: usize = 100;

/// Default quiet period for coalesced slider and color edits
pub const DEFAULT_DEBOUNCE_MS: u64 = 150;

/// Maximum number of recent projects to remember in config
pub const MAX_RECENT_PROJECTS: usize = 5;

/// Extension of project files
pub const PROJECT_EXTENSION: &str = "tfproj";

/// Zoom range of the canvas panel (screen pixels per tile pixel)
pub const MIN_CANVAS_ZOOM: f32 = 0.25;
pub const MAX_CANVAS_ZOOM: f32 = 8.0;
