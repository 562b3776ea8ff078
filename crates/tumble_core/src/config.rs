//! Game configuration loaded from `assets/config/game.json`.
//!
//! Every field has a serde default, so a partial file only overrides what it
//! names. A missing file is not an error for the game: it falls back to the
//! defaults with a warning.

use crate::board::{TileType, MAX_BOARD_SIDE};
use crate::cube::Face;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub start_position: [f32; 3],
    pub fov_deg: f32,
    pub speed: f32,
    pub mouse_sensitivity: f32,
    pub ortho_zoom: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            start_position: [-50.0, 50.0, 50.0],
            fov_deg: 10.0,
            speed: 10.0,
            mouse_sensitivity: 0.1,
            ortho_zoom: 20.0,
            near: 0.1,
            far: 10_000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub board_side: i32,
    pub rotation_speed: f32,
    pub trigger_face: Face,
    pub flip_from: TileType,
    pub flip_to: TileType,
    pub level_path: PathBuf,
    pub save_on_exit: bool,
    pub camera: CameraSettings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_side: 100,
            rotation_speed: 10.0,
            trigger_face: Face::Front,
            flip_from: TileType::Dark,
            flip_to: TileType::Light,
            level_path: PathBuf::from("assets/levels/level1.txt"),
            save_on_exit: true,
            camera: CameraSettings::default(),
        }
    }
}

impl GameConfig {
    /// Load from `path`, or fall back to defaults when the file does not
    /// exist. A file that exists but fails to parse or validate is an error.
    pub fn load_or_default(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            log::warn!(
                "Config file {} not found, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }
        load_config_from_path(path)
    }
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Slower rolls would take minutes and stall saves waiting on them.
const MIN_ROTATION_SPEED: f32 = 0.01;

fn validate_config(config: &GameConfig) -> Result<(), String> {
    if config.board_side <= 0 || config.board_side > MAX_BOARD_SIDE {
        return Err(format!(
            "Config validation failed: board_side must be in 1..={}, got {}",
            MAX_BOARD_SIDE, config.board_side
        ));
    }
    if !(config.rotation_speed >= MIN_ROTATION_SPEED) || !config.rotation_speed.is_finite() {
        return Err(format!(
            "Config validation failed: rotation_speed must be a finite value >= {}, got {}",
            MIN_ROTATION_SPEED, config.rotation_speed
        ));
    }
    if config.flip_from == config.flip_to {
        return Err(format!(
            "Config validation failed: flip_from and flip_to are both '{}'",
            config.flip_from.label()
        ));
    }

    let camera = &config.camera;
    if !(camera.fov_deg > 0.0 && camera.fov_deg < 180.0) {
        return Err(format!(
            "Config validation failed: camera.fov_deg must be in (0, 180), got {}",
            camera.fov_deg
        ));
    }
    if !(camera.near > 0.0 && camera.near < camera.far) {
        return Err(format!(
            "Config validation failed: camera near/far must satisfy 0 < near < far, got {} / {}",
            camera.near, camera.far
        ));
    }
    if !(camera.ortho_zoom > 0.0) {
        return Err("Config validation failed: camera.ortho_zoom must be > 0".to_string());
    }
    Ok(())
}
