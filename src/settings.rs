//! Game settings and tuning
//!
//! Everything here has a default from [`crate::consts`]; a JSON file only needs
//! the fields it wants to override.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors loading a settings file
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting: {0}")]
    Invalid(&'static str),
}

/// Game settings/tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Geometry ===
    /// Tile edge length in pixels
    pub tile_size: f32,
    /// Spatial grid cell size in tiles (columns, rows)
    pub grid_tiles: (u32, u32),
    /// Screen size in tiles (columns, rows)
    pub screen_tiles: (u32, u32),

    // === Player ===
    pub player_speed: f32,
    pub player_hitpoints: i32,
    /// Spawn tile (column, row)
    pub player_spawn: (u32, u32),

    // === Weapon ===
    pub missile_speed: f32,
    pub missile_damage: i32,

    // === Enemies ===
    pub chase_radius: f32,
    pub attack_radius: f32,
    pub attack_speed: f32,
    pub contact_damage: i32,

    // === Secondary collisions ===
    pub enemy_collide_ratio: f32,
    pub pickup_collide_ratio: f32,

    // === Environment ===
    pub pickup_score: u64,
    pub prop_every: usize,
    pub pickup_every: usize,

    /// Run seed for reproducibility
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
            grid_tiles: (
                (GRID_WIDTH / TILE_SIZE) as u32,
                (GRID_HEIGHT / TILE_SIZE) as u32,
            ),
            screen_tiles: (
                (SCREEN_WIDTH / TILE_SIZE) as u32,
                (SCREEN_HEIGHT / TILE_SIZE) as u32,
            ),

            player_speed: PLAYER_SPEED,
            player_hitpoints: PLAYER_HITPOINTS,
            player_spawn: PLAYER_SPAWN,

            missile_speed: MISSILE_SPEED,
            missile_damage: MISSILE_DAMAGE,

            chase_radius: CHASE_RADIUS,
            attack_radius: ATTACK_RADIUS,
            attack_speed: ATTACK_SPEED,
            contact_damage: CONTACT_DAMAGE,

            enemy_collide_ratio: ENEMY_COLLIDE_RATIO,
            pickup_collide_ratio: PICKUP_COLLIDE_RATIO,

            pickup_score: PICKUP_SCORE,
            prop_every: PROP_EVERY,
            pickup_every: PICKUP_EVERY,

            seed: 0x5eed,
        }
    }
}

impl Settings {
    /// Parse settings from a JSON string and validate them
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.tile_size <= 0.0 {
            return Err(SettingsError::Invalid("tile_size must be positive"));
        }
        if self.grid_tiles.0 == 0 || self.grid_tiles.1 == 0 {
            return Err(SettingsError::Invalid("grid_tiles must be non-zero"));
        }
        if self.prop_every == 0 || self.pickup_every == 0 {
            return Err(SettingsError::Invalid("spawn intervals must be non-zero"));
        }
        if !(0.0..=1.0).contains(&self.enemy_collide_ratio)
            || !(0.0..=1.0).contains(&self.pickup_collide_ratio)
        {
            return Err(SettingsError::Invalid("collide ratios must be within 0..=1"));
        }
        Ok(())
    }

    /// Grid cell width in pixels
    pub fn cell_width(&self) -> f32 {
        self.grid_tiles.0 as f32 * self.tile_size
    }

    /// Grid cell height in pixels
    pub fn cell_height(&self) -> f32 {
        self.grid_tiles.1 as f32 * self.tile_size
    }

    /// Screen size in pixels
    pub fn screen_size(&self) -> glam::Vec2 {
        glam::Vec2::new(
            self.screen_tiles.0 as f32 * self.tile_size,
            self.screen_tiles.1 as f32 * self.tile_size,
        )
    }
}
