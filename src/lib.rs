//! Reef Scroller - an underwater tile-map side-scroller
//!
//! Core modules:
//! - `sim`: Deterministic simulation (tile map, spatial grid, collisions, game state)
//! - `assets`: Sprite size/frame tables and the atlas seam
//! - `render`: Renderer seam and the camera-applied draw pass
//! - `settings`: Data-driven tuning loaded from JSON

pub mod assets;
pub mod render;
pub mod settings;
pub mod sim;

pub use assets::{AssetError, SpriteAtlas, SpriteData};
pub use settings::{Settings, SettingsError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one frame at 60 FPS)
    pub const SIM_DT: f32 = 1.0 / FPS as f32;
    /// Target frame rate
    pub const FPS: u32 = 60;

    /// Edge length of one map tile in pixels
    pub const TILE_SIZE: f32 = 36.0;
    /// Spatial grid cells are 4 x 4 tiles
    pub const GRID_WIDTH: f32 = 4.0 * TILE_SIZE;
    pub const GRID_HEIGHT: f32 = 4.0 * TILE_SIZE;
    /// Screen is 40 x 20 tiles
    pub const SCREEN_WIDTH: f32 = 40.0 * TILE_SIZE;
    pub const SCREEN_HEIGHT: f32 = 20.0 * TILE_SIZE;

    /// Player defaults
    pub const PLAYER_SPEED: f32 = 4.0;
    pub const PLAYER_HITPOINTS: i32 = 100;
    /// Player spawn tile (column, row)
    pub const PLAYER_SPAWN: (u32, u32) = (6, 16);

    /// Harpoon defaults
    pub const MISSILE_SPEED: f32 = 25.0;
    pub const MISSILE_DAMAGE: i32 = 10;

    /// Enemy AI
    pub const CHASE_RADIUS: f32 = 20.0 * TILE_SIZE;
    pub const ATTACK_RADIUS: f32 = 5.0 * TILE_SIZE;
    pub const ATTACK_SPEED: f32 = 8.0;
    /// Damage the player takes when ramming an enemy
    pub const CONTACT_DAMAGE: i32 = 10;

    /// Shrink factors for the secondary overlap tests
    pub const ENEMY_COLLIDE_RATIO: f32 = 0.7;
    pub const PICKUP_COLLIDE_RATIO: f32 = 0.5;

    /// Score for collecting a pickup
    pub const PICKUP_SCORE: u64 = 50;
    /// Every Nth shuffled floor tile gets a prop / a pickup
    pub const PROP_EVERY: usize = 3;
    pub const PICKUP_EVERY: usize = 5;

    /// Animation frame periods (seconds)
    pub const PLAYER_FRAME_PERIOD: f32 = 0.5;
    pub const ENEMY_FRAME_PERIOD: f32 = 0.2;
}

/// Sign of a value as -1, 0 or 1 (unlike `f32::signum`, zero maps to zero)
#[inline]
pub fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Angle in degrees measured from `v` to the +x axis (screen coordinates, y down)
#[inline]
pub fn angle_to_x_axis(v: Vec2) -> f32 {
    -v.y.atan2(v.x).to_degrees()
}
