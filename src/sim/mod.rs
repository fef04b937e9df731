//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod animation;
pub mod camera;
pub mod collision;
pub mod entity;
pub mod grid;
pub mod input;
pub mod map;
pub mod rect;
pub mod state;
pub mod tick;

pub use animation::Animation;
pub use camera::Camera;
pub use collision::{AxisContact, BoundaryReflection, cell_labels, first_contact, move_and_collide, reflect_at_boundary};
pub use entity::{Body, Enemy, EnemyKind, EntityId, Missile, Pickup, Player, StaticEntity, StaticKind};
pub use grid::{CellCoord, GridError, SpatialGrid};
pub use input::{DirectionKeys, Orientation};
pub use map::{MapError, PlatformKind, Tile, TileMap};
pub use rect::{Axis, Rect};
pub use state::{GamePhase, SetupError, World};
pub use tick::{TickInput, autopilot, tick};
