//! Entity components and kinds
//!
//! Entities are built by composition rather than a class hierarchy:
//! every entity has a [`Body`]; mobile ones add [`Motion`]; anything that
//! can be hurt adds [`Health`]. Enemy variants differ only in data
//! ([`EnemyConfig`]), selected from a lookup table.

use glam::Vec2;

use super::animation::Animation;
use super::grid::{CellCoord, SpatialGrid};
use super::input::Orientation;
use super::map::PlatformKind;
use super::rect::Rect;

/// Stable entity identifier (allocation order = processing order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u32);

/// Position and extent shared by every entity
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Top-left corner in map pixels
    pub pos: Vec2,
    /// Sprite size in pixels
    pub size: Vec2,
    /// Sprite category key
    pub key: &'static str,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2, key: &'static str) -> Self {
        Self { pos, size, key }
    }

    /// Body whose rectangle is centered on `center`
    pub fn centered(center: Vec2, size: Vec2, key: &'static str) -> Self {
        Self::new(center - size * 0.5, size, key)
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.pos, self.size)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.rect().center()
    }
}

/// Velocity plus broad-phase membership for anything that moves
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Motion {
    pub vel: Vec2,
    /// Grid cells the body overlapped at its last refresh
    pub cells: Vec<CellCoord>,
}

impl Motion {
    pub fn new(vel: Vec2) -> Self {
        Self {
            vel,
            cells: Vec::new(),
        }
    }

    /// Move `id`'s grid membership to the cells under `rect`
    pub fn refresh_cells(&mut self, id: EntityId, rect: &Rect, grid: &mut SpatialGrid) {
        let cells = grid.cells_overlapping(rect);
        for old in &self.cells {
            if !cells.contains(old) {
                grid.remove(id, *old);
            }
        }
        for new in &cells {
            grid.assign(id, *new);
        }
        self.cells = cells;
    }

    /// Drop all membership (on despawn)
    pub fn leave_grid(&mut self, id: EntityId, grid: &mut SpatialGrid) {
        for cell in self.cells.drain(..) {
            grid.remove(id, cell);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    pub hitpoints: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self { hitpoints: max, max }
    }

    /// Subtract `amount`; returns true when health is now depleted
    pub fn damage(&mut self, amount: i32) -> bool {
        self.hitpoints -= amount;
        self.is_depleted()
    }

    pub fn is_depleted(&self) -> bool {
        self.hitpoints <= 0
    }
}

/// What a static entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticKind {
    Platform(PlatformKind),
    /// Scenery grown on floor tiles
    Prop,
}

/// Never moves after creation; registered in the grid once
#[derive(Debug, Clone, PartialEq)]
pub struct StaticEntity {
    pub id: EntityId,
    pub kind: StaticKind,
    pub body: Body,
}

/// Collectable worth `value` points
#[derive(Debug, Clone, PartialEq)]
pub struct Pickup {
    pub id: EntityId,
    pub body: Body,
    pub value: u64,
}

/// The diver
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: EntityId,
    pub body: Body,
    pub motion: Motion,
    pub health: Health,
    pub direction: Orientation,
    pub anim: Animation,
}

impl Player {
    pub const IDLE: &'static str = "player_idle";
    pub const SWIM: &'static str = "player_swim";

    pub fn new(id: EntityId, pos: Vec2, size: Vec2, hitpoints: i32) -> Self {
        Self {
            id,
            body: Body::new(pos, size, "player"),
            motion: Motion::default(),
            health: Health::new(hitpoints),
            direction: Orientation::North,
            anim: Animation::new(Self::IDLE),
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health.is_depleted()
    }
}

/// Per-kind enemy tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyConfig {
    /// Sprite key of the swim reel
    pub key: &'static str,
    pub speed: f32,
    pub hitpoints: i32,
    /// Sprite key of the death reel
    pub death_animation: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Dartfish,
    Spinefish,
    Daddyfish,
}

const DARTFISH: EnemyConfig = EnemyConfig {
    key: "dartfish",
    speed: 4.0,
    hitpoints: 10,
    death_animation: "enemyDeath2x1",
};

const SPINEFISH: EnemyConfig = EnemyConfig {
    key: "spinefish",
    speed: 2.0,
    hitpoints: 20,
    death_animation: "enemyDeath2x1",
};

const DADDYFISH: EnemyConfig = EnemyConfig {
    key: "daddyfish",
    speed: 1.0,
    hitpoints: 100,
    death_animation: "enemyDeath4x4",
};

impl EnemyKind {
    /// Candidates for an `E` spawn tile
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Dartfish, EnemyKind::Spinefish, EnemyKind::Daddyfish];

    pub fn config(self) -> &'static EnemyConfig {
        match self {
            EnemyKind::Dartfish => &DARTFISH,
            EnemyKind::Spinefish => &SPINEFISH,
            EnemyKind::Daddyfish => &DADDYFISH,
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.config().key == key)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub id: EntityId,
    pub kind: EnemyKind,
    pub body: Body,
    pub motion: Motion,
    pub health: Health,
    pub anim: Animation,
    /// Displacement from this enemy's center to the player's
    pub target: Vec2,
    /// Facing in degrees from +x (for the renderer's rotation)
    pub facing: f32,
    /// Playing the death reel; no longer collides or steers
    pub dying: bool,
}

impl Enemy {
    pub fn new(id: EntityId, kind: EnemyKind, pos: Vec2, size: Vec2) -> Self {
        let config = kind.config();
        Self {
            id,
            kind,
            body: Body::new(pos, size, config.key),
            motion: Motion::new(Vec2::X),
            health: Health::new(config.hitpoints),
            anim: Animation::new(config.key),
            target: Vec2::X,
            facing: 0.0,
            dying: false,
        }
    }

    pub fn config(&self) -> &'static EnemyConfig {
        self.kind.config()
    }

    pub fn is_alive(&self) -> bool {
        !self.dying
    }

    /// Apply damage; returns true if this hit killed it
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if self.dying {
            return false;
        }
        if self.health.damage(amount) {
            self.start_dying();
            return true;
        }
        false
    }

    /// Kill outright (rammed by the player)
    pub fn kill(&mut self) -> bool {
        if self.dying {
            return false;
        }
        self.health.hitpoints = 0;
        self.start_dying();
        true
    }

    fn start_dying(&mut self) {
        self.dying = true;
        self.motion.vel = Vec2::ZERO;
        self.anim.change_action(self.config().death_animation);
    }

    /// Upside-down sprites are flipped before rotation
    pub fn upside_down(&self) -> bool {
        self.facing < -90.0 || self.facing > 90.0
    }
}

/// A fired harpoon
#[derive(Debug, Clone, PartialEq)]
pub struct Missile {
    pub id: EntityId,
    pub body: Body,
    pub motion: Motion,
    pub direction: Orientation,
    pub damage: i32,
}

impl Missile {
    pub const KEY: &'static str = "harpoon";
}
