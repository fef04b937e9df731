//! World state and setup
//!
//! The [`World`] owns every entity, the tile map and the spatial grid. Entity
//! collections are kept sorted by id so iteration order is stable.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::SeedableRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand_pcg::Pcg32;
use thiserror::Error;

use super::camera::Camera;
use super::collision::first_overlapping;
use super::entity::{
    Body, Enemy, EnemyKind, EntityId, Missile, Motion, Pickup, Player, StaticEntity, StaticKind,
};
use super::grid::{GridError, SpatialGrid};
use super::map::{MapError, PlatformKind, Tile, TileMap};
use super::rect::Rect;
use crate::assets::{AssetError, SpriteAtlas};
use crate::settings::{Settings, SettingsError};

/// Sprite key for scenery grown on floors
pub const PROP_KEY: &str = "vegetation";
/// Sprite key for collectables
pub const PICKUP_KEY: &str = "pearl";

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Every enemy has been destroyed
    Cleared,
    /// Player ran out of hitpoints
    GameOver,
    /// Player asked to leave
    Quit,
}

/// Anything that can stop a world from being built
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Map(#[from] MapError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("player spawn tile ({col}, {row}) is outside the {cols} x {rows} map")]
    SpawnOutsideMap {
        col: u32,
        row: u32,
        cols: usize,
        rows: usize,
    },
}

/// Sprite sizes and frame counts captured from the atlas at setup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpriteMetrics {
    entries: BTreeMap<&'static str, (Vec2, usize)>,
}

impl SpriteMetrics {
    fn capture(atlas: &impl SpriteAtlas, keys: &[&'static str]) -> Result<Self, AssetError> {
        let mut entries = BTreeMap::new();
        for &key in keys {
            let size = atlas.require(key)?;
            entries.insert(key, (size, atlas.frame_count(key).max(1)));
        }
        Ok(Self { entries })
    }

    pub fn size(&self, key: &str) -> Vec2 {
        self.entries.get(key).map_or(Vec2::ZERO, |&(size, _)| size)
    }

    pub fn frames(&self, key: &str) -> usize {
        self.entries.get(key).map_or(1, |&(_, frames)| frames)
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct World {
    pub settings: Settings,
    pub map: TileMap,
    pub grid: SpatialGrid,
    /// Platforms and props (solid, in the grid)
    pub statics: BTreeMap<EntityId, StaticEntity>,
    /// Collectables (narrow-phase only, not in the grid)
    pub pickups: Vec<Pickup>,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub missiles: Vec<Missile>,
    pub camera: Camera,
    pub sprites: SpriteMetrics,
    /// Floor tiles (col, row), shuffled once the environment is generated
    pub spawnpoints: Vec<(usize, usize)>,
    pub score: u64,
    /// Enemies destroyed so far
    pub kills: u32,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    rng: Pcg32,
    next_id: u32,
}

impl World {
    /// Build a world from a parsed map: spawn platforms, enemies, the player,
    /// then scatter props and pickups over the floor tiles.
    pub fn new(map: TileMap, settings: Settings, atlas: &impl SpriteAtlas) -> Result<Self, SetupError> {
        settings.validate()?;

        let (spawn_col, spawn_row) = settings.player_spawn;
        if spawn_col as usize >= map.cols() || spawn_row as usize >= map.rows() {
            return Err(SetupError::SpawnOutsideMap {
                col: spawn_col,
                row: spawn_row,
                cols: map.cols(),
                rows: map.rows(),
            });
        }

        let sprites = SpriteMetrics::capture(atlas, &required_keys(&map))?;
        let grid = SpatialGrid::new(
            map.size(),
            settings.tile_size,
            Vec2::new(settings.cell_width(), settings.cell_height()),
        )?;

        let player_pos = map.tile_origin(spawn_col as usize, spawn_row as usize);
        let player = Player::new(
            EntityId(0),
            player_pos,
            sprites.size("player"),
            settings.player_hitpoints,
        );

        let mut world = Self {
            rng: Pcg32::seed_from_u64(settings.seed),
            camera: Camera::new(settings.screen_size()),
            settings,
            map,
            grid,
            statics: BTreeMap::new(),
            pickups: Vec::new(),
            player,
            enemies: Vec::new(),
            missiles: Vec::new(),
            sprites,
            spawnpoints: Vec::new(),
            score: 0,
            kills: 0,
            phase: GamePhase::Playing,
            time_ticks: 0,
            next_id: 1,
        };

        let id = world.player.id;
        let rect = world.player.body.rect();
        world.player.motion.refresh_cells(id, &rect, &mut world.grid);

        world.read_map();
        world.generate_environment();

        let center = world.player.body.center();
        let map_size = world.map.size();
        world.camera.update(center, map_size);

        log::info!(
            "World ready: {} statics, {} enemies, {} pickups, seed {:#x}",
            world.statics.len(),
            world.enemies.len(),
            world.pickups.len(),
            world.settings.seed
        );

        Ok(world)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    fn read_map(&mut self) {
        let tiles: Vec<(usize, usize, Tile)> = self.map.tiles().collect();
        for (col, row, tile) in tiles {
            match tile {
                Tile::Platform(kind) => {
                    self.spawn_platform(kind, col, row);
                    if kind == PlatformKind::Floor {
                        self.spawnpoints.push((col, row));
                    }
                }
                Tile::EnemySpawn => {
                    let kind = EnemyKind::ALL
                        .choose(&mut self.rng)
                        .copied()
                        .unwrap_or(EnemyKind::Dartfish);
                    self.spawn_enemy(kind, col, row);
                }
                Tile::Empty => {}
            }
        }
    }

    /// Add a platform piece. Border tiles and tunnel mouths stay out of the
    /// grid; the border is handled by boundary reflection instead.
    pub fn spawn_platform(&mut self, kind: PlatformKind, col: usize, row: usize) -> EntityId {
        let id = self.next_entity_id();
        let body = Body::new(
            self.map.tile_origin(col, row),
            self.sprites.size(kind.key()),
            kind.key(),
        );
        if !self.map.is_border(col, row) && !kind.is_tunnel() {
            for cell in self.grid.cells_overlapping(&body.rect()) {
                self.grid.assign(id, cell);
            }
        }
        self.statics.insert(
            id,
            StaticEntity {
                id,
                kind: StaticKind::Platform(kind),
                body,
            },
        );
        id
    }

    /// Add an enemy with its top-left at the tile's origin
    pub fn spawn_enemy(&mut self, kind: EnemyKind, col: usize, row: usize) -> EntityId {
        let id = self.next_entity_id();
        let key = kind.config().key;
        let mut enemy = Enemy::new(id, kind, self.map.tile_origin(col, row), self.sprites.size(key));
        let rect = enemy.body.rect();
        enemy.motion.refresh_cells(id, &rect, &mut self.grid);
        self.enemies.push(enemy);
        id
    }

    /// Grow a solid prop standing on the tile at (col, row)
    pub fn spawn_prop(&mut self, col: usize, row: usize) -> EntityId {
        let id = self.next_entity_id();
        let body = self.standing_on(col, row, PROP_KEY);
        for cell in self.grid.cells_overlapping(&body.rect()) {
            self.grid.assign(id, cell);
        }
        self.statics.insert(
            id,
            StaticEntity {
                id,
                kind: StaticKind::Prop,
                body,
            },
        );
        id
    }

    /// Place a pickup resting on the tile at (col, row)
    pub fn spawn_pickup(&mut self, col: usize, row: usize) -> EntityId {
        let id = self.next_entity_id();
        let body = self.standing_on(col, row, PICKUP_KEY);
        self.pickups.push(Pickup {
            id,
            body,
            value: self.settings.pickup_score,
        });
        id
    }

    /// Body whose bottom-left corner sits on the tile's top-left corner
    fn standing_on(&self, col: usize, row: usize, key: &'static str) -> Body {
        let size = self.sprites.size(key);
        let origin = self.map.tile_origin(col, row);
        Body::new(Vec2::new(origin.x, origin.y - size.y), size, key)
    }

    /// Whether a solid placed at `rect` would overlap the player, an enemy or
    /// a solid static already in the grid
    fn is_occupied(&self, rect: &Rect) -> bool {
        let candidates = self.grid.candidates(&self.grid.cells_overlapping(rect));
        self.player.body.rect().overlaps(rect)
            || self.enemies.iter().any(|enemy| enemy.body.rect().overlaps(rect))
            || first_overlapping(rect, &candidates, &self.statics).is_some()
    }

    /// Shuffle the floor spawn points and decorate them. A prop that would
    /// grow into something is skipped and the tile falls through to the
    /// pickup rule.
    fn generate_environment(&mut self) {
        self.spawnpoints.shuffle(&mut self.rng);
        let points = self.spawnpoints.clone();
        for (i, (col, row)) in points.into_iter().enumerate() {
            if i % self.settings.prop_every == 0 {
                if !self.is_occupied(&self.standing_on(col, row, PROP_KEY).rect()) {
                    self.spawn_prop(col, row);
                    continue;
                }
                log::debug!("No room for a prop on tile ({}, {})", col, row);
            }
            if (i + 1) % self.settings.pickup_every == 0 {
                self.spawn_pickup(col, row);
            }
        }
    }

    /// Spawn a harpoon at the player's center, travelling the way the player faces
    pub fn fire_missile(&mut self) -> EntityId {
        let id = self.next_entity_id();
        let direction = self.player.direction;
        let mut missile = Missile {
            id,
            body: Body::centered(
                self.player.body.center(),
                self.sprites.size(Missile::KEY),
                Missile::KEY,
            ),
            motion: Motion::new(direction.unit_vector() * self.settings.missile_speed),
            direction,
            damage: self.settings.missile_damage,
        };
        let rect = missile.body.rect();
        missile.motion.refresh_cells(id, &rect, &mut self.grid);
        log::debug!("Fired {:?} heading {}", id, direction.name());
        self.missiles.push(missile);
        id
    }

    /// Remove a missile from the world and the grid
    pub fn despawn_missile(&mut self, index: usize) -> Missile {
        let mut missile = self.missiles.remove(index);
        missile.motion.leave_grid(missile.id, &mut self.grid);
        missile
    }

    /// Remove an enemy from the world and the grid
    pub fn despawn_enemy(&mut self, index: usize) -> Enemy {
        let mut enemy = self.enemies.remove(index);
        enemy.motion.leave_grid(enemy.id, &mut self.grid);
        enemy
    }

    /// Remove a pickup; the caller applies its value
    pub fn take_pickup(&mut self, index: usize) -> Pickup {
        self.pickups.remove(index)
    }

    pub fn set_phase(&mut self, phase: GamePhase) {
        if self.phase != phase {
            log::info!("Phase {:?} -> {:?} (score {})", self.phase, phase, self.score);
            self.phase = phase;
        }
    }
}

/// Every sprite key the world will ask for
fn required_keys(map: &TileMap) -> Vec<&'static str> {
    let mut keys = vec!["player", Player::IDLE, Player::SWIM, Missile::KEY, PROP_KEY, PICKUP_KEY];
    for kind in EnemyKind::ALL {
        keys.push(kind.config().key);
        keys.push(kind.config().death_animation);
    }
    for (_, _, tile) in map.tiles() {
        if let Tile::Platform(kind) = tile {
            keys.push(kind.key());
        }
    }
    keys.sort_unstable();
    keys.dedup();
    keys
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::assets::SpriteData;

    pub(crate) const ARENA: &str = "\
888888888888
6..........4
6..........4
6..........4
6..........4
6..........4
6..........4
222222222222
";

    pub(crate) fn settings() -> Settings {
        Settings {
            player_spawn: (2, 3),
            ..Settings::default()
        }
    }

    pub(crate) fn world_from(text: &str, settings: Settings) -> World {
        let map = TileMap::parse(text, settings.tile_size).unwrap();
        let atlas = SpriteData::builtin(settings.tile_size).unwrap();
        World::new(map, settings, &atlas).unwrap()
    }

    #[test]
    fn test_border_and_interior_platforms() {
        let text = "\
888888888
622222226
6.......4
6.......4
6.......4
6.......4
222222222
";
        let world = world_from(
            text,
            Settings {
                player_spawn: (3, 3),
                ..Settings::default()
            },
        );

        let mut row_one: Vec<&StaticEntity> = world
            .statics
            .values()
            .filter(|s| matches!(s.kind, StaticKind::Platform(_)) && s.body.pos.y == 36.0)
            .collect();
        row_one.sort_by(|a, b| a.body.pos.x.total_cmp(&b.body.pos.x));
        assert_eq!(row_one.len(), 9);

        assert_eq!(row_one[0].body.key, "wallLeft");
        for platform in &row_one[1..8] {
            assert_eq!(platform.body.key, "floor");
            assert!(!world.grid.cells_containing(platform.id).is_empty());
        }
        // Columns 0 and 8 are border tiles
        assert!(world.grid.cells_containing(row_one[0].id).is_empty());
        assert!(world.grid.cells_containing(row_one[8].id).is_empty());
    }

    #[test]
    fn test_tunnels_stay_out_of_grid() {
        let text = "\
888888888888
6..........4
6...0..5...4
6..........4
6..........4
6..........4
6..........4
222222222222
";
        let world = world_from(text, settings());
        let tunnels: Vec<&StaticEntity> = world
            .statics
            .values()
            .filter(|s| matches!(s.kind, StaticKind::Platform(kind) if kind.is_tunnel()))
            .collect();
        assert_eq!(tunnels.len(), 2);
        for tunnel in tunnels {
            assert!(world.grid.cells_containing(tunnel.id).is_empty());
        }
    }

    #[test]
    fn test_enemy_spawns_and_membership() {
        let text = ARENA.replacen("6..........4\n6..........4\n6..........4", "6..........4\n6.......E..4\n6..........4", 1);
        let world = world_from(&text, settings());
        assert_eq!(world.enemies.len(), 1);
        let enemy = &world.enemies[0];
        assert_eq!(enemy.body.pos, Vec2::new(8.0 * 36.0, 2.0 * 36.0));
        assert_eq!(enemy.motion.vel, Vec2::X);
        assert_eq!(enemy.motion.cells, world.grid.cells_overlapping(&enemy.body.rect()));
        assert_eq!(world.player.motion.cells, world.grid.cells_overlapping(&world.player.body.rect()));
    }

    #[test]
    fn test_environment_generation() {
        let world = world_from(ARENA, settings());
        // Twelve floor tiles on the bottom row
        assert_eq!(world.spawnpoints.len(), 12);

        let props = world.statics.values().filter(|s| s.kind == StaticKind::Prop).count();
        // Indices 0, 3, 6, 9 get props; 4 gets a pickup (9 already has a prop)
        assert_eq!(props, 4);
        assert_eq!(world.pickups.len(), 1);

        let pickup = &world.pickups[0];
        assert_eq!(pickup.value, 50);
        assert_eq!(pickup.body.rect().bottom(), 7.0 * 36.0);
        assert!(world.grid.cells_containing(pickup.id).is_empty());
    }

    #[test]
    fn test_props_never_grow_into_occupants() {
        let text = "\
888888888888888
6.............4
6.............4
6.....E.......4
6.22222222222.4
6.............4
6.............4
222222222222222
";
        // Player stands on (2, 4) and the enemy rests on (6, 4)
        let world = world_from(
            text,
            Settings {
                player_spawn: (2, 2),
                prop_every: 1,
                ..Settings::default()
            },
        );

        let props: Vec<&StaticEntity> = world.statics.values().filter(|s| s.kind == StaticKind::Prop).collect();
        assert!(!props.is_empty());
        for prop in &props {
            let rect = prop.body.rect();
            assert!(!rect.overlaps(&world.player.body.rect()));
            for enemy in &world.enemies {
                assert!(!rect.overlaps(&enemy.body.rect()), "{:?} grew into {:?}", prop.id, enemy.id);
            }
            for other in world.statics.values().filter(|s| s.id != prop.id) {
                assert!(
                    !rect.overlaps(&other.body.rect()) || world.grid.cells_containing(other.id).is_empty()
                );
            }
        }
        assert!(!props.iter().any(|p| p.body.pos.x == 2.0 * 36.0 || p.body.pos.x == 6.0 * 36.0));
    }

    #[test]
    fn test_spawnpoint_shuffle_is_seeded() {
        let a = world_from(ARENA, settings());
        let b = world_from(ARENA, settings());
        assert_eq!(a.spawnpoints, b.spawnpoints);
        let c = world_from(ARENA, Settings { seed: 1234, ..settings() });
        assert_eq!(c.spawnpoints.len(), a.spawnpoints.len());
    }

    #[test]
    fn test_setup_errors() {
        let map = TileMap::parse(ARENA, 36.0).unwrap();
        let atlas = SpriteData::builtin(36.0).unwrap();
        let err = World::new(map.clone(), Settings::default(), &atlas).unwrap_err();
        assert!(matches!(err, SetupError::SpawnOutsideMap { col: 6, row: 16, .. }));

        let empty = SpriteData::parse("name|width|height\n", 36.0).unwrap();
        let err = World::new(map.clone(), settings(), &empty).unwrap_err();
        assert!(matches!(err, SetupError::Asset(AssetError::MissingSprite(_))));

        let tiny = TileMap::parse("888\n6.4\n222", 36.0).unwrap();
        let err = World::new(tiny, Settings { player_spawn: (1, 1), ..settings() }, &atlas).unwrap_err();
        assert!(matches!(err, SetupError::Grid(GridError::InteriorTooSmall { .. })));
    }

    #[test]
    fn test_despawn_leaves_grid() {
        let mut world = world_from(ARENA, settings());
        let id = world.fire_missile();
        assert!(!world.grid.cells_containing(id).is_empty());
        let missile = world.despawn_missile(0);
        assert_eq!(missile.id, id);
        assert!(world.grid.cells_containing(id).is_empty());
    }
}
