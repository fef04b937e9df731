//! Fixed timestep simulation tick
//!
//! Advances the world one frame in a fixed order: commands, player,
//! enemies, harpoons, camera.

use glam::Vec2;

use super::collision::{first_contact, first_overlapping, move_and_collide, reflect_at_boundary};
use super::entity::{Enemy, Player};
use super::input::DirectionKeys;
use super::rect::{Axis, Rect};
use super::state::{GamePhase, World};
use crate::consts::*;
use crate::settings::Settings;
use crate::{angle_to_x_axis, sign};

/// Ticks between autopilot shots
const AUTOPILOT_FIRE_INTERVAL: u64 = 20;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held direction keys
    pub keys: DirectionKeys,
    /// Fire a harpoon (one-shot)
    pub shoot: bool,
    /// Leave the game (one-shot)
    pub quit: bool,
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, input: &TickInput, dt: f32) {
    if world.phase != GamePhase::Playing {
        return;
    }
    if input.quit {
        world.set_phase(GamePhase::Quit);
        return;
    }

    world.time_ticks += 1;

    if input.shoot {
        world.fire_missile();
    }

    update_player(world, input.keys, dt);
    update_enemies(world, dt);
    update_missiles(world);

    let center = world.player.body.center();
    let map_size = world.map.size();
    world.camera.update(center, map_size);

    if world.player.is_dead() {
        world.set_phase(GamePhase::GameOver);
    } else if world.kills > 0 && world.enemies.is_empty() {
        world.set_phase(GamePhase::Cleared);
    }
}

fn update_player(world: &mut World, keys: DirectionKeys, dt: f32) {
    let player = &mut world.player;
    player.direction = player.direction.update(keys);
    player.motion.vel = keys.unit_velocity() * world.settings.player_speed;

    for axis in Axis::ORDER {
        move_and_collide(
            player.id,
            &mut player.body,
            &mut player.motion,
            axis,
            &mut world.grid,
            &world.statics,
        );
    }

    let rect = world.player.body.rect();

    // Ramming an enemy destroys it but costs hitpoints
    if let Some(index) = first_living_contact(&world.enemies, &rect, world.settings.enemy_collide_ratio) {
        let enemy = &mut world.enemies[index];
        if enemy.kill() {
            world.kills += 1;
            log::info!("Player rammed {:?} {:?}", enemy.kind, enemy.id);
            if world.player.health.damage(world.settings.contact_damage) {
                log::info!("Player destroyed");
            }
        }
    }

    // Removal and scoring happen together so a pickup counts once
    if let Some(index) = first_contact(
        &rect,
        world.settings.pickup_collide_ratio,
        world.pickups.iter().map(|p| p.body.rect()),
    ) {
        let pickup = world.take_pickup(index);
        world.score += pickup.value;
        log::debug!("Collected {:?} (+{}, score {})", pickup.id, pickup.value, world.score);
    }

    let player = &mut world.player;
    let action = if player.motion.vel == Vec2::ZERO {
        Player::IDLE
    } else {
        Player::SWIM
    };
    player.anim.change_action(action);
    player
        .anim
        .step(dt, PLAYER_FRAME_PERIOD, world.sprites.frames(action));

    let vel = player.motion.vel;
    let reflection = reflect_at_boundary(&mut player.body, vel, world.map.size(), world.settings.tile_size);
    if reflection.horizontal || reflection.vertical {
        let rect = player.body.rect();
        player.motion.refresh_cells(player.id, &rect, &mut world.grid);
    }
}

fn update_enemies(world: &mut World, dt: f32) {
    let player_center = world.player.body.center();
    let map_size = world.map.size();
    let mut finished = Vec::new();

    for (index, enemy) in world.enemies.iter_mut().enumerate() {
        let frames = world.sprites.frames(enemy.anim.action);
        enemy.anim.step(dt, ENEMY_FRAME_PERIOD, frames);

        if enemy.dying {
            if enemy.anim.finished(ENEMY_FRAME_PERIOD, frames) {
                finished.push(index);
            }
            continue;
        }

        steer(enemy, player_center, &world.settings);

        for axis in Axis::ORDER {
            move_and_collide(
                enemy.id,
                &mut enemy.body,
                &mut enemy.motion,
                axis,
                &mut world.grid,
                &world.statics,
            );
        }

        let vel = enemy.motion.vel;
        let reflection = reflect_at_boundary(&mut enemy.body, vel, map_size, world.settings.tile_size);
        if reflection.horizontal || reflection.vertical {
            let rect = enemy.body.rect();
            enemy.motion.refresh_cells(enemy.id, &rect, &mut world.grid);
        }
    }

    for index in finished.into_iter().rev() {
        let enemy = world.despawn_enemy(index);
        log::info!("{:?} {:?} removed", enemy.kind, enemy.id);
    }
}

/// Chase the player inside the chase radius, lunge inside the attack radius
fn steer(enemy: &mut Enemy, player_center: Vec2, settings: &Settings) {
    let target = player_center - enemy.body.center();
    let distance = target.length();
    let speed = enemy.config().speed;
    enemy.target = target;

    if settings.attack_radius < distance && distance < settings.chase_radius {
        enemy.facing = angle_to_x_axis(target);
        let toward = target.normalize_or_zero() * speed;
        enemy.motion.vel = Vec2::new(
            (speed * toward.x.abs()).sqrt() * sign(target.x),
            (speed * toward.y.abs()).sqrt() * sign(target.y),
        );
    }

    if distance < settings.attack_radius {
        enemy.motion.vel = enemy.motion.vel.normalize_or_zero() * settings.attack_speed;
    }
}

fn update_missiles(world: &mut World) {
    let map_size = world.map.size();
    let ratio = world.settings.enemy_collide_ratio;

    let mut index = 0;
    while index < world.missiles.len() {
        let missile = &mut world.missiles[index];
        missile.body.pos += missile.motion.vel;
        let rect = missile.body.rect();
        missile.motion.refresh_cells(missile.id, &rect, &mut world.grid);

        let spent = if let Some(target) = first_living_contact(&world.enemies, &rect, ratio) {
            let enemy = &mut world.enemies[target];
            if enemy.take_damage(missile.damage) {
                world.kills += 1;
                log::info!("{:?} {:?} destroyed by {:?}", enemy.kind, enemy.id, missile.id);
            } else {
                log::debug!("{:?} hit {:?} ({} hp left)", missile.id, enemy.id, enemy.health.hitpoints);
            }
            true
        } else {
            let candidates = world.grid.candidates(&missile.motion.cells);
            let center = rect.center();
            first_overlapping(&rect, &candidates, &world.statics).is_some()
                || center.x < 0.0
                || center.x > map_size.x
                || center.y < 0.0
                || center.y > map_size.y
        };

        if spent {
            world.despawn_missile(index);
        } else {
            index += 1;
        }
    }
}

/// Index of the first living enemy overlapping `rect` once both are shrunk by `ratio`
fn first_living_contact(enemies: &[Enemy], rect: &Rect, ratio: f32) -> Option<usize> {
    enemies
        .iter()
        .enumerate()
        .filter(|(_, enemy)| enemy.is_alive())
        .find(|(_, enemy)| rect.overlaps_scaled(&enemy.body.rect(), ratio))
        .map(|(index, _)| index)
}

/// Demo driver: swim toward the nearest living enemy and fire at intervals
pub fn autopilot(world: &World) -> TickInput {
    let center = world.player.body.center();
    let nearest = world
        .enemies
        .iter()
        .filter(|enemy| enemy.is_alive())
        .map(|enemy| enemy.body.center() - center)
        .min_by(|a, b| a.length_squared().total_cmp(&b.length_squared()));

    let Some(offset) = nearest else {
        return TickInput::default();
    };

    let dead_zone = world.settings.tile_size * 0.5;
    let keys = DirectionKeys {
        right: offset.x > dead_zone,
        left: offset.x < -dead_zone,
        down: offset.y > dead_zone,
        up: offset.y < -dead_zone,
    };

    TickInput {
        keys,
        shoot: offset.length() < world.settings.chase_radius
            && world.time_ticks % AUTOPILOT_FIRE_INTERVAL == 0,
        quit: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{EnemyKind, StaticKind};
    use crate::sim::input::Orientation;
    use crate::sim::map::PlatformKind;
    use crate::sim::state::tests::{ARENA, settings, world_from};

    /// Drop generated props and pickups so tests control what is on the map
    fn clear_environment(world: &mut World) {
        let props: Vec<_> = world
            .statics
            .values()
            .filter(|s| s.kind == StaticKind::Prop)
            .map(|s| s.id)
            .collect();
        for id in props {
            world.grid.remove_everywhere(id);
            world.statics.remove(&id);
        }
        world.pickups.clear();
    }

    fn arena() -> World {
        let mut world = world_from(ARENA, settings());
        clear_environment(&mut world);
        world
    }

    /// Radii of zero switch steering off, so enemies keep their initial drift
    fn drifting_arena() -> World {
        let mut world = world_from(
            ARENA,
            Settings {
                chase_radius: 0.0,
                attack_radius: 0.0,
                ..settings()
            },
        );
        clear_environment(&mut world);
        world
    }

    fn held(flags: [bool; 4]) -> TickInput {
        TickInput {
            keys: DirectionKeys::from_flags(flags),
            ..Default::default()
        }
    }

    #[test]
    fn test_quit_stops_ticking() {
        let mut world = arena();
        tick(&mut world, &TickInput::default(), SIM_DT);
        assert_eq!(world.time_ticks, 1);

        let quit = TickInput {
            quit: true,
            ..Default::default()
        };
        tick(&mut world, &quit, SIM_DT);
        assert_eq!(world.phase, GamePhase::Quit);

        tick(&mut world, &TickInput::default(), SIM_DT);
        assert_eq!(world.time_ticks, 1);
    }

    #[test]
    fn test_player_lands_on_interior_floor() {
        let text = ARENA.replacen("6..........4\n6..........4\n6..........4\n6..........4\n6..........4",
            "6..........4\n6..........4\n6..........4\n6..........4\n6.2........4", 1);
        let mut world = world_from(&text, settings());
        clear_environment(&mut world);
        // Player spans rows 3-4; the floor tile sits at (2, 5)
        let down = held([false, false, true, false]);
        tick(&mut world, &down, SIM_DT);

        assert_eq!(world.player.body.pos.y, 108.0);
        assert_eq!(world.player.body.rect().bottom(), 180.0);
        assert_eq!(world.player.direction, Orientation::South);
        assert_eq!(world.player.anim.action, Player::SWIM);
        assert_eq!(
            world.player.motion.cells,
            world.grid.cells_overlapping(&world.player.body.rect())
        );
    }

    #[test]
    fn test_border_reflection_does_not_compound() {
        let mut world = arena();
        let left = held([false, true, false, false]);
        for _ in 0..30 {
            tick(&mut world, &left, SIM_DT);
            assert!(world.player.body.pos.x >= 36.0);
        }
        // Steps to 36, touches the border and is pushed back one step
        assert_eq!(world.player.body.pos.x, 40.0);
    }

    #[test]
    fn test_pickup_scores_once() {
        let mut world = arena();
        // Rests on (2, 5), inside the player's rectangle
        world.spawn_pickup(2, 5);
        assert_eq!(world.pickups.len(), 1);

        tick(&mut world, &TickInput::default(), SIM_DT);
        assert_eq!(world.score, 50);
        assert!(world.pickups.is_empty());

        tick(&mut world, &TickInput::default(), SIM_DT);
        assert_eq!(world.score, 50);
    }

    #[test]
    fn test_harpoon_kills_on_second_hit() {
        // The spinefish just drifts right
        let mut world = drifting_arena();
        world.spawn_enemy(EnemyKind::Spinefish, 5, 3);
        world.player.direction = Orientation::East;

        let fire = TickInput {
            shoot: true,
            ..Default::default()
        };
        let volley = |world: &mut World| {
            tick(world, &fire, SIM_DT);
            for _ in 0..30 {
                if world.missiles.is_empty() {
                    break;
                }
                tick(world, &TickInput::default(), SIM_DT);
            }
            assert!(world.missiles.is_empty());
        };

        volley(&mut world);
        assert_eq!(world.enemies[0].health.hitpoints, 10);
        assert!(world.enemies[0].is_alive());

        volley(&mut world);
        assert_eq!(world.enemies[0].health.hitpoints, 0);
        assert!(!world.enemies[0].is_alive());
        assert_eq!(world.kills, 1);

        // A third harpoon passes through the dying fish
        volley(&mut world);
        assert_eq!(world.enemies[0].health.hitpoints, 0);
        assert_eq!(world.kills, 1);
    }

    #[test]
    fn test_harpoon_expires_on_platform() {
        let mut world = arena();
        let block = world.spawn_platform(PlatformKind::Floor, 5, 3);
        world.player.direction = Orientation::East;

        let fire = TickInput {
            shoot: true,
            ..Default::default()
        };
        tick(&mut world, &fire, SIM_DT);
        let id = world.missiles[0].id;
        tick(&mut world, &TickInput::default(), SIM_DT);
        // 122..158 still short of the block at 180
        assert_eq!(world.missiles.len(), 1);

        tick(&mut world, &TickInput::default(), SIM_DT);
        assert!(world.missiles.is_empty());
        assert!(world.grid.cells_containing(id).is_empty());
        assert!(world.statics.contains_key(&block));
    }

    #[test]
    fn test_harpoon_expires_off_map() {
        let mut world = arena();
        world.player.direction = Orientation::East;

        let fire = TickInput {
            shoot: true,
            ..Default::default()
        };
        tick(&mut world, &fire, SIM_DT);
        // Center starts at x = 90 and moves 25 per tick; the map is 432 wide
        for _ in 1..13 {
            tick(&mut world, &TickInput::default(), SIM_DT);
        }
        assert_eq!(world.missiles.len(), 1);
        assert_eq!(world.missiles[0].body.center().x, 415.0);

        tick(&mut world, &TickInput::default(), SIM_DT);
        assert!(world.missiles.is_empty());
    }

    #[test]
    fn test_enemy_stops_at_platform() {
        let mut world = drifting_arena();
        // Spinefish spans columns 6-7, touching the block at column 8
        world.spawn_enemy(EnemyKind::Spinefish, 6, 2);
        let block = world.spawn_platform(PlatformKind::Floor, 8, 2);
        let block_rect = world.statics[&block].body.rect();

        for _ in 0..5 {
            tick(&mut world, &TickInput::default(), SIM_DT);
            let enemy = &world.enemies[0];
            assert_eq!(enemy.body.pos, Vec2::new(216.0, 72.0));
            assert!(!enemy.body.rect().overlaps(&block_rect));
            assert_eq!(enemy.motion.cells, world.grid.cells_overlapping(&enemy.body.rect()));
        }
    }

    #[test]
    fn test_enemy_reflects_at_border() {
        let mut world = drifting_arena();
        // Right edge sits on the border at x = 396
        world.spawn_enemy(EnemyKind::Spinefish, 9, 3);

        for _ in 0..5 {
            tick(&mut world, &TickInput::default(), SIM_DT);
            assert_eq!(world.enemies[0].body.pos.x, 324.0);
        }
    }

    #[test]
    fn test_ramming_and_clearing() {
        let mut world = drifting_arena();
        world.spawn_enemy(EnemyKind::Dartfish, 2, 3);

        tick(&mut world, &TickInput::default(), SIM_DT);
        assert!(!world.enemies[0].is_alive());
        assert_eq!(world.enemies[0].motion.vel, Vec2::ZERO);
        assert_eq!(world.player.health.hitpoints, PLAYER_HITPOINTS - CONTACT_DAMAGE);
        assert_eq!(world.phase, GamePhase::Playing);

        // Death reel plays out, then the enemy is removed
        for _ in 0..120 {
            tick(&mut world, &TickInput::default(), SIM_DT);
        }
        assert!(world.enemies.is_empty());
        assert_eq!(world.phase, GamePhase::Cleared);
    }

    #[test]
    fn test_fatal_ram_ends_run() {
        let mut world = world_from(
            ARENA,
            Settings {
                contact_damage: PLAYER_HITPOINTS,
                chase_radius: 0.0,
                attack_radius: 0.0,
                ..settings()
            },
        );
        clear_environment(&mut world);
        world.spawn_enemy(EnemyKind::Daddyfish, 2, 3);

        tick(&mut world, &TickInput::default(), SIM_DT);
        assert!(world.player.is_dead());
        assert_eq!(world.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_chase_velocity() {
        let mut world = arena();
        world.spawn_enemy(EnemyKind::Spinefish, 7, 3);
        let player_center = world.player.body.center();
        let enemy = &mut world.enemies[0];
        steer(enemy, player_center, &world.settings);

        // Target is left of and slightly below the fish, between the radii
        let target = player_center - enemy.body.center();
        assert!(target.length() > ATTACK_RADIUS && target.length() < CHASE_RADIUS);
        let toward = target.normalize() * 2.0;
        assert!((enemy.motion.vel.x + (2.0 * toward.x.abs()).sqrt()).abs() < 1e-5);
        assert!((enemy.motion.vel.y - (2.0 * toward.y.abs()).sqrt()).abs() < 1e-5);
        assert!(enemy.upside_down());
    }

    #[test]
    fn test_autopilot_heads_for_nearest_enemy() {
        let mut world = arena();
        assert_eq!(autopilot(&world).keys, DirectionKeys::NONE);

        world.spawn_enemy(EnemyKind::Dartfish, 8, 3);
        let input = autopilot(&world);
        assert!(input.keys.right && !input.keys.left);
        assert!(!input.keys.up);
    }

    #[test]
    fn test_determinism() {
        // Two worlds with the same seed and inputs end up identical
        let text = include_str!("../../maps/reef.txt");
        let mut world1 = world_from(text, Settings::default());
        let mut world2 = world_from(text, Settings::default());

        for _ in 0..600 {
            let input = autopilot(&world1);
            tick(&mut world1, &input, SIM_DT);
            let input = autopilot(&world2);
            tick(&mut world2, &input, SIM_DT);
        }

        assert_eq!(world1.time_ticks, world2.time_ticks);
        assert_eq!(world1.player.body.pos, world2.player.body.pos);
        assert_eq!(world1.score, world2.score);
        assert_eq!(world1.kills, world2.kills);
        assert_eq!(world1.phase, world2.phase);
        assert_eq!(world1.enemies, world2.enemies);
        assert_eq!(world1.missiles, world2.missiles);
    }
}
