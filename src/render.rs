//! Render seam
//!
//! Turns the world into a list of camera-space sprite draws. Actual blitting
//! belongs to whatever implements [`Renderer`].

use crate::sim::entity::Body;
use crate::sim::rect::Rect;
use crate::sim::{Camera, World};

/// One sprite to draw this frame
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteDraw {
    pub key: &'static str,
    pub frame: usize,
    /// Screen-space rectangle
    pub rect: Rect,
    /// Counter-clockwise rotation in degrees
    pub rotation: f32,
    /// Mirror vertically before rotating
    pub flip: bool,
}

/// Draw target
pub trait Renderer {
    fn draw(&mut self, sprite: &SpriteDraw);
}

fn plain(camera: &Camera, body: &Body, frame: usize) -> SpriteDraw {
    SpriteDraw {
        key: body.key,
        frame,
        rect: camera.apply(&body.rect()),
        rotation: 0.0,
        flip: false,
    }
}

/// Build the draw list, back to front, skipping anything off screen
pub fn draw_list(world: &World) -> Vec<SpriteDraw> {
    let camera = &world.camera;
    let mut draws = Vec::new();

    draws.extend(world.statics.values().map(|s| plain(camera, &s.body, 0)));
    draws.extend(world.pickups.iter().map(|p| plain(camera, &p.body, 0)));

    for enemy in &world.enemies {
        let mut draw = plain(camera, &enemy.body, enemy.anim.frame);
        draw.key = enemy.anim.action;
        if !enemy.dying {
            draw.rotation = enemy.facing;
            draw.flip = enemy.upside_down();
        }
        draws.push(draw);
    }

    for missile in &world.missiles {
        let mut draw = plain(camera, &missile.body, 0);
        draw.rotation = crate::angle_to_x_axis(missile.motion.vel);
        draws.push(draw);
    }

    let player = &world.player;
    let mut draw = plain(camera, &player.body, player.anim.frame);
    draw.key = player.anim.action;
    draws.push(draw);

    draws.retain(|draw| camera.is_visible(&draw.rect));
    draws
}

/// Send one frame's draws to `renderer`; returns how many were drawn
pub fn render_world(world: &World, renderer: &mut impl Renderer) -> usize {
    let draws = draw_list(world);
    for draw in &draws {
        renderer.draw(draw);
    }
    draws.len()
}
