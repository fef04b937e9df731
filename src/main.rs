//! Reef Scroller entry point
//!
//! Headless driver: loads a map, lets the autopilot play for a number of
//! frames and reports how the run went.
//!
//! Usage: `reef-scroller <map.txt> [frames] [settings.json] [spritedata.txt]`

use anyhow::{Context, Result, bail};

use reef_scroller::consts::*;
use reef_scroller::render::{Renderer, SpriteDraw, render_world};
use reef_scroller::sim::{GamePhase, TileMap, World, autopilot, tick};
use reef_scroller::{Settings, SpriteData};

const USAGE: &str = "usage: reef-scroller <map.txt> [frames] [settings.json] [spritedata.txt]";

/// Counts draws instead of blitting them
#[derive(Default)]
struct DrawCounter {
    total: usize,
    peak: usize,
}

impl Renderer for DrawCounter {
    fn draw(&mut self, _sprite: &SpriteDraw) {
        self.total += 1;
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(map_path) = args.first() else {
        bail!(USAGE);
    };

    let frames: u64 = match args.get(1) {
        Some(arg) => arg
            .parse()
            .with_context(|| format!("invalid frame count '{arg}'\n{USAGE}"))?,
        None => 60 * FPS as u64,
    };

    let settings = match args.get(2) {
        Some(path) => Settings::load(path).with_context(|| format!("loading settings {path}"))?,
        None => Settings::default(),
    };

    let sprites = match args.get(3) {
        Some(path) => SpriteData::load(path, settings.tile_size)
            .with_context(|| format!("loading sprite data {path}"))?,
        None => SpriteData::builtin(settings.tile_size).context("parsing built-in sprite data")?,
    };

    let map = TileMap::load(map_path, settings.tile_size)
        .with_context(|| format!("loading map {map_path}"))?;
    let mut world = World::new(map, settings, &sprites).context("building world")?;

    log::info!("Reef Scroller (headless) starting, {} frames", frames);

    let mut counter = DrawCounter::default();
    let mut frame = 0;
    while frame < frames && world.phase == GamePhase::Playing {
        let input = autopilot(&world);
        tick(&mut world, &input, SIM_DT);

        let before = counter.total;
        render_world(&world, &mut counter);
        counter.peak = counter.peak.max(counter.total - before);
        frame += 1;
    }

    log::info!(
        "Stopped after {} frames in {:?}: score {}, {} kills, {} enemies left, player hp {}",
        frame,
        world.phase,
        world.score,
        world.kills,
        world.enemies.len(),
        world.player.health.hitpoints
    );
    println!(
        "{:?} after {} frames | score {} | kills {} | hp {}/{} | peak draws {}",
        world.phase,
        frame,
        world.score,
        world.kills,
        world.player.health.hitpoints,
        world.player.health.max,
        counter.peak
    );

    Ok(())
}
