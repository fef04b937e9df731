//! Sprite size and frame tables
//!
//! Image decoding and frame slicing happen outside this crate. The simulation
//! only needs to know how big each sprite category is and how many frames its
//! reel has, which is what [`SpriteAtlas`] answers.
//!
//! The table format is one sprite per line, `name|width|height[|frames]`, with
//! sizes in tiles and a header line first.

use std::collections::BTreeMap;
use std::path::Path;

use glam::Vec2;
use thiserror::Error;

/// Sprite table shipped with the crate
const BUILTIN_TABLE: &str = include_str!("../assets/spritedata.txt");

/// Errors reading sprite data or looking up a sprite
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read sprite data {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("sprite data line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("no sprite data for '{0}'")]
    MissingSprite(String),
}

/// Answers sprite questions for the simulation
pub trait SpriteAtlas {
    /// Size in pixels, if the category exists
    fn size(&self, key: &str) -> Option<Vec2>;

    /// Frames in the category's reel (at least 1 for known keys, 0 otherwise)
    fn frame_count(&self, key: &str) -> usize;

    /// Size in pixels, failing for unknown categories
    fn require(&self, key: &str) -> Result<Vec2, AssetError> {
        self.size(key)
            .ok_or_else(|| AssetError::MissingSprite(key.to_string()))
    }
}

/// One row of the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteInfo {
    /// Width in tiles
    pub width: u32,
    /// Height in tiles
    pub height: u32,
    pub frames: usize,
}

/// Parsed sprite table, scaled by the tile size
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteData {
    tile_size: f32,
    sprites: BTreeMap<String, SpriteInfo>,
}

impl SpriteData {
    pub fn parse(text: &str, tile_size: f32) -> Result<Self, AssetError> {
        let mut sprites = BTreeMap::new();

        // First line is the column header
        for (index, raw) in text.lines().enumerate().skip(1) {
            let line = index + 1;
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }

            let fields: Vec<&str> = raw.split('|').map(str::trim).collect();
            if fields.len() < 3 || fields.len() > 4 || fields[0].is_empty() {
                return Err(AssetError::Parse {
                    line,
                    reason: format!("expected name|width|height[|frames], got '{raw}'"),
                });
            }

            let number = |field: &str, what: &str| -> Result<u32, AssetError> {
                field.parse::<u32>().map_err(|_| AssetError::Parse {
                    line,
                    reason: format!("{what} '{field}' is not a whole number"),
                })
            };
            let width = number(fields[1], "width")?;
            let height = number(fields[2], "height")?;
            let frames = match fields.get(3) {
                Some(&field) => number(field, "frame count")?.max(1) as usize,
                None => 1,
            };

            if sprites
                .insert(fields[0].to_string(), SpriteInfo { width, height, frames })
                .is_some()
            {
                log::warn!("Sprite '{}' listed twice, keeping line {}", fields[0], line);
            }
        }

        Ok(Self { tile_size, sprites })
    }

    /// Read and parse a sprite table file
    pub fn load(path: impl AsRef<Path>, tile_size: f32) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| AssetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let data = Self::parse(&text, tile_size)?;
        log::info!("Loaded {} sprite categories from {}", data.len(), path.display());
        Ok(data)
    }

    /// The table bundled with the crate
    pub fn builtin(tile_size: f32) -> Result<Self, AssetError> {
        Self::parse(BUILTIN_TABLE, tile_size)
    }

    pub fn get(&self, key: &str) -> Option<&SpriteInfo> {
        self.sprites.get(key)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

impl SpriteAtlas for SpriteData {
    fn size(&self, key: &str) -> Option<Vec2> {
        self.sprites
            .get(key)
            .map(|info| Vec2::new(info.width as f32, info.height as f32) * self.tile_size)
    }

    fn frame_count(&self, key: &str) -> usize {
        self.sprites.get(key).map_or(0, |info| info.frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_table() {
        let data = SpriteData::parse("name|width|height|frames\nfloor|1|1\ndaddyfish|4|4|6\n\n", 36.0).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.size("floor"), Some(Vec2::new(36.0, 36.0)));
        assert_eq!(data.frame_count("floor"), 1);
        assert_eq!(data.size("daddyfish"), Some(Vec2::new(144.0, 144.0)));
        assert_eq!(data.frame_count("daddyfish"), 6);
        assert_eq!(data.frame_count("shark"), 0);
    }

    #[test]
    fn test_parse_errors_report_line() {
        let err = SpriteData::parse("name|width|height\nfloor|1|1\nroof|one|1\n", 36.0).unwrap_err();
        assert!(matches!(err, AssetError::Parse { line: 3, .. }));

        let err = SpriteData::parse("name|width|height\nfloor|1\n", 36.0).unwrap_err();
        assert!(matches!(err, AssetError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_require_missing_sprite() {
        let data = SpriteData::parse("name|width|height\n", 36.0).unwrap();
        assert!(data.is_empty());
        assert!(matches!(data.require("floor"), Err(AssetError::MissingSprite(key)) if key == "floor"));
    }

    #[test]
    fn test_builtin_covers_simulation_keys() {
        use crate::sim::entity::{EnemyKind, Missile, Player};
        use crate::sim::map::PlatformKind;

        let data = SpriteData::builtin(36.0).unwrap();
        for code in "8246791305".chars() {
            let kind = PlatformKind::from_code(code).unwrap();
            assert!(data.require(kind.key()).is_ok(), "missing {}", kind.key());
        }
        for kind in EnemyKind::ALL {
            assert!(data.require(kind.config().key).is_ok());
            assert!(data.frame_count(kind.config().death_animation) > 0);
        }
        for key in ["player", Player::IDLE, Player::SWIM, Missile::KEY, "vegetation", "pearl"] {
            assert!(data.require(key).is_ok(), "missing {key}");
        }
        assert_eq!(data.size("player"), Some(Vec2::new(36.0, 72.0)));
    }
}
