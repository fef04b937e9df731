//! Tile map loading
//!
//! A map is plain text, one line per row and one character per tile. Digits
//! name platform pieces, `E` marks an enemy spawn, anything else is open water.

use std::path::Path;

use glam::Vec2;
use thiserror::Error;

/// Errors reading or parsing a map
#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to read map file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("map contains no rows")]
    Empty,
    #[error("map row {row} has {found} tiles, expected {expected}")]
    UnequalRows {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Platform piece orientations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformKind {
    Roof,
    Floor,
    WallRight,
    WallLeft,
    TopRightCorner,
    TopLeftCorner,
    BottomLeftCorner,
    BottomRightCorner,
    TunnelRight,
    TunnelLeft,
}

impl PlatformKind {
    /// Map-file digit lookup
    pub fn from_code(code: char) -> Option<Self> {
        let kind = match code {
            '8' => PlatformKind::Roof,
            '2' => PlatformKind::Floor,
            '4' => PlatformKind::WallRight,
            '6' => PlatformKind::WallLeft,
            '7' => PlatformKind::TopRightCorner,
            '9' => PlatformKind::TopLeftCorner,
            '1' => PlatformKind::BottomLeftCorner,
            '3' => PlatformKind::BottomRightCorner,
            '0' => PlatformKind::TunnelRight,
            '5' => PlatformKind::TunnelLeft,
            _ => return None,
        };
        Some(kind)
    }

    /// Sprite category key
    pub fn key(&self) -> &'static str {
        match self {
            PlatformKind::Roof => "roof",
            PlatformKind::Floor => "floor",
            PlatformKind::WallRight => "wallRight",
            PlatformKind::WallLeft => "wallLeft",
            PlatformKind::TopRightCorner => "topRightCorner",
            PlatformKind::TopLeftCorner => "topLeftCorner",
            PlatformKind::BottomLeftCorner => "bottomLeftCorner",
            PlatformKind::BottomRightCorner => "bottomRightCorner",
            PlatformKind::TunnelRight => "tunnelRight",
            PlatformKind::TunnelLeft => "tunnelLeft",
        }
    }

    /// Tunnel mouths are passable and never enter the spatial grid
    pub fn is_tunnel(&self) -> bool {
        matches!(self, PlatformKind::TunnelLeft | PlatformKind::TunnelRight)
    }
}

/// Decoded contents of one map cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Empty,
    Platform(PlatformKind),
    EnemySpawn,
}

impl Tile {
    pub fn from_code(code: char) -> Self {
        if code == 'E' {
            return Tile::EnemySpawn;
        }
        PlatformKind::from_code(code).map_or(Tile::Empty, Tile::Platform)
    }
}

/// Immutable grid of tile codes
#[derive(Debug, Clone, PartialEq)]
pub struct TileMap {
    rows: Vec<Vec<char>>,
    tile_size: f32,
}

impl TileMap {
    /// Parse map text. Tabs are dropped and each line trimmed; trailing blank
    /// lines are ignored.
    pub fn parse(text: &str, tile_size: f32) -> Result<Self, MapError> {
        let mut rows: Vec<Vec<char>> = text
            .lines()
            .map(|line| line.replace('\t', "").trim().chars().collect())
            .collect();
        while rows.last().is_some_and(|row| row.is_empty()) {
            rows.pop();
        }

        let expected = rows.first().map(Vec::len).ok_or(MapError::Empty)?;
        if expected == 0 {
            return Err(MapError::Empty);
        }
        if let Some((row, found)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != expected)
        {
            return Err(MapError::UnequalRows { row, expected, found });
        }

        Ok(Self { rows, tile_size })
    }

    /// Read and parse a map file
    pub fn load(path: impl AsRef<Path>, tile_size: f32) -> Result<Self, MapError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let map = Self::parse(&text, tile_size)?;
        log::info!(
            "Loaded map {} ({} x {} tiles, {} x {} px)",
            path.display(),
            map.cols(),
            map.rows(),
            map.width(),
            map.height()
        );
        Ok(map)
    }

    /// Width in tiles
    pub fn cols(&self) -> usize {
        self.rows[0].len()
    }

    /// Height in tiles
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Width in pixels
    pub fn width(&self) -> f32 {
        self.cols() as f32 * self.tile_size
    }

    /// Height in pixels
    pub fn height(&self) -> f32 {
        self.rows() as f32 * self.tile_size
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width(), self.height())
    }

    /// Raw code at (col, row)
    pub fn code(&self, col: usize, row: usize) -> Option<char> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn tile(&self, col: usize, row: usize) -> Option<Tile> {
        self.code(col, row).map(Tile::from_code)
    }

    /// Whether (col, row) is on the outer one-tile ring of the map
    pub fn is_border(&self, col: usize, row: usize) -> bool {
        col == 0 || row == 0 || col + 1 >= self.cols() || row + 1 >= self.rows()
    }

    /// All tiles in row-major order as (col, row, tile)
    pub fn tiles(&self) -> impl Iterator<Item = (usize, usize, Tile)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, codes)| {
            codes
                .iter()
                .enumerate()
                .map(move |(col, &code)| (col, row, Tile::from_code(code)))
        })
    }

    /// Top-left pixel position of a tile
    pub fn tile_origin(&self, col: usize, row: usize) -> Vec2 {
        Vec2::new(col as f32, row as f32) * self.tile_size
    }
}
