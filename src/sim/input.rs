//! Direction-key mapping
//!
//! Keyboard polling happens outside the simulation; it hands us four flags
//! per frame and we turn them into a facing and a unit velocity.

use glam::Vec2;

/// Held direction keys, in the order right, left, down, up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionKeys {
    pub right: bool,
    pub left: bool,
    pub down: bool,
    pub up: bool,
}

impl DirectionKeys {
    pub const NONE: Self = Self::from_flags([false; 4]);

    /// Build from `[right, left, down, up]`
    pub const fn from_flags(flags: [bool; 4]) -> Self {
        Self {
            right: flags[0],
            left: flags[1],
            down: flags[2],
            up: flags[3],
        }
    }

    /// Sum of the held directions, normalized (zero when nothing net is held)
    pub fn unit_velocity(&self) -> Vec2 {
        let mut v = Vec2::ZERO;
        if self.right {
            v += Vec2::X;
        }
        if self.left {
            v -= Vec2::X;
        }
        if self.down {
            v += Vec2::Y;
        }
        if self.up {
            v -= Vec2::Y;
        }
        v.normalize_or_zero()
    }
}

/// The eight facings a sprite can have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    East,
    West,
    South,
    North,
    NorthEast,
    SouthEast,
    NorthWest,
    SouthWest,
}

impl Orientation {
    pub const ALL: [Orientation; 8] = [
        Orientation::East,
        Orientation::West,
        Orientation::South,
        Orientation::North,
        Orientation::NorthEast,
        Orientation::SouthEast,
        Orientation::NorthWest,
        Orientation::SouthWest,
    ];

    /// Exact key pattern for this facing
    pub const fn keys(self) -> DirectionKeys {
        match self {
            Orientation::East => DirectionKeys::from_flags([true, false, false, false]),
            Orientation::West => DirectionKeys::from_flags([false, true, false, false]),
            Orientation::South => DirectionKeys::from_flags([false, false, true, false]),
            Orientation::North => DirectionKeys::from_flags([false, false, false, true]),
            Orientation::NorthEast => DirectionKeys::from_flags([true, false, false, true]),
            Orientation::SouthEast => DirectionKeys::from_flags([true, false, true, false]),
            Orientation::NorthWest => DirectionKeys::from_flags([false, true, false, true]),
            Orientation::SouthWest => DirectionKeys::from_flags([false, true, true, false]),
        }
    }

    /// Facing whose pattern matches `keys` exactly, if any
    pub fn from_keys(keys: DirectionKeys) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.keys() == keys)
    }

    /// New facing for `keys`, keeping `self` when no pattern matches
    pub fn update(self, keys: DirectionKeys) -> Self {
        Self::from_keys(keys).unwrap_or(self)
    }

    /// Unit vector pointing this way (y down)
    pub fn unit_vector(self) -> Vec2 {
        self.keys().unit_velocity()
    }

    pub fn name(self) -> &'static str {
        match self {
            Orientation::East => "East",
            Orientation::West => "West",
            Orientation::South => "South",
            Orientation::North => "North",
            Orientation::NorthEast => "NorthEast",
            Orientation::SouthEast => "SouthEast",
            Orientation::NorthWest => "NorthWest",
            Orientation::SouthWest => "SouthWest",
        }
    }
}
