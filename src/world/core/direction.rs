use cgmath::Vector3;
use serde::{Deserialize, Serialize};

/// Horizontal facing of a door. The discriminant is the value stored in the
/// two low metadata bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Direction {
    West = 0,
    #[default]
    North = 1,
    East = 2,
    South = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::West,
        Direction::North,
        Direction::East,
        Direction::South,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Self {
        match index & 3 {
            0 => Direction::West,
            1 => Direction::North,
            2 => Direction::East,
            _ => Direction::South,
        }
    }

    /// (dx, dz) step toward this direction; north is -z
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::West => (-1, 0),
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
        }
    }

    pub fn opposite(self) -> Self {
        Self::from_index(self.index() + 2)
    }

    /// Clockwise when seen from above
    pub fn rotate_cw(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub fn rotate_ccw(self) -> Self {
        Self::from_index(self.index() + 3)
    }

    /// Facing of an entity looking along `yaw_degrees` (0 looks south,
    /// 90 looks west)
    pub fn from_yaw(yaw_degrees: f32) -> Self {
        let quadrant = ((yaw_degrees / 90.0) + 0.5).floor() as i32;
        match quadrant.rem_euclid(4) {
            0 => Direction::South,
            1 => Direction::West,
            2 => Direction::North,
            _ => Direction::East,
        }
    }

    /// Rotation the renderer applies around +y to orient a model facing this way
    pub fn model_rotation_degrees(self) -> f32 {
        -90.0 * self.index() as f32
    }

    pub fn to_face(self) -> BlockFace {
        match self {
            Direction::West => BlockFace::West,
            Direction::North => BlockFace::North,
            Direction::East => BlockFace::East,
            Direction::South => BlockFace::South,
        }
    }
}

/// One of the six faces of a block cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockFace {
    Down,
    Up,
    North, // -Z
    South, // +Z
    West,  // -X
    East,  // +X
}

impl BlockFace {
    pub const ALL: [BlockFace; 6] = [
        BlockFace::Down,
        BlockFace::Up,
        BlockFace::North,
        BlockFace::South,
        BlockFace::West,
        BlockFace::East,
    ];

    pub fn normal(&self) -> Vector3<f32> {
        let (x, y, z) = self.offset();
        Vector3::new(x as f32, y as f32, z as f32)
    }

    pub fn offset(&self) -> (i32, i32, i32) {
        match self {
            BlockFace::Down => (0, -1, 0),
            BlockFace::Up => (0, 1, 0),
            BlockFace::North => (0, 0, -1),
            BlockFace::South => (0, 0, 1),
            BlockFace::West => (-1, 0, 0),
            BlockFace::East => (1, 0, 0),
        }
    }

    pub fn opposite(&self) -> BlockFace {
        match self {
            BlockFace::Down => BlockFace::Up,
            BlockFace::Up => BlockFace::Down,
            BlockFace::North => BlockFace::South,
            BlockFace::South => BlockFace::North,
            BlockFace::West => BlockFace::East,
            BlockFace::East => BlockFace::West,
        }
    }

    /// Horizontal faces map to a direction, up and down do not
    pub fn horizontal(&self) -> Option<Direction> {
        match self {
            BlockFace::North => Some(Direction::North),
            BlockFace::South => Some(Direction::South),
            BlockFace::West => Some(Direction::West),
            BlockFace::East => Some(Direction::East),
            BlockFace::Up | BlockFace::Down => None,
        }
    }
}
