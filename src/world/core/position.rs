use serde::{Deserialize, Serialize};
use std::fmt;

use super::direction::{BlockFace, Direction};

/// Integer world position of a block cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct VoxelPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl VoxelPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub fn up(self) -> Self {
        self.offset(0, 1, 0)
    }

    pub fn down(self) -> Self {
        self.offset(0, -1, 0)
    }

    /// Neighbour one step toward a horizontal direction
    pub fn towards(self, dir: Direction) -> Self {
        let (dx, dz) = dir.offset();
        self.offset(dx, 0, dz)
    }

    /// Neighbour across a face
    pub fn across(self, face: BlockFace) -> Self {
        let (dx, dy, dz) = face.offset();
        self.offset(dx, dy, dz)
    }

    /// All six face neighbours
    pub fn neighbors(self) -> [VoxelPos; 6] {
        BlockFace::ALL.map(|face| self.across(face))
    }
}

impl fmt::Display for VoxelPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
