//! Core world data types shared with the host game

mod block;
mod direction;
mod position;

pub use block::{BlockId, BlockState};
pub use direction::{BlockFace, Direction};
pub use position::VoxelPos;
