use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a block type in the host world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(transparent)]
pub struct BlockId(pub u16);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            BlockId::AIR => write!(f, "Air"),
            BlockId::STONE => write!(f, "Stone"),
            _ => write!(f, "Block({})", self.0),
        }
    }
}

impl BlockId {
    pub const AIR: BlockId = BlockId(0);
    pub const STONE: BlockId = BlockId(3);

    /// First id handed out to door block types; ids below belong to the host
    pub const FIRST_DOOR_ID: u16 = 200;

    /// Create a new BlockId from a raw u16 value
    pub const fn new(id: u16) -> Self {
        BlockId(id)
    }
}

/// Block type plus its metadata byte, as stored in a world cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct BlockState {
    pub id: BlockId,
    pub metadata: u8,
}

impl BlockState {
    pub const AIR: BlockState = BlockState {
        id: BlockId::AIR,
        metadata: 0,
    };

    pub const fn new(id: BlockId, metadata: u8) -> Self {
        Self { id, metadata }
    }

    pub fn is_air(&self) -> bool {
        self.id == BlockId::AIR
    }
}
