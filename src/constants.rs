//! Shared constants for door geometry, timing and block metadata.

/// Door geometry in block units
pub mod geometry {
    /// Thickness of a door panel (3/16 of a block)
    pub const DOOR_WIDTH: f32 = 0.1875;

    /// Thickness of a rusty hatch plate
    pub const HATCH_WIDTH: f32 = 0.125;

    /// Size of a rusty hatch multi-block before rotation (x, y, z)
    pub const HATCH_SIZE: [i32; 3] = [2, 3, 2];

    /// Size of a carriage door multi-block before rotation (x, y, z)
    pub const CARRIAGE_SIZE: [i32; 3] = [4, 5, 1];
}

/// Timing defaults, all in world ticks
pub mod timing {
    /// Opening time of vanilla-like doors and trapdoors
    pub const DEFAULT_OPENING_TIME: u32 = 6;

    /// Time for a single garage door segment to roll up
    pub const GARAGE_SEGMENT_TICKS: u32 = 10;

    /// Opening time of the rusty hatch (handle spin + swing)
    pub const HATCH_OPENING_TIME: u32 = 20;

    /// Opening time of the carriage door leaves
    pub const CARRIAGE_OPENING_TIME: u32 = 20;

    /// Upper bound accepted for any configured opening or auto-close time
    pub const MAX_CONFIGURED_TICKS: u32 = 20 * 60 * 10;
}

/// Block metadata layout written to the host world
pub mod metadata {
    /// Bits 0-1 hold the facing index
    pub const DIRECTION_MASK: u8 = 0b11;
    pub const FLAG_OPENED: u8 = 1 << 2;
    pub const FLAG_TOPBLOCK: u8 = 1 << 3;
    pub const FLAG_REVERSED: u8 = 1 << 4;
    pub const FLAG_POWERED: u8 = 1 << 5;
}

/// Persistence format
pub mod persistence {
    /// Current record version, bumped on incompatible layout changes
    pub const RECORD_VERSION: u32 = 1;
}
