//! Persistence Module
//!
//! Door instances and multi-block groups saved as flat records. Timelines are
//! never saved; they are rebuilt from the restored instances.

pub mod record_data;
pub mod record_operations;

pub use record_data::{DoorRecord, DoorSnapshot, GroupRecord, SnapshotFormat};
pub use record_operations::{
    decode_snapshot, door_record, encode_snapshot, group_record, load_snapshot, load_system, record_at,
    restore_door, restore_record, restore_system, save_snapshot, save_system, snapshot_system,
};

pub type PersistenceResult<T> = Result<T, PersistenceError>;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Binary encoding error: {0}")]
    Binary(#[from] bincode::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("Unknown descriptor: {0}")]
    UnknownDescriptor(String),
    #[error("Invalid value for '{key}': {value}")]
    InvalidField { key: String, value: String },
}
