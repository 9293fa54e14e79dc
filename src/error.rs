//! Error handling for Hearth Doors
//!
//! Only setup-time operations (registration, placement, persistence) return
//! errors. The per-tick path degrades to logged no-ops instead.

use std::error::Error as StdError;
use std::fmt;

use crate::world::VoxelPos;

/// Main error type for Hearth Doors
#[derive(Debug)]
pub enum DoorError {
    // Configuration Errors
    DuplicateDescriptor {
        name: String,
    },
    UnknownDescriptor {
        name: String,
    },
    InvalidConfig {
        field: String,
        value: String,
        reason: String,
    },

    // World Errors
    NoDoorAt {
        pos: VoxelPos,
    },
    PlacementConflict {
        pos: VoxelPos,
    },

    // Persistence Errors
    SerializationError {
        context: String,
        error: String,
    },
    DeserializationError {
        context: String,
        error: String,
    },
    VersionMismatch {
        expected: u32,
        found: u32,
    },
    IoError {
        path: String,
        error: String,
    },

    // Generic fallback for unexpected errors
    Internal {
        message: String,
    },
}

impl fmt::Display for DoorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoorError::DuplicateDescriptor { name } => {
                write!(f, "Descriptor already registered: {}", name)
            }
            DoorError::UnknownDescriptor { name } => write!(f, "Unknown descriptor: {}", name),
            DoorError::InvalidConfig {
                field,
                value,
                reason,
            } => write!(f, "Invalid config: {} = {} ({})", field, value, reason),

            DoorError::NoDoorAt { pos } => write!(f, "No door at {}", pos),
            DoorError::PlacementConflict { pos } => {
                write!(f, "Placement conflict at {}", pos)
            }

            DoorError::SerializationError { context, error } => {
                write!(f, "Serialization error in {}: {}", context, error)
            }
            DoorError::DeserializationError { context, error } => {
                write!(f, "Deserialization error in {}: {}", context, error)
            }
            DoorError::VersionMismatch { expected, found } => write!(
                f,
                "Version mismatch: expected {}, found {}",
                expected, found
            ),
            DoorError::IoError { path, error } => write!(f, "IO error for {}: {}", path, error),

            DoorError::Internal { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl StdError for DoorError {}

/// Type alias for Results in Hearth Doors
pub type DoorResult<T> = Result<T, DoorError>;

impl From<std::io::Error> for DoorError {
    fn from(error: std::io::Error) -> Self {
        DoorError::IoError {
            path: String::new(),
            error: error.to_string(),
        }
    }
}

impl From<crate::persistence::PersistenceError> for DoorError {
    fn from(err: crate::persistence::PersistenceError) -> Self {
        use crate::persistence::PersistenceError;
        match err {
            PersistenceError::Json(e) => DoorError::DeserializationError {
                context: "json record".to_string(),
                error: e.to_string(),
            },
            PersistenceError::Binary(e) => DoorError::DeserializationError {
                context: "binary record".to_string(),
                error: e.to_string(),
            },
            PersistenceError::Io(e) => e.into(),
            PersistenceError::VersionMismatch { expected, found } => {
                DoorError::VersionMismatch { expected, found }
            }
            PersistenceError::UnknownDescriptor(name) => DoorError::UnknownDescriptor { name },
            PersistenceError::InvalidField { key, value } => DoorError::DeserializationError {
                context: key,
                error: format!("invalid value '{}'", value),
            },
        }
    }
}

impl From<crate::door::PlacementError> for DoorError {
    fn from(err: crate::door::PlacementError) -> Self {
        use crate::door::PlacementError;
        match err {
            PlacementError::Conflict(pos) | PlacementError::Obstructed(pos) => {
                DoorError::PlacementConflict { pos }
            }
            other => DoorError::Internal {
                message: other.to_string(),
            },
        }
    }
}

// Helper functions for common error patterns

/// Convert Option to Result with context
pub trait OptionExt<T> {
    fn ok_or_door<F>(self, f: F) -> DoorResult<T>
    where
        F: FnOnce() -> DoorError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_door<F>(self, f: F) -> DoorResult<T>
    where
        F: FnOnce() -> DoorError,
    {
        self.ok_or_else(f)
    }
}

/// Extension trait for adding context to errors
pub trait ErrorContext<T> {
    fn context(self, msg: &str) -> DoorResult<T>;
    fn with_context<F>(self, f: F) -> DoorResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: fmt::Display,
{
    fn context(self, msg: &str) -> DoorResult<T> {
        self.map_err(|e| DoorError::Internal {
            message: format!("{}: {}", msg, e),
        })
    }

    fn with_context<F>(self, f: F) -> DoorResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| DoorError::Internal {
            message: format!("{}: {}", f(), e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DoorError::NoDoorAt {
            pos: VoxelPos::new(1, 2, 3),
        };
        assert_eq!(err.to_string(), "No door at (1, 2, 3)");
    }

    #[test]
    fn test_option_ext() {
        let opt: Option<i32> = None;
        let result = opt.ok_or_door(|| DoorError::UnknownDescriptor {
            name: "test".to_string(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_error_context_keeps_cause() {
        let result: Result<i32, std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));
        let err = result
            .context("loading descriptors")
            .expect_err("io error should map to DoorError");
        assert!(err.to_string().contains("loading descriptors"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_subsystem_errors_convert() {
        let pos = VoxelPos::new(0, 1, 0);
        let err: DoorError = crate::door::PlacementError::Obstructed(pos).into();
        assert!(matches!(err, DoorError::PlacementConflict { pos: p } if p == pos));

        let err: DoorError = crate::door::PlacementError::EmptyStack.into();
        assert!(matches!(err, DoorError::Internal { .. }));

        let err: DoorError = crate::persistence::PersistenceError::VersionMismatch {
            expected: 1,
            found: 3,
        }
        .into();
        assert_eq!(err.to_string(), "Version mismatch: expected 1, found 3");
    }
}
