//! Transformation data structures - Pure DOP
//!
//! NO METHODS beyond builders. Evaluation happens in
//! transformation_operations.rs

use cgmath::Vector3;

/// Interpolation curve applied to a transformation's completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    /// Slow start and end, `(1 - cos(pi * t)) / 2`
    Sinusoidal,
}

/// Timing modifiers shared by every transformation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformTiming {
    /// Active duration in ticks. Ignored by chained and parallel
    /// transformations, whose duration derives from their children.
    pub duration: u32,

    /// Ticks to wait before the transformation starts
    pub delay: u32,

    /// Play the active interval backward
    pub reversed: bool,

    pub easing: Easing,
}

impl Default for TransformTiming {
    fn default() -> Self {
        Self {
            duration: 0,
            delay: 0,
            reversed: false,
            easing: Easing::Linear,
        }
    }
}

/// Geometric content of a transformation
#[derive(Debug, Clone, PartialEq)]
pub enum TransformKind {
    /// Rotation in degrees around `axis`, pivoting on `offset`
    Rotation {
        from_angle: f32,
        to_angle: f32,
        axis: Vector3<f32>,
        offset: Vector3<f32>,
    },
    Translation {
        from: Vector3<f32>,
        to: Vector3<f32>,
    },
    /// Scale around `offset`
    Scale {
        from: Vector3<f32>,
        to: Vector3<f32>,
        offset: Vector3<f32>,
    },
    /// Children run one after another, each in its own sub-interval
    Chained(Vec<Transformation>),
    /// Children run on the same clock
    Parallel(Vec<Transformation>),
}

/// A time-parameterized transformation of a model part
#[derive(Debug, Clone, PartialEq)]
pub struct Transformation {
    pub kind: TransformKind,
    pub timing: TransformTiming,
}
