//! Animation timelines handed to the renderer
//!
//! A timeline binds transformations to named model parts ("top", "bottom",
//! "handle", ...) and anchors them at the tick the current transition started.
//! Timelines are rebuilt on demand and never persisted.

use cgmath::{Matrix4, SquareMatrix};

use super::transformation_data::Transformation;
use super::transformation_operations::{evaluate, total_span};

/// One animated model part
#[derive(Debug, Clone, PartialEq)]
pub struct PartAnimation {
    pub part: String,
    pub transformation: Transformation,
}

/// All part animations of one structure for its current transition
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnimationTimeline {
    /// Tick the current transition started at
    pub start_tick: i64,
    pub parts: Vec<PartAnimation>,
}

impl AnimationTimeline {
    pub fn new(start_tick: i64) -> Self {
        Self {
            start_tick,
            parts: Vec::new(),
        }
    }

    pub fn with_part(mut self, part: impl Into<String>, transformation: Transformation) -> Self {
        self.parts.push(PartAnimation {
            part: part.into(),
            transformation,
        });
        self
    }

    pub fn part(&self, name: &str) -> Option<&Transformation> {
        self.parts
            .iter()
            .find(|p| p.part == name)
            .map(|p| &p.transformation)
    }

    /// Longest part span in ticks
    pub fn duration(&self) -> u32 {
        self.parts
            .iter()
            .map(|p| total_span(&p.transformation))
            .max()
            .unwrap_or(0)
    }

    /// Ticks elapsed at render time `now` (world tick plus partial tick)
    pub fn elapsed(&self, now: f32) -> f32 {
        now - self.start_tick as f32
    }

    pub fn is_finished(&self, now: f32) -> bool {
        self.elapsed(now) >= self.duration() as f32
    }

    /// Pose of one part at render time `now`
    pub fn pose_at(&self, part: &str, now: f32) -> Option<Matrix4<f32>> {
        self.part(part).map(|t| evaluate(t, self.elapsed(now)))
    }

    /// Poses of every part at render time `now`
    pub fn sample(&self, now: f32) -> Vec<(String, Matrix4<f32>)> {
        let elapsed = self.elapsed(now);
        self.parts
            .iter()
            .map(|p| (p.part.clone(), evaluate(&p.transformation, elapsed)))
            .collect()
    }
}

/// Part pose uniform buffer data for GPU
/// Must match shader layout exactly
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PartPoseUniform {
    /// Model matrix (4x4, column-major)
    pub model_matrix: [[f32; 4]; 4],
}

impl Default for PartPoseUniform {
    fn default() -> Self {
        Self {
            model_matrix: Matrix4::<f32>::identity().into(),
        }
    }
}

impl From<Matrix4<f32>> for PartPoseUniform {
    fn from(matrix: Matrix4<f32>) -> Self {
        Self {
            model_matrix: matrix.into(),
        }
    }
}
