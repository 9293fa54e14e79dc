//! Transformation operations - builders and pure evaluation functions
//!
//! Poses compose the way model matrices do: a parent's matrix is multiplied on
//! the right by each child's, so later transformations act in the frame left
//! by earlier ones.

use std::f32::consts::PI;

use cgmath::{Deg, InnerSpace, Matrix4, Point3, SquareMatrix, Transform, Vector3, Zero};

use super::transformation_data::{Easing, TransformKind, TransformTiming, Transformation};

// ============================================================================
// BUILDERS
// ============================================================================

impl Transformation {
    fn leaf(kind: TransformKind) -> Self {
        Self {
            kind,
            timing: TransformTiming::default(),
        }
    }

    /// Rotation from 0 to `angle` degrees around +y
    pub fn rotation(angle: f32) -> Self {
        Self::rotation_between(0.0, angle)
    }

    pub fn rotation_between(from_angle: f32, to_angle: f32) -> Self {
        Self::leaf(TransformKind::Rotation {
            from_angle,
            to_angle,
            axis: Vector3::unit_y(),
            offset: Vector3::zero(),
        })
    }

    /// Translation from the origin to (x, y, z)
    pub fn translation(x: f32, y: f32, z: f32) -> Self {
        Self::translation_between([0.0; 3], [x, y, z])
    }

    pub fn translation_between(from: [f32; 3], to: [f32; 3]) -> Self {
        Self::leaf(TransformKind::Translation {
            from: from.into(),
            to: to.into(),
        })
    }

    pub fn scale(from: f32, to: f32) -> Self {
        Self::leaf(TransformKind::Scale {
            from: Vector3::new(from, from, from),
            to: Vector3::new(to, to, to),
            offset: Vector3::zero(),
        })
    }

    pub fn chained(children: Vec<Transformation>) -> Self {
        Self::leaf(TransformKind::Chained(children))
    }

    pub fn parallel(children: Vec<Transformation>) -> Self {
        Self::leaf(TransformKind::Parallel(children))
    }

    /// Set the rotation axis. A zero axis keeps the previous one.
    pub fn around_axis(mut self, x: f32, y: f32, z: f32) -> Self {
        if let TransformKind::Rotation { axis, .. } = &mut self.kind {
            let new_axis = Vector3::new(x, y, z);
            if new_axis.magnitude2() > 0.0 {
                *axis = new_axis.normalize();
            }
        }
        self
    }

    /// Set the pivot of a rotation or scale
    pub fn offset(mut self, x: f32, y: f32, z: f32) -> Self {
        match &mut self.kind {
            TransformKind::Rotation { offset, .. } | TransformKind::Scale { offset, .. } => {
                *offset = Vector3::new(x, y, z);
            }
            _ => {}
        }
        self
    }

    pub fn for_ticks(mut self, duration: u32, delay: u32) -> Self {
        self.timing.duration = duration;
        self.timing.delay = delay;
        self
    }

    pub fn delay(mut self, delay: u32) -> Self {
        self.timing.delay = delay;
        self
    }

    pub fn reversed(mut self, reversed: bool) -> Self {
        self.timing.reversed = reversed;
        self
    }

    pub fn movement(mut self, easing: Easing) -> Self {
        self.timing.easing = easing;
        self
    }
}

// ============================================================================
// TIMING
// ============================================================================

/// Active duration in ticks, excluding the transformation's own delay
pub fn active_duration(transform: &Transformation) -> u32 {
    match &transform.kind {
        TransformKind::Chained(children) => children.iter().map(total_span).sum(),
        TransformKind::Parallel(children) => children.iter().map(total_span).max().unwrap_or(0),
        _ => transform.timing.duration,
    }
}

/// Delay plus active duration
pub fn total_span(transform: &Transformation) -> u32 {
    transform.timing.delay + active_duration(transform)
}

/// Eased completion in `[0, 1]` for `elapsed` ticks since the logical start.
/// Clamped on both ends so sampling outside the interval never extrapolates.
pub fn completion(timing: &TransformTiming, duration: u32, elapsed: f32) -> f32 {
    let relative = elapsed - timing.delay as f32;
    let linear = if duration == 0 {
        if relative >= 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        (relative / duration as f32).clamp(0.0, 1.0)
    };
    let directed = if timing.reversed { 1.0 - linear } else { linear };
    ease(timing.easing, directed)
}

pub fn ease(easing: Easing, t: f32) -> f32 {
    match easing {
        Easing::Linear => t,
        Easing::Sinusoidal => (1.0 - (t * PI).cos()) * 0.5,
    }
}

// ============================================================================
// EVALUATION
// ============================================================================

/// Pose of a transformation `elapsed` ticks after its logical start
pub fn evaluate(transform: &Transformation, elapsed: f32) -> Matrix4<f32> {
    let duration = active_duration(transform);
    let progress = completion(&transform.timing, duration, elapsed);

    match &transform.kind {
        TransformKind::Rotation {
            from_angle,
            to_angle,
            axis,
            offset,
        } => {
            let angle = *from_angle + (*to_angle - *from_angle) * progress;
            Matrix4::from_translation(*offset)
                * Matrix4::from_axis_angle(*axis, Deg(angle))
                * Matrix4::from_translation(-*offset)
        }
        TransformKind::Translation { from, to } => {
            Matrix4::from_translation(*from + (*to - *from) * progress)
        }
        TransformKind::Scale { from, to, offset } => {
            let s = *from + (*to - *from) * progress;
            Matrix4::from_translation(*offset)
                * Matrix4::from_nonuniform_scale(s.x, s.y, s.z)
                * Matrix4::from_translation(-*offset)
        }
        TransformKind::Chained(children) => {
            // Easing on a composite bends its clock, not its geometry
            let local = progress * duration as f32;
            let mut start = 0.0;
            let mut pose = Matrix4::identity();
            for child in children {
                pose = pose * evaluate(child, local - start);
                start += total_span(child) as f32;
            }
            pose
        }
        TransformKind::Parallel(children) => {
            let local = progress * duration as f32;
            children
                .iter()
                .fold(Matrix4::identity(), |pose, child| pose * evaluate(child, local))
        }
    }
}

/// Apply a pose to a model-space point
pub fn transform_point(pose: &Matrix4<f32>, point: Point3<f32>) -> Point3<f32> {
    pose.transform_point(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn assert_point(actual: Point3<f32>, expected: [f32; 3]) {
        assert!(
            (actual.x - expected[0]).abs() < EPS
                && (actual.y - expected[1]).abs() < EPS
                && (actual.z - expected[2]).abs() < EPS,
            "expected {:?}, got {:?}",
            expected,
            actual
        );
    }

    #[test]
    fn test_translation_interpolates_and_clamps() {
        let t = Transformation::translation(0.0, 2.0, 0.0).for_ticks(4, 0);
        let origin = Point3::new(0.0, 0.0, 0.0);
        assert_point(transform_point(&evaluate(&t, -3.0), origin), [0.0, 0.0, 0.0]);
        assert_point(transform_point(&evaluate(&t, 2.0), origin), [0.0, 1.0, 0.0]);
        assert_point(transform_point(&evaluate(&t, 4.0), origin), [0.0, 2.0, 0.0]);
        assert_point(transform_point(&evaluate(&t, 40.0), origin), [0.0, 2.0, 0.0]);
    }

    #[test]
    fn test_reversed_starts_at_end_pose() {
        let t = Transformation::translation(1.0, 0.0, 0.0)
            .for_ticks(10, 0)
            .reversed(true);
        let origin = Point3::new(0.0, 0.0, 0.0);
        assert_point(transform_point(&evaluate(&t, 0.0), origin), [1.0, 0.0, 0.0]);
        assert_point(transform_point(&evaluate(&t, 10.0), origin), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_delay_holds_start_pose() {
        let t = Transformation::translation(1.0, 0.0, 0.0).for_ticks(10, 5);
        let origin = Point3::new(0.0, 0.0, 0.0);
        assert_point(transform_point(&evaluate(&t, 4.0), origin), [0.0, 0.0, 0.0]);
        assert_point(transform_point(&evaluate(&t, 10.0), origin), [0.5, 0.0, 0.0]);
        assert_eq!(total_span(&t), 15);
    }

    #[test]
    fn test_scale_around_pivot_clamps_at_both_ends() {
        let t = Transformation::scale(1.0, 3.0).offset(1.0, 0.0, 0.0).for_ticks(4, 0);
        let p = Point3::new(2.0, 1.0, 0.0);
        assert_point(transform_point(&evaluate(&t, -2.0), p), [2.0, 1.0, 0.0]);
        assert_point(transform_point(&evaluate(&t, 2.0), p), [3.0, 2.0, 0.0]);
        assert_point(transform_point(&evaluate(&t, 4.0), p), [4.0, 3.0, 0.0]);
        assert_point(transform_point(&evaluate(&t, 12.0), p), [4.0, 3.0, 0.0]);
        // The pivot keeps its place at any scale
        let pivot = transform_point(&evaluate(&t, 3.0), Point3::new(1.0, 0.0, 0.0));
        assert_point(pivot, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_reversed_delay_holds_end_pose() {
        let t = Transformation::translation(1.0, 0.0, 0.0)
            .for_ticks(10, 2)
            .delay(5)
            .reversed(true);
        assert_eq!(t.timing.delay, 5);
        assert_eq!(total_span(&t), 15);

        let origin = Point3::new(0.0, 0.0, 0.0);
        assert_point(transform_point(&evaluate(&t, 0.0), origin), [1.0, 0.0, 0.0]);
        assert_point(transform_point(&evaluate(&t, 5.0), origin), [1.0, 0.0, 0.0]);
        assert_point(transform_point(&evaluate(&t, 10.0), origin), [0.5, 0.0, 0.0]);
        assert_point(transform_point(&evaluate(&t, 15.0), origin), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_rotation_around_pivot() {
        // Quarter turn around +y through (1, 0, 0)
        let t = Transformation::rotation(90.0)
            .around_axis(0.0, 1.0, 0.0)
            .offset(1.0, 0.0, 0.0)
            .for_ticks(6, 0);
        let p = transform_point(&evaluate(&t, 6.0), Point3::new(0.0, 0.0, 0.0));
        assert_point(p, [1.0, 0.0, 1.0]);
        // The pivot itself never moves
        let pivot = transform_point(&evaluate(&t, 3.0), Point3::new(1.0, 0.0, 0.0));
        assert_point(pivot, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_sinusoidal_is_symmetric() {
        assert!((ease(Easing::Sinusoidal, 0.5) - 0.5).abs() < EPS);
        assert!(ease(Easing::Sinusoidal, 0.25) < 0.25);
        assert!((ease(Easing::Sinusoidal, 1.0) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_chained_children_use_disjoint_intervals() {
        let chain = Transformation::chained(vec![
            Transformation::translation(1.0, 0.0, 0.0).for_ticks(4, 0),
            Transformation::translation(0.0, 1.0, 0.0).for_ticks(4, 0),
        ]);
        assert_eq!(active_duration(&chain), 8);
        let origin = Point3::new(0.0, 0.0, 0.0);
        assert_point(transform_point(&evaluate(&chain, 2.0), origin), [0.5, 0.0, 0.0]);
        assert_point(transform_point(&evaluate(&chain, 4.0), origin), [1.0, 0.0, 0.0]);
        assert_point(transform_point(&evaluate(&chain, 6.0), origin), [1.0, 0.5, 0.0]);
        assert_point(transform_point(&evaluate(&chain, 99.0), origin), [1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_reversed_chain_plays_last_child_first() {
        let chain = Transformation::chained(vec![
            Transformation::translation(1.0, 0.0, 0.0).for_ticks(4, 0),
            Transformation::translation(0.0, 1.0, 0.0).for_ticks(4, 0),
        ])
        .reversed(true);
        let origin = Point3::new(0.0, 0.0, 0.0);
        assert_point(transform_point(&evaluate(&chain, 0.0), origin), [1.0, 1.0, 0.0]);
        assert_point(transform_point(&evaluate(&chain, 2.0), origin), [1.0, 0.5, 0.0]);
        assert_point(transform_point(&evaluate(&chain, 8.0), origin), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_parallel_children_share_clock() {
        let par = Transformation::parallel(vec![
            Transformation::translation(2.0, 0.0, 0.0).for_ticks(4, 0),
            Transformation::translation(0.0, 0.0, 1.0).for_ticks(2, 0),
        ]);
        assert_eq!(active_duration(&par), 4);
        let origin = Point3::new(0.0, 0.0, 0.0);
        assert_point(transform_point(&evaluate(&par, 2.0), origin), [1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_zero_duration_snaps() {
        let t = Transformation::translation(0.0, 3.0, 0.0).for_ticks(0, 0);
        let origin = Point3::new(0.0, 0.0, 0.0);
        assert_point(transform_point(&evaluate(&t, -0.5), origin), [0.0, 0.0, 0.0]);
        assert_point(transform_point(&evaluate(&t, 0.0), origin), [0.0, 3.0, 0.0]);
    }
}
