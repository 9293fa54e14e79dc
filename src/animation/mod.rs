//! Animation transform engine
//!
//! Primitive transformations (rotation, translation, scale), combinators
//! (chained, parallel), timing modifiers, and the per-part timelines that
//! movement strategies hand to the renderer.

pub mod timeline;
pub mod transformation_data;
pub mod transformation_operations;

pub use timeline::{AnimationTimeline, PartAnimation, PartPoseUniform};
pub use transformation_data::{Easing, TransformKind, TransformTiming, Transformation};
pub use transformation_operations::{active_duration, completion, ease, evaluate, total_span, transform_point};
