pub use self::{
    attributes::OsuDifficultyAttributes,
    difficulty::{
        evaluators::{RhythmEvaluator, SpeedEvaluator},
        object::OsuDifficultyObject,
        DifficultyValues, SequenceError,
    },
};

mod attributes;

/// Sequence building, evaluators, and skills.
pub mod difficulty;

/// Radius of a hit object with circle size 5 before scaling.
pub(crate) const OBJECT_RADIUS: f32 = 64.0;
