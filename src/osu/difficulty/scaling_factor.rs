use crate::osu::OBJECT_RADIUS;

use super::object::OsuDifficultyObject;

const BROKEN_GAMEFIELD_ROUNDING_ALLOWANCE: f32 = 1.00041;

/// Fields around the scaling of hit objects.
///
/// All objects of a chart share the same scaling so it's only stored once.
pub struct ScalingFactor {
    /// `NORMALIZED_RADIUS / Radius` and then adjusted if `Radius < 30`
    pub factor: f32,
    pub radius: f64,
}

impl ScalingFactor {
    pub fn new(cs: f32) -> Self {
        let scale = (f64::from(1.0_f32) - f64::from(0.7_f32) * ((f64::from(cs) - 5.0) / 5.0))
            as f32
            / 2.0
            * BROKEN_GAMEFIELD_ROUNDING_ALLOWANCE;

        let radius = f64::from(OBJECT_RADIUS * scale);
        let factor = OsuDifficultyObject::NORMALIZED_RADIUS as f32 / radius as f32;

        let factor_with_small_circle_bonus = if radius < 30.0 {
            factor * (1.0 + (30.0 - radius as f32).min(5.0) / 50.0)
        } else {
            factor
        };

        Self {
            factor: factor_with_small_circle_bonus,
            radius,
        }
    }
}
