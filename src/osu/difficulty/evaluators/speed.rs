use crate::osu::difficulty::object::OsuDifficultyObject;

pub struct SpeedEvaluator;

impl SpeedEvaluator {
    const SINGLE_SPACING_THRESHOLD: f64 = OsuDifficultyObject::NORMALIZED_DIAMETER as f64 * 1.25; // 1.25 circles distance between centers
    const MIN_SPEED_BONUS: f64 = 75.0; // ~200BPM
    const SPEED_BALANCING_FACTOR: f64 = 40.0;

    /// Evaluate the object at position `idx` of the sequence.
    ///
    /// Returns `None` if `idx` is out of bounds.
    pub fn evaluate(diff_objects: &[OsuDifficultyObject<'_>], idx: usize) -> Option<f64> {
        diff_objects
            .get(idx)
            .map(|curr| Self::evaluate_diff_of(curr, diff_objects))
    }

    /// Evaluates the difficulty of tapping the current object, based on:
    ///
    /// - time between pressing the previous and current object,
    /// - distance between those objects,
    /// - and how easily they can be cheesed.
    pub fn evaluate_diff_of<'a>(
        curr: &'a OsuDifficultyObject<'a>,
        diff_objects: &'a [OsuDifficultyObject<'a>],
    ) -> f64 {
        if curr.base.is_spinner() {
            return 0.0;
        }

        let osu_prev_obj = curr.previous(0, diff_objects);

        let mut strain_time = curr.strain_time;

        // * Nerf doubletappable doubles.
        let doubletapness = 1.0 - curr.doubletapness;

        // * Cap deltatime to the OD 300 hitwindow.
        // * 0.93 is derived from making sure 260bpm OD8 streams aren't nerfed harshly, whilst 0.92 limits the effect of the cap.
        strain_time /= ((strain_time / curr.full_great_window) / 0.93).clamp(0.92, 1.0);

        let mut speed_bonus = 1.0;

        if strain_time < Self::MIN_SPEED_BONUS {
            // * Add additional scaling bonus for streams/bursts higher than 200bpm
            speed_bonus += 0.75
                * ((Self::MIN_SPEED_BONUS - strain_time) / Self::SPEED_BALANCING_FACTOR).powf(2.0);
        }

        let travel_dist = osu_prev_obj.map_or(0.0, |obj| obj.travel_dist);

        // * Cap distance at single_spacing_threshold
        let dist = Self::SINGLE_SPACING_THRESHOLD.min(travel_dist + curr.min_jump_dist);

        (speed_bonus + speed_bonus * (dist / Self::SINGLE_SPACING_THRESHOLD).powf(3.5))
            * doubletapness
            / strain_time
    }
}
