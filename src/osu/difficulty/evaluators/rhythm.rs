use std::{cmp, f64::consts::PI};

use crate::osu::difficulty::object::OsuDifficultyObject;

pub struct RhythmEvaluator;

impl RhythmEvaluator {
    const HISTORY_TIME_MAX: f64 = 5.0 * 1000.0; // 5 seconds
    const HISTORY_OBJECTS_MAX: usize = 32;
    const RHYTHM_MULTIPLIER: f64 = 0.75;
    const MAX_ISLAND_SIZE: usize = 7;

    /// Evaluate the object at position `idx` of the sequence.
    ///
    /// Returns `None` if `idx` is out of bounds.
    pub fn evaluate(diff_objects: &[OsuDifficultyObject<'_>], idx: usize) -> Option<f64> {
        diff_objects
            .get(idx)
            .map(|curr| Self::evaluate_diff_of(curr, diff_objects))
    }

    /// Calculates a rhythm multiplier for the difficulty of the tap associated
    /// with historic data of the current object.
    pub fn evaluate_diff_of<'a>(
        curr: &'a OsuDifficultyObject<'a>,
        diff_objects: &'a [OsuDifficultyObject<'a>],
    ) -> f64 {
        if curr.base.is_spinner() {
            return 0.0;
        }

        let mut prev_island_size = 0;
        let mut rhythm_complexity_sum = 0.0;
        let mut island_size = 1;

        // * store the ratio of the current start of an island to buff for tighter rhythms
        let mut start_ratio = 0.0;

        let mut first_delta_switch = false;

        let historical_note_count = cmp::min(curr.idx, Self::HISTORY_OBJECTS_MAX);

        let mut rhythm_start = 0;

        while rhythm_start + 2 < historical_note_count
            && curr
                .previous(rhythm_start, diff_objects)
                .is_some_and(|prev| curr.start_time - prev.start_time < Self::HISTORY_TIME_MAX)
        {
            rhythm_start += 1;
        }

        let delta_difference_eps = curr.full_great_window * 0.3;

        // * we go from the furthest object back to the current one
        for i in (1..=rhythm_start).rev() {
            let (Some(curr_obj), Some(prev_obj), Some(last_obj)) = (
                curr.previous(i - 1, diff_objects),
                curr.previous(i, diff_objects),
                curr.previous(i + 1, diff_objects),
            ) else {
                break;
            };

            // * scales note 0 to 1 from history to now
            let time_decay =
                (Self::HISTORY_TIME_MAX - (curr.start_time - curr_obj.start_time)) / Self::HISTORY_TIME_MAX;
            let note_decay = (historical_note_count - i) as f64 / historical_note_count as f64;

            // * either we're limited by time or limited by object count.
            let curr_historical_decay = time_decay.min(note_decay);

            let curr_delta = curr_obj.strain_time;
            let prev_delta = prev_obj.strain_time;
            let last_delta = last_obj.strain_time;

            let curr_ratio = 1.0
                + 6.0
                    * f64::min(
                        0.5,
                        (PI / (prev_delta.min(curr_delta) / prev_delta.max(curr_delta)))
                            .sin()
                            .powf(2.0),
                    );

            let window_penalty = (((prev_delta - curr_delta).abs() - delta_difference_eps)
                / delta_difference_eps)
                .clamp(0.0, 1.0);

            let mut effective_ratio = window_penalty * curr_ratio;

            if first_delta_switch {
                if prev_delta <= 1.25 * curr_delta && prev_delta * 1.25 >= curr_delta {
                    // * island is still progressing, count size.
                    if island_size < Self::MAX_ISLAND_SIZE {
                        island_size += 1;
                    }
                } else {
                    // * bpm change is into slider, this is easy acc window
                    if curr_obj.base.is_slider() {
                        effective_ratio /= 8.0;
                    }

                    // * bpm change was from a slider, this is easier typically than circle -> circle
                    if prev_obj.base.is_slider() {
                        effective_ratio /= 4.0;
                    }

                    // * repeated island size (ex: triplet -> triplet)
                    if prev_island_size == island_size {
                        effective_ratio /= 4.0;
                    }

                    // * repeated island polarity (2 -> 4, 3 -> 5)
                    if prev_island_size % 2 == island_size % 2 {
                        effective_ratio /= 2.0;
                    }

                    // * previous increase happened a note ago, 1/1->1/2-1/4, dont want to buff this.
                    if last_delta > prev_delta + 10.0 && prev_delta > curr_delta + 10.0 {
                        effective_ratio /= 8.0;
                    }

                    rhythm_complexity_sum += (effective_ratio * start_ratio).sqrt()
                        * curr_historical_decay
                        * (4.0 + island_size as f64).sqrt()
                        / 2.0
                        * (4.0 + prev_island_size as f64).sqrt()
                        / 2.0;

                    start_ratio = effective_ratio;

                    prev_island_size = island_size;

                    // * we're slowing down, stop counting
                    if prev_delta * 1.25 < curr_delta {
                        // * if we're speeding up, this stays true and we keep counting island size.
                        first_delta_switch = false;
                    }

                    island_size = 1;
                }
            } else if prev_delta > 1.25 * curr_delta {
                // * we want to be speeding up.
                // * Begin counting island until we change speed again.
                first_delta_switch = true;
                start_ratio = effective_ratio;
                island_size = 1;
            }
        }

        // * produces multiplier that can be applied to strain. range [1, infinity) (not really though)
        (4.0 + rhythm_complexity_sum * Self::RHYTHM_MULTIPLIER).sqrt() / 2.0
    }
}
