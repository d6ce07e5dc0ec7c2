use std::cmp;

use crate::{difficulty::Difficulty, model::chart::ParsedChart};

use self::{object::OsuDifficultyObject, scaling_factor::ScalingFactor, skills::speed::Speed};

use super::attributes::OsuDifficultyAttributes;

pub mod evaluators;
pub mod object;
pub mod scaling_factor;
pub mod skills;

const DIFFICULTY_MULTIPLIER: f64 = 0.0675;

pub fn difficulty(
    difficulty: &Difficulty,
    chart: &ParsedChart,
) -> Result<OsuDifficultyAttributes, SequenceError> {
    let DifficultyValues { speed, mut attrs } = DifficultyValues::calculate(difficulty, chart)?;

    DifficultyValues::eval(&mut attrs, &speed);

    Ok(attrs)
}

pub struct DifficultyValues {
    pub speed: Speed,
    pub attrs: OsuDifficultyAttributes,
}

impl DifficultyValues {
    pub fn calculate(difficulty: &Difficulty, chart: &ParsedChart) -> Result<Self, SequenceError> {
        let clock_rate = difficulty.get_clock_rate();
        let take = cmp::min(difficulty.get_passed_objects(), chart.objects.len());

        let od = f64::from(chart.overall_difficulty);
        let great_hit_window = great_hit_window(od) / clock_rate;

        let (n_circles, n_sliders, n_spinners) = chart.objects[..take].iter().fold(
            (0, 0, 0),
            |(c, s, sp), h| {
                if h.is_circle() {
                    (c + 1, s, sp)
                } else if h.is_slider() {
                    (c, s + 1, sp)
                } else {
                    (c, s, sp + 1)
                }
            },
        );

        let attrs = OsuDifficultyAttributes {
            od,
            great_hit_window,
            n_circles,
            n_sliders,
            n_spinners,
            ..Default::default()
        };

        let diff_objects = Self::create_difficulty_objects(difficulty, chart)?;

        let mut speed = Speed::new();

        for hit_object in diff_objects.iter() {
            speed.process(hit_object, &diff_objects);
        }

        Ok(Self { speed, attrs })
    }

    /// Process the difficulty values and store the results in `attrs`.
    pub fn eval(attrs: &mut OsuDifficultyAttributes, speed: &Speed) {
        let speed_difficulty_value = speed.cloned_difficulty_value();

        attrs.speed = speed_difficulty_value.sqrt() * DIFFICULTY_MULTIPLIER;
        attrs.speed_note_count = speed.relevant_note_count();
        attrs.speed_difficult_strain_count =
            speed.count_top_weighted_strains(speed_difficulty_value);
        attrs.max_rhythm = speed.max_rhythm();
    }

    /// Wrap the chart's objects into [`OsuDifficultyObject`]s.
    ///
    /// The first object has no difficulty object so the resulting list is one
    /// shorter than the chart's objects.
    pub fn create_difficulty_objects<'a>(
        difficulty: &Difficulty,
        chart: &'a ParsedChart,
    ) -> Result<Vec<OsuDifficultyObject<'a>>, SequenceError> {
        let clock_rate = difficulty.get_clock_rate();

        if !clock_rate.is_finite() || clock_rate <= 0.0 {
            return Err(SequenceError::InvalidClockRate(clock_rate));
        }

        let od = chart.overall_difficulty;
        let cs = chart.circle_size;
        let full_great_window = 2.0 * great_hit_window(f64::from(od)) / clock_rate;

        if !od.is_finite()
            || !cs.is_finite()
            || !full_great_window.is_finite()
            || full_great_window <= 0.0
        {
            return Err(SequenceError::InvalidDifficulty { od, cs });
        }

        let take = cmp::min(difficulty.get_passed_objects(), chart.objects.len());
        let objects = &chart.objects[..take];

        if let Some(idx) = objects.iter().position(|h| !h.start_time.is_finite()) {
            return Err(SequenceError::NonFiniteTime { idx });
        }

        let Some((mut last, rest)) = objects.split_first() else {
            return Ok(Vec::new());
        };

        let scaling_factor = ScalingFactor::new(cs);

        let mut diff_objects = Vec::with_capacity(rest.len());

        for (idx, h) in rest.iter().enumerate() {
            if h.start_time < last.start_time {
                return Err(SequenceError::UnorderedObjects { idx: idx + 1 });
            }

            let diff_object = OsuDifficultyObject::new(
                h,
                last,
                clock_rate,
                idx,
                full_great_window,
                &scaling_factor,
            );

            last = h;

            diff_objects.push(diff_object);
        }

        for i in 0..diff_objects.len() {
            let curr = &diff_objects[i];
            let doubletapness =
                curr.get_doubletapness(curr.next(0, &diff_objects), full_great_window);
            diff_objects[i].doubletapness = doubletapness;
        }

        Ok(diff_objects)
    }
}

/// Great hit window in ms for one side of the hit, unaffected by clock rate.
fn great_hit_window(od: f64) -> f64 {
    80.0 - 6.0 * od
}

/// Error when building a sequence of difficulty objects.
#[derive(Debug, thiserror::Error)]
pub enum SequenceError {
    #[error("clock rate must be positive and finite, got {0}")]
    InvalidClockRate(f64),
    #[error("overall difficulty {od} and circle size {cs} leave no valid hit window")]
    InvalidDifficulty { od: f32, cs: f32 },
    #[error("hit object at index {idx} has a non-finite start time")]
    NonFiniteTime { idx: usize },
    #[error("hit object at index {idx} starts before its predecessor")]
    UnorderedObjects { idx: usize },
}
