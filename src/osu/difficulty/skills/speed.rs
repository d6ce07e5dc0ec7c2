use crate::osu::difficulty::{
    evaluators::{RhythmEvaluator, SpeedEvaluator},
    object::OsuDifficultyObject,
};

use super::strain::{self, strain_decay, StrainSkill};

#[derive(Clone, Debug, Default)]
pub struct Speed {
    current_strain: f64,
    current_rhythm: f64,
    current_section_peak: f64,
    current_section_end: f64,
    strain_peaks: Vec<f64>,
    object_strains: Vec<f64>,
    max_rhythm: f64,
}

impl StrainSkill for Speed {
    const REDUCED_SECTION_COUNT: usize = 5;
}

impl Speed {
    const SKILL_MULTIPLIER: f64 = 1375.0;
    const STRAIN_DECAY_BASE: f64 = 0.3;
    const DIFFICULTY_MULTIPLIER: f64 = 1.04;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(&mut self, curr: &OsuDifficultyObject<'_>, objects: &[OsuDifficultyObject<'_>]) {
        // * The first object doesn't generate a strain, so we begin with an incremented section end
        if curr.idx == 0 {
            self.current_section_end =
                (curr.start_time / Self::SECTION_LENGTH).ceil() * Self::SECTION_LENGTH;
        }

        while curr.start_time > self.current_section_end {
            self.save_current_peak();
            self.start_new_section_from(self.current_section_end, curr, objects);
            self.current_section_end += Self::SECTION_LENGTH;
        }

        let strain = self.strain_value_at(curr, objects);
        self.current_section_peak = strain.max(self.current_section_peak);
        self.object_strains.push(strain);
    }

    fn save_current_peak(&mut self) {
        self.strain_peaks.push(self.current_section_peak);
    }

    fn start_new_section_from(
        &mut self,
        time: f64,
        curr: &OsuDifficultyObject<'_>,
        objects: &[OsuDifficultyObject<'_>],
    ) {
        self.current_section_peak = self.calculate_initial_strain(time, curr, objects);
    }

    fn calculate_initial_strain(
        &self,
        time: f64,
        curr: &OsuDifficultyObject<'_>,
        objects: &[OsuDifficultyObject<'_>],
    ) -> f64 {
        let prev_start_time = curr.previous(0, objects).map_or(0.0, |prev| prev.start_time);

        (self.current_strain * self.current_rhythm)
            * strain_decay(time - prev_start_time, Self::STRAIN_DECAY_BASE)
    }

    fn strain_value_at(
        &mut self,
        curr: &OsuDifficultyObject<'_>,
        objects: &[OsuDifficultyObject<'_>],
    ) -> f64 {
        self.current_strain *= strain_decay(curr.strain_time, Self::STRAIN_DECAY_BASE);
        self.current_strain += SpeedEvaluator::evaluate_diff_of(curr, objects) * Self::SKILL_MULTIPLIER;
        self.current_rhythm = RhythmEvaluator::evaluate_diff_of(curr, objects);
        self.max_rhythm = self.max_rhythm.max(self.current_rhythm);

        self.current_strain * self.current_rhythm
    }

    /// Strain of each processed object.
    pub fn object_strains(&self) -> &[f64] {
        &self.object_strains
    }

    /// Highest rhythm multiplier among all processed objects.
    pub const fn max_rhythm(&self) -> f64 {
        self.max_rhythm
    }

    pub fn relevant_note_count(&self) -> f64 {
        self.object_strains
            .iter()
            .copied()
            .max_by(f64::total_cmp)
            .filter(|&n| n > 0.0)
            .map_or(0.0, |max_strain| {
                self.object_strains.iter().fold(0.0, |sum, strain| {
                    sum + (1.0 + f64::exp(-(strain / max_strain * 12.0 - 6.0))).recip()
                })
            })
    }

    pub fn count_top_weighted_strains(&self, difficulty_value: f64) -> f64 {
        strain::count_top_weighted_strains(&self.object_strains, difficulty_value)
    }

    pub fn cloned_difficulty_value(&self) -> f64 {
        let mut peaks = self.strain_peaks.clone();
        peaks.push(self.current_section_peak);

        Self::difficulty_value(peaks)
    }

    fn difficulty_value(current_strain_peaks: Vec<f64>) -> f64 {
        strain::difficulty_value(
            current_strain_peaks,
            Self::REDUCED_SECTION_COUNT,
            Self::REDUCED_STRAIN_BASELINE,
            Self::DECAY_WEIGHT,
        ) * Self::DIFFICULTY_MULTIPLIER
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        model::hit_object::{ChartObject, Pos},
        osu::difficulty::scaling_factor::ScalingFactor,
    };

    use super::*;

    fn stream(count: u32, delta: f64) -> Vec<ChartObject> {
        (0..count)
            .map(|i| ChartObject::circle(Pos::new(0.0, 0.0), 1000.0 + f64::from(i) * delta))
            .collect()
    }

    fn process(raw: &[ChartObject]) -> Speed {
        let scaling_factor = ScalingFactor::new(4.0);
        let objects: Vec<_> = raw
            .windows(2)
            .enumerate()
            .map(|(idx, pair)| OsuDifficultyObject::new(&pair[1], &pair[0], 1.0, idx, 64.0, &scaling_factor))
            .collect();

        let mut speed = Speed::new();

        for curr in &objects {
            speed.process(curr, &objects);
        }

        speed
    }

    #[test]
    fn one_strain_per_object() {
        let speed = process(&stream(20, 100.0));

        assert_eq!(speed.object_strains().len(), 19);
        assert!(speed.object_strains().iter().all(|&s| s > 0.0));
    }

    #[test]
    fn faster_stream_is_harder() {
        let slow = process(&stream(50, 150.0)).cloned_difficulty_value();
        let fast = process(&stream(50, 75.0)).cloned_difficulty_value();

        assert!(fast > slow, "{fast} <= {slow}");
    }

    #[test]
    fn constant_stream_has_rhythm_one() {
        let speed = process(&stream(30, 100.0));

        assert!((speed.max_rhythm() - 1.0).abs() < f64::EPSILON);
        assert!(speed.relevant_note_count() > 0.0);
    }

    #[test]
    fn empty_skill_is_zero() {
        let speed = Speed::new();

        assert!(speed.cloned_difficulty_value().abs() < f64::EPSILON);
        assert!(speed.relevant_note_count().abs() < f64::EPSILON);
    }
}
