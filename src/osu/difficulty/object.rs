use crate::model::hit_object::{ChartObject, ChartObjectKind};

use super::scaling_factor::ScalingFactor;

/// A [`ChartObject`] alongside everything the evaluators need to know about
/// its relation to preceding objects.
///
/// Objects are stored in a single slice; lookups into the history go through
/// [`previous`] and [`next`] with the slice passed in.
///
/// [`previous`]: OsuDifficultyObject::previous
/// [`next`]: OsuDifficultyObject::next
#[derive(Clone, Debug)]
pub struct OsuDifficultyObject<'a> {
    pub idx: usize,
    pub base: &'a ChartObject,
    pub start_time: f64,
    pub delta_time: f64,

    pub strain_time: f64,
    pub full_great_window: f64,
    pub lazy_jump_dist: f64,
    pub min_jump_dist: f64,
    pub travel_dist: f64,
    pub lazy_travel_dist: f64,
    pub doubletapness: f64,
}

impl<'a> OsuDifficultyObject<'a> {
    pub const NORMALIZED_RADIUS: i32 = 50;
    pub const NORMALIZED_DIAMETER: i32 = Self::NORMALIZED_RADIUS * 2;

    pub const MIN_DELTA_TIME: f64 = 25.0;
    const MAX_SLIDER_RADIUS: f32 = Self::NORMALIZED_RADIUS as f32 * 2.4;
    const ASSUMED_SLIDER_RADIUS: f32 = Self::NORMALIZED_RADIUS as f32 * 1.8;

    pub fn new(
        hit_object: &'a ChartObject,
        last_object: &'a ChartObject,
        clock_rate: f64,
        idx: usize,
        full_great_window: f64,
        scaling_factor: &ScalingFactor,
    ) -> Self {
        let delta_time = (hit_object.start_time - last_object.start_time) / clock_rate;
        let start_time = hit_object.start_time / clock_rate;

        // * Capped to 25ms to prevent difficulty calculation breaking from simultaneous objects.
        let strain_time = delta_time.max(Self::MIN_DELTA_TIME);

        let mut this = Self {
            idx,
            base: hit_object,
            start_time,
            delta_time,
            strain_time,
            full_great_window,
            lazy_jump_dist: 0.0,
            min_jump_dist: 0.0,
            travel_dist: 0.0,
            lazy_travel_dist: 0.0,
            doubletapness: 0.0,
        };

        this.set_distances(last_object, scaling_factor);

        this
    }

    /// The object `backwards_idx + 1` positions before this one.
    ///
    /// Returns `None` when looking past the start of the sequence.
    pub fn previous<'o>(&self, backwards_idx: usize, diff_objects: &'o [Self]) -> Option<&'o Self> {
        self.idx
            .checked_sub(backwards_idx + 1)
            .and_then(|idx| diff_objects.get(idx))
    }

    /// The object `forwards_idx + 1` positions after this one.
    pub fn next<'o>(&self, forwards_idx: usize, diff_objects: &'o [Self]) -> Option<&'o Self> {
        diff_objects.get(self.idx + (forwards_idx + 1))
    }

    pub fn get_doubletapness(&self, next: Option<&Self>, hit_window: f64) -> f64 {
        let Some(next) = next else { return 0.0 };

        let hit_window = if self.base.is_spinner() {
            0.0
        } else {
            hit_window
        };

        let curr_delta_time = self.delta_time.max(1.0);
        let next_delta_time = next.delta_time.max(1.0);
        let delta_diff = (next_delta_time - curr_delta_time).abs();
        let speed_ratio = curr_delta_time / curr_delta_time.max(delta_diff);
        let window_ratio = (curr_delta_time / hit_window).min(1.0).powf(2.0);

        1.0 - (speed_ratio).powf(1.0 - window_ratio)
    }

    fn set_distances(&mut self, last_object: &ChartObject, scaling_factor: &ScalingFactor) {
        let factor = scaling_factor.factor;

        if let ChartObjectKind::Slider(ref slider) = self.base.kind {
            let span_dist = f64::from(slider.path_end.length() * factor)
                - f64::from(Self::ASSUMED_SLIDER_RADIUS);

            self.lazy_travel_dist = slider.span_count() as f64 * span_dist.max(0.0);

            // * Bonus for repeat sliders until a better per nested object strain system can be achieved.
            self.travel_dist = self.lazy_travel_dist
                * ((1.0 + slider.repeat_count as f64 / 2.5).powf(1.0 / 2.5));
        }

        // * We don't need to calculate either angle or distance when one of the last->curr objects is a spinner
        if self.base.is_spinner() || last_object.is_spinner() {
            return;
        }

        let last_cursor_pos = last_object.lazy_end_pos();

        self.lazy_jump_dist =
            f64::from((self.base.pos * factor - last_cursor_pos * factor).length());
        self.min_jump_dist = self.lazy_jump_dist;

        if last_object.is_slider() {
            // * There are two types of slider-to-object patterns to consider in order to better approximate the real movement a player will take to jump between the hitobjects.
            // * Thus, the player is assumed to jump the minimum of these two distances in all cases.
            let tail_jump_dist = (last_cursor_pos - self.base.pos).length() * factor;

            let diff = f64::from(Self::MAX_SLIDER_RADIUS - Self::ASSUMED_SLIDER_RADIUS);
            let min = f64::from(tail_jump_dist - Self::MAX_SLIDER_RADIUS);

            self.min_jump_dist = ((self.lazy_jump_dist - diff).min(min)).max(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::hit_object::{ChartSlider, Pos};

    use super::*;

    fn scaling() -> ScalingFactor {
        ScalingFactor::new(4.0)
    }

    #[test]
    fn strain_time_is_capped() {
        let a = ChartObject::circle(Pos::new(0.0, 0.0), 1000.0);
        let b = ChartObject::circle(Pos::new(0.0, 0.0), 1010.0);

        let obj = OsuDifficultyObject::new(&b, &a, 1.0, 0, 64.0, &scaling());

        assert!((obj.delta_time - 10.0).abs() < f64::EPSILON);
        assert!((obj.strain_time - OsuDifficultyObject::MIN_DELTA_TIME).abs() < f64::EPSILON);
    }

    #[test]
    fn clock_rate_scales_times() {
        let a = ChartObject::circle(Pos::new(0.0, 0.0), 1000.0);
        let b = ChartObject::circle(Pos::new(0.0, 0.0), 1300.0);

        let obj = OsuDifficultyObject::new(&b, &a, 1.5, 0, 64.0, &scaling());

        assert!((obj.start_time - 1300.0 / 1.5).abs() < 1e-9);
        assert!((obj.strain_time - 200.0).abs() < 1e-9);
    }

    #[test]
    fn no_jump_from_spinner() {
        let a = ChartObject::spinner(Pos::new(0.0, 0.0), 0.0, 500.0);
        let b = ChartObject::circle(Pos::new(300.0, 0.0), 1000.0);

        let obj = OsuDifficultyObject::new(&b, &a, 1.0, 0, 64.0, &scaling());

        assert!(obj.lazy_jump_dist.abs() < f64::EPSILON);
        assert!(obj.min_jump_dist.abs() < f64::EPSILON);
    }

    #[test]
    fn slider_travel_distance() {
        let a = ChartObject::circle(Pos::new(0.0, 0.0), 0.0);
        let slider = ChartSlider {
            end_time: 1400.0,
            repeat_count: 1,
            path_end: Pos::new(200.0, 0.0),
        };
        let b = ChartObject::slider(Pos::new(100.0, 100.0), 1000.0, slider);

        let obj = OsuDifficultyObject::new(&b, &a, 1.0, 0, 64.0, &scaling());

        assert!(obj.lazy_travel_dist > 0.0);
        assert!(obj.travel_dist > obj.lazy_travel_dist);
    }

    #[test]
    fn lookup_is_bounded() {
        let raw: Vec<_> = (0..4)
            .map(|i| ChartObject::circle(Pos::new(0.0, 0.0), f64::from(i) * 100.0))
            .collect();

        let objects: Vec<_> = raw
            .windows(2)
            .enumerate()
            .map(|(idx, pair)| OsuDifficultyObject::new(&pair[1], &pair[0], 1.0, idx, 64.0, &scaling()))
            .collect();

        let last = &objects[2];

        assert_eq!(last.previous(0, &objects).map(|o| o.idx), Some(1));
        assert_eq!(last.previous(1, &objects).map(|o| o.idx), Some(0));
        assert!(last.previous(2, &objects).is_none());
        assert!(last.next(0, &objects).is_none());
        assert_eq!(objects[0].next(1, &objects).map(|o| o.idx), Some(2));
    }

    #[test]
    fn doubletapness_without_next() {
        let a = ChartObject::circle(Pos::new(0.0, 0.0), 0.0);
        let b = ChartObject::circle(Pos::new(0.0, 0.0), 100.0);

        let obj = OsuDifficultyObject::new(&b, &a, 1.0, 0, 64.0, &scaling());

        assert!(obj.get_doubletapness(None, 64.0).abs() < f64::EPSILON);
    }
}
