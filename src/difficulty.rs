use crate::{
    model::chart::ParsedChart,
    osu::{OsuDifficultyAttributes, SequenceError},
};

/// Difficulty calculator on charts.
///
/// # Example
///
/// ```
/// use rosu_recalc::{
///     model::{chart::ParsedChart, hit_object::{ChartObject, Pos}},
///     Difficulty,
/// };
///
/// let objects = (0..16)
///     .map(|i| ChartObject::circle(Pos::new(0.0, 0.0), f64::from(i) * 150.0))
///     .collect();
///
/// let chart = ParsedChart::new(8.0, 4.0, objects);
///
/// let attrs = Difficulty::new()
///     .clock_rate(1.5)
///     .calculate(&chart)
///     .unwrap();
///
/// assert!(attrs.speed > 0.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[must_use]
pub struct Difficulty {
    passed_objects: Option<u32>,
    clock_rate: Option<f64>,
}

impl Difficulty {
    /// Create a new difficulty calculator.
    pub const fn new() -> Self {
        Self {
            passed_objects: None,
            clock_rate: None,
        }
    }

    /// Amount of passed objects for partial plays, e.g. a fail.
    pub const fn passed_objects(mut self, passed_objects: u32) -> Self {
        self.passed_objects = Some(passed_objects);

        self
    }

    /// Adjust the clock rate used in the calculation.
    ///
    /// If none is specified, the clock rate will be `1.0`.
    pub const fn clock_rate(mut self, clock_rate: f64) -> Self {
        self.clock_rate = Some(clock_rate);

        self
    }

    /// Perform the difficulty calculation.
    pub fn calculate(&self, chart: &ParsedChart) -> Result<OsuDifficultyAttributes, SequenceError> {
        crate::osu::difficulty::difficulty(self, chart)
    }

    pub(crate) fn get_passed_objects(&self) -> usize {
        self.passed_objects.map_or(usize::MAX, |n| n as usize)
    }

    pub(crate) fn get_clock_rate(&self) -> f64 {
        self.clock_rate.unwrap_or(1.0)
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::new()
    }
}
