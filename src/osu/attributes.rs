/// The result of a difficulty calculation on an osu!standard chart.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OsuDifficultyAttributes {
    /// The difficulty of the speed skill.
    pub speed: f64,
    /// The number of clickable objects weighted by difficulty.
    pub speed_note_count: f64,
    /// Weighted sum of speed strains.
    pub speed_difficult_strain_count: f64,
    /// The highest rhythm multiplier of any object.
    pub max_rhythm: f64,
    /// The overall difficulty
    pub od: f64,
    /// The timing leniency in ms for a great hit, adjusted by clock rate.
    pub great_hit_window: f64,
    /// The amount of circles.
    pub n_circles: u32,
    /// The amount of sliders.
    pub n_sliders: u32,
    /// The amount of spinners.
    pub n_spinners: u32,
}

impl OsuDifficultyAttributes {
    /// Return the amount of hitobjects.
    pub const fn n_objects(&self) -> u32 {
        self.n_circles + self.n_sliders + self.n_spinners
    }
}
