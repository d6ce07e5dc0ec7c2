pub use rosu_map::util::Pos;

/// All hitobject related data required for difficulty calculation.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartObject {
    pub pos: Pos,
    pub start_time: f64,
    pub kind: ChartObjectKind,
}

impl ChartObject {
    /// Create a new circle.
    pub const fn circle(pos: Pos, start_time: f64) -> Self {
        Self {
            pos,
            start_time,
            kind: ChartObjectKind::Circle,
        }
    }

    /// Create a new slider.
    pub const fn slider(pos: Pos, start_time: f64, slider: ChartSlider) -> Self {
        Self {
            pos,
            start_time,
            kind: ChartObjectKind::Slider(slider),
        }
    }

    /// Create a new spinner.
    pub const fn spinner(pos: Pos, start_time: f64, duration: f64) -> Self {
        Self {
            pos,
            start_time,
            kind: ChartObjectKind::Spinner { duration },
        }
    }

    /// Whether the hitobject is a circle.
    pub const fn is_circle(&self) -> bool {
        matches!(self.kind, ChartObjectKind::Circle)
    }

    /// Whether the hitobject is a slider.
    pub const fn is_slider(&self) -> bool {
        matches!(self.kind, ChartObjectKind::Slider(_))
    }

    /// Whether the hitobject is a spinner.
    pub const fn is_spinner(&self) -> bool {
        matches!(self.kind, ChartObjectKind::Spinner { .. })
    }

    /// The end time of the object.
    pub fn end_time(&self) -> f64 {
        match self.kind {
            ChartObjectKind::Circle => self.start_time,
            ChartObjectKind::Slider(ref slider) => slider.end_time,
            ChartObjectKind::Spinner { duration } => self.start_time + duration,
        }
    }

    /// The position at which the cursor rests after following the object
    /// lazily.
    ///
    /// For sliders with an odd amount of spans this is the far end of the
    /// path, otherwise the slider returns to its head.
    pub fn lazy_end_pos(&self) -> Pos {
        match self.kind {
            ChartObjectKind::Slider(ref slider) if slider.span_count() % 2 == 1 => {
                self.pos + slider.path_end
            }
            _ => self.pos,
        }
    }
}

/// Additional data for a [`ChartObject`].
#[derive(Clone, Debug, PartialEq)]
pub enum ChartObjectKind {
    Circle,
    Slider(ChartSlider),
    Spinner { duration: f64 },
}

/// A slider.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartSlider {
    pub end_time: f64,
    pub repeat_count: usize,
    /// Far end of the slider path, relative to the slider head.
    pub path_end: Pos,
}

impl ChartSlider {
    /// The amount of spans of the slider.
    pub const fn span_count(&self) -> usize {
        self.repeat_count + 1
    }
}
