use std::{io, path::Path};

use rosu_map::{
    section::{
        general::GameMode,
        hit_objects::{Curve, CurveBuffers, HitObject, HitObjectKind},
    },
    Beatmap,
};

use super::hit_object::{ChartObject, ChartSlider, Pos};

/// A decoded chart containing everything the difficulty calculation needs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedChart {
    pub overall_difficulty: f32,
    pub circle_size: f32,
    pub objects: Vec<ChartObject>,
}

impl ParsedChart {
    /// Create a chart from its difficulty settings and time-ordered objects.
    pub const fn new(overall_difficulty: f32, circle_size: f32, objects: Vec<ChartObject>) -> Self {
        Self {
            overall_difficulty,
            circle_size,
            objects,
        }
    }

    /// Decode a chart from a path to a `.osu` file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let map = rosu_map::from_path::<Beatmap>(path)?;

        Self::try_from(map)
    }

    /// Decode a chart from the content of a `.osu` file.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        let map = rosu_map::from_bytes::<Beatmap>(bytes)?;

        Self::try_from(map)
    }
}

impl TryFrom<Beatmap> for ParsedChart {
    type Error = ParseError;

    fn try_from(map: Beatmap) -> Result<Self, Self::Error> {
        if map.mode != GameMode::Osu {
            return Err(ParseError::UnsupportedMode(map.mode));
        }

        let mut bufs = CurveBuffers::default();

        let objects = map
            .hit_objects
            .iter()
            .map(|h| convert_object(h, &mut bufs))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            overall_difficulty: map.overall_difficulty,
            circle_size: map.circle_size,
            objects,
        })
    }
}

fn convert_object(h: &HitObject, bufs: &mut CurveBuffers) -> Result<ChartObject, ParseError> {
    let start_time = h.start_time;

    if !start_time.is_finite() {
        return Err(ParseError::InvalidObject { start_time });
    }

    let obj = match h.kind {
        HitObjectKind::Circle(ref circle) => ChartObject::circle(circle.pos, start_time),
        HitObjectKind::Slider(ref slider) => {
            let curve = Curve::new(
                GameMode::Osu,
                slider.path.control_points(),
                slider.path.expected_dist(),
                bufs,
            );

            let repeat_count = usize::try_from(slider.repeat_count).unwrap_or(0);
            let span_count = (repeat_count + 1) as f64;

            let duration = if slider.velocity > 0.0 {
                span_count * curve.dist() / slider.velocity
            } else {
                0.0
            };

            let slider_pos = slider.pos;

            let slider = ChartSlider {
                end_time: start_time + duration,
                repeat_count,
                path_end: curve.position_at(1.0),
            };

            ChartObject::slider(slider_pos, start_time, slider)
        }
        HitObjectKind::Spinner(ref spinner) => {
            ChartObject::spinner(spinner.pos, start_time, spinner.duration)
        }
        // Hold notes only appear in mania maps which are rejected above but
        // treat them like spinners regardless.
        HitObjectKind::Hold(ref hold) => {
            ChartObject::spinner(Pos::new(hold.pos_x, 192.0), start_time, hold.duration)
        }
    };

    Ok(obj)
}

/// Error when decoding a chart.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to read beatmap")]
    Io(#[from] io::Error),
    #[error("unsupported game mode {0:?}")]
    UnsupportedMode(GameMode),
    #[error("hit object has an invalid start time of {start_time}")]
    InvalidObject { start_time: f64 },
}
