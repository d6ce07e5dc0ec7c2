pub use self::{rhythm::RhythmEvaluator, speed::SpeedEvaluator};

mod rhythm;
mod speed;
