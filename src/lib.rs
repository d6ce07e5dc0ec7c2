//! Background recalculation of osu!standard difficulty attributes.
//!
//! ## Description
//!
//! A chart's tapping difficulty is derived from two evaluators that run over
//! the chart's hit objects: the [`SpeedEvaluator`] rates how fast and how far
//! apart consecutive taps are, and the [`RhythmEvaluator`] rates how irregular
//! the rhythm is. A decaying strain skill combines both into
//! [`OsuDifficultyAttributes`].
//!
//! On top of that, the [`batch`] module recalculates the attributes of every
//! chart in a library that needs it, spread over a pool of worker threads.
//!
//! ## Usage
//!
//! ```no_run
//! use rosu_recalc::{Difficulty, ParsedChart};
//!
//! // Decode the chart
//! let chart = ParsedChart::from_path("./resources/2785319.osu").unwrap();
//!
//! // Calculate difficulty attributes, here with a 1.5x clock rate
//! let attrs = Difficulty::new()
//!     .clock_rate(1.5)
//!     .calculate(&chart)
//!     .unwrap();
//!
//! println!("Speed: {:.2} | Max rhythm: {:.2}", attrs.speed, attrs.max_rhythm);
//! ```
//!
//! ## Logging
//!
//! Batches report through the [`log`] facade; installing a logger is up to
//! the application.
//!
//! ## Features
//!
//! | Flag | Description | Dependencies
//! | - | - | -
//! | `default` | No features |
//! | `tracing` | Any error encountered during beatmap decoding will be logged through `tracing::error`. If this features is not enabled, errors will be ignored. | [`tracing`]
//!
//! [`log`]: https://docs.rs/log
//! [`tracing`]: https://docs.rs/tracing

#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::missing_const_for_fn, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::similar_names
)]

#[doc(inline)]
pub use self::{
    difficulty::Difficulty,
    model::chart::ParsedChart,
    osu::{OsuDifficultyAttributes, RhythmEvaluator, SpeedEvaluator},
};

/// Recalculating whole chart libraries.
pub mod batch;

/// Types for osu!standard calculations.
pub mod osu;

/// Types used in and around this crate.
pub mod model;

mod difficulty;

mod util;
