/// Decoded charts.
pub mod chart;

/// Hit objects of a chart.
pub mod hit_object;
