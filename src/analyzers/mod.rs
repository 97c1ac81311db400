pub mod temporal_analyzer;

pub use temporal_analyzer::{ChartSeries, SelectionSummary, TemporalAnalyzer};
