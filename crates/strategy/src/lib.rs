pub mod classifier;
pub mod config;
pub mod forex;
pub mod indicators;

pub use classifier::{classify, BinaryClassifier};
pub use config::{BinaryConfig, ForexConfig, IndicatorPeriods, StrategyFileConfig};
pub use forex::ForexAnalyzer;
pub use indicators::{compute, IndicatorBar, IndicatorSeries};
