pub mod alert;
pub mod config;
pub mod error;
pub mod market;
pub mod types;

pub use alert::Alert;
pub use config::Config;
pub use error::{Error, Result};
pub use market::{MarketDataSource, Notifier};
pub use types::*;
