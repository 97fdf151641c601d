pub mod cooldown;
pub mod scanner;
pub mod yahoo;

pub use cooldown::CooldownTracker;
pub use scanner::{Scanner, TickReport};
pub use yahoo::YahooClient;
