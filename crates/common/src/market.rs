use async_trait::async_trait;

use crate::{Bar, Result};

/// Source of historical OHLC bars.
///
/// `YahooClient` in `crates/engine` implements this against the Yahoo
/// Finance chart API. Tests substitute an in-memory source.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch bars for `symbol` (e.g. "EURUSD=X"), oldest first.
    ///
    /// `interval` and `range` use the provider's own notation ("1m", "1d").
    /// May return fewer bars than the range nominally covers.
    async fn fetch_bars(&self, symbol: &str, interval: &str, range: &str) -> Result<Vec<Bar>>;
}

/// Outbound text channel for alerts.
///
/// The destination chat is fixed when the notifier is built; callers only
/// supply the message body. Failures are reported, never retried.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}
