use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use common::{Alert, MarketDataSource, Notifier, Result, ScannerState};
use strategy::{BinaryClassifier, ForexAnalyzer, StrategyFileConfig};

use crate::cooldown::CooldownTracker;

/// Counters for one pass over the symbol list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Symbols whose short-timeframe bars were fetched and classified.
    pub evaluated: usize,
    /// Symbols skipped because the short-timeframe fetch failed.
    pub failed: usize,
    /// Evaluated symbols whose forex check failed on a fetch.
    pub forex_failed: usize,
    pub alerts_sent: usize,
    /// Signals held back by an active cooldown.
    pub suppressed: usize,
    pub notify_failures: usize,
}

/// Timer-driven scan over a fixed symbol list.
///
/// Owns its cooldown state; nothing else reads or writes it. One cooldown
/// covers every alert kind, so a symbol gets at most one message per window.
/// Symbols are processed one after another and a failure on one never
/// aborts the tick.
pub struct Scanner {
    source: Arc<dyn MarketDataSource>,
    notifier: Arc<dyn Notifier>,
    symbols: Vec<String>,
    binary: BinaryClassifier,
    /// `None` when forex setups are disabled.
    forex: Option<ForexAnalyzer>,
    interval: Duration,
    cooldown: CooldownTracker,
    state: ScannerState,
}

impl Scanner {
    pub fn new(
        source: Arc<dyn MarketDataSource>,
        notifier: Arc<dyn Notifier>,
        symbols: Vec<String>,
        strategy: &StrategyFileConfig,
        interval: Duration,
        cooldown: Duration,
    ) -> Self {
        let forex = strategy
            .forex
            .enabled
            .then(|| ForexAnalyzer::new(strategy.periods, strategy.forex.clone()));

        Self {
            source,
            notifier,
            symbols,
            binary: BinaryClassifier::new(strategy.periods, strategy.binary.clone()),
            forex,
            interval,
            cooldown: CooldownTracker::new(cooldown),
            state: ScannerState::Idle,
        }
    }

    pub fn state(&self) -> ScannerState {
        self.state
    }

    /// Run forever: one tick immediately, then one per `interval`.
    /// A tick that overruns delays the next one rather than bunching up.
    /// Call from `tokio::spawn`.
    pub async fn run(mut self) {
        info!(
            symbols = self.symbols.len(),
            interval_secs = self.interval.as_secs(),
            cooldown_secs = self.cooldown.window().as_secs(),
            forex = self.forex.is_some(),
            "Scanner running"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let report = self.tick(Utc::now()).await;
            info!(
                evaluated = report.evaluated,
                failed = report.failed,
                forex_failed = report.forex_failed,
                alerts = report.alerts_sent,
                suppressed = report.suppressed,
                notify_failures = report.notify_failures,
                "Scan complete"
            );
        }
    }

    /// Evaluate every symbol once at wall-clock `now`.
    pub async fn tick(&mut self, now: DateTime<Utc>) -> TickReport {
        self.state = ScannerState::Scanning;
        let mut report = TickReport::default();

        let symbols = self.symbols.clone();
        for symbol in &symbols {
            if let Err(e) = self.scan_binary(symbol, now, &mut report).await {
                report.failed += 1;
                warn!(%symbol, error = %e, "Symbol scan failed, skipping until next tick");
                continue;
            }
            report.evaluated += 1;

            if let Err(e) = self.scan_forex(symbol, now, &mut report).await {
                report.forex_failed += 1;
                warn!(%symbol, error = %e, "Forex check failed, skipping until next tick");
            }
        }

        self.state = ScannerState::Idle;
        report
    }

    async fn scan_binary(
        &mut self,
        symbol: &str,
        now: DateTime<Utc>,
        report: &mut TickReport,
    ) -> Result<()> {
        let cfg = &self.binary.cfg;
        let bars = self.source.fetch_bars(symbol, &cfg.interval, &cfg.range).await?;
        let signal = self.binary.evaluate(&bars);
        debug!(%symbol, bars = bars.len(), ?signal, "Classified");

        if signal.is_actionable() {
            let alert = Alert::Binary {
                symbol: symbol.to_string(),
                signal,
                timeframe: self.binary.cfg.timeframe_label.clone(),
                at: now,
            };
            deliver(self.notifier.as_ref(), &mut self.cooldown, &alert, now, report).await;
        }
        Ok(())
    }

    /// Runs only while the symbol is out of cooldown, which also covers a
    /// binary alert sent earlier in the same tick.
    async fn scan_forex(
        &mut self,
        symbol: &str,
        now: DateTime<Utc>,
        report: &mut TickReport,
    ) -> Result<()> {
        let Some(forex) = &self.forex else {
            return Ok(());
        };
        if !self.cooldown.should_alert(symbol, now) {
            return Ok(());
        }

        let cfg = &forex.cfg;
        let trend_bars = self
            .source
            .fetch_bars(symbol, &cfg.trend_interval, &cfg.trend_range)
            .await?;
        let Some(trend) = forex.trend(&trend_bars) else {
            return Ok(());
        };

        let entry_bars = self
            .source
            .fetch_bars(symbol, &cfg.entry_interval, &cfg.entry_range)
            .await?;
        let Some(setup) = forex.entry(&entry_bars, trend) else {
            debug!(%symbol, %trend, "Trend without entry");
            return Ok(());
        };

        let alert = Alert::Forex {
            symbol: symbol.to_string(),
            setup,
            at: now,
        };
        deliver(self.notifier.as_ref(), &mut self.cooldown, &alert, now, report).await;
        Ok(())
    }
}

/// Send `alert` unless its symbol is cooling down. The cooldown is only
/// started by a successful send.
async fn deliver(
    notifier: &dyn Notifier,
    cooldown: &mut CooldownTracker,
    alert: &Alert,
    now: DateTime<Utc>,
    report: &mut TickReport,
) {
    let symbol = alert.symbol();
    if !cooldown.should_alert(symbol, now) {
        debug!(
            %symbol,
            last_alert = ?cooldown.last_alert(symbol),
            "Signal suppressed by cooldown"
        );
        report.suppressed += 1;
        return;
    }

    match notifier.send(&alert.message()).await {
        Ok(()) => {
            cooldown.record(symbol, now);
            report.alerts_sent += 1;
            info!(%symbol, "Alert sent");
        }
        Err(e) => {
            report.notify_failures += 1;
            warn!(%symbol, error = %e, "Failed to send alert");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::TimeZone;
    use common::{Bar, Error};

    // ─── Test doubles ─────────────────────────────────────────────────────────

    #[derive(Default)]
    struct MockSource {
        bars: HashMap<(String, String), Vec<Bar>>,
        failing: HashSet<String>,
        failing_intervals: HashSet<(String, String)>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl MockSource {
        fn with(mut self, symbol: &str, interval: &str, bars: Vec<Bar>) -> Self {
            self.bars.insert((symbol.into(), interval.into()), bars);
            self
        }

        fn failing(mut self, symbol: &str) -> Self {
            self.failing.insert(symbol.into());
            self
        }

        fn failing_interval(mut self, symbol: &str, interval: &str) -> Self {
            self.failing_intervals.insert((symbol.into(), interval.into()));
            self
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MarketDataSource for MockSource {
        async fn fetch_bars(&self, symbol: &str, interval: &str, _range: &str) -> Result<Vec<Bar>> {
            self.calls
                .lock()
                .unwrap()
                .push((symbol.to_string(), interval.to_string()));
            let key = (symbol.to_string(), interval.to_string());
            if self.failing.contains(symbol) || self.failing_intervals.contains(&key) {
                return Err(Error::MarketData(format!("{symbol}: connection reset")));
            }
            Ok(self
                .bars
                .get(&key)
                .cloned()
                .unwrap_or_default())
        }
    }

    #[derive(Default)]
    struct MockNotifier {
        sent: Mutex<Vec<String>>,
        fail: AtomicBool,
    }

    impl MockNotifier {
        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for MockNotifier {
        async fn send(&self, text: &str) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(Error::Notify("chat not found".into()));
            }
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    // ─── Fixtures ─────────────────────────────────────────────────────────────

    /// Zig-zag closes drifting by `drift` per bar, each bar opening at the
    /// previous close. Even indices move by `drift + 2 * swing`, so with a
    /// positive swing and 251 bars the last bar is a rising bar in an uptrend
    /// with RSI near 57 and ADX at 100.
    fn zigzag(n: usize, drift: f64, swing: f64) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap();
        let close_at = |i: usize| {
            let wiggle = if i % 2 == 0 { swing } else { -swing };
            1.1 + drift * i as f64 + wiggle
        };
        (0..n)
            .map(|i| {
                let close = close_at(i);
                let open = if i == 0 { close } else { close_at(i - 1) };
                Bar {
                    timestamp: start + chrono::Duration::minutes(i as i64),
                    open,
                    high: open.max(close) + 0.0002,
                    low: open.min(close) - 0.0002,
                    close,
                }
            })
            .collect()
    }

    fn uptrend() -> Vec<Bar> {
        zigzag(251, 0.0001, 0.0005)
    }

    fn downtrend() -> Vec<Bar> {
        zigzag(251, -0.0001, -0.0005)
    }

    fn binary_only() -> StrategyFileConfig {
        let mut cfg = StrategyFileConfig::default();
        cfg.forex.enabled = false;
        cfg
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap()
    }

    fn scanner(
        source: Arc<MockSource>,
        notifier: Arc<MockNotifier>,
        symbols: &[&str],
        strategy: &StrategyFileConfig,
    ) -> Scanner {
        Scanner::new(
            source,
            notifier,
            symbols.iter().map(|s| s.to_string()).collect(),
            strategy,
            Duration::from_secs(60),
            Duration::from_secs(300),
        )
    }

    // ─── Tests ────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn up_signal_is_sent() {
        let source = Arc::new(MockSource::default().with("EURUSD=X", "1m", uptrend()));
        let notifier = Arc::new(MockNotifier::default());
        let mut scanner = scanner(source, notifier.clone(), &["EURUSD=X"], &binary_only());

        let report = scanner.tick(t0()).await;

        assert_eq!(report.alerts_sent, 1);
        assert_eq!(report.evaluated, 1);
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("Pair: EURUSD"), "unexpected message: {}", sent[0]);
        assert!(sent[0].contains("HIGHER"), "unexpected message: {}", sent[0]);
    }

    #[tokio::test]
    async fn down_signal_is_sent() {
        let source = Arc::new(MockSource::default().with("GBPUSD=X", "1m", downtrend()));
        let notifier = Arc::new(MockNotifier::default());
        let mut scanner = scanner(source, notifier.clone(), &["GBPUSD=X"], &binary_only());

        scanner.tick(t0()).await;

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("LOWER"), "unexpected message: {}", sent[0]);
    }

    #[tokio::test]
    async fn cooldown_suppresses_repeat_until_window_passes() {
        let source = Arc::new(MockSource::default().with("EURUSD=X", "1m", uptrend()));
        let notifier = Arc::new(MockNotifier::default());
        let mut scanner = scanner(source, notifier.clone(), &["EURUSD=X"], &binary_only());

        scanner.tick(t0()).await;
        let report = scanner.tick(t0() + chrono::Duration::seconds(60)).await;
        assert_eq!(report.suppressed, 1);
        assert_eq!(report.alerts_sent, 0);
        scanner.tick(t0() + chrono::Duration::seconds(299)).await;
        assert_eq!(notifier.sent().len(), 1);

        let report = scanner.tick(t0() + chrono::Duration::seconds(300)).await;
        assert_eq!(report.alerts_sent, 1);
        assert_eq!(notifier.sent().len(), 2);
    }

    #[tokio::test]
    async fn fetch_failure_does_not_stop_later_symbols() {
        let source = Arc::new(
            MockSource::default()
                .failing("USDJPY=X")
                .with("EURUSD=X", "1m", uptrend()),
        );
        let notifier = Arc::new(MockNotifier::default());
        let mut scanner = scanner(
            source.clone(),
            notifier.clone(),
            &["USDJPY=X", "EURUSD=X"],
            &binary_only(),
        );

        let report = scanner.tick(t0()).await;

        assert_eq!(report.failed, 1);
        assert_eq!(report.evaluated, 1);
        assert_eq!(report.alerts_sent, 1);
        let fetched: Vec<String> = source.calls().into_iter().map(|(s, _)| s).collect();
        assert_eq!(fetched, vec!["USDJPY=X", "EURUSD=X"]);
    }

    #[tokio::test]
    async fn failed_notification_does_not_start_cooldown() {
        let source = Arc::new(MockSource::default().with("EURUSD=X", "1m", uptrend()));
        let notifier = Arc::new(MockNotifier::default());
        notifier.fail.store(true, Ordering::SeqCst);
        let mut scanner = scanner(source, notifier.clone(), &["EURUSD=X"], &binary_only());

        let report = scanner.tick(t0()).await;
        assert_eq!(report.notify_failures, 1);
        assert_eq!(report.evaluated, 1);
        assert_eq!(report.failed, 0);

        notifier.fail.store(false, Ordering::SeqCst);
        let report = scanner.tick(t0() + chrono::Duration::seconds(60)).await;
        assert_eq!(report.alerts_sent, 1);
        assert_eq!(report.suppressed, 0);
    }

    #[tokio::test]
    async fn flat_market_sends_nothing() {
        let source = Arc::new(MockSource::default().with("EURGBP=X", "1m", zigzag(251, 0.0, 0.0)));
        let notifier = Arc::new(MockNotifier::default());
        let mut scanner = scanner(source, notifier.clone(), &["EURGBP=X"], &binary_only());

        let report = scanner.tick(t0()).await;
        assert_eq!(report.evaluated, 1);
        assert_eq!(report.alerts_sent, 0);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn forex_setup_is_sent_with_levels() {
        let source = Arc::new(
            MockSource::default()
                .with("EURUSD=X", "15m", uptrend())
                .with("EURUSD=X", "5m", zigzag(61, 0.0, 0.0005)),
        );
        let notifier = Arc::new(MockNotifier::default());
        let strategy = StrategyFileConfig::default();
        let mut scanner = scanner(source.clone(), notifier.clone(), &["EURUSD=X"], &strategy);

        let report = scanner.tick(t0()).await;

        assert_eq!(report.alerts_sent, 1);
        let sent = notifier.sent();
        assert!(sent[0].starts_with("📊 FOREX SIGNAL"), "unexpected message: {}", sent[0]);
        assert!(sent[0].contains("Type: BUY"));
        let intervals: Vec<String> = source.calls().into_iter().map(|(_, i)| i).collect();
        assert_eq!(intervals, vec!["1m", "15m", "5m"]);

        // Cooldown skips the higher-timeframe fetches entirely
        scanner.tick(t0() + chrono::Duration::seconds(60)).await;
        assert_eq!(source.calls().len(), 4);
    }

    #[tokio::test]
    async fn binary_and_forex_share_one_cooldown() {
        let source = Arc::new(
            MockSource::default()
                .with("EURUSD=X", "1m", uptrend())
                .with("EURUSD=X", "15m", uptrend())
                .with("EURUSD=X", "5m", zigzag(61, 0.0, 0.0005)),
        );
        let notifier = Arc::new(MockNotifier::default());
        let strategy = StrategyFileConfig::default();
        let mut scanner = scanner(source.clone(), notifier.clone(), &["EURUSD=X"], &strategy);

        let report = scanner.tick(t0()).await;

        assert_eq!(report.alerts_sent, 1);
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].starts_with("📈 BINARY SIGNAL"), "unexpected message: {}", sent[0]);
        let intervals: Vec<String> = source.calls().into_iter().map(|(_, i)| i).collect();
        assert_eq!(intervals, vec!["1m"]);

        // Inside the window neither kind goes out
        let report = scanner.tick(t0() + chrono::Duration::seconds(120)).await;
        assert_eq!(report.suppressed, 1);
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn forex_fetch_failure_keeps_symbol_evaluated() {
        let source = Arc::new(
            MockSource::default()
                .with("EURUSD=X", "1m", zigzag(251, 0.0, 0.0))
                .failing_interval("EURUSD=X", "15m"),
        );
        let notifier = Arc::new(MockNotifier::default());
        let strategy = StrategyFileConfig::default();
        let mut scanner = scanner(source, notifier, &["EURUSD=X"], &strategy);

        let report = scanner.tick(t0()).await;

        assert_eq!(report.evaluated, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(report.forex_failed, 1);
    }

    #[tokio::test]
    async fn state_returns_to_idle_after_tick() {
        let source = Arc::new(MockSource::default().failing("EURUSD=X"));
        let notifier = Arc::new(MockNotifier::default());
        let mut scanner = scanner(source, notifier, &["EURUSD=X"], &binary_only());

        assert_eq!(scanner.state(), ScannerState::Idle);
        scanner.tick(t0()).await;
        assert_eq!(scanner.state(), ScannerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn run_ticks_on_interval() {
        let source = Arc::new(MockSource::default());
        let notifier = Arc::new(MockNotifier::default());
        let scanner = scanner(source.clone(), notifier, &["EURUSD=X"], &binary_only());

        let handle = tokio::spawn(scanner.run());
        tokio::time::sleep(Duration::from_secs(125)).await;
        handle.abort();

        // Ticks at 0s, 60s and 120s
        assert_eq!(source.calls().len(), 3);
    }
}
