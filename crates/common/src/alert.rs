use chrono::{DateTime, Utc};

use crate::{ForexSetup, Signal};

/// A notification produced by one scan of one symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    Binary {
        symbol: String,
        signal: Signal,
        timeframe: String,
        at: DateTime<Utc>,
    },
    Forex {
        symbol: String,
        setup: ForexSetup,
        at: DateTime<Utc>,
    },
}

impl Alert {
    pub fn symbol(&self) -> &str {
        match self {
            Alert::Binary { symbol, .. } | Alert::Forex { symbol, .. } => symbol,
        }
    }

    /// Chat text for this alert.
    pub fn message(&self) -> String {
        match self {
            Alert::Binary { symbol, signal, timeframe, at } => format!(
                "📈 BINARY SIGNAL\n\
                 Pair: {}\n\
                 Direction: {signal}\n\
                 TF: {timeframe}\n\
                 Time: {}",
                display_pair(symbol),
                at.format("%H:%M:%S"),
            ),
            Alert::Forex { symbol, setup, at } => format!(
                "📊 FOREX SIGNAL\n\
                 Pair: {}\n\
                 Type: {}\n\
                 Entry: {:.5}\n\
                 SL: {:.5}\n\
                 TP: {:.5}\n\
                 RR: 1:{}\n\
                 Time: {}",
                display_pair(symbol),
                setup.side,
                setup.entry,
                setup.stop_loss,
                setup.take_profit,
                format_ratio(setup.reward_risk()),
                at.format("%H:%M"),
            ),
        }
    }
}

/// Banner sent once when the bot comes up.
pub fn startup_message(at: DateTime<Utc>) -> String {
    format!(
        "🚀 Binary + Forex Bot Started\n{}",
        at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

/// Provider ticker without the currency suffix: "EURUSD=X" → "EURUSD".
pub fn display_pair(symbol: &str) -> &str {
    symbol.strip_suffix("=X").unwrap_or(symbol)
}

fn format_ratio(ratio: f64) -> String {
    if (ratio - ratio.round()).abs() < 1e-6 {
        format!("{}", ratio.round())
    } else {
        format!("{ratio:.1}")
    }
}
