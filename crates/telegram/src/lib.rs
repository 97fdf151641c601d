use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::Recipient;
use tracing::{debug, warn};

use common::{Error, Notifier, Result};

/// Sends alerts to a single Telegram chat through the Bot API.
pub struct TelegramNotifier {
    bot: Bot,
    chat: Recipient,
}

impl TelegramNotifier {
    /// `chat_id` is either a numeric chat id ("-1001234567890") or a
    /// channel username ("@fx_alerts").
    pub fn new(token: impl Into<String>, chat_id: &str) -> Result<Self> {
        Self::with_bot(Bot::new(token), chat_id)
    }

    /// Use a pre-built bot (custom API URL or HTTP client).
    pub fn with_bot(bot: Bot, chat_id: &str) -> Result<Self> {
        Ok(Self {
            bot,
            chat: parse_recipient(chat_id)?,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        match self.bot.send_message(self.chat.clone(), text).await {
            Ok(msg) => {
                debug!(message_id = msg.id.0, "Telegram message delivered");
                Ok(())
            }
            Err(e) => {
                warn!(chat = ?self.chat, error = %e, "Failed to send Telegram message");
                Err(Error::Notify(e.to_string()))
            }
        }
    }
}

/// Parse the configured chat into a Bot API recipient.
pub fn parse_recipient(chat_id: &str) -> Result<Recipient> {
    let chat_id = chat_id.trim();
    if let Ok(id) = chat_id.parse::<i64>() {
        return Ok(Recipient::Id(ChatId(id)));
    }
    match chat_id.strip_prefix('@') {
        Some(name) if !name.is_empty() => Ok(Recipient::ChannelUsername(chat_id.to_string())),
        _ => Err(Error::Config(format!(
            "CHAT_ID must be a numeric id or an @channel name, got: '{chat_id}'"
        ))),
    }
}
