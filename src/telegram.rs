use async_trait::async_trait;
use teloxide::{
    Bot,
    requests::Requester,
    types::{ChatId, Recipient},
};
use url::Url;

use crate::error::Error;

/// A message accepted by the chat service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub message_id: i64,
}

/// Delivers plain text to a chat destination.
#[async_trait]
pub trait ChatSender: Send + Sync {
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<SentMessage, Error>;
}

/// Telegram Bot API transport.
pub struct TelegramBot {
    bot: Bot,
}

impl TelegramBot {
    /// # Errors
    ///
    /// Fails if the API URL is invalid.
    pub fn new(api_url: &str, token: &str) -> Result<Self, Error> {
        let bot = Bot::new(token).set_api_url(Url::parse(api_url)?);
        Ok(TelegramBot { bot })
    }
}

/// Numeric ids address users and groups, anything else is a channel username.
fn recipient(chat_id: &str) -> Recipient {
    match chat_id.trim().parse::<i64>() {
        Ok(id) => Recipient::Id(ChatId(id)),
        Err(_) => Recipient::ChannelUsername(chat_id.trim().to_string()),
    }
}

#[async_trait]
impl ChatSender for TelegramBot {
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<SentMessage, Error> {
        let message = self.bot.send_message(recipient(chat_id), text).await?;
        Ok(SentMessage {
            message_id: i64::from(message.id.0),
        })
    }
}
