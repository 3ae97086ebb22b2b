use log::{debug, error, info};
use std::collections::HashSet;

use crate::telegram::{ChatSender, SentMessage};

/// Delivers messages to one chat and remembers which error texts it already
/// reported during this process lifetime.
pub struct Notifier {
    sender: Box<dyn ChatSender>,
    chat_id: String,
    sent_errors: HashSet<String>,
}

impl Notifier {
    pub fn new(sender: Box<dyn ChatSender>, chat_id: impl Into<String>) -> Self {
        Notifier {
            sender,
            chat_id: chat_id.into(),
            sent_errors: HashSet::new(),
        }
    }

    /// Sends `message` to the chat. A failed delivery is reported as an error
    /// instead of being returned.
    pub async fn send(&mut self, message: &str) -> Option<SentMessage> {
        debug!("Sending message: {message}");

        match self.sender.send_message(&self.chat_id, message).await {
            Ok(sent) => {
                info!("Отправлено сообщение: {message}");
                Some(sent)
            }
            Err(e) => {
                debug!("Delivery failed: {e}");
                self.report_error(&format!("НЕ Отправлено сообщение: {message}"))
                    .await;
                None
            }
        }
    }

    /// Logs `message` as an error and relays it to the chat unless the same
    /// text was already delivered.
    pub async fn report_error(&mut self, message: &str) {
        error!("{message}");

        if self.was_reported(message) {
            debug!("Error already reported to chat, skipping");
            return;
        }

        // Failures here are only logged, reporting them would recurse
        match self.sender.send_message(&self.chat_id, message).await {
            Ok(_) => {
                info!("Отправлено сообщение: {message}");
                self.sent_errors.insert(message.to_string());
            }
            Err(e) => error!("Failed to report error to chat: {e}"),
        }
    }

    fn was_reported(&self, message: &str) -> bool {
        self.sent_errors.contains(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeChat;

    #[tokio::test]
    async fn test_send_delivers_to_configured_chat() {
        let chat = FakeChat::default();
        let mut notifier = Notifier::new(Box::new(chat.clone()), "42");

        let sent = notifier.send("hello").await;

        assert!(sent.is_some());
        let deliveries = chat.sent.lock().unwrap().clone();
        assert_eq!(deliveries, vec![("42".to_string(), "hello".to_string())]);
    }

    #[tokio::test]
    async fn test_same_error_is_delivered_once() {
        let chat = FakeChat::default();
        let mut notifier = Notifier::new(Box::new(chat.clone()), "42");

        notifier.report_error("Error Connecting: refused").await;
        notifier.report_error("Error Connecting: refused").await;

        assert_eq!(chat.texts(), vec!["Error Connecting: refused".to_string()]);
        assert_eq!(chat.attempts(), 1);
        assert!(notifier.was_reported("Error Connecting: refused"));
    }

    #[tokio::test]
    async fn test_distinct_errors_are_each_delivered() {
        let chat = FakeChat::default();
        let mut notifier = Notifier::new(Box::new(chat.clone()), "42");

        notifier.report_error("first").await;
        notifier.report_error("second").await;

        assert_eq!(chat.texts(), vec!["first".to_string(), "second".to_string()]);
    }

    #[tokio::test]
    async fn test_undelivered_error_is_not_remembered() {
        let chat = FakeChat::failing();
        let mut notifier = Notifier::new(Box::new(chat.clone()), "42");

        notifier.report_error("boom").await;
        assert!(!notifier.was_reported("boom"));

        // Once the chat recovers the same error goes through
        *chat.failing.lock().unwrap() = false;
        notifier.report_error("boom").await;
        assert_eq!(chat.texts(), vec!["boom".to_string()]);
        assert!(notifier.was_reported("boom"));
    }

    #[tokio::test]
    async fn test_failed_send_reports_without_recursing() {
        let chat = FakeChat::failing();
        let mut notifier = Notifier::new(Box::new(chat.clone()), "42");

        let sent = notifier.send("status update").await;

        assert!(sent.is_none());
        // The message itself, then one attempt to report the failure
        assert_eq!(chat.attempts(), 2);
        assert!(!notifier.was_reported("НЕ Отправлено сообщение: status update"));
    }
}
