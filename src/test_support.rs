//! Helpers shared by the unit tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use teloxide::{ApiError, RequestError};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    sync::oneshot,
};

use crate::error::Error;
use crate::telegram::{ChatSender, SentMessage};

/// Serves exactly one HTTP response on a random local port.
///
/// Returns the base URL and a receiver yielding the raw request text.
pub async fn serve_once(status: &str, body: &str) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("Failed to accept");
        let request = read_request(&mut stream).await;
        stream
            .write_all(response.as_bytes())
            .await
            .expect("Failed to write response");
        stream.shutdown().await.ok();
        let _ = tx.send(request);
    });

    (format!("http://{addr}"), rx)
}

async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = stream.read(&mut chunk).await.expect("Failed to read request");
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

/// Records every delivery; fails all of them while `failing` is set.
#[derive(Clone, Default)]
pub struct FakeChat {
    pub sent: Arc<Mutex<Vec<(String, String)>>>,
    pub attempts: Arc<Mutex<usize>>,
    pub failing: Arc<Mutex<bool>>,
}

impl FakeChat {
    pub fn failing() -> Self {
        let chat = FakeChat::default();
        *chat.failing.lock().unwrap() = true;
        chat
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl ChatSender for FakeChat {
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<SentMessage, Error> {
        *self.attempts.lock().unwrap() += 1;
        if *self.failing.lock().unwrap() {
            return Err(Error::Telegram(RequestError::Api(ApiError::BotBlocked)));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((chat_id.to_string(), text.to_string()));
        let message_id = i64::try_from(sent.len()).unwrap();
        Ok(SentMessage { message_id })
    }
}
