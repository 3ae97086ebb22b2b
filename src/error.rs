use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Logger initialization error: {0}")]
    Logger(#[from] log::SetLoggerError),
    #[error("Missing required environment variable: {0}")]
    MissingCredential(&'static str),
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Homework API transport failures, worded as they are reported to chat
    #[error("Error Connecting: {0}")]
    Connect(reqwest::Error),
    #[error("Timeout Error: {0}")]
    Timeout(reqwest::Error),
    #[error("Error: {0}")]
    HttpRequest(#[from] reqwest::Error),
    #[error("В ответ от API статус {0}")]
    UnexpectedStatus(u16),
    #[error("Ошибка преобразования в джейсон")]
    InvalidJson,

    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    // Contract violations, aborting the current poll cycle
    #[error("В ответ от API вернулся не словарь")]
    NotAMapping,
    #[error("В словаре homework нет поля homework_name")]
    MissingHomeworkName,
}

impl Error {
    /// Classifies a transport error from the homework API by its cause.
    #[must_use]
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout(err)
        } else if err.is_connect() {
            Error::Connect(err)
        } else {
            Error::HttpRequest(err)
        }
    }
}
