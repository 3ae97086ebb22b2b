use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode, header::AUTHORIZATION};
use serde::Deserialize;
use serde_json::Value;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use url::Url;

use crate::error::Error;
use crate::notifier::Notifier;

/// One submission as returned by the homework API. Fields the bot does not
/// use are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Homework {
    pub homework_name: Option<String>,
    pub status: Option<String>,
    pub current_date: Option<i64>,
}

impl Homework {
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the entry is not a homework record.
    pub fn from_value(value: &Value) -> Result<Homework, Error> {
        Ok(Homework::deserialize(value)?)
    }
}

/// Source of homework status answers.
#[async_trait]
pub trait HomeworkApi: Send + Sync {
    /// Fetches the raw answer for changes since `from_date` (unix seconds).
    async fn fetch(&self, from_date: i64) -> Result<Value, Error>;
}

/// Client for the Practicum homework statuses endpoint.
pub struct PracticumClient {
    client: Client,
    endpoint: Url,
    token: String,
}

impl PracticumClient {
    /// # Errors
    ///
    /// Fails if the endpoint is not a valid URL or the HTTP client cannot be built.
    pub fn new(endpoint: &str, token: impl Into<String>, timeout: Duration) -> Result<Self, Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(PracticumClient {
            client,
            endpoint: Url::parse(endpoint)?,
            token: token.into(),
        })
    }
}

#[async_trait]
impl HomeworkApi for PracticumClient {
    async fn fetch(&self, from_date: i64) -> Result<Value, Error> {
        debug!("Requesting homework statuses from {from_date}");

        let response = self
            .client
            .get(self.endpoint.clone())
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(Error::from_transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::UnexpectedStatus(status.as_u16()));
        }

        response.json::<Value>().await.map_err(|e| {
            debug!("Undecodable API body: {e}");
            Error::InvalidJson
        })
    }
}

/// Current time in unix seconds.
#[must_use]
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX)
        })
}

/// Asks the API for changes since `timestamp`, or since now when no timestamp
/// is known. Any failure is reported through `notifier` and yields `None`.
pub async fn get_api_answer(
    api: &dyn HomeworkApi,
    timestamp: Option<i64>,
    notifier: &mut Notifier,
) -> Option<Value> {
    let from_date = timestamp.filter(|ts| *ts != 0).unwrap_or_else(unix_now);

    match api.fetch(from_date).await {
        Ok(answer) => Some(answer),
        Err(e) => {
            notifier.report_error(&e.to_string()).await;
            None
        }
    }
}

/// Validates the API answer and extracts its homework list. A `null` value
/// counts as a missing key.
///
/// Returns `Ok(None)` after reporting a missing `homeworks` or `current_date`
/// key, or a `homeworks` value that is not a list. Entries are returned raw,
/// see [`Homework::from_value`].
///
/// # Errors
///
/// Returns [`Error::NotAMapping`] if the answer is absent or not a JSON object.
pub async fn check_response(
    response: Option<&Value>,
    notifier: &mut Notifier,
) -> Result<Option<Vec<Value>>, Error> {
    let Some(Value::Object(answer)) = response else {
        return Err(Error::NotAMapping);
    };
    let present = |key: &str| answer.get(key).filter(|value| !value.is_null());

    let Some(homeworks) = present("homeworks") else {
        notifier
            .report_error("В ответе от API нет ключа homeworks")
            .await;
        return Ok(None);
    };

    if present("current_date").is_none() {
        notifier
            .report_error("В ответе от API нет ключа current_date")
            .await;
        return Ok(None);
    }

    let Value::Array(homeworks) = homeworks else {
        notifier.report_error("homeworks_list не список").await;
        return Ok(None);
    };

    Ok(Some(homeworks.clone()))
}
