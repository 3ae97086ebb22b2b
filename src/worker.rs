use log::{debug, error, info};
use std::time::Duration;
use tokio::{select, time::sleep};
use tokio_util::sync::CancellationToken;

use crate::api::{
    Homework, HomeworkApi, PracticumClient, check_response, get_api_answer, unix_now,
};
use crate::config::Config;
use crate::error::Error;
use crate::notifier::Notifier;
use crate::status::parse_status;
use crate::telegram::TelegramBot;

/// Outcome of a single poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cycle {
    Continue,
    /// The homework list could not be extracted; polling stops for good.
    Stop,
}

/// Polls the homework API and notifies the chat about status changes.
pub struct Worker {
    api: Box<dyn HomeworkApi>,
    notifier: Notifier,
    timestamp: Option<i64>,
    retry_interval: Duration,
}

impl Worker {
    /// Creates a worker that reports changes from now on.
    pub fn new(api: Box<dyn HomeworkApi>, notifier: Notifier, retry_interval: Duration) -> Self {
        Worker {
            api,
            notifier,
            timestamp: Some(unix_now()),
            retry_interval,
        }
    }

    /// Builds the production worker from configuration.
    ///
    /// # Errors
    ///
    /// Fails if either HTTP client cannot be constructed.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let settings = &config.settings;
        let credentials = &config.credentials;

        let api = PracticumClient::new(
            &settings.endpoint,
            credentials.practicum_token.clone(),
            settings.timeout(),
        )?;
        let bot = TelegramBot::new(&settings.telegram_api_url, &credentials.telegram_token)?;
        let notifier = Notifier::new(Box::new(bot), credentials.telegram_chat_id.clone());

        Ok(Worker::new(
            Box::new(api),
            notifier,
            settings.retry_interval(),
        ))
    }

    /// Fetches, validates and announces the newest homework status change.
    ///
    /// # Errors
    ///
    /// Returns contract violations of the API answer, which abort the cycle.
    pub async fn poll_once(&mut self) -> Result<Cycle, Error> {
        let answer = get_api_answer(self.api.as_ref(), self.timestamp, &mut self.notifier).await;

        let Some(homeworks) = check_response(answer.as_ref(), &mut self.notifier).await? else {
            return Ok(Cycle::Stop);
        };

        match homeworks.first() {
            Some(entry) => {
                let homework = Homework::from_value(entry)?;
                self.timestamp = homework.current_date;
                let message = parse_status(&homework, &mut self.notifier).await?;
                self.notifier.send(&message).await;
            }
            None => debug!("No homework status changes"),
        }

        Ok(Cycle::Continue)
    }

    /// Runs poll cycles until the homework list cannot be extracted or
    /// shutdown is requested.
    pub async fn run(&mut self, token: CancellationToken) {
        info!("Starting homework monitoring...");
        info!(
            "Check interval: {} seconds",
            self.retry_interval.as_secs()
        );

        loop {
            // Check if we should shutdown before starting new cycle
            if token.is_cancelled() {
                info!("Shutdown requested, stopping monitor");
                break;
            }

            match self.poll_once().await {
                Ok(Cycle::Continue) => {}
                Ok(Cycle::Stop) => {
                    error!("Homework list could not be extracted, stopping monitor");
                    break;
                }
                Err(e) => {
                    self.notifier
                        .report_error(&format!("Сбой в работе программы: {e}"))
                        .await;
                }
            }

            // Interruptible sleep
            select! {
                () = sleep(self.retry_interval) => {},
                () = token.cancelled() => {
                    info!("Shutdown requested during sleep");
                    break;
                }
            }
        }

        info!("Homework monitoring stopped");
    }
}

/// Builds the worker from `config` and polls until it stops.
///
/// # Errors
///
/// Fails if the HTTP clients cannot be constructed.
pub async fn monitor_homework(config: &Config, token: CancellationToken) -> Result<(), Error> {
    let mut worker = Worker::from_config(config)?;
    worker.run(token).await;
    Ok(())
}

/// Loads configuration through `lookup` and polls until the worker stops.
/// Missing credentials are logged and end the run before the first request.
///
/// # Errors
///
/// Returns configuration errors, including [`Error::MissingCredential`], and
/// HTTP client construction failures.
pub async fn start<F>(lookup: F, token: CancellationToken) -> Result<(), Error>
where
    F: Fn(&str) -> Option<String>,
{
    let config = match Config::load_from(lookup) {
        Ok(config) => config,
        Err(e @ Error::MissingCredential(_)) => {
            error!("Не доступны переменные окружения! {e}");
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    monitor_homework(&config, token).await
}
