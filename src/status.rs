use crate::api::Homework;
use crate::error::Error;
use crate::notifier::Notifier;

/// Rendered in place of a verdict when the API sends a status we do not know.
pub const UNKNOWN_VERDICT: &str = "Статус работы неизвестен.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl HomeworkStatus {
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "approved" => Some(HomeworkStatus::Approved),
            "reviewing" => Some(HomeworkStatus::Reviewing),
            "rejected" => Some(HomeworkStatus::Rejected),
            _ => None,
        }
    }

    #[must_use]
    pub fn verdict(self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            HomeworkStatus::Reviewing => "Работа взята на проверку ревьюером.",
            HomeworkStatus::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

/// Turns a homework record into the chat notification text.
///
/// An unknown status is reported through `notifier` and rendered as
/// [`UNKNOWN_VERDICT`].
///
/// # Errors
///
/// Returns [`Error::MissingHomeworkName`] if the record has no name.
pub async fn parse_status(homework: &Homework, notifier: &mut Notifier) -> Result<String, Error> {
    let name = homework
        .homework_name
        .as_deref()
        .ok_or(Error::MissingHomeworkName)?;

    let status = homework.status.as_deref();
    let verdict = match status.and_then(HomeworkStatus::from_code) {
        Some(known) => known.verdict(),
        None => {
            notifier
                .report_error(&format!(
                    "В ответе от API статус {}",
                    status.unwrap_or("<отсутствует>")
                ))
                .await;
            UNKNOWN_VERDICT
        }
    };

    Ok(format!("Изменился статус проверки работы \"{name}\". {verdict}"))
}
