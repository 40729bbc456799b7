use crate::{models::Draft, ApiError, Id};
use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};

/// A timetable event (a theory class, a consultation, an open day).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timetable {
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Form state for creating or editing a timetable event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimetableDraft {
    pub title: String,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Draft for TimetableDraft {
    fn validate(&self) -> Result<(), ApiError> {
        if self.title.trim().is_empty() {
            return Err(ApiError::Validation(String::from(
                "Заполните название события",
            )));
        }
        if self.start >= self.end {
            return Err(ApiError::Validation(String::from(
                "Время окончания должно быть позже времени начала",
            )));
        }

        Ok(())
    }
}
