use crate::{models::Draft, ApiError, Id};
use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// A driving-school account as the backend returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Id,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// The backend spells this field without the double `d`.
    #[serde(default)]
    pub adress: Option<String>,
    #[serde(default)]
    pub study_status: Option<StudyStatus>,
    #[serde(default)]
    pub blocked: Option<bool>,
    #[serde(default)]
    pub confirmed: Option<bool>,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// The name a table row shows: "Имя Фамилия" when both are filled in,
    /// the username otherwise.
    pub fn display_name(&self) -> String {
        match (self.name.as_deref(), self.surname.as_deref()) {
            (Some(name), Some(surname)) if !name.is_empty() && !surname.is_empty() => {
                format!("{} {}", name, surname)
            }
            _ => self.username.clone(),
        }
    }
}

/// Where a student stands in the course.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StudyStatus {
    #[serde(rename = "Не начато")]
    NotStarted,
    #[serde(rename = "В процессе")]
    InProgress,
    #[serde(rename = "Завершено")]
    Completed,
    #[serde(rename = "Приостановлено")]
    Suspended,
}

impl StudyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            StudyStatus::NotStarted => "Не начато",
            StudyStatus::InProgress => "В процессе",
            StudyStatus::Completed => "Завершено",
            StudyStatus::Suspended => "Приостановлено",
        }
    }
}

impl Display for StudyStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StudyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<StudyStatus, Self::Err> {
        match s.trim() {
            "Не начато" | "not-started" => Ok(StudyStatus::NotStarted),
            "В процессе" | "in-progress" => Ok(StudyStatus::InProgress),
            "Завершено" | "completed" => Ok(StudyStatus::Completed),
            "Приостановлено" | "suspended" => Ok(StudyStatus::Suspended),
            other => Err(format!("Неизвестный статус обучения: {}", other)),
        }
    }
}

/// Form state for registering a new account.
///
/// Goes through the auth API rather than the collection itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegisterDraft {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adress: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub study_status: Option<StudyStatus>,
    pub blocked: bool,
}

impl Draft for RegisterDraft {
    fn validate(&self) -> Result<(), ApiError> {
        if self.username.trim().is_empty() {
            return Err(ApiError::Validation(String::from("Введите имя пользователя")));
        }
        if !self.email.contains('@') {
            return Err(ApiError::Validation(String::from("Введите корректный email")));
        }
        if self.password.is_empty() {
            return Err(ApiError::Validation(String::from("Введите пароль")));
        }

        Ok(())
    }
}

/// A partial update to an existing account; only the filled-in fields are
/// sent, so a lone `blocked` toggle does not clobber the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adress: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub study_status: Option<StudyStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked: Option<bool>,
}

impl UserUpdate {
    /// The update the block/unblock button sends.
    pub fn blocked(blocked: bool) -> UserUpdate {
        UserUpdate {
            blocked: Some(blocked),
            ..UserUpdate::default()
        }
    }
}

impl Draft for UserUpdate {}
