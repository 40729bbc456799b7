use crate::{
    models::{Draft, User},
    Id,
};
use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// An exam booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exam {
    pub id: Id,
    pub exam_type: ExamType,
    pub start: DateTime<Utc>,
    pub exam_status: ExamStatus,
    /// The examined student, present when the relation was expanded.
    #[serde(default)]
    pub users_permissions_user: Option<User>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExamType {
    #[serde(rename = "Тестирование")]
    Testing,
    #[serde(rename = "Автодром")]
    Autodrome,
    #[serde(rename = "Город")]
    City,
}

impl ExamType {
    pub fn as_str(self) -> &'static str {
        match self {
            ExamType::Testing => "Тестирование",
            ExamType::Autodrome => "Автодром",
            ExamType::City => "Город",
        }
    }
}

impl Display for ExamType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExamType {
    type Err = String;

    fn from_str(s: &str) -> Result<ExamType, Self::Err> {
        match s.trim() {
            "Тестирование" | "testing" => Ok(ExamType::Testing),
            "Автодром" | "autodrome" => Ok(ExamType::Autodrome),
            "Город" | "city" => Ok(ExamType::City),
            other => Err(format!("Неизвестный тип экзамена: {}", other)),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExamStatus {
    #[serde(rename = "В процессе")]
    InProgress,
    #[serde(rename = "Сдан")]
    Passed,
    #[serde(rename = "Не сдан")]
    Failed,
}

impl ExamStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ExamStatus::InProgress => "В процессе",
            ExamStatus::Passed => "Сдан",
            ExamStatus::Failed => "Не сдан",
        }
    }
}

impl Display for ExamStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExamStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<ExamStatus, Self::Err> {
        match s.trim() {
            "В процессе" | "in-progress" => Ok(ExamStatus::InProgress),
            "Сдан" | "passed" => Ok(ExamStatus::Passed),
            "Не сдан" | "failed" => Ok(ExamStatus::Failed),
            other => Err(format!("Неизвестный статус экзамена: {}", other)),
        }
    }
}

/// Form state for creating or editing an exam booking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExamDraft {
    pub exam_type: ExamType,
    pub start: DateTime<Utc>,
    pub exam_status: ExamStatus,
    pub users_permissions_user: Option<Id>,
}

impl Draft for ExamDraft {}
