use crate::{
    models::{Draft, User},
    ApiError, Id,
};
use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// A practical driving lesson booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driving {
    pub id: Id,
    pub driving_type: DrivingType,
    pub start: DateTime<Utc>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    pub driving_status: DrivingStatus,
    /// The booked student, present when the relation was expanded.
    #[serde(default)]
    pub users_permissions_user: Option<User>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrivingType {
    #[serde(rename = "Симулятор")]
    Simulator,
    #[serde(rename = "Автодром")]
    Autodrome,
    #[serde(rename = "Город")]
    City,
}

impl DrivingType {
    pub fn as_str(self) -> &'static str {
        match self {
            DrivingType::Simulator => "Симулятор",
            DrivingType::Autodrome => "Автодром",
            DrivingType::City => "Город",
        }
    }
}

impl Display for DrivingType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DrivingType {
    type Err = String;

    fn from_str(s: &str) -> Result<DrivingType, Self::Err> {
        match s.trim() {
            "Симулятор" | "simulator" => Ok(DrivingType::Simulator),
            "Автодром" | "autodrome" => Ok(DrivingType::Autodrome),
            "Город" | "city" => Ok(DrivingType::City),
            other => Err(format!("Неизвестный тип вождения: {}", other)),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrivingStatus {
    #[serde(rename = "В процессе")]
    InProgress,
    #[serde(rename = "Пройдено")]
    Passed,
    #[serde(rename = "Не пройдено")]
    Failed,
}

impl DrivingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DrivingStatus::InProgress => "В процессе",
            DrivingStatus::Passed => "Пройдено",
            DrivingStatus::Failed => "Не пройдено",
        }
    }
}

impl Display for DrivingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DrivingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<DrivingStatus, Self::Err> {
        match s.trim() {
            "В процессе" | "in-progress" => Ok(DrivingStatus::InProgress),
            "Пройдено" | "passed" => Ok(DrivingStatus::Passed),
            "Не пройдено" | "failed" => Ok(DrivingStatus::Failed),
            other => Err(format!("Неизвестный статус вождения: {}", other)),
        }
    }
}

/// Form state for creating or editing a lesson booking.
///
/// `end` and the student relation are nullable on the wire, so they are
/// serialized as explicit `null`s when absent, matching what the backend
/// expects from the edit dialog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrivingDraft {
    pub driving_type: DrivingType,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub driving_status: DrivingStatus,
    pub users_permissions_user: Option<Id>,
}

impl Draft for DrivingDraft {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(end) = self.end {
            if end <= self.start {
                return Err(ApiError::Validation(String::from(
                    "Время окончания должно быть позже времени начала",
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_an_expanded_record() {
        let driving: Driving = serde_json::from_str(
            r#"{
                "id": 7,
                "driving_type": "Город",
                "start": "2024-05-10T09:00:00.000Z",
                "end": null,
                "driving_status": "В процессе",
                "users_permissions_user": {
                    "id": 3,
                    "username": "ivanov",
                    "email": "i@avtoshkola.ru"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(driving.driving_type, DrivingType::City);
        assert_eq!(driving.end, None);
        assert_eq!(
            driving.users_permissions_user.map(|user| user.id),
            Some(Id::from(3))
        );
    }

    #[test]
    fn draft_serializes_nullable_fields_as_null() {
        let draft = DrivingDraft {
            driving_type: DrivingType::Simulator,
            start: Utc.with_ymd_and_hms(2024, 5, 10, 9, 0, 0).unwrap(),
            end: None,
            driving_status: DrivingStatus::InProgress,
            users_permissions_user: None,
        };

        let value = serde_json::to_value(&draft).unwrap();

        assert_eq!(value["end"], serde_json::Value::Null);
        assert_eq!(value["users_permissions_user"], serde_json::Value::Null);
    }

    #[test]
    fn an_end_before_the_start_is_rejected() {
        let start = Utc.with_ymd_and_hms(2024, 5, 10, 9, 0, 0).unwrap();
        let draft = DrivingDraft {
            driving_type: DrivingType::Autodrome,
            start,
            end: Some(start - chrono::Duration::hours(1)),
            driving_status: DrivingStatus::InProgress,
            users_permissions_user: Some(Id::from(3)),
        };

        assert!(matches!(draft.validate(), Err(ApiError::Validation(_))));
    }
}
