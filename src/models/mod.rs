//! DTOs for the backend's collections.
//!
//! The records are defined entirely by the external backend; beyond what a
//! table row or an edit form needs, nothing here validates or enforces
//! invariants on their fields. Drafts are the client-side counterpart of the
//! edit dialogs: they carry form state and the checks that run before a
//! request is dispatched.

mod driving;
mod exam;
mod timetable;
mod user;

pub use driving::{Driving, DrivingDraft, DrivingStatus, DrivingType};
pub use exam::{Exam, ExamDraft, ExamStatus, ExamType};
pub use timetable::{Timetable, TimetableDraft};
pub use user::{RegisterDraft, StudyStatus, User, UserUpdate};

use crate::ApiError;
use serde::Serialize;

/// Client-side checks applied to a draft before it is dispatched.
///
/// A failed validation never reaches the network.
pub trait Draft: Serialize {
    fn validate(&self) -> Result<(), ApiError> {
        Ok(())
    }
}
