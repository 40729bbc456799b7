//! One generic implementation of the backend's collection endpoints.
//!
//! The four resources share the same list/create/update/delete shape; a
//! [`Collection`] describes how a particular one deviates: its path, the
//! relation to expand when listing, and whether the backend wraps payloads
//! in a `data` envelope (content types do, accounts do not).

use crate::{
    client::ApiClient,
    models::{
        Draft, Driving, DrivingDraft, Exam, ExamDraft, RegisterDraft, Timetable,
        TimetableDraft, User, UserUpdate,
    },
    ApiError, Id,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

/// A backend collection and its wire conventions.
pub trait Collection {
    /// Collection path under the API base, e.g. `/drivings`.
    const PATH: &'static str;
    /// Relation to expand when listing.
    const POPULATE: Option<&'static str> = None;
    /// Content types wrap list responses and mutation bodies in `data`.
    const DATA_ENVELOPE: bool;
    /// Where create requests go; accounts register through the auth API.
    const CREATE_PATH: &'static str = Self::PATH;

    type Record: DeserializeOwned;
    type Create: Draft;
    type Update: Draft;
}

/// Fetch every record in the collection, relation expanded where the
/// collection asks for it.
pub async fn list<C: Collection>(client: &ApiClient) -> Result<Vec<C::Record>, ApiError> {
    let path = match C::POPULATE {
        Some(relation) => format!("{}?populate={}", C::PATH, relation),
        None => C::PATH.to_string(),
    };

    let body = client.get(&path).await?;
    let records = if C::DATA_ENVELOPE {
        body.get("data").cloned().unwrap_or_else(|| json!([]))
    } else {
        body
    };

    serde_json::from_value(records)
        .map_err(|err| ApiError::UnexpectedResponse(format!("Неверный ответ сервера: {}", err)))
}

/// Create a record. The draft's client-side validation runs first; a
/// rejected draft never reaches the network.
pub async fn create<C: Collection>(
    client: &ApiClient,
    draft: &C::Create,
) -> Result<Value, ApiError> {
    draft.validate()?;
    client.post(C::CREATE_PATH, &envelope::<C, _>(draft)?).await
}

/// Update a record in place.
pub async fn update<C: Collection>(
    client: &ApiClient,
    id: Id,
    draft: &C::Update,
) -> Result<Value, ApiError> {
    draft.validate()?;
    client
        .put(&format!("{}/{}", C::PATH, id), &envelope::<C, _>(draft)?)
        .await
}

/// Delete a record. Callers refetch the list afterwards; nothing here
/// patches local state.
pub async fn delete<C: Collection>(client: &ApiClient, id: Id) -> Result<(), ApiError> {
    client
        .delete(&format!("{}/{}", C::PATH, id))
        .await
        .map(drop)
}

fn envelope<C: Collection, D: Draft>(draft: &D) -> Result<Value, ApiError> {
    let value = serde_json::to_value(draft)
        .map_err(|err| ApiError::UnexpectedResponse(format!("Неверный запрос: {}", err)))?;

    if C::DATA_ENVELOPE {
        Ok(json!({ "data": value }))
    } else {
        Ok(value)
    }
}

/// The `/users` collection: bare arrays, creation through the auth API.
#[derive(Debug)]
pub struct Users;

impl Collection for Users {
    const PATH: &'static str = "/users";
    const DATA_ENVELOPE: bool = false;
    const CREATE_PATH: &'static str = "/auth/local/register";

    type Record = User;
    type Create = RegisterDraft;
    type Update = UserUpdate;
}

/// The `/drivings` content type, listed with its student expanded.
#[derive(Debug)]
pub struct Drivings;

impl Collection for Drivings {
    const PATH: &'static str = "/drivings";
    const POPULATE: Option<&'static str> = Some("users_permissions_user");
    const DATA_ENVELOPE: bool = true;

    type Record = Driving;
    type Create = DrivingDraft;
    type Update = DrivingDraft;
}

/// The `/exams` content type, listed with its student expanded.
#[derive(Debug)]
pub struct Exams;

impl Collection for Exams {
    const PATH: &'static str = "/exams";
    const POPULATE: Option<&'static str> = Some("users_permissions_user");
    const DATA_ENVELOPE: bool = true;

    type Record = Exam;
    type Create = ExamDraft;
    type Update = ExamDraft;
}

/// The `/timetables` content type.
#[derive(Debug)]
pub struct Timetables;

impl Collection for Timetables {
    const PATH: &'static str = "/timetables";
    const DATA_ENVELOPE: bool = true;

    type Record = Timetable;
    type Create = TimetableDraft;
    type Update = TimetableDraft;
}
