//! The generic collection operations, exercised against a canned backend.

mod common;

use avtoshkola::{
    endpoints::{self, Drivings, Timetables, Users},
    models::{DrivingDraft, DrivingStatus, DrivingType, RegisterDraft, TimetableDraft},
    ApiError, Id,
};
use chrono::{TimeZone, Utc};
use common::{client_for, Canned, FakeBackend};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn a_rejected_draft_never_reaches_the_network() {
    let backend = FakeBackend::start(Vec::new()).await;
    let dir = temp_dir::TempDir::new().unwrap();
    let client = client_for(&backend, dir.path());

    let start = Utc.with_ymd_and_hms(2024, 9, 1, 18, 0, 0).unwrap();
    let draft = TimetableDraft {
        title: String::from("Лекция по ПДД"),
        description: None,
        start,
        end: start, // ends exactly when it starts
    };

    let err = endpoints::create::<Timetables>(&client, &draft)
        .await
        .unwrap_err();

    match err {
        ApiError::Validation(message) => {
            assert_eq!(message, "Время окончания должно быть позже времени начала");
        }
        other => panic!("expected a validation error, got {:?}", other),
    }
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn deleting_then_refetching_drops_the_record() {
    let backend = FakeBackend::start(vec![
        Canned::json(200, r#"{"data": {"id": 1}}"#),
        Canned::json(
            200,
            r#"{"data": [
                {
                    "id": 2,
                    "title": "Лекция по ПДД",
                    "start": "2024-09-01T18:00:00.000Z",
                    "end": "2024-09-01T19:00:00.000Z"
                }
            ]}"#,
        ),
    ])
    .await;
    let dir = temp_dir::TempDir::new().unwrap();
    let client = client_for(&backend, dir.path());

    endpoints::delete::<Timetables>(&client, Id::from(1))
        .await
        .unwrap();
    let remaining = endpoints::list::<Timetables>(&client).await.unwrap();

    assert!(remaining.iter().all(|event| event.id != Id::from(1)));
    let requests = backend.requests();
    assert_eq!(requests[0].method, "DELETE");
    assert_eq!(requests[0].path, "/api/timetables/1");
    assert_eq!(requests[1].method, "GET");
}

#[tokio::test]
async fn content_type_lists_unwrap_the_data_envelope_and_expand_the_relation() {
    let backend = FakeBackend::start(vec![Canned::json(
        200,
        r#"{"data": [
            {
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
            }
        ], "meta": {"pagination": {"total": 1}}}"#,
    )])
    .await;
    let dir = temp_dir::TempDir::new().unwrap();
    let client = client_for(&backend, dir.path());

    let drivings = endpoints::list::<Drivings>(&client).await.unwrap();

    assert_eq!(drivings.len(), 1);
    assert_eq!(drivings[0].driving_type, DrivingType::City);
    assert_eq!(
        backend.requests()[0].path,
        "/api/drivings?populate=users_permissions_user"
    );
}

#[tokio::test]
async fn the_users_list_is_a_bare_array() {
    let backend = FakeBackend::start(vec![Canned::json(
        200,
        r#"[{"id": 3, "username": "ivanov", "email": "i@avtoshkola.ru"}]"#,
    )])
    .await;
    let dir = temp_dir::TempDir::new().unwrap();
    let client = client_for(&backend, dir.path());

    let users = endpoints::list::<Users>(&client).await.unwrap();

    assert_eq!(users.len(), 1);
    assert_eq!(users[0].username, "ivanov");
    assert_eq!(backend.requests()[0].path, "/api/users");
}

#[tokio::test]
async fn content_type_mutations_are_wrapped_in_data() {
    let backend =
        FakeBackend::start(vec![Canned::json(200, r#"{"data": {"id": 9}}"#)]).await;
    let dir = temp_dir::TempDir::new().unwrap();
    let client = client_for(&backend, dir.path());

    let draft = DrivingDraft {
        driving_type: DrivingType::Simulator,
        start: Utc.with_ymd_and_hms(2024, 5, 10, 9, 0, 0).unwrap(),
        end: None,
        driving_status: DrivingStatus::InProgress,
        users_permissions_user: None,
    };
    endpoints::create::<Drivings>(&client, &draft).await.unwrap();

    let body = backend.requests()[0].json_body();
    assert_eq!(body["data"]["driving_type"], "Симулятор");
    // nullable fields go out as explicit nulls, the way the edit dialog does
    assert!(body["data"]["end"].is_null());
    assert!(body["data"]["users_permissions_user"].is_null());
}

#[tokio::test]
async fn accounts_register_through_the_auth_api_unwrapped() {
    let backend = FakeBackend::start(vec![Canned::json(
        200,
        r#"{"jwt": "fresh", "user": {"id": 4, "username": "petrov"}}"#,
    )])
    .await;
    let dir = temp_dir::TempDir::new().unwrap();
    let client = client_for(&backend, dir.path());

    let draft = RegisterDraft {
        username: String::from("petrov"),
        email: String::from("p@avtoshkola.ru"),
        password: String::from("123123"),
        ..RegisterDraft::default()
    };
    endpoints::create::<Users>(&client, &draft).await.unwrap();

    let request = &backend.requests()[0];
    assert_eq!(request.path, "/api/auth/local/register");
    let body = request.json_body();
    assert_eq!(body["username"], "petrov");
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn server_side_validation_errors_pass_through_verbatim() {
    let backend = FakeBackend::start(vec![Canned::json(
        400,
        r#"{"error": {"status": 400, "name": "ValidationError", "message": "start must be a valid date"}}"#,
    )])
    .await;
    let dir = temp_dir::TempDir::new().unwrap();
    let client = client_for(&backend, dir.path());

    let start = Utc.with_ymd_and_hms(2024, 9, 1, 18, 0, 0).unwrap();
    let draft = TimetableDraft {
        title: String::from("Лекция"),
        description: None,
        start,
        end: start + chrono::Duration::hours(1),
    };
    let err = endpoints::create::<Timetables>(&client, &draft)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "start must be a valid date");
}

#[tokio::test]
async fn an_unparseable_error_body_falls_back_to_the_status() {
    let backend = FakeBackend::start(vec![Canned {
        status: 500,
        body: String::from("<html>Internal Server Error</html>"),
    }])
    .await;
    let dir = temp_dir::TempDir::new().unwrap();
    let client = client_for(&backend, dir.path());

    let err = endpoints::list::<Timetables>(&client).await.unwrap_err();

    assert_eq!(err.to_string(), "HTTP 500");
}
