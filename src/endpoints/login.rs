use crate::{client::ApiClient, session::SessionUser, ApiError};
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;

/// Authenticate against the backend and receive a fresh credential.
///
/// The credential is not installed here; the auth gate decides what to do
/// with it. Known rejection messages come back already translated.
pub async fn login(
    client: &ApiClient,
    identifier: &str,
    password: &str,
) -> Result<AuthResponse, ApiError> {
    let data = Credentials {
        identifier: identifier.trim(),
        password,
    };

    let body = client
        .post("/auth/local", &data)
        .await
        .map_err(super::translate_known)?;

    parse_auth_response(body)
}

/// What a successful `POST /auth/local` (or register) returns.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthResponse {
    pub jwt: String,
    pub user: SessionUser,
}

#[derive(Debug, Copy, Clone, Serialize)]
struct Credentials<'a> {
    identifier: &'a str,
    password: &'a str,
}

/// A 200 with a missing token or user record is still a failure.
pub(super) fn parse_auth_response(body: Value) -> Result<AuthResponse, ApiError> {
    if body.get("jwt").and_then(Value::as_str).is_none() {
        return Err(ApiError::UnexpectedResponse(String::from(
            "Сервер не вернул токен аутентификации",
        )));
    }
    if body.get("user").map_or(true, Value::is_null) {
        return Err(ApiError::UnexpectedResponse(String::from(
            "Сервер не вернул данные пользователя",
        )));
    }

    serde_json::from_value(body)
        .map_err(|err| ApiError::UnexpectedResponse(format!("Неверный ответ сервера: {}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Id;
    use serde_json::json;

    #[test]
    fn parse_a_happy_auth_response() {
        let body = json!({
            "jwt": "abc.def.ghi",
            "user": { "id": 1, "username": "admin" }
        });

        let response = parse_auth_response(body).unwrap();

        assert_eq!(response.jwt, "abc.def.ghi");
        assert_eq!(response.user.id, Id::from(1));
        assert_eq!(response.user.username, "admin");
    }

    #[test]
    fn a_missing_token_is_an_error() {
        let body = json!({ "user": { "id": 1, "username": "admin" } });

        let err = parse_auth_response(body).unwrap_err();

        assert_eq!(err.to_string(), "Сервер не вернул токен аутентификации");
    }

    #[test]
    fn a_missing_user_is_an_error() {
        let body = json!({ "jwt": "abc.def.ghi", "user": null });

        let err = parse_auth_response(body).unwrap_err();

        assert_eq!(err.to_string(), "Сервер не вернул данные пользователя");
    }
}
