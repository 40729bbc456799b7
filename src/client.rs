use crate::{config::Config, session::Session, DEFAULT_USER_AGENT};
use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// The single point of HTTP dispatch for the whole application.
///
/// Attaches the bearer credential when one is held, normalizes the backend's
/// assorted error payloads into [`ApiError`], and reacts to an
/// authorization-denied response by tearing the session down.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    config: Config,
    session: Arc<Session>,
}

impl ApiClient {
    pub fn new(config: Config, session: Arc<Session>) -> Result<ApiClient, ApiError> {
        let http = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .timeout(config.timeout)
            .build()?;

        Ok(ApiClient {
            http,
            config,
            session,
        })
    }

    pub fn config(&self) -> &Config { &self.config }

    pub fn session(&self) -> &Arc<Session> { &self.session }

    /// Install or drop the credential, persisting the change.
    ///
    /// This is the only writer of the process-wide credential; the auth
    /// gate's transitions call it, nothing else may.
    pub fn set_credential(&self, token: Option<String>) {
        self.session.set_credential(token);
    }

    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        self.request(Method::POST, path, Some(to_value(body)?)).await
    }

    pub async fn put<B: Serialize>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        self.request(Method::PUT, path, Some(to_value(body)?)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::DELETE, path, None).await
    }

    /// Dispatch one request against the configured API base.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.config.api_url, path);

        log::debug!("Sending a {} request to {}", method, url);

        let mut request = self.http.request(method, &url);
        if let Some(token) = self.session.credential() {
            request = request.bearer_auth(token);
        }
        if let Some(ref body) = body {
            log::trace!("Payload: {:#?}", body);
            request = request.json(body);
        }

        let response = request.send().await?;
        log::trace!("Response headers: {:#?}", response.headers());

        self.interpret(response).await
    }

    async fn interpret(&self, response: Response) -> Result<Value, ApiError> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            // The credential is dead; every screen goes back to login.
            log::warn!("The backend rejected the credential, tearing the session down");
            self.session.invalidate();
            return Err(ApiError::SessionExpired);
        }

        if !status.is_success() {
            let body = response.text().await?;
            let message = error_message(status, &body);
            log::debug!("Request failed with {}: {}", status, message);
            return Err(ApiError::Server { status, message });
        }

        let body = response.bytes().await?;
        if body.is_empty() {
            // DELETE and some mutations come back bodyless
            return Ok(Value::Null);
        }

        serde_json::from_slice(&body).map_err(|err| {
            ApiError::UnexpectedResponse(format!("Неверный ответ сервера: {}", err))
        })
    }

    /// Best-effort liveness probe against the backend root.
    ///
    /// Degrades to `false` on any transport failure; never raises.
    pub async fn health_check(&self) -> bool {
        match self.http.get(self.config.media_url.clone()).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                log::warn!("Health check failed: {}", err);
                false
            }
        }
    }
}

fn to_value<B: Serialize>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body)
        .map_err(|err| ApiError::UnexpectedResponse(format!("Неверный запрос: {}", err)))
}

/// Errors raised by [`ApiClient`] dispatch.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("Не удалось связаться с сервером")]
    Transport(#[from] reqwest::Error),
    /// The backend answered with a non-success status.
    #[error("{message}")]
    Server {
        status: StatusCode,
        message: String,
    },
    /// The credential was rejected; the session has been torn down.
    #[error("Сессия истекла. Необходимо войти заново.")]
    SessionExpired,
    /// Client-side validation failed; no request was sent.
    #[error("{0}")]
    Validation(String),
    /// An operation that needs a credential ran without one.
    #[error("Нет токена аутентификации")]
    MissingCredential,
    /// The backend's response did not have the expected shape.
    #[error("{0}")]
    UnexpectedResponse(String),
}

/// Normalize the backend's error payloads into a single message.
///
/// Depending on the endpoint the backend reports errors as
/// `{"error": "..."}`, `{"error": {"message": ..., "details": ...}}`,
/// `{"message": "..."}` or `{"details": "..."}`; anything else falls back to
/// `HTTP <status>`.
fn error_message(status: StatusCode, body: &str) -> String {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return format!("HTTP {}", status.as_u16()),
    };

    match value.get("error") {
        Some(Value::String(message)) => return message.clone(),
        Some(Value::Object(error)) => {
            if let Some(message) = error.get("message").and_then(Value::as_str) {
                return message.to_string();
            }
            if let Some(details) = error.get("details").and_then(Value::as_str) {
                return details.to_string();
            }
        }
        _ => {}
    }

    if let Some(message) = value.get("message").and_then(Value::as_str) {
        return message.to_string();
    }
    if let Some(details) = value.get("details").and_then(Value::as_str) {
        return details.to_string();
    }

    format!("HTTP {}", status.as_u16())
}

/// User-facing translations for the backend error strings the product knows
/// about. New backend messages that match nothing pass through verbatim.
const TRANSLATIONS: &[(&str, &str)] = &[
    ("Invalid identifier or password", "Неверный логин или пароль"),
    ("Your account email is not confirmed", "Email не подтвержден"),
    ("Your account has been blocked", "Аккаунт заблокирован"),
    (
        "Email or Username are already taken",
        "Email или имя пользователя уже используются",
    ),
];

pub(crate) fn translate(message: &str) -> Option<&'static str> {
    TRANSLATIONS
        .iter()
        .find(|(needle, _)| message.contains(needle))
        .map(|&(_, translated)| translated)
}
