use crate::{client::ApiClient, session::SessionUser, ApiError};

/// Fetch the authenticated principal, with its role expanded.
///
/// Fails fast when no credential is held; no request goes out.
pub async fn current_user(client: &ApiClient) -> Result<SessionUser, ApiError> {
    if client.session().credential().is_none() {
        return Err(ApiError::MissingCredential);
    }

    let body = client.get("/users/me?populate=role").await?;

    serde_json::from_value(body)
        .map_err(|err| ApiError::UnexpectedResponse(format!("Неверный ответ сервера: {}", err)))
}
