use crate::{
    client::ApiClient,
    endpoints::login::{parse_auth_response, AuthResponse},
    models::{Draft, RegisterDraft},
    ApiError,
};

/// Register a new account through the auth API.
///
/// The backend answers the same way as a login: `{jwt, user}` for the
/// freshly created account.
pub async fn register(
    client: &ApiClient,
    draft: &RegisterDraft,
) -> Result<AuthResponse, ApiError> {
    draft.validate()?;

    let body = client
        .post("/auth/local/register", draft)
        .await
        .map_err(super::translate_known)?;

    parse_auth_response(body)
}
