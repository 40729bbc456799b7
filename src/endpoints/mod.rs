//! Typed operations over the backend's REST endpoints.

mod collection;
mod login;
mod me;
mod register;

pub use collection::{
    create, delete, list, update, Collection, Drivings, Exams, Timetables, Users,
};
pub use login::{login, AuthResponse};
pub use me::current_user;
pub use register::register;

use crate::{client, ApiError};

/// Swap known backend error strings for the product's user-facing wording.
fn translate_known(err: ApiError) -> ApiError {
    match err {
        ApiError::Server { status, message } => match client::translate(&message) {
            Some(translated) => ApiError::Server {
                status,
                message: translated.to_string(),
            },
            None => ApiError::Server { status, message },
        },
        other => other,
    }
}
