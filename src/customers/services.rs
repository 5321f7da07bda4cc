use tracing::{info, warn};

use crate::{
    customers::{
        dto::{LoginRequest, RegisterRequest},
        repo_types::{User, UserId},
        validation::{validate_login_name, validate_registration},
    },
    db::{AcademyStore, StoreError},
    error::AppError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registered {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
}

/// Validate, check the email, insert.
///
/// The pre-check only saves a round trip; the `UNIQUE(email)` constraint
/// decides, and its violation is reported as the same conflict.
pub async fn register(store: &dyn AcademyStore, input: &RegisterRequest) -> Result<Registered, AppError> {
    let user = validate_registration(input).map_err(|e| {
        warn!(field = ?e.field(), error = %e, "registration rejected");
        e
    })?;

    let existing = store
        .find_user_by_email(&user.email)
        .await
        .map_err(AppError::store("Registration failed"))?;
    if existing.is_some() {
        warn!(email = %user.email, "email already registered");
        return Err(AppError::Conflict);
    }

    let user_id = match store.insert_user(&user).await {
        Ok(id) => id,
        Err(StoreError::DuplicateKey) => {
            warn!(email = %user.email, "email claimed concurrently");
            return Err(AppError::Conflict);
        }
        Err(e) => return Err(AppError::store("Registration failed")(e)),
    };

    info!(user_id, email = %user.email, "user registered");
    Ok(Registered {
        user_id,
        name: user.name,
        email: user.email,
    })
}

/// Look up an active user by name.
///
/// This asserts an identity, it does not prove one: there is no credential.
pub async fn login(store: &dyn AcademyStore, input: &LoginRequest) -> Result<User, AppError> {
    let name = validate_login_name(input).map_err(|e| {
        warn!(field = ?e.field(), error = %e, "login rejected");
        e
    })?;

    match store
        .find_user_by_name(&name)
        .await
        .map_err(AppError::store("Login failed"))?
    {
        Some(user) => {
            info!(user_id = user.id, "user logged in");
            Ok(user)
        }
        None => {
            warn!(name = %name, "login unknown name");
            Err(AppError::UserNotFound)
        }
    }
}
