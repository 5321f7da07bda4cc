use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Response,
    routing::post,
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    app::unmatched_request,
    customers::{
        dto::{LoginRequest, LoginResponse, PublicUser, RegisterRequest, RegisteredResponse},
        repo_types::User,
        services::{self, Registered},
        validation::ValidationError,
    },
    error::AppError,
    response::{respond, Outcome, Rendering},
    state::AppState,
};

pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register).fallback(unmatched_request))
        .route("/login", post(login).fallback(unmatched_request))
}

pub(crate) fn registered_outcome(r: Registered) -> Outcome {
    Outcome::from_serialize(
        StatusCode::CREATED,
        &RegisteredResponse {
            message: "User registered successfully",
            user_id: r.user_id,
            name: r.name,
            email: r.email,
        },
    )
}

pub(crate) fn login_outcome(user: User) -> Outcome {
    Outcome::from_serialize(
        StatusCode::OK,
        &LoginResponse {
            message: "Login successful",
            user: PublicUser::from(user),
        },
    )
}

fn malformed(rejection: JsonRejection) -> AppError {
    warn!(error = %rejection.body_text(), "malformed json body");
    AppError::Validation(ValidationError::MalformedBody(rejection.body_text()))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Response {
    let result = match payload {
        Ok(Json(input)) => services::register(state.store.as_ref(), &input)
            .await
            .map(registered_outcome),
        Err(rejection) => Err(malformed(rejection)),
    };
    respond(result, state.debug_mode(), Rendering::Json)
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let result = match payload {
        Ok(Json(input)) => services::login(state.store.as_ref(), &input)
            .await
            .map(login_outcome),
        Err(rejection) => Err(malformed(rejection)),
    };
    respond(result, state.debug_mode(), Rendering::Json)
}
