//! HTML form endpoints. Same validation, store and services as the JSON
//! API; only extraction and rendering differ.

use axum::{
    extract::{rejection::FormRejection, State},
    response::Response,
    routing::post,
    Form, Router,
};
use tracing::{instrument, warn};

use crate::{
    app::unmatched_request,
    customers::{
        dto::{LoginRequest, RegisterRequest},
        handlers::{login_outcome, registered_outcome},
        services,
        validation::ValidationError,
    },
    error::AppError,
    response::{respond, FormLinks, Rendering},
    state::AppState,
};

const SIGNUP_PAGE: &str = "newuser.html";
const LOGIN_PAGE: &str = "validation.html";

const REGISTER_FORM: Rendering = Rendering::Html(FormLinks {
    retry: SIGNUP_PAGE,
    login: LOGIN_PAGE,
    signup: SIGNUP_PAGE,
});

const LOGIN_FORM: Rendering = Rendering::Html(FormLinks {
    retry: LOGIN_PAGE,
    login: LOGIN_PAGE,
    signup: SIGNUP_PAGE,
});

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/forms/register", post(register_form).fallback(unmatched_request))
        .route("/forms/login", post(login_form).fallback(unmatched_request))
}

fn malformed(rejection: FormRejection) -> AppError {
    warn!(error = %rejection.body_text(), "malformed form body");
    AppError::Validation(ValidationError::MalformedBody(rejection.body_text()))
}

#[instrument(skip(state, form))]
pub async fn register_form(
    State(state): State<AppState>,
    form: Result<Form<RegisterRequest>, FormRejection>,
) -> Response {
    let result = match form {
        Ok(Form(input)) => services::register(state.store.as_ref(), &input)
            .await
            .map(registered_outcome),
        Err(rejection) => Err(malformed(rejection)),
    };
    respond(result, state.debug_mode(), REGISTER_FORM)
}

#[instrument(skip(state, form))]
pub async fn login_form(
    State(state): State<AppState>,
    form: Result<Form<LoginRequest>, FormRejection>,
) -> Response {
    let result = match form {
        Ok(Form(input)) => services::login(state.store.as_ref(), &input)
            .await
            .map(login_outcome),
        Err(rejection) => Err(malformed(rejection)),
    };
    respond(result, state.debug_mode(), LOGIN_FORM)
}
