use axum::{extract::State, http::StatusCode, response::Response, routing::get, Router};
use tracing::instrument;

use crate::{
    app::unmatched_request,
    response::{respond, Outcome, Rendering},
    state::AppState,
};

pub mod services;

pub fn router() -> Router<AppState> {
    Router::new().route("/stats", get(get_stats).fallback(unmatched_request))
}

#[instrument(skip(state))]
pub async fn get_stats(State(state): State<AppState>) -> Response {
    let result = services::platform_stats(state.store.as_ref(), &state.config.platform)
        .await
        .map(|stats| Outcome::from_serialize(StatusCode::OK, &stats));
    respond(result, state.debug_mode(), Rendering::Json)
}
