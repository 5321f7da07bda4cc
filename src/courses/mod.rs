use axum::{http::StatusCode, response::Response, routing::get, Router};

use crate::{
    app::unmatched_request,
    response::{render, Outcome, Rendering},
    state::AppState,
};

pub mod catalog;

pub fn router() -> Router<AppState> {
    Router::new().route("/courses", get(list_courses).fallback(unmatched_request))
}

pub async fn list_courses() -> Response {
    render(
        Outcome::from_serialize(StatusCode::OK, &catalog::course_list()),
        Rendering::Json,
    )
}
