use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crate::{customers::validation::escape_html, error::AppError};

/// Status plus structured payload, before picking a wire format.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub status: StatusCode,
    pub payload: Value,
}

impl Outcome {
    pub fn new(status: StatusCode, payload: Value) -> Self {
        Self { status, payload }
    }

    pub fn empty(status: StatusCode) -> Self {
        Self::new(status, Value::Null)
    }

    pub fn from_serialize<T: Serialize>(status: StatusCode, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(payload) => Self::new(status, payload),
            Err(e) => {
                error!(error = %e, "response serialization failed");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": "Internal server error" }),
                )
            }
        }
    }
}

/// Recovery links offered by HTML fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormLinks {
    pub retry: &'static str,
    pub login: &'static str,
    pub signup: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rendering {
    Json,
    Html(FormLinks),
}

/// Renders a handler result; errors become `{error}` outcomes first.
pub fn respond(result: Result<Outcome, AppError>, debug: bool, rendering: Rendering) -> Response {
    let outcome = result.unwrap_or_else(|e| e.into_outcome(debug));
    render(outcome, rendering)
}

pub fn render(outcome: Outcome, rendering: Rendering) -> Response {
    let Outcome { status, payload } = outcome;
    if payload.is_null() {
        return status.into_response();
    }
    match rendering {
        Rendering::Json => {
            let body = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| "{}".into());
            (
                status,
                [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
                body,
            )
                .into_response()
        }
        Rendering::Html(links) => (status, Html(html_fragment(status, &payload, links))).into_response(),
    }
}

fn text<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload.get(key).and_then(Value::as_str)
}

const FRAGMENT_STYLE: &str =
    "text-align: center; margin-top: 100px; font-family: Segoe UI, Tahoma, sans-serif; font-size: 18px;";

fn link(href: &str, label: &str) -> String {
    format!(r#"<a href="{href}" style="color: #ffcc00; text-decoration: none; margin: 0 10px;">{label}</a>"#)
}

// User-supplied fields in payloads were escaped at sanitization; only the
// error text is escaped here.
fn html_fragment(status: StatusCode, payload: &Value, links: FormLinks) -> String {
    if status.is_success() {
        let name = text(payload, "name")
            .or_else(|| payload.get("user").and_then(|u| text(u, "name")))
            .unwrap_or_default();
        let headline = if payload.get("user_id").is_some() {
            format!("✅ Thank you for registering, {name}!")
        } else {
            format!("👋 Welcome back, {name}!")
        };
        let email = text(payload, "email")
            .or_else(|| payload.get("user").and_then(|u| text(u, "email")))
            .unwrap_or_default();
        return format!(
            r#"<div class="academy-success" style="color: #00ff88; {FRAGMENT_STYLE}">{headline}<br><span style="font-size: 14px;">{email}</span></div>"#
        );
    }

    let message = escape_html(text(payload, "error").unwrap_or("Request failed"));
    let (color, actions) = match status {
        StatusCode::CONFLICT => ("orange", link(links.login, "Login here")),
        StatusCode::UNAUTHORIZED => (
            "red",
            format!(
                "{}{}",
                link(links.retry, "← Try again"),
                link(links.signup, "Sign up here →")
            ),
        ),
        _ => ("red", link(links.retry, "← Go Back")),
    };
    let icon = if status == StatusCode::CONFLICT { "⚠️" } else { "❌" };
    format!(
        r#"<div class="academy-error" style="color: {color}; {FRAGMENT_STYLE}">{icon} {message}<br><br>{actions}</div>"#
    )
}
