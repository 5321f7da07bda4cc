use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::customers::{
    dto::{LoginRequest, RegisterRequest},
    repo_types::{Gender, NewUser},
};

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 50;
const EMAIL_MAX_LEN: usize = 254;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{field} {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },

    #[error("Malformed request body: {0}")]
    MalformedBody(String),
}

impl ValidationError {
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::Missing(field) | ValidationError::Invalid { field, .. } => {
                Some(field)
            }
            ValidationError::MalformedBody(_) => None,
        }
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$"
        )
        .unwrap();
    }
    email.len() <= EMAIL_MAX_LEN && EMAIL_RE.is_match(email)
}

/// Escapes the characters that matter inside HTML text and attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Drops backslash escapes: `\\x` becomes `x` and a trailing backslash is
/// removed.
pub fn strip_slashes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Trim, unescape, then HTML-escape. Parameterized queries still do the real
/// work.
pub fn sanitize_input(input: &str) -> String {
    escape_html(&strip_slashes(input.trim()))
}

fn required<'a>(field: &'static str, value: Option<&'a str>) -> Result<&'a str, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::Missing(field)),
    }
}

/// Checks a registration payload and returns the sanitized record to insert.
///
/// Presence of every field is checked before any format rule, so a payload
/// missing `phone` with a bad email reports the missing phone.
pub fn validate_registration(input: &RegisterRequest) -> Result<NewUser, ValidationError> {
    let name = required("name", input.name.as_deref())?;
    let email = required("email", input.email.as_deref())?;
    let gender = required("gender", input.gender.as_deref())?;
    let phone = required("phone", input.phone.as_deref())?;

    let name_len = name.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&name_len) {
        return Err(ValidationError::Invalid {
            field: "name",
            reason: "must be between 2 and 50 characters",
        });
    }

    let email = email.to_lowercase();
    if !is_valid_email(&email) {
        return Err(ValidationError::Invalid {
            field: "email",
            reason: "must be a valid email address",
        });
    }

    let gender: Gender = gender.parse().map_err(|_| ValidationError::Invalid {
        field: "gender",
        reason: "must be one of male, female, other",
    })?;

    Ok(NewUser {
        name: sanitize_input(name),
        gender,
        email,
        phone: sanitize_input(phone),
    })
}

/// Returns the sanitized name to look up.
pub fn validate_login_name(input: &LoginRequest) -> Result<String, ValidationError> {
    let name = required("name", input.name.as_deref())?;
    if name.chars().count() < NAME_MIN_CHARS {
        return Err(ValidationError::Invalid {
            field: "name",
            reason: "must be at least 2 characters",
        });
    }
    Ok(sanitize_input(name))
}
