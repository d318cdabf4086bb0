use std::collections::BTreeMap;
use std::fmt;

use crate::error::{ClientError, ClientResult};
use crate::models::{LoginRequest, SignupRequest};

/// Maximum length of a post or comment body.
pub const MAX_TEXT_LENGTH: usize = 280;

/// Minimum password length accepted at signup.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Record a message for `field`. A second message for the same field is appended.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let message = message.into();
        self.0
            .entry(field.into())
            .and_modify(|existing| {
                existing.push(' ');
                existing.push_str(&message);
            })
            .or_insert(message);
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn first(&self) -> Option<(&str, &str)> {
        self.iter().next()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when nothing was recorded, otherwise a validation error.
    pub fn into_result(self) -> ClientResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ClientError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

pub fn validate_signup(req: &SignupRequest) -> ClientResult<()> {
    let mut errors = FieldErrors::default();

    if req.username.trim().is_empty() {
        errors.insert("username", "Username is required");
    }

    if req.email.trim().is_empty() {
        errors.insert("email", "Email is required");
    } else if !looks_like_email(&req.email) {
        errors.insert("email", "Email is invalid");
    }

    if req.password.is_empty() {
        errors.insert("password", "Password is required");
    } else if req.password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.insert("password", "Password must be at least 8 characters");
    }

    if req.password != req.password2 {
        errors.insert("password2", "Passwords do not match");
    }

    errors.into_result()
}

pub fn validate_login(req: &LoginRequest) -> ClientResult<()> {
    let mut errors = FieldErrors::default();

    if req.username.trim().is_empty() {
        errors.insert("username", "Username is required");
    }
    if req.password.is_empty() {
        errors.insert("password", "Password is required");
    }

    errors.into_result()
}

/// Post and comment bodies: non-blank and at most [`MAX_TEXT_LENGTH`] characters.
pub fn validate_text(field: &str, text: &str) -> ClientResult<()> {
    let mut errors = FieldErrors::default();

    if text.trim().is_empty() {
        errors.insert(field, "This field may not be blank.");
    } else if text.chars().count() > MAX_TEXT_LENGTH {
        errors.insert(
            field,
            format!("Ensure this field has no more than {} characters.", MAX_TEXT_LENGTH),
        );
    }

    errors.into_result()
}

/// Loose `something@something.something` check; anything stricter is the server's job.
fn looks_like_email(input: &str) -> bool {
    input.split_whitespace().any(|word| {
        word.char_indices().filter(|&(_, c)| c == '@').any(|(at, _)| {
            let domain = &word[at + 1..];
            at > 0
                && domain
                    .char_indices()
                    .any(|(dot, c)| c == '.' && dot > 0 && dot + 1 < domain.len())
        })
    })
}
