//! Field-level input checks shared by the handlers.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{AppError, Result};

pub const USERNAME_MIN: usize = 4;
pub const USERNAME_MAX: usize = 64;
pub const PASSWORD_MIN: usize = 6;
pub const BOARD_NAME_MAX: usize = 100;
pub const COLUMN_NAME_MAX: usize = 100;
pub const CARD_TITLE_MAX: usize = 150;
pub const CARD_DESCRIPTION_MAX: usize = 1000;
pub const TAG_NAME_MAX: usize = 50;
pub const COMMENT_MAX: usize = 1000;

/// Ordered field -> message pairs. Only the first message per field is kept.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }

    /// Checks a trimmed string's character count against an inclusive range.
    pub fn check_length(&mut self, field: &str, value: &str, min: usize, max: usize) {
        let len = value.trim().chars().count();
        if min > 0 && len == 0 {
            self.add(field, format!("{} is required", label(field)));
        } else if len < min {
            self.add(
                field,
                format!("{} must be at least {} characters", label(field), min),
            );
        } else if len > max {
            self.add(
                field,
                format!("{} must be at most {} characters", label(field), max),
            );
        }
    }

    pub fn check_email(&mut self, field: &str, value: &str) {
        if !is_email(value.trim()) {
            self.add(field, "Enter a valid email address");
        }
    }

    pub fn check_color(&mut self, field: &str, value: &str) {
        if !is_hex_color(value.trim()) {
            self.add(field, "Color must be a hex value like #RRGGBB or #RGB");
        }
    }
}

fn label(field: &str) -> String {
    let words = field.replace('_', " ");
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `#RGB` or `#RRGGBB`, case-insensitive.
pub fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => {
            (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

pub fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}
