//! Input validation utilities

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Accumulates the validation failures of a single form submission.
///
/// Field errors keep the first message recorded for a field; later failures
/// for the same field are dropped. Non-field errors are kept in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validator {
    field_errors: HashMap<String, String>,
    non_field_errors: Vec<String>,
}

impl Validator {
    /// True when no field or non-field error has been recorded
    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty() && self.non_field_errors.is_empty()
    }

    /// Record `message` for `field` unless the field already has one
    pub fn add_field_error(&mut self, field: &str, message: &str) {
        self.field_errors
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    pub fn add_non_field_error(&mut self, message: &str) {
        self.non_field_errors.push(message.to_string());
    }

    /// Record `message` for `field` when `ok` is false
    pub fn check_field(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add_field_error(field, message);
        }
    }

    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.field_errors.get(field).map(String::as_str)
    }

    pub fn non_field_errors(&self) -> &[String] {
        &self.non_field_errors
    }
}

/// True when the value contains something other than whitespace
pub fn not_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

/// True when the value has at most `limit` characters
pub fn max_chars(value: &str, limit: usize) -> bool {
    value.chars().count() <= limit
}

/// True when the value has at least `limit` characters
pub fn min_chars(value: &str, limit: usize) -> bool {
    value.chars().count() >= limit
}

pub fn matches(value: &str, regex: &Regex) -> bool {
    regex.is_match(value)
}

/// True when `value` equals one of `permitted`
pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.iter().any(|candidate| candidate == value)
}

/// Pattern every email address has to match
pub fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
        )
        .expect("Failed to compile email regex")
    })
}
