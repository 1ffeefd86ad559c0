// Request body validation shared by the handlers. Problems are collected per
// field and reported together as one VALIDATION_ERROR.

use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::error::ApiError;

/// Money columns are NUMERIC(14, 2)
const MONEY_SCALE: u32 = 2;
const MONEY_LIMIT: i64 = 1_000_000_000_000;

#[derive(Debug, Default)]
pub struct FieldErrors(HashMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `problem` for `field` unless `ok` holds. The first problem per field wins.
    pub fn check(&mut self, field: &str, ok: bool, problem: &str) -> &mut Self {
        if !ok {
            self.0.entry(field.to_string()).or_insert_with(|| problem.to_string());
        }
        self
    }

    pub fn require(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        let present = value.map(|v| !v.trim().is_empty()).unwrap_or(false);
        self.check(field, present, &format!("{} is required", field))
    }

    /// Positive, at most two decimal places and below 10^12
    pub fn money(&mut self, field: &str, value: Decimal) -> &mut Self {
        self.check(field, value > Decimal::ZERO, &format!("{} must be greater than 0", field))
            .check(
                field,
                value.normalize().scale() <= MONEY_SCALE,
                &format!("{} must have at most {} decimal places", field, MONEY_SCALE),
            )
            .check(
                field,
                value < Decimal::from(MONEY_LIMIT),
                &format!("{} must be less than {}", field, MONEY_LIMIT),
            )
    }

    pub fn finish(&mut self, message: &str) -> Result<(), ApiError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error(message, Some(std::mem::take(&mut self.0))))
        }
    }
}

/// Shape check only: one `@` with a dotted domain and no whitespace
pub fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
}

/// Trimmed, with email addresses compared in lowercase
pub fn normalize_email(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}
