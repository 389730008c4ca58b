//! Input validation helpers
//!
//! Centralized text length constants and validation functions used by the
//! create/update paths of every module. Every failure carries a `field`
//! detail so a form can highlight the offending input.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::error::{AppError, AppResult, ErrorCode};

// ── Text length limits ──────────────────────────────────────────────

/// Names: people, vendors, titles, departments
pub const MAX_NAME_LEN: usize = 200;

/// Notes, descriptions, reasons, summaries
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone, skill, service, position
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PASSWORD_LEN: usize = 128;

// ── Money limits ────────────────────────────────────────────────────

/// Upper bound for any money field (1,000,000,000.00)
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

// ── Text ────────────────────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(
            AppError::with_message(ErrorCode::RequiredField, format!("{field} must not be empty"))
                .with_detail("field", field),
        );
    }
    if value.chars().count() > max_len {
        return Err(AppError::invalid_field(
            field,
            format!(
                "{field} is too long ({} chars, max {max_len})",
                value.chars().count()
            ),
        ));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> AppResult<()> {
    if let Some(v) = value
        && v.chars().count() > max_len
    {
        return Err(AppError::invalid_field(
            field,
            format!("{field} is too long ({} chars, max {max_len})", v.chars().count()),
        ));
    }
    Ok(())
}

/// Loose shape check: `local@domain.tld`, no whitespace
pub fn validate_email(value: &str, field: &str) -> AppResult<()> {
    validate_required_text(value, field, MAX_EMAIL_LEN)?;
    let value = value.trim();
    let well_formed = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !well_formed {
        return Err(
            AppError::with_message(
                ErrorCode::InvalidFormat,
                format!("{field} is not a valid email"),
            )
            .with_detail("field", field),
        );
    }
    Ok(())
}

pub fn validate_password(value: &str) -> AppResult<()> {
    let len = value.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(AppError::new(ErrorCode::PasswordTooShort)
            .with_detail("field", "password")
            .with_detail("min", MIN_PASSWORD_LEN));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(AppError::new(ErrorCode::PasswordTooLong)
            .with_detail("field", "password")
            .with_detail("max", MAX_PASSWORD_LEN));
    }
    Ok(())
}

// ── Numbers ─────────────────────────────────────────────────────────

/// Money field: not negative and not above [`MAX_AMOUNT`]
pub fn validate_amount(value: Decimal, field: &str) -> AppResult<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(
            AppError::with_message(
                ErrorCode::ValueOutOfRange,
                format!("{field} must not be negative"),
            )
            .with_detail("field", field),
        );
    }
    if value > MAX_AMOUNT {
        return Err(
            AppError::with_message(
                ErrorCode::ValueOutOfRange,
                format!("{field} exceeds maximum allowed ({MAX_AMOUNT})"),
            )
            .with_detail("field", field)
            .with_detail("max", MAX_AMOUNT.to_string()),
        );
    }
    Ok(())
}

/// Reference to another record by snowflake id
pub fn validate_id(value: i64, field: &str) -> AppResult<()> {
    if value <= 0 {
        return Err(AppError::invalid_field(field, format!("{field} must be a valid id")));
    }
    Ok(())
}

// ── Dates ───────────────────────────────────────────────────────────

/// `end` must not be before `start`
pub fn validate_date_range(start: NaiveDate, end: NaiveDate, end_field: &str) -> AppResult<()> {
    if end < start {
        return Err(AppError::invalid_field(
            end_field,
            format!("{end_field} must not be before the start date"),
        ));
    }
    Ok(())
}

/// Payroll period, `YYYY-MM`
pub fn validate_period(value: &str, field: &str) -> AppResult<()> {
    let value = value.trim();
    let parsed = value.len() == 7
        && NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d").is_ok();
    if !parsed {
        return Err(
            AppError::with_message(ErrorCode::InvalidFormat, format!("{field} must be YYYY-MM"))
                .with_detail("field", field),
        );
    }
    Ok(())
}
