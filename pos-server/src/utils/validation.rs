//! Input validation helpers
//!
//! Centralized limits for caller-supplied values. SQLite enforces neither
//! text length nor numeric range, so everything is checked before binding.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Notes on orders, lines, payments, discount reasons
pub const MAX_NOTE_LEN: usize = 500;

/// Modifier names and values (kitchen ticket width)
pub const MAX_MODIFIER_LEN: usize = 64;

/// Modifiers per line
pub const MAX_MODIFIERS: usize = 20;

/// Items per add-items batch
pub const MAX_BATCH_ITEMS: usize = 200;

// ── Numeric limits ──────────────────────────────────────────────────

/// Maximum allowed quantity per line
pub const MAX_QUANTITY: i32 = 9999;

/// Maximum tendered amount
pub const MAX_PAYMENT_AMOUNT: f64 = 1_000_000.0;

/// Maximum guests on one order
pub const MAX_CUSTOMER_COUNT: i32 = 999;

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.chars().count() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.chars().count()
        )));
    }
    Ok(())
}

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.chars().count()
        )));
    }
    Ok(())
}

/// Validate that a f64 value is finite (not NaN, not Infinity)
pub fn require_finite(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::validation(format!(
            "{field} must be a finite number, got {value}"
        )));
    }
    Ok(())
}

/// Finite and `>= 0`
pub fn require_non_negative(value: f64, field: &str) -> Result<(), AppError> {
    require_finite(value, field)?;
    if value < 0.0 {
        return Err(AppError::validation(format!(
            "{field} must be non-negative, got {value}"
        )));
    }
    Ok(())
}

pub fn validate_quantity(quantity: i32) -> Result<(), AppError> {
    if quantity <= 0 {
        return Err(AppError::validation(format!(
            "quantity must be positive, got {quantity}"
        )));
    }
    if quantity > MAX_QUANTITY {
        return Err(AppError::validation(format!(
            "quantity exceeds maximum allowed ({MAX_QUANTITY}), got {quantity}"
        )));
    }
    Ok(())
}
