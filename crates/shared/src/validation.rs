//! Common validation utilities.

use validator::{ValidationError, ValidationErrors};

/// Validates that a text value is present (not empty or whitespace only).
///
/// The `code` is kept on the error so callers can order violations
/// deterministically; see [`ordered_messages`].
pub fn require_text(
    value: &str,
    code: &'static str,
    message: &'static str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new(code);
        err.message = Some(message.into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates that a value is one of the allowed values.
///
/// The error message enumerates every allowed value, e.g.
/// `Type must be one of: a, b, c`.
pub fn require_one_of(
    value: &str,
    allowed: &[&str],
    code: &'static str,
    label: &str,
) -> Result<(), ValidationError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        let mut err = ValidationError::new(code);
        err.message = Some(format!("{} must be one of: {}", label, allowed.join(", ")).into());
        err.add_param("value".into(), &value);
        Err(err)
    }
}

/// Flattens validation errors into their messages, ordered by error code.
///
/// `validator` groups errors in a map keyed by field, so the iteration
/// order is unspecified. Errors whose code appears in `code_order` come
/// first, in that order; anything else follows, sorted by code.
pub fn ordered_messages(errors: &ValidationErrors, code_order: &[&str]) -> Vec<String> {
    let mut collected: Vec<(usize, String, String)> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let rank = code_order
                    .iter()
                    .position(|c| *c == e.code)
                    .unwrap_or(code_order.len());
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                (rank, e.code.to_string(), message)
            })
        })
        .collect();

    collected.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    collected.into_iter().map(|(_, _, message)| message).collect()
}
