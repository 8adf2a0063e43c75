//! Input validation helpers for the command boundary.

/// Validate an email address: trims whitespace and requires a single `@` with
/// non-empty local part and a dotted domain. Deliberately loose; this guards
/// against obvious typos, it does not chase RFC 5321.
pub fn validate_email(email: &str) -> Result<String, String> {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(format!("Invalid email address: {email}"));
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err(format!("Invalid email address: {email}"));
    }
    Ok(email.to_string())
}
