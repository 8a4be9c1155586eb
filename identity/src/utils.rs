//! Utility functions for account identity.

/// Validate email address format.
///
/// This performs basic RFC 5322 validation:
/// - Must contain exactly one `@`
/// - Must have non-empty local and domain parts
/// - Domain must contain a dot, with no empty labels
/// - Length must be between 3 and 254 characters
///
/// # Examples
///
/// ```
/// use account_identity::utils::is_valid_email;
///
/// assert!(is_valid_email("jake.peralta@b99.com"));
/// assert!(is_valid_email("user+tag@subdomain.example.com"));
/// assert!(!is_valid_email("invalid"));
/// assert!(!is_valid_email("@example.com"));
/// assert!(!is_valid_email("user@"));
/// ```
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 3 || email.len() > 254 {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    if !domain.contains('.') {
        return false;
    }

    let valid_local_chars =
        |c: char| c.is_alphanumeric() || c == '.' || c == '-' || c == '+' || c == '_';

    let valid_domain_chars = |c: char| c.is_alphanumeric() || c == '.' || c == '-';

    if !local.chars().all(valid_local_chars) || !domain.chars().all(valid_domain_chars) {
        return false;
    }

    domain.split('.').all(|part| !part.is_empty())
}

/// Validate email format, mapping failure to `IdentityError::InvalidEmail`.
///
/// # Errors
///
/// Returns `InvalidEmail` if the address fails [`is_valid_email`].
pub fn validate_email(email: &str) -> crate::error::Result<()> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(crate::error::IdentityError::InvalidEmail)
    }
}

/// Case-insensitive comparison used for login identifiers and uniqueness.
///
/// # Examples
///
/// ```
/// use account_identity::utils::same_identifier;
///
/// assert!(same_identifier("Rosa", "rosa"));
/// assert!(!same_identifier("Rosa", "Rosalind"));
/// ```
#[must_use]
pub fn same_identifier(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
