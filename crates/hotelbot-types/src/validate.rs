//! Field validators shared by the write inputs.
//!
//! Lengths are counted in characters, not bytes.

use url::Url;

use crate::error::ValidationError;

/// Maximum stored length of any URL column.
pub const MAX_URL_LEN: usize = 200;

/// Maximum length of an email address.
pub const MAX_EMAIL_LEN: usize = 254;

pub fn max_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::new(
            field,
            format!("must be at most {max} characters (got {len})"),
        ));
    }
    Ok(())
}

pub fn required(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    max_len(field, value, max)
}

/// Absolute `http`/`https` URL no longer than [`MAX_URL_LEN`].
pub fn http_url(field: &'static str, value: &str) -> Result<(), ValidationError> {
    required(field, value, MAX_URL_LEN)?;
    let parsed = Url::parse(value)
        .map_err(|e| ValidationError::new(field, format!("not a valid URL: {e}")))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host().is_some() => Ok(()),
        "http" | "https" => Err(ValidationError::new(field, "URL has no host")),
        other => Err(ValidationError::new(
            field,
            format!("unsupported URL scheme '{other}'"),
        )),
    }
}

pub fn email(value: &str) -> Result<(), ValidationError> {
    max_len("email", value, MAX_EMAIL_LEN)?;
    if value.chars().any(char::is_whitespace) {
        return Err(ValidationError::new("email", "must not contain whitespace"));
    }
    let Some((local, domain)) = value.rsplit_once('@') else {
        return Err(ValidationError::new("email", "missing '@'"));
    };
    if local.is_empty() || local.contains('@') {
        return Err(ValidationError::new("email", "invalid local part"));
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(ValidationError::new("email", "invalid domain"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_len_counts_chars() {
        assert!(max_len("name", "héllo", 5).is_ok());
        assert!(max_len("name", "héllo!", 5).is_err());
    }

    #[test]
    fn test_required_rejects_blank() {
        let err = required("name", "   ", 10).unwrap_err();
        assert_eq!(err.field, "name");
        assert_eq!(err.reason, "is required");
    }

    #[test]
    fn test_http_url() {
        assert!(http_url("affiliate_url", "https://book.example.com/h/42?ref=bot").is_ok());
        assert!(http_url("affiliate_url", "").is_err());
        assert!(http_url("affiliate_url", "not a url").is_err());
        assert!(http_url("affiliate_url", "ftp://example.com/x").is_err());
        let long = format!("https://example.com/{}", "a".repeat(200));
        assert!(http_url("affiliate_url", &long).is_err());
    }

    #[test]
    fn test_email() {
        assert!(email("guest@example.com").is_ok());
        assert!(email("guest.name+tag@mail.example.co.uk").is_ok());
        assert!(email("guest").is_err());
        assert!(email("@example.com").is_err());
        assert!(email("guest@localhost").is_err());
        assert!(email("gu est@example.com").is_err());
        assert!(email("a@b@example.com").is_err());
    }
}
