use crate::constants::{MAX_PAUSE_MINUTES, MAX_SITE_URL_LEN, MAX_WORD_LEN, MIN_WORD_LEN};
use crate::error::AppError;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Domain or IPv4 address, optional http(s) scheme and simple path/query tail.
static SITE_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(https?://)?([\da-z.-]+\.[a-z.]{2,6}|[\d.]+)([/:?=&#][\da-z.-]+)*/?$")
        .unwrap_or_else(|e| unreachable!("site url pattern is a literal: {e}"))
});

/// Validate a blocked site URL as typed by the user.
pub fn validate_site_url(url: &str) -> Result<&str, AppError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(AppError::InvalidInput {
            field: "url",
            reason: "URL is required".into(),
        });
    }
    if url.len() > MAX_SITE_URL_LEN {
        return Err(AppError::InvalidInput {
            field: "url",
            reason: format!("cannot exceed {MAX_SITE_URL_LEN} characters"),
        });
    }
    if !SITE_URL_PATTERN.is_match(url) {
        return Err(AppError::InvalidInput {
            field: "url",
            reason: "please enter a valid URL".into(),
        });
    }
    Ok(url)
}

/// Validate a blocked word: 2-30 characters of `[a-zA-Z0-9-_]`.
pub fn validate_word(word: &str) -> Result<&str, AppError> {
    let word = word.trim();
    let err = |reason: String| AppError::InvalidInput { field: "word", reason };

    let len = word.chars().count();
    if len < MIN_WORD_LEN {
        return Err(err(format!("must be at least {MIN_WORD_LEN} characters")));
    }
    if len > MAX_WORD_LEN {
        return Err(err(format!("must be at most {MAX_WORD_LEN} characters")));
    }
    if !word
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(err(
            "only letters, numbers, hyphens, and underscores are allowed".into(),
        ));
    }
    Ok(word)
}

/// Validate the redirect target. Only absolute http(s) URLs are accepted.
pub fn validate_redirection_url(url: &str) -> Result<String, AppError> {
    let err = |reason: &str| AppError::InvalidInput {
        field: "customRedirectionUrl",
        reason: reason.into(),
    };

    let parsed = Url::parse(url.trim()).map_err(|_| err("please enter a valid URL"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(err("must use http or https"));
    }
    if parsed.host_str().is_none() {
        return Err(err("must include a host"));
    }
    Ok(url.trim().to_string())
}

/// Validate a pause length in minutes.
pub fn validate_pause_minutes(minutes: f64) -> Result<f64, AppError> {
    if !minutes.is_finite() || minutes <= 0.0 {
        return Err(AppError::InvalidInput {
            field: "duration",
            reason: "must be a positive number of minutes".into(),
        });
    }
    if minutes > MAX_PAUSE_MINUTES {
        return Err(AppError::InvalidInput {
            field: "duration",
            reason: format!("cannot exceed {MAX_PAUSE_MINUTES} minutes"),
        });
    }
    Ok(minutes)
}
