//! Video-hosting URL validation.

use crate::ValidationError;
use regex::Regex;
use std::sync::LazyLock;

static YOUTUBE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^((?:https?:)?//)?((?:www|m|music)\.)?(youtube(?:-nocookie)?\.com|youtu\.be)(/(?:[\w\-]+\?v=|embed/|v/|shorts/)?)([\w\-]+)(\S+)?$",
    )
    .expect("valid URL pattern")
});

/// Validates that `url` points at a recognized video-hosting address.
///
/// A missing scheme is normalized to `https://`. Returns the normalized URL.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyUrl`] for blank input and
/// [`ValidationError::UnsupportedUrl`] when the host or path is not recognized.
///
/// # Example
///
/// ```
/// use ytgrab_types::validate_url;
///
/// let url = validate_url("youtu.be/dQw4w9WgXcQ").unwrap();
/// assert_eq!(url, "https://youtu.be/dQw4w9WgXcQ");
/// ```
pub fn validate_url(url: &str) -> Result<String, ValidationError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }

    let normalized = if url.contains("://") {
        url.to_string()
    } else {
        format!("https://{url}")
    };

    if YOUTUBE_URL.is_match(&normalized) {
        Ok(normalized)
    } else {
        Err(ValidationError::UnsupportedUrl(url.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_watch_url() {
        let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
        assert_eq!(validate_url(url).unwrap(), url);
    }

    #[test]
    fn test_accepts_short_and_mobile_hosts() {
        assert!(validate_url("https://youtu.be/dQw4w9WgXcQ").is_ok());
        assert!(validate_url("https://m.youtube.com/watch?v=dQw4w9WgXcQ").is_ok());
        assert!(validate_url("https://www.youtube.com/shorts/abc123").is_ok());
        assert!(validate_url("https://www.youtube-nocookie.com/embed/abc123").is_ok());
    }

    #[test]
    fn test_adds_missing_scheme() {
        assert_eq!(
            validate_url("  www.youtube.com/watch?v=abc ").unwrap(),
            "https://www.youtube.com/watch?v=abc"
        );
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(validate_url("   "), Err(ValidationError::EmptyUrl));
    }

    #[test]
    fn test_rejects_other_hosts() {
        assert!(matches!(
            validate_url("https://vimeo.com/12345"),
            Err(ValidationError::UnsupportedUrl(_))
        ));
        assert!(validate_url("https://notyoutube.com/watch?v=abc").is_err());
    }
}
