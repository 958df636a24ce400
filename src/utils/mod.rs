use std::borrow::Cow;
use url::Url;

/// Marker appended to any text cut down to a length limit
pub const TRUNCATION_MARKER: &str = "... [TRUNCATED]";

/// Platform domains Supadata can pull transcripts from
const SUPPORTED_DOMAINS: &[&str] = &[
    "youtube.com",
    "youtu.be",
    "twitter.com",
    "x.com",
    "vimeo.com",
    "tiktok.com",
    "instagram.com",
    "facebook.com",
    "fb.com",
    "linkedin.com",
    "reddit.com",
];

/// Check whether a URL points at a supported video platform
pub fn is_supported_video_url(url: &str) -> bool {
    let url_lower = url.to_lowercase();
    SUPPORTED_DOMAINS
        .iter()
        .any(|domain| url_lower.contains(domain))
}

/// List supported platform domains for display
pub fn supported_domains() -> &'static [&'static str] {
    SUPPORTED_DOMAINS
}

/// Cut text down to `max_chars` characters, appending a visible marker when
/// anything was dropped. Counts characters rather than bytes so multibyte
/// input never splits a code point.
pub fn truncate_with_marker(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        None => Cow::Borrowed(text),
        Some((cut, _)) => {
            let mut truncated = String::with_capacity(cut + TRUNCATION_MARKER.len());
            truncated.push_str(&text[..cut]);
            truncated.push_str(TRUNCATION_MARKER);
            Cow::Owned(truncated)
        }
    }
}

/// Extract domain from URL for display purposes
pub fn extract_domain(url: &str) -> Option<String> {
    Url::parse(url).ok()?.host_str().map(|host| {
        // Remove 'www.' prefix if present
        if host.starts_with("www.") {
            host[4..].to_string()
        } else {
            host.to_string()
        }
    })
}
