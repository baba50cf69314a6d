//! Hostname normalization shared by matching and duplicate detection.

use crate::constants::DEFAULT_SCHEME_PREFIX;
use url::Url;

/// Map a URL or bare host to a comparable hostname.
///
/// Input without a scheme is treated as `https://`. The host is lower-cased and
/// a single leading `www.` is removed. Anything that does not parse (or parses
/// without a host) falls back to the lower-cased input.
pub fn normalize(input: &str) -> String {
    let candidate = if input.contains("://") {
        input.to_string()
    } else {
        format!("{DEFAULT_SCHEME_PREFIX}{input}")
    };

    match Url::parse(&candidate) {
        Ok(url) => match url.host_str() {
            Some(host) => {
                let host = host.to_lowercase();
                match host.strip_prefix("www.") {
                    Some(stripped) => stripped.to_string(),
                    None => host,
                }
            }
            None => input.to_lowercase(),
        },
        Err(_) => input.to_lowercase(),
    }
}
