//! Decide whether a hostname hits the blocked-site or blocked-word lists.

use crate::models::{BlockedSite, BlockedWord};
use crate::normalize::normalize;

/// Which rule, if any, fired for a hostname.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchResult<'a> {
    NoMatch,
    SiteMatch(&'a BlockedSite),
    WordMatch(&'a BlockedWord),
}

impl MatchResult<'_> {
    pub fn is_match(&self) -> bool {
        !matches!(self, MatchResult::NoMatch)
    }
}

/// True if `hostname` is `blocked_host` or one of its subdomains.
///
/// Both sides must already be normalized.
pub fn host_matches(hostname: &str, blocked_host: &str) -> bool {
    if blocked_host.is_empty() {
        return false;
    }
    if hostname == blocked_host {
        return true;
    }

    let suffix = format!(".{blocked_host}");
    hostname.ends_with(&suffix) || format!("www.{hostname}").ends_with(&suffix)
}

/// Case-insensitive substring test of `word` against `hostname`.
pub fn word_matches(hostname: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    hostname.to_lowercase().contains(&word.to_lowercase())
}

/// Evaluate `hostname` against both lists. Sites are checked before words and
/// the first hit wins.
pub fn evaluate<'a>(
    hostname: &str,
    sites: &'a [BlockedSite],
    words: &'a [BlockedWord],
) -> MatchResult<'a> {
    if let Some(site) = sites.iter().find(|s| host_matches(hostname, &normalize(&s.url))) {
        return MatchResult::SiteMatch(site);
    }

    if let Some(word) = words.iter().find(|w| word_matches(hostname, &w.word)) {
        return MatchResult::WordMatch(word);
    }

    MatchResult::NoMatch
}
