//! Per-navigation allow/redirect decision.
//!
//! Every top-level navigation is checked against the pause window, the blocked
//! site list and the blocked word list. A hit redirects the tab to the
//! configured URL. Any internal failure allows the navigation: a broken
//! blocker must never leave a tab stuck.

use crate::constants::MAIN_FRAME_ID;
use crate::db::{lock_db, Database};
use crate::error::AppError;
use crate::matcher::{self, MatchResult};
use crate::models::{BlockedSite, BlockedWord, Settings};
use crate::normalize::normalize;
use crate::pause::PauseEvaluator;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};
use url::Url;

/// A navigation reported by the browser.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationEvent {
    pub tab_id: i64,
    pub url: String,
    pub frame_id: i64,
    /// Milliseconds since the epoch, as reported by the browser. Only logged;
    /// decisions use the host clock.
    #[serde(default)]
    pub timestamp: Option<f64>,
}

/// The rule that caused a redirect.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BlockReason {
    #[serde(rename_all = "camelCase")]
    Site { site_id: String, site: String },
    #[serde(rename_all = "camelCase")]
    Word { word_id: String, word: String },
}

impl BlockReason {
    fn from_match(result: MatchResult<'_>) -> Option<Self> {
        match result {
            MatchResult::NoMatch => None,
            MatchResult::SiteMatch(site) => Some(BlockReason::Site {
                site_id: site.id.clone(),
                site: site.url.clone(),
            }),
            MatchResult::WordMatch(word) => Some(BlockReason::Word {
                word_id: word.id.clone(),
                word: word.word.clone(),
            }),
        }
    }
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::Site { site, .. } => write!(f, "blocked site '{site}'"),
            BlockReason::Word { word, .. } => write!(f, "blocked word '{word}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Not a main-frame navigation.
    Ignored,
    Allow,
    Redirect { target: String, reason: BlockReason },
}

/// Where redirect decisions are carried out (the browser tab API).
pub trait RedirectSink {
    fn redirect(
        &mut self,
        tab_id: i64,
        target: &str,
        blocked_url: &str,
        reason: &BlockReason,
    ) -> Result<(), AppError>;
}

pub struct Gatekeeper {
    db: Arc<Mutex<Database>>,
    pause: PauseEvaluator,
}

impl Gatekeeper {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        let pause = PauseEvaluator::new(Arc::clone(&db));
        Self { db, pause }
    }

    /// Decide on one navigation and, on a block, redirect the tab via `sink`.
    ///
    /// Never fails: errors are logged and the navigation is allowed.
    pub fn handle_navigation(
        &self,
        event: &NavigationEvent,
        now: DateTime<Utc>,
        sink: &mut dyn RedirectSink,
    ) -> Decision {
        if event.frame_id != MAIN_FRAME_ID {
            return Decision::Ignored;
        }

        let url = match Url::parse(&event.url) {
            Ok(url) => url,
            Err(e) => {
                debug!("Allowing unparseable navigation URL '{}': {e}", event.url);
                return Decision::Allow;
            }
        };

        let decision = match self.decide(&url, now) {
            Ok(decision) => decision,
            Err(e) => {
                warn!("Navigation check failed for tab {}, allowing: {e}", event.tab_id);
                return Decision::Allow;
            }
        };

        if let Decision::Redirect { target, reason } = &decision {
            if let Err(e) = sink.redirect(event.tab_id, target, url.as_str(), reason) {
                warn!("Redirect of tab {} failed, allowing: {e}", event.tab_id);
                return Decision::Allow;
            }
            info!(
                "Redirected tab {} away from {} ({reason}, reported at {:?})",
                event.tab_id,
                url.as_str(),
                event.timestamp
            );
        }

        decision
    }

    /// Pure decision for an already parsed URL; store errors propagate.
    pub fn decide(&self, url: &Url, now: DateTime<Utc>) -> Result<Decision, AppError> {
        // about:, file: and data: pages have no host and nothing to match.
        let Some(host) = url.host_str() else {
            debug!("No host in {}, allowing", url.scheme());
            return Ok(Decision::Allow);
        };

        if self.pause.is_paused(now)? {
            debug!("Blocking paused, allowing {}", url.as_str());
            return Ok(Decision::Allow);
        }

        let hostname = normalize(host);

        let db = lock_db(&self.db, "Gatekeeper");
        let conn = db.connection();
        let sites = BlockedSite::find_all(conn)?;
        let words = BlockedWord::find_all(conn)?;

        let Some(reason) = BlockReason::from_match(matcher::evaluate(&hostname, &sites, &words))
        else {
            debug!("No rule matched {hostname}");
            return Ok(Decision::Allow);
        };

        let target = Settings::get_or_create(conn, now)?.custom_redirection_url;

        if is_same_destination(url, &target) {
            debug!("{} is the redirect target itself, allowing", url.as_str());
            return Ok(Decision::Allow);
        }

        Ok(Decision::Redirect { target, reason })
    }
}

/// True if `url` already points at `target`, so redirecting would loop.
fn is_same_destination(url: &Url, target: &str) -> bool {
    Url::parse(target).is_ok_and(|target| &target == url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PauseState, SettingsUpdate};
    use crate::test_utils::{at, setup_shared_db};

    #[derive(Default)]
    struct RecordingSink {
        redirects: Vec<(i64, String, String)>,
        fail: bool,
    }

    impl RedirectSink for RecordingSink {
        fn redirect(
            &mut self,
            tab_id: i64,
            target: &str,
            blocked_url: &str,
            _reason: &BlockReason,
        ) -> Result<(), AppError> {
            if self.fail {
                return Err(AppError::Io(std::io::Error::other("tab closed")));
            }
            self.redirects.push((tab_id, target.to_string(), blocked_url.to_string()));
            Ok(())
        }
    }

    fn nav(url: &str) -> NavigationEvent {
        NavigationEvent { tab_id: 7, url: url.to_string(), frame_id: 0, timestamp: None }
    }

    fn seed(db: &Arc<Mutex<Database>>, sites: &[&str], words: &[&str], redirect: &str) {
        let guard = db.lock().unwrap();
        let conn = guard.connection();
        for url in sites {
            BlockedSite::new(url, at(0)).insert(conn).unwrap();
        }
        for word in words {
            BlockedWord::new(word, at(0)).insert(conn).unwrap();
        }
        Settings::update(
            conn,
            &SettingsUpdate { theme: None, custom_redirection_url: Some(redirect.to_string()) },
            at(0),
        )
        .unwrap();
    }

    #[test]
    fn test_redirects_subdomain_of_blocked_site() {
        let (db, _dir) = setup_shared_db();
        seed(&db, &["reddit.com"], &[], "https://focus.example");
        let gatekeeper = Gatekeeper::new(db);
        let mut sink = RecordingSink::default();

        let decision = gatekeeper.handle_navigation(&nav("https://old.reddit.com/r/x"), at(10), &mut sink);

        match decision {
            Decision::Redirect { target, reason: BlockReason::Site { site, .. } } => {
                assert_eq!(target, "https://focus.example");
                assert_eq!(site, "reddit.com");
            }
            other => panic!("expected site redirect, got {other:?}"),
        }
        assert_eq!(
            sink.redirects,
            vec![(7, "https://focus.example".to_string(), "https://old.reddit.com/r/x".to_string())]
        );
    }

    #[test]
    fn test_allows_lookalike_domain() {
        let (db, _dir) = setup_shared_db();
        seed(&db, &["reddit.com"], &[], "https://focus.example");
        let gatekeeper = Gatekeeper::new(db);
        let mut sink = RecordingSink::default();

        let decision = gatekeeper.handle_navigation(&nav("https://redditmetrics.com"), at(10), &mut sink);

        assert_eq!(decision, Decision::Allow);
        assert!(sink.redirects.is_empty());
    }

    #[test]
    fn test_word_match_reports_word() {
        let (db, _dir) = setup_shared_db();
        seed(&db, &[], &["game"], "https://focus.example");
        let gatekeeper = Gatekeeper::new(db);
        let mut sink = RecordingSink::default();

        let decision = gatekeeper.handle_navigation(&nav("https://www.coolmathgames.com/"), at(10), &mut sink);

        assert!(matches!(
            decision,
            Decision::Redirect { reason: BlockReason::Word { ref word, .. }, .. } if word == "game"
        ));
    }

    #[test]
    fn test_subframe_navigation_is_ignored() {
        let (db, _dir) = setup_shared_db();
        seed(&db, &["reddit.com"], &[], "https://focus.example");
        let gatekeeper = Gatekeeper::new(db);
        let mut sink = RecordingSink::default();

        let mut event = nav("https://reddit.com");
        event.frame_id = 3;

        assert_eq!(gatekeeper.handle_navigation(&event, at(10), &mut sink), Decision::Ignored);
        assert!(sink.redirects.is_empty());
    }

    #[test]
    fn test_malformed_url_fails_open() {
        let (db, _dir) = setup_shared_db();
        seed(&db, &["reddit.com"], &["not"], "https://focus.example");
        let gatekeeper = Gatekeeper::new(db);
        let mut sink = RecordingSink::default();

        let decision = gatekeeper.handle_navigation(&nav("not a url\""), at(10), &mut sink);

        assert_eq!(decision, Decision::Allow);
        assert!(sink.redirects.is_empty());
    }

    #[test]
    fn test_hostless_pages_never_match_words() {
        let (db, _dir) = setup_shared_db();
        seed(&db, &[], &["blank", "notes", "html", "file"], "https://focus.example");
        let gatekeeper = Gatekeeper::new(db);
        let mut sink = RecordingSink::default();

        for url in ["about:blank", "file:///Users/me/notes.txt", "data:text/html,<p>notes</p>"] {
            assert_eq!(
                gatekeeper.handle_navigation(&nav(url), at(10), &mut sink),
                Decision::Allow,
                "{url} should be allowed"
            );
        }
        assert!(sink.redirects.is_empty());
    }

    #[test]
    fn test_browser_page_matches_on_host_only() {
        let (db, _dir) = setup_shared_db();
        seed(&db, &[], &["chrome"], "https://focus.example");
        let gatekeeper = Gatekeeper::new(db);
        let mut sink = RecordingSink::default();

        assert_eq!(
            gatekeeper.handle_navigation(&nav("chrome://extensions"), at(10), &mut sink),
            Decision::Allow
        );
        assert!(sink.redirects.is_empty());
    }

    #[test]
    fn test_active_pause_allows_everything() {
        let (db, _dir) = setup_shared_db();
        seed(&db, &["reddit.com"], &[], "https://focus.example");
        PauseEvaluator::new(Arc::clone(&db)).start_pause(at(0), 1.0).unwrap();
        let gatekeeper = Gatekeeper::new(Arc::clone(&db));
        let mut sink = RecordingSink::default();

        assert_eq!(
            gatekeeper.handle_navigation(&nav("https://reddit.com"), at(30), &mut sink),
            Decision::Allow
        );

        // Once the pause runs out blocking resumes and the record is closed.
        assert!(matches!(
            gatekeeper.handle_navigation(&nav("https://reddit.com"), at(61), &mut sink),
            Decision::Redirect { .. }
        ));
        let guard = db.lock().unwrap();
        assert!(PauseState::find_all(guard.connection()).unwrap().iter().all(|p| !p.is_active));
    }

    #[test]
    fn test_store_failure_fails_open() {
        let (db, _dir) = setup_shared_db();
        seed(&db, &["reddit.com"], &[], "https://focus.example");
        db.lock().unwrap().connection().execute_batch("DROP TABLE blocked_sites").unwrap();
        let gatekeeper = Gatekeeper::new(db);
        let mut sink = RecordingSink::default();

        assert_eq!(
            gatekeeper.handle_navigation(&nav("https://reddit.com"), at(10), &mut sink),
            Decision::Allow
        );
        assert!(sink.redirects.is_empty());
    }

    #[test]
    fn test_sink_failure_fails_open() {
        let (db, _dir) = setup_shared_db();
        seed(&db, &["reddit.com"], &[], "https://focus.example");
        let gatekeeper = Gatekeeper::new(db);
        let mut sink = RecordingSink { fail: true, ..RecordingSink::default() };

        assert_eq!(
            gatekeeper.handle_navigation(&nav("https://reddit.com"), at(10), &mut sink),
            Decision::Allow
        );
    }

    #[test]
    fn test_default_redirect_used_when_settings_missing() {
        let (db, _dir) = setup_shared_db();
        {
            let guard = db.lock().unwrap();
            BlockedSite::new("reddit.com", at(0)).insert(guard.connection()).unwrap();
        }
        let gatekeeper = Gatekeeper::new(db);
        let url = Url::parse("https://reddit.com").unwrap();

        match gatekeeper.decide(&url, at(10)).unwrap() {
            Decision::Redirect { target, .. } => {
                assert_eq!(target, crate::constants::DEFAULT_REDIRECTION_URL);
            }
            other => panic!("expected redirect, got {other:?}"),
        }
    }

    #[test]
    fn test_redirect_target_itself_is_never_redirected() {
        let (db, _dir) = setup_shared_db();
        seed(&db, &["focus.example"], &[], "https://focus.example/");
        let gatekeeper = Gatekeeper::new(db);
        let mut sink = RecordingSink::default();

        assert_eq!(
            gatekeeper.handle_navigation(&nav("https://focus.example"), at(10), &mut sink),
            Decision::Allow
        );
        assert!(matches!(
            gatekeeper.handle_navigation(&nav("https://focus.example/other"), at(10), &mut sink),
            Decision::Redirect { .. }
        ));
    }
}
