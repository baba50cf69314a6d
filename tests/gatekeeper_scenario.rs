//! End-to-end blocking scenario through the public API.

use blockie_lib::commands;
use blockie_lib::error::AppError;
use blockie_lib::gatekeeper::{BlockReason, Decision, Gatekeeper, NavigationEvent, RedirectSink};
use blockie_lib::open_database;
use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;
use tempfile::tempdir;

#[derive(Default)]
struct Tabs {
    redirected: Vec<(i64, String)>,
}

impl RedirectSink for Tabs {
    fn redirect(&mut self, tab_id: i64, target: &str, _blocked_url: &str, _reason: &BlockReason) -> Result<(), AppError> {
        self.redirected.push((tab_id, target.to_string()));
        Ok(())
    }
}

fn navigation(tab_id: i64, url: &str) -> NavigationEvent {
    NavigationEvent { tab_id, url: url.to_string(), frame_id: 0, timestamp: None }
}

#[test]
fn blocks_sites_and_words_until_paused() {
    let dir = tempdir().unwrap();
    let db = open_database(&dir.path().join("blockie.db")).unwrap();
    let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

    commands::add_site(&db, "reddit.com", t0).unwrap();
    commands::add_word(&db, "game", t0).unwrap();
    commands::update_redirection_url(&db, "https://focus.example", t0).unwrap();

    let gatekeeper = Gatekeeper::new(Arc::clone(&db));
    let mut tabs = Tabs::default();

    let decision = gatekeeper.handle_navigation(&navigation(1, "https://old.reddit.com/r/x"), t0, &mut tabs);
    assert!(matches!(decision, Decision::Redirect { reason: BlockReason::Site { .. }, .. }));

    let decision = gatekeeper.handle_navigation(&navigation(2, "https://coolmathgames.com/"), t0, &mut tabs);
    assert!(matches!(decision, Decision::Redirect { reason: BlockReason::Word { .. }, .. }));

    assert_eq!(
        gatekeeper.handle_navigation(&navigation(3, "https://redditmetrics.com"), t0, &mut tabs),
        Decision::Allow
    );
    assert_eq!(
        tabs.redirected,
        vec![(1, "https://focus.example".to_string()), (2, "https://focus.example".to_string())]
    );

    commands::start_pause(&db, 1.0, t0).unwrap();
    let during = t0 + Duration::seconds(30);
    assert_eq!(
        gatekeeper.handle_navigation(&navigation(4, "https://reddit.com"), during, &mut tabs),
        Decision::Allow
    );

    let after = t0 + Duration::seconds(61);
    assert!(matches!(
        gatekeeper.handle_navigation(&navigation(5, "https://reddit.com"), after, &mut tabs),
        Decision::Redirect { .. }
    ));
    assert!(!commands::pause_status(&db, after).unwrap().paused);
}

#[test]
fn records_survive_reopening_the_database() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("blockie.db");
    let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

    {
        let db = open_database(&path).unwrap();
        commands::add_site(&db, "youtube.com", t0).unwrap();
    }

    let db = open_database(&path).unwrap();
    let sites = commands::list_sites(&db, None).unwrap();
    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0].url, "https://youtube.com");
}
