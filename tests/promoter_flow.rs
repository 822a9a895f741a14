//! Full promotion passes over real ledger files on disk.
//!
//! These tests drive the engine through `run_campaigns` / `run_events`
//! exactly as the CLI does, with an in-memory campaign source and a
//! recording poster in place of a browser driver.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Local, TimeDelta};
use promocast::campaigns::{Category, Event, EventText, Product, StaticCampaignSource};
use promocast::groups::GroupLedger;
use promocast::interval::{format_timestamp, parse_timestamp};
use promocast::poster::{EventPost, Poster};
use promocast::promoter::Promoter;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

// ── Test posters ────────────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingPoster {
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Poster for RecordingPoster {
    fn name(&self) -> &str {
        "recording"
    }

    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.log.lock().unwrap().push(format!("navigate {url}"));
        Ok(())
    }

    async fn post_category(&mut self, category: &Category, include_video: bool) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("category {} video={include_video}", category.name));
        Ok(())
    }

    async fn post_event(&mut self, post: &EventPost) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("event {} {}", post.name, post.title));
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.log.lock().unwrap().push("close".to_string());
        Ok(())
    }
}

/// Cancels the shared token while handling its n-th category post.
struct CancellingPoster {
    cancel: CancellationToken,
    cancel_on_post: usize,
    posts: usize,
}

#[async_trait]
impl Poster for CancellingPoster {
    fn name(&self) -> &str {
        "cancelling"
    }

    async fn navigate(&mut self, _url: &str) -> Result<()> {
        Ok(())
    }

    async fn post_category(&mut self, _category: &Category, _include_video: bool) -> Result<()> {
        self.posts += 1;
        if self.posts == self.cancel_on_post {
            self.cancel.cancel();
        }
        Ok(())
    }

    async fn post_event(&mut self, _post: &EventPost) -> Result<()> {
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

struct FailingPoster;

#[async_trait]
impl Poster for FailingPoster {
    fn name(&self) -> &str {
        "failing"
    }

    async fn navigate(&mut self, _url: &str) -> Result<()> {
        Ok(())
    }

    async fn post_category(&mut self, _category: &Category, _include_video: bool) -> Result<()> {
        anyhow::bail!("driver lost")
    }

    async fn post_event(&mut self, _post: &EventPost) -> Result<()> {
        anyhow::bail!("driver lost")
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

// ── Fixtures ────────────────────────────────────────────────────────────────

fn sale_category() -> Category {
    Category {
        name: "spring_sale".to_string(),
        title: "Spring sale".to_string(),
        description: "Fresh discounts all week".to_string(),
        products: vec![Product {
            title: Some("Garden chair".to_string()),
            sale_price: Some("$12.99".to_string()),
            discount: Some("30%".to_string()),
            promotion_link: Some("https://shop.example.com/chair".to_string()),
            ..Product::default()
        }],
    }
}

fn launch_event() -> Event {
    let mut locales = BTreeMap::new();
    locales.insert(
        "EN".to_string(),
        EventText {
            title: "Launch party".to_string(),
            description: "Come celebrate with us".to_string(),
        },
    );
    Event {
        name: "launch_party".to_string(),
        start: parse_timestamp("20/06/26 18:00").unwrap(),
        end: parse_timestamp("20/06/26 22:00").unwrap(),
        promotional_link: "https://shop.example.com/launch".to_string(),
        locales,
    }
}

fn recording_promoter(log: Arc<Mutex<Vec<String>>>) -> Promoter {
    Promoter::new(
        Box::new(RecordingPoster { log }),
        Box::new(StaticCampaignSource::new(vec![sale_category()])),
    )
}

/// Write a ledger with one record per URL, optionally gated by an interval
/// and pre-stamped `promoted_ago` in the past.
fn seed_ledger(path: &Path, urls: &[&str], interval: Option<&str>, promoted_ago: Option<TimeDelta>) {
    let mut entries = serde_json::Map::new();
    for url in urls {
        let mut record = serde_json::Map::new();
        record.insert("language".to_string(), "EN".into());
        record.insert("currency".to_string(), "USD".into());
        if let Some(token) = interval {
            record.insert("interval".to_string(), token.into());
        }
        if let Some(ago) = promoted_ago {
            let stamp = format_timestamp(Local::now().naive_local() - ago);
            record.insert("last_promo_sended".to_string(), stamp.into());
        }
        record.insert("promoted_categories".to_string(), serde_json::json!([]));
        record.insert("promoted_events".to_string(), serde_json::json!([]));
        entries.insert((*url).to_string(), serde_json::Value::Object(record));
    }
    fs::write(path, serde_json::to_string_pretty(&entries).unwrap()).unwrap();
}

// ── Campaign passes ─────────────────────────────────────────────────────────

#[tokio::test]
async fn first_pass_posts_and_second_pass_skips_duplicates() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("groups.json");
    seed_ledger(
        &path,
        &[
            "https://example.com/groups/1",
            "https://example.com/groups/2",
        ],
        None,
        None,
    );

    let log = Arc::new(Mutex::new(Vec::new()));
    let mut promoter = recording_promoter(log.clone());
    let files = vec![path.clone()];
    let campaigns = vec!["spring".to_string()];

    let first = promoter.run_campaigns(&campaigns, &files).await;
    assert_eq!(first.groups_seen, 2);
    assert_eq!(first.posted, 2);
    assert_eq!(first.duplicate_skips, 0);
    assert_eq!(first.failures, 0);

    let ledger = GroupLedger::load(&path).unwrap();
    for group in ledger.iter() {
        assert_eq!(group.promoted_categories, ["spring_sale"]);
        let stamp = group.last_promo_sended.as_deref().unwrap();
        parse_timestamp(stamp).unwrap();
    }

    let second = promoter.run_campaigns(&campaigns, &files).await;
    assert_eq!(second.posted, 0);
    assert_eq!(second.duplicate_skips, 2);

    let posts = log
        .lock()
        .unwrap()
        .iter()
        .filter(|line| line.starts_with("category"))
        .count();
    assert_eq!(posts, 2);
}

#[tokio::test]
async fn interval_gates_each_file_independently() {
    let dir = TempDir::new().unwrap();
    let due = dir.path().join("due.json");
    let resting = dir.path().join("resting.json");
    seed_ledger(&due, &["https://example.com/groups/due"], Some("1H"), None);
    seed_ledger(
        &resting,
        &["https://example.com/groups/resting"],
        Some("1H"),
        Some(TimeDelta::minutes(10)),
    );

    let log = Arc::new(Mutex::new(Vec::new()));
    let mut promoter = recording_promoter(log);
    let summary = promoter
        .run_campaigns(&["spring".to_string()], &[due.clone(), resting.clone()])
        .await;

    assert_eq!(summary.groups_seen, 2);
    assert_eq!(summary.posted, 1);
    assert_eq!(summary.interval_skips, 1);

    let posted = GroupLedger::load(&due).unwrap();
    assert_eq!(
        posted.iter().next().unwrap().promoted_categories,
        ["spring_sale"]
    );

    let untouched = GroupLedger::load(&resting).unwrap();
    let group = untouched.iter().next().unwrap();
    assert!(group.promoted_categories.is_empty());
}

#[tokio::test]
async fn failing_driver_records_nothing_in_the_ledger() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("groups.json");
    seed_ledger(&path, &["https://example.com/groups/1"], None, None);

    let mut promoter = Promoter::new(
        Box::new(FailingPoster),
        Box::new(StaticCampaignSource::new(vec![sale_category()])),
    );
    let summary = promoter
        .run_campaigns(&["spring".to_string()], &[path.clone()])
        .await;

    assert_eq!(summary.posted, 0);
    assert_eq!(summary.failures, 1);

    let ledger = GroupLedger::load(&path).unwrap();
    let group = ledger.iter().next().unwrap();
    assert!(group.promoted_categories.is_empty());
    assert!(group.last_promo_sended.is_none());
}

// ── Event passes ────────────────────────────────────────────────────────────

#[tokio::test]
async fn event_pass_ignores_interval_and_tracks_events_separately() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("groups.json");
    // Stamped moments ago with a long interval: a campaign pass would skip.
    seed_ledger(
        &path,
        &["https://example.com/groups/1"],
        Some("12H"),
        Some(TimeDelta::minutes(1)),
    );

    let log = Arc::new(Mutex::new(Vec::new()));
    let mut promoter = recording_promoter(log.clone());
    let summary = promoter
        .run_events(&[launch_event()], std::slice::from_ref(&path))
        .await;

    assert_eq!(summary.posted, 1);
    assert_eq!(summary.interval_skips, 0);

    let ledger = GroupLedger::load(&path).unwrap();
    let group = ledger.iter().next().unwrap();
    assert_eq!(group.promoted_events, ["launch_party"]);
    assert!(group.promoted_categories.is_empty());

    let lines = log.lock().unwrap();
    assert!(lines.contains(&"event launch_party Launch party".to_string()));
}

#[tokio::test]
async fn category_and_event_promotions_share_one_ledger() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("groups.json");
    seed_ledger(&path, &["https://example.com/groups/1"], None, None);

    let log = Arc::new(Mutex::new(Vec::new()));
    let mut promoter = recording_promoter(log);
    let files = vec![path.clone()];

    promoter.run_campaigns(&["spring".to_string()], &files).await;
    promoter.run_events(&[launch_event()], &files).await;

    let ledger = GroupLedger::load(&path).unwrap();
    let group = ledger.iter().next().unwrap();
    assert_eq!(group.promoted_categories, ["spring_sale"]);
    assert_eq!(group.promoted_events, ["launch_party"]);
}

// ── Cancellation ────────────────────────────────────────────────────────────

#[tokio::test]
async fn cancellation_between_files_keeps_completed_ledgers() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.json");
    let second = dir.path().join("second.json");
    seed_ledger(&first, &["https://example.com/groups/1"], None, None);
    seed_ledger(
        &second,
        &[
            "https://example.com/groups/2",
            "https://example.com/groups/3",
        ],
        None,
        None,
    );

    let cancel = CancellationToken::new();
    let poster = CancellingPoster {
        cancel: cancel.clone(),
        cancel_on_post: 2,
        posts: 0,
    };
    let mut promoter = Promoter::new(
        Box::new(poster),
        Box::new(StaticCampaignSource::new(vec![sale_category()])),
    )
    .with_cancellation(cancel.clone());

    let summary = promoter
        .run_campaigns(&["spring".to_string()], &[first.clone(), second.clone()])
        .await;

    assert!(cancel.is_cancelled());
    // Both posts went out before the token was observed.
    assert_eq!(summary.posted, 2);

    // The completed first file is durable.
    let saved = GroupLedger::load(&first).unwrap();
    assert_eq!(
        saved.iter().next().unwrap().promoted_categories,
        ["spring_sale"]
    );

    // The in-flight second file was never written back.
    let unsaved = GroupLedger::load(&second).unwrap();
    for group in unsaved.iter() {
        assert!(group.promoted_categories.is_empty());
        assert!(group.last_promo_sended.is_none());
    }
}
