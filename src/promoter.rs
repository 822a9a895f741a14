//! Promotion engine.
//!
//! Orchestrates a pass: for each group ledger, for each group in stored
//! order, check eligibility, fetch candidate items, post the ones not yet
//! promoted, and write the ledger back. A failed post is logged and left
//! un-promoted; the next scheduled pass is the retry mechanism.

use crate::campaigns::{CampaignSource, Event, PromotableItem};
use crate::groups::{Group, GroupLedger};
use crate::interval::{format_timestamp, is_due};
use crate::poster::{EventPost, Poster};
use anyhow::Result;
use chrono::Local;
use std::fmt;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::form_urlencoded;

const EVENT_CREATE_BASE: &str = "https://www.facebook.com/events/create/";
const EVENT_ACONTEXT: &str = r#"{"event_action_history":[{"surface":"group"},{"mechanism":"upcoming_events_for_group","surface":"group"}],"ref_notif_type":null}"#;

/// Event-creation URL for a group: the trailing identifier segment of the
/// group URL rides along as `group_id`, together with the fixed tracking
/// parameters the platform expects.
pub fn event_creation_url(group_url: &str) -> String {
    let group_id = group_url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("acontext", EVENT_ACONTEXT)
        .append_pair("dialog_entry_point", "group_events_tab")
        .append_pair("group_id", group_id)
        .finish();
    format!("{EVENT_CREATE_BASE}?{query}")
}

/// Counters for one promotion pass, reported by the CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub groups_seen: usize,
    pub posted: usize,
    pub interval_skips: usize,
    pub duplicate_skips: usize,
    pub failures: usize,
}

impl PassSummary {
    pub fn merge(&mut self, other: PassSummary) {
        self.groups_seen += other.groups_seen;
        self.posted += other.posted;
        self.interval_skips += other.interval_skips;
        self.duplicate_skips += other.duplicate_skips;
        self.failures += other.failures;
    }
}

impl fmt::Display for PassSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} groups, {} posted, {} interval skips, {} duplicates, {} failures",
            self.groups_seen, self.posted, self.interval_skips, self.duplicate_skips, self.failures
        )
    }
}

/// Drives promotions into groups while avoiding duplicates.
pub struct Promoter {
    poster: Box<dyn Poster>,
    source: Box<dyn CampaignSource>,
    include_video: bool,
    cancel: CancellationToken,
}

impl Promoter {
    pub fn new(poster: Box<dyn Poster>, source: Box<dyn CampaignSource>) -> Self {
        Self {
            poster,
            source,
            include_video: false,
            cancel: CancellationToken::new(),
        }
    }

    /// Include product videos in posts when a product carries one.
    pub fn with_include_video(mut self, include_video: bool) -> Self {
        self.include_video = include_video;
        self
    }

    /// Token that aborts the run between groups; the in-flight ledger is
    /// left unsaved, ledgers already written stay durable.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Post one item to one group. Returns true only for a new, successful
    /// promotion; the group record is mutated (promoted set + timestamp) on
    /// success and left untouched otherwise.
    pub async fn promote(&mut self, group: &mut Group, item: &PromotableItem) -> bool {
        let item_name = item.name().to_string();
        let is_event = item.is_event();

        if group.already_promoted(&item_name, is_event) {
            debug!(group = %group.group_url, item = %item_name, "already promoted");
            return false;
        }

        let target = if is_event {
            event_creation_url(&group.group_url)
        } else {
            group.group_url.clone()
        };
        if let Err(e) = self.poster.navigate(&target).await {
            warn!(group = %group.group_url, item = %item_name, error = %e, "navigation failed");
            return false;
        }

        let posted = match item {
            PromotableItem::Category(category) => {
                self.poster.post_category(category, self.include_video).await
            }
            PromotableItem::Event(event) => match EventPost::resolve(event, &group.language) {
                Ok(post) => self.poster.post_event(&post).await,
                Err(e) => {
                    warn!(group = %group.group_url, error = %e, "event skipped");
                    return false;
                }
            },
        };

        if let Err(e) = posted {
            warn!(group = %group.group_url, item = %item_name, error = %e, "posting failed");
            return false;
        }

        group.record_promotion(
            &item_name,
            is_event,
            format_timestamp(Local::now().naive_local()),
        );
        info!(group = %group.group_url, item = %item_name, "promoted");
        true
    }

    /// One pass over `group_files` for a campaign or an event list.
    ///
    /// Groups are visited in each file's stored order; items in source
    /// order. Event runs bypass the interval policy. Each ledger is written
    /// back after its last group, whether or not anything was posted.
    pub async fn process_groups(
        &mut self,
        campaign: Option<&str>,
        events: Option<&[Event]>,
        is_event: bool,
        group_files: &[PathBuf],
    ) -> PassSummary {
        let mut summary = PassSummary::default();

        if campaign.is_none() && events.is_none() {
            debug!("nothing to promote");
            return summary;
        }

        'files: for path in group_files {
            if self.cancel.is_cancelled() {
                warn!("promotion pass cancelled");
                break;
            }

            let mut ledger = match GroupLedger::load(path) {
                Ok(ledger) => ledger,
                Err(e) => {
                    error!(error = %e, "skipping group file");
                    summary.failures += 1;
                    continue;
                }
            };
            debug!(file = %path.display(), groups = ledger.len(), "ledger loaded");

            for group in ledger.iter_mut() {
                if self.cancel.is_cancelled() {
                    warn!(file = %path.display(), "cancelled; in-flight ledger not saved");
                    break 'files;
                }

                summary.groups_seen += 1;

                if !is_event && !is_due(group, Local::now().naive_local()) {
                    debug!(group = %group.group_url, "interval not elapsed");
                    summary.interval_skips += 1;
                    continue;
                }

                let items = match self.candidate_items(campaign, events, is_event, group).await {
                    Ok(items) => items,
                    Err(e) => {
                        error!(group = %group.group_url, error = %e, "no campaign data; group skipped");
                        summary.failures += 1;
                        continue;
                    }
                };

                for item in items {
                    let duplicate = group.already_promoted(item.name(), item.is_event());
                    if self.promote(group, &item).await {
                        summary.posted += 1;
                    } else if duplicate {
                        summary.duplicate_skips += 1;
                    } else {
                        summary.failures += 1;
                    }
                }
            }

            if let Err(e) = ledger.save(path) {
                error!(error = %e, "failed to save group file");
                summary.failures += 1;
            }
        }

        summary
    }

    /// Run one `process_groups` pass per campaign, in order, never
    /// interleaved.
    pub async fn run_campaigns(
        &mut self,
        campaigns: &[String],
        group_files: &[PathBuf],
    ) -> PassSummary {
        let mut total = PassSummary::default();
        for campaign in campaigns {
            info!(campaign = %campaign, "processing campaign");
            let summary = self
                .process_groups(Some(campaign), None, false, group_files)
                .await;
            info!(campaign = %campaign, %summary, "campaign pass finished");
            total.merge(summary);
        }
        total
    }

    /// Promote `events` to every group; the interval policy does not apply.
    pub async fn run_events(&mut self, events: &[Event], group_files: &[PathBuf]) -> PassSummary {
        self.process_groups(None, Some(events), true, group_files)
            .await
    }

    /// Release the poster's underlying driver.
    pub async fn stop(&mut self) -> Result<()> {
        self.poster.close().await
    }

    async fn candidate_items(
        &self,
        campaign: Option<&str>,
        events: Option<&[Event]>,
        is_event: bool,
        group: &Group,
    ) -> Result<Vec<PromotableItem>, crate::error::PromoError> {
        if is_event {
            let events = events.unwrap_or_default();
            return Ok(events.iter().cloned().map(PromotableItem::Event).collect());
        }

        let Some(campaign) = campaign else {
            return Ok(Vec::new());
        };

        let mut categories = self
            .source
            .categories(campaign, &group.language, &group.currency)
            .await?;
        for category in &mut categories {
            category.products = self
                .source
                .category_products(campaign, &category.name, &group.language, &group.currency)
                .await?;
        }
        Ok(categories.into_iter().map(PromotableItem::Category).collect())
    }
}
