//! Per-group promotion state, persisted as JSON group ledgers.
//!
//! A ledger file is a JSON object mapping group URL → group record. The
//! whole file is read at the start of a pass, mutated in memory, and written
//! back when the pass finishes with that file — no partial updates, no
//! locking, one writer per file. Entry order is preserved across rewrites
//! (groups are processed in stored order), and record fields we don't model
//! survive the round trip.

use crate::error::PromoError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Promotion state for a single target group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Group {
    /// Group page URL. Assigned from the ledger key on load.
    #[serde(default)]
    pub group_url: String,
    /// Language code used to localize posted content, e.g. "RU" or "EN".
    #[serde(default)]
    pub language: String,
    /// Currency code campaign products are priced in, e.g. "USD".
    #[serde(default)]
    pub currency: String,
    /// Minimum spacing between promotions, e.g. `"1H"` or `"30M"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    /// Timestamp of the last successful promotion, `DD/MM/YY HH:MM`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_promo_sended: Option<String>,
    /// Names of campaign categories already posted to this group.
    #[serde(default)]
    pub promoted_categories: Vec<String>,
    /// Names of events already posted to this group.
    #[serde(default)]
    pub promoted_events: Vec<String>,
    /// Unmodeled record fields, carried through read-modify-write untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Group {
    /// Whether `name` is already in the corresponding promoted set.
    pub fn already_promoted(&self, name: &str, is_event: bool) -> bool {
        let set = if is_event {
            &self.promoted_events
        } else {
            &self.promoted_categories
        };
        set.iter().any(|n| n == name)
    }

    /// Record a successful promotion: append `name` to the corresponding set
    /// (at most once) and stamp the last-promotion time.
    pub fn record_promotion(&mut self, name: &str, is_event: bool, timestamp: String) {
        let set = if is_event {
            &mut self.promoted_events
        } else {
            &mut self.promoted_categories
        };
        if !set.iter().any(|n| n == name) {
            set.push(name.to_string());
        }
        self.last_promo_sended = Some(timestamp);
    }
}

/// An ordered collection of [`Group`] records backed by one ledger file.
#[derive(Debug, Clone, Default)]
pub struct GroupLedger {
    groups: Vec<Group>,
}

impl GroupLedger {
    /// Load a ledger, assigning each group's URL from its mapping key.
    ///
    /// An unreadable or malformed file is fatal for that file only; callers
    /// move on to the next ledger.
    pub fn load(path: &Path) -> Result<Self, PromoError> {
        let raw = fs::read_to_string(path).map_err(|e| PromoError::group_file(path, e))?;
        let entries: Map<String, Value> =
            serde_json::from_str(&raw).map_err(|e| PromoError::group_file(path, e))?;

        let mut groups = Vec::with_capacity(entries.len());
        for (url, record) in entries {
            let mut group: Group = serde_json::from_value(record)
                .map_err(|e| PromoError::group_file(path, format_args!("group {url}: {e}")))?;
            group.group_url = url;
            groups.push(group);
        }
        Ok(Self { groups })
    }

    /// Serialize the full mapping back to `path`, overwriting it.
    pub fn save(&self, path: &Path) -> Result<(), PromoError> {
        let mut entries = Map::new();
        for group in &self.groups {
            let record =
                serde_json::to_value(group).map_err(|e| PromoError::group_file(path, e))?;
            entries.insert(group.group_url.clone(), record);
        }

        let mut text =
            serde_json::to_string_pretty(&entries).map_err(|e| PromoError::group_file(path, e))?;
        text.push('\n');
        fs::write(path, text).map_err(|e| PromoError::group_file(path, e))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups in the file's stored order.
    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Group> {
        self.groups.iter_mut()
    }

    pub fn get(&self, group_url: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.group_url == group_url)
    }

    /// Insert or replace a group, keyed by its URL.
    pub fn upsert(&mut self, group: Group) {
        match self.groups.iter_mut().find(|g| g.group_url == group.group_url) {
            Some(existing) => *existing = group,
            None => self.groups.push(group),
        }
    }
}
