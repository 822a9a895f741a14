//! Campaign and event data: what there is to promote.
//!
//! The engine never owns campaign content — it asks a [`CampaignSource`] for
//! the ordered categories of a named campaign (per group language and
//! currency) and annotates each with its resolved product list right before
//! posting. Events are supplied by the caller as a ready list.

use crate::error::PromoError;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// One product attached to a campaign category.
///
/// Every field is optional: captions render only what is present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluate_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    /// Language the product's caption should be rendered in. Sources stamp
    /// this with the requested language when the record leaves it out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Local path of the product image to upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<PathBuf>,
    /// Local path of the product video, preferred over the image when the
    /// poster runs with video inclusion enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<PathBuf>,
}

/// A promotable content unit from a campaign.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Category {
    /// Category name — the de-duplication key in group ledgers.
    #[serde(default)]
    pub name: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<Product>,
}

/// Localized title and description for one event language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventText {
    pub title: String,
    pub description: String,
}

/// A promotable calendar event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Event name — the de-duplication key in group ledgers.
    pub name: String,
    #[serde(with = "crate::interval::stamp")]
    pub start: NaiveDateTime,
    #[serde(with = "crate::interval::stamp")]
    pub end: NaiveDateTime,
    pub promotional_link: String,
    /// Per-language text, keyed by the same language codes groups carry.
    #[serde(default)]
    pub locales: BTreeMap<String, EventText>,
}

impl Event {
    /// Text for `language`, if the event carries it.
    pub fn localized(&self, language: &str) -> Option<&EventText> {
        self.locales.get(language)
    }
}

/// Either kind of thing a group can be asked to host.
#[derive(Debug, Clone)]
pub enum PromotableItem {
    Category(Category),
    Event(Event),
}

impl PromotableItem {
    /// Display name, also the de-duplication key.
    pub fn name(&self) -> &str {
        match self {
            PromotableItem::Category(c) => &c.name,
            PromotableItem::Event(e) => &e.name,
        }
    }

    pub fn is_event(&self) -> bool {
        matches!(self, PromotableItem::Event(_))
    }
}

/// Supplier of campaign content, per campaign name + language + currency.
#[async_trait]
pub trait CampaignSource: Send + Sync {
    /// The campaign's categories, in source order, for one locale.
    async fn categories(
        &self,
        campaign: &str,
        language: &str,
        currency: &str,
    ) -> Result<Vec<Category>, PromoError>;

    /// The resolved product list for one category of the campaign.
    async fn category_products(
        &self,
        campaign: &str,
        category: &str,
        language: &str,
        currency: &str,
    ) -> Result<Vec<Product>, PromoError>;
}

/// File-backed campaign source.
///
/// Layout: `<campaigns_dir>/<campaign>/<language>_<currency>.json`, a JSON
/// object mapping category name → category record (title, description,
/// products), lowercased locale in the file name. Entry order is preserved.
#[derive(Debug, Clone)]
pub struct JsonCampaignSource {
    campaigns_dir: PathBuf,
}

impl JsonCampaignSource {
    pub fn new(campaigns_dir: impl Into<PathBuf>) -> Self {
        Self {
            campaigns_dir: campaigns_dir.into(),
        }
    }

    fn campaign_path(&self, campaign: &str, language: &str, currency: &str) -> PathBuf {
        self.campaigns_dir.join(campaign).join(format!(
            "{}_{}.json",
            language.to_lowercase(),
            currency.to_lowercase()
        ))
    }

    fn read(&self, campaign: &str, language: &str, currency: &str) -> Result<Vec<Category>, PromoError> {
        let path = self.campaign_path(campaign, language, currency);
        let raw = fs::read_to_string(&path)
            .map_err(|e| PromoError::campaign(campaign, format_args!("{}: {e}", path.display())))?;
        let entries: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&raw)
            .map_err(|e| PromoError::campaign(campaign, format_args!("{}: {e}", path.display())))?;

        let mut categories = Vec::with_capacity(entries.len());
        for (name, record) in entries {
            let mut category: Category = serde_json::from_value(record).map_err(|e| {
                PromoError::campaign(campaign, format_args!("category {name}: {e}"))
            })?;
            category.name = name;
            for product in &mut category.products {
                if product.language.is_none() {
                    product.language = Some(language.to_string());
                }
            }
            categories.push(category);
        }
        Ok(categories)
    }
}

#[async_trait]
impl CampaignSource for JsonCampaignSource {
    async fn categories(
        &self,
        campaign: &str,
        language: &str,
        currency: &str,
    ) -> Result<Vec<Category>, PromoError> {
        self.read(campaign, language, currency)
    }

    async fn category_products(
        &self,
        campaign: &str,
        category: &str,
        language: &str,
        currency: &str,
    ) -> Result<Vec<Product>, PromoError> {
        let categories = self.read(campaign, language, currency)?;
        categories
            .into_iter()
            .find(|c| c.name == category)
            .map(|c| c.products)
            .ok_or_else(|| {
                PromoError::campaign(campaign, format_args!("unknown category {category:?}"))
            })
    }
}

/// In-memory campaign source for tests and demonstrations.
#[derive(Debug, Clone, Default)]
pub struct StaticCampaignSource {
    categories: Vec<Category>,
}

impl StaticCampaignSource {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }
}

#[async_trait]
impl CampaignSource for StaticCampaignSource {
    async fn categories(
        &self,
        _campaign: &str,
        _language: &str,
        _currency: &str,
    ) -> Result<Vec<Category>, PromoError> {
        Ok(self.categories.clone())
    }

    async fn category_products(
        &self,
        campaign: &str,
        category: &str,
        _language: &str,
        _currency: &str,
    ) -> Result<Vec<Product>, PromoError> {
        self.categories
            .iter()
            .find(|c| c.name == category)
            .map(|c| c.products.clone())
            .ok_or_else(|| {
                PromoError::campaign(campaign, format_args!("unknown category {category:?}"))
            })
    }
}

/// Load an events file: a JSON array of [`Event`] records.
pub fn load_events(path: &Path) -> anyhow::Result<Vec<Event>> {
    use anyhow::Context;

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read events file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse events file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_campaign(dir: &Path, campaign: &str, locale: &str, body: &str) {
        let campaign_dir = dir.join(campaign);
        fs::create_dir_all(&campaign_dir).unwrap();
        fs::write(campaign_dir.join(format!("{locale}.json")), body).unwrap();
    }

    #[tokio::test]
    async fn json_source_reads_categories_in_stored_order() {
        let dir = TempDir::new().unwrap();
        write_campaign(
            dir.path(),
            "winter",
            "ru_usd",
            r#"{
                "coats": {
                    "title": "Warm coats",
                    "description": "Up to 50% off",
                    "products": [{"title": "Parka", "sale_price": "49.99"}]
                },
                "boots": {
                    "title": "Snow boots",
                    "description": "New arrivals"
                }
            }"#,
        );

        let source = JsonCampaignSource::new(dir.path());
        let categories = source.categories("winter", "RU", "USD").await.unwrap();

        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["coats", "boots"]);
        assert_eq!(categories[0].products.len(), 1);
        assert!(categories[1].products.is_empty());

        let products = source
            .category_products("winter", "coats", "RU", "USD")
            .await
            .unwrap();
        assert_eq!(products[0].title.as_deref(), Some("Parka"));
        assert_eq!(products[0].language.as_deref(), Some("RU"));
    }

    #[tokio::test]
    async fn missing_campaign_file_is_a_campaign_error() {
        let dir = TempDir::new().unwrap();
        let source = JsonCampaignSource::new(dir.path());

        let err = source.categories("absent", "EN", "EUR").await.unwrap_err();
        assert!(matches!(err, PromoError::Campaign { ref name, .. } if name == "absent"));
    }

    #[tokio::test]
    async fn unknown_category_is_a_campaign_error() {
        let dir = TempDir::new().unwrap();
        write_campaign(dir.path(), "winter", "en_eur", r#"{}"#);

        let source = JsonCampaignSource::new(dir.path());
        let err = source
            .category_products("winter", "coats", "EN", "EUR")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("coats"));
    }

    #[test]
    fn events_parse_with_ledger_timestamps() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.json");
        fs::write(
            &path,
            r#"[{
                "name": "launch_party",
                "start": "20/06/24 18:00",
                "end": "20/06/24 22:00",
                "promotional_link": "https://example.com/party",
                "locales": {
                    "EN": {"title": "Launch party", "description": "Join us!"},
                    "RU": {"title": "Вечеринка", "description": "Приходите!"}
                }
            }]"#,
        )
        .unwrap();

        let events = load_events(&path).unwrap();
        assert_eq!(events.len(), 1);

        let event = &events[0];
        assert_eq!(crate::interval::format_timestamp(event.start), "20/06/24 18:00");
        assert_eq!(event.localized("RU").unwrap().title, "Вечеринка");
        assert!(event.localized("DE").is_none());
    }

    #[test]
    fn item_names_come_from_the_right_variant() {
        let category = PromotableItem::Category(Category {
            name: "sale".into(),
            ..Category::default()
        });
        assert_eq!(category.name(), "sale");
        assert!(!category.is_event());
    }
}
