//! Post body and media caption composition.
//!
//! Everything the poster types into a publish surface is rendered here, so
//! the exact text is testable without a driver. Captions are localized via a
//! [`LabelCatalog`] and laid out for the language's text direction.

use crate::campaigns::{Category, Product};
use crate::poster::EventPost;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use strum::Display;

/// Layout direction for a language's captions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum TextDirection {
    Ltr,
    Rtl,
}

/// Field labels for one language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelSet {
    pub original_price: String,
    pub sale_price: String,
    pub discount: String,
    pub evaluate_rate: String,
    pub promotion_link: String,
    pub tags: String,
    pub copyright: String,
}

impl Default for LabelSet {
    fn default() -> Self {
        Self {
            original_price: "Original price".into(),
            sale_price: "Sale price".into(),
            discount: "Discount".into(),
            evaluate_rate: "Rating".into(),
            promotion_link: "Link".into(),
            tags: "Tags".into(),
            copyright: "Posted by promocast".into(),
        }
    }
}

/// Localized labels plus per-language text direction, loaded from one JSON
/// file. Languages absent from `labels` fall back to `default_language`, and
/// finally to built-in English labels, so lookups are total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelCatalog {
    #[serde(default = "LabelCatalog::default_language")]
    pub default_language: String,
    /// Languages laid out right-to-left; everything else is LTR.
    #[serde(default)]
    pub directions: BTreeMap<String, TextDirection>,
    #[serde(default)]
    pub labels: BTreeMap<String, LabelSet>,
    #[serde(skip)]
    fallback: LabelSet,
}

impl Default for LabelCatalog {
    fn default() -> Self {
        Self {
            default_language: Self::default_language(),
            directions: BTreeMap::new(),
            labels: BTreeMap::new(),
            fallback: LabelSet::default(),
        }
    }
}

impl LabelCatalog {
    fn default_language() -> String {
        "EN".into()
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read label catalog {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse label catalog {}", path.display()))
    }

    pub fn direction(&self, language: &str) -> TextDirection {
        self.directions
            .get(language)
            .copied()
            .unwrap_or(TextDirection::Ltr)
    }

    pub fn labels(&self, language: &str) -> &LabelSet {
        self.labels
            .get(language)
            .or_else(|| self.labels.get(&self.default_language))
            .unwrap_or(&self.fallback)
    }
}

/// Canonical post body for a category: title and description, newline apart.
pub fn post_body(category: &Category) -> String {
    format!("{}\n{}", category.title, category.description)
}

/// Caption for one product's media, localized and laid out for `language`.
///
/// Fields render only when present. The discount and sale price form a pair
/// that is dropped entirely at a `0%` discount, and a `0.0%` rating is
/// dropped. The copyright line closes every caption.
pub fn product_caption(product: &Product, language: &str, catalog: &LabelCatalog) -> String {
    let labels = catalog.labels(language);
    let mut message = String::new();

    match catalog.direction(language) {
        TextDirection::Ltr => {
            if let Some(title) = &product.title {
                message.push_str(&format!("{title}\n"));
            }
            if let Some(price) = &product.original_price {
                message.push_str(&format!("{}: {price}\n", labels.original_price));
            }
            if let (Some(sale), Some(discount)) = (&product.sale_price, &product.discount) {
                if discount != "0%" {
                    message.push_str(&format!("{}: {discount}\n", labels.discount));
                    message.push_str(&format!("{}: {sale}\n", labels.sale_price));
                }
            }
            if let Some(rate) = &product.evaluate_rate {
                if rate != "0.0%" {
                    message.push_str(&format!("{}: {rate}\n", labels.evaluate_rate));
                }
            }
            if let Some(link) = &product.promotion_link {
                message.push_str(&format!("{}: {link}\n", labels.promotion_link));
            }
            if let Some(tags) = &product.tags {
                message.push_str(&format!("{}: {tags}\n", labels.tags));
            }
            message.push_str(&labels.copyright);
        }
        TextDirection::Rtl => {
            if let Some(title) = &product.title {
                message.push_str(&format!("\n{title}"));
            }
            if let Some(price) = &product.original_price {
                message.push_str(&format!("\n{price} :{}", labels.original_price));
            }
            if let (Some(sale), Some(discount)) = (&product.sale_price, &product.discount) {
                if discount != "0%" {
                    message.push_str(&format!("\n{discount} :{}", labels.discount));
                    message.push_str(&format!("\n{sale} :{}", labels.sale_price));
                }
            }
            if let Some(rate) = &product.evaluate_rate {
                if rate != "0.0%" {
                    message.push_str(&format!("\n{rate} :{}", labels.evaluate_rate));
                }
            }
            if let Some(link) = &product.promotion_link {
                message.push_str(&format!("\n{link} :{}", labels.promotion_link));
            }
            if let Some(tags) = &product.tags {
                message.push_str(&format!("\n{tags} :{}", labels.tags));
            }
            message.push_str(&format!("\n{}", labels.copyright));
        }
    }

    message
}

/// Body typed into the event description field: localized description with
/// the promotional link on its own line.
pub fn event_body(post: &EventPost) -> String {
    format!("{}\n{}", post.description, post.promotional_link)
}
