//! Publishing seam. The engine never touches a browser; it hands fully
//! prepared content to a [`Poster`] and treats any `Err` as a recoverable
//! publish failure (log, skip, retry on a later pass).

use crate::campaigns::{Category, Event, Product};
use crate::captions::{self, LabelCatalog};
use crate::error::PromoError;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::path::Path;
use tracing::{debug, info};

/// The merged view handed to [`Poster::post_event`]: event timing and link
/// plus text already resolved for one group's language.
#[derive(Debug, Clone)]
pub struct EventPost {
    pub name: String,
    pub title: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub promotional_link: String,
}

impl EventPost {
    /// Merge an event's timing and link with its text for `language`.
    pub fn resolve(event: &Event, language: &str) -> Result<Self, PromoError> {
        let text = event.localized(language).ok_or_else(|| PromoError::MissingLocale {
            event: event.name.clone(),
            language: language.to_string(),
        })?;
        Ok(Self {
            name: event.name.clone(),
            title: text.title.clone(),
            description: text.description.clone(),
            start: event.start,
            end: event.end,
            promotional_link: event.promotional_link.clone(),
        })
    }
}

/// Trait for publish-surface implementations.
#[async_trait]
pub trait Poster: Send + Sync {
    /// Get the poster name
    fn name(&self) -> &str;

    /// Open `url` and wait until the publish surface is usable.
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Publish one category post with its product media and captions.
    async fn post_category(&mut self, category: &Category, include_video: bool) -> Result<()>;

    /// Publish one calendar event.
    async fn post_event(&mut self, post: &EventPost) -> Result<()>;

    /// Release the underlying driver.
    async fn close(&mut self) -> Result<()>;
}

/// Media to upload for one product: the video when video inclusion is on and
/// the product carries one, otherwise the image.
pub fn media_path(product: &Product, include_video: bool) -> Option<&Path> {
    match &product.video {
        Some(video) if include_video => Some(video),
        _ => product.image.as_deref(),
    }
}

/// Poster that renders every post through the caption composer and logs it
/// instead of driving a browser. Always succeeds, so the whole engine can be
/// exercised end-to-end without a driver.
pub struct DryRunPoster {
    catalog: LabelCatalog,
    location: Option<String>,
}

impl DryRunPoster {
    pub fn new(catalog: LabelCatalog) -> Self {
        Self {
            catalog,
            location: None,
        }
    }
}

#[async_trait]
impl Poster for DryRunPoster {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn navigate(&mut self, url: &str) -> Result<()> {
        debug!(url, "dry-run navigate");
        self.location = Some(url.to_string());
        Ok(())
    }

    async fn post_category(&mut self, category: &Category, include_video: bool) -> Result<()> {
        info!(
            category = %category.name,
            at = self.location.as_deref().unwrap_or("-"),
            body = %captions::post_body(category),
            "dry-run post"
        );
        for product in &category.products {
            let language = product
                .language
                .as_deref()
                .unwrap_or(&self.catalog.default_language);
            let caption = captions::product_caption(product, language, &self.catalog);
            match media_path(product, include_video) {
                Some(path) => debug!(media = %path.display(), caption = %caption, "dry-run media"),
                None => debug!(caption = %caption, "dry-run media (none)"),
            }
        }
        Ok(())
    }

    async fn post_event(&mut self, post: &EventPost) -> Result<()> {
        info!(
            event = %post.name,
            title = %post.title,
            start = %crate::interval::format_timestamp(post.start),
            body = %captions::event_body(post),
            "dry-run event"
        );
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.location = None;
        Ok(())
    }
}
