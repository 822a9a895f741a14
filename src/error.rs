//! Error types shared across the promotion pipeline.
//!
//! The taxonomy mirrors how failures are handled: interval/timestamp parse
//! errors are caught by the interval policy (fail safe, group skipped),
//! group-file errors are fatal for that file only, and campaign/locale
//! errors skip the affected group or item while the pass continues.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while scheduling and recording promotions.
#[derive(Error, Debug)]
pub enum PromoError {
    /// Interval token did not match `"<integer><H|M>"`.
    #[error("invalid interval format: {0:?}")]
    InvalidInterval(String),

    /// A stored `last_promo_sended` value could not be parsed.
    #[error("invalid timestamp {value:?}: {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A group ledger file could not be read or deserialized.
    #[error("group file {}: {message}", path.display())]
    GroupFile { path: PathBuf, message: String },

    /// Campaign data for a language/currency pair is missing or malformed.
    #[error("campaign {name:?}: {message}")]
    Campaign { name: String, message: String },

    /// An event does not carry text for the group's language.
    #[error("event {event:?} has no text for language {language:?}")]
    MissingLocale { event: String, language: String },
}

impl PromoError {
    pub(crate) fn group_file(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        Self::GroupFile {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    pub(crate) fn campaign(name: &str, err: impl std::fmt::Display) -> Self {
        Self::Campaign {
            name: name.to_string(),
            message: err.to_string(),
        }
    }
}
