//! Interval policy: how long a group must rest between promotions.
//!
//! Intervals are stored as short tokens (`"1H"`, `"30M"`) and the last
//! promotion time as `DD/MM/YY HH:MM`, both kept as plain strings in the
//! ledger and parsed at decision time. A malformed token or timestamp never
//! aborts a pass — the group is treated as not due, so the worst failure
//! mode is a skipped post, not a duplicate one.

use crate::error::PromoError;
use crate::groups::Group;
use chrono::{NaiveDateTime, TimeDelta};
use tracing::warn;

/// Persisted timestamp layout for `last_promo_sended` and event times.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%y %H:%M";

/// Parse an interval token of the form `"<integer><H|M>"`.
pub fn parse_interval(token: &str) -> Result<TimeDelta, PromoError> {
    fn count(digits: &str) -> Option<i64> {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    let delta = if let Some(digits) = token.strip_suffix('H') {
        count(digits).and_then(TimeDelta::try_hours)
    } else if let Some(digits) = token.strip_suffix('M') {
        count(digits).and_then(TimeDelta::try_minutes)
    } else {
        None
    };

    delta.ok_or_else(|| PromoError::InvalidInterval(token.to_string()))
}

/// Parse a ledger timestamp (`DD/MM/YY HH:MM`).
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, PromoError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|source| {
        PromoError::Timestamp {
            value: value.to_string(),
            source,
        }
    })
}

/// Format a timestamp the way the ledger stores it.
pub fn format_timestamp(value: NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// Serde codec for fields stored in the ledger timestamp layout.
///
/// Usage: `#[serde(with = "crate::interval::stamp")]`.
pub mod stamp {
    use super::{TIMESTAMP_FORMAT, format_timestamp};
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&format_timestamp(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(de)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(D::Error::custom)
    }
}

/// Whether enough time has passed for the next promotion to `group`.
///
/// Never promoted ⇒ due. An absent interval counts as zero (due as soon as
/// the group has been touched once). Malformed stored values are logged and
/// the group is reported not due.
pub fn is_due(group: &Group, now: NaiveDateTime) -> bool {
    let Some(last_promo) = group.last_promo_sended.as_deref() else {
        return true;
    };

    let last_promo = match parse_timestamp(last_promo) {
        Ok(t) => t,
        Err(e) => {
            warn!(group = %group.group_url, error = %e, "unparseable last promotion time; skipping group");
            return false;
        }
    };

    let required = match group.interval.as_deref() {
        Some(token) => match parse_interval(token) {
            Ok(d) => d,
            Err(e) => {
                warn!(group = %group.group_url, error = %e, "unparseable interval; skipping group");
                return false;
            }
        },
        None => TimeDelta::zero(),
    };

    now - last_promo >= required
}
