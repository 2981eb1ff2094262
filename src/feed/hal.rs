//! HAL+JSON feed pages.
//!
//! A page looks like:
//!
//! ```json
//! {
//!   "_links": { "self": { "href": "/feed?page=1" }, "next": { "href": "/feed?page=2" } },
//!   "_embedded": { "entries": [ { "_id": "42", "_published": "18/10/2026 09:15:00" } ] }
//! }
//! ```

use super::types::*;
use super::PageParser;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

/// Timestamp format the feed publishes entries with (`dd/MM/yyyy HH:mm:ss`).
const FEED_DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

// ── HAL document types ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct HalPage {
    #[serde(rename = "_links", default)]
    links: HalLinks,
    #[serde(rename = "_embedded", default)]
    embedded: HalEmbedded,
}

#[derive(Debug, Default, Deserialize)]
struct HalLinks {
    #[serde(rename = "self")]
    self_link: Option<HalLink>,
    next: Option<HalLink>,
}

#[derive(Debug, Deserialize)]
struct HalLink {
    href: String,
}

#[derive(Debug, Default, Deserialize)]
struct HalEmbedded {
    #[serde(default)]
    entries: Vec<HalEntry>,
}

#[derive(Debug, Deserialize)]
struct HalEntry {
    #[serde(rename = "_id")]
    id: Option<String>,
    #[serde(rename = "_published")]
    published: Option<String>,
}

/// Parse a feed timestamp: the feed's own `dd/MM/yyyy HH:mm:ss` (UTC) or RFC 3339.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, FEED_DATE_FORMAT) {
        return Ok(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("unrecognised timestamp: {:?}", raw))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HalPageParser;

impl PageParser for HalPageParser {
    fn parse(&self, raw: &str) -> Result<Page> {
        let doc: HalPage = serde_json::from_str(raw).context("invalid HAL document")?;

        let entries = doc
            .embedded
            .entries
            .into_iter()
            .enumerate()
            .map(|(i, e)| -> Result<Entry> {
                let id = e.id.with_context(|| format!("entry {} has no _id", i))?;
                let published = e.published.as_deref().and_then(|raw| match parse_timestamp(raw) {
                    Ok(at) => Some(at),
                    Err(err) => {
                        tracing::debug!(entry = %id, error = %err, "ignoring unreadable _published");
                        None
                    }
                });
                Ok(Entry {
                    id: EntryId::new(id),
                    published,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Page {
            self_ref: doc.links.self_link.map(|l| PageRef::new(l.href)),
            entries,
            next: doc.links.next.map(|l| PageRef::new(l.href)),
        })
    }
}
