//! `firehose query`: typed range queries.

use std::str::FromStr;

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use serde_json::Value;

use fh_03_time_store::TimeIndexedStore;
use shared_types::{datetime_to_ticks, Ticks};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryTarget {
    Counts,
    Mentions,
    Hashtags,
    Retweets,
}

impl FromStr for QueryTarget {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "counts" => Ok(QueryTarget::Counts),
            "mentions" => Ok(QueryTarget::Mentions),
            "hashtags" => Ok(QueryTarget::Hashtags),
            "retweets" => Ok(QueryTarget::Retweets),
            other => bail!("unknown query target '{other}'"),
        }
    }
}

/// Parse an RFC 3339 timestamp into ticks.
pub fn parse_time(value: &str) -> anyhow::Result<Ticks> {
    let dt = DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("'{value}' is not an RFC 3339 timestamp"))?;
    Ok(datetime_to_ticks(dt.with_timezone(&Utc)))
}

/// Entries with window end in `[from, to)`. `entity` keeps only that screen
/// name or hashtag and is rejected for counts and retweets.
pub fn query(
    store: &TimeIndexedStore,
    target: QueryTarget,
    from: Ticks,
    to: Ticks,
    entity: Option<&str>,
) -> anyhow::Result<Value> {
    if entity.is_some() && matches!(target, QueryTarget::Counts | QueryTarget::Retweets) {
        bail!("--entity applies to mentions and hashtags only");
    }

    let value = match target {
        QueryTarget::Counts => serde_json::to_value(store.counts(from, to)?)?,
        QueryTarget::Mentions => serde_json::to_value(store.top_mentions(from, to, entity)?)?,
        QueryTarget::Hashtags => serde_json::to_value(store.top_hashtags(from, to, entity)?)?,
        QueryTarget::Retweets => serde_json::to_value(store.top_retweets(from, to)?)?,
    };
    Ok(value)
}
