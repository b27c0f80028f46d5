//! `firehose print-db`: dump the most recent records of every namespace.

use serde_json::{json, Value};

use fh_03_time_store::TimeIndexedStore;
use shared_types::format_ticks;

/// Recent records and the summary as one JSON document.
pub fn recent_report(store: &TimeIndexedStore, count: usize) -> anyhow::Result<Value> {
    let summary = store.summarize()?;
    Ok(json!({
        "store": store.describe(),
        "counts": store.recent_counts(count)?,
        "mentions": store.recent_mentions(count)?,
        "hashtags": store.recent_hashtags(count)?,
        "retweets": store.recent_retweets(count)?,
        "summary": {
            "min_time": summary.min_time.map(format_ticks),
            "max_time": summary.max_time.map(format_ticks),
            "duration_secs": summary.span().as_secs(),
            "window_count": summary.window_count,
            "total_event_count": summary.total_event_count,
        },
    }))
}

pub fn print_db(store: &TimeIndexedStore, count: usize) -> anyhow::Result<()> {
    let report = recent_report(store, count)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
