//! # Feed Record Decoder
//!
//! Maps one JSON feed record to a `RawEvent`. Records that are not posts
//! (delete notices, limit notices, keep-alives) or that fail to parse decode
//! to `None`.
//!
//! Text comes from `extended_tweet.full_text`, else
//! `retweeted_status.extended_tweet.full_text`, else `text`.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde_with::{serde_as, NoneAsEmptyString, PickFirst};

use shared_types::{ticks_from_unix_millis, Author, RawEvent, Ticks, MAX_TICKS};

#[serde_as]
#[derive(Debug, Deserialize)]
struct WireTweet {
    id: Option<i64>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    extended_tweet: Option<WireExtended>,
    #[serde(default)]
    entities: Option<WireEntities>,
    #[serde(default)]
    retweeted_status: Option<WireRetweeted>,
    user: Option<WireUser>,
    /// Sent as a decimal string; numbers are accepted too.
    #[serde_as(as = "PickFirst<(NoneAsEmptyString, _)>")]
    #[serde(default)]
    timestamp_ms: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WireExtended {
    full_text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireEntities {
    #[serde(default)]
    hashtags: Vec<WireHashtag>,
    #[serde(default)]
    user_mentions: Vec<WireMention>,
}

#[derive(Debug, Deserialize)]
struct WireHashtag {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WireMention {
    screen_name: String,
}

#[derive(Debug, Deserialize)]
struct WireRetweeted {
    id: i64,
    #[serde(default)]
    extended_tweet: Option<WireExtended>,
}

#[derive(Debug, Deserialize)]
struct WireUser {
    #[serde(default)]
    screen_name: String,
    #[serde(default)]
    followers_count: i64,
}

impl WireTweet {
    fn full_text(&mut self) -> String {
        if let Some(text) = self.extended_tweet.take().and_then(|e| e.full_text) {
            return text;
        }
        if let Some(text) = self
            .retweeted_status
            .as_mut()
            .and_then(|r| r.extended_tweet.take())
            .and_then(|e| e.full_text)
        {
            return text;
        }
        self.text.take().unwrap_or_default()
    }

    /// `Some(0)` when absent, `None` when outside the tick calendar.
    fn event_time(&self) -> Option<Ticks> {
        match self.timestamp_ms {
            None => Some(0),
            Some(millis) => {
                ticks_from_unix_millis(millis).filter(|ticks| (0..=MAX_TICKS).contains(ticks))
            }
        }
    }
}

/// Decode one record. Never fails; malformed input yields `None`.
///
/// The result may carry `event_time == 0` when `timestamp_ms` is missing;
/// callers that window by time skip those. A `timestamp_ms` past year 9999
/// makes the record malformed.
pub fn decode(line: &str) -> Option<RawEvent> {
    let mut wire: WireTweet = serde_json::from_str(line).ok()?;
    let id = wire.id?;
    let user = wire.user.take()?;
    let event_time = wire.event_time()?;
    let text = wire.full_text();
    let entities = wire.entities.take().unwrap_or_default();

    Some(RawEvent {
        id,
        text,
        author: Author {
            screen_name: user.screen_name,
            follower_count: user.followers_count,
        },
        hashtags: entities
            .hashtags
            .into_iter()
            .map(|h| h.text)
            .collect::<BTreeSet<_>>(),
        mentions: entities
            .user_mentions
            .into_iter()
            .map(|m| m.screen_name)
            .collect(),
        original_id: wire.retweeted_status.map(|r| r.id),
        event_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::UNIX_EPOCH_TICKS;

    const TWEET: &str = r#"{
        "id": 42,
        "text": "short",
        "timestamp_ms": "1600000000000",
        "user": {"screen_name": "alice", "followers_count": 120},
        "entities": {
            "hashtags": [{"text": "rust"}, {"text": "rust"}, {"text": "async"}],
            "user_mentions": [{"screen_name": "bob"}, {"screen_name": "carol"}]
        }
    }"#;

    #[test]
    fn test_decodes_full_record() {
        let event = decode(TWEET).unwrap();
        assert_eq!(event.id, 42);
        assert_eq!(event.text, "short");
        assert_eq!(event.author.screen_name, "alice");
        assert_eq!(event.author.follower_count, 120);
        assert_eq!(event.hashtags.len(), 2);
        assert_eq!(event.mentions, vec!["bob", "carol"]);
        assert_eq!(event.original_id, None);
        assert_eq!(
            event.event_time,
            UNIX_EPOCH_TICKS + 1_600_000_000_000 * 10_000
        );
    }

    #[test]
    fn test_numeric_timestamp_accepted() {
        let line = r#"{"id": 1, "user": {"screen_name": "a", "followers_count": 1}, "timestamp_ms": 1000}"#;
        assert_eq!(decode(line).unwrap().event_time, UNIX_EPOCH_TICKS + 10_000_000);
    }

    #[test]
    fn test_missing_or_empty_timestamp_is_zero() {
        let line = r#"{"id": 1, "user": {"screen_name": "a", "followers_count": 1}}"#;
        assert_eq!(decode(line).unwrap().event_time, 0);

        let line = r#"{"id": 1, "user": {"screen_name": "a"}, "timestamp_ms": ""}"#;
        assert_eq!(decode(line).unwrap().event_time, 0);
    }

    #[test]
    fn test_extended_text_preferred() {
        let line = r#"{
            "id": 7, "text": "cut…",
            "retweeted_status": {"id": 3, "extended_tweet": {"full_text": "original full"}},
            "user": {"screen_name": "a", "followers_count": 1},
            "timestamp_ms": "1"
        }"#;
        let event = decode(line).unwrap();
        assert_eq!(event.text, "original full");
        assert_eq!(event.original_id, Some(3));
        assert_eq!(event.canonical_id(), 3);

        let line = r#"{
            "id": 8, "text": "cut…",
            "extended_tweet": {"full_text": "own full"},
            "retweeted_status": {"id": 3, "extended_tweet": {"full_text": "original full"}},
            "user": {"screen_name": "a", "followers_count": 1}
        }"#;
        assert_eq!(decode(line).unwrap().text, "own full");
    }

    #[test]
    fn test_timestamp_past_year_9999_is_malformed() {
        let last_ms = r#"{"id": 1, "user": {"screen_name": "a"}, "timestamp_ms": "253402300799999"}"#;
        assert!(decode(last_ms).unwrap().event_time <= MAX_TICKS);

        let past = r#"{"id": 1, "user": {"screen_name": "a"}, "timestamp_ms": "860201606885477"}"#;
        assert!(decode(past).is_none());

        let overflow = r#"{"id": 1, "user": {"screen_name": "a"}, "timestamp_ms": 9223372036854775807}"#;
        assert!(decode(overflow).is_none());
    }

    #[test]
    fn test_non_posts_decode_to_none() {
        assert!(decode(r#"{"delete": {"status": {"id": 1}}}"#).is_none());
        assert!(decode(r#"{"limit": {"track": 12}}"#).is_none());
        assert!(decode("not json").is_none());
        assert!(decode(r#"{"id": 1}"#).is_none());
    }
}
