//! Feed record builders.

use serde_json::{json, Value};

use shared_types::{ticks_from_unix_millis, Ticks};

/// 2020-09-13T12:30:00Z, aligned to ten minutes.
pub const BASE_MILLIS: i64 = 1_600_000_200_000;

/// `BASE_MILLIS` in ticks.
pub fn base_ticks() -> Ticks {
    ticks_from_unix_millis(BASE_MILLIS).unwrap_or_default()
}

/// One feed record `offset_secs` after `BASE_MILLIS`.
#[derive(Debug, Clone)]
pub struct FeedLine {
    id: i64,
    offset_secs: i64,
    author: String,
    followers: i64,
    mentions: Vec<String>,
    hashtags: Vec<String>,
    retweet_of: Option<i64>,
}

impl FeedLine {
    pub fn new(id: i64, offset_secs: i64) -> Self {
        Self {
            id,
            offset_secs,
            author: format!("u{id}"),
            followers: 1,
            mentions: Vec::new(),
            hashtags: Vec::new(),
            retweet_of: None,
        }
    }

    pub fn author(mut self, screen_name: &str, followers: i64) -> Self {
        self.author = screen_name.to_string();
        self.followers = followers;
        self
    }

    pub fn mention(mut self, screen_name: &str) -> Self {
        self.mentions.push(screen_name.to_string());
        self
    }

    pub fn hashtag(mut self, tag: &str) -> Self {
        self.hashtags.push(tag.to_string());
        self
    }

    pub fn retweet_of(mut self, original: i64) -> Self {
        self.retweet_of = Some(original);
        self
    }

    pub fn to_json(&self) -> Value {
        let mut record = json!({
            "id": self.id,
            "text": format!("t{}", self.id),
            "timestamp_ms": (BASE_MILLIS + self.offset_secs * 1_000).to_string(),
            "user": {"screen_name": self.author, "followers_count": self.followers},
            "entities": {
                "hashtags": self.hashtags.iter().map(|t| json!({"text": t})).collect::<Vec<_>>(),
                "user_mentions": self
                    .mentions
                    .iter()
                    .map(|m| json!({"screen_name": m}))
                    .collect::<Vec<_>>(),
            },
        });
        if let Some(original) = self.retweet_of {
            record["retweeted_status"] = json!({"id": original});
        }
        record
    }

    pub fn render(&self) -> String {
        self.to_json().to_string()
    }
}

/// Newline-terminated feed text.
pub fn feed(lines: &[FeedLine]) -> String {
    lines.iter().map(|l| format!("{}\n", l.render())).collect()
}
