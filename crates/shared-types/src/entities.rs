//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Input**: `RawEvent`, `Author`
//! - **Evidence**: `TweetSample`
//! - **Window outputs**: `LeaderboardEntry`, `CountRecord`, `WindowBoundary`

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::time::Ticks;

/// Maximum samples kept per leaderboard entry.
pub const MAX_SAMPLES: usize = 10;

/// Maximum entries kept per leaderboard per window boundary.
pub const MAX_LEADERBOARD_ENTRIES: usize = 10;

// =============================================================================
// INPUT
// =============================================================================

/// The posting account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Author {
    pub screen_name: String,
    pub follower_count: i64,
}

/// One decoded feed record.
///
/// Owned by the aggregation engine for a single pass and dropped once it has
/// contributed to every window it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RawEvent {
    pub id: i64,
    pub text: String,
    pub author: Author,
    /// Order is irrelevant; duplicates collapse.
    pub hashtags: BTreeSet<String>,
    /// In order of appearance.
    pub mentions: Vec<String>,
    /// Present iff this event reposts another post.
    pub original_id: Option<i64>,
    pub event_time: Ticks,
}

impl RawEvent {
    /// Id of the original post; a repost and its original share it.
    pub fn canonical_id(&self) -> i64 {
        self.original_id.unwrap_or(self.id)
    }

    pub fn is_repost(&self) -> bool {
        self.original_id.is_some()
    }

    /// Project this event into leaderboard evidence.
    pub fn sample(&self) -> TweetSample {
        TweetSample {
            id: self.id,
            follower_count: self.author.follower_count,
            text: self.text.clone(),
            author: self.author.screen_name.clone(),
            canonical_id: self.canonical_id(),
        }
    }
}

// =============================================================================
// EVIDENCE
// =============================================================================

/// Projection of a `RawEvent` kept inside a leaderboard entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetSample {
    pub id: i64,
    pub follower_count: i64,
    pub text: String,
    pub author: String,
    pub canonical_id: i64,
}

// =============================================================================
// WINDOW OUTPUTS
// =============================================================================

/// Which leaderboard an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardKind {
    /// Keyed by mentioned screen name.
    Mentions,
    /// Keyed by hashtag text.
    Hashtags,
    /// Keyed by the reposted post's id.
    Retweets,
}

impl LeaderboardKind {
    pub const ALL: [LeaderboardKind; 3] = [Self::Mentions, Self::Hashtags, Self::Retweets];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mentions => "mentions",
            Self::Hashtags => "hashtags",
            Self::Retweets => "retweets",
        }
    }
}

impl fmt::Display for LeaderboardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ranked item of a leaderboard for a single window boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// End ticks of the window that produced this entry.
    pub window_time: Ticks,
    pub kind: LeaderboardKind,
    /// Screen name, hashtag, or decimal canonical post id.
    pub key: String,
    /// Sum of follower counts across contributing events.
    pub score: i64,
    pub item_count: u64,
    /// At most `MAX_SAMPLES`, follower count descending.
    pub samples: Vec<TweetSample>,
    /// Retweets only: most recently seen text of the original post.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl LeaderboardEntry {
    /// Reposting authors, best-followed first (retweet leaderboards).
    pub fn top_users(&self) -> Vec<&str> {
        self.samples.iter().map(|s| s.author.as_str()).collect()
    }
}

/// Number of events in one closed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRecord {
    /// End ticks of the window.
    pub window_time: Ticks,
    pub count: u64,
}

/// Half-open interval `[start_time, end_time)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowBoundary {
    pub start_time: Ticks,
    pub end_time: Ticks,
}

impl WindowBoundary {
    /// The window of `size` ticks that ends at `end_time`.
    pub fn ending_at(end_time: Ticks, size: Ticks) -> Self {
        Self {
            start_time: end_time - size,
            end_time,
        }
    }

    pub fn contains(&self, ticks: Ticks) -> bool {
        self.start_time <= ticks && ticks < self.end_time
    }

    pub fn size(&self) -> Ticks {
        self.end_time - self.start_time
    }
}
