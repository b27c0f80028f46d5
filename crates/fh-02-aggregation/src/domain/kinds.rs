//! Per-leaderboard rules: which keys an event fans out to and how samples
//! are deduplicated.

use shared_types::{LeaderboardKind, RawEvent, TweetSample};

/// Identity under which samples of one entry collapse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SampleIdentity {
    /// Mentions and hashtags: one sample per original post.
    Canonical(i64),
    /// Retweets: one sample per reposting author.
    Author(String),
}

pub trait LeaderboardRules {
    /// Keys this event contributes to. Empty when it does not qualify.
    fn keys(&self, event: &RawEvent) -> Vec<String>;

    fn sample_identity(&self, sample: &TweetSample) -> SampleIdentity;

    /// Whether entries carry the original post's text.
    fn keeps_text(&self) -> bool;
}

impl LeaderboardRules for LeaderboardKind {
    fn keys(&self, event: &RawEvent) -> Vec<String> {
        match self {
            LeaderboardKind::Mentions => event.mentions.clone(),
            LeaderboardKind::Hashtags => event.hashtags.iter().cloned().collect(),
            LeaderboardKind::Retweets => event
                .original_id
                .map(|id| vec![id.to_string()])
                .unwrap_or_default(),
        }
    }

    fn sample_identity(&self, sample: &TweetSample) -> SampleIdentity {
        match self {
            LeaderboardKind::Mentions | LeaderboardKind::Hashtags => {
                SampleIdentity::Canonical(sample.canonical_id)
            }
            LeaderboardKind::Retweets => SampleIdentity::Author(sample.author.clone()),
        }
    }

    fn keeps_text(&self) -> bool {
        matches!(self, LeaderboardKind::Retweets)
    }
}
