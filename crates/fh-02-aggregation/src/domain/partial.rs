//! Mergeable per-key statistics.
//!
//! A `PartialEntry` holds what one pane knows about one leaderboard key.
//! Partials from every pane of a window merge into the window's entry.

use std::cmp::Ordering;
use std::collections::HashMap;

use shared_types::{LeaderboardEntry, LeaderboardKind, Ticks, TweetSample};

use super::kinds::{LeaderboardRules, SampleIdentity};

/// Higher follower count first; lower post id breaks ties.
fn rank(a: &TweetSample, b: &TweetSample) -> Ordering {
    b.follower_count
        .cmp(&a.follower_count)
        .then_with(|| a.id.cmp(&b.id))
}

/// Samples keyed by identity, keeping the best-ranked sample per identity.
#[derive(Debug, Clone, Default)]
pub struct SampleSet {
    by_identity: HashMap<SampleIdentity, TweetSample>,
}

impl SampleSet {
    pub fn insert(&mut self, identity: SampleIdentity, sample: TweetSample) {
        match self.by_identity.get_mut(&identity) {
            Some(existing) if rank(&sample, existing) == Ordering::Less => *existing = sample,
            Some(_) => {}
            None => {
                self.by_identity.insert(identity, sample);
            }
        }
    }

    pub fn merge(&mut self, other: &SampleSet) {
        for (identity, sample) in &other.by_identity {
            self.insert(identity.clone(), sample.clone());
        }
    }

    /// Keep only the `limit` best-ranked identities.
    ///
    /// Pruning each pane to the limit never changes the merged top `limit`,
    /// since an identity in the overall top set is also in the top set of the
    /// pane holding its best sample.
    pub fn prune(&mut self, limit: usize) {
        if self.by_identity.len() <= limit {
            return;
        }
        let mut ranked: Vec<_> = self.by_identity.drain().collect();
        ranked.sort_by(|a, b| rank(&a.1, &b.1));
        ranked.truncate(limit);
        self.by_identity.extend(ranked);
    }

    pub fn len(&self) -> usize {
        self.by_identity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_identity.is_empty()
    }

    /// Best-ranked samples first, at most `limit`.
    pub fn ranked(&self, limit: usize) -> Vec<TweetSample> {
        let mut samples: Vec<TweetSample> = self.by_identity.values().cloned().collect();
        samples.sort_by(rank);
        samples.truncate(limit);
        samples
    }
}

/// Latest non-empty text, ordered by event time then arrival.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LatestText {
    at: (Ticks, u64),
    text: String,
}

#[derive(Debug, Clone, Default)]
pub struct PartialEntry {
    pub item_count: u64,
    pub score: i64,
    pub samples: SampleSet,
    latest_text: Option<LatestText>,
}

impl PartialEntry {
    /// Account for one event. `seq` orders events that share a timestamp.
    pub fn add(
        &mut self,
        kind: LeaderboardKind,
        sample: TweetSample,
        event_time: Ticks,
        seq: u64,
        sample_limit: usize,
    ) {
        self.item_count += 1;
        self.score = self.score.saturating_add(sample.follower_count);

        if kind.keeps_text() && !sample.text.is_empty() {
            self.offer_text(LatestText {
                at: (event_time, seq),
                text: sample.text.clone(),
            });
        }

        self.samples.insert(kind.sample_identity(&sample), sample);
        if self.samples.len() > sample_limit * 4 {
            self.samples.prune(sample_limit);
        }
    }

    pub fn merge(&mut self, other: &PartialEntry) {
        self.item_count += other.item_count;
        self.score = self.score.saturating_add(other.score);
        self.samples.merge(&other.samples);
        if let Some(text) = &other.latest_text {
            self.offer_text(text.clone());
        }
    }

    fn offer_text(&mut self, candidate: LatestText) {
        let newer = match &self.latest_text {
            Some(current) => candidate.at > current.at,
            None => true,
        };
        if newer {
            self.latest_text = Some(candidate);
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.latest_text.as_ref().map(|t| t.text.as_str())
    }

    pub fn into_entry(
        self,
        window_time: Ticks,
        kind: LeaderboardKind,
        key: String,
        sample_limit: usize,
    ) -> LeaderboardEntry {
        LeaderboardEntry {
            window_time,
            kind,
            key,
            score: self.score,
            item_count: self.item_count,
            samples: self.samples.ranked(sample_limit),
            text: if kind.keeps_text() {
                self.latest_text.map(|t| t.text)
            } else {
                None
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: i64, canonical_id: i64, author: &str, follower_count: i64) -> TweetSample {
        TweetSample {
            id,
            follower_count,
            text: format!("text {id}"),
            author: author.to_string(),
            canonical_id,
        }
    }

    #[test]
    fn test_duplicate_canonical_keeps_max_followers() {
        let mut entry = PartialEntry::default();
        entry.add(LeaderboardKind::Mentions, sample(1, 9, "x", 10), 0, 0, 10);
        entry.add(LeaderboardKind::Mentions, sample(2, 9, "y", 30), 0, 1, 10);
        entry.add(LeaderboardKind::Mentions, sample(3, 9, "z", 20), 0, 2, 10);

        let ranked = entry.samples.ranked(10);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id, 2);
        assert_eq!(entry.item_count, 3);
        assert_eq!(entry.score, 60);
    }

    #[test]
    fn test_retweet_samples_are_distinct_authors() {
        let mut entry = PartialEntry::default();
        entry.add(LeaderboardKind::Retweets, sample(1, 5, "a", 10), 0, 0, 10);
        entry.add(LeaderboardKind::Retweets, sample(2, 5, "a", 40), 0, 1, 10);
        entry.add(LeaderboardKind::Retweets, sample(3, 5, "b", 20), 0, 2, 10);

        let ranked = entry.samples.ranked(10);
        let authors: Vec<_> = ranked.iter().map(|s| s.author.as_str()).collect();
        assert_eq!(authors, vec!["a", "b"]);
        assert_eq!(ranked[0].follower_count, 40);
    }

    #[test]
    fn test_latest_text_wins_across_merge() {
        let mut early = PartialEntry::default();
        early.add(LeaderboardKind::Retweets, sample(1, 5, "a", 1), 100, 0, 10);
        let mut late = PartialEntry::default();
        late.add(LeaderboardKind::Retweets, sample(2, 5, "b", 1), 200, 1, 10);

        let mut merged = late.clone();
        merged.merge(&early);
        assert_eq!(merged.text(), Some("text 2"));

        early.merge(&late);
        assert_eq!(early.text(), Some("text 2"));
    }

    #[test]
    fn test_into_entry_only_retweets_keep_text() {
        let mut entry = PartialEntry::default();
        entry.add(LeaderboardKind::Hashtags, sample(1, 1, "a", 1), 0, 0, 10);
        let out = entry.into_entry(60, LeaderboardKind::Hashtags, "rust".into(), 10);
        assert!(out.text.is_none());
        assert_eq!(out.window_time, 60);
    }

    #[test]
    fn test_prune_keeps_best() {
        let mut set = SampleSet::default();
        for i in 0..20 {
            set.insert(SampleIdentity::Canonical(i), sample(i, i, "a", i));
        }
        set.prune(5);
        let ids: Vec<_> = set.ranked(10).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![19, 18, 17, 16, 15]);
    }
}
