//! The four disjoint keyspaces of the store.

use std::fmt;

use shared_types::LeaderboardKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    /// Tumbling window counts: one u64 per window end.
    Counts,
    /// One JSON entry per (boundary, screen name).
    Mentions,
    /// One JSON entry per (boundary, hashtag).
    Hashtags,
    /// One JSON array of entries per boundary.
    Retweets,
}

impl Namespace {
    pub const ALL: [Namespace; 4] = [
        Namespace::Counts,
        Namespace::Mentions,
        Namespace::Hashtags,
        Namespace::Retweets,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Counts => "counts",
            Namespace::Mentions => "mentions",
            Namespace::Hashtags => "hashtags",
            Namespace::Retweets => "retweets",
        }
    }

    /// Position in `ALL`, used by backends that keep one slot per namespace.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Whether each entry is keyed by boundary plus entity.
    pub fn has_subkey(&self) -> bool {
        matches!(self, Namespace::Mentions | Namespace::Hashtags)
    }
}

impl From<LeaderboardKind> for Namespace {
    fn from(kind: LeaderboardKind) -> Self {
        match kind {
            LeaderboardKind::Mentions => Namespace::Mentions,
            LeaderboardKind::Hashtags => Namespace::Hashtags,
            LeaderboardKind::Retweets => Namespace::Retweets,
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
