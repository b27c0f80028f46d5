//! Final leaderboard selection per boundary.

use shared_types::LeaderboardEntry;

/// Keep the `limit` highest-scoring entries, score descending. Ties go to the
/// larger item count, then the smaller key.
pub fn select_top(mut entries: Vec<LeaderboardEntry>, limit: usize) -> Vec<LeaderboardEntry> {
    entries.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.item_count.cmp(&a.item_count))
            .then_with(|| a.key.cmp(&b.key))
    });
    entries.truncate(limit);
    entries
}
