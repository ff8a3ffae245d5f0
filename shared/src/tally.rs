use std::collections::{BTreeMap, HashSet};
use serde::{Serialize, Deserialize};
use crate::models::{Category, CategoryId, LeaderboardEntry, Nominee, NomineeId};

/// Aggregates raw `(category, nominee)` vote pairs into per-nominee counts.
///
/// Entries are ordered by category, then by descending count, then by nominee id,
/// so that the output is stable regardless of input order.
pub fn count_votes<'a, I>(pairs: I) -> Vec<LeaderboardEntry>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut counts: BTreeMap<(&str, &str), i64> = BTreeMap::new();
    for (category_id, nominee_id) in pairs {
        *counts.entry((category_id, nominee_id)).or_insert(0) += 1;
    }

    let mut entries: Vec<LeaderboardEntry> = counts
        .into_iter()
        .map(|((category_id, nominee_id), vote_count)| LeaderboardEntry {
            category_id: category_id.to_string(),
            nominee_id: nominee_id.to_string(),
            vote_count,
        })
        .collect();

    entries.sort_by(|a, b| {
        a.category_id.cmp(&b.category_id)
            .then(b.vote_count.cmp(&a.vote_count))
            .then(a.nominee_id.cmp(&b.nominee_id))
    });
    entries
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NomineeStanding {
    pub nominee_id: NomineeId,
    pub name: String,
    pub votes: i64,
    /// Fraction of the category's votes, `0.0` when the category has none.
    pub share: f64,
}

/// Ranks every nominee of `category`, including those without votes.
pub fn category_standings(
    category: &Category,
    nominees: &[Nominee],
    entries: &[LeaderboardEntry],
) -> Vec<NomineeStanding> {
    let counts: BTreeMap<&str, i64> = entries
        .iter()
        .filter(|e| e.category_id == category.id)
        .map(|e| (e.nominee_id.as_str(), e.vote_count))
        .collect();

    let in_category: Vec<&Nominee> = nominees
        .iter()
        .filter(|n| n.category_id == category.id)
        .collect();

    let total: i64 = in_category
        .iter()
        .map(|n| counts.get(n.id.as_str()).copied().unwrap_or(0))
        .sum();

    let mut standings: Vec<NomineeStanding> = in_category
        .into_iter()
        .map(|n| {
            let votes = counts.get(n.id.as_str()).copied().unwrap_or(0);
            NomineeStanding {
                nominee_id: n.id.clone(),
                name: n.name.clone(),
                votes,
                share: if total > 0 { votes as f64 / total as f64 } else { 0.0 },
            }
        })
        .collect();

    standings.sort_by(|a, b| b.votes.cmp(&a.votes).then_with(|| a.name.cmp(&b.name)));
    standings
}

#[derive(Debug, Clone, PartialEq)]
pub struct VotingProgress {
    pub voted_count: usize,
    pub total: usize,
    voted: HashSet<CategoryId>,
}

impl VotingProgress {
    /// Votes for categories that are not in `categories` are ignored.
    pub fn new(voted_categories: &[CategoryId], categories: &[Category]) -> Self {
        let known: HashSet<&str> = categories.iter().map(|c| c.id.as_str()).collect();
        let voted: HashSet<CategoryId> = voted_categories
            .iter()
            .filter(|id| known.contains(id.as_str()))
            .cloned()
            .collect();

        Self {
            voted_count: voted.len(),
            total: categories.len(),
            voted,
        }
    }

    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.voted_count as f64 / self.total as f64 * 100.0
        }
    }

    pub fn has_voted(&self, category_id: &str) -> bool {
        self.voted.contains(category_id)
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.voted_count == self.total
    }
}
