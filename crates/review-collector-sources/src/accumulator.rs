use review_collector_models::Review;
use std::collections::HashSet;
use tracing::debug;

/// Why a collection loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// At least `max_reviews` unique reviews were gathered
    TargetReached,
    /// Too many consecutive snapshots added nothing new
    Stalled,
    /// More content could not be revealed (scroll container missing, etc.)
    RevealFailed,
}

/// Accumulates unique reviews across page snapshots, in discovery order.
///
/// Tracks consecutive snapshots that added nothing so the caller can stop
/// once the page has clearly run dry.
pub struct ReviewAccumulator {
    reviews: Vec<Review>,
    seen: HashSet<String>,
    target: usize,
    max_stalls: u32,
    stalls: u32,
}

impl ReviewAccumulator {
    pub fn new(target: usize, max_stalls: u32) -> Self {
        Self {
            reviews: Vec::new(),
            seen: HashSet::new(),
            target,
            max_stalls,
            stalls: 0,
        }
    }

    /// Merge one snapshot's reviews, dropping ids already seen (including
    /// repeats inside the batch). Returns how many were new.
    pub fn merge(&mut self, batch: Vec<Review>) -> usize {
        let before = self.reviews.len();
        for review in batch {
            if self.seen.insert(review.review_id.clone()) {
                self.reviews.push(review);
            }
        }
        let added = self.reviews.len() - before;

        if added == 0 {
            self.stalls += 1;
        } else {
            self.stalls = 0;
        }

        debug!(
            added = added,
            total = self.reviews.len(),
            stalls = self.stalls,
            "Merged review snapshot"
        );
        added
    }

    /// Whether the loop should stop before revealing more content
    pub fn stop_reason(&self) -> Option<StopReason> {
        if self.reviews.len() >= self.target {
            Some(StopReason::TargetReached)
        } else if self.stalls >= self.max_stalls {
            Some(StopReason::Stalled)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    pub fn stalls(&self) -> u32 {
        self.stalls
    }

    /// Consume the accumulator, keeping at most `target` reviews
    pub fn into_reviews(self) -> Vec<Review> {
        let mut reviews = self.reviews;
        reviews.truncate(self.target);
        reviews
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(ids: &[&str]) -> Vec<Review> {
        ids.iter().map(|id| Review::new(*id)).collect()
    }

    fn ids(reviews: &[Review]) -> Vec<&str> {
        reviews.iter().map(|r| r.review_id.as_str()).collect()
    }

    #[test]
    fn test_same_snapshot_twice_adds_nothing() {
        let mut acc = ReviewAccumulator::new(50, 3);
        assert_eq!(acc.merge(batch(&["a", "b", "c"])), 3);
        assert_eq!(acc.merge(batch(&["a", "b", "c"])), 0);
        assert_eq!(acc.len(), 3);
        assert_eq!(acc.stalls(), 1);
    }

    #[test]
    fn test_second_snapshot_with_two_new_ids() {
        let mut acc = ReviewAccumulator::new(50, 3);
        acc.merge(batch(&["r1", "r2", "r3", "r4", "r5"]));
        let added = acc.merge(batch(&["r1", "r2", "r3", "r4", "r5", "r6", "r7"]));
        assert_eq!(added, 2);
        assert_eq!(
            ids(&acc.into_reviews()),
            vec!["r1", "r2", "r3", "r4", "r5", "r6", "r7"]
        );
    }

    #[test]
    fn test_duplicates_within_one_batch() {
        let mut acc = ReviewAccumulator::new(50, 3);
        assert_eq!(acc.merge(batch(&["x", "x", "y", ""])), 3);
        assert_eq!(acc.merge(batch(&[""])), 0);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let mut acc = ReviewAccumulator::new(50, 3);
        let mut first = Review::new("a");
        first.author = "First".to_string();
        let mut second = Review::new("a");
        second.author = "Second".to_string();
        acc.merge(vec![first]);
        acc.merge(vec![second]);
        assert_eq!(acc.into_reviews()[0].author, "First");
    }

    #[test]
    fn test_stall_counter_resets_on_growth() {
        let mut acc = ReviewAccumulator::new(50, 3);
        acc.merge(batch(&["a"]));
        acc.merge(batch(&["a"]));
        acc.merge(batch(&["a"]));
        assert_eq!(acc.stalls(), 2);
        assert_eq!(acc.stop_reason(), None);

        acc.merge(batch(&["a", "b"]));
        assert_eq!(acc.stalls(), 0);

        acc.merge(batch(&["a", "b"]));
        acc.merge(batch(&["a", "b"]));
        acc.merge(batch(&["a", "b"]));
        assert_eq!(acc.stop_reason(), Some(StopReason::Stalled));
    }

    #[test]
    fn test_target_reached_and_truncation() {
        let mut acc = ReviewAccumulator::new(3, 3);
        acc.merge(batch(&["1", "2", "3", "4", "5"]));
        assert_eq!(acc.stop_reason(), Some(StopReason::TargetReached));
        assert_eq!(ids(&acc.into_reviews()), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_empty_first_snapshot_counts_as_stall() {
        let mut acc = ReviewAccumulator::new(10, 3);
        acc.merge(Vec::new());
        assert!(acc.is_empty());
        assert_eq!(acc.stalls(), 1);
    }
}
