use rand::seq::SliceRandom;
use rand::Rng;

/// Outcome of asking for the next phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Next(usize),
    /// Every phrase of this pass has been handed out.
    Complete,
}

/// Hands out phrase indices uniformly at random without replacement.
#[derive(Debug, Clone)]
pub struct RoundSelector {
    total: usize,
    played: Vec<usize>,
}

impl RoundSelector {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            played: Vec::with_capacity(total),
        }
    }

    /// Pick an unplayed index and mark it played.
    ///
    /// Rejection sampling over `0..total`; after `total` misses in one call the
    /// pick falls back to a uniform choice among the unplayed indices, so each
    /// call makes at most `total` draws.
    pub fn select_next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Selection {
        if self.is_exhausted() {
            return Selection::Complete;
        }

        let drawn = (0..self.total)
            .map(|_| rng.gen_range(0..self.total))
            .find(|idx| !self.played.contains(idx));

        let idx = match drawn {
            Some(idx) => idx,
            None => {
                let unplayed = self.unplayed();
                match unplayed.choose(rng) {
                    Some(&idx) => idx,
                    None => return Selection::Complete,
                }
            }
        };

        self.played.push(idx);
        Selection::Next(idx)
    }

    /// Forget the current pass.
    pub fn reset(&mut self) {
        self.played.clear();
    }

    pub fn is_exhausted(&self) -> bool {
        self.played.len() >= self.total
    }

    /// Indices played so far, in the order they were selected.
    pub fn played(&self) -> &[usize] {
        &self.played
    }

    pub fn remaining(&self) -> usize {
        self.total - self.played.len()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    fn unplayed(&self) -> Vec<usize> {
        (0..self.total)
            .filter(|idx| !self.played.contains(idx))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_every_index_once_then_complete() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut selector = RoundSelector::new(3);

        let mut seen: Vec<usize> = (0..3)
            .map(|_| match selector.select_next(&mut rng) {
                Selection::Next(i) => i,
                Selection::Complete => panic!("completed too early"),
            })
            .collect();

        assert_eq!(selector.select_next(&mut rng), Selection::Complete);
        seen.sort();
        assert_eq!(seen, vec![0, 1, 2]);
        assert_eq!(selector.remaining(), 0);
    }

    #[test]
    fn test_large_pass_covers_range() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut selector = RoundSelector::new(40);
        for _ in 0..40 {
            assert!(matches!(selector.select_next(&mut rng), Selection::Next(_)));
        }
        let mut played = selector.played().to_vec();
        played.sort();
        assert_eq!(played, (0..40).collect::<Vec<_>>());
        assert_eq!(selector.select_next(&mut rng), Selection::Complete);
    }

    #[test]
    fn test_zero_phrases_is_complete_immediately() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut selector = RoundSelector::new(0);
        assert!(selector.is_exhausted());
        assert_eq!(selector.select_next(&mut rng), Selection::Complete);
    }

    #[test]
    fn test_terminates_with_a_degenerate_rng() {
        // A generator stuck on zero can never hit index 1 by rejection.
        let mut rng = StepRng::new(0, 0);
        let mut selector = RoundSelector::new(2);
        assert_eq!(selector.select_next(&mut rng), Selection::Next(0));
        assert_eq!(selector.select_next(&mut rng), Selection::Next(1));
        assert_eq!(selector.select_next(&mut rng), Selection::Complete);
    }

    #[test]
    fn test_reset_starts_a_new_pass() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut selector = RoundSelector::new(2);
        selector.select_next(&mut rng);
        selector.select_next(&mut rng);
        assert!(selector.is_exhausted());

        selector.reset();
        assert_eq!(selector.remaining(), 2);
        assert!(selector.played().is_empty());
        assert!(matches!(selector.select_next(&mut rng), Selection::Next(_)));
    }
}
