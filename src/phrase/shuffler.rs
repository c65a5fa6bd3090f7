use rand::seq::SliceRandom;
use rand::Rng;

/// Return a uniformly random permutation of `tokens`.
///
/// Fisher-Yates from the last slot down, driven entirely by `rng`. The result
/// may equal the input order; inputs of length 0 or 1 always do.
pub fn shuffle<R: Rng + ?Sized>(tokens: &[String], rng: &mut R) -> Vec<String> {
    let mut out = tokens.to_vec();
    out.shuffle(rng);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn words(s: &str) -> Vec<String> {
        s.split(' ').map(str::to_string).collect()
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let input = words("a b c d e f g a");
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let mut out = shuffle(&input, &mut rng);
            let mut sorted = input.clone();
            out.sort();
            sorted.sort();
            assert_eq!(out, sorted);
        }
    }

    #[test]
    fn test_shuffle_short_inputs_unchanged() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(shuffle(&[], &mut rng).is_empty());
        assert_eq!(shuffle(&words("solo."), &mut rng), words("solo."));
    }

    #[test]
    fn test_shuffle_is_deterministic_for_a_seed() {
        let input = words("one two three four five");
        let a = shuffle(&input, &mut StdRng::seed_from_u64(42));
        let b = shuffle(&input, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_shuffle_reaches_every_permutation_of_three() {
        let input = words("x y z");
        let mut rng = StdRng::seed_from_u64(3);
        let seen: HashSet<Vec<String>> = (0..600).map(|_| shuffle(&input, &mut rng)).collect();
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn test_shuffle_does_not_touch_input() {
        let input = words("keep me intact");
        let _ = shuffle(&input, &mut StdRng::seed_from_u64(9));
        assert_eq!(input, words("keep me intact"));
    }
}
