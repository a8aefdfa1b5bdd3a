//! Randomized selection helpers.
//!
//! Every function takes its random source explicitly so callers can pass a
//! seeded generator in tests.

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Uniform random permutation.
///
/// Repeatedly removes a uniformly chosen remaining element and appends it to
/// the output, which yields the same distribution as Fisher-Yates.
pub fn shuffle<T, R: Rng + ?Sized>(items: Vec<T>, rng: &mut R) -> Vec<T> {
    let mut remaining = items;
    let mut shuffled = Vec::with_capacity(remaining.len());

    while !remaining.is_empty() {
        let index = rng.random_range(0..remaining.len());
        shuffled.push(remaining.swap_remove(index));
    }

    shuffled
}

/// Picks `min(count, items.len())` distinct entries by uniform draws,
/// rejecting any index that was already taken.
pub fn sample_distinct<T: Clone, R: Rng + ?Sized>(items: &[T], count: usize, rng: &mut R) -> Vec<T> {
    let target = count.min(items.len());
    let mut picked: Vec<usize> = Vec::with_capacity(target);

    while picked.len() < target {
        let index = rng.random_range(0..items.len());
        if picked.contains(&index) {
            continue;
        }
        picked.push(index);
    }

    picked.into_iter().map(|index| items[index].clone()).collect()
}

/// One uniformly chosen element, `None` for an empty slice
pub fn pick_one<'a, T, R: Rng + ?Sized>(items: &'a [T], rng: &mut R) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    Some(&items[rng.random_range(0..items.len())])
}

/// Independent generator for a concurrently running branch
pub fn fork(rng: &mut StdRng) -> StdRng {
    StdRng::seed_from_u64(rng.random())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(11);
        let items: Vec<u32> = (0..50).collect();

        let mut shuffled = shuffle(items.clone(), &mut rng);
        assert_eq!(shuffled.len(), items.len());
        shuffled.sort_unstable();
        assert_eq!(shuffled, items);
    }

    #[test]
    fn test_shuffle_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        let shuffled: Vec<u8> = shuffle(Vec::new(), &mut rng);
        assert!(shuffled.is_empty());
    }

    #[test]
    fn test_sample_distinct_caps_at_available() {
        let genres = vec!["Action", "Comedy", "Drama", "Horror", "Western"];
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = sample_distinct(&genres, 8, &mut rng);
            assert_eq!(picked.len(), 5);
            let unique: HashSet<_> = picked.iter().collect();
            assert_eq!(unique.len(), 5);
        }
    }

    #[test]
    fn test_sample_distinct_fewer_than_available() {
        let items: Vec<u32> = (0..30).collect();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = sample_distinct(&items, 8, &mut rng);
            assert_eq!(picked.len(), 8);
            let unique: HashSet<_> = picked.iter().collect();
            assert_eq!(unique.len(), 8);
        }
    }

    #[test]
    fn test_sample_distinct_empty_input() {
        let mut rng = StdRng::seed_from_u64(3);
        let picked: Vec<u32> = sample_distinct(&[], 4, &mut rng);
        assert!(picked.is_empty());
    }

    #[test]
    fn test_pick_one() {
        let mut rng = StdRng::seed_from_u64(5);
        let items = [10, 20, 30];
        let picked = pick_one(&items, &mut rng).unwrap();
        assert!(items.contains(picked));
        assert!(pick_one::<u8, _>(&[], &mut rng).is_none());
    }

    #[test]
    fn test_fork_is_deterministic_for_a_seed() {
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        let mut fa = fork(&mut a);
        let mut fb = fork(&mut b);
        assert_eq!(fa.random::<u64>(), fb.random::<u64>());
    }
}
