use rand::Rng;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no unused prompts are available")]
pub struct NoAvailableItemsError;

/// Builds the candidate pool for a weighted draw over ids ordered most
/// recent first: the recent half appears twice, the older half once, so a
/// recent id is exactly twice as likely to be drawn. With an odd length the
/// middle id lands in the older half.
pub fn weighted_pool(ids: &[String]) -> Vec<&str> {
    let midpoint = ids.len() / 2;
    let (recent_half, older_half) = ids.split_at(midpoint);

    let mut pool = Vec::with_capacity(recent_half.len() * 2 + older_half.len());
    pool.extend(recent_half.iter().map(String::as_str));
    pool.extend(recent_half.iter().map(String::as_str));
    pool.extend(older_half.iter().map(String::as_str));
    pool
}

/// Draws one id uniformly from the weighted pool.
pub fn pick_unused<'a>(
    ids: &'a [String],
    rng: &mut impl Rng,
) -> Result<&'a str, NoAvailableItemsError> {
    if ids.is_empty() {
        return Err(NoAvailableItemsError);
    }

    let pool = weighted_pool(ids);
    Ok(pool[rng.gen_range(0..pool.len())])
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn doubles_the_recent_half() {
        let ids = ids(&["a", "b", "c", "d"]);
        let pool = weighted_pool(&ids);
        assert_eq!(pool, vec!["a", "b", "a", "b", "c", "d"]);
    }

    #[test]
    fn odd_length_assigns_middle_id_to_older_half() {
        let ids = ids(&["a", "b", "c", "d", "e"]);
        let pool = weighted_pool(&ids);
        assert_eq!(pool, vec!["a", "b", "a", "b", "c", "d", "e"]);
    }

    #[test]
    fn single_id_is_always_picked() {
        let only = ids(&["a"]);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(pick_unused(&only, &mut rng).expect("non-empty pick"), "a");
    }

    #[test]
    fn empty_input_fails_before_drawing() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            pick_unused(&[], &mut rng).expect_err("empty input should fail"),
            NoAvailableItemsError
        );
    }

    #[test]
    fn recent_ids_are_drawn_twice_as_often() {
        let candidates = ids(&["a", "b", "c", "d"]);
        let mut rng = StdRng::seed_from_u64(42);

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        let draws = 6_000;
        for _ in 0..draws {
            let picked = pick_unused(&candidates, &mut rng).expect("non-empty pick");
            *counts.entry(picked).or_default() += 1;
        }

        // Expected frequencies: a, b at 2/6 of draws; c, d at 1/6.
        for recent in ["a", "b"] {
            let count = counts[recent];
            assert!(
                (1_700..=2_300).contains(&count),
                "{recent} drawn {count} times"
            );
        }
        for older in ["c", "d"] {
            let count = counts[older];
            assert!((700..=1_300).contains(&count), "{older} drawn {count} times");
        }
    }
}
