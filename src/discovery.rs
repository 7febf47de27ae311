use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

/// Fixed page size of the feed and the per-user listings.
pub const PAGE_SIZE: usize = 10;

/// Upper bound on recommendations returned for a single series.
pub const RECOMMENDATION_LIMIT: usize = 5;

/// Every whitespace-separated term must appear in the name as a
/// case-insensitive substring; terms are ANDed, not ORed.
pub fn matches_search(name: &str, query: &str) -> bool {
  let haystack = name.to_lowercase();

  query
    .split_whitespace()
    .all(|term| haystack.contains(&term.to_lowercase()))
}

/// Shuffles the entire materialised result set, then slices out page `page`
/// (1-based, `PAGE_SIZE` items). Re-shuffling on every request trades stable
/// pagination for discovery variety; sequential pages of one shuffle are
/// still disjoint.
pub fn shuffled_page<T>(mut items: Vec<T>, page: u32, rng: &mut impl Rng) -> Vec<T> {
  items.shuffle(rng);

  let page = page.max(1) as usize;
  let start = (page - 1) * PAGE_SIZE;

  items.into_iter().skip(start).take(PAGE_SIZE).collect()
}

/// Stable page-number slice for the per-user listings, which keep their
/// query order instead of being shuffled.
pub fn page_slice<T>(items: Vec<T>, page: u32) -> Vec<T> {
  let page = page.max(1) as usize;
  let start = (page - 1) * PAGE_SIZE;

  items.into_iter().skip(start).take(PAGE_SIZE).collect()
}

/// Picks one of the target's tags uniformly at random; an untagged target
/// yields `None` and the caller recommends from the whole public set.
pub fn pick_tag(tag_ids: &[i32], rng: &mut impl Rng) -> Option<i32> {
  tag_ids.choose(rng).copied()
}

/// Uniform sample without replacement of `min(RECOMMENDATION_LIMIT, n)`
/// candidates. Distinct from the feed's shuffle-then-slice: there is no
/// paging here, just one draw.
pub fn sample<T>(mut candidates: Vec<T>, rng: &mut impl Rng) -> Vec<T> {
  let keep = candidates.len().min(RECOMMENDATION_LIMIT);
  let _ = candidates.partial_shuffle(rng, keep);
  candidates.truncate(keep);
  candidates
}

#[cfg(test)]
mod tests {
  use super::{PAGE_SIZE, RECOMMENDATION_LIMIT, matches_search, pick_tag, sample, shuffled_page};
  use rand::SeedableRng;
  use rand::rngs::StdRng;
  use std::collections::HashSet;

  #[test]
  fn search_is_case_insensitive_substring() {
    assert!(matches_search("Autumn in Ladoga", "ladoga"));
    assert!(matches_search("Autumn in Ladoga", "AUTUMN"));
    assert!(!matches_search("Autumn in Ladoga", "winter"));
  }

  #[test]
  fn search_terms_are_anded() {
    assert!(matches_search("Autumn in Ladoga", "autumn ladoga"));
    assert!(!matches_search("Autumn in Ladoga", "autumn winter"));
  }

  #[test]
  fn empty_query_matches_everything() {
    assert!(matches_search("anything", ""));
  }

  #[test]
  fn page_size_is_capped() {
    let mut rng = StdRng::seed_from_u64(7);
    let page = shuffled_page((0..35).collect(), 1, &mut rng);
    assert_eq!(page.len(), PAGE_SIZE);
  }

  #[test]
  fn sequential_pages_of_one_shuffle_are_disjoint() {
    // identical seeds produce the identical permutation, so pages 1 and 2
    // are slices of one shuffled snapshot
    let items: Vec<i32> = (0..35).collect();
    let first = shuffled_page(items.clone(), 1, &mut StdRng::seed_from_u64(42));
    let second = shuffled_page(items, 2, &mut StdRng::seed_from_u64(42));

    let combined: HashSet<i32> = first.iter().chain(second.iter()).copied().collect();
    assert_eq!(combined.len(), first.len() + second.len());
    assert_eq!(combined.len(), 2 * PAGE_SIZE);
  }

  #[test]
  fn out_of_range_page_is_empty_not_an_error() {
    let mut rng = StdRng::seed_from_u64(7);
    assert!(shuffled_page::<i32>((0..5).collect(), 3, &mut rng).is_empty());
  }

  #[test]
  fn zero_page_is_treated_as_first() {
    let mut rng = StdRng::seed_from_u64(7);
    let page = shuffled_page((0..3).collect(), 0, &mut rng);
    assert_eq!(page.len(), 3);
  }

  #[test]
  fn last_page_holds_the_remainder() {
    let mut rng = StdRng::seed_from_u64(7);
    let page = shuffled_page((0..25).collect(), 3, &mut rng);
    assert_eq!(page.len(), 5);
  }

  #[test]
  fn stable_pages_preserve_order() {
    use super::page_slice;

    assert_eq!(page_slice((0..25).collect::<Vec<i32>>(), 2), (10..20).collect::<Vec<i32>>());
    assert_eq!(page_slice((0..25).collect::<Vec<i32>>(), 3), (20..25).collect::<Vec<i32>>());
    assert!(page_slice((0..25).collect::<Vec<i32>>(), 4).is_empty());
  }

  #[test]
  fn sample_is_capped_and_duplicate_free() {
    let mut rng = StdRng::seed_from_u64(3);
    let picked = sample((0..100).collect::<Vec<i32>>(), &mut rng);

    assert_eq!(picked.len(), RECOMMENDATION_LIMIT);
    let unique: HashSet<i32> = picked.iter().copied().collect();
    assert_eq!(unique.len(), picked.len());
  }

  #[test]
  fn sample_of_a_small_set_returns_all_of_it() {
    let mut rng = StdRng::seed_from_u64(3);
    let picked = sample(vec![1, 2, 3], &mut rng);
    assert_eq!(picked.len(), 3);
  }

  #[test]
  fn sample_draws_from_the_candidates_only() {
    let mut rng = StdRng::seed_from_u64(9);
    let candidates: Vec<i32> = (10..30).collect();
    let allowed: HashSet<i32> = candidates.iter().copied().collect();

    for item in sample(candidates, &mut rng) {
      assert!(allowed.contains(&item));
    }
  }

  #[test]
  fn picked_tag_comes_from_the_target() {
    let mut rng = StdRng::seed_from_u64(1);
    let tags = [4, 8, 15];

    let picked = pick_tag(&tags, &mut rng).unwrap();
    assert!(tags.contains(&picked));
    assert!(pick_tag(&[], &mut rng).is_none());
  }
}
