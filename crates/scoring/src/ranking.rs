use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use storage::models::Uid;

/// Contest totals of one participant after first-blood adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub uid: Uid,
    pub score_sum: Decimal,
    pub accept_count: u32,
    pub first_blood_count: u32,
    /// Total penalty seconds
    pub time: i64,
}

/// Score, then accepts, then first bloods (all descending), then time
/// ascending.
pub fn compare(a: &Standing, b: &Standing) -> Ordering {
    b.score_sum
        .cmp(&a.score_sum)
        .then_with(|| b.accept_count.cmp(&a.accept_count))
        .then_with(|| b.first_blood_count.cmp(&a.first_blood_count))
        .then_with(|| a.time.cmp(&b.time))
}

/// Sorts `items` by their standing and numbers them 1, 2, 3, ...
///
/// Participants with identical standings keep their input order and still
/// get distinct sequential ranks.
pub fn rank_by<T, F>(mut items: Vec<T>, standing: F) -> Vec<(u32, T)>
where
    F: Fn(&T) -> &Standing,
{
    items.sort_by(|a, b| compare(standing(a), standing(b)));
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| (i as u32 + 1, item))
        .collect()
}

pub fn rank(standings: Vec<Standing>) -> Vec<(u32, Standing)> {
    rank_by(standings, |s| s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standing(uid: Uid, score: i64, accept: u32, first_blood: u32, time: i64) -> Standing {
        Standing {
            uid,
            score_sum: Decimal::from(score),
            accept_count: accept,
            first_blood_count: first_blood,
            time,
        }
    }

    fn uids(ranked: &[(u32, Standing)]) -> Vec<Uid> {
        ranked.iter().map(|(_, s)| s.uid).collect()
    }

    #[test]
    fn test_orders_by_score_first() {
        let ranked = rank(vec![
            standing(1, 900, 3, 0, 10),
            standing(2, 1500, 1, 0, 5000),
            standing(3, 1200, 2, 1, 100),
        ]);
        assert_eq!(uids(&ranked), vec![2, 3, 1]);
        assert_eq!(ranked.iter().map(|(r, _)| *r).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_tie_breaks_in_order() {
        let ranked = rank(vec![
            standing(1, 1000, 1, 0, 100),
            standing(2, 1000, 2, 0, 900),
            standing(3, 1000, 2, 1, 900),
            standing(4, 1000, 2, 1, 300),
        ]);
        assert_eq!(uids(&ranked), vec![4, 3, 2, 1]);
    }

    #[test]
    fn test_exact_ties_get_sequential_ranks_in_input_order() {
        let ranked = rank(vec![
            standing(7, 1000, 1, 0, 60),
            standing(3, 1000, 1, 0, 60),
            standing(5, 1000, 1, 0, 60),
        ]);
        assert_eq!(uids(&ranked), vec![7, 3, 5]);
        assert_eq!(ranked.iter().map(|(r, _)| *r).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_contest() {
        assert!(rank(Vec::new()).is_empty());
    }
}
