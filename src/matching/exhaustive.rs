use crate::core::flex_offer::FlexOffer;
use crate::core::Tick;
use crate::matching::filter::deviation;
use crate::matching::strategy::{MatchingStrategy, SiteCandidates};
use log::trace;

/// Brute-force search over every combination of per-site choices.
///
/// Each site contributes either nothing or exactly one of its candidates.
/// The Cartesian product of those choices is enumerated and the winner is
/// the combination that minimizes, in order:
///
/// 1. `|target - sum|`
/// 2. the number of activated sites
/// 3. the ids of the activated offers, listed in site order, compared
///    lexicographically
///
/// The result is fully determined by the input; no randomness is used to
/// break ties. Cost grows as the product of `(offers + 1)` over all sites,
/// which stays small for tens of sites with a handful of offers each.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExhaustiveCombination;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Ranking {
    deviation: u128,
    active: usize,
    ids: Vec<i64>,
}

impl MatchingStrategy for ExhaustiveCombination {
    fn name(&self) -> &'static str {
        "exhaustive"
    }

    fn select(&self, _tick: Tick, target: i64, candidates: &[SiteCandidates]) -> Vec<Option<FlexOffer>> {
        match search_space(candidates) {
            Some(n) => trace!("Exhaustive search over {} combinations", n),
            None => trace!("Exhaustive search over more than u128::MAX combinations"),
        }
        // cursor[i] == 0 leaves site i idle, k > 0 picks offers[k - 1]
        let mut cursor = vec![0usize; candidates.len()];
        let mut best_cursor = cursor.clone();
        let mut best = Ranking {
            deviation: deviation(target, 0),
            active: 0,
            ids: Vec::new(),
        };

        while advance(&mut cursor, candidates) {
            let (sum, active) = totals(&cursor, candidates);
            let dev = deviation(target, sum);
            if (dev, active) > (best.deviation, best.active) {
                continue;
            }
            let ranking = Ranking {
                deviation: dev,
                active,
                ids: selected_ids(&cursor, candidates),
            };
            if ranking < best {
                best = ranking;
                best_cursor.clone_from(&cursor);
            }
        }

        best_cursor
            .iter()
            .zip(candidates)
            .map(|(&k, site)| pick(k, site))
            .collect()
    }
}

/// Number of combinations the search visits, including the all-idle one.
/// `None` when the count does not fit in a `u128`.
pub fn search_space(candidates: &[SiteCandidates]) -> Option<u128> {
    candidates
        .iter()
        .try_fold(1u128, |acc, c| acc.checked_mul(c.offers.len() as u128 + 1))
}

/// Step the odometer; returns `false` once every combination was seen.
fn advance(cursor: &mut [usize], candidates: &[SiteCandidates]) -> bool {
    for (slot, site) in cursor.iter_mut().zip(candidates) {
        *slot += 1;
        if *slot <= site.offers.len() {
            return true;
        }
        *slot = 0;
    }
    false
}

fn pick(k: usize, site: &SiteCandidates) -> Option<FlexOffer> {
    k.checked_sub(1).map(|i| site.offers[i])
}

fn totals(cursor: &[usize], candidates: &[SiteCandidates]) -> (i64, usize) {
    cursor
        .iter()
        .zip(candidates)
        .filter_map(|(&k, site)| pick(k, site))
        .fold((0i64, 0usize), |(sum, n), o| {
            (sum.saturating_add(o.signed_delta_p()), n + 1)
        })
}

fn selected_ids(cursor: &[usize], candidates: &[SiteCandidates]) -> Vec<i64> {
    cursor
        .iter()
        .zip(candidates)
        .filter_map(|(&k, site)| pick(k, site))
        .map(|o| o.id())
        .collect()
}
