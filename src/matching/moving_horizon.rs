use crate::core::flex_offer::FlexOffer;
use crate::core::Tick;
use crate::matching::filter::deviation;
use crate::matching::strategy::{MatchingStrategy, SiteCandidates};

/// Greedy single-pass policy that only looks at the most time-relevant
/// offer of each site.
///
/// For every site the candidate whose reaction time lies closest to the
/// current tick is kept (the earliest listed wins ties) and the rest are
/// ignored for this tick. Sites are then visited in order and a site's
/// candidate is accepted when it strictly reduces the remaining deviation
/// from the target; the remaining target shrinks by each accepted
/// contribution.
///
/// Linear in the number of offers, at the price of global best fit.
#[derive(Debug, Clone, Copy, Default)]
pub struct MovingHorizon;

impl MovingHorizon {
    /// The offer whose reaction time is nearest to `tick`.
    pub fn horizon_candidate(tick: Tick, offers: &[FlexOffer]) -> Option<FlexOffer> {
        offers
            .iter()
            .enumerate()
            .min_by_key(|(i, o)| (tick.abs_diff(u64::from(o.reaction_time())), *i))
            .map(|(_, o)| *o)
    }
}

impl MatchingStrategy for MovingHorizon {
    fn name(&self) -> &'static str {
        "moving_horizon"
    }

    fn select(&self, tick: Tick, target: i64, candidates: &[SiteCandidates]) -> Vec<Option<FlexOffer>> {
        let mut remaining = target;
        candidates
            .iter()
            .map(|site| {
                let offer = Self::horizon_candidate(tick, &site.offers)?;
                let after = remaining.saturating_sub(offer.signed_delta_p());
                if deviation(after, 0) < deviation(remaining, 0) {
                    remaining = after;
                    Some(offer)
                } else {
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::flex_offer::Direction;
    use crate::core::participant::SiteId;

    fn site(name: &str, offers: Vec<FlexOffer>) -> SiteCandidates {
        SiteCandidates {
            site: SiteId::new(name),
            offers,
        }
    }

    fn timed(id: i64, magnitude: i64, reaction_time: u32) -> FlexOffer {
        FlexOffer::new(id, magnitude, Direction::Up, 1, reaction_time, 0)
    }

    fn chosen_ids(selection: &[Option<FlexOffer>]) -> Vec<Option<i64>> {
        selection.iter().map(|s| s.map(|o| o.id())).collect()
    }

    #[test]
    fn test_horizon_candidate_closest_reaction_time() {
        let offers = vec![timed(1, 10, 2), timed(2, 10, 9), timed(3, 10, 6)];
        assert_eq!(MovingHorizon::horizon_candidate(7, &offers).map(|o| o.id()), Some(3));
        assert_eq!(MovingHorizon::horizon_candidate(0, &offers).map(|o| o.id()), Some(1));
    }

    #[test]
    fn test_horizon_candidate_tie_keeps_first() {
        let offers = vec![timed(1, 10, 4), timed(2, 10, 6)];
        assert_eq!(MovingHorizon::horizon_candidate(5, &offers).map(|o| o.id()), Some(1));
    }

    #[test]
    fn test_greedy_accepts_while_reducing() {
        let candidates = vec![
            site("A", vec![timed(1, 10, 0)]),
            site("B", vec![timed(2, 8, 0)]),
            site("C", vec![timed(3, 4, 0)]),
        ];
        // 15 -> 5 after A; B would leave |-3| < 5 so it is taken; C would
        // leave |-7| > 3 and is skipped.
        let selection = MovingHorizon.select(0, 15, &candidates);
        assert_eq!(chosen_ids(&selection), vec![Some(1), Some(2), None]);
    }

    #[test]
    fn test_rejects_overshoot_that_does_not_help() {
        let candidates = vec![site("A", vec![timed(1, 20, 0)])];
        // |10 - 20| == |10|: not a strict improvement
        let selection = MovingHorizon.select(0, 10, &candidates);
        assert_eq!(chosen_ids(&selection), vec![None]);
    }

    #[test]
    fn test_only_horizon_candidate_considered() {
        // The far-away offer would be an exact fit, but it is outside the horizon.
        let candidates = vec![site("A", vec![timed(1, 3, 5), timed(2, 10, 50)])];
        let selection = MovingHorizon.select(5, 10, &candidates);
        assert_eq!(chosen_ids(&selection), vec![Some(1)]);
    }

    #[test]
    fn test_downward_target() {
        let candidates = vec![
            site("A", vec![FlexOffer::down(1, 6)]),
            site("B", vec![FlexOffer::down(2, 6)]),
        ];
        let selection = MovingHorizon.select(0, -10, &candidates);
        assert_eq!(chosen_ids(&selection), vec![Some(1), Some(2)]);
    }

    #[test]
    fn test_site_without_candidates_stays_idle() {
        let candidates = vec![site("A", vec![]), site("B", vec![timed(2, 5, 0)])];
        let selection = MovingHorizon.select(0, 5, &candidates);
        assert_eq!(chosen_ids(&selection), vec![None, Some(2)]);
    }
}
