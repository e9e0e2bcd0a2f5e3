use approx::assert_relative_eq;
use gridflex::core::capability::CapabilityBand;
use gridflex::core::flex_offer::{Direction, FlexOffer};
use gridflex::core::offer_book::OfferBook;
use gridflex::core::participant::{ParticipantId, SiteId};
use gridflex::core::Tick;
use gridflex::matching::exhaustive::ExhaustiveCombination;
use gridflex::matching::matcher::FlexibilityMatcher;
use gridflex::matching::moving_horizon::MovingHorizon;
use gridflex::signal::distributor::{ContractualParticipant, SignalDistributor};
use proptest::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use std::collections::HashSet;

/// Offer shape before ids are assigned: (magnitude, up?, reaction time).
type RawOffer = (i64, bool, u32);

fn arb_raw_offer() -> impl Strategy<Value = RawOffer> {
    (0i64..60, any::<bool>(), 0u32..6)
}

/// Up to five sites with up to three offers each, small enough for the
/// exhaustive search.
fn arb_book() -> impl Strategy<Value = OfferBook> {
    prop::collection::vec(prop::collection::vec(arb_raw_offer(), 0..=3), 1..=5).prop_map(
        |sites| {
            let mut book = OfferBook::new();
            let mut next_id = 1;
            for (s, raw) in sites.into_iter().enumerate() {
                let offers: Vec<FlexOffer> = raw
                    .into_iter()
                    .map(|(magnitude, up, reaction_time)| {
                        let direction = if up { Direction::Up } else { Direction::Down };
                        let offer = FlexOffer::new(next_id, magnitude, direction, 2, reaction_time, 1);
                        next_id += 1;
                        offer
                    })
                    .collect();
                book.extend(SiteId::new(format!("S{}", s)), offers);
            }
            book
        },
    )
}

fn arb_target() -> impl Strategy<Value = i64> {
    -150i64..=150
}

fn matcher_for(book: &OfferBook, exhaustive: bool) -> FlexibilityMatcher {
    let mut matcher = if exhaustive {
        FlexibilityMatcher::new(Box::new(ExhaustiveCombination))
    } else {
        FlexibilityMatcher::new(Box::new(MovingHorizon))
    };
    for site in book.sites() {
        matcher.register_site(site);
    }
    matcher
}

#[derive(Default)]
struct Sink {
    received: Vec<i64>,
}

impl ContractualParticipant for Sink {
    fn signal_target(&mut self, _tick: Tick, value: i64) {
        self.received.push(value);
    }

    fn power_capacity(&mut self) -> CapabilityBand {
        CapabilityBand::zero()
    }
}

fn arb_bands() -> impl Strategy<Value = Vec<CapabilityBand>> {
    prop::collection::vec((0i64..500, 0i64..500), 1..8)
        .prop_map(|v| v.into_iter().map(|(d, u)| CapabilityBand::new(d, u)).collect())
}

fn distributor_for(bands: &[CapabilityBand]) -> SignalDistributor<Sink> {
    let mut distributor = SignalDistributor::new();
    for (i, band) in bands.iter().enumerate() {
        distributor
            .register(ParticipantId::new(format!("P{}", i)), Sink::default(), *band)
            .unwrap();
    }
    distributor
}

proptest! {
    // ===================================================================
    // INVARIANT 1: At most one offer per site is activated.
    //
    // Every activation belongs to a distinct site and references an offer
    // that site actually put forward.
    // ===================================================================
    #[test]
    fn one_activation_per_site(book in arb_book(), target in arb_target(), exhaustive in any::<bool>()) {
        let outcome = matcher_for(&book, exhaustive).match_offers(0, target, &book);
        let mut seen = HashSet::new();
        for activation in &outcome.activations {
            prop_assert!(seen.insert(activation.site.clone()), "site activated twice");
            prop_assert!(book.offers_for(&activation.site).contains(&activation.offer));
        }
    }

    // ===================================================================
    // INVARIANT 2: No activation opposes the target.
    //
    // Upward targets only activate upward offers and vice versa; a zero
    // target activates nothing. Zero-magnitude offers are never used.
    // ===================================================================
    #[test]
    fn activations_follow_target_direction(book in arb_book(), target in arb_target(), exhaustive in any::<bool>()) {
        let outcome = matcher_for(&book, exhaustive).match_offers(0, target, &book);
        match Direction::towards(target) {
            None => prop_assert!(outcome.activations.is_empty()),
            Some(direction) => {
                for activation in &outcome.activations {
                    prop_assert_eq!(activation.offer.direction(), direction);
                    prop_assert!(activation.offer.magnitude() > 0);
                }
            }
        }
    }

    // ===================================================================
    // INVARIANT 3: The exhaustive search is never worse than idling.
    //
    // Selecting nothing is one of the combinations, so the best fit
    // deviates from the target by at most |target|.
    // ===================================================================
    #[test]
    fn exhaustive_never_worse_than_idle(book in arb_book(), target in arb_target()) {
        let outcome = matcher_for(&book, true).match_offers(0, target, &book);
        prop_assert!(outcome.deviation() <= u128::from(target.unsigned_abs()));
    }

    // ===================================================================
    // INVARIANT 4: The exhaustive search is never worse than the greedy
    // moving-horizon pass.
    //
    // Whatever the greedy pass selects is one of the combinations the
    // exhaustive search ranks.
    // ===================================================================
    #[test]
    fn exhaustive_dominates_moving_horizon(book in arb_book(), target in arb_target(), tick in 0u64..6) {
        let best = matcher_for(&book, true).match_offers(tick, target, &book);
        let greedy = matcher_for(&book, false).match_offers(tick, target, &book);
        prop_assert!(best.deviation() <= greedy.deviation());
    }

    // ===================================================================
    // INVARIANT 5: Matching is deterministic.
    // ===================================================================
    #[test]
    fn matching_is_deterministic(book in arb_book(), target in arb_target()) {
        let matcher = matcher_for(&book, true);
        let first = matcher.match_offers(3, target, &book);
        let second = matcher.match_offers(3, target, &book);
        prop_assert_eq!(first, second);
    }

    // ===================================================================
    // INVARIANT 6: Every participant receives exactly one signal per round.
    // ===================================================================
    #[test]
    fn one_signal_per_participant(bands in arb_bands(), imbalance in -2000i64..2000) {
        let mut distributor = distributor_for(&bands);
        let signals = distributor.signal(1, imbalance);
        prop_assert_eq!(signals.len(), bands.len());
        for id in distributor.participants() {
            prop_assert_eq!(distributor.participant(&id).unwrap().received.len(), 1);
        }
    }

    // ===================================================================
    // INVARIANT 7: Shares stay inside the announced band and never oppose
    // the imbalance.
    // ===================================================================
    #[test]
    fn shares_bounded_by_band(bands in arb_bands(), imbalance in -2000i64..2000) {
        let mut distributor = distributor_for(&bands);
        for (signal, band) in distributor.signal(1, imbalance).iter().zip(&bands) {
            if imbalance > 0 {
                prop_assert!(signal.value >= 0 && signal.value <= band.up());
            } else if imbalance < 0 {
                prop_assert!(signal.value <= 0 && -signal.value <= band.down());
            } else {
                prop_assert_eq!(signal.value, 0);
            }
        }
    }

    // ===================================================================
    // INVARIANT 8: A coverable imbalance is fully apportioned, up to one
    // unit of rounding per participant.
    // ===================================================================
    #[test]
    fn coverable_imbalance_fully_apportioned(bands in arb_bands(), imbalance in -500i64..500) {
        let capacity: i64 = if imbalance >= 0 {
            bands.iter().map(|b| b.up()).sum()
        } else {
            bands.iter().map(|b| b.down()).sum()
        };
        prop_assume!(capacity >= imbalance.abs() && capacity > 0);

        let mut distributor = distributor_for(&bands);
        let fraction = distributor.fraction(imbalance).to_f64().unwrap();
        assert_relative_eq!(
            fraction * capacity as f64,
            imbalance.abs() as f64,
            max_relative = 1e-9
        );

        let total: i64 = distributor.signal(1, imbalance).iter().map(|s| s.value).sum();
        prop_assert!((total - imbalance).abs() <= bands.len() as i64);
    }
}
