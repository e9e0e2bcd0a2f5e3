//! Random offer books for benchmarking and invariant testing.

use crate::core::flex_offer::{Direction, FlexOffer};
use crate::core::offer_book::OfferBook;
use crate::core::participant::SiteId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Shape of a generated offer book.
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    pub site_count: usize,
    /// Upper bound on offers per site; each site gets between zero and
    /// this many.
    pub max_offers_per_site: usize,
    pub min_magnitude: i64,
    pub max_magnitude: i64,
    /// Reaction times are drawn from `0..=max_reaction_time`.
    pub max_reaction_time: u32,
    /// Fixed seed for reproducible books; `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            site_count: 8,
            max_offers_per_site: 3,
            min_magnitude: 1,
            max_magnitude: 100,
            max_reaction_time: 8,
            seed: None,
        }
    }
}

/// Generate a random offer book. Offer ids are unique and increase in
/// site order.
pub fn generate_offer_book(config: &ScenarioConfig) -> OfferBook {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut book = OfferBook::new();
    let mut next_id = 1i64;

    for s in 0..config.site_count {
        let site = SiteId::new(format!("SITE-{:03}", s));
        let count = rng.gen_range(0..=config.max_offers_per_site);
        let mut offers = Vec::with_capacity(count);
        for _ in 0..count {
            let direction = if rng.gen_bool(0.5) {
                Direction::Up
            } else {
                Direction::Down
            };
            let magnitude = rng.gen_range(config.min_magnitude..=config.max_magnitude);
            let reaction_time = rng.gen_range(0..=config.max_reaction_time);
            offers.push(FlexOffer::new(next_id, magnitude, direction, 4, reaction_time, 2));
            next_id += 1;
        }
        book.extend(site, offers);
    }

    book
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_site_is_present() {
        let config = ScenarioConfig {
            site_count: 5,
            seed: Some(7),
            ..Default::default()
        };
        let book = generate_offer_book(&config);
        assert_eq!(book.site_count(), 5);
        assert!(book.offer_count() <= 5 * config.max_offers_per_site);
    }

    #[test]
    fn test_seed_is_reproducible() {
        let config = ScenarioConfig {
            seed: Some(1423),
            ..Default::default()
        };
        let a = generate_offer_book(&config);
        let b = generate_offer_book(&config);
        for ((sa, oa), (sb, ob)) in a.iter().zip(b.iter()) {
            assert_eq!(sa, sb);
            assert_eq!(oa, ob);
        }
    }

    #[test]
    fn test_magnitudes_within_bounds() {
        let config = ScenarioConfig {
            site_count: 20,
            min_magnitude: 5,
            max_magnitude: 9,
            seed: Some(3),
            ..Default::default()
        };
        let book = generate_offer_book(&config);
        for (_, offers) in book.iter() {
            for o in offers {
                assert!((5..=9).contains(&o.magnitude()));
            }
        }
    }
}
