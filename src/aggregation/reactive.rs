use crate::config::EngineConfig;
use crate::core::capability::CapabilityBand;
use crate::core::flex_offer::Direction;
use crate::core::offer_book::OfferBook;
use crate::core::participant::SiteId;
use crate::core::Tick;
use crate::matching::matcher::{dispatch, FlexCapableSite, FlexibilityMatcher, MatchOutcome};
use crate::signal::distributor::ContractualParticipant;
use log::debug;

/// An aggregator that reacts directly to the targets a balancing authority
/// signals.
///
/// When polled for capacity it gathers the current offers of all its sites
/// and reports what they could deliver together. On its own ticks it
/// matches the last received target against those offers and activates
/// the selected ones. Matching runs on every `frequency`-th tick, starting
/// with the first.
pub struct ReactiveAggregator {
    sites: Vec<(SiteId, Box<dyn FlexCapableSite>)>,
    matcher: FlexibilityMatcher,
    frequency: u32,
    tick_count: u64,
    current_target: i64,
    current_offers: OfferBook,
}

impl ReactiveAggregator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            sites: Vec::new(),
            matcher: FlexibilityMatcher::new(config.strategy.build()),
            frequency: config.aggregation_frequency.max(1),
            tick_count: 0,
            current_target: 0,
            current_offers: OfferBook::new(),
        }
    }

    /// Register a site. Returns `false` and drops `site` if the id is
    /// already taken.
    pub fn register_site<S: FlexCapableSite + 'static>(&mut self, id: SiteId, site: S) -> bool {
        if !self.matcher.register_site(id.clone()) {
            return false;
        }
        self.sites.push((id, Box::new(site)));
        true
    }

    pub fn site_ids(&self) -> &[SiteId] {
        self.matcher.sites()
    }

    pub fn current_target(&self) -> i64 {
        self.current_target
    }

    /// Offers gathered at the last capacity poll.
    pub fn current_offers(&self) -> &OfferBook {
        &self.current_offers
    }

    /// Collect the offers every site currently puts forward.
    pub fn gather_offers(&self) -> OfferBook {
        let mut book = OfferBook::new();
        for (id, site) in &self.sites {
            book.extend(id.clone(), site.flex_offers());
        }
        book
    }

    /// Advance one tick. Returns the matching outcome when this tick ran a
    /// matching step.
    pub fn tick(&mut self, tick: Tick) -> Option<MatchOutcome> {
        let due = self.tick_count % u64::from(self.frequency) == 0;
        self.tick_count += 1;
        if !due {
            return None;
        }
        let outcome = self
            .matcher
            .match_offers(tick, self.current_target, &self.current_offers);
        dispatch(&outcome, &mut self.sites);
        Some(outcome)
    }
}

impl ContractualParticipant for ReactiveAggregator {
    fn signal_target(&mut self, tick: Tick, value: i64) {
        debug!("Aggregator received target {} at tick {}", value, tick);
        self.current_target = value;
    }

    fn power_capacity(&mut self) -> CapabilityBand {
        self.current_offers = self.gather_offers();
        CapabilityBand::new(
            self.current_offers.deliverable(Direction::Down),
            self.current_offers.deliverable(Direction::Up),
        )
    }
}
