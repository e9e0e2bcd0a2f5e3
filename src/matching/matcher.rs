use crate::core::flex_offer::{ActivationCommand, Direction, FlexOffer};
use crate::core::offer_book::OfferBook;
use crate::core::participant::SiteId;
use crate::core::Tick;
use crate::matching::exhaustive::ExhaustiveCombination;
use crate::matching::filter::{deviation, usable_offers};
use crate::matching::strategy::{MatchingStrategy, SiteCandidates};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

/// A site that publishes flex offers and executes activations.
///
/// There is no activation listener; callers observe activations through the
/// returned [`MatchOutcome`] or inside [`FlexCapableSite::activate_flex`].
pub trait FlexCapableSite {
    /// Offers valid for the current tick.
    fn flex_offers(&self) -> Vec<FlexOffer>;

    /// Activate the offer referenced by `command`.
    fn activate_flex(&mut self, command: ActivationCommand);
}

/// One selected offer and the command that activates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activation {
    pub site: SiteId,
    pub offer: FlexOffer,
    pub command: ActivationCommand,
}

/// Result of one matching step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub tick: Tick,
    pub target: i64,
    /// At most one entry per site, in site registration order.
    pub activations: Vec<Activation>,
}

impl MatchOutcome {
    fn idle(tick: Tick, target: i64) -> Self {
        Self {
            tick,
            target,
            activations: Vec::new(),
        }
    }

    /// Sum of the signed contributions of every activated offer.
    pub fn achieved(&self) -> i64 {
        self.activations
            .iter()
            .map(|a| a.offer.signed_delta_p())
            .sum()
    }

    /// `|target - achieved|`.
    pub fn deviation(&self) -> u128 {
        deviation(self.target, self.achieved())
    }

    pub fn is_exact(&self) -> bool {
        self.deviation() == 0
    }

    pub fn commands(&self) -> Vec<ActivationCommand> {
        self.activations.iter().map(|a| a.command).collect()
    }
}

/// Picks, each tick, at most one offer per registered site so that the
/// selected offers approximate a target.
///
/// Only offers pointing towards the target take part; a zero target never
/// activates anything. The actual selection is delegated to a
/// [`MatchingStrategy`].
///
/// # Examples
///
/// ```
/// use gridflex::core::flex_offer::FlexOffer;
/// use gridflex::core::offer_book::OfferBook;
/// use gridflex::core::participant::SiteId;
/// use gridflex::matching::matcher::FlexibilityMatcher;
///
/// let mut matcher = FlexibilityMatcher::default();
/// matcher.register_site(SiteId::new("A"));
/// matcher.register_site(SiteId::new("B"));
///
/// let mut book = OfferBook::new();
/// book.add(SiteId::new("A"), FlexOffer::up(1, 10));
/// book.add(SiteId::new("B"), FlexOffer::up(2, 5));
///
/// let outcome = matcher.match_offers(0, 15, &book);
/// assert_eq!(outcome.achieved(), 15);
/// assert_eq!(outcome.activations.len(), 2);
/// ```
#[derive(Debug)]
pub struct FlexibilityMatcher {
    strategy: Box<dyn MatchingStrategy>,
    sites: Vec<SiteId>,
}

impl Default for FlexibilityMatcher {
    fn default() -> Self {
        Self::new(Box::new(ExhaustiveCombination))
    }
}

impl FlexibilityMatcher {
    pub fn new(strategy: Box<dyn MatchingStrategy>) -> Self {
        Self {
            strategy,
            sites: Vec::new(),
        }
    }

    /// Register a site. Returns `false` if it was already registered, in
    /// which case it keeps its original position.
    pub fn register_site(&mut self, site: SiteId) -> bool {
        if self.sites.contains(&site) {
            return false;
        }
        self.sites.push(site);
        true
    }

    /// Registered sites in registration order.
    pub fn sites(&self) -> &[SiteId] {
        &self.sites
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Direction-filtered candidates of every registered site, in
    /// registration order. Offers of unregistered sites are ignored.
    pub fn candidates(&self, target: i64, book: &OfferBook) -> Vec<SiteCandidates> {
        self.sites
            .iter()
            .map(|site| SiteCandidates {
                site: site.clone(),
                offers: usable_offers(target, book.offers_for(site)),
            })
            .collect()
    }

    /// Run one matching step against `target` using the offers in `book`.
    pub fn match_offers(&self, tick: Tick, target: i64, book: &OfferBook) -> MatchOutcome {
        debug!(
            "Performing {} matching step at tick {} with target {}",
            self.strategy.name(),
            tick,
            target
        );
        for site in book.sites() {
            if !self.sites.contains(&site) {
                trace!("Ignoring offers of unregistered site {}", site);
            }
        }
        if Direction::towards(target).is_none() {
            return MatchOutcome::idle(tick, target);
        }

        let candidates = self.candidates(target, book);
        let selection = self.strategy.select(tick, target, &candidates);
        debug_assert_eq!(selection.len(), candidates.len());

        let activations: Vec<Activation> = candidates
            .into_iter()
            .zip(selection)
            .filter_map(|(c, chosen)| {
                chosen.map(|offer| Activation {
                    site: c.site,
                    offer,
                    command: offer.activation(),
                })
            })
            .collect();

        let outcome = MatchOutcome {
            tick,
            target,
            activations,
        };
        debug!(
            "Matched {} of target {} with {} activations",
            outcome.achieved(),
            target,
            outcome.activations.len()
        );
        outcome
    }
}

impl<T: FlexCapableSite + ?Sized> FlexCapableSite for Box<T> {
    fn flex_offers(&self) -> Vec<FlexOffer> {
        (**self).flex_offers()
    }

    fn activate_flex(&mut self, command: ActivationCommand) {
        (**self).activate_flex(command)
    }
}

/// Deliver every activation in `outcome` to the site that owns it.
///
/// Activations for sites missing from `sites` are skipped.
pub fn dispatch<S: FlexCapableSite>(outcome: &MatchOutcome, sites: &mut [(SiteId, S)]) {
    for activation in &outcome.activations {
        let Some((_, site)) = sites.iter_mut().find(|(id, _)| *id == activation.site) else {
            trace!("No live site {} for activation", activation.site);
            continue;
        };
        match activation.offer.direction() {
            Direction::Up => debug!(
                "Sending restore request to {} based on offer {}",
                activation.site, activation.offer
            ),
            Direction::Down => debug!(
                "Sending curtail request to {} based on offer {}",
                activation.site, activation.offer
            ),
        }
        site.activate_flex(activation.command);
    }
}
