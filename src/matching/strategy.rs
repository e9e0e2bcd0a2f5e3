use crate::core::flex_offer::FlexOffer;
use crate::core::participant::SiteId;
use crate::core::Tick;
use std::fmt;

/// The pre-filtered offers of one registered site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteCandidates {
    pub site: SiteId,
    /// Offers that point towards the target, in the site's own order.
    pub offers: Vec<FlexOffer>,
}

/// A policy for picking offers out of per-site candidate sets.
///
/// Implementations return one slot per entry of `candidates`, in the same
/// order: `Some(offer)` activates that offer at that site, `None` leaves
/// the site idle. The shape of the result makes it impossible to activate
/// two offers of one site.
pub trait MatchingStrategy: fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn select(&self, tick: Tick, target: i64, candidates: &[SiteCandidates]) -> Vec<Option<FlexOffer>>;
}
