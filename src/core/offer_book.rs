use crate::core::flex_offer::{Direction, FlexOffer};
use crate::core::participant::SiteId;
use std::collections::HashSet;

/// The offers each site put forward for one tick.
///
/// Sites keep the order in which they first appear. An offer id may only
/// occur once in a book; adding it twice is a programming error.
///
/// # Examples
///
/// ```
/// use gridflex::core::flex_offer::FlexOffer;
/// use gridflex::core::offer_book::OfferBook;
/// use gridflex::core::participant::SiteId;
///
/// let mut book = OfferBook::new();
/// book.add(SiteId::new("A"), FlexOffer::up(1, 10));
/// book.add(SiteId::new("A"), FlexOffer::down(2, 4));
/// book.add(SiteId::new("B"), FlexOffer::up(3, 5));
///
/// assert_eq!(book.site_count(), 2);
/// assert_eq!(book.offer_count(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct OfferBook {
    entries: Vec<(SiteId, Vec<FlexOffer>)>,
    ids: HashSet<i64>,
}

impl OfferBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single offer for `site`.
    ///
    /// # Panics
    ///
    /// Panics if an offer with the same id is already in the book.
    pub fn add(&mut self, site: SiteId, offer: FlexOffer) {
        assert!(
            self.ids.insert(offer.id()),
            "Flex offer {} is already registered in this book",
            offer.id()
        );
        match self.entries.iter_mut().find(|(s, _)| *s == site) {
            Some((_, offers)) => offers.push(offer),
            None => self.entries.push((site, vec![offer])),
        }
    }

    /// Add every offer in `offers` for `site`. A site with no offers is
    /// still recorded so that it keeps its position.
    pub fn extend(&mut self, site: SiteId, offers: impl IntoIterator<Item = FlexOffer>) {
        if !self.entries.iter().any(|(s, _)| *s == site) {
            self.entries.push((site.clone(), Vec::new()));
        }
        for offer in offers {
            self.add(site.clone(), offer);
        }
    }

    /// Offers of `site`, empty if the site put nothing forward.
    pub fn offers_for(&self, site: &SiteId) -> &[FlexOffer] {
        self.entries
            .iter()
            .find(|(s, _)| s == site)
            .map(|(_, offers)| offers.as_slice())
            .unwrap_or(&[])
    }

    /// Iterate over sites and their offers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&SiteId, &[FlexOffer])> {
        self.entries.iter().map(|(s, o)| (s, o.as_slice()))
    }

    pub fn sites(&self) -> Vec<SiteId> {
        self.entries.iter().map(|(s, _)| s.clone()).collect()
    }

    pub fn site_count(&self) -> usize {
        self.entries.len()
    }

    pub fn offer_count(&self) -> usize {
        self.entries.iter().map(|(_, o)| o.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.offer_count() == 0
    }

    /// Largest magnitude `site` offers in `direction`, zero if none.
    pub fn max_magnitude(&self, site: &SiteId, direction: Direction) -> i64 {
        self.offers_for(site)
            .iter()
            .filter(|o| o.direction() == direction)
            .map(|o| o.magnitude())
            .max()
            .unwrap_or(0)
    }

    /// Sum over all sites of the largest magnitude each offers in
    /// `direction`. Only one offer per site can be active at a time, so
    /// this is the most the book can deliver in that direction. Saturates
    /// at `i64::MAX`.
    pub fn deliverable(&self, direction: Direction) -> i64 {
        self.entries
            .iter()
            .map(|(site, _)| self.max_magnitude(site, direction))
            .fold(0i64, i64::saturating_add)
    }
}
