use crate::core::flex_offer::{Direction, FlexOffer};

/// Offers from `offers` that can move the aggregate towards `target`.
///
/// Offers pointing the other way and offers with zero magnitude are
/// dropped. A zero target keeps nothing. Input order is preserved.
pub fn usable_offers(target: i64, offers: &[FlexOffer]) -> Vec<FlexOffer> {
    match Direction::towards(target) {
        Some(direction) => offers
            .iter()
            .filter(|o| o.direction() == direction && o.magnitude() > 0)
            .copied()
            .collect(),
        None => Vec::new(),
    }
}

/// `|target - sum|`, widened so extreme values cannot overflow.
pub fn deviation(target: i64, sum: i64) -> u128 {
    (i128::from(target) - i128::from(sum)).unsigned_abs()
}
