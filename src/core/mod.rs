//! Foundational value types shared by the distributor, the matcher and
//! the negotiation engine.

pub mod capability;
pub mod flex_offer;
pub mod offer_book;
pub mod participant;

/// A discrete simulation time step.
pub type Tick = u64;
