//! # gridflex
//!
//! Matching of distributed power flexibility against grid balancing
//! targets.
//!
//! A balancing authority publishes one signed imbalance per tick. This
//! crate apportions it across participants, matches the apportioned
//! targets against per-site flex offers, and provides a Contract-Net
//! negotiation engine for work that has to be won through bidding.
//!
//! ## Architecture
//!
//! - **core** — Value types: flex offers, capability bands, ids, offer books
//! - **signal** — Proportional apportionment of an imbalance
//! - **matching** — Per-site offer selection (exhaustive and moving horizon)
//! - **protocol** — Contract-Net call-for-proposals / evaluate / confirm
//! - **aggregation** — Reactive aggregator tying signals to matching
//! - **config** — Engine configuration
//! - **simulation** — Random offer books for benchmarks and tests

pub mod aggregation;
pub mod config;
pub mod core;
pub mod matching;
pub mod protocol;
pub mod signal;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::aggregation::reactive::ReactiveAggregator;
    pub use crate::config::{EngineConfig, StrategyKind};
    pub use crate::core::capability::CapabilityBand;
    pub use crate::core::flex_offer::{ActivationCommand, Direction, FlexOffer};
    pub use crate::core::offer_book::OfferBook;
    pub use crate::core::participant::{ParticipantId, SiteId};
    pub use crate::core::Tick;
    pub use crate::matching::matcher::{FlexCapableSite, FlexibilityMatcher, MatchOutcome};
    pub use crate::protocol::contract_net::{
        Answer, Completion, ContractNet, Initiator, Responder, RoundOutcome,
    };
    pub use crate::protocol::proposal::{Proposal, WorkProposal};
    pub use crate::signal::distributor::{
        BalancingSignalSource, ContractualParticipant, SignalDistributor,
    };
}
