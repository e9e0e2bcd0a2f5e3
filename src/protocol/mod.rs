//! Contract-Net negotiation: call for proposals, evaluate, confirm.
//!
//! - **proposal** — the [`proposal::Proposal`] trait and a concrete
//!   [`proposal::WorkProposal`]
//! - **scoring** — reusable winner-selection helpers
//! - **contract_net** — the round engine and its hook traits

pub mod contract_net;
pub mod proposal;
pub mod scoring;
