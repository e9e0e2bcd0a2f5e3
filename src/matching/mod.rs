//! Selection of at most one flex offer per site so that the selected
//! offers approximate an aggregate target.
//!
//! - **filter** — direction pre-filter shared by all strategies
//! - **strategy** — the [`strategy::MatchingStrategy`] seam
//! - **exhaustive** — Cartesian-product search (best fit)
//! - **moving_horizon** — greedy single-candidate-per-site policy
//! - **matcher** — site registry, strategy dispatch and outcomes

pub mod exhaustive;
pub mod filter;
pub mod matcher;
pub mod moving_horizon;
pub mod strategy;
