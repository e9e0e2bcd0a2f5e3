//! Aggregators that sit between a balancing authority and flex-capable
//! sites.

pub mod reactive;
