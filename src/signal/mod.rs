//! Apportionment of a single imbalance value across registered
//! participants.

pub mod distributor;
